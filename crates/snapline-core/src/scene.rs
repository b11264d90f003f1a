//! Scene graph query surface and an in-memory implementation.
//!
//! Geometry components never hold on to the host's objects. They receive a
//! `&dyn SceneGraph` for the duration of one call and read plain data from
//! it. Group children are stored in scene coordinates, so a group's bounds
//! are simply the union of its children.

use crate::geometry::{Axis, CornerSet};
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

/// What kind of object a [`SceneObject`] is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// An ordinary shape with its own box.
    Shape,
    /// An axis-locked reference line. The axis is the one its position is
    /// measured on: `Guide(Axis::Y)` is a horizontal line.
    Guide(Axis),
    /// A group of objects manipulated as a unit. Groups can nest.
    Group(Vec<SceneObject>),
}

fn default_scale() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// Plain geometry of one object as exposed by the host canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(default = "Uuid::new_v4")]
    pub(crate) id: ObjectId,
    /// Left edge of the unrotated box.
    #[serde(default)]
    pub left: f64,
    /// Top edge of the unrotated box.
    #[serde(default)]
    pub top: f64,
    /// Unscaled width.
    #[serde(default)]
    pub width: f64,
    /// Unscaled height.
    #[serde(default)]
    pub height: f64,
    /// Clockwise rotation in degrees around the box center.
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_kind")]
    pub kind: ObjectKind,
}

fn default_kind() -> ObjectKind {
    ObjectKind::Shape
}

impl SceneObject {
    /// Create a new unrotated shape.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            left,
            top,
            width,
            height,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            visible: true,
            kind: ObjectKind::Shape,
        }
    }

    /// Create a reference line at `position` on `axis`, spanning `span`
    /// scene units centered on the origin of the other axis.
    pub fn guide(axis: Axis, position: f64, span: f64) -> Self {
        let mut object = match axis {
            Axis::X => Self::new(position, -span / 2.0, 0.0, span),
            Axis::Y => Self::new(-span / 2.0, position, span, 0.0),
        };
        object.kind = ObjectKind::Guide(axis);
        object
    }

    /// Create a group from a list of objects.
    pub fn group(children: Vec<SceneObject>) -> Self {
        let mut object = Self::new(0.0, 0.0, 0.0, 0.0);
        object.kind = ObjectKind::Group(children);
        object
    }

    /// Builder-style rotation.
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Builder-style scale.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Builder-style visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Children if this object is a group, otherwise an empty slice.
    pub fn children(&self) -> &[SceneObject] {
        match &self.kind {
            ObjectKind::Group(children) => children,
            _ => &[],
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ObjectKind::Group(_))
    }

    /// The axis this object is locked to, if it is a reference line.
    pub fn guide_axis(&self) -> Option<Axis> {
        match self.kind {
            ObjectKind::Guide(axis) => Some(axis),
            _ => None,
        }
    }

    /// The axis on which this object must not take part in snapping or
    /// ruler highlighting.
    pub fn skip_axis(&self) -> Option<Axis> {
        self.guide_axis().map(Axis::other)
    }

    /// Oriented corners from the current transform.
    ///
    /// `None` when the object has no usable geometry: non-finite values, a
    /// box collapsed to a point, or an empty group.
    pub fn corners(&self) -> Option<CornerSet> {
        match &self.kind {
            ObjectKind::Group(children) => {
                let bounds = children
                    .iter()
                    .filter_map(|child| child.corners().map(|cs| cs.bounds()))
                    .reduce(|acc, r| acc.union(r))?;
                Some(CornerSet::from_rect(bounds))
            }
            _ => {
                let width = self.width * self.scale_x.abs();
                let height = self.height * self.scale_y.abs();
                if width == 0.0 && height == 0.0 {
                    return None;
                }
                let rect = Rect::new(self.left, self.top, self.left + width, self.top + height);
                let corners = CornerSet::oriented(rect, self.angle);
                corners.is_finite().then_some(corners)
            }
        }
    }

    /// Axis-aligned bounds of the oriented corners.
    pub fn bounds(&self) -> Option<Rect> {
        self.corners().map(|cs| cs.bounds())
    }

    /// Move this object (and every child) by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.left += delta.x;
        self.top += delta.y;
        if let ObjectKind::Group(children) = &mut self.kind {
            for child in children {
                child.translate(delta);
            }
        }
    }

    /// Find an object by ID in this subtree (including `self`).
    pub fn find(&self, id: ObjectId) -> Option<&SceneObject> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Find a mutable object by ID in this subtree (including `self`).
    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            ObjectKind::Group(children) => children.iter_mut().find_map(|child| child.find_mut(id)),
            _ => None,
        }
    }

    /// Path of group IDs from this object down to (excluding) `id`.
    fn path_to(&self, id: ObjectId, path: &mut Vec<ObjectId>) -> bool {
        if self.id == id {
            return true;
        }
        path.push(self.id);
        if self.children().iter().any(|child| child.path_to(id, path)) {
            return true;
        }
        path.pop();
        false
    }
}

/// Read access to the host's scene graph.
pub trait SceneGraph {
    /// Top-level objects in z-order (back to front).
    fn objects(&self) -> &[SceneObject];

    /// Find an object anywhere in the hierarchy.
    fn find(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects().iter().find_map(|object| object.find(id))
    }

    /// Groups containing `id`, outermost first.
    fn ancestors(&self, id: ObjectId) -> Vec<ObjectId> {
        for object in self.objects() {
            let mut path = Vec::new();
            if object.path_to(id, &mut path) {
                return path;
            }
        }
        Vec::new()
    }

    /// The group directly containing `id`.
    fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.ancestors(id).last().copied()
    }
}

/// Write access used to apply snap corrections.
pub trait SceneGraphMut: SceneGraph {
    fn find_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject>;

    /// Translate an object; returns false when it no longer exists.
    fn translate(&mut self, id: ObjectId, delta: Vec2) -> bool {
        match self.find_mut(id) {
            Some(object) => {
                object.translate(delta);
                true
            }
            None => false,
        }
    }
}

/// In-memory scene: a flat list of top-level objects in z-order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object on top of the z-order and return its ID.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Remove a top-level object.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of top-level objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Bounding box of every visible object.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .filter(|o| o.visible)
            .filter_map(SceneObject::bounds)
            .reduce(|acc, r| acc.union(r))
    }
}

impl SceneGraph for Scene {
    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }
}

impl SceneGraphMut for Scene {
    fn find_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find_map(|object| object.find_mut(id))
    }
}
