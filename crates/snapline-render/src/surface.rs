//! Immediate-mode drawing contract and a recording implementation.

use kurbo::{Affine, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};

use crate::renderer::RenderResult;

/// Horizontal placement of text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Text starts at the anchor.
    #[default]
    Start,
    Center,
    /// Text ends at the anchor.
    End,
}

/// Text appearance.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(size: f64, color: Color) -> Self {
        Self {
            size,
            color,
            align: TextAlign::Start,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// Drawing operations the overlay needs from the host's render engine.
///
/// Coordinates are in the surface's current transform, which starts as
/// screen pixels.
pub trait DrawSurface {
    /// Push the current transform.
    fn save(&mut self);
    /// Pop back to the last saved transform.
    fn restore(&mut self);
    /// Post-multiply the current transform.
    fn concat_transform(&mut self, transform: Affine);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64);
    fn line(&mut self, from: Point, to: Point, color: Color, width: f64);
    /// Fill `rect` with a linear gradient running from `start` to `end`.
    fn fill_gradient_rect(&mut self, rect: Rect, start: Point, end: Point, stops: &[(f32, Color)]);
    /// Draw a single line of text. The anchor is on the vertical middle of
    /// the text; `angle` (degrees, clockwise) rotates about the anchor.
    fn text(&mut self, text: &str, anchor: Point, style: &TextStyle, angle: f64);
}

/// A color that can be serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Save,
    Restore,
    Transform {
        transform: Affine,
    },
    FillRect {
        rect: Rect,
        color: SerializableColor,
    },
    StrokeRect {
        rect: Rect,
        color: SerializableColor,
        width: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: SerializableColor,
        width: f64,
    },
    GradientRect {
        rect: Rect,
        start: Point,
        end: Point,
        stops: Vec<(f32, SerializableColor)>,
    },
    Text {
        text: String,
        anchor: Point,
        size: f64,
        color: SerializableColor,
        align: TextAlign,
        angle: f64,
    },
}

/// A [`DrawSurface`] that records every call.
///
/// Used by headless hosts and as the test double for painting code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All line segments drawn, in order.
    pub fn lines(&self) -> Vec<(Point, Point)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> RenderResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl DrawSurface for DisplayList {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn concat_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::Transform { transform });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: color.into(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color: color.into(),
            width,
        });
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color: color.into(),
            width,
        });
    }

    fn fill_gradient_rect(&mut self, rect: Rect, start: Point, end: Point, stops: &[(f32, Color)]) {
        self.commands.push(DrawCommand::GradientRect {
            rect,
            start,
            end,
            stops: stops.iter().map(|(offset, color)| (*offset, (*color).into())).collect(),
        });
    }

    fn text(&mut self, text: &str, anchor: Point, style: &TextStyle, angle: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            anchor,
            size: style.size,
            color: style.color.into(),
            align: style.align,
            angle,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        let color = Color::from_rgba8(59, 130, 246, 64);
        let serializable: SerializableColor = color.into();
        assert_eq!(serializable, SerializableColor { r: 59, g: 130, b: 246, a: 64 });
        let back: Color = serializable.into();
        assert_eq!(SerializableColor::from(back), serializable);
    }

    #[test]
    fn test_display_list_records() {
        let mut list = DisplayList::new();
        list.save();
        list.line(Point::ZERO, Point::new(10.0, 0.0), Color::BLACK, 1.0);
        list.text("42", Point::new(5.0, 5.0), &TextStyle::new(10.0, Color::BLACK), -90.0);
        list.restore();

        assert_eq!(list.len(), 4);
        assert_eq!(list.texts(), vec!["42"]);
        assert_eq!(list.lines(), vec![(Point::ZERO, Point::new(10.0, 0.0))]);
        assert_eq!(list.commands[0], DrawCommand::Save);
    }

    #[test]
    fn test_display_list_json() {
        let mut list = DisplayList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        let json = list.to_json().unwrap();
        assert!(json.contains("\"op\": \"fill_rect\""));
        let parsed: DisplayList = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.commands, list.commands);
    }
}
