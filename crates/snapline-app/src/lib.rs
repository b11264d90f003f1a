//! Snapline headless host.
//!
//! Replays a scripted object drag against an in-memory scene, snapping every
//! frame, and records the resulting ruler and guide overlay as a display list.
//!
//! ## Script format
//!
//! ```json
//! {
//!   "camera": { "offset": { "x": 0.0, "y": 0.0 }, "zoom": 1.0 },
//!   "scene": { "objects": [ { "id": "...", "left": 0, "top": 0, "width": 100, "height": 100 } ] },
//!   "events": [
//!     { "Start": { "pointer": { "x": 10, "y": 10 }, "targets": ["..."] } },
//!     { "Move": { "pointer": { "x": 56, "y": 10 } } },
//!     { "End": { "pointer": { "x": 56, "y": 10 } } }
//!   ],
//!   "frame_interval_ms": 16,
//!   "fit_padding": 40.0
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use snapline_core::{
    Camera, Config, ConfigError, DragSession, GuideSegment, Instant, ObjectId, Scene,
    TransformEvent, ViewportSource,
};
use snapline_render::{DisplayList, OverlayRenderer, RecordingRenderer, RenderContext, Renderer};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Script parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

fn default_frame_interval_ms() -> u64 {
    16
}

/// A scene plus the drag events to replay on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub camera: Camera,
    pub scene: Scene,
    #[serde(default)]
    pub events: Vec<TransformEvent>,
    /// Simulated time between consecutive events.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// When set, the camera is refitted to the scene with this padding in
    /// pixels before replaying.
    #[serde(default)]
    pub fit_padding: Option<f64>,
}

impl Script {
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        log::debug!("Loading script from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// What happened on one replayed event.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub index: usize,
    /// Whether the host would have redrawn after this event.
    pub redraw: bool,
    pub guides: Vec<GuideSegment>,
}

/// Output of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub frames: Vec<FrameReport>,
    /// Scene after all events were applied.
    pub scene: Scene,
    /// Overlay painted for the final state.
    pub overlay: DisplayList,
}

impl Replay {
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Headless host: owns the drag session and the overlay renderer.
pub struct App {
    session: DragSession,
    renderer: RecordingRenderer,
}

impl Default for App {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            session: DragSession::new(config.snap.clone()),
            renderer: RecordingRenderer::new(OverlayRenderer::new(config)),
        }
    }

    /// Replay every event of `script`, then paint the overlay once.
    pub fn replay(&mut self, script: Script) -> Replay {
        let Script {
            mut camera,
            mut scene,
            events,
            frame_interval_ms,
            fit_padding,
        } = script;
        if let Some(padding) = fit_padding {
            if let Some(bounds) = scene.bounds() {
                camera.fit_to_bounds(bounds, padding);
            }
        }
        let transform = camera.transform();
        let step = Duration::from_millis(frame_interval_ms);
        let mut now = Instant::now();
        let mut selection: Vec<ObjectId> = Vec::new();
        let mut frames = Vec::with_capacity(events.len());

        for (index, event) in events.iter().enumerate() {
            if let TransformEvent::Start { targets, .. } = event {
                selection = targets.clone();
            }
            let redraw = self.session.handle(event, &mut scene, transform, now);
            if redraw {
                self.renderer
                    .overlay_mut()
                    .guides
                    .update(self.session.guides());
            }
            frames.push(FrameReport {
                index,
                redraw,
                guides: self.session.guides().to_vec(),
            });
            now += step;
        }
        log::info!("Replayed {} events", frames.len());

        let ctx = RenderContext::new(&scene, transform, camera.size()).with_selection(&selection);
        self.renderer.build_scene(&ctx);
        let overlay = self.renderer.take_display_list();

        Replay {
            frames,
            scene,
            overlay,
        }
    }
}

/// Replay a scripted drag and print the snap guides and overlay as JSON.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "snapline", version)]
pub struct Args {
    /// Script with the scene, camera and drag events
    pub script: PathBuf,

    /// Snap and ruler config (JSON); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the replay here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Load everything named by `args`, replay, and return the replay as JSON.
/// The JSON is also written to `--output` when given.
pub fn run(args: &Args) -> AppResult<String> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let script = Script::load(&args.script)?;
    let replay = App::new(&config).replay(script);
    let json = replay.to_json()?;
    if let Some(path) = &args.output {
        std::fs::write(path, &json)?;
        log::info!("Wrote replay to {}", path.display());
    }
    Ok(json)
}
