pub mod term;

pub use term::TermRenderer;

use pulse_core::{ChartSnapshot, Result};

/// A redraw backend.
///
/// The engine never calls a backend directly — the ingestion loop hands it a
/// [`ChartSnapshot`] when the scheduler grants a frame. A failed render is
/// recoverable: the loop logs it and skips that frame, ingestion continues.
pub trait Renderer {
    fn render(&mut self, snapshot: &ChartSnapshot) -> Result<()>;
}

/// Test backend that records every snapshot it is handed.
#[derive(Debug, Default)]
pub struct CaptureRenderer {
    pub frames: Vec<ChartSnapshot>,
}

impl CaptureRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ChartSnapshot> {
        self.frames.last()
    }
}

impl Renderer for CaptureRenderer {
    fn render(&mut self, snapshot: &ChartSnapshot) -> Result<()> {
        self.frames.push(snapshot.clone());
        Ok(())
    }
}
