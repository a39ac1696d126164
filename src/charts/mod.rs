//! Charts module - Figure model and rendering

mod figure;
mod plotter;
mod renderer;

pub use figure::{Figure, Trace, XAxisKind};
pub use plotter::ChartPlotter;
pub use renderer::{ExportError, StaticChartRenderer};

use crate::client::RenderPayload;
use crate::controller::ChartSink;

/// Chart sink without a window: keeps the latest figure for export or
/// inspection.
#[derive(Default)]
pub struct FigureCapture {
    figure: Option<Figure>,
    replacements: usize,
}

impl FigureCapture {
    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    /// How many times the figure has been replaced.
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl ChartSink for FigureCapture {
    fn replace_figure(&mut self, payload: RenderPayload) {
        self.figure = Some(payload.into_figure());
        self.replacements += 1;
    }
}
