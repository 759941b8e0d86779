mod json;
mod model;
mod terminal;

pub use json::JsonBackend;
pub use model::{
    Axis, ChartConfig, ChartData, ChartKind, ChartOptions, Dataset, LegendPosition, Paint, Scales,
    Ticks,
};
pub use terminal::TerminalBackend;

use uuid::Uuid;

use crate::error::DashboardResult;
use crate::page::Slot;

/// Reference to one live chart instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartHandle {
    pub id: Uuid,
    pub slot: Slot,
}

impl ChartHandle {
    pub fn new(slot: Slot) -> Self {
        Self {
            id: Uuid::new_v4(),
            slot,
        }
    }
}

/// The charting library seam: instantiate a chart into a mount and tear it down.
pub trait ChartBackend {
    fn create(&mut self, slot: Slot, config: &ChartConfig) -> DashboardResult<ChartHandle>;

    fn destroy(&mut self, handle: &ChartHandle);

    fn view(&self, handle: &ChartHandle) -> Option<&str>;

    /// Number of chart instances created and not yet destroyed.
    fn live_charts(&self) -> usize;
}
