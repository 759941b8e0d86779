use std::collections::HashMap;

use serde_json::json;
use uuid::Uuid;

use super::{ChartBackend, ChartConfig, ChartHandle};
use crate::error::{DashboardError, DashboardResult};
use crate::page::Slot;

/// Keeps the configuration document of each live chart, pretty-printed.
#[derive(Debug, Default)]
pub struct JsonBackend {
    live: HashMap<Uuid, String>,
}

impl JsonBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartBackend for JsonBackend {
    fn create(&mut self, slot: Slot, config: &ChartConfig) -> DashboardResult<ChartHandle> {
        let handle = ChartHandle::new(slot);
        let document = json!({
            "mount": slot.mount_id(),
            "chart": config,
        });
        let rendered = serde_json::to_string_pretty(&document)
            .map_err(|err| DashboardError::Chart(err.to_string()))?;
        self.live.insert(handle.id, rendered);
        Ok(handle)
    }

    fn destroy(&mut self, handle: &ChartHandle) {
        self.live.remove(&handle.id);
    }

    fn view(&self, handle: &ChartHandle) -> Option<&str> {
        self.live.get(&handle.id).map(String::as_str)
    }

    fn live_charts(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartData, ChartKind, ChartOptions, Dataset, LegendPosition, Paint};

    fn doughnut() -> ChartConfig {
        ChartConfig {
            kind: ChartKind::Doughnut,
            data: ChartData {
                labels: vec!["yes".to_string()],
                datasets: vec![Dataset::new(
                    vec![3],
                    Paint::Each(vec!["#0d6efd".to_string()]),
                )],
            },
            options: ChartOptions::with_legend(LegendPosition::Bottom),
        }
    }

    #[test]
    fn document_uses_chart_js_field_names() {
        let mut backend = JsonBackend::new();
        let handle = backend.create(Slot::Distribution, &doughnut()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(backend.view(&handle).unwrap()).unwrap();

        assert_eq!(value["mount"], "responseDistChart");
        assert_eq!(value["chart"]["type"], "doughnut");
        assert_eq!(
            value["chart"]["data"]["datasets"][0]["backgroundColor"][0],
            "#0d6efd"
        );
        assert_eq!(value["chart"]["options"]["maintainAspectRatio"], false);
        assert_eq!(value["chart"]["options"]["plugins"]["legend"]["position"], "bottom");
        assert!(value["chart"]["options"].get("scales").is_none());
    }

    #[test]
    fn destroy_drops_the_document() {
        let mut backend = JsonBackend::new();
        let handle = backend.create(Slot::Distribution, &doughnut()).unwrap();
        assert_eq!(backend.live_charts(), 1);
        backend.destroy(&handle);
        assert_eq!(backend.live_charts(), 0);
        assert!(backend.view(&handle).is_none());
    }
}
