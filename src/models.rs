use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{DashboardError, DashboardResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Overview {
    pub total_sent: u64,
    pub total_responded: u64,
    pub response_rate: f64,
    pub avg_response_time_minutes: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseSeries {
    pub labels: Vec<String>,
    pub sent: Vec<u64>,
    pub responded: Vec<u64>,
}

impl ResponseSeries {
    /// Index `i` of every sequence must describe the same period.
    pub fn validate(&self) -> DashboardResult<()> {
        let labels = self.labels.len();
        if self.sent.len() != labels || self.responded.len() != labels {
            return Err(DashboardError::MisalignedSeries {
                labels,
                sent: self.sent.len(),
                responded: self.responded.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseDistribution {
    pub messages: Vec<MessageResponses>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponses {
    pub responses: IndexMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityHeatmap {
    pub data: Vec<HeatmapPoint>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HeatmapPoint {
    pub day: i64,
    pub hour: i64,
    pub count: u64,
}
