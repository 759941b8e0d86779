use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DashboardResult;

/// Source of the precomputed statistics. Loaders only ever talk to this.
#[allow(async_fn_in_trait)]
pub trait StatsApi {
    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> DashboardResult<T>;
}

pub enum Endpoint {
    Overview,
    ResponseOverTime,
    ResponseDistribution,
    ActivityHeatmap,
}

impl Endpoint {
    /// Path and query for this endpoint. The distribution is not windowed.
    pub fn path(&self, days: u32) -> String {
        match self {
            Endpoint::Overview => format!("/stats/api/overview?days={days}"),
            Endpoint::ResponseOverTime => format!("/stats/api/response-over-time?days={days}"),
            Endpoint::ResponseDistribution => "/stats/api/response-distribution".to_string(),
            Endpoint::ActivityHeatmap => format!("/stats/api/activity-heatmap?days={days}"),
        }
    }
}

pub struct HttpStatsClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStatsClient {
    pub fn new(base_url: &str) -> DashboardResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stats-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl StatsApi for HttpStatsClient {
    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> DashboardResult<T> {
        let url = self.url(path);
        debug!(%url, "fetching");
        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}
