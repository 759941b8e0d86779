use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::charts::{ChartBackend, ChartConfig, ChartHandle};
use crate::client::{Endpoint, StatsApi};
use crate::error::DashboardResult;
use crate::models::{ActivityHeatmap, Overview, ResponseDistribution, ResponseSeries};
use crate::page::{Page, Slot, TextTarget};
use crate::report::PageSnapshot;
use crate::shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered,
    /// The page has no mount for this chart; nothing was drawn.
    NoMount,
    /// A newer request for the same region was issued while this one was in flight.
    Stale,
}

#[derive(Debug, Default)]
enum SlotState {
    #[default]
    Empty,
    Rendered(ChartHandle),
}

/// One chart region: its live instance, if any, and the latest request ticket.
#[derive(Debug, Default)]
pub struct ChartSlot {
    state: SlotState,
    generation: u64,
}

impl ChartSlot {
    fn ticket(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation == ticket
    }

    /// Tears down the previous instance before the new one is created.
    fn replace<B: ChartBackend>(
        &mut self,
        backend: &mut B,
        slot: Slot,
        config: &ChartConfig,
    ) -> DashboardResult<()> {
        if let SlotState::Rendered(previous) = std::mem::take(&mut self.state) {
            debug!(chart = %previous.id, mount = previous.slot.mount_id(), "destroying chart");
            backend.destroy(&previous);
        }
        let handle = backend.create(slot, config)?;
        self.state = SlotState::Rendered(handle);
        Ok(())
    }

    pub fn handle(&self) -> Option<&ChartHandle> {
        match &self.state {
            SlotState::Empty => None,
            SlotState::Rendered(handle) => Some(handle),
        }
    }
}

#[derive(Debug)]
pub struct LoadReport {
    pub overview: DashboardResult<LoadOutcome>,
    pub response_over_time: DashboardResult<LoadOutcome>,
    pub distribution: DashboardResult<LoadOutcome>,
    pub heatmap: DashboardResult<LoadOutcome>,
}

impl LoadReport {
    fn entries(&self) -> [(&'static str, &DashboardResult<LoadOutcome>); 4] {
        [
            ("overview", &self.overview),
            ("response-over-time", &self.response_over_time),
            ("response-distribution", &self.distribution),
            ("activity-heatmap", &self.heatmap),
        ]
    }

    pub fn failures(&self) -> usize {
        self.entries()
            .iter()
            .filter(|(_, result)| result.is_err())
            .count()
    }

    fn log(&self) {
        for (loader, result) in self.entries() {
            match result {
                Ok(outcome) => debug!(loader, ?outcome, "loader finished"),
                Err(err) => warn!(loader, error = %err, "loader failed; region left as it was"),
            }
        }
    }
}

pub struct Dashboard<S, B> {
    source: S,
    page: RefCell<Page>,
    backend: RefCell<B>,
    slots: RefCell<BTreeMap<Slot, ChartSlot>>,
    overview_generation: Cell<u64>,
    refreshed_at: Cell<Option<DateTime<Utc>>>,
}

impl<S: StatsApi, B: ChartBackend> Dashboard<S, B> {
    pub fn new(source: S, page: Page, backend: B) -> Self {
        Self {
            source,
            page: RefCell::new(page),
            backend: RefCell::new(backend),
            slots: RefCell::new(
                Slot::ALL
                    .into_iter()
                    .map(|slot| (slot, ChartSlot::default()))
                    .collect(),
            ),
            overview_generation: Cell::new(0),
            refreshed_at: Cell::new(None),
        }
    }

    pub fn page(&self) -> Ref<'_, Page> {
        self.page.borrow()
    }

    #[cfg(test)]
    pub fn handle(&self, slot: Slot) -> Option<ChartHandle> {
        self.slots
            .borrow()
            .get(&slot)
            .and_then(ChartSlot::handle)
            .cloned()
    }

    pub fn live_charts(&self) -> usize {
        self.backend.borrow().live_charts()
    }

    /// Page-ready event.
    pub async fn on_ready(&self) -> LoadReport {
        let days = self.page.borrow().days();
        info!(days, "page ready, loading dashboard");
        self.load_all().await
    }

    /// Change event of the days selector. `None` when the page has no selector.
    pub async fn on_filter_change(&self, days: u32) -> Option<LoadReport> {
        let selected = self.page.borrow_mut().select_days(days);
        if !selected {
            warn!(days, "page has no days filter; ignoring change");
            return None;
        }
        info!(days, "days filter changed, reloading dashboard");
        Some(self.load_all().await)
    }

    /// Runs the four loaders concurrently. Failures are logged, never returned as errors.
    pub async fn load_all(&self) -> LoadReport {
        let (overview, response_over_time, distribution, heatmap) = tokio::join!(
            self.load_overview(),
            self.load_response_over_time(),
            self.load_response_distribution(),
            self.load_heatmap(),
        );
        let report = LoadReport {
            overview,
            response_over_time,
            distribution,
            heatmap,
        };
        report.log();
        self.refreshed_at.set(Some(Utc::now()));
        report
    }

    pub async fn load_overview(&self) -> DashboardResult<LoadOutcome> {
        let days = self.page.borrow().days();
        let ticket = self.overview_generation.get() + 1;
        self.overview_generation.set(ticket);

        let overview: Overview = self
            .source
            .fetch_json(&Endpoint::Overview.path(days))
            .await?;

        if self.overview_generation.get() != ticket {
            debug!(days, "discarding stale overview");
            return Ok(LoadOutcome::Stale);
        }

        let mut page = self.page.borrow_mut();
        for (target, text) in shape::format_overview(&overview) {
            page.set_text(target, text)?;
        }
        Ok(LoadOutcome::Rendered)
    }

    pub async fn load_response_over_time(&self) -> DashboardResult<LoadOutcome> {
        let days = self.page.borrow().days();
        self.load_chart(
            Slot::ResponseOverTime,
            Endpoint::ResponseOverTime.path(days),
            |series: ResponseSeries| {
                series.validate()?;
                Ok(shape::response_over_time_chart(&series))
            },
        )
        .await
    }

    pub async fn load_response_distribution(&self) -> DashboardResult<LoadOutcome> {
        let days = self.page.borrow().days();
        self.load_chart(
            Slot::Distribution,
            Endpoint::ResponseDistribution.path(days),
            |distribution: ResponseDistribution| {
                let totals = shape::aggregate_distribution(&distribution.messages);
                Ok(shape::distribution_chart(&totals))
            },
        )
        .await
    }

    pub async fn load_heatmap(&self) -> DashboardResult<LoadOutcome> {
        let days = self.page.borrow().days();
        self.load_chart(
            Slot::Heatmap,
            Endpoint::ActivityHeatmap.path(days),
            |heatmap: ActivityHeatmap| {
                let grid = shape::densify_heatmap(&heatmap.data)?;
                Ok(shape::heatmap_chart(&grid))
            },
        )
        .await
    }

    async fn load_chart<T, F>(&self, slot: Slot, path: String, build: F) -> DashboardResult<LoadOutcome>
    where
        T: DeserializeOwned,
        F: FnOnce(T) -> DashboardResult<ChartConfig>,
    {
        let ticket = self
            .slots
            .borrow_mut()
            .entry(slot)
            .or_default()
            .ticket();

        let body: T = self.source.fetch_json(&path).await?;

        if !self.page.borrow().has_mount(slot) {
            debug!(mount = slot.mount_id(), "mount absent, skipping chart");
            return Ok(LoadOutcome::NoMount);
        }

        let mut slots = self.slots.borrow_mut();
        let chart_slot = slots.entry(slot).or_default();
        if !chart_slot.is_current(ticket) {
            debug!(mount = slot.mount_id(), %path, "discarding stale response");
            return Ok(LoadOutcome::Stale);
        }

        let config = build(body)?;
        chart_slot.replace(&mut *self.backend.borrow_mut(), slot, &config)?;
        info!(mount = slot.mount_id(), points = config.data.labels.len(), "chart rendered");
        Ok(LoadOutcome::Rendered)
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let page = self.page.borrow();
        let slots = self.slots.borrow();
        let backend = self.backend.borrow();

        let texts = TextTarget::ALL
            .into_iter()
            .filter_map(|target| page.text(target).map(|text| (target, text.to_string())))
            .collect();
        let charts = Slot::ALL
            .into_iter()
            .filter_map(|slot| {
                let handle = slots.get(&slot)?.handle()?;
                let view = backend.view(handle)?;
                Some((slot, view.to_string()))
            })
            .collect();

        PageSnapshot {
            days: page.days(),
            refreshed_at: self.refreshed_at.get(),
            texts,
            charts,
        }
    }
}
