use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DashboardError, DashboardResult};

pub const DEFAULT_DAYS: u32 = 30;

/// One of the three independently managed chart regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    ResponseOverTime,
    Distribution,
    Heatmap,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::ResponseOverTime, Slot::Distribution, Slot::Heatmap];

    pub fn mount_id(&self) -> &'static str {
        match self {
            Slot::ResponseOverTime => "responseOverTimeChart",
            Slot::Distribution => "responseDistChart",
            Slot::Heatmap => "heatmapChart",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Slot::ResponseOverTime => "Responses over time",
            Slot::Distribution => "Response distribution",
            Slot::Heatmap => "Activity by weekday and hour",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TextTarget {
    Sent,
    Responded,
    Rate,
    Time,
}

impl TextTarget {
    pub const ALL: [TextTarget; 4] = [
        TextTarget::Sent,
        TextTarget::Responded,
        TextTarget::Rate,
        TextTarget::Time,
    ];

    pub fn element_id(&self) -> &'static str {
        match self {
            TextTarget::Sent => "stat-sent",
            TextTarget::Responded => "stat-responded",
            TextTarget::Rate => "stat-rate",
            TextTarget::Time => "stat-time",
        }
    }

    pub fn caption(&self) -> &'static str {
        match self {
            TextTarget::Sent => "Sent",
            TextTarget::Responded => "Responded",
            TextTarget::Rate => "Response rate",
            TextTarget::Time => "Avg response time",
        }
    }
}

/// The elements the dashboard writes into. Every element may be absent.
#[derive(Debug, Clone)]
pub struct Page {
    days_filter: Option<u32>,
    texts: BTreeMap<TextTarget, String>,
    mounts: BTreeSet<Slot>,
}

impl Page {
    /// A page carrying the filter control, every text target and every mount.
    pub fn full(days: u32) -> Self {
        Self {
            days_filter: Some(days),
            texts: TextTarget::ALL
                .into_iter()
                .map(|target| (target, String::new()))
                .collect(),
            mounts: Slot::ALL.into_iter().collect(),
        }
    }

    pub fn without_filter(mut self) -> Self {
        self.days_filter = None;
        self
    }

    pub fn without_mount(mut self, slot: Slot) -> Self {
        self.mounts.remove(&slot);
        self
    }

    pub fn without_text_target(mut self, target: TextTarget) -> Self {
        self.texts.remove(&target);
        self
    }

    /// Current filter value, read fresh on every load.
    pub fn days(&self) -> u32 {
        self.days_filter.unwrap_or(DEFAULT_DAYS)
    }

    /// Changes the filter control's value. Returns false when the page has no control.
    pub fn select_days(&mut self, days: u32) -> bool {
        match self.days_filter.as_mut() {
            Some(value) => {
                *value = days;
                true
            }
            None => false,
        }
    }

    pub fn has_mount(&self, slot: Slot) -> bool {
        self.mounts.contains(&slot)
    }

    pub fn set_text(&mut self, target: TextTarget, value: String) -> DashboardResult<()> {
        let slot = self
            .texts
            .get_mut(&target)
            .ok_or(DashboardError::MissingTarget(target.element_id()))?;
        *slot = value;
        Ok(())
    }

    pub fn text(&self, target: TextTarget) -> Option<&str> {
        self.texts.get(&target).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_defaults_without_filter() {
        let page = Page::full(7).without_filter();
        assert_eq!(page.days(), DEFAULT_DAYS);
    }

    #[test]
    fn select_days_needs_a_control() {
        let mut page = Page::full(30);
        assert!(page.select_days(7));
        assert_eq!(page.days(), 7);

        let mut bare = Page::full(30).without_filter();
        assert!(!bare.select_days(7));
        assert_eq!(bare.days(), DEFAULT_DAYS);
    }

    #[test]
    fn missing_text_target_is_an_error() {
        let mut page = Page::full(30).without_text_target(TextTarget::Rate);
        assert!(page.set_text(TextTarget::Sent, "4".to_string()).is_ok());
        let err = page
            .set_text(TextTarget::Rate, "50%".to_string())
            .unwrap_err();
        assert!(matches!(err, DashboardError::MissingTarget("stat-rate")));
    }

    #[test]
    fn mounts_can_be_removed() {
        let page = Page::full(30).without_mount(Slot::Heatmap);
        assert!(page.has_mount(Slot::ResponseOverTime));
        assert!(!page.has_mount(Slot::Heatmap));
    }
}
