use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::page::{Slot, TextTarget};

/// Everything currently shown on the page.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub days: u32,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub texts: Vec<(TextTarget, String)>,
    pub charts: Vec<(Slot, String)>,
}

pub fn build_report(snapshot: &PageSnapshot) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Response Statistics");
    match snapshot.refreshed_at {
        Some(at) => {
            let _ = writeln!(
                output,
                "Last {} days (refreshed {})",
                snapshot.days,
                at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        None => {
            let _ = writeln!(output, "Last {} days (not loaded yet)", snapshot.days);
        }
    }
    let _ = writeln!(output);

    if !snapshot.texts.is_empty() {
        let caption_width = snapshot
            .texts
            .iter()
            .map(|(target, _)| target.caption().len())
            .max()
            .unwrap_or(0);
        for (target, text) in snapshot.texts.iter() {
            let _ = writeln!(output, "{:<caption_width$}  {}", target.caption(), text);
        }
        let _ = writeln!(output);
    }

    for (_, view) in snapshot.charts.iter() {
        let _ = writeln!(output, "{}", view.trim_end());
        let _ = writeln!(output);
    }

    output
}

/// JSON document of the page. Chart views that are themselves JSON are embedded as values.
pub fn build_json(snapshot: &PageSnapshot) -> serde_json::Result<String> {
    let overview: Map<String, Value> = snapshot
        .texts
        .iter()
        .map(|(target, text)| (target.element_id().to_string(), Value::String(text.clone())))
        .collect();
    let charts: Vec<Value> = snapshot
        .charts
        .iter()
        .map(|(slot, view)| {
            serde_json::from_str(view).unwrap_or_else(|_| {
                json!({"mount": slot.mount_id(), "text": view})
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "days": snapshot.days,
        "refreshed_at": snapshot.refreshed_at,
        "overview": overview,
        "charts": charts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> PageSnapshot {
        PageSnapshot {
            days: 7,
            refreshed_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).single(),
            texts: vec![
                (TextTarget::Sent, "12".to_string()),
                (TextTarget::Rate, "50%".to_string()),
            ],
            charts: vec![(
                Slot::Distribution,
                r#"{"mount":"responseDistChart","chart":{"type":"doughnut"}}"#.to_string(),
            )],
        }
    }

    #[test]
    fn text_report_lists_overview_and_charts() {
        let report = build_report(&sample());
        assert!(report.contains("Last 7 days (refreshed 2026-10-18 09:30:00 UTC)"));
        assert!(report.contains("Sent           12"));
        assert!(report.contains("Response rate  50%"));
        assert!(report.contains("responseDistChart"));
    }

    #[test]
    fn unloaded_page_says_so() {
        let mut snapshot = sample();
        snapshot.refreshed_at = None;
        snapshot.charts.clear();
        let report = build_report(&snapshot);
        assert!(report.contains("not loaded yet"));
    }

    #[test]
    fn json_report_embeds_chart_documents() {
        let mut snapshot = sample();
        snapshot
            .charts
            .push((Slot::Heatmap, "Activity\n--------\n".to_string()));
        let value: Value = serde_json::from_str(&build_json(&snapshot).unwrap()).unwrap();

        assert_eq!(value["days"], 7);
        assert_eq!(value["overview"]["stat-sent"], "12");
        assert_eq!(value["charts"][0]["chart"]["type"], "doughnut");
        assert_eq!(value["charts"][1]["mount"], "heatmapChart");
    }
}
