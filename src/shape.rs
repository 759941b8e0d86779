use indexmap::IndexMap;

use crate::charts::{
    Axis, ChartConfig, ChartData, ChartKind, ChartOptions, Dataset, LegendPosition, Paint, Scales,
    Ticks,
};
use crate::error::{DashboardError, DashboardResult};
use crate::models::{HeatmapPoint, MessageResponses, Overview, ResponseSeries};
use crate::page::TextTarget;

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub const HOURS: usize = 24;

pub const PALETTE: [&str; 6] = [
    "#0d6efd", "#198754", "#ffc107", "#dc3545", "#6f42c1", "#0dcaf0",
];

const SENT_BORDER: &str = "#0d6efd";
const SENT_FILL: &str = "rgba(13, 110, 253, 0.1)";
const RESPONDED_BORDER: &str = "#198754";
const RESPONDED_FILL: &str = "rgba(25, 135, 84, 0.1)";
const LINE_TENSION: f64 = 0.3;
const MAX_TIME_TICKS: usize = 10;
const MAX_TICK_ROTATION: u32 = 45;

/// Counts per weekday (Monday first) and hour of day.
pub type HeatmapGrid = [[u64; HOURS]; 7];

pub fn format_overview(overview: &Overview) -> [(TextTarget, String); 4] {
    [
        (TextTarget::Sent, overview.total_sent.to_string()),
        (TextTarget::Responded, overview.total_responded.to_string()),
        (TextTarget::Rate, format!("{}%", overview.response_rate)),
        (
            TextTarget::Time,
            format!("{} min", overview.avg_response_time_minutes),
        ),
    ]
}

/// Sums every message's breakdown per category, keeping first-appearance order.
pub fn aggregate_distribution(messages: &[MessageResponses]) -> IndexMap<String, u64> {
    let mut totals: IndexMap<String, u64> = IndexMap::new();

    for message in messages {
        for (category, count) in message.responses.iter() {
            *totals.entry(category.clone()).or_insert(0) += count;
        }
    }

    totals
}

/// Palette colours for `count` categories; the palette repeats past its end.
pub fn palette_colors(count: usize) -> Vec<String> {
    (0..count)
        .map(|index| PALETTE[index % PALETTE.len()].to_string())
        .collect()
}

pub fn densify_heatmap(points: &[HeatmapPoint]) -> DashboardResult<HeatmapGrid> {
    let mut grid = [[0u64; HOURS]; 7];

    for point in points {
        if !(0..WEEKDAYS.len() as i64).contains(&point.day)
            || !(0..HOURS as i64).contains(&point.hour)
        {
            return Err(DashboardError::CellOutOfRange {
                day: point.day,
                hour: point.hour,
            });
        }
        grid[point.day as usize][point.hour as usize] = point.count;
    }

    Ok(grid)
}

pub fn hour_labels() -> Vec<String> {
    (0..HOURS).map(|hour| format!("{hour:02}:00")).collect()
}

fn zero_based_integer_axis() -> Axis {
    Axis {
        begin_at_zero: Some(true),
        stacked: None,
        ticks: Some(Ticks {
            step_size: Some(1),
            ..Ticks::default()
        }),
    }
}

fn filled_line(label: &str, data: Vec<u64>, border: &str, fill: &str) -> Dataset {
    let mut dataset = Dataset::new(data, Paint::Single(fill.to_string())).labelled(label);
    dataset.border_color = Some(border.to_string());
    dataset.fill = Some(true);
    dataset.tension = Some(LINE_TENSION);
    dataset
}

pub fn response_over_time_chart(series: &ResponseSeries) -> ChartConfig {
    let mut options = ChartOptions::with_legend(LegendPosition::Top);
    options.scales = Some(Scales {
        x: Axis {
            ticks: Some(Ticks {
                max_ticks_limit: Some(MAX_TIME_TICKS),
                max_rotation: Some(MAX_TICK_ROTATION),
                ..Ticks::default()
            }),
            ..Axis::default()
        },
        y: zero_based_integer_axis(),
    });

    ChartConfig {
        kind: ChartKind::Line,
        data: ChartData {
            labels: series.labels.clone(),
            datasets: vec![
                filled_line("Sent", series.sent.clone(), SENT_BORDER, SENT_FILL),
                filled_line(
                    "Responded",
                    series.responded.clone(),
                    RESPONDED_BORDER,
                    RESPONDED_FILL,
                ),
            ],
        },
        options,
    }
}

pub fn distribution_chart(totals: &IndexMap<String, u64>) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Doughnut,
        data: ChartData {
            labels: totals.keys().cloned().collect(),
            datasets: vec![Dataset::new(
                totals.values().copied().collect(),
                Paint::Each(palette_colors(totals.len())),
            )],
        },
        options: ChartOptions::with_legend(LegendPosition::Bottom),
    }
}

pub fn heatmap_chart(grid: &HeatmapGrid) -> ChartConfig {
    let datasets = WEEKDAYS
        .iter()
        .zip(grid.iter())
        .enumerate()
        .map(|(index, (name, hours))| {
            let alpha = 0.15 + index as f64 * 0.1;
            Dataset::new(
                hours.to_vec(),
                Paint::Single(format!("rgba(13, 110, 253, {alpha:.2})")),
            )
            .labelled(*name)
        })
        .collect();

    let mut y = zero_based_integer_axis();
    y.stacked = Some(true);
    let mut options = ChartOptions::with_legend(LegendPosition::Top);
    options.scales = Some(Scales {
        x: Axis {
            stacked: Some(true),
            ..Axis::default()
        },
        y,
    });

    ChartConfig {
        kind: ChartKind::Bar,
        data: ChartData {
            labels: hour_labels(),
            datasets,
        },
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(pairs: &[(&str, u64)]) -> MessageResponses {
        MessageResponses {
            responses: pairs
                .iter()
                .map(|(category, count)| (category.to_string(), *count))
                .collect(),
        }
    }

    #[test]
    fn overview_text_matches_display_format() {
        let overview = Overview {
            total_sent: 12,
            total_responded: 4,
            response_rate: 33.3,
            avg_response_time_minutes: 7.5,
        };
        let texts = format_overview(&overview);
        assert_eq!(texts[0], (TextTarget::Sent, "12".to_string()));
        assert_eq!(texts[1], (TextTarget::Responded, "4".to_string()));
        assert_eq!(texts[2], (TextTarget::Rate, "33.3%".to_string()));
        assert_eq!(texts[3], (TextTarget::Time, "7.5 min".to_string()));
    }

    #[test]
    fn whole_numbers_print_without_fraction() {
        let overview = Overview {
            total_sent: 0,
            total_responded: 0,
            response_rate: 0.0,
            avg_response_time_minutes: 0.0,
        };
        let texts = format_overview(&overview);
        assert_eq!(texts[2].1, "0%");
        assert_eq!(texts[3].1, "0 min");
    }

    #[test]
    fn aggregation_sums_per_category() {
        let totals = aggregate_distribution(&[message(&[("a", 2), ("b", 1)]), message(&[("a", 3)])]);
        assert_eq!(totals.get("a"), Some(&5));
        assert_eq!(totals.get("b"), Some(&1));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn aggregation_ignores_entity_order() {
        let forward = aggregate_distribution(&[message(&[("a", 2), ("b", 1)]), message(&[("a", 3)])]);
        let reverse = aggregate_distribution(&[message(&[("a", 3)]), message(&[("a", 2), ("b", 1)])]);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn aggregation_keeps_first_appearance_order() {
        let totals = aggregate_distribution(&[message(&[("later", 1)]), message(&[("first", 1), ("later", 1)])]);
        let keys: Vec<&String> = totals.keys().collect();
        assert_eq!(keys, vec!["later", "first"]);
    }

    #[test]
    fn palette_cycles_past_its_end() {
        let colors = palette_colors(8);
        assert_eq!(colors.len(), 8);
        assert_eq!(colors[6], PALETTE[0]);
        assert_eq!(colors[7], PALETTE[1]);
        assert_eq!(palette_colors(2), vec!["#0d6efd", "#198754"]);
    }

    #[test]
    fn densify_places_single_point() {
        let grid = densify_heatmap(&[HeatmapPoint {
            day: 0,
            hour: 9,
            count: 4,
        }])
        .unwrap();
        let cells: usize = grid.iter().map(|row| row.len()).sum();
        assert_eq!(cells, 168);
        assert_eq!(grid[0][9], 4);
        let total: u64 = grid.iter().flatten().sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn densify_last_write_wins() {
        let grid = densify_heatmap(&[
            HeatmapPoint { day: 2, hour: 5, count: 1 },
            HeatmapPoint { day: 2, hour: 5, count: 6 },
        ])
        .unwrap();
        assert_eq!(grid[2][5], 6);
    }

    #[test]
    fn densify_rejects_out_of_range_points() {
        let err = densify_heatmap(&[HeatmapPoint { day: 7, hour: 0, count: 1 }]).unwrap_err();
        assert!(matches!(err, DashboardError::CellOutOfRange { day: 7, hour: 0 }));
        assert!(densify_heatmap(&[HeatmapPoint { day: 0, hour: -1, count: 1 }]).is_err());
        assert!(densify_heatmap(&[HeatmapPoint { day: 0, hour: 24, count: 1 }]).is_err());
    }

    #[test]
    fn hour_labels_are_two_digit() {
        let labels = hour_labels();
        assert_eq!(labels.len(), 24);
        assert_eq!(labels[0], "00:00");
        assert_eq!(labels[9], "09:00");
        assert_eq!(labels[23], "23:00");
    }

    #[test]
    fn time_series_chart_keeps_alignment() {
        let series = ResponseSeries {
            labels: vec!["2026-10-01".to_string(), "2026-10-02".to_string(), "2026-10-03".to_string()],
            sent: vec![3, 0, 5],
            responded: vec![1, 0, 2],
        };
        let config = response_over_time_chart(&series);
        assert_eq!(config.kind, ChartKind::Line);
        assert_eq!(config.data.labels.len(), 3);
        assert_eq!(config.data.datasets.len(), 2);
        assert!(config.data.datasets.iter().all(|dataset| dataset.data.len() == 3));

        let scales = config.options.scales.unwrap();
        let x_ticks = scales.x.ticks.unwrap();
        assert_eq!(x_ticks.max_ticks_limit, Some(10));
        assert_eq!(x_ticks.max_rotation, Some(45));
        assert_eq!(scales.y.begin_at_zero, Some(true));
        assert_eq!(scales.y.ticks.unwrap().step_size, Some(1));
    }

    #[test]
    fn distribution_chart_colours_each_category() {
        let totals = aggregate_distribution(&[message(&[("yes", 4), ("no", 2), ("maybe", 1)])]);
        let config = distribution_chart(&totals);
        assert_eq!(config.data.labels, vec!["yes", "no", "maybe"]);
        assert_eq!(config.data.datasets[0].data, vec![4, 2, 1]);
        assert_eq!(
            config.data.datasets[0].background_color,
            Paint::Each(palette_colors(3))
        );
        assert_eq!(config.options.plugins.legend.position, LegendPosition::Bottom);
    }

    #[test]
    fn heatmap_chart_has_a_series_per_weekday() {
        let grid = densify_heatmap(&[HeatmapPoint { day: 6, hour: 23, count: 2 }]).unwrap();
        let config = heatmap_chart(&grid);
        assert_eq!(config.kind, ChartKind::Bar);
        assert_eq!(config.data.labels.len(), 24);
        assert_eq!(config.data.datasets.len(), 7);
        assert!(config.data.datasets.iter().all(|dataset| dataset.data.len() == 24));
        assert_eq!(config.data.datasets[6].label.as_deref(), Some("Sun"));
        assert_eq!(config.data.datasets[6].data[23], 2);
        assert_eq!(
            config.data.datasets[0].background_color,
            Paint::Single("rgba(13, 110, 253, 0.15)".to_string())
        );

        let scales = config.options.scales.unwrap();
        assert_eq!(scales.x.stacked, Some(true));
        assert_eq!(scales.y.stacked, Some(true));
        assert_eq!(scales.y.begin_at_zero, Some(true));
    }
}
