use std::collections::HashMap;
use std::fmt::Write;

use uuid::Uuid;

use super::{ChartBackend, ChartConfig, ChartHandle, ChartKind, Dataset, Paint};
use crate::error::DashboardResult;
use crate::page::Slot;

const BAR_WIDTH: usize = 32;
const LINE_GLYPHS: [char; 2] = ['░', '█'];
const SHADES: [char; 5] = ['.', '░', '▒', '▓', '█'];
const HOUR_TICK_EVERY: usize = 3;

/// Draws charts as plain text blocks for a terminal.
#[derive(Debug, Default)]
pub struct TerminalBackend {
    live: HashMap<Uuid, String>,
}

impl TerminalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartBackend for TerminalBackend {
    fn create(&mut self, slot: Slot, config: &ChartConfig) -> DashboardResult<ChartHandle> {
        let handle = ChartHandle::new(slot);
        self.live.insert(handle.id, render(slot.title(), config));
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

pub fn render(title: &str, config: &ChartConfig) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{title}");
    let _ = writeln!(output, "{}", "-".repeat(title.chars().count()));

    if config.data.datasets.iter().all(|dataset| dataset.data.is_empty()) {
        let _ = writeln!(output, "No data for this window.");
        return output;
    }

    match config.kind {
        ChartKind::Line => render_lines(&mut output, config),
        ChartKind::Doughnut => render_doughnut(&mut output, config),
        ChartKind::Bar => render_grid(&mut output, config),
    }
    output
}

fn peak(datasets: &[Dataset]) -> u64 {
    datasets
        .iter()
        .flat_map(|dataset| dataset.data.iter().copied())
        .max()
        .unwrap_or(0)
}

fn scaled(value: u64, peak: u64, width: usize) -> usize {
    if peak == 0 {
        return 0;
    }
    let cells = (value * width as u64).div_ceil(peak) as usize;
    cells.min(width)
}

fn dataset_name(dataset: &Dataset, index: usize) -> String {
    dataset
        .label
        .clone()
        .unwrap_or_else(|| format!("series {}", index + 1))
}

fn render_lines(output: &mut String, config: &ChartConfig) {
    let labels = &config.data.labels;
    let datasets = &config.data.datasets;
    let max_ticks = config
        .options
        .scales
        .as_ref()
        .and_then(|scales| scales.x.ticks.as_ref())
        .and_then(|ticks| ticks.max_ticks_limit)
        .unwrap_or(labels.len())
        .max(1);
    let stride = labels.len().div_ceil(max_ticks).max(1);
    let label_width = labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);
    let names: Vec<String> = datasets
        .iter()
        .enumerate()
        .map(|(index, dataset)| dataset_name(dataset, index))
        .collect();
    let peak = peak(datasets);

    let _ = write!(output, "{:label_width$}", "");
    for name in names.iter() {
        let _ = write!(output, "  {name:>6}");
    }
    let _ = writeln!(output);

    for (row, label) in labels.iter().enumerate() {
        let shown = if row % stride == 0 { label.as_str() } else { "" };
        let _ = write!(output, "{shown:label_width$}");

        let mut cells = vec![' '; BAR_WIDTH];
        for (index, (dataset, name)) in datasets.iter().zip(names.iter()).enumerate() {
            let value = dataset.data.get(row).copied().unwrap_or(0);
            let width = name.chars().count().max(6);
            let _ = write!(output, "  {value:>width$}");

            let glyph = LINE_GLYPHS[index % LINE_GLYPHS.len()];
            for cell in cells.iter_mut().take(scaled(value, peak, BAR_WIDTH)) {
                *cell = glyph;
            }
        }
        let bar: String = cells.into_iter().collect();
        let _ = writeln!(output, "  {}", bar.trim_end());
    }
}

fn render_doughnut(output: &mut String, config: &ChartConfig) {
    let Some(dataset) = config.data.datasets.first() else {
        return;
    };
    let total: u64 = dataset.data.iter().sum();
    let label_width = config
        .data
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0);

    for (index, label) in config.data.labels.iter().enumerate() {
        let value = dataset.data.get(index).copied().unwrap_or(0);
        let share = if total == 0 {
            0.0
        } else {
            value as f64 / total as f64 * 100.0
        };
        let color = match &dataset.background_color {
            Paint::Single(color) => color.as_str(),
            Paint::Each(colors) => colors.get(index).map(String::as_str).unwrap_or(""),
        };
        let _ = writeln!(
            output,
            "{label:<label_width$}  {value:>6}  {share:>5.1}%  {color}"
        );
    }
    let _ = writeln!(output, "{:<label_width$}  {total:>6}", "total");
}

fn render_grid(output: &mut String, config: &ChartConfig) {
    let columns = &config.data.labels;
    let datasets = &config.data.datasets;
    let names: Vec<String> = datasets
        .iter()
        .enumerate()
        .map(|(index, dataset)| dataset_name(dataset, index))
        .collect();
    let name_width = names.iter().map(|name| name.chars().count()).max().unwrap_or(0);
    let peak = peak(datasets);

    let _ = write!(output, "{:name_width$} ", "");
    for label in columns.iter().step_by(HOUR_TICK_EVERY) {
        let tick: String = label.chars().take(2).collect();
        let _ = write!(output, "{:<width$}", tick, width = HOUR_TICK_EVERY * 2);
    }
    let _ = writeln!(output);

    for (dataset, name) in datasets.iter().zip(names.iter()) {
        let _ = write!(output, "{name:<name_width$} ");
        for column in 0..columns.len() {
            let value = dataset.data.get(column).copied().unwrap_or(0);
            let shade = SHADES[shade_index(value, peak)];
            let _ = write!(output, "{shade}{shade}");
        }
        let total: u64 = dataset.data.iter().sum();
        let _ = writeln!(output, "  {total}");
    }
    let _ = writeln!(output, "peak {peak} per cell");
}

fn shade_index(value: u64, peak: u64) -> usize {
    if value == 0 || peak == 0 {
        return 0;
    }
    scaled(value, peak, SHADES.len() - 1).max(1)
}
