use std::io::Write;

use pulse_core::{ChartSnapshot, PulseError, Result};

use crate::Renderer;

/// Block glyphs from lowest to highest, for the value sparklines.
const GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the count bars in the category table.
const BAR_WIDTH: usize = 24;

/// ANSI terminal chart: a value sparkline with rolling-average overlay on top,
/// the top-N category bars below — the classic two-panel live view, redrawn in
/// place at the scheduler's pace.
#[derive(Debug)]
pub struct TermRenderer {
    width: usize,
    show_last: bool,
}

impl TermRenderer {
    pub fn new(width: usize, show_last: bool) -> Self {
        Self {
            width: width.max(16),
            show_last,
        }
    }
}

impl Renderer for TermRenderer {
    fn render(&mut self, snapshot: &ChartSnapshot) -> Result<()> {
        let frame = draw_frame(snapshot, self.width, self.show_last);
        let mut out = std::io::stdout().lock();
        write!(out, "\x1b[2J\x1b[H{frame}")
            .and_then(|()| out.flush())
            .map_err(|e| PulseError::Render(format!("stdout write failed: {e}")))
    }
}

/// Build one complete frame. Pure — all terminal I/O stays in `render`.
pub fn draw_frame(snapshot: &ChartSnapshot, width: usize, show_last: bool) -> String {
    let mut frame = String::new();
    frame.push_str("pulse · live stream insights\n");
    frame.push_str(&"─".repeat(width));
    frame.push('\n');

    if snapshot.is_empty() {
        frame.push_str("waiting for data from the producer…\n");
        return frame;
    }

    let values: Vec<f64> = snapshot.history.iter().map(|p| p.value).collect();
    let averages: Vec<f64> = snapshot.rolling_avg.iter().map(|p| p.value).collect();
    let series_width = width.saturating_sub(18);

    let newest = values.last().copied().unwrap_or_default();
    frame.push_str(&format!(
        "value    {:<series_width$} {newest:>7.2}\n",
        sparkline(&values, series_width),
    ));

    let mut avg_line = format!(
        "rolling  {:<series_width$} {:>7.2}",
        sparkline(&averages, series_width),
        snapshot.current_avg.unwrap_or_default(),
    );
    if snapshot.stalled {
        avg_line.push_str("  [stalled]");
    }
    frame.push_str(&avg_line);
    frame.push('\n');

    frame.push('\n');
    frame.push_str("top categories\n");
    let max_count = snapshot
        .top_categories
        .iter()
        .map(|(_, c)| *c)
        .max()
        .unwrap_or(0);
    for (label, count) in &snapshot.top_categories {
        frame.push_str(&bar_row(label, *count, max_count));
        frame.push('\n');
    }

    if show_last {
        if let Some(last) = &snapshot.last {
            frame.push_str(&format!(
                "last: {} {} · {} · {:.2}\n",
                last.kind.tag(),
                last.timestamp.format("%H:%M:%S"),
                last.category,
                last.value,
            ));
        }
    }

    frame.push_str(&format!(
        "applied {} · dropped {} · synthetic {}\n",
        snapshot.applied, snapshot.dropped, snapshot.synthetic,
    ));
    frame
}

/// Map the last `width` values onto block glyphs scaled to the visible range.
/// A flat series renders as a mid-height line rather than collapsing to the
/// bottom.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }
    let tail = &values[values.len().saturating_sub(width)..];

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in tail {
        min = min.min(v);
        max = max.max(v);
    }
    let range = max - min;

    tail.iter()
        .map(|&v| {
            let idx = if range <= f64::EPSILON {
                GLYPHS.len() / 2
            } else {
                (((v - min) / range) * (GLYPHS.len() - 1) as f64).round() as usize
            };
            GLYPHS[idx.min(GLYPHS.len() - 1)]
        })
        .collect()
}

fn bar_row(label: &str, count: u64, max_count: u64) -> String {
    let filled = if max_count == 0 {
        0
    } else {
        ((count as f64 / max_count as f64) * BAR_WIDTH as f64).round() as usize
    };
    format!("  {label:<14} {:<BAR_WIDTH$} {count}", "█".repeat(filled))
}
