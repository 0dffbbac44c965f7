//! ASCII/Unicode charts for terminal output.
//!
//! This is intentionally "dumb" (fixed widths), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Chart elements:
//! - bars: `#` for positive values, `-` for negative values
//! - time series: one Unicode block per column

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Longest label kept before truncation.
const MAX_LABEL: usize = 24;

/// Render one labelled horizontal bar per value, scaled to the largest magnitude.
///
/// Labels are padded to a common width so bars line up.
pub fn render_bars(labels: &[String], values: &[f64], width: usize) -> Vec<String> {
    let width = width.max(1);
    let label_width = labels
        .iter()
        .map(|l| l.chars().count().min(MAX_LABEL))
        .max()
        .unwrap_or(0);
    let max_abs = values
        .iter()
        .map(|v| v.abs())
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);

    labels
        .iter()
        .zip(values)
        .map(|(label, &v)| {
            let len = if max_abs > 0.0 && v.is_finite() {
                ((v.abs() / max_abs) * width as f64).round() as usize
            } else {
                0
            };
            let ch = if v < 0.0 { '-' } else { '#' };
            let bar: String = std::iter::repeat_n(ch, len).collect();
            let label = crate::report::format::truncate(label, MAX_LABEL);
            format!("{label:<label_width$} |{bar:<width$}|")
        })
        .collect()
}

/// Render a series as a single line of block characters, `width` columns wide.
///
/// Longer series are bucketed (mean per column); shorter ones use one column per point.
pub fn render_sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() {
        return "(no data)".to_string();
    }

    let columns = width.max(1).min(values.len());
    let buckets: Vec<f64> = (0..columns)
        .map(|c| {
            let start = c * values.len() / columns;
            let end = ((c + 1) * values.len() / columns).max(start + 1);
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect();

    let (min, max) = buckets
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = max - min;

    buckets
        .iter()
        .map(|&v| {
            let u = if span > 0.0 { (v - min) / span } else { 0.5 };
            let idx = (u * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_golden_snapshot_small() {
        let labels = vec!["Phones".to_string(), "Paper".to_string(), "Machines".to_string()];
        let values = vec![400.0, 100.0, -200.0];
        let bars = render_bars(&labels, &values, 8);
        assert_eq!(
            bars,
            vec![
                "Phones   |########|",
                "Paper    |##      |",
                "Machines |----    |",
            ]
        );
    }

    #[test]
    fn bars_all_zero() {
        let bars = render_bars(&["a".to_string()], &[0.0], 3);
        assert_eq!(bars, vec!["a |   |"]);
    }

    #[test]
    fn sparkline_levels() {
        assert_eq!(render_sparkline(&[], 10), "(no data)");
        assert_eq!(render_sparkline(&[1.0, 2.0, 3.0], 10), "▁▅█");
        assert_eq!(render_sparkline(&[5.0, 5.0], 10), "▅▅");
        assert_eq!(render_sparkline(&[0.0, 0.0, 10.0, 10.0], 2), "▁█");
    }
}
