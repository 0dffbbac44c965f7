//! Horizontal bar widget, used for both the bar charts and the pie charts.
//!
//! Ratatui's `BarChart` only takes `u64` values, and profit bars can be
//! negative, so bars are drawn straight into the buffer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// One bar: label, value, colour and an optional trailing annotation (e.g. a share).
#[derive(Debug, Clone)]
pub struct BarRow {
    pub label: String,
    pub value: f64,
    pub color: Color,
    pub note: Option<String>,
}

pub struct HBars<'a> {
    pub rows: &'a [BarRow],
    pub fmt_value: fn(f64) -> String,
}

impl<'a> Widget for HBars<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 12 || area.height == 0 {
            return;
        }

        let label_width = self
            .rows
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0)
            .min(area.width as usize / 3) as u16;

        let texts: Vec<String> = self
            .rows
            .iter()
            .map(|r| match &r.note {
                Some(note) => format!("{} {note}", (self.fmt_value)(r.value)),
                None => (self.fmt_value)(r.value),
            })
            .collect();
        let text_width = texts.iter().map(|t| t.chars().count()).max().unwrap_or(0) as u16;

        let bar_x = area.x + label_width + 1;
        let bar_width = area.width.saturating_sub(label_width + text_width + 2);
        let max_abs = self
            .rows
            .iter()
            .map(|r| r.value.abs())
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);

        for (i, (row, text)) in self.rows.iter().zip(&texts).enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }

            buf.set_stringn(
                area.x,
                y,
                &row.label,
                label_width as usize,
                Style::default().fg(Color::Gray),
            );

            let len = if max_abs > 0.0 && row.value.is_finite() {
                ((row.value.abs() / max_abs) * bar_width as f64).round() as u16
            } else {
                0
            };
            let (glyph, style) = if row.value < 0.0 {
                ("▒", Style::default().fg(row.color).add_modifier(Modifier::DIM))
            } else {
                ("█", Style::default().fg(row.color))
            };
            buf.set_string(bar_x, y, glyph.repeat(len as usize), style);
            buf.set_string(bar_x + len + 1, y, text, Style::default().fg(Color::White));
        }
    }
}
