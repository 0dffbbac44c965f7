//! Terminal stand-in for the sales choropleth.
//!
//! Each placeable country gets a swatch shaded on a Plasma-like scale by its
//! sales, with sales and profit (the map's hover values) beside it. Countries
//! the map cannot place are left out.

use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
};

use crate::domain::{CountryTotals, key_label};
use crate::geo::split_recognized;
use crate::report::format_currency;

/// Plasma colour stops, dark to bright.
const PLASMA: [(u8, u8, u8); 5] = [
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

/// Linear interpolation along the Plasma stops; `t` is clamped to `[0, 1]`.
pub fn plasma(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (PLASMA.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(PLASMA.len() - 2);
    let f = scaled - i as f64;
    let (a, b) = (PLASMA[i], PLASMA[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Build the map table. Rows are listed by descending sales.
pub fn country_table<'a>(table: &[CountryTotals], title: &'a str) -> Table<'a> {
    let mut placed = split_recognized(table).placed;
    placed.sort_by(|a, b| b.sales.total_cmp(&a.sales));

    let (lo, hi) = placed
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| (lo.min(c.sales), hi.max(c.sales)));
    let span = hi - lo;

    let rows: Vec<Row> = placed
        .iter()
        .map(|c| {
            let t = if span > 0.0 { (c.sales - lo) / span } else { 1.0 };
            Row::new(vec![
                Cell::from("██").style(Style::default().fg(plasma(t))),
                Cell::from(key_label(&c.country).to_string()),
                Cell::from(format_currency(c.sales)),
                Cell::from(format_currency(c.profit)),
            ])
        })
        .collect();

    let header = Row::new(vec!["", "Country", "Sales", "Profit"])
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

    Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(Block::default().title(title).borders(Borders::ALL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plasma_endpoints_and_clamping() {
        assert_eq!(plasma(0.0), Color::Rgb(13, 8, 135));
        assert_eq!(plasma(1.0), Color::Rgb(240, 249, 33));
        assert_eq!(plasma(2.0), plasma(1.0));
        assert_eq!(plasma(-1.0), plasma(0.0));
        assert_eq!(plasma(f64::NAN), plasma(0.0));
        assert_eq!(plasma(0.25), Color::Rgb(126, 3, 168));
    }
}
