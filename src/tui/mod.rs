//! Ratatui-based terminal dashboard.
//!
//! A sidebar selects the view ("Sales Analysis" / "Key Insights") and the
//! product category for the discount drill-down; the body pages through the
//! charts of the current view. Every draw runs a fresh render pass over the
//! shared dataset.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::aggregate::{category_options, orders_by_category};
use crate::app::pipeline::{KeyInsightsTables, Metrics, RenderOutput, SalesAnalysisTables, ViewTables, render_view};
use crate::domain::{CategorySelection, Dataset, Grouped, View, ViewParams, key_label};
use crate::error::AppError;
use crate::io::export::{ExportFormat, write_view_export};
use crate::report::format_currency;

mod bars;
mod map;
mod plotters_chart;

use bars::{BarRow, HBars};
use map::{country_table, plasma};
use plotters_chart::{Series, SeriesKind, XyChart, padded_bounds};

/// Qualitative palette for per-bar and per-category colours (ColorBrewer Set2).
const SET2: [(u8, u8, u8); 8] = [
    (102, 194, 165),
    (252, 141, 98),
    (141, 160, 203),
    (231, 138, 195),
    (166, 216, 84),
    (255, 217, 47),
    (229, 196, 148),
    (179, 179, 179),
];

const PROFIT_LINE: (u8, u8, u8) = (255, 105, 97);

/// Start the TUI over an already-loaded dataset.
pub fn run(dataset: Dataset, export_dir: PathBuf) -> Result<(), AppError> {
    // Log records on stderr would tear the alternate screen.
    log::set_max_level(log::LevelFilter::Off);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dataset, export_dir);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// One screen of the body area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    SalesOverTime,
    SalesByCountry,
    CategoryAndSegment,
    SalesBySubcategory,
    ProfitOverYears,
    SalesByShipMode,
    SalesVsDiscount,
    TopSubcategories,
    AverageDiscount,
    ProfitVsSales,
}

const SALES_ANALYSIS_PAGES: [Page; 7] = [
    Page::SalesOverTime,
    Page::SalesByCountry,
    Page::CategoryAndSegment,
    Page::SalesBySubcategory,
    Page::ProfitOverYears,
    Page::SalesByShipMode,
    Page::SalesVsDiscount,
];

const KEY_INSIGHTS_PAGES: [Page; 3] = [Page::TopSubcategories, Page::AverageDiscount, Page::ProfitVsSales];

fn pages(view: View) -> &'static [Page] {
    match view {
        View::SalesAnalysis => &SALES_ANALYSIS_PAGES,
        View::KeyInsights => &KEY_INSIGHTS_PAGES,
    }
}

struct App {
    dataset: Dataset,
    view: View,
    page: usize,
    category: usize,
    export_dir: PathBuf,
    status: String,
}

impl App {
    fn new(dataset: Dataset, export_dir: PathBuf) -> Self {
        let status = format!("{} rows loaded", dataset.len());
        Self {
            dataset,
            view: View::default(),
            page: 0,
            category: 0,
            export_dir,
            status,
        }
    }

    fn params(&self) -> ViewParams {
        // The option value travels as-is, so a category literally named
        // like the missing-value label stays distinct from it.
        let category = match category_options(&self.dataset).get(self.category) {
            Some(option) => CategorySelection::Value(option.clone()),
            None => CategorySelection::First,
        };
        ViewParams {
            view: self.view,
            category,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('v') | KeyCode::Tab => {
                self.view = self.view.toggle();
                self.page = 0;
                self.status = format!("view: {}", self.view.display_name());
            }
            KeyCode::Left => {
                let n = pages(self.view).len();
                self.page = (self.page + n - 1) % n;
            }
            KeyCode::Right => {
                self.page = (self.page + 1) % pages(self.view).len();
            }
            KeyCode::Up => {
                self.category = self.category.saturating_sub(1);
                self.status = self.category_status();
            }
            KeyCode::Down => {
                let n = category_options(&self.dataset).len();
                if self.category + 1 < n {
                    self.category += 1;
                }
                self.status = self.category_status();
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn category_status(&self) -> String {
        match category_options(&self.dataset).get(self.category) {
            Some(option) => format!("category: {}", key_label(option)),
            None => "No categories in data.".to_string(),
        }
    }

    fn export(&mut self) {
        let result = render_view(&self.dataset, &self.params())
            .and_then(|output| write_view_export(&self.export_dir, &output, ExportFormat::Csv));
        self.status = match result {
            Ok(files) => format!("Exported {} file(s) to {}", files.len(), self.export_dir.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        // Fresh render pass on every draw.
        match render_view(&self.dataset, &self.params()) {
            Ok(output) => {
                self.draw_header(frame, chunks[0], &output.metrics);
                self.draw_body(frame, chunks[1], &output);
            }
            Err(err) => {
                let msg = Paragraph::new(err.to_string())
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(msg, chunks[1]);
            }
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, metrics: &Metrics) {
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        for (rect, title, value) in [
            (cards[0], "Total Sales", metrics.total_sales),
            (cards[1], "Total Profit", metrics.total_profit),
        ] {
            let text = Text::from(vec![Line::from(Span::styled(
                format_currency(value),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))]);
            let card = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(card, rect);
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect, output: &RenderOutput) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);

        self.draw_sidebar(frame, chunks[0]);

        let page = pages(self.view)[self.page.min(pages(self.view).len() - 1)];
        match &output.tables {
            ViewTables::SalesAnalysis(t) => draw_sales_analysis_page(frame, chunks[1], page, t),
            ViewTables::KeyInsights(t) => draw_key_insights_page(frame, chunks[1], page, t),
        }
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let views: Vec<ListItem> = View::ALL
            .iter()
            .map(|v| {
                let mark = if *v == self.view { "(•)" } else { "( )" };
                ListItem::new(format!("{mark} {}", v.display_name()))
            })
            .collect();
        let views = List::new(views).block(Block::default().title("Select Analysis").borders(Borders::ALL));
        frame.render_widget(views, chunks[0]);

        let enabled = self.view == View::SalesAnalysis;
        let orders = orders_by_category(&self.dataset);
        let items: Vec<ListItem> = category_options(&self.dataset)
            .iter()
            .map(|o| {
                let n = orders.iter().find(|g| &g.key == o).map_or(0, |g| g.value);
                ListItem::new(format!("{} ({n})", key_label(o)))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().title("Select Product Category").borders(Borders::ALL))
            .style(if enabled {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            })
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.category));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let n = pages(self.view).len();
        let help = format!(
            "v view  ←/→ chart {}/{n}  ↑/↓ category  e export  q quit",
            self.page.min(n - 1) + 1
        );
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_sales_analysis_page(frame: &mut ratatui::Frame<'_>, area: Rect, page: Page, t: &SalesAnalysisTables) {
    match page {
        Page::SalesOverTime => {
            let points = t
                .sales_over_time
                .iter()
                .filter_map(|g| Some((g.key?.num_days_from_ce() as f64, g.value)))
                .collect();
            let series = [Series {
                kind: SeriesKind::Line,
                color: RGBColor(0, 255, 255),
                points,
            }];
            draw_xy(frame, area, Line::from("Total Sales Over Time"), &series, ("Order Date", "Total Sales"), (fmt_axis_date, fmt_axis_money));
        }
        Page::SalesByCountry => {
            frame.render_widget(country_table(&t.sales_by_country, "Sales by Country"), area);
        }
        Page::CategoryAndSegment => {
            let halves = split_halves(area);
            draw_shares(frame, halves[0], "Sales by Category", &t.sales_by_category);
            draw_shares(frame, halves[1], "Sales by Segment", &t.sales_by_segment);
        }
        Page::SalesBySubcategory => {
            draw_bars(frame, area, "Sales by Subcategory", &t.sales_by_subcategory);
        }
        Page::ProfitOverYears => {
            let points: Vec<(f64, f64)> = t
                .profit_by_year
                .iter()
                .filter_map(|g| Some((g.key? as f64, g.value)))
                .collect();
            let color = RGBColor(PROFIT_LINE.0, PROFIT_LINE.1, PROFIT_LINE.2);
            let series = [
                Series {
                    kind: SeriesKind::Line,
                    color,
                    points: points.clone(),
                },
                Series {
                    kind: SeriesKind::Points,
                    color,
                    points,
                },
            ];
            draw_xy(frame, area, Line::from("Profit over the years"), &series, ("Year", "Total Profit"), (fmt_axis_year, fmt_axis_money));
        }
        Page::SalesByShipMode => {
            draw_shares(frame, area, "Total Sales by Ship Mode", &t.sales_by_ship_mode);
        }
        Page::SalesVsDiscount => {
            let selected = t.selected_category.as_ref().map(key_label).unwrap_or("-");
            let title = Line::from(format!("Sales vs. Discount for {selected}"));
            let series = discount_series(t);
            draw_xy(frame, area, title, &series, ("Discount (%)", "Sales ($)"), (fmt_axis_pct, fmt_axis_money));
        }
        _ => {}
    }
}

fn draw_key_insights_page(frame: &mut ratatui::Frame<'_>, area: Rect, page: Page, t: &KeyInsightsTables) {
    match page {
        Page::TopSubcategories => {
            let halves = split_halves(area);
            draw_bars(frame, halves[0], "Top 5 Subcategories with Highest Sales", &t.top_subcategories_by_sales);
            draw_bars(frame, halves[1], "Top 5 Subcategories with Highest Profit", &t.top_subcategories_by_profit);
        }
        Page::AverageDiscount => {
            let rows: Vec<BarRow> = t
                .avg_discount_by_subcategory
                .iter()
                .enumerate()
                .map(|(i, g)| BarRow {
                    label: key_label(&g.key).to_string(),
                    value: g.value.unwrap_or(0.0),
                    color: set2(i),
                    note: g.value.is_none().then(|| "(no discounts)".to_string()),
                })
                .collect();
            draw_bar_rows(frame, area, "Average Discount by Subcategory", &rows, fmt_pct);
        }
        Page::ProfitVsSales => {
            let (series, legend) = category_series(t);
            let mut title = vec![Span::raw("Profit vs. Sales  ")];
            title.extend(legend);
            draw_xy(frame, area, Line::from(title), &series, ("Sales", "Profit"), (fmt_axis_money, fmt_axis_money));
        }
        _ => {}
    }
}

/// Discount scatter coloured by discount: one series per Plasma step.
fn discount_series(t: &SalesAnalysisTables) -> Vec<Series> {
    const STEPS: usize = 5;
    let mut buckets: Vec<Vec<(f64, f64)>> = vec![Vec::new(); STEPS];
    for p in &t.discount_scatter {
        let (Some(d), Some(s)) = (p.discount, p.sales) else {
            continue;
        };
        let idx = ((d.clamp(0.0, 1.0) * (STEPS - 1) as f64).round() as usize).min(STEPS - 1);
        buckets[idx].push((d * 100.0, s));
    }
    buckets
        .into_iter()
        .enumerate()
        .filter(|(_, pts)| !pts.is_empty())
        .map(|(i, points)| Series {
            kind: SeriesKind::Points,
            color: to_rgb(plasma(i as f64 / (STEPS - 1) as f64)),
            points,
        })
        .collect()
}

/// Sales/profit scatter: one series per category, plus coloured legend spans.
fn category_series(t: &KeyInsightsTables) -> (Vec<Series>, Vec<Span<'static>>) {
    let mut order: Vec<Option<String>> = Vec::new();
    let mut series: Vec<Series> = Vec::new();
    for p in &t.sales_vs_profit {
        let (Some(s), Some(pr)) = (p.sales, p.profit) else {
            continue;
        };
        let idx = match order.iter().position(|c| c == &p.category) {
            Some(idx) => idx,
            None => {
                order.push(p.category.clone());
                series.push(Series {
                    kind: SeriesKind::Points,
                    color: to_rgb(set2(order.len() - 1)),
                    points: Vec::new(),
                });
                order.len() - 1
            }
        };
        series[idx].points.push((s, pr));
    }

    let legend = order
        .iter()
        .enumerate()
        .map(|(i, c)| Span::styled(format!("■ {} ", key_label(c)), Style::default().fg(set2(i))))
        .collect();
    (series, legend)
}

fn draw_bars(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, table: &[Grouped<Option<String>>]) {
    let rows: Vec<BarRow> = table
        .iter()
        .enumerate()
        .map(|(i, g)| BarRow {
            label: key_label(&g.key).to_string(),
            value: g.value,
            color: set2(i),
            note: None,
        })
        .collect();
    draw_bar_rows(frame, area, title, &rows, format_currency);
}

/// Pie chart stand-in: bars annotated with each slice's share of the total.
fn draw_shares(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, table: &[Grouped<Option<String>>]) {
    let rows = share_rows(table);
    draw_bar_rows(frame, area, title, &rows, format_currency);
}

fn share_rows(table: &[Grouped<Option<String>>]) -> Vec<BarRow> {
    let total: f64 = table.iter().map(|g| g.value).sum();
    table
        .iter()
        .enumerate()
        .map(|(i, g)| BarRow {
            label: key_label(&g.key).to_string(),
            value: g.value,
            color: set2(i),
            note: (total != 0.0).then(|| format!("({:.1}%)", g.value / total * 100.0)),
        })
        .collect()
}

fn draw_bar_rows(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, rows: &[BarRow], fmt_value: fn(f64) -> String) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if rows.is_empty() {
        no_data(frame, inner);
        return;
    }
    frame.render_widget(HBars { rows, fmt_value }, inner);
}

fn draw_xy(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: Line<'_>,
    series: &[Series],
    labels: (&str, &str),
    fmts: (fn(f64) -> String, fn(f64) -> String),
) {
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let xs = padded_bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let ys = padded_bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
    let (Some(x_bounds), Some(y_bounds)) = (xs, ys) else {
        no_data(frame, inner);
        return;
    };

    let (chart_rect, insets) = chart_layout(inner);
    let widget = XyChart {
        series,
        x_bounds,
        y_bounds,
        x_label: labels.0,
        y_label: labels.1,
        fmt_x: fmts.0,
        fmt_y: fmts.1,
    };
    frame.render_widget(widget, chart_rect);

    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, (x_bounds, y_bounds), labels, fmts);
    }
}

fn no_data(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let msg = Paragraph::new("No data").style(Style::default().fg(Color::Yellow));
    frame.render_widget(msg, area);
}

fn split_halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn set2(i: usize) -> Color {
    let (r, g, b) = SET2[i % SET2.len()];
    Color::Rgb(r, g, b)
}

fn to_rgb(c: Color) -> RGBColor {
    match c {
        Color::Rgb(r, g, b) => RGBColor(r, g, b),
        _ => RGBColor(255, 255, 255),
    }
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_money(v: f64) -> String {
    let abs = v.abs();
    let sign = if v < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("{sign}{:.1}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{sign}{:.1}k", abs / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

fn fmt_axis_pct(v: f64) -> String {
    format!("{v:.0}%")
}

fn fmt_pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    bounds: ([f64; 2], [f64; 2]),
    labels: (&str, &str),
    fmts: (fn(f64) -> String, fn(f64) -> String),
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let (x_bounds, y_bounds) = bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = (fmts.0)(x_val);
        let label_len = label.chars().count() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len.min((inner.x + inner.width).saturating_sub(start)),
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = (fmts.1)(y_val);
        let label_len = label.chars().count() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(labels.0.to_string())
        .alignment(Alignment::Center)
        .style(style);
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(labels.1.to_string()).style(style.add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1).max(1).min(inner.width),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiscountPoint, SalesProfitPoint, SalesRecord};

    fn fixture() -> Dataset {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sales_small.csv");
        crate::io::ingest::load_dataset(&path).unwrap()
    }

    #[test]
    fn pages_per_view() {
        assert_eq!(pages(View::SalesAnalysis).len(), 7);
        assert_eq!(pages(View::KeyInsights).len(), 3);
        assert_eq!(pages(View::SalesAnalysis)[0], Page::SalesOverTime);
        assert_eq!(pages(View::KeyInsights)[2], Page::ProfitVsSales);
    }

    #[test]
    fn keys_drive_view_page_and_category() {
        let mut app = App::new(fixture(), PathBuf::from("export"));
        assert_eq!(app.params(), ViewParams {
            view: View::SalesAnalysis,
            category: CategorySelection::Value(Some("Furniture".to_string())),
        });

        app.handle_key(KeyCode::Left);
        assert_eq!(app.page, 6);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.page, 0);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.params().category, CategorySelection::Value(Some("Technology".to_string())));
        assert_eq!(app.status, "category: Technology");
        app.handle_key(KeyCode::Up);
        assert_eq!(app.params().category, CategorySelection::Value(Some("Office Supplies".to_string())));

        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Char('v'));
        assert_eq!(app.view, View::KeyInsights);
        assert_eq!(app.page, 0);

        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(!app.handle_key(KeyCode::Char('x')));
    }

    #[test]
    fn selecting_a_literal_blank_category_keeps_it_distinct() {
        let rows = vec![
            SalesRecord {
                sales: Some(7.0),
                ..SalesRecord::default()
            },
            SalesRecord {
                category: Some("(blank)".to_string()),
                sales: Some(5.0),
                discount: Some(0.1),
                ..SalesRecord::default()
            },
        ];
        let mut app = App::new(Dataset::new(rows), PathBuf::from("export"));
        app.handle_key(KeyCode::Down);

        let output = render_view(&app.dataset, &app.params()).unwrap();
        let ViewTables::SalesAnalysis(t) = output.tables else {
            panic!("expected sales analysis tables");
        };
        assert_eq!(t.selected_category, Some(Some("(blank)".to_string())));
        assert_eq!(t.discount_scatter.len(), 1);
        assert_eq!(t.discount_scatter[0].sales, Some(5.0));
    }

    #[test]
    fn share_rows_annotate_percentages() {
        let table = vec![
            Grouped { key: Some("a".to_string()), value: 75.0, first_seen: 0 },
            Grouped { key: None, value: 25.0, first_seen: 1 },
        ];
        let rows = share_rows(&table);
        assert_eq!(rows[0].note.as_deref(), Some("(75.0%)"));
        assert_eq!(rows[1].label, "(blank)");
        assert_eq!(rows[1].note.as_deref(), Some("(25.0%)"));
        assert!(share_rows(&[]).is_empty());
    }

    #[test]
    fn discount_series_buckets_by_discount() {
        let mut t = crate::app::pipeline::sales_analysis(&Dataset::default(), &CategorySelection::First).unwrap();
        t.discount_scatter = vec![
            DiscountPoint { discount: Some(0.0), sales: Some(10.0), product_name: None },
            DiscountPoint { discount: Some(0.0625), sales: Some(11.0), product_name: None },
            DiscountPoint { discount: Some(0.75), sales: Some(5.0), product_name: None },
            DiscountPoint { discount: None, sales: Some(5.0), product_name: None },
        ];
        let series = discount_series(&t);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].points, vec![(0.0, 10.0), (6.25, 11.0)]);
        assert_eq!(series[1].points, vec![(75.0, 5.0)]);
    }

    #[test]
    fn category_series_one_per_category() {
        let t = KeyInsightsTables {
            top_subcategories_by_sales: Vec::new(),
            top_subcategories_by_profit: Vec::new(),
            avg_discount_by_subcategory: Vec::new(),
            sales_vs_profit: vec![
                SalesProfitPoint { sales: Some(1.0), profit: Some(2.0), category: Some("A".to_string()) },
                SalesProfitPoint { sales: Some(3.0), profit: Some(4.0), category: Some("B".to_string()) },
                SalesProfitPoint { sales: Some(5.0), profit: Some(6.0), category: Some("A".to_string()) },
                SalesProfitPoint { sales: None, profit: Some(6.0), category: Some("C".to_string()) },
            ],
        };
        let (series, legend) = category_series(&t);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].points.len(), 2);
        assert_eq!(legend.len(), 2);
    }

    #[test]
    fn axis_formatters() {
        let d = NaiveDate::from_ymd_opt(2014, 7, 1).unwrap();
        assert_eq!(fmt_axis_date(d.num_days_from_ce() as f64), "2014-07");
        assert_eq!(fmt_axis_year(2013.0), "2013");
        assert_eq!(fmt_axis_money(1_260_000.0), "1.3M");
        assert_eq!(fmt_axis_money(-2_500.0), "-2.5k");
        assert_eq!(fmt_axis_money(640.0), "640");
        assert_eq!(fmt_pct(0.125), "12.5%");
    }
}
