use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::symbols;
use tui::text::{Span, Spans};
use tui::widgets::{
    Axis, BarChart, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Tabs,
    Wrap,
};
use tui::Frame;

use crate::aggregator::{AgeBucket, CategoryRate};
use crate::app::{App, Tab};
use crate::dataset::{outcome_label, Gender, PassengerClass, PassengerTable};
use crate::stats::Histogram;

const SURVIVED: Color = Color::Cyan;
const DIED: Color = Color::LightRed;
const PASSENGER_ROWS: usize = 200;

pub fn draw<B: Backend>(f: &mut Frame<B>, app: &App) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(1)].as_ref())
        .split(size);

    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[0]);

    let menu = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Spans::from(vec![
                Span::styled(
                    (i + 1).to_string(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled(format!(" {}", tab.title()), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let tabs = Tabs::new(menu)
        .select(app.tab.into())
        .block(Block::default().borders(Borders::ALL).title("Titanic Survival Analysis"))
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(Style::default().fg(Color::Yellow))
        .divider(Span::raw("|"));
    f.render_widget(tabs, header_chunks[0]);

    let headline = Paragraph::new(Spans::from(Span::styled(
        app.report.headline(),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().title("Passengers").borders(Borders::ALL))
    .style(Style::default().fg(Color::Green))
    .alignment(Alignment::Center);
    f.render_widget(headline, header_chunks[1]);

    match app.tab {
        Tab::Overview => draw_overview(f, app, chunks[1]),
        Tab::Explorer => draw_explorer(f, app, chunks[1]),
        Tab::Breakdown => draw_breakdown(f, app, chunks[1]),
        Tab::About => draw_about(f, app, chunks[1]),
    }

    let help = Paragraph::new(Span::styled(
        "1-4/Tab switch  c/g/s/a filter  r reset  b breakdown  q quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(help, chunks[2]);
}

fn rate_bars<'a>(title: &'a str, data: &'a [(&'a str, u64)], bar_width: u16) -> BarChart<'a> {
    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .data(data)
        .bar_width(bar_width)
        .bar_gap(2)
        .max(100)
        .bar_style(Style::default().fg(SURVIVED))
        .value_style(Style::default().fg(Color::Black).bg(SURVIVED))
}

fn percent_data(rates: &[CategoryRate]) -> Vec<(&str, u64)> {
    rates
        .iter()
        .map(|r| (r.label.as_str(), r.percent().round() as u64))
        .collect()
}

fn bucket_data(buckets: &[AgeBucket]) -> Vec<(&str, u64)> {
    buckets
        .iter()
        .filter_map(|b| Some((b.label.as_str(), (b.rate()? * 100.0).round() as u64)))
        .collect()
}

fn grid(area: Rect) -> (Vec<Rect>, Vec<Rect>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);
    let halves = |r: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
            .split(r)
    };
    (halves(rows[0]), halves(rows[1]))
}

fn draw_overview<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let (top, bottom) = grid(area);
    let report = &app.report;

    let gender = percent_data(&report.by_gender);
    f.render_widget(rate_bars("Survival Rate by Gender (%)", &gender, 8), top[0]);

    let class = percent_data(&report.by_class);
    f.render_widget(rate_bars("Survival Rate by Passenger Class (%)", &class, 10), top[1]);

    let (survived, died) = report.age_histograms();
    draw_age_histogram(f, &survived, &died, bottom[0]);

    let header = Row::new(vec!["", "n", "min", "Q1", "median", "Q3", "max"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = report
        .fares_by_outcome
        .iter()
        .map(|(label, summary)| {
            let color = if label == outcome_label(true) { SURVIVED } else { DIED };
            let mut cells = vec![Cell::from(label.as_str()).style(Style::default().fg(color))];
            match summary {
                Some(s) => {
                    cells.push(Cell::from(s.count.to_string()));
                    for v in [s.min, s.q1, s.median, s.q3, s.max] {
                        cells.push(Cell::from(format!("{v:.2}")));
                    }
                }
                None => cells.push(Cell::from("0")),
            }
            Row::new(cells)
        })
        .collect::<Vec<_>>();
    let widths = [
        Constraint::Length(16),
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .title("Fare Distribution (GBP, zero fares excluded)")
                .borders(Borders::ALL),
        )
        .widths(&widths);
    f.render_widget(table, bottom[1]);
}

fn draw_age_histogram<B: Backend>(
    f: &mut Frame<B>,
    survived: &Histogram,
    died: &Histogram,
    area: Rect,
) {
    let points = |h: &Histogram| {
        h.bins
            .iter()
            .map(|b| (b.center(), b.count as f64))
            .collect::<Vec<_>>()
    };
    let survived_points = points(survived);
    let died_points = points(died);
    let upper_age = survived.bins.last().map_or(1.0, |b| b.range.end);
    let upper_count = survived.max_count().max(died.max_count()).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name(outcome_label(true))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(SURVIVED))
            .data(&survived_points),
        Dataset::default()
            .name(outcome_label(false))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(DIED))
            .data(&died_points),
    ];
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(
                    "Age Distribution: Survived vs Died (n = {})",
                    survived.total() + died.total()
                ))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("Age (years)")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, upper_age])
                .labels(axis_labels(upper_age)),
        )
        .y_axis(
            Axis::default()
                .title("Passengers")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, upper_count])
                .labels(axis_labels(upper_count)),
        );
    f.render_widget(chart, area);
}

fn axis_labels(upper: f64) -> Vec<Span<'static>> {
    [0.0, upper / 2.0, upper]
        .iter()
        .map(|v| Span::raw(format!("{v:.0}")))
        .collect()
}

/// Age/fare points of one outcome and gender.
struct ScatterSeries {
    survived: bool,
    gender: Gender,
    name: String,
    points: Vec<(f64, f64)>,
}

fn scatter_series(table: &PassengerTable) -> Vec<ScatterSeries> {
    let mut series = Vec::with_capacity(4);
    for survived in [true, false] {
        for gender in [Gender::Female, Gender::Male] {
            let points = table
                .iter()
                .filter(|r| r.survived == survived && r.gender == gender)
                .filter_map(|r| Some((r.age?, r.fare?)))
                .collect();
            series.push(ScatterSeries {
                survived,
                gender,
                name: format!("{}, {}", outcome_label(survived), gender.label()),
                points,
            });
        }
    }
    series
}

fn gender_marker(gender: Gender) -> symbols::Marker {
    match gender {
        Gender::Female => symbols::Marker::Dot,
        Gender::Male => symbols::Marker::Block,
    }
}

fn draw_explorer<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)].as_ref())
        .split(area);

    let subset = match &app.explorer {
        Ok(subset) => subset,
        Err(e) => {
            f.render_widget(error_paragraph("Drill-down", &e.to_string()), area);
            return;
        }
    };

    let filter = Paragraph::new(Spans::from(vec![
        Span::raw(app.drill_down.describe()),
        Span::styled(
            format!("  ({} of {} passengers)", subset.len(), app.table().len()),
            Style::default().fg(Color::Yellow),
        ),
    ]))
    .block(Block::default().title("Selection").borders(Borders::ALL));
    f.render_widget(filter, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);

    let series = scatter_series(subset);
    let max_of = |pick: fn(&(f64, f64)) -> f64| {
        series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(pick)
            .fold(1.0, f64::max)
    };
    let upper_age = max_of(|p| p.0).ceil();
    let upper_fare = max_of(|p| p.1).ceil();

    let datasets = series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.name.as_str())
                .marker(gender_marker(s.gender))
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(if s.survived { SURVIVED } else { DIED }))
                .data(&s.points)
        })
        .collect::<Vec<_>>();
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title("Age vs Fare (dot: female, block: male)")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("Age (years)")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, upper_age])
                .labels(axis_labels(upper_age)),
        )
        .y_axis(
            Axis::default()
                .title("Fare (GBP)")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, upper_fare])
                .labels(axis_labels(upper_fare)),
        );
    f.render_widget(chart, body[0]);

    let header = Row::new(vec!["Name", "Class", "Sex", "Port", "Age", "Fare", "Family"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = subset
        .records()
        .iter()
        .take(PASSENGER_ROWS)
        .map(|r| {
            let color = if r.survived { SURVIVED } else { DIED };
            Row::new(vec![
                Cell::from(r.name.clone()),
                Cell::from(r.class.label()),
                Cell::from(r.gender.label()),
                Cell::from(r.port.map_or("-", |p| p.label())),
                Cell::from(r.age.map_or("-".to_string(), |a| format!("{a:.0}"))),
                Cell::from(r.fare.map_or("-".to_string(), |v| format!("{v:.2}"))),
                Cell::from(r.family_size().to_string()),
            ])
            .style(Style::default().fg(color))
        })
        .collect::<Vec<_>>();
    let widths = [
        Constraint::Percentage(32),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Length(11),
        Constraint::Length(4),
        Constraint::Length(7),
        Constraint::Length(6),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Passengers").borders(Borders::ALL))
        .widths(&widths);
    if subset.is_empty() {
        let empty = error_paragraph("Passengers", "no passenger matches the selection");
        f.render_widget(empty, body[1]);
    } else {
        f.render_widget(table, body[1]);
    }
}

fn error_paragraph<'a>(title: &'a str, message: &str) -> Paragraph<'a> {
    Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red),
    ))
    .block(Block::default().title(title).borders(Borders::ALL))
    .wrap(Wrap { trim: true })
}

fn draw_breakdown<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let (top, bottom) = grid(area);
    let breakdown = &app.breakdown;

    let title = format!("Survival Rate by {} (%)", breakdown.column);
    match &breakdown.rates {
        Ok(rates) => {
            let data = percent_data(rates);
            f.render_widget(rate_bars(&title, &data, 11), top[0]);
        }
        Err(e) => {
            let message = format!("{e}: pick gender, class or embarked with `b`");
            f.render_widget(error_paragraph(&title, &message), top[0]);
        }
    }

    let family = percent_data(&breakdown.family_size);
    f.render_widget(rate_bars("Survival Rate by Family Size (%)", &family, 11), top[1]);

    let ages = bucket_data(&breakdown.age_groups);
    f.render_widget(rate_bars("Survival Rate by Age Group (%)", &ages, 12), bottom[0]);

    let fares = percent_data(&breakdown.fare_quartiles);
    f.render_widget(rate_bars("Survival Rate by Fare Quartile (%)", &fares, 11), bottom[1]);
}

fn draw_about<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let summary = &app.report.summary;
    let rate = summary.rate.map_or(0.0, |r| r * 100.0);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Spans::from(Span::styled("Dataset Summary", bold)),
        Spans::from(format!("Total passengers: {}", summary.total)),
        Spans::from(format!("Survivors: {} ({rate:.1}%)", summary.survived)),
        Spans::from(format!("Non-survivors: {} ({:.1}%)", summary.died(), 100.0 - rate)),
        Spans::from(format!("Rows dropped while loading: {}", summary.dropped)),
        Spans::from(format!("Loaded at: {}", app.loaded_at.format("%Y-%m-%d %H:%M:%S"))),
        Spans::from(""),
        Spans::from(Span::styled("Survival by class", bold)),
    ];
    for class in [PassengerClass::First, PassengerClass::Second, PassengerClass::Third] {
        if let Some(rate) = app.report.by_class.iter().find(|r| r.label == class.label()) {
            lines.push(Spans::from(format!(
                "{}: {:.1}% of {} ({} died)",
                rate.label,
                rate.percent(),
                rate.total,
                rate.died()
            )));
        }
    }
    lines.push(Spans::from(""));
    lines.push(Spans::from(Span::styled("Survival by port", bold)));
    for rate in &app.report.by_port {
        lines.push(Spans::from(format!(
            "{}: {:.1}% of {}",
            rate.label,
            rate.percent(),
            rate.total
        )));
    }
    lines.push(Spans::from(""));
    lines.push(Spans::from(Span::styled("Keys", bold)));
    lines.push(Spans::from("1-4 or Tab: switch view    q/Esc: quit"));
    lines.push(Spans::from(
        "Explorer: c class, g gender, s outcome, a age window, r reset",
    ));
    lines.push(Spans::from("Breakdown: b next column"));

    let about = Paragraph::new(lines)
        .block(Block::default().title("About").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(about, area);
}
