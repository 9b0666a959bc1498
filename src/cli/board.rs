use super::ui;
use crate::core::metrics::{Direction, format_change, format_value};
use crate::core::{Category, CurvePoint, Dashboard, Detail, Quote, Selection};
use anyhow::Result;
use comfy_table::{Attribute, Cell, Color};

const TILES_PER_ROW: usize = 4;
const DETAIL_ROWS: usize = 12;
const CURVE_BAR_WIDTH: usize = 30;

/// Background colour of a tile. Rising yields mean falling bond prices, so the
/// colours are swapped for rate instruments.
pub fn tile_color(quote: &Quote) -> Color {
    match (quote.instrument.category, Direction::of(quote.change_pct)) {
        (_, Direction::Flat) => Color::DarkGrey,
        (Category::Rate, Direction::Up) | (Category::Tracker, Direction::Down) => Color::Red,
        (Category::Rate, Direction::Down) | (Category::Tracker, Direction::Up) => Color::DarkGreen,
    }
}

pub fn display_value(quote: &Quote) -> String {
    match quote.instrument.category {
        Category::Rate => format_value(quote.last, "", true),
        Category::Tracker => format_value(quote.last, "$", false),
    }
}

/// Market watch grid, numbered in registry order.
pub fn render_tiles(quotes: &[Quote], selection: &Selection) -> String {
    let mut table = ui::new_styled_table();
    for (row, chunk) in quotes.chunks(TILES_PER_ROW).enumerate() {
        let cells: Vec<Cell> = chunk
            .iter()
            .enumerate()
            .map(|(col, quote)| {
                let number = row * TILES_PER_ROW + col + 1;
                let selected = selection.is_selected(quote.instrument);
                let marker = if selected { "▶ " } else { "" };
                let text = format!(
                    "{marker}[{number}] {}\n{}\n{}",
                    quote.instrument.name,
                    display_value(quote),
                    format_change(quote.change_pct)
                );
                let cell = Cell::new(text).fg(Color::White).bg(tile_color(quote));
                if selected {
                    cell.add_attribute(Attribute::Bold)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(cells);
    }

    format!(
        "{}\n{}",
        ui::style_text("Market Watch", ui::StyleType::Title),
        table
    )
}

/// Most recent bars of the selected instrument, or an explicit notice when
/// there is no history to show.
pub fn render_detail(detail: &Detail) -> String {
    let title = if detail.synthetic {
        format!("{} Yield (Synthetic)", detail.instrument.name)
    } else {
        detail.instrument.name.to_string()
    };
    let mut output = format!("{}\n", ui::style_text(&title, ui::StyleType::Title));

    let bars = detail.history.bars();
    if bars.is_empty() {
        output.push_str(&ui::style_text("History unavailable.", ui::StyleType::Error));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Open"),
        ui::header_cell("High"),
        ui::header_cell("Low"),
        ui::header_cell("Close"),
        ui::header_cell(""),
    ]);
    for bar in &bars[bars.len().saturating_sub(DETAIL_ROWS)..] {
        let candle = if bar.close > bar.open {
            Cell::new("▲").fg(Color::Green)
        } else if bar.close < bar.open {
            Cell::new("▼").fg(Color::Red)
        } else {
            Cell::new("·").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(bar.date.format("%Y-%m-%d")),
            ui::number_cell(format!("{:.2}", bar.open)),
            ui::number_cell(format!("{:.2}", bar.high)),
            ui::number_cell(format!("{:.2}", bar.low)),
            ui::number_cell(format!("{:.2}", bar.close)),
            candle,
        ]);
    }
    output.push_str(&table.to_string());

    if let (Some((low, high)), Some(first), Some(last)) =
        (detail.history.range(), bars.first(), bars.last())
    {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Range {low:.2} - {high:.2} over {} sessions ({} to {})",
                    bars.len(),
                    first.date,
                    last.date
                ),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}

/// Bar lengths on a logarithmic scale. Levels that cannot be logged get none.
pub fn log_bar_widths(levels: &[Option<f64>], width: usize) -> Vec<Option<usize>> {
    let logs: Vec<Option<f64>> = levels
        .iter()
        .map(|l| l.filter(|v| v.is_finite() && *v > 0.0).map(f64::log10))
        .collect();
    let (lo, hi) = logs
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });

    logs.iter()
        .map(|l| {
            l.map(|v| {
                if hi - lo < f64::EPSILON {
                    width
                } else {
                    1 + ((v - lo) / (hi - lo) * (width - 1) as f64).round() as usize
                }
            })
        })
        .collect()
}

pub fn render_curve(points: &[CurvePoint]) -> String {
    let levels: Vec<Option<f64>> = points.iter().map(|p| p.level).collect();
    let widths = log_bar_widths(&levels, CURVE_BAR_WIDTH);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Maturity"),
        ui::header_cell("Yield"),
        ui::header_cell(""),
    ]);
    for (point, width) in points.iter().zip(widths) {
        table.add_row(vec![
            Cell::new(point.instrument.name),
            ui::number_cell(format_value(point.level, "", true)),
            Cell::new("█".repeat(width.unwrap_or(0))).fg(Color::Cyan),
        ]);
    }

    format!(
        "{}\n{}",
        ui::style_text("Yield Curve (Log Scale)", ui::StyleType::Title),
        table
    )
}

/// Fetches everything the page shows for `selection` and renders it.
pub async fn render(dashboard: &Dashboard, selection: &Selection) -> String {
    let pb = ui::new_spinner("Fetching market data...");
    let (tiles, detail, curve) = tokio::join!(
        dashboard.tiles(),
        dashboard.detail_for(selection.current()),
        dashboard.yield_curve()
    );
    pb.finish_and_clear();

    format!(
        "{}\n\n{}\n\n{}",
        render_tiles(&tiles, selection),
        render_detail(&detail),
        render_curve(&curve)
    )
}

pub async fn run(dashboard: &Dashboard, selection: &Selection) -> Result<()> {
    println!("{}", render(dashboard, selection).await);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HistorySeries, Instrument, Registry};
    use chrono::NaiveDate;

    static SMALL: &[Instrument] = &[
        Instrument::rate("US 2Y", "DGS2"),
        Instrument::rate("US 10Y", "DGS10"),
        Instrument::tracker("TIPS", "TIP"),
    ];

    fn registry() -> Registry {
        Registry::new(SMALL).unwrap()
    }

    fn quote(name: &str, last: Option<f64>, previous: Option<f64>) -> Quote {
        Quote::new(registry().resolve(name).unwrap(), last, previous)
    }

    #[test]
    fn test_tile_colors() {
        assert_eq!(tile_color(&quote("US 2Y", Some(4.2), Some(4.0))), Color::Red);
        assert_eq!(tile_color(&quote("US 2Y", Some(3.8), Some(4.0))), Color::DarkGreen);
        assert_eq!(tile_color(&quote("TIPS", Some(110.0), Some(109.0))), Color::DarkGreen);
        assert_eq!(tile_color(&quote("TIPS", Some(108.0), Some(109.0))), Color::Red);
        assert_eq!(tile_color(&quote("TIPS", None, None)), Color::DarkGrey);
    }

    #[test]
    fn test_render_tiles() {
        let mut selection = Selection::new(registry());
        selection.select("US 10Y").unwrap();
        let quotes = vec![
            quote("US 2Y", Some(4.2), Some(4.0)),
            quote("US 10Y", Some(4.1), None),
            quote("TIPS", Some(101.5), Some(101.0)),
        ];

        let output = render_tiles(&quotes, &selection);
        assert!(output.contains("Market Watch"));
        assert!(output.contains("4.20%"));
        assert!(output.contains("Δ +5.00%"));
        assert!(output.contains("▶ [2] US 10Y"));
        assert!(output.contains("Δ —"));
        assert!(output.contains("$101.50"));
        assert!(!output.contains("▶ [1]"));
    }

    #[test]
    fn test_render_unavailable_tiles() {
        let selection = Selection::new(registry());
        let quotes = vec![quote("TIPS", None, None)];
        let output = render_tiles(&quotes, &selection);
        assert!(output.contains("N/A"));
        assert!(output.contains("Δ —"));
    }

    #[test]
    fn test_render_detail() {
        let instrument = registry().resolve("US 10Y").unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let detail = Detail {
            instrument,
            history: HistorySeries::synthesize(&[(day(2), 4.0), (day(3), 4.2)]),
            synthetic: true,
        };
        let output = render_detail(&detail);
        assert!(output.contains("US 10Y Yield (Synthetic)"));
        assert!(output.contains("2024-01-03"));
        assert!(output.contains("Range 4.00 - 4.20 over 2 sessions"));

        let empty = Detail {
            instrument: registry().resolve("TIPS").unwrap(),
            history: HistorySeries::default(),
            synthetic: false,
        };
        let output = render_detail(&empty);
        assert!(output.contains("TIPS"));
        assert!(output.contains("History unavailable."));
    }

    #[test]
    fn test_log_bar_widths() {
        let widths = log_bar_widths(&[Some(1.0), Some(10.0), Some(100.0), None, Some(0.0)], 21);
        assert_eq!(widths, vec![Some(1), Some(11), Some(21), None, None]);

        assert_eq!(log_bar_widths(&[Some(4.0), Some(4.0)], 10), vec![Some(10), Some(10)]);
        assert_eq!(log_bar_widths(&[None], 10), vec![None]);
    }

    #[test]
    fn test_render_curve() {
        let points = vec![
            CurvePoint {
                instrument: registry().resolve("US 2Y").unwrap(),
                level: Some(4.25),
            },
            CurvePoint {
                instrument: registry().resolve("US 10Y").unwrap(),
                level: None,
            },
        ];
        let output = render_curve(&points);
        assert!(output.contains("Yield Curve (Log Scale)"));
        assert!(output.contains("4.25%"));
        assert!(output.contains("N/A"));
    }
}
