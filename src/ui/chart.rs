// ============================================================================
// Chart - Graphique de prix d'un ticker
// ============================================================================
// Deux moteurs :
// - principal : Chart ratatui (ligne des clôtures, axes datés)
// - repli : Sparkline, quand le principal signale un échec
//
// Le principal retourne un bool : false = rien n'a été dessiné (zone trop
// petite, moins de 2 points), l'appelant bascule alors sur le repli.
//
// CONCEPTS RATATUI :
// 1. Chart widget : Dataset + Axis
// 2. Sparkline : barres u64, pas d'axes
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Sparkline},
    Frame,
};

use crate::models::PriceSeries;

/// Taille minimale de la zone pour le graphique principal
const MIN_CHART_WIDTH: u16 = 24;
const MIN_CHART_HEIGHT: u16 = 8;

/// Hauteur des barres du sparkline
const SPARKLINE_SCALE: f64 = 100.0;

/// Dessine le graphique, principal puis repli
pub fn render_price_chart(frame: &mut Frame, series: &PriceSeries, area: Rect) {
    if !render_line_chart(frame, series, area) {
        render_sparkline(frame, series, area);
    }
}

/// Couleur de la série : vert si la dernière clôture dépasse la première
fn trend_color(series: &PriceSeries) -> Color {
    match (series.rows.first(), series.last()) {
        (Some(first), Some(last)) if last.close >= first.close => Color::Green,
        (Some(_), Some(_)) => Color::Red,
        _ => Color::Gray,
    }
}

fn chart_block(series: &PriceSeries) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(format!(" {} · {} ", series.symbol, series.window))
}

// ============================================================================
// Moteur principal
// ============================================================================

/// Graphique ligne des clôtures
///
/// Retourne false sans rien dessiner si la zone ou les données ne
/// suffisent pas.
pub fn render_line_chart(frame: &mut Frame, series: &PriceSeries, area: Rect) -> bool {
    if area.width < MIN_CHART_WIDTH || area.height < MIN_CHART_HEIGHT || series.len() < 2 {
        return false;
    }

    let points: Vec<(f64, f64)> = series
        .closes()
        .enumerate()
        .map(|(i, close)| (i as f64, close))
        .collect();

    // Bornes sur les plus bas / plus hauts de la période
    let (Some(min_price), Some(max_price)) = (series.min_price(), series.max_price()) else {
        return false;
    };

    // Marge de 5% ; une série plate garde une hauteur non nulle
    let margin = ((max_price - min_price) * 0.05).max(max_price.abs() * 0.01).max(0.01);
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let datasets = vec![Dataset::default()
        .name(series.symbol.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(trend_color(series)))
        .data(&points)];

    let date_label = |i: usize| {
        series
            .rows
            .get(i)
            .map(|r| r.timestamp.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len() - 1) as f64])
        .labels(vec![
            Span::raw(date_label(0)),
            Span::raw(date_label(points.len() - 1)),
        ]);

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("${:.2}", y_min)),
            Span::raw(format!("${:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("${:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(chart_block(series))
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
    true
}

// ============================================================================
// Moteur de repli
// ============================================================================

/// Clôtures ramenées sur [0, SPARKLINE_SCALE]
fn sparkline_data(series: &PriceSeries) -> Vec<u64> {
    let (Some(min), Some(max)) = (
        series.closes().reduce(f64::min),
        series.closes().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    let range = max - min;
    series
        .closes()
        .map(|close| {
            if range > 0.0 {
                ((close - min) / range * SPARKLINE_SCALE).round() as u64
            } else {
                (SPARKLINE_SCALE / 2.0) as u64
            }
        })
        .collect()
}

/// Sparkline des clôtures ; un message si la série est vide
pub fn render_sparkline(frame: &mut Frame, series: &PriceSeries, area: Rect) {
    let data = sparkline_data(series);
    if data.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No chart data",
            Style::default().fg(Color::Gray),
        )))
        .block(chart_block(series))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let sparkline = Sparkline::default()
        .block(chart_block(series))
        .data(&data)
        .max(SPARKLINE_SCALE as u64)
        .style(Style::default().fg(trend_color(series)));

    frame.render_widget(sparkline, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LookbackWindow, OHLC};
    use chrono::{Duration, TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        let mut s = PriceSeries::new("AAPL".to_string(), LookbackWindow::OneMonth);
        for (i, c) in closes.iter().enumerate() {
            s.push(OHLC::new(start + Duration::days(i as i64), *c, *c, *c, *c, 1));
        }
        s
    }

    fn draw_line_chart(series: &PriceSeries, width: u16, height: u16) -> bool {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut drawn = false;
        terminal
            .draw(|frame| {
                let area = frame.size();
                drawn = render_line_chart(frame, series, area);
            })
            .unwrap();
        drawn
    }

    #[test]
    fn test_line_chart_draws_with_enough_room() {
        assert!(draw_line_chart(&series(&[1.0, 2.0, 3.0]), 60, 20));
    }

    #[test]
    fn test_line_chart_reports_failure() {
        assert!(!draw_line_chart(&series(&[1.0]), 60, 20));
        assert!(!draw_line_chart(&series(&[1.0, 2.0]), 10, 4));
    }

    #[test]
    fn test_sparkline_data_scaled() {
        assert_eq!(sparkline_data(&series(&[10.0, 15.0, 20.0])), vec![0, 50, 100]);
        assert_eq!(sparkline_data(&series(&[5.0, 5.0])), vec![50, 50]);
        assert!(sparkline_data(&series(&[])).is_empty());
    }

    #[test]
    fn test_trend_color() {
        assert_eq!(trend_color(&series(&[1.0, 2.0])), Color::Green);
        assert_eq!(trend_color(&series(&[2.0, 1.0])), Color::Red);
        assert_eq!(trend_color(&series(&[])), Color::Gray);
    }
}
