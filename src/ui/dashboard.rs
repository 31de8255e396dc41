// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// ┌────────────── CYBERPUNK QUOTES ──────────────┐  header (fenêtre, compte à rebours)
// │ Controls   │ Société                         │
// │ Tickers    │ Graphique                       │
// │  AAPL      │ Métriques 2×2                   │
// │  TSLA      │ Description                     │
// │            │ News                            │
// └────────────┴─────────────────────────────────┘
// [q] Quit ...                                        footer (ou ligne de saisie)
//
// CONCEPTS RATATUI :
// 1. Layout imbriqués : vertical puis horizontal
// 2. Paragraph + Wrap pour les textes longs
// 3. Style conditionnel selon l'état de la section
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::models::TickerSymbol;
use crate::pipeline::{NewsSection, TickerOutcome, TickerReport, TickerSection};
use crate::ui::chart;

const ACCENT: Color = Color::Magenta;
const NEON: Color = Color::Cyan;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(chunks[1]);
    render_control_panel(frame, app, body[0]);
    render_section(frame, app, body[1]);

    match app.current_screen {
        Screen::Dashboard => render_footer(frame, app, chunks[2]),
        Screen::InputMode => render_input_footer(frame, app, chunks[2]),
    }
}

/// Header, contenu, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(4), // Footer
        ])
        .split(area)
        .to_vec()
}

fn neon_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON))
        .title(Span::styled(
            title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
}

fn key_span(key: &str) -> Span<'_> {
    Span::styled(key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" CYBERPUNK QUOTES ")
        .title_alignment(Alignment::Center);

    let status = if app.is_loading_data() {
        Span::styled(
            app.loading_message.as_deref().unwrap_or("Loading..."),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
        )
    } else {
        let next = app
            .countdown_secs
            .map(|s| format!("next refresh in {}s", s))
            .unwrap_or_default();
        Span::styled(next, Style::default().fg(Color::Gray))
    };

    let line = Line::from(vec![
        Span::styled("window ", Style::default().fg(Color::Gray)),
        Span::styled(
            app.settings.window.label(),
            Style::default().fg(NEON).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled("auto-refresh ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}s", app.settings.refresh_interval.secs()),
            Style::default().fg(NEON).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        status,
    ]);

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Panneau de contrôle
// ============================================================================

fn render_control_panel(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let on_off = |flag: bool| if flag { "on" } else { "off" };
    let news_key = if app.settings.has_news_key() {
        Span::styled("set", Style::default().fg(Color::Green))
    } else {
        Span::styled("missing", Style::default().fg(Color::Red))
    };

    let settings = vec![
        Line::from(vec![Span::raw("Window   "), Span::raw(app.settings.window.label())]),
        Line::from(vec![
            Span::raw("Refresh  "),
            Span::raw(format!("{}s", app.settings.refresh_interval.secs())),
        ]),
        Line::from(vec![Span::raw("News key "), news_key]),
        Line::from(vec![
            Span::raw("Dedupe   "),
            Span::raw(on_off(app.settings.ticker_options.dedupe)),
        ]),
        Line::from(vec![
            Span::raw("Strict   "),
            Span::raw(on_off(app.settings.ticker_options.reject_malformed)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(settings).block(neon_block(" Controls ")),
        chunks[0],
    );

    let block = neon_block(" Tickers ");
    let Some(report) = &app.report else {
        frame.render_widget(
            Paragraph::new(app.settings.tickers_input.as_str())
                .block(block)
                .wrap(Wrap { trim: true }),
            chunks[1],
        );
        return;
    };

    let items: Vec<ListItem> = report
        .sections
        .iter()
        .enumerate()
        .map(|(index, outcome)| {
            let (marker, color) = match &outcome.result {
                Ok(TickerSection::Loaded(_)) => ("●", Color::Green),
                Ok(TickerSection::NoData) => ("○", Color::Gray),
                Err(_) => ("✗", Color::Red),
            };
            let mut style = Style::default().fg(color);
            if index == app.selected_index {
                style = style.add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED);
            }
            ListItem::new(format!(" {} {}", marker, outcome.symbol)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), chunks[1]);
}

// ============================================================================
// Section du ticker sélectionné
// ============================================================================

fn render_section(frame: &mut Frame, app: &App, area: Rect) {
    let Some(outcome) = app.selected_section() else {
        let text = if app.report.is_some() {
            "No tickers entered. Press [t] to edit the list."
        } else {
            "Loading..."
        };
        render_message(frame, area, " Quotes ", text, Color::Gray);
        return;
    };

    match outcome.report() {
        Some(report) => render_report(frame, &outcome.symbol, report, area),
        None => render_notice(frame, outcome, area),
    }
}

/// Pas de données ou erreur : un seul message
fn render_notice(frame: &mut Frame, outcome: &TickerOutcome, area: Rect) {
    let color = if outcome.result.is_err() {
        Color::Red
    } else {
        Color::Yellow
    };
    let title = format!(" {} ", outcome.symbol);
    let text = outcome.notice().unwrap_or_default();
    render_message(frame, area, &title, &text, color);
}

fn render_message(frame: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(color))),
    ];
    let paragraph = Paragraph::new(text)
        .block(neon_block(title))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// En-tête, graphique, métriques, description, news
fn render_report(frame: &mut Frame, symbol: &TickerSymbol, report: &TickerReport, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Société
            Constraint::Min(8),    // Graphique
            Constraint::Length(4), // Métriques
            Constraint::Length(5), // Description
            Constraint::Length(8), // News
        ])
        .split(area);

    render_company_header(frame, symbol, report, chunks[0]);
    chart::render_price_chart(frame, &report.history, chunks[1]);
    render_metrics(frame, report, chunks[2]);

    frame.render_widget(
        Paragraph::new(report.description.text())
            .block(neon_block(" About "))
            .wrap(Wrap { trim: true }),
        chunks[3],
    );

    render_news(frame, &report.news, chunks[4]);
}

fn render_company_header(frame: &mut Frame, symbol: &TickerSymbol, report: &TickerReport, area: Rect) {
    let name = report.info.display_name(symbol.as_str());
    let line = Line::from(vec![
        Span::styled(name, Style::default().fg(NEON).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  ({})", symbol), Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT)),
        ),
        area,
    );
}

/// Métriques en 2×2 ; la variation journalière n'apparaît que si elle existe
fn render_metrics(frame: &mut Frame, report: &TickerReport, area: Rect) {
    let metrics = &report.metrics;
    let block = neon_block(" Metrics ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let label = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(name, Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ])
    };

    let left = vec![
        label("Current Price  ", metrics.price_label()),
        label("52W High / Low ", metrics.fifty_two_week_label()),
    ];

    let mut right = vec![label("Market Cap     ", metrics.market_cap_label())];
    if let (Some((change, percent)), Some(d)) = (metrics.daily_change_label(), metrics.daily_change) {
        let color = if d.change >= 0.0 { Color::Green } else { Color::Red };
        right.push(Line::from(vec![
            Span::styled("Daily Change   ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} ({})", change, percent),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(left), columns[0]);
    frame.render_widget(Paragraph::new(right), columns[1]);
}

fn render_news(frame: &mut Frame, news: &NewsSection, area: Rect) {
    let block = neon_block(" News ");

    let lines: Vec<Line> = match news {
        NewsSection::Items(items) => items
            .iter()
            .flat_map(|item| {
                [
                    Line::from(Span::styled(
                        format!("▸ {}", item.headline),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!(
                            "  {} · {} · {}",
                            item.source_label(),
                            item.published_label(),
                            item.url
                        ),
                        Style::default().fg(Color::Gray),
                    )),
                ]
            })
            .collect(),
        other => vec![Line::from(Span::styled(
            other.notice().unwrap_or_default(),
            Style::default().fg(Color::Yellow),
        ))],
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// ============================================================================
// Footer
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON));

    let lines = if app.is_awaiting_quit_confirmation() {
        vec![Line::from(vec![
            Span::styled(
                "⚠  Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])]
    } else {
        vec![
            Line::from(vec![
                key_span("[q]"),
                Span::raw(" Quit  "),
                key_span("[↑↓ / j k]"),
                Span::raw(" Select  "),
                key_span("[h l / [ ]]"),
                Span::raw(" Window  "),
                key_span("[r]"),
                Span::raw(" Refresh"),
            ]),
            Line::from(vec![
                key_span("[t]"),
                Span::raw(" Tickers  "),
                key_span("[n]"),
                Span::raw(" News key  "),
                key_span("[+ -]"),
                Span::raw(" Interval  "),
                key_span("[u]"),
                Span::raw(" Dedupe"),
            ]),
        ]
    };

    let paragraph = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Footer en mode saisie : prompt + buffer (masqué pour la clé)
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_target.prompt(),
            Style::default().fg(NEON).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.displayed_input(), Style::default().fg(Color::White)),
        Span::styled("█", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let help_line = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Confirm  "),
        Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::{CompanyInfo, LookbackWindow, NewsItem, PriceSeries, OHLC};
    use crate::pipeline::{Description, Metrics, PassReport};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn screen_text(buffer: &Buffer) -> String {
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        screen_text(terminal.backend().buffer())
    }

    #[test]
    fn test_header_and_footer() {
        let app = App::default();
        let text = draw(&app);
        assert!(text.contains("CYBERPUNK QUOTES"));
        assert!(text.contains("Quit"));
        assert!(text.contains("Loading..."));
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    fn series(window: LookbackWindow, closes: &[f64]) -> PriceSeries {
        let mut s = PriceSeries::new("AAPL".to_string(), window);
        for (i, &c) in closes.iter().enumerate() {
            s.push(OHLC::new(t0() + Duration::days(i as i64), c, c, c, c, 1000));
        }
        s
    }

    /// Ticker chargé sans description, variation calculée sur 1 seule ligne
    fn loaded_app(news: NewsSection) -> App {
        let info = CompanyInfo {
            long_name: Some("Apple Inc.".into()),
            current_price: Some(1234.5),
            market_cap: Some(3_000_000_000.0),
            ..Default::default()
        };
        let five_day = series(LookbackWindow::FiveDays, &[172.0]);
        let metrics = Metrics {
            price: info.price(),
            market_cap: info.market_cap,
            fifty_two_week: info.fifty_two_week_range(),
            daily_change: five_day.daily_change(),
        };
        let report = TickerReport {
            info: Arc::new(info),
            history: Arc::new(series(LookbackWindow::OneMonth, &[170.0, 171.0, 172.5])),
            metrics,
            description: Description::Missing,
            news,
        };

        let mut app = App::default();
        app.apply_report(PassReport {
            started_at: t0(),
            window: LookbackWindow::OneMonth,
            sections: vec![TickerOutcome {
                symbol: TickerSymbol::normalize("aapl").unwrap(),
                result: Ok(TickerSection::Loaded(Box::new(report))),
            }],
        });
        app
    }

    #[test]
    fn test_loaded_report_without_key() {
        let text = draw(&loaded_app(NewsSection::KeyMissing));

        assert!(text.contains("Apple Inc."));
        assert!(text.contains("$1,234.50"));
        assert!(text.contains("$3,000,000,000"));
        assert!(text.contains("N/A"));
        assert!(!text.contains("Daily Change"));
        assert!(text.contains("No company description available."));
        assert!(text.contains("Enter your Finnhub API key (press 'n') to enable company news."));
    }

    #[test]
    fn test_loaded_report_with_news_items() {
        let items = vec![NewsItem {
            headline: "Apple unveils new chip".into(),
            url: "https://example.com/a".into(),
            source: None,
            published_at: 1_709_640_000,
        }];
        let text = draw(&loaded_app(NewsSection::Items(items)));

        assert!(text.contains("Apple unveils new chip"));
        assert!(text.contains("Unknown"));
        assert!(!text.contains("Enter your Finnhub API key"));
    }

    #[test]
    fn test_no_data_notice_rendered() {
        let mut app = App::default();
        app.apply_report(PassReport {
            started_at: t0(),
            window: LookbackWindow::OneMonth,
            sections: vec![TickerOutcome {
                symbol: TickerSymbol::normalize("zzzinvalid").unwrap(),
                result: Ok(TickerSection::NoData),
            }],
        });

        let text = draw(&app);
        assert!(text.contains("No data available for ZZZINVALID"));
    }

    #[test]
    fn test_quit_confirmation_footer() {
        let mut app = App::default();
        app.request_quit();
        assert!(draw(&app).contains("again to quit"));
    }
}
