// ============================================================================
// Configuration : ligne de commande -> Settings
// ============================================================================
// Les réglages de départ viennent de clap ; ensuite les raccourcis clavier
// modifient le même Settings et demandent une nouvelle passe.
//
// CONCEPT RUST : clap derive
// - La struct Cli décrit les arguments, clap génère le parseur et l'aide
// - `env = "..."` : la valeur peut aussi venir d'une variable d'environnement
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::models::{LookbackWindow, TickerListOptions};
use crate::refresh::{RefreshInterval, DEFAULT_REFRESH_SECS};

/// Liste de tickers affichée au premier lancement
pub const DEFAULT_TICKERS: &str = "AAPL, MSFT, NVDA";

/// Timeout par défaut des appels Yahoo (secondes)
pub const DEFAULT_MARKET_TIMEOUT_SECS: u64 = 10;

/// Cyberquotes - stock quotes, price charts and company news in the terminal
#[derive(Parser, Debug)]
#[command(name = "cyberquotes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated ticker symbols
    #[arg(short, long, default_value = DEFAULT_TICKERS)]
    pub tickers: String,

    /// Lookback window (1mo, 3mo, 6mo, 1y, 2y, 5y, max)
    #[arg(short, long, default_value_t = LookbackWindow::OneMonth)]
    pub window: LookbackWindow,

    /// Auto-refresh interval in seconds, clamped to [10, 300]
    #[arg(short, long, default_value_t = DEFAULT_REFRESH_SECS)]
    pub refresh: u64,

    /// Finnhub API key for company news
    #[arg(long, env = "FINNHUB_API_KEY", hide_env_values = true)]
    pub finnhub_key: Option<String>,

    /// Drop duplicate tickers (keep the first occurrence)
    #[arg(long)]
    pub dedupe: bool,

    /// Reject malformed tickers instead of querying them
    #[arg(long)]
    pub reject_malformed: bool,

    /// Timeout of market-data requests, in seconds
    #[arg(long, default_value_t = DEFAULT_MARKET_TIMEOUT_SECS)]
    pub market_timeout: u64,

    /// Directory for the daily log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// Réglages de la session, modifiables depuis le TUI
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Texte libre saisi par l'utilisateur ("aapl, tsla")
    pub tickers_input: String,

    pub window: LookbackWindow,

    pub refresh_interval: RefreshInterval,

    /// Clé Finnhub ; vide = pas de news
    pub news_api_key: String,

    pub ticker_options: TickerListOptions,

    pub market_timeout: Duration,
}

impl Settings {
    /// Vrai si une clé de news est saisie
    pub fn has_news_key(&self) -> bool {
        !self.news_api_key.trim().is_empty()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tickers_input: DEFAULT_TICKERS.to_string(),
            window: LookbackWindow::default(),
            refresh_interval: RefreshInterval::default(),
            news_api_key: String::new(),
            ticker_options: TickerListOptions::default(),
            market_timeout: Duration::from_secs(DEFAULT_MARKET_TIMEOUT_SECS),
        }
    }
}

impl From<&Cli> for Settings {
    fn from(cli: &Cli) -> Self {
        Self {
            tickers_input: cli.tickers.clone(),
            window: cli.window,
            refresh_interval: RefreshInterval::new(cli.refresh),
            news_api_key: cli.finnhub_key.clone().unwrap_or_default(),
            ticker_options: TickerListOptions {
                dedupe: cli.dedupe,
                reject_malformed: cli.reject_malformed,
            },
            market_timeout: Duration::from_secs(cli.market_timeout.max(1)),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["cyberquotes"]).unwrap();
        let settings = Settings::from(&cli);

        assert_eq!(settings.tickers_input, DEFAULT_TICKERS);
        assert_eq!(settings.window, LookbackWindow::OneMonth);
        assert_eq!(settings.refresh_interval.secs(), 60);
        assert_eq!(settings.market_timeout, Duration::from_secs(10));
        assert!(!settings.ticker_options.dedupe);
        assert!(!settings.ticker_options.reject_malformed);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "cyberquotes",
            "--tickers",
            "aapl, tsla",
            "--window",
            "6mo",
            "--refresh",
            "500",
            "--finnhub-key",
            "abc",
            "--dedupe",
            "--reject-malformed",
        ])
        .unwrap();
        let settings = Settings::from(&cli);

        assert_eq!(settings.tickers_input, "aapl, tsla");
        assert_eq!(settings.window, LookbackWindow::SixMonths);
        assert_eq!(settings.refresh_interval.secs(), 300);
        assert_eq!(settings.news_api_key, "abc");
        assert!(settings.has_news_key());
        assert!(settings.ticker_options.dedupe);
        assert!(settings.ticker_options.reject_malformed);
    }

    #[test]
    fn test_unknown_window_rejected() {
        assert!(Cli::try_parse_from(["cyberquotes", "--window", "3w"]).is_err());
    }

    #[test]
    fn test_internal_window_not_selectable() {
        assert!(Cli::try_parse_from(["cyberquotes", "--window", "5d"]).is_err());
        assert!(Cli::try_parse_from(["cyberquotes", "--window", "5D"]).is_err());
    }
}
