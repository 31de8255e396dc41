// ============================================================================
// Pipeline par ticker
// ============================================================================
// Une passe = pour chaque symbole, dans l'ordre de saisie :
//   1. fiche société + historique (fenêtre choisie)
//   2. historique vide -> "No data available for X", rien d'autre
//   3. en-tête + graphique (faits par le TUI à partir du rapport)
//   4. métriques (prix, capitalisation, 52 semaines, variation 5 jours)
//   5. description
//   6. news (si une clé est saisie)
//
// Un échec ne touche que son ticker : il devient Err(TickerError) dans la
// section de ce ticker et la boucle passe au suivant.
//
// CONCEPT RUST : contexte explicite
// - Session regroupe tout l'état mutable de la session (rafraîchissement,
//   caches, horloge) et est passée en &mut au point d'entrée
// - Aucune variable globale : les tests injectent horloge et fournisseurs
// ============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::accessor::{MarketDataAccessor, NewsAccessor};
use crate::api::{MarketDataProvider, NewsProvider};
use crate::cache::Clock;
use crate::config::Settings;
use crate::error::TickerError;
use crate::models::{
    format_thousands, parse_ticker_list, CompanyInfo, DailyChange, LookbackWindow, NewsItem,
    PriceSeries, TickerEntry, TickerSymbol, NOT_AVAILABLE,
};
use crate::refresh::{RefreshController, RefreshInterval};

/// Nombre maximal de news affichées par ticker
pub const MAX_NEWS_ITEMS: usize = 5;

/// Texte affiché quand la société n'a pas de description
pub const MISSING_DESCRIPTION: &str = "No company description available.";

/// Invite affichée quand aucune clé de news n'est saisie
pub const NEWS_KEY_PROMPT: &str =
    "Enter your Finnhub API key (press 'n') to enable company news.";

/// Texte affiché quand la clé est là mais qu'aucun article n'est revenu
pub const NO_RECENT_NEWS: &str = "No recent news available.";

// ============================================================================
// Session
// ============================================================================

/// État de la session : rafraîchissement, accesseurs mémoïsés, horloge
pub struct Session {
    pub refresh: RefreshController,
    pub market: MarketDataAccessor,
    pub news: NewsAccessor,
    clock: Arc<dyn Clock>,
}

impl Session {
    pub fn new(
        market_provider: Box<dyn MarketDataProvider>,
        news_provider: Box<dyn NewsProvider>,
        clock: Arc<dyn Clock>,
        interval: RefreshInterval,
    ) -> Self {
        Self {
            refresh: RefreshController::new(interval),
            market: MarketDataAccessor::new(market_provider, Arc::clone(&clock)),
            news: NewsAccessor::new(news_provider, Arc::clone(&clock)),
            clock,
        }
    }

    /// "Maintenant" selon l'horloge de la session
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

// ============================================================================
// Résultat d'une passe
// ============================================================================

/// Métriques affichées sous le graphique
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    /// (plus haut, plus bas) sur 52 semaines
    pub fifty_two_week: Option<(f64, f64)>,
    /// Absente si la série 5 jours a moins de 2 lignes
    pub daily_change: Option<DailyChange>,
}

impl Metrics {
    /// "$1,234.56" ou "N/A"
    pub fn price_label(&self) -> String {
        self.price
            .map(|p| format!("${}", format_thousands(p, 2)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// "$3,000,000,000" ou "N/A"
    pub fn market_cap_label(&self) -> String {
        self.market_cap
            .map(|c| format!("${}", format_thousands(c, 0)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// "$199.62 / $164.08" ou "N/A"
    pub fn fifty_two_week_label(&self) -> String {
        self.fifty_two_week
            .map(|(high, low)| format!("${:.2} / ${:.2}", high, low))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// ("$1.23", "0.65%"), absent sans variation
    pub fn daily_change_label(&self) -> Option<(String, String)> {
        self.daily_change
            .map(|d| (format!("${:.2}", d.change), format!("{:.2}%", d.percent)))
    }
}

/// Description de la société
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    Present(String),
    Missing,
}

impl Description {
    pub fn text(&self) -> &str {
        match self {
            Description::Present(text) => text,
            Description::Missing => MISSING_DESCRIPTION,
        }
    }
}

/// Bloc news d'un ticker
#[derive(Debug, Clone, PartialEq)]
pub enum NewsSection {
    /// Pas de clé : invite, aucun appel
    KeyMissing,
    /// Clé présente, zéro article
    NoRecentNews,
    /// Au plus MAX_NEWS_ITEMS articles, dans l'ordre du fournisseur
    Items(Vec<NewsItem>),
}

impl NewsSection {
    /// Texte à afficher à la place de la liste, le cas échéant
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            NewsSection::KeyMissing => Some(NEWS_KEY_PROMPT),
            NewsSection::NoRecentNews => Some(NO_RECENT_NEWS),
            NewsSection::Items(_) => None,
        }
    }
}

/// Tout ce qu'il faut pour dessiner un ticker chargé
#[derive(Debug, Clone, PartialEq)]
pub struct TickerReport {
    pub info: Arc<CompanyInfo>,
    pub history: Arc<PriceSeries>,
    pub metrics: Metrics,
    pub description: Description,
    pub news: NewsSection,
}

/// Section d'un ticker : pas de données, ou rapport complet
#[derive(Debug, Clone, PartialEq)]
pub enum TickerSection {
    NoData,
    Loaded(Box<TickerReport>),
}

/// Résultat d'un ticker pour une passe
#[derive(Debug, Clone, PartialEq)]
pub struct TickerOutcome {
    pub symbol: TickerSymbol,
    pub result: Result<TickerSection, TickerError>,
}

impl TickerOutcome {
    /// Message à afficher à la place du rapport (pas de données, erreur)
    pub fn notice(&self) -> Option<String> {
        match &self.result {
            Ok(TickerSection::Loaded(_)) => None,
            Ok(TickerSection::NoData) => Some(format!("No data available for {}", self.symbol)),
            Err(e) => Some(format!("Could not load info for {}: {}", self.symbol, e)),
        }
    }

    /// Rapport si le ticker est chargé
    pub fn report(&self) -> Option<&TickerReport> {
        match &self.result {
            Ok(TickerSection::Loaded(report)) => Some(report.as_ref()),
            _ => None,
        }
    }
}

/// Résultat d'une passe complète
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub window: LookbackWindow,
    pub sections: Vec<TickerOutcome>,
}

impl PassReport {
    /// Nombre de tickers en erreur
    pub fn failures(&self) -> usize {
        self.sections.iter().filter(|s| s.result.is_err()).count()
    }
}

// ============================================================================
// Passe
// ============================================================================

/// Exécute une passe complète, séquentiellement, ticker par ticker
#[instrument(skip_all, fields(window = %settings.window))]
pub async fn run_pass(session: &mut Session, settings: &Settings) -> PassReport {
    let started_at = session.now();
    let entries = parse_ticker_list(&settings.tickers_input, settings.ticker_options);
    debug!(tickers = entries.len(), "Starting render pass");

    let mut sections = Vec::with_capacity(entries.len());
    for entry in entries {
        let result = process_entry(session, settings, &entry).await;
        if let Err(e) = &result {
            warn!(symbol = %entry.symbol, error = %e, "Ticker failed");
        }
        sections.push(TickerOutcome {
            symbol: entry.symbol,
            result,
        });
    }

    let report = PassReport {
        started_at,
        window: settings.window,
        sections,
    };
    info!(
        tickers = report.sections.len(),
        failures = report.failures(),
        "Render pass complete"
    );
    report
}

/// Étapes 1 à 6 pour un symbole ; `?` arrête ce symbole seulement
async fn process_entry(
    session: &mut Session,
    settings: &Settings,
    entry: &TickerEntry,
) -> Result<TickerSection, TickerError> {
    if let Some(rejection) = &entry.rejection {
        return Err(rejection.clone());
    }
    let symbol = entry.symbol.as_str();

    let info = session.market.fetch_info(symbol).await;
    let history = session.market.fetch_history(symbol, settings.window).await;
    if history.is_empty() {
        debug!(symbol, "No history, emitting no-data notice");
        return Ok(TickerSection::NoData);
    }
    validate_history(&history)?;

    let short = session.market.fetch_history(symbol, LookbackWindow::FiveDays).await;
    let metrics = Metrics {
        price: info.price(),
        market_cap: info.market_cap,
        fifty_two_week: info.fifty_two_week_range(),
        daily_change: finite_daily_change(symbol, &short),
    };

    let description = match info.summary() {
        Some(text) => Description::Present(text.to_string()),
        None => Description::Missing,
    };

    let news = if settings.has_news_key() {
        let items = session.news.fetch_news(symbol, &settings.news_api_key).await;
        if items.is_empty() {
            NewsSection::NoRecentNews
        } else {
            NewsSection::Items(items.iter().take(MAX_NEWS_ITEMS).cloned().collect())
        }
    } else {
        NewsSection::KeyMissing
    };

    Ok(TickerSection::Loaded(Box::new(TickerReport {
        info,
        history,
        metrics,
        description,
        news,
    })))
}

/// Refuse un historique inutilisable pour le graphique
fn validate_history(history: &PriceSeries) -> Result<(), TickerError> {
    if let Some(row) = history.rows.iter().position(|r| !r.is_finite()) {
        return Err(TickerError::NonFiniteHistory { row });
    }
    if !history.is_ascending() {
        return Err(TickerError::UnorderedHistory);
    }
    Ok(())
}

/// Variation journalière ; None sous 2 lignes ou si non finie
///
/// Une clôture précédente à 0 ne fait tomber que cette métrique : le reste
/// du ticker s'affiche normalement.
fn finite_daily_change(symbol: &str, short: &PriceSeries) -> Option<DailyChange> {
    match short.daily_change() {
        Some(d) if !(d.change.is_finite() && d.percent.is_finite()) => {
            warn!(symbol, change = d.change, percent = d.percent, "Daily change is not finite, omitting it");
            None
        }
        other => other,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
