// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Récupère l'historique de prix (endpoint chart v8) et la fiche société
// (endpoint quoteSummary v10) depuis Yahoo Finance.
//
// CONCEPTS RUST :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> + Context (anyhow) : erreurs avec contexte
// 3. Serde : désérialisation JSON automatique
//
// quoteSummary exige une session : un cookie (posé par fc.yahoo.com) et un
// "crumb" qui l'accompagne dans chaque requête. Le crumb est récupéré une fois
// puis réutilisé par le client.
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::MarketDataProvider;
use crate::models::{CompanyInfo, LookbackWindow, PriceSeries, OHLC};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_BASE_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_MODULES: &str = "price,summaryDetail,financialData,summaryProfile";

// ============================================================================
// Structures pour parser la réponse JSON de l'endpoint chart
// ============================================================================
// CONCEPT RUST : #[serde(rename = "...")]
// - Permet de mapper un nom de champ JSON différent du nom Rust
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    /// null quand le symbole est inconnu
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

/// Données OHLCV (Open, High, Low, Close, Volume)
#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

// ============================================================================
// Structures pour parser la réponse JSON de quoteSummary
// ============================================================================
// Yahoo emballe chaque nombre : {"raw": 189.5, "fmt": "189.50"}, et renvoie
// parfois {} quand la valeur manque.
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(default)]
    summary_profile: Option<SummaryProfileModule>,
}

#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

/// Extrait le nombre d'un champ {"raw": ...} optionnel
fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    fifty_two_week_high: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    current_price: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryProfileModule {
    long_business_summary: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP Yahoo Finance
pub struct YahooClient {
    http: reqwest::Client,

    /// Crumb de session, récupéré au premier appel à quoteSummary
    /// CONCEPT : tokio::sync::Mutex
    /// - verrou tenu pendant un .await (la récupération du crumb)
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    /// Crée un client avec un timeout par requête
    pub fn new(timeout: Duration) -> Result<Self> {
        // Le User-Agent évite le blocage par Yahoo, le cookie store garde la
        // session utilisée par le crumb
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("Failed to build the Yahoo Finance HTTP client")?;

        Ok(Self {
            http,
            crumb: Mutex::new(None),
        })
    }

    /// Retourne le crumb de session, en le récupérant si besoin
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        debug!("Fetching Yahoo session cookie and crumb");
        // fc.yahoo.com répond souvent 404 mais pose quand même le cookie
        let _ = self.http.get(COOKIE_URL).send().await;

        let crumb = self
            .http
            .get(CRUMB_URL)
            .send()
            .await
            .context("Crumb request to Yahoo Finance failed")?
            .error_for_status()
            .context("Yahoo Finance refused the crumb request")?
            .text()
            .await
            .context("Failed to read the Yahoo crumb")?;

        let crumb = crumb.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') || crumb.contains(' ') {
            anyhow::bail!("Yahoo Finance returned an invalid crumb");
        }

        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    /// Oublie le crumb (session expirée)
    async fn reset_crumb(&self) {
        *self.crumb.lock().await = None;
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    /// Récupère la fiche société via quoteSummary
    #[instrument(skip(self))]
    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
        let crumb = self.crumb().await?;
        let url = build_quote_summary_url(symbol, &crumb);
        debug!(url = %url, "Built Yahoo quoteSummary URL");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("HTTP request to Yahoo quoteSummary failed")?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Le crumb sera redemandé au prochain appel
            self.reset_crumb().await;
        }
        if !status.is_success() {
            error!(status = %status, "Yahoo quoteSummary returned error status");
            anyhow::bail!("Yahoo quoteSummary returned HTTP {}", status);
        }

        let body: QuoteSummaryResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo quoteSummary JSON")?;

        let info = parse_quote_summary(body)?;
        info!(has_price = info.price().is_some(), "Fetched company info");
        Ok(info)
    }

    /// Récupère l'historique de prix via l'endpoint chart
    #[instrument(skip(self, window), fields(window = %window))]
    async fn price_history(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries> {
        let url = build_chart_url(symbol, window);
        debug!(url = %url, "Built Yahoo chart URL");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("HTTP request to Yahoo chart failed")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // 404 = symbole inconnu : le corps porte quand même chart.error
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            error!(status = %status, "Yahoo chart returned error status");
            anyhow::bail!("Yahoo chart returned HTTP {}", status);
        }

        let body: ChartResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo chart JSON")?;

        let data = parse_chart_response(body, symbol, window)?;
        info!(rows = data.len(), "Fetched price history");
        Ok(data)
    }
}

/// Construit l'URL de l'endpoint chart (bougies journalières sur la fenêtre)
fn build_chart_url(symbol: &str, window: LookbackWindow) -> String {
    format!(
        "{}/{}?range={}&interval=1d&includePrePost=false",
        CHART_BASE_URL,
        symbol,
        window.to_yahoo_range()
    )
}

/// Construit l'URL de quoteSummary
fn build_quote_summary_url(symbol: &str, crumb: &str) -> String {
    format!(
        "{}/{}?modules={}&crumb={}",
        QUOTE_SUMMARY_BASE_URL, symbol, QUOTE_SUMMARY_MODULES, crumb
    )
}

/// Convertit la réponse chart en PriceSeries
///
/// Un résultat sans timestamp (marché fermé, symbole sans cotation) donne une
/// série vide, pas une erreur. Une ligne incomplète est ignorée.
fn parse_chart_response(
    response: ChartResponse,
    symbol: &str,
    window: LookbackWindow,
) -> Result<PriceSeries> {
    if let Some(err) = response.chart.error {
        anyhow::bail!(
            "Yahoo chart error {}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        );
    }

    let mut series = PriceSeries::new(symbol.to_string(), window);

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(series);
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(series);
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut skipped_count = 0;
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let row = (|| {
            Some(OHLC::new(
                DateTime::from_timestamp(timestamp, 0)?,
                value_at(&opens, i)?,
                value_at(&highs, i)?,
                value_at(&lows, i)?,
                value_at(&closes, i)?,
                volumes.get(i).and_then(|&v| v).unwrap_or(0),
            ))
        })();

        match row {
            Some(row) => series.push(row),
            None => skipped_count += 1,
        }
    }

    if skipped_count > 0 {
        warn!(
            skipped = skipped_count,
            total = timestamps.len(),
            "Skipped rows with missing data"
        );
    }

    Ok(series)
}

/// Valeur à l'index i, None si le tableau est trop court ou la valeur null
fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).and_then(|&v| v)
}

/// Convertit la réponse quoteSummary en CompanyInfo
fn parse_quote_summary(response: QuoteSummaryResponse) -> Result<CompanyInfo> {
    if let Some(err) = response.quote_summary.error {
        anyhow::bail!(
            "Yahoo quoteSummary error {}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        );
    }

    let result = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .context("No result returned by Yahoo quoteSummary")?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let profile = result.summary_profile.unwrap_or_default();

    Ok(CompanyInfo {
        long_name: price.long_name,
        short_name: price.short_name,
        current_price: raw(&financial.current_price),
        regular_market_price: raw(&price.regular_market_price),
        market_cap: raw(&price.market_cap).or(raw(&detail.market_cap)),
        fifty_two_week_high: raw(&detail.fifty_two_week_high),
        fifty_two_week_low: raw(&detail.fifty_two_week_low),
        business_summary: profile.long_business_summary,
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chart_url() {
        let url = build_chart_url("AAPL", LookbackWindow::OneMonth);
        assert!(url.contains("/AAPL?"));
        assert!(url.contains("range=1mo"));
        assert!(url.contains("interval=1d"));
        assert!(url.contains("yahoo.com"));
    }

    #[test]
    fn test_build_quote_summary_url() {
        let url = build_quote_summary_url("TSLA", "abc123");
        assert!(url.contains("/TSLA?"));
        assert!(url.contains("crumb=abc123"));
        assert!(url.contains("summaryProfile"));
    }

    #[test]
    fn test_parse_chart_skips_incomplete_rows() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":[{"meta":{"symbol":"AAPL"},
                "timestamp":[1709301600,1709560800,1709647200],
                "indicators":{"quote":[{
                    "open":[178.0,null,175.0],
                    "high":[180.0,177.0,176.0],
                    "low":[177.0,174.0,173.0],
                    "close":[179.6,175.1,170.1],
                    "volume":[73000000,81000000,null]}]}}],"error":null}}"#,
        )
        .unwrap();

        let series = parse_chart_response(body, "AAPL", LookbackWindow::FiveDays).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.rows[0].close, 179.6);
        assert_eq!(series.rows[1].volume, 0);
        assert!(series.is_ascending());
    }

    #[test]
    fn test_parse_chart_without_timestamps_is_empty() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#,
        )
        .unwrap();

        let series = parse_chart_response(body, "AAPL", LookbackWindow::OneMonth).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_parse_chart_unknown_symbol_is_error() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();

        assert!(parse_chart_response(body, "ZZZINVALID", LookbackWindow::OneMonth).is_err());
    }

    #[test]
    fn test_parse_quote_summary() {
        let body: QuoteSummaryResponse = serde_json::from_str(
            r#"{"quoteSummary":{"result":[{
                "price":{"longName":"Apple Inc.","shortName":"Apple","regularMarketPrice":{"raw":189.5,"fmt":"189.50"},"marketCap":{"raw":2950000000000.0}},
                "summaryDetail":{"fiftyTwoWeekHigh":{"raw":199.62},"fiftyTwoWeekLow":{"raw":164.08}},
                "financialData":{"currentPrice":{}},
                "summaryProfile":{"longBusinessSummary":"Apple designs phones."}
            }],"error":null}}"#,
        )
        .unwrap();

        let info = parse_quote_summary(body).unwrap();
        assert_eq!(info.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(info.current_price, None);
        assert_eq!(info.price(), Some(189.5));
        assert_eq!(info.market_cap, Some(2_950_000_000_000.0));
        assert_eq!(info.fifty_two_week_range(), Some((199.62, 164.08)));
        assert_eq!(info.summary(), Some("Apple designs phones."));
    }

    #[test]
    fn test_parse_quote_summary_error() {
        let body: QuoteSummaryResponse = serde_json::from_str(
            r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found"}}}"#,
        )
        .unwrap();

        assert!(parse_quote_summary(body).is_err());
    }
}
