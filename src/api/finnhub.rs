// ============================================================================
// API Client : Finnhub (company news)
// ============================================================================
// GET https://finnhub.io/api/v1/company-news?symbol=&from=&to=&token=
//
// Succès = HTTP 200 avec un tableau JSON. Tout autre statut est une erreur ;
// c'est l'accesseur de news qui la transforme en liste vide.
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error, instrument};

use super::{NewsProvider, NewsRequest, RawNewsItem};

const COMPANY_NEWS_URL: &str = "https://finnhub.io/api/v1/company-news";

/// Timeout des appels Finnhub
pub const NEWS_TIMEOUT: Duration = Duration::from_secs(10);

/// Client HTTP Finnhub
pub struct FinnhubClient {
    http: reqwest::Client,
    url: String,
}

impl FinnhubClient {
    pub fn new() -> Result<Self> {
        Self::with_url(COMPANY_NEWS_URL)
    }

    /// Client pointant vers une autre URL (proxy, serveur local)
    pub fn with_url(url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(NEWS_TIMEOUT)
            .build()
            .context("Failed to build the Finnhub HTTP client")?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

/// Paramètres de requête ; le token n'apparaît jamais dans les logs
fn query_params(request: &NewsRequest) -> [(&'static str, String); 4] {
    [
        ("symbol", request.symbol.clone()),
        ("from", request.from.format("%Y-%m-%d").to_string()),
        ("to", request.to.format("%Y-%m-%d").to_string()),
        ("token", request.token.clone()),
    ]
}

#[async_trait]
impl NewsProvider for FinnhubClient {
    #[instrument(skip_all, fields(symbol = %request.symbol, from = %request.from, to = %request.to))]
    async fn company_news(&self, request: &NewsRequest) -> Result<Vec<RawNewsItem>> {
        let response = self
            .http
            .get(&self.url)
            .query(&query_params(request))
            .send()
            .await
            .context("HTTP request to Finnhub failed")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if status != StatusCode::OK {
            error!(status = %status, "Finnhub returned error status");
            anyhow::bail!("Finnhub returned HTTP {}", status);
        }

        let items: Vec<RawNewsItem> = response
            .json()
            .await
            .context("Failed to parse Finnhub news JSON")?;

        debug!(items = items.len(), "Fetched company news");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_query_params() {
        let request = NewsRequest {
            symbol: "AAPL".to_string(),
            from: NaiveDate::from_ymd_opt(2024, 2, 4).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            token: "secret".to_string(),
        };

        let params = query_params(&request);
        assert_eq!(params[0], ("symbol", "AAPL".to_string()));
        assert_eq!(params[1], ("from", "2024-02-04".to_string()));
        assert_eq!(params[2], ("to", "2024-03-05".to_string()));
        assert_eq!(params[3], ("token", "secret".to_string()));
    }

    #[test]
    fn test_parse_news_array() {
        let items: Vec<RawNewsItem> = serde_json::from_str(
            r#"[{"category":"company","datetime":1709640000,"headline":"Apple ships","id":1,
                 "image":"","related":"AAPL","source":"Reuters","summary":"","url":"https://x/a"},
                {"datetime":1709640001,"headline":"","url":"https://x/b"}]"#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source.as_deref(), Some("Reuters"));
        assert_eq!(items[1].source, None);
    }
}
