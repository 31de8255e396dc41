// ============================================================================
// Accesseur : news société
// ============================================================================
// fetch_news(symbol, api_key) -> Arc<Vec<NewsItem>>
//
// - clé vide : liste vide, aucun appel réseau
// - fenêtre [aujourd'hui - 30 jours, aujourd'hui] (date UTC de l'horloge)
// - articles sans titre ou sans URL écartés
// - erreur transport / statut != 200 : liste vide
// - mémoïsé par (symbol, clé), TTL 30 min
// ============================================================================

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, instrument, warn};

use crate::api::{NewsProvider, NewsRequest, RawNewsItem};
use crate::cache::{Clock, TtlCache};
use crate::models::NewsItem;

/// TTL des news (secondes)
pub const NEWS_TTL_SECS: i64 = 1800;

/// Profondeur de la fenêtre de news (jours)
pub const NEWS_LOOKBACK_DAYS: i64 = 30;

pub struct NewsAccessor {
    provider: Box<dyn NewsProvider>,
    cache: TtlCache<(String, String), Vec<NewsItem>>,
    clock: Arc<dyn Clock>,
}

impl NewsAccessor {
    pub fn new(provider: Box<dyn NewsProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            cache: TtlCache::new(Arc::clone(&clock)),
            clock,
        }
    }

    /// News récentes du ticker, dans l'ordre du fournisseur
    #[instrument(skip(self, api_key))]
    pub async fn fetch_news(&mut self, symbol: &str, api_key: &str) -> Arc<Vec<NewsItem>> {
        if api_key.trim().is_empty() {
            debug!("No API key, skipping news fetch");
            return Arc::new(Vec::new());
        }

        let to = self.clock.now().date_naive();
        let request = NewsRequest {
            symbol: symbol.to_string(),
            from: to - Duration::days(NEWS_LOOKBACK_DAYS),
            to,
            token: api_key.to_string(),
        };

        let provider = &self.provider;
        self.cache
            .get_or_compute(
                (symbol.to_string(), api_key.to_string()),
                Duration::seconds(NEWS_TTL_SECS),
                || async move {
                    match provider.company_news(&request).await {
                        Ok(raw) => keep_complete(raw),
                        Err(e) => {
                            warn!(error = ?e, "News unavailable, using empty list");
                            Vec::new()
                        }
                    }
                },
            )
            .await
    }
}

/// Ne garde que les articles avec titre et URL non vides
fn keep_complete(raw: Vec<RawNewsItem>) -> Vec<NewsItem> {
    raw.into_iter()
        .filter_map(|item| {
            let headline = item.headline.filter(|h| !h.trim().is_empty())?;
            let url = item.url.filter(|u| !u.trim().is_empty())?;
            Some(NewsItem {
                headline,
                url,
                source: item.source.filter(|s| !s.trim().is_empty()),
                published_at: item.datetime.unwrap_or_default(),
            })
        })
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Faux fournisseur : enregistre les requêtes, échoue si `fail`
    struct RecordingProvider {
        calls: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<NewsRequest>>>,
        fail: bool,
    }

    #[async_trait]
    impl NewsProvider for RecordingProvider {
        async fn company_news(&self, request: &NewsRequest) -> Result<Vec<RawNewsItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.fail {
                anyhow::bail!("Finnhub returned HTTP 429 Too Many Requests");
            }
            Ok(vec![
                RawNewsItem {
                    headline: Some("Apple ships".into()),
                    url: Some("https://x/a".into()),
                    source: Some("Reuters".into()),
                    datetime: Some(1_709_640_000),
                },
                RawNewsItem {
                    headline: None,
                    url: Some("https://x/b".into()),
                    ..Default::default()
                },
                RawNewsItem {
                    headline: Some("No link".into()),
                    url: Some("  ".into()),
                    ..Default::default()
                },
                RawNewsItem {
                    headline: Some("Anonymous".into()),
                    url: Some("https://x/c".into()),
                    source: Some("".into()),
                    datetime: None,
                },
            ])
        }
    }

    struct Harness {
        accessor: NewsAccessor,
        clock: Arc<ManualClock>,
        calls: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<NewsRequest>>>,
    }

    fn harness(fail: bool) -> Harness {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()));
        let calls = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));
        let provider = RecordingProvider {
            calls: Arc::clone(&calls),
            last_request: Arc::clone(&last_request),
            fail,
        };
        Harness {
            accessor: NewsAccessor::new(Box::new(provider), clock.clone()),
            clock,
            calls,
            last_request,
        }
    }

    #[tokio::test]
    async fn test_empty_key_skips_provider() {
        let mut h = harness(false);

        assert!(h.accessor.fetch_news("AAPL", "").await.is_empty());
        assert!(h.accessor.fetch_news("AAPL", "   ").await.is_empty());
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_request_covers_trailing_thirty_days() {
        let mut h = harness(false);

        h.accessor.fetch_news("AAPL", "key").await;

        let request = h.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.from, NaiveDate::from_ymd_opt(2024, 2, 4).unwrap());
        assert_eq!(request.to, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(request.token, "key");
    }

    #[tokio::test]
    async fn test_incomplete_items_filtered() {
        let mut h = harness(false);

        let items = h.accessor.fetch_news("AAPL", "key").await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].headline, "Apple ships");
        assert_eq!(items[0].source_label(), "Reuters");
        assert_eq!(items[1].headline, "Anonymous");
        assert_eq!(items[1].source, None);
    }

    #[tokio::test]
    async fn test_memoized_per_symbol_and_key() {
        let mut h = harness(false);

        let first = h.accessor.fetch_news("AAPL", "key").await;
        h.clock.advance(Duration::seconds(1799));
        let second = h.accessor.fetch_news("AAPL", "key").await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);

        h.accessor.fetch_news("AAPL", "other-key").await;
        h.accessor.fetch_news("TSLA", "key").await;
        assert_eq!(h.calls.load(Ordering::SeqCst), 3);

        h.clock.advance(Duration::seconds(2));
        h.accessor.fetch_news("AAPL", "key").await;
        assert_eq!(h.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_provider_error_degrades_to_empty() {
        let mut h = harness(true);

        assert!(h.accessor.fetch_news("AAPL", "key").await.is_empty());
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }
}
