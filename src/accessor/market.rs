// ============================================================================
// Accesseur : données de marché
// ============================================================================
// fetch_info(symbol)            -> Arc<CompanyInfo>   (vide en cas d'échec)
// fetch_history(symbol, window) -> Arc<PriceSeries>   (vide en cas d'échec)
//
// Les deux sont mémoïsés 1 heure : deux appels identiques dans le TTL
// retournent le même Arc sans rappeler le fournisseur.
// ============================================================================

use std::sync::Arc;

use chrono::Duration;
use tracing::{instrument, warn};

use crate::api::MarketDataProvider;
use crate::cache::{Clock, TtlCache};
use crate::models::{CompanyInfo, LookbackWindow, PriceSeries};

/// TTL des données de marché (secondes)
pub const MARKET_DATA_TTL_SECS: i64 = 3600;

pub struct MarketDataAccessor {
    provider: Box<dyn MarketDataProvider>,
    info_cache: TtlCache<String, CompanyInfo>,
    history_cache: TtlCache<(String, LookbackWindow), PriceSeries>,
}

impl MarketDataAccessor {
    pub fn new(provider: Box<dyn MarketDataProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            info_cache: TtlCache::new(Arc::clone(&clock)),
            history_cache: TtlCache::new(clock),
        }
    }

    /// Fiche société ; CompanyInfo vide si le fournisseur échoue
    #[instrument(skip(self))]
    pub async fn fetch_info(&mut self, symbol: &str) -> Arc<CompanyInfo> {
        let provider = &self.provider;
        self.info_cache
            .get_or_compute(symbol.to_string(), ttl(), || async move {
                provider.company_info(symbol).await.unwrap_or_else(|e| {
                    warn!(error = ?e, "Company info unavailable, using empty record");
                    CompanyInfo::default()
                })
            })
            .await
    }

    /// Historique de prix ; série vide si le fournisseur échoue
    #[instrument(skip(self, window), fields(window = %window))]
    pub async fn fetch_history(&mut self, symbol: &str, window: LookbackWindow) -> Arc<PriceSeries> {
        let provider = &self.provider;
        self.history_cache
            .get_or_compute((symbol.to_string(), window), ttl(), || async move {
                provider.price_history(symbol, window).await.unwrap_or_else(|e| {
                    warn!(error = ?e, "Price history unavailable, using empty series");
                    PriceSeries::empty(symbol, window)
                })
            })
            .await
    }
}

fn ttl() -> Duration {
    Duration::seconds(MARKET_DATA_TTL_SECS)
}

// ============================================================================
// Tests unitaires
// ============================================================================
