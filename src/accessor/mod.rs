// ============================================================================
// Module : accessor
// ============================================================================
// Couche entre le pipeline et les fournisseurs :
// - mémoïsation TTL (cache.rs)
// - aucune erreur ne sort : un échec devient un résultat vide
// ============================================================================

pub mod market; // Fiche société + historique, TTL 1h
pub mod news;   // News société, TTL 30 min

pub use market::{MarketDataAccessor, MARKET_DATA_TTL_SECS};
pub use news::{NewsAccessor, NEWS_LOOKBACK_DAYS, NEWS_TTL_SECS};
