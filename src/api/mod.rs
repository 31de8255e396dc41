// ============================================================================
// Module : api
// ============================================================================
// Clients des fournisseurs externes (Yahoo Finance, Finnhub) et les traits
// qu'ils implémentent. Les accesseurs ne connaissent que les traits : les
// tests branchent des faux fournisseurs à la place des clients HTTP.
//
// CONCEPT RUST : async-trait
// - Les méthodes async dans un trait object (Box<dyn ...>) passent par la
//   macro #[async_trait]
// ============================================================================

pub mod finnhub; // Client API Finnhub (company news)
pub mod yahoo;   // Client API Yahoo Finance (chart + quoteSummary)

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{CompanyInfo, LookbackWindow, PriceSeries};

pub use finnhub::FinnhubClient;
pub use yahoo::YahooClient;

/// Fournisseur de données de marché
///
/// Les erreurs remontent ici ; c'est l'accesseur qui les transforme en
/// résultat vide.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fiche société
    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo>;

    /// Historique de prix sur la fenêtre demandée
    async fn price_history(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries>;
}

/// Paramètres d'une requête de news
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRequest {
    pub symbol: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub token: String,
}

/// Article tel que renvoyé par le fournisseur, avant filtrage
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawNewsItem {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub datetime: Option<i64>,
}

/// Fournisseur de news
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn company_news(&self, request: &NewsRequest) -> Result<Vec<RawNewsItem>>;
}
