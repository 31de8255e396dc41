// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod company; // Fiche société (prix, capitalisation, 52 semaines, description)
pub mod news;    // Articles de presse
pub mod ohlc;    // Historique de prix et fenêtres de temps
pub mod ticker;  // Symboles et découpage de la liste saisie

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use cyberquotes::models::ticker::TickerSymbol;
// On peut faire : use cyberquotes::models::TickerSymbol;
pub use company::{format_thousands, CompanyInfo, NOT_AVAILABLE};
pub use news::NewsItem;
pub use ohlc::{DailyChange, LookbackWindow, ParseWindowError, PriceSeries, OHLC};
pub use ticker::{parse_ticker_list, TickerEntry, TickerListOptions, TickerSymbol};
