// ============================================================================
// Structures : OHLC et PriceSeries
// ============================================================================
// Une ligne d'historique de prix (Open, High, Low, Close, Volume) et la série
// ordonnée de ces lignes pour un ticker et une fenêtre de temps.
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : type de chrono pour dates avec timezone UTC
// 2. f64 : floating point 64 bits pour les prix
// 3. Enum + FromStr : convertir le texte de l'utilisateur ("1mo") en type fort
// ============================================================================

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fenêtre d'historique demandée au fournisseur de données
///
/// CONCEPT : ensemble fermé de périodes
/// - Les 7 premières sont sélectionnables par l'utilisateur
/// - FiveDays sert uniquement au calcul de la variation journalière
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackWindow {
    /// 5 jours (usage interne : variation journalière)
    FiveDays,
    /// 1 mois
    OneMonth,
    /// 3 mois
    ThreeMonths,
    /// 6 mois
    SixMonths,
    /// 1 an
    OneYear,
    /// 2 ans
    TwoYears,
    /// 5 ans
    FiveYears,
    /// Tout l'historique disponible
    Max,
}

/// Ordre d'affichage du sélecteur de fenêtre
const SELECTABLE: [LookbackWindow; 7] = [
    LookbackWindow::OneMonth,
    LookbackWindow::ThreeMonths,
    LookbackWindow::SixMonths,
    LookbackWindow::OneYear,
    LookbackWindow::TwoYears,
    LookbackWindow::FiveYears,
    LookbackWindow::Max,
];

impl LookbackWindow {
    /// Valeur du paramètre `range` de l'API chart de Yahoo Finance
    ///
    /// CONCEPT RUST : &'static str
    /// - Retourne une string littérale (dans le binaire)
    /// - Pas d'allocation
    pub fn to_yahoo_range(&self) -> &'static str {
        match self {
            LookbackWindow::FiveDays => "5d",
            LookbackWindow::OneMonth => "1mo",
            LookbackWindow::ThreeMonths => "3mo",
            LookbackWindow::SixMonths => "6mo",
            LookbackWindow::OneYear => "1y",
            LookbackWindow::TwoYears => "2y",
            LookbackWindow::FiveYears => "5y",
            LookbackWindow::Max => "max",
        }
    }

    /// Label court pour l'affichage (identique au code Yahoo)
    pub fn label(&self) -> &'static str {
        self.to_yahoo_range()
    }

    /// Fenêtres proposées à l'utilisateur, dans l'ordre du sélecteur
    pub fn selectable() -> &'static [LookbackWindow] {
        &SELECTABLE
    }

    /// Fenêtre suivante dans le sélecteur (cycle)
    ///
    /// FiveDays n'étant pas sélectionnable, il revient sur la première.
    pub fn next(&self) -> LookbackWindow {
        match SELECTABLE.iter().position(|w| w == self) {
            Some(i) => SELECTABLE[(i + 1) % SELECTABLE.len()],
            None => SELECTABLE[0],
        }
    }

    /// Fenêtre précédente dans le sélecteur (cycle)
    pub fn previous(&self) -> LookbackWindow {
        match SELECTABLE.iter().position(|w| w == self) {
            Some(0) | None => SELECTABLE[SELECTABLE.len() - 1],
            Some(i) => SELECTABLE[i - 1],
        }
    }
}

impl Default for LookbackWindow {
    /// Premier choix du sélecteur : 1 mois
    fn default() -> Self {
        LookbackWindow::OneMonth
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Texte de fenêtre non reconnu
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lookback window {0:?} (expected one of 1mo, 3mo, 6mo, 1y, 2y, 5y, max)")]
pub struct ParseWindowError(pub String);

impl FromStr for LookbackWindow {
    type Err = ParseWindowError;

    /// Seules les fenêtres du sélecteur sont acceptées : "5d" reste interne
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LookbackWindow::selectable()
            .iter()
            .copied()
            .find(|w| w.label() == wanted)
            .ok_or_else(|| ParseWindowError(s.to_string()))
    }
}

/// Une ligne d'historique (une séance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OHLC {
    /// Timestamp de la séance
    pub timestamp: DateTime<Utc>,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Volume échangé
    pub volume: u64,
}

impl OHLC {
    /// Constructeur : crée une nouvelle ligne OHLC
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Vrai si les quatre prix sont des nombres finis
    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Variation entre les deux dernières clôtures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyChange {
    /// close[dernier] - close[avant-dernier]
    pub change: f64,
    /// change / close[avant-dernier] * 100
    pub percent: f64,
}

/// Historique de prix d'un ticker, trié par timestamp croissant
///
/// Une série vide est un état valide : "pas de données".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Symbole du ticker
    pub symbol: String,

    /// Fenêtre demandée
    pub window: LookbackWindow,

    /// Lignes, triées par timestamp croissant
    pub rows: Vec<OHLC>,
}

impl PriceSeries {
    /// Crée une série vide
    pub fn new(symbol: String, window: LookbackWindow) -> Self {
        Self {
            symbol,
            window,
            rows: Vec::new(),
        }
    }

    /// Série vide : résultat de repli des accesseurs
    pub fn empty(symbol: &str, window: LookbackWindow) -> Self {
        Self::new(symbol.to_string(), window)
    }

    /// Ajoute une ligne
    pub fn push(&mut self, row: OHLC) {
        self.rows.push(row);
    }

    /// Retourne le nombre de lignes
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Vérifie si la série est vide
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Retourne la ligne la plus récente
    pub fn last(&self) -> Option<&OHLC> {
        self.rows.last()
    }

    /// Prix de clôture, dans l'ordre
    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.close)
    }

    /// Calcule le prix minimum (low) sur toute la période
    pub fn min_price(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.low).reduce(f64::min)
    }

    /// Calcule le prix maximum (high) sur toute la période
    pub fn max_price(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.high).reduce(f64::max)
    }

    /// Vrai si les timestamps sont strictement croissants
    pub fn is_ascending(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
    }

    /// Variation entre les deux dernières clôtures
    ///
    /// None tant que la série a moins de 2 lignes. Le pourcentage peut être
    /// non fini si l'avant-dernière clôture vaut 0 : c'est à l'appelant de le
    /// vérifier.
    pub fn daily_change(&self) -> Option<DailyChange> {
        let [.., previous, last] = self.rows.as_slice() else {
            return None;
        };
        let change = last.close - previous.close;
        Some(DailyChange {
            change,
            percent: change / previous.close * 100.0,
        })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        let mut data = PriceSeries::new("AAPL".to_string(), LookbackWindow::FiveDays);
        for (i, &close) in closes.iter().enumerate() {
            data.push(OHLC::new(start + Duration::days(i as i64), close, close, close, close, 1000));
        }
        data
    }

    #[test]
    fn test_window_parse() {
        assert_eq!("1mo".parse::<LookbackWindow>(), Ok(LookbackWindow::OneMonth));
        assert_eq!(" MAX ".parse::<LookbackWindow>(), Ok(LookbackWindow::Max));
        assert!("10y".parse::<LookbackWindow>().is_err());
        assert_eq!(
            "5d".parse::<LookbackWindow>(),
            Err(ParseWindowError("5d".to_string()))
        );
    }

    #[test]
    fn test_window_yahoo_range() {
        assert_eq!(LookbackWindow::FiveDays.to_yahoo_range(), "5d");
        assert_eq!(LookbackWindow::OneYear.to_yahoo_range(), "1y");
        assert_eq!(LookbackWindow::Max.to_yahoo_range(), "max");
    }

    #[test]
    fn test_window_cycle() {
        assert_eq!(LookbackWindow::OneMonth.next(), LookbackWindow::ThreeMonths);
        assert_eq!(LookbackWindow::Max.next(), LookbackWindow::OneMonth); // Boucle
        assert_eq!(LookbackWindow::OneMonth.previous(), LookbackWindow::Max);
        assert_eq!(LookbackWindow::FiveDays.next(), LookbackWindow::OneMonth);
        assert!(!LookbackWindow::selectable().contains(&LookbackWindow::FiveDays));
    }

    #[test]
    fn test_daily_change_needs_two_rows() {
        assert!(series(&[]).daily_change().is_none());
        assert!(series(&[100.0]).daily_change().is_none());
    }

    #[test]
    fn test_daily_change_last_two_closes() {
        let change = series(&[90.0, 100.0, 105.0]).daily_change().unwrap();
        assert_eq!(change.change, 5.0);
        assert_eq!(change.percent, 5.0);
    }

    #[test]
    fn test_daily_change_over_zero_close_is_not_finite() {
        let change = series(&[0.0, 1.0]).daily_change().unwrap();
        assert!(!change.percent.is_finite());
    }

    #[test]
    fn test_min_max_and_order() {
        let data = series(&[3.0, 1.0, 2.0]);
        assert_eq!(data.min_price(), Some(1.0));
        assert_eq!(data.max_price(), Some(3.0));
        assert!(data.is_ascending());

        let mut reversed = data.clone();
        reversed.rows.reverse();
        assert!(!reversed.is_ascending());
    }
}
