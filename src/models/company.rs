// ============================================================================
// Structure : CompanyInfo
// ============================================================================
// Fiche société renvoyée par le fournisseur de données.
//
// Tous les champs sont optionnels : un champ absent (None) s'affiche "N/A",
// alors qu'une valeur à zéro s'affiche comme un montant nul.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Texte affiché quand une métrique est absente
pub const NOT_AVAILABLE: &str = "N/A";

/// Métadonnées d'une société
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Nom complet (ex: "Apple Inc.")
    pub long_name: Option<String>,

    /// Nom court (ex: "Apple")
    pub short_name: Option<String>,

    /// Prix temps réel
    pub current_price: Option<f64>,

    /// Prix de marché (différé)
    pub regular_market_price: Option<f64>,

    /// Capitalisation boursière
    pub market_cap: Option<f64>,

    /// Plus haut sur 52 semaines
    pub fifty_two_week_high: Option<f64>,

    /// Plus bas sur 52 semaines
    pub fifty_two_week_low: Option<f64>,

    /// Description de l'activité
    pub business_summary: Option<String>,
}

impl CompanyInfo {
    /// Vrai si aucun champ n'est renseigné (résultat de repli)
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Nom à afficher dans l'en-tête : nom complet, nom court, sinon le symbole
    pub fn display_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.long_name
            .as_deref()
            .or(self.short_name.as_deref())
            .unwrap_or(symbol)
    }

    /// Prix affiché : temps réel de préférence, sinon prix différé
    pub fn price(&self) -> Option<f64> {
        self.current_price.or(self.regular_market_price)
    }

    /// Plus haut / plus bas 52 semaines, seulement si les deux existent
    pub fn fifty_two_week_range(&self) -> Option<(f64, f64)> {
        self.fifty_two_week_high.zip(self.fifty_two_week_low)
    }

    /// Description si présente et non blanche
    pub fn summary(&self) -> Option<&str> {
        self.business_summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Formate un nombre avec séparateurs de milliers et `decimals` décimales
///
/// # Exemple
/// format_thousands(1234567.891, 2) -> "1,234,567.89"
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_prefers_current() {
        let info = CompanyInfo {
            current_price: Some(190.0),
            regular_market_price: Some(189.5),
            ..Default::default()
        };
        assert_eq!(info.price(), Some(190.0));

        let delayed = CompanyInfo {
            regular_market_price: Some(189.5),
            ..Default::default()
        };
        assert_eq!(delayed.price(), Some(189.5));
        assert_eq!(CompanyInfo::default().price(), None);
    }

    #[test]
    fn test_zero_is_not_absent() {
        let info = CompanyInfo {
            current_price: Some(0.0),
            ..Default::default()
        };
        assert_eq!(info.price(), Some(0.0));
        assert!(!info.is_empty());
    }

    #[test]
    fn test_range_requires_both() {
        let info = CompanyInfo {
            fifty_two_week_high: Some(200.0),
            ..Default::default()
        };
        assert_eq!(info.fifty_two_week_range(), None);
    }

    #[test]
    fn test_summary_blank_is_missing() {
        let info = CompanyInfo {
            business_summary: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(info.summary(), None);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let info = CompanyInfo {
            short_name: Some("Apple".to_string()),
            ..Default::default()
        };
        assert_eq!(info.display_name("AAPL"), "Apple");
        assert_eq!(CompanyInfo::default().display_name("AAPL"), "AAPL");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(3_000_000_000.0, 0), "3,000,000,000");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(0.0, 2), "0.00");
        assert_eq!(format_thousands(-1234.5, 1), "-1,234.5");
    }
}
