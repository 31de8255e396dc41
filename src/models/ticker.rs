// ============================================================================
// Structure : TickerSymbol
// ============================================================================
// Symbole boursier normalisé (ex: "AAPL", "BRK-B", "^GSPC")
//
// La liste de symboles vient d'un texte libre séparé par des virgules :
// " aapl, tsla ,, nvda" -> [AAPL, TSLA, NVDA]
//
// CONCEPTS RUST :
// 1. Newtype pattern : TickerSymbol(String) empêche de confondre un symbole
//    normalisé avec n'importe quelle String
// 2. Result par élément : un symbole refusé n'empêche pas les autres
// ============================================================================

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TickerError;

/// Longueur maximale d'un symbole accepté en mode strict
const MAX_SYMBOL_LEN: usize = 15;

/// Symbole normalisé (trim + majuscules)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Normalise un morceau de texte ; None si vide après trim
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    /// Vue &str du symbole
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Vrai si le symbole ressemble à un ticker Yahoo
    ///
    /// Lettres, chiffres et `. - ^ =` (BRK-B, ^GSPC, EURUSD=X), 15 caractères max.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() <= MAX_SYMBOL_LEN
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TickerSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Politique appliquée à la liste saisie par l'utilisateur
///
/// Par défaut la liste est rendue telle quelle : doublons affichés deux fois,
/// symboles bizarres envoyés au fournisseur (qui répondra "pas de données").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerListOptions {
    /// Supprime les doublons (garde la première occurrence)
    pub dedupe: bool,

    /// Refuse les symboles mal formés (erreur par ticker au lieu d'un fetch)
    pub reject_malformed: bool,
}

/// Une entrée de la liste : symbole accepté ou refusé
#[derive(Debug, Clone, PartialEq)]
pub struct TickerEntry {
    /// Symbole normalisé
    pub symbol: TickerSymbol,

    /// Erreur si la politique refuse ce symbole
    pub rejection: Option<TickerError>,
}

/// Découpe le texte libre en entrées, dans l'ordre de saisie
///
/// # Exemple
/// "aapl, tsla" -> [AAPL, TSLA]
pub fn parse_ticker_list(input: &str, options: TickerListOptions) -> Vec<TickerEntry> {
    let mut seen = HashSet::new();

    input
        .split(',')
        .filter_map(TickerSymbol::normalize)
        .filter(|symbol| !options.dedupe || seen.insert(symbol.clone()))
        .map(|symbol| {
            let rejection = (options.reject_malformed && !symbol.is_well_formed())
                .then(|| TickerError::MalformedSymbol(symbol.to_string()));
            TickerEntry { symbol, rejection }
        })
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================
