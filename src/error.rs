// ============================================================================
// Erreurs par ticker
// ============================================================================
// Une erreur ne concerne jamais qu'un seul ticker : le pipeline la stocke dans
// la section du ticker et passe au suivant.
// ============================================================================

use thiserror::Error;

/// Échec du traitement d'un ticker
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickerError {
    /// Symbole refusé par la politique de liste (caractères invalides, trop long)
    #[error("malformed ticker symbol {0:?}")]
    MalformedSymbol(String),

    /// Prix non fini (NaN, infini) dans l'historique
    #[error("price history contains a non-finite value at row {row}")]
    NonFiniteHistory { row: usize },

    /// Historique non trié par timestamp croissant
    #[error("price history is not in ascending timestamp order")]
    UnorderedHistory,
}
