// ============================================================================
// Structure : NewsItem
// ============================================================================
// Article de presse lié à un ticker. Seuls les articles avec un titre ET une
// URL arrivent jusqu'ici : l'accesseur de news filtre le reste.
// ============================================================================

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Source affichée quand le fournisseur n'en donne pas
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Un article de presse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Titre de l'article
    pub headline: String,

    /// Lien vers l'article
    pub url: String,

    /// Éditeur (ex: "Reuters")
    pub source: Option<String>,

    /// Date de publication (timestamp Unix, secondes)
    pub published_at: i64,
}

impl NewsItem {
    /// Source ou "Unknown"
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }

    /// Date de publication au format "Mar 05, 2024", en heure locale
    pub fn published_label(&self) -> String {
        DateTime::from_timestamp(self.published_at, 0)
            .unwrap_or_default()
            .with_timezone(&Local)
            .format("%b %d, %Y")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(source: Option<&str>, published_at: i64) -> NewsItem {
        NewsItem {
            headline: "Apple ships".to_string(),
            url: "https://example.com/a".to_string(),
            source: source.map(str::to_string),
            published_at,
        }
    }

    #[test]
    fn test_source_label() {
        assert_eq!(item(Some("Reuters"), 0).source_label(), "Reuters");
        assert_eq!(item(None, 0).source_label(), "Unknown");
    }

    #[test]
    fn test_published_label() {
        // 2024-03-05 12:00:00 UTC : même jour calendaire pour tout fuseau de -11h à +11h
        assert_eq!(item(None, 1_709_640_000).published_label(), "Mar 05, 2024");
    }
}
