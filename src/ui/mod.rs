// ============================================================================
// Module : ui
// ============================================================================
// Interface terminal : événements clavier, dashboard, graphiques
// ============================================================================

pub mod chart;     // Graphique ligne + repli sparkline
pub mod dashboard; // Header, panneau de contrôle, section ticker, footer
pub mod events;    // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
