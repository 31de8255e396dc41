// ============================================================================
// Cyberquotes - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod accessor; // Accesseurs mémoïsés (marché, news)
pub mod api;      // Clients Yahoo Finance et Finnhub
pub mod app;      // État de l'application
pub mod cache;    // Cache TTL et horloge
pub mod config;   // Ligne de commande et réglages
pub mod error;    // Erreurs par ticker
pub mod models;   // Structures de données
pub mod pipeline; // Passe de rendu par ticker
pub mod refresh;  // Contrôleur de rafraîchissement automatique
pub mod ui;       // Interface utilisateur
