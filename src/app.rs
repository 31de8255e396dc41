// ============================================================================
// Structure : App
// ============================================================================
// État du TUI : réglages de la session, dernier rapport de passe, sélection,
// mode de saisie et confirmations.
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Enum pour le mode de saisie : tickers ou clé API, jamais les deux
//
// App ne fait aucun appel réseau : elle demande une passe (request_pass) et
// la boucle principale l'exécute.
// ============================================================================

use tracing::debug;

use crate::config::Settings;
use crate::pipeline::{PassReport, TickerOutcome};
use crate::refresh::RefreshInterval;

/// Pas de réglage de l'intervalle avec + / - (secondes)
pub const REFRESH_STEP_SECS: i64 = 10;

// ============================================================================
// Enums : Screen et InputTarget
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : panneau de contrôle + section du ticker sélectionné
    Dashboard,

    /// Mode saisie : les touches remplissent le buffer
    /// - Enter valide, ESC annule
    InputMode,
}

/// Champ en cours d'édition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    /// Liste de tickers séparés par des virgules
    Tickers,

    /// Clé Finnhub (affichée masquée)
    ApiKey,
}

impl InputTarget {
    pub fn prompt(&self) -> &'static str {
        match self {
            InputTarget::Tickers => "Tickers (comma-separated): ",
            InputTarget::ApiKey => "Finnhub API key: ",
        }
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Réglages courants (tickers, fenêtre, intervalle, clé, politique)
    pub settings: Settings,

    /// Résultat de la dernière passe ; None avant la première
    pub report: Option<PassReport>,

    /// Index du ticker sélectionné dans le rapport
    pub selected_index: usize,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Champ édité en mode saisie
    pub input_target: InputTarget,

    /// Buffer de saisie
    pub input_buffer: String,

    /// Two-step quit : première pression de 'q' -> true, deuxième -> quit
    pub confirm_quit: bool,

    /// Passe en cours
    pub is_loading: bool,

    /// Message affiché pendant la passe
    pub loading_message: Option<String>,

    /// Secondes avant le prochain rafraîchissement automatique
    pub countdown_secs: Option<i64>,

    /// Une nouvelle passe est demandée (réglage modifié, 'r', intervalle écoulé)
    pass_requested: bool,
}

impl App {
    /// Crée l'application ; la première passe est demandée d'office
    pub fn new(settings: Settings) -> Self {
        Self {
            running: true,
            settings,
            report: None,
            selected_index: 0,
            current_screen: Screen::Dashboard,
            input_target: InputTarget::Tickers,
            input_buffer: String::new(),
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            countdown_secs: None,
            pass_requested: true,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Demande une nouvelle passe au prochain tour de boucle
    pub fn request_pass(&mut self) {
        self.pass_requested = true;
    }

    /// Consomme la demande de passe
    ///
    /// CONCEPT RUST : std::mem::take
    /// - Lit le booléen et le remet à false en une opération
    pub fn take_pass_request(&mut self) -> bool {
        std::mem::take(&mut self.pass_requested)
    }

    /// Installe le rapport d'une passe terminée
    ///
    /// La sélection est ramenée dans les bornes si la liste a rétréci.
    pub fn apply_report(&mut self, report: PassReport) {
        let max_index = report.sections.len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
        self.report = Some(report);
    }

    /// Nombre de tickers du dernier rapport
    pub fn section_count(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.sections.len())
    }

    /// Section du ticker sélectionné
    pub fn selected_section(&self) -> Option<&TickerOutcome> {
        self.report.as_ref()?.sections.get(self.selected_index)
    }

    // ========================================================================
    // Navigation et réglages
    // ========================================================================

    /// CONCEPT RUST : saturating_sub, pas de panic sur usize à 0
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.section_count().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Fenêtre suivante (1mo → 3mo → … → max → 1mo) et nouvelle passe
    pub fn next_window(&mut self) {
        self.settings.window = self.settings.window.next();
        self.request_pass();
    }

    /// Fenêtre précédente et nouvelle passe
    pub fn previous_window(&mut self) {
        self.settings.window = self.settings.window.previous();
        self.request_pass();
    }

    /// Ajuste l'intervalle de rafraîchissement, borné à [10, 300]
    ///
    /// Pas de nouvelle passe : seul le compte à rebours change.
    pub fn step_refresh(&mut self, delta: i64) -> RefreshInterval {
        self.settings.refresh_interval = self.settings.refresh_interval.step(delta);
        debug!(interval = self.settings.refresh_interval.secs(), "Refresh interval changed");
        self.settings.refresh_interval
    }

    /// Active / désactive la suppression des doublons et relance une passe
    pub fn toggle_dedupe(&mut self) {
        self.settings.ticker_options.dedupe = !self.settings.ticker_options.dedupe;
        self.request_pass();
    }

    // ========================================================================
    // Two-step quit
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Input Mode
    // ========================================================================

    /// Entre en mode saisie, pré-rempli avec la valeur actuelle du champ
    pub fn start_input(&mut self, target: InputTarget) {
        self.current_screen = Screen::InputMode;
        self.input_target = target;
        self.input_buffer = match target {
            InputTarget::Tickers => self.settings.tickers_input.clone(),
            InputTarget::ApiKey => self.settings.news_api_key.clone(),
        };
    }

    /// Annule la saisie, les réglages ne changent pas
    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
    }

    /// Valide la saisie dans le champ visé et demande une passe si la
    /// valeur a changé
    pub fn submit_input(&mut self) {
        let value = std::mem::take(&mut self.input_buffer);
        self.current_screen = Screen::Dashboard;

        let field = match self.input_target {
            InputTarget::Tickers => &mut self.settings.tickers_input,
            InputTarget::ApiKey => &mut self.settings.news_api_key,
        };
        let value = value.trim().to_string();
        if *field != value {
            *field = value;
            self.request_pass();
        }
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    /// Buffer tel qu'affiché : la clé API est masquée
    pub fn displayed_input(&self) -> String {
        match self.input_target {
            InputTarget::Tickers => self.input_buffer.clone(),
            InputTarget::ApiKey => "•".repeat(self.input_buffer.chars().count()),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
