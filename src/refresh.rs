// ============================================================================
// Contrôleur de rafraîchissement
// ============================================================================
// Décide, à chaque passe de rendu, si l'intervalle de rafraîchissement est
// écoulé. Il ne relance rien lui-même : il répond Due et la boucle
// d'événements démarre une nouvelle passe du pipeline.
//
// CONCEPT : State machine à deux états
// - Idle : intervalle pas encore écoulé, rien à faire
// - Due  : intervalle écoulé, last_refresh remis à maintenant
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Bornes de l'intervalle (secondes)
pub const MIN_REFRESH_SECS: u64 = 10;
pub const MAX_REFRESH_SECS: u64 = 300;
pub const DEFAULT_REFRESH_SECS: u64 = 60;

/// Intervalle de rafraîchissement, toujours dans [10, 300] secondes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    /// Crée un intervalle ; les valeurs hors bornes sont ramenées dans [10, 300]
    pub fn new(secs: u64) -> Self {
        Self(secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS))
    }

    pub fn secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.0 as i64)
    }

    /// Ajoute (ou retire) des secondes, en restant dans les bornes
    pub fn step(&self, delta: i64) -> Self {
        Self::new(self.0.saturating_add_signed(delta))
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self(DEFAULT_REFRESH_SECS)
    }
}

/// Résultat d'une passe de rendu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Intervalle pas encore écoulé
    Idle,
    /// Intervalle écoulé : une nouvelle passe du pipeline est demandée
    Due,
}

/// État de rafraîchissement de la session
#[derive(Debug, Clone)]
pub struct RefreshController {
    interval: RefreshInterval,
    last_refresh: Option<DateTime<Utc>>,
}

impl RefreshController {
    pub fn new(interval: RefreshInterval) -> Self {
        Self {
            interval,
            last_refresh: None,
        }
    }

    /// À appeler à chaque passe de rendu
    ///
    /// - Première passe : last_refresh = now, Idle
    /// - now - last_refresh > intervalle : last_refresh = now, Due
    /// - sinon : Idle, rien ne change
    pub fn on_render_pass(&mut self, now: DateTime<Utc>) -> RefreshState {
        let Some(last) = self.last_refresh else {
            self.last_refresh = Some(now);
            return RefreshState::Idle;
        };

        if now - last > self.interval.as_duration() {
            debug!(elapsed_secs = (now - last).num_seconds(), interval = self.interval.secs(), "Refresh due");
            self.last_refresh = Some(now);
            RefreshState::Due
        } else {
            RefreshState::Idle
        }
    }

    pub fn set_interval(&mut self, interval: RefreshInterval) {
        self.interval = interval;
    }

    /// Temps restant avant la prochaine passe Due (compte à rebours de l'en-tête)
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_refresh?;
        let remaining = self.interval.as_duration() - (now - last);
        Some(remaining.max(Duration::zero()))
    }
}

impl Default for RefreshController {
    fn default() -> Self {
        Self::new(RefreshInterval::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_interval_clamped() {
        assert_eq!(RefreshInterval::new(5).secs(), 10);
        assert_eq!(RefreshInterval::new(1000).secs(), 300);
        assert_eq!(RefreshInterval::default().secs(), 60);
        assert_eq!(RefreshInterval::new(10).step(-10).secs(), 10);
        assert_eq!(RefreshInterval::new(60).step(10).secs(), 70);
    }

    #[test]
    fn test_first_pass_initializes() {
        let mut controller = RefreshController::default();
        assert_eq!(controller.on_render_pass(t0()), RefreshState::Idle);
        assert_eq!(controller.last_refresh, Some(t0()));
    }

    #[test]
    fn test_due_after_61_seconds() {
        let mut controller = RefreshController::new(RefreshInterval::new(60));
        controller.on_render_pass(t0());

        let now = t0() + Duration::seconds(61);
        assert_eq!(controller.on_render_pass(now), RefreshState::Due);
        assert_eq!(controller.last_refresh, Some(now));
    }

    #[test]
    fn test_idle_at_59_seconds() {
        let mut controller = RefreshController::new(RefreshInterval::new(60));
        controller.on_render_pass(t0());

        let now = t0() + Duration::seconds(59);
        assert_eq!(controller.on_render_pass(now), RefreshState::Idle);
        assert_eq!(controller.last_refresh, Some(t0()));
    }

    #[test]
    fn test_exactly_interval_is_idle() {
        let mut controller = RefreshController::new(RefreshInterval::new(60));
        controller.on_render_pass(t0());
        assert_eq!(
            controller.on_render_pass(t0() + Duration::seconds(60)),
            RefreshState::Idle
        );
    }

    #[test]
    fn test_remaining() {
        let mut controller = RefreshController::new(RefreshInterval::new(60));
        assert_eq!(controller.remaining(t0()), None);

        controller.on_render_pass(t0());
        assert_eq!(controller.remaining(t0() + Duration::seconds(20)), Some(Duration::seconds(40)));
        assert_eq!(controller.remaining(t0() + Duration::seconds(90)), Some(Duration::zero()));
    }
}
