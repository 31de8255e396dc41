// ============================================================================
// Cache TTL et horloge
// ============================================================================
// Couche de mémoïsation des accesseurs : une valeur calculée pour une clé est
// réutilisée jusqu'à son expiration, puis recalculée.
//
// - Pas de LRU, pas de taille maximale : seule l'expiration retire une entrée
// - L'horloge est injectée (trait Clock) pour tester le TTL sans attendre
// - Les valeurs sont partagées via Arc : deux appels dans le TTL rendent
//   exactement le même objet
// ============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

// ============================================================================
// Horloge
// ============================================================================

/// Source de "maintenant" pour le cache, le contrôleur de rafraîchissement et
/// les dates de la requête de news
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Horloge système
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Horloge réglée à la main (tests, rejeu)
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Avance l'horloge
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ============================================================================
// TtlCache
// ============================================================================

/// Entrée du cache : valeur + date d'expiration
#[derive(Debug)]
struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Cache clé -> valeur avec expiration
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    /// Retourne la valeur en cache si elle est encore fraîche, sinon appelle
    /// `compute`, stocke son résultat pour `ttl` et le retourne
    ///
    /// CONCEPT RUST : FnOnce() -> Future
    /// - compute n'est appelé qu'en cas de miss
    /// - le calcul async est attendu ici, le cache reste la seule source
    pub async fn get_or_compute<F, Fut>(&mut self, key: K, ttl: Duration, compute: F) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(&key) {
            if entry.is_fresh(now) {
                trace!(?key, "Cache hit");
                return Arc::clone(&entry.value);
            }
        }

        trace!(?key, "Cache miss");
        let value = Arc::new(compute().await);

        // Le calcul a pu prendre du temps : l'expiration part de la fin du calcul
        let issued_at = self.clock.now();
        self.purge_expired(issued_at);
        self.entries.insert(
            key,
            CacheEntry {
                value: Arc::clone(&value),
                expires_at: issued_at + ttl,
            },
        );
        value
    }

    /// Retire les entrées expirées
    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| entry.is_fresh(now));
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn test_hit_within_ttl_returns_same_object() {
        let clock = clock();
        let mut cache: TtlCache<String, Vec<u32>> = TtlCache::new(clock.clone());
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_compute("AAPL".to_string(), Duration::seconds(3600), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                vec![1, 2, 3]
            })
            .await;

        clock.advance(Duration::seconds(3599));
        let second = cache
            .get_or_compute("AAPL".to_string(), Duration::seconds(3600), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                vec![4]
            })
            .await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recompute_after_expiry() {
        let clock = clock();
        let mut cache: TtlCache<&'static str, u32> = TtlCache::new(clock.clone());

        let first = cache.get_or_compute("k", Duration::seconds(60), || async { 1 }).await;
        clock.advance(Duration::seconds(60));
        let second = cache.get_or_compute("k", Duration::seconds(60), || async { 2 }).await;

        assert_eq!(*first, 1);
        assert_eq!(*second, 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let clock = clock();
        let mut cache: TtlCache<(&'static str, u8), u8> = TtlCache::new(clock);

        let a = cache.get_or_compute(("AAPL", 1), Duration::seconds(60), || async { 1 }).await;
        let b = cache.get_or_compute(("AAPL", 2), Duration::seconds(60), || async { 2 }).await;

        assert_eq!((*a, *b), (1, 2));
        assert_eq!(cache.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_expired_entries_purged_on_insert() {
        let clock = clock();
        let mut cache: TtlCache<&'static str, u8> = TtlCache::new(clock.clone());

        cache.get_or_compute("old", Duration::seconds(10), || async { 1 }).await;
        clock.advance(Duration::seconds(11));
        cache.get_or_compute("new", Duration::seconds(10), || async { 2 }).await;

        assert_eq!(cache.entries.len(), 1);
    }
}
