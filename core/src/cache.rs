// core/src/cache.rs
//! Klokke-cache: én autoritativ kopi i minnet av statistikk per aktivitet,
//! med debouncet persistering og best-effort innlesing ved oppstart.
//!
//! Cachen opprettes ved oppstart av appen og sendes videre til de som trenger
//! den (lagre-flyt, start/slutt av økt). Den er en hjelp for korroborering,
//! ikke fasit: tom cache er alltid en trygg tilstand.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::CacheConfig;
use crate::metrics::{cache_clears_total, cache_loaded_entries_total, Metrics};
use crate::models::{ActivityId, ActivityStats, StatsMap};
use crate::persist::PersistWorker;
use crate::stats::{compute_derived, DerivedStats};
use crate::storage::{load_json, KeyValueStore};

pub struct WatchStatsCache {
    stats: Mutex<StatsMap>,
    store: Arc<dyn KeyValueStore>,
    key: String,
    persist: PersistWorker,
    metrics: Metrics,
}

impl WatchStatsCache {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self::with_metrics(store, config, Metrics::new())
    }

    pub fn with_metrics(store: Arc<dyn KeyValueStore>, config: &CacheConfig, metrics: Metrics) -> Self {
        let persist = PersistWorker::spawn(
            store.clone(),
            config.stats_key.clone(),
            config.persist_interval(),
            metrics.clone(),
        );
        Self {
            stats: Mutex::new(StatsMap::new()),
            store,
            key: config.stats_key.clone(),
            persist,
            metrics,
        }
    }

    fn map(&self) -> MutexGuard<'_, StatsMap> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Les inn persistert tilstand og flett den inn (innleste poster vinner).
    /// Lese- og parsefeil svelges; cachen blir da stående som før.
    /// Returnerer antall innleste poster.
    pub fn init(&self) -> usize {
        let loaded: StatsMap = match load_json(self.store.as_ref(), &self.key) {
            Ok(Some(map)) => map,
            Ok(None) => return 0,
            Err(e) => {
                log::warn!("klarte ikke lese klokkestatistikk ({}), starter tom: {e}", self.key);
                return 0;
            }
        };

        let n = loaded.len();
        self.map().extend(loaded);
        cache_loaded_entries_total(&self.metrics).inc_by(n as u64);
        log::info!("📂 klokkestatistikk lastet ({n} aktiviteter)");
        n
    }

    pub fn get(&self, id: &ActivityId) -> Option<ActivityStats> {
        self.map().get(id).cloned()
    }

    pub fn contains(&self, id: &ActivityId) -> bool {
        self.map().contains_key(id)
    }

    /// `None` fjerner posten, `Some` setter inn/erstatter.
    /// Hele mappen legges deretter i persisteringssporet.
    pub fn set(&self, id: ActivityId, stats: Option<ActivityStats>) {
        let mut map = self.map();
        match stats {
            Some(s) => {
                map.insert(id, s);
            }
            None => {
                map.remove(&id);
            }
        }

        // Planlegges under låsen: sporet skal alltid holde siste tilstand
        if let Err(e) = self.persist.schedule(map.clone()) {
            log::warn!("kunne ikke planlegge lagring: {e}");
        }
    }

    /// Tøm cachen og slett den persisterte kopien (feil svelges).
    ///
    /// Et ventende snapshot forkastes. En skriving som allerede pågår
    /// avbrytes ikke; lykkes den vinner den som skriver sist, feiler den
    /// blir den ikke prøvd igjen.
    pub fn clear_all(&self) {
        {
            let mut map = self.map();
            map.clear();
            self.persist.discard_pending();
        }
        cache_clears_total(&self.metrics).inc();

        if let Err(e) = self.store.remove_item(&self.key) {
            log::warn!("sletting av {} feilet (ignorert): {e}", self.key);
        }
    }

    /// Tving ut ventende snapshot nå. `false` hvis skrivingen feilet
    /// (den prøves da igjen i bakgrunnen).
    pub fn flush(&self) -> bool {
        match self.persist.flush() {
            Ok(done) => done,
            Err(e) => {
                log::warn!("flush feilet: {e}");
                false
            }
        }
    }

    pub fn compute_derived(stats: &ActivityStats) -> DerivedStats {
        compute_derived(stats)
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    pub fn snapshot(&self) -> StatsMap {
        self.map().clone()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
