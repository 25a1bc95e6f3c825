use prometheus::{IntCounter, Opts, Registry};

/// Tellere for cache og persistering, registrert i et eget `Registry`.
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Registry,
    persist_writes: IntCounter,
    persist_failures: IntCounter,
    loaded_entries: IntCounter,
    clears: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    // Navnene er statiske og gyldige; with_opts feiler bare på ugyldige navn
    let c = IntCounter::with_opts(Opts::new(name, help).namespace("cardiowatch"))
        .expect("statisk metrikknavn");
    if let Err(e) = registry.register(Box::new(c.clone())) {
        log::warn!("kunne ikke registrere {name}: {e}");
    }
    c
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        Self {
            persist_writes: counter(&registry, "persist_writes_total", "Vellykkede skriv av klokkestatistikk"),
            persist_failures: counter(&registry, "persist_failures_total", "Feilede skriv (prøves igjen)"),
            loaded_entries: counter(&registry, "cache_loaded_entries_total", "Poster lest inn ved oppstart"),
            clears: counter(&registry, "cache_clears_total", "Antall clear_all"),
            registry,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

pub fn persist_writes_total(metrics: &Metrics) -> &IntCounter {
    &metrics.persist_writes
}

pub fn persist_failures_total(metrics: &Metrics) -> &IntCounter {
    &metrics.persist_failures
}

pub fn cache_loaded_entries_total(metrics: &Metrics) -> &IntCounter {
    &metrics.loaded_entries
}

pub fn cache_clears_total(metrics: &Metrics) -> &IntCounter {
    &metrics.clears
}
