// core/src/persist.rs
//! Debouncet persistering av klokkestatistikk.
//!
//! En egen skrivetråd eier ett spor med "siste ventende snapshot" og en
//! timer. Første snapshot i et vindu armerer fristen (`interval` frem i tid);
//! nye snapshots erstatter bare sporet. Ved fristen tas sporet og skrives.
//! Feiler skrivingen legges snapshot tilbake (hvis ikke et nyere har kommet
//! og sporet ikke er tømt i mellomtiden) og fristen armeres på nytt, uten
//! øvre grense på antall forsøk.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

use crate::error::{CardioError, CardioResult};
use crate::metrics::{persist_failures_total, persist_writes_total, Metrics};
use crate::models::StatsMap;
use crate::storage::{save_json, KeyValueStore};

/// Ventende snapshot og generasjon. Generasjonen økes hver gang sporet
/// tømmes utenfra, så en feilet skriving av et eldre snapshot ikke legges
/// tilbake etter en `discard_pending`.
#[derive(Default)]
struct Pending {
    snapshot: Option<StatsMap>,
    generation: u64,
}

type Slot = Arc<Mutex<Pending>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Pending> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

enum PersistCommand {
    Schedule,
    /// Skriv ventende snapshot nå; svarer `true` hvis ingenting venter etterpå
    Flush(Sender<bool>),
    Shutdown,
}

struct Writer {
    slot: Slot,
    store: Arc<dyn KeyValueStore>,
    key: String,
    interval: Duration,
    metrics: Metrics,
}

pub struct PersistWorker {
    slot: Slot,
    command_tx: Sender<PersistCommand>,
    writer_thread: Option<JoinHandle<()>>,
}

impl PersistWorker {
    pub fn spawn(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        interval: Duration,
        metrics: Metrics,
    ) -> Self {
        let (command_tx, command_rx) = unbounded();
        let slot: Slot = Arc::new(Mutex::new(Pending::default()));
        let writer = Writer {
            slot: slot.clone(),
            store,
            key: key.into(),
            interval,
            metrics,
        };

        let writer_thread = thread::Builder::new()
            .name("cardiowatch-persist".into())
            .spawn(move || writer.run(command_rx))
            .map_err(|e| log::error!("kunne ikke starte persisteringstråd: {e}"))
            .ok();

        Self {
            slot,
            command_tx,
            writer_thread,
        }
    }

    /// Legg snapshot i sporet og gi skrivetråden beskjed. Blokkerer aldri på I/O.
    pub fn schedule(&self, snapshot: StatsMap) -> CardioResult<()> {
        lock(&self.slot).snapshot = Some(snapshot);
        self.command_tx
            .send(PersistCommand::Schedule)
            .map_err(|_| CardioError::WorkerGone)
    }

    /// Forkast ventende (ikke påbegynt) snapshot. En skriving som allerede
    /// er i gang avbrytes ikke, men feiler den blir snapshot ikke prøvd igjen.
    pub fn discard_pending(&self) -> bool {
        let mut pending = lock(&self.slot);
        pending.generation = pending.generation.wrapping_add(1);
        pending.snapshot.take().is_some()
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.slot).snapshot.is_some()
    }

    /// Skriv ventende snapshot nå og vent på svar.
    /// `Ok(false)` betyr at skrivingen feilet og snapshot fortsatt venter.
    pub fn flush(&self) -> CardioResult<bool> {
        let (ack_tx, ack_rx) = bounded(1);
        self.command_tx
            .send(PersistCommand::Flush(ack_tx))
            .map_err(|_| CardioError::WorkerGone)?;
        ack_rx.recv().map_err(|_| CardioError::WorkerGone)
    }
}

impl Drop for PersistWorker {
    fn drop(&mut self) {
        let _ = self.command_tx.send(PersistCommand::Shutdown);
        if let Some(handle) = self.writer_thread.take() {
            if handle.join().is_err() {
                log::error!("persisteringstråden panikket");
            }
        }
    }
}

impl Writer {
    fn run(self, command_rx: Receiver<PersistCommand>) {
        let mut deadline: Option<Instant> = None;

        loop {
            let command = match deadline {
                None => match command_rx.recv() {
                    Ok(c) => c,
                    Err(_) => return,
                },
                Some(due) => {
                    match command_rx.recv_timeout(due.saturating_duration_since(Instant::now())) {
                        Ok(c) => c,
                        Err(RecvTimeoutError::Timeout) => {
                            deadline = self.write_pending();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            self.write_pending();
                            return;
                        }
                    }
                }
            };

            match command {
                PersistCommand::Schedule => {
                    if deadline.is_none() {
                        deadline = Some(Instant::now() + self.interval);
                    }
                }
                PersistCommand::Flush(ack) => {
                    deadline = self.write_pending();
                    let _ = ack.send(deadline.is_none());
                }
                PersistCommand::Shutdown => {
                    self.write_pending();
                    log::debug!("persisteringstråd stoppet");
                    return;
                }
            }
        }
    }

    /// Skriv sporet hvis noe venter. Returnerer ny frist hvis skrivingen feilet.
    fn write_pending(&self) -> Option<Instant> {
        let (snapshot, generation) = {
            let mut pending = lock(&self.slot);
            (pending.snapshot.take()?, pending.generation)
        };

        match save_json(self.store.as_ref(), &self.key, &snapshot) {
            Ok(()) => {
                persist_writes_total(&self.metrics).inc();
                log::debug!("klokkestatistikk lagret ({} aktiviteter)", snapshot.len());
                None
            }
            Err(e) => {
                persist_failures_total(&self.metrics).inc();
                log::warn!("lagring av klokkestatistikk feilet, prøver igjen: {e}");
                let mut pending = lock(&self.slot);
                if pending.generation != generation {
                    log::debug!("sporet ble tømt under skrivingen, forkaster gammelt snapshot");
                } else if pending.snapshot.is_none() {
                    pending.snapshot = Some(snapshot);
                }
                pending
                    .snapshot
                    .is_some()
                    .then(|| Instant::now() + self.interval)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityId, ActivityStats};
    use crate::storage::MemoryStore;

    fn snapshot(active: f64) -> StatsMap {
        let mut m = StatsMap::new();
        m.insert(
            ActivityId::from(7_i64),
            ActivityStats {
                active_calories: Some(active),
                ..Default::default()
            },
        );
        m
    }

    #[test]
    fn flush_writes_latest_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let worker = PersistWorker::spawn(store.clone(), "k", Duration::from_secs(60), Metrics::new());
        worker.schedule(snapshot(1.0)).unwrap();
        worker.schedule(snapshot(2.0)).unwrap();
        assert!(worker.flush().unwrap());
        let saved = store.get_item("k").unwrap().unwrap();
        let back: StatsMap = serde_json::from_str(&saved).unwrap();
        assert_eq!(back, snapshot(2.0));
        assert!(!worker.has_pending());
    }

    #[test]
    fn discard_pending_prevents_write() {
        let store = Arc::new(MemoryStore::new());
        let worker = PersistWorker::spawn(store.clone(), "k", Duration::from_secs(60), Metrics::new());
        worker.schedule(snapshot(1.0)).unwrap();
        assert!(worker.discard_pending());
        assert!(worker.flush().unwrap());
        assert!(store.get_item("k").unwrap().is_none());
    }

    #[test]
    fn drop_flushes_pending() {
        let store = Arc::new(MemoryStore::new());
        {
            let worker = PersistWorker::spawn(store.clone(), "k", Duration::from_secs(60), Metrics::new());
            worker.schedule(snapshot(3.0)).unwrap();
        }
        assert!(store.get_item("k").unwrap().is_some());
    }
}
