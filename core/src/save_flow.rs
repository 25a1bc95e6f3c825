// core/src/save_flow.rs
use serde_json::Value;

use crate::cache::WatchStatsCache;
use crate::error::CardioResult;
use crate::config::UnitSystem;
use crate::merge::{
    convert_for_request, decide_with, prepare_for_request, CardioInputs, CardioPayload, Corroboration,
};
use crate::models::ActivityId;
use crate::patch::Patch;
use crate::service::CardioService;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaveOutcome {
    pub id: i64,
    pub broken_record: Option<Value>,
    pub milestone: Option<Value>,
    /// true hvis klokkeverdier på serveren ble beskyttet
    pub corroborated: bool,
}

/// Lagring av inntastede data for en cardio-økt.
pub struct SaveFlow<'a, S: CardioService + ?Sized> {
    cache: &'a WatchStatsCache,
    service: &'a S,
    units: UnitSystem,
}

impl<'a, S: CardioService + ?Sized> SaveFlow<'a, S> {
    pub fn new(cache: &'a WatchStatsCache, service: &'a S) -> Self {
        Self {
            cache,
            service,
            units: UnitSystem::default(),
        }
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    /// 1) bygg kandidat fra skjema og konverter enheter (roing: meter -> km/miles)
    /// 2) ingen klokkestatistikk lokalt => redigering, send som den er
    /// 3) ellers hent posten på nytt, korroborer og slå sammen
    /// 4) tøm cachen når serveren har tatt imot
    ///
    /// Feiler tjenesten, beholdes cachen.
    pub fn save_input_data(
        &self,
        user_id: i64,
        id: i64,
        exercise_id: Option<i64>,
        inputs: &CardioInputs,
        comments: Option<Value>,
    ) -> CardioResult<SaveOutcome> {
        let candidate = CardioPayload {
            id: Some(id),
            comments: comments.map(Patch::Value).unwrap_or_default(),
            ..convert_for_request(prepare_for_request(inputs), self.units, exercise_id)
        };

        let (payload, corroborated) = if self.cache.contains(&ActivityId::from(id)) {
            let record = self.service.get(user_id, id)?;
            let corroboration = Corroboration::from_record(&record);
            log::info!(
                "cardio {id}: klokkeverdier på server={}, forrige kalorier={:?}",
                corroboration.has_watch_stats,
                corroboration.previous_calories
            );
            (decide_with(corroboration, candidate), corroboration.has_watch_stats)
        } else {
            log::debug!("cardio {id}: ingen lokal klokkestatistikk, lagrer telefonverdier");
            (candidate, false)
        };

        let res = self.service.set(user_id, &payload)?;
        self.cache.clear_all();

        Ok(SaveOutcome {
            id: res.id,
            broken_record: res.broken_record,
            milestone: res.milestone,
            corroborated,
        })
    }
}
