// core/src/merge.rs
//! Lagre-beslutning: skal verdier tastet på telefonen stoles på, eller skal
//! klokkeverdiene som allerede ligger på serveren beskyttes?

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cardio_types::CardioType;
use crate::config::UnitSystem;
use crate::models::{CardioRecord, CardioStatus};
use crate::patch::Patch;

/// Data fra inntastingsskjemaet (eller fra timer når økten avsluttes).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardioInputs {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub distance: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub time: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub level: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub speed: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub calories: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub active_calories: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub avg_heart_rate: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub max_heart_rate: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub status: Patch<CardioStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub start_time: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub end_time: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub work_duration: Patch<f64>,
}

/// Body for `set` mot cardio-tjenesten.
///
/// `calories` er ikke en `Patch`: den serialiseres alltid (evt. som `null`),
/// fordi serveren nuller ut kalorier som mangler i forespørselen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardioPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub active_calories: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub avg_heart_rate: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub max_heart_rate: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub distance: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub time: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub level: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub speed: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub status: Patch<CardioStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub start_time: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub end_time: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub work_duration: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub comments: Patch<Value>,
}

#[inline]
fn is_truthy(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

fn truthy_or_null(p: Patch<f64>) -> Patch<f64> {
    match p {
        Patch::Value(v) if !is_truthy(v) => Patch::Null,
        other => other,
    }
}

/// Tomme verdier (0, NaN) blir eksplisitt `null`; felt som mangler forblir borte.
/// Kalorier havner alltid i payloaden, evt. som `null`.
pub fn prepare_for_request(inputs: &CardioInputs) -> CardioPayload {
    CardioPayload {
        id: None,
        calories: truthy_or_null(inputs.calories).into_option(),
        active_calories: truthy_or_null(inputs.active_calories),
        avg_heart_rate: truthy_or_null(inputs.avg_heart_rate),
        max_heart_rate: truthy_or_null(inputs.max_heart_rate),
        distance: truthy_or_null(inputs.distance),
        time: truthy_or_null(inputs.time),
        level: truthy_or_null(inputs.level),
        speed: truthy_or_null(inputs.speed),
        status: inputs.status,
        start_time: match inputs.start_time {
            Patch::Value(0) => Patch::Null,
            other => other,
        },
        end_time: match inputs.end_time {
            Patch::Value(0) => Patch::Null,
            other => other,
        },
        work_duration: truthy_or_null(inputs.work_duration),
        comments: Patch::Absent,
    }
}

const KM_TO_MILES: f64 = 0.621371;

/// Roing tastes inn i meter, men serveren lagrer distanse i km eller miles
/// etter brukerens enheter. Andre øvelser og tom distanse sendes uendret.
pub fn convert_for_request(payload: CardioPayload, units: UnitSystem, exercise_id: Option<i64>) -> CardioPayload {
    if exercise_id != Some(CardioType::Rowing.id()) {
        return payload;
    }
    let distance = payload.distance.map(|meters| {
        let km = meters / 1000.0;
        match units {
            UnitSystem::Metric => km,
            UnitSystem::Imperial => km * KM_TO_MILES,
        }
    });
    CardioPayload { distance, ..payload }
}

/// Hva serveren allerede vet om klokkeverdier for aktiviteten.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corroboration {
    pub has_watch_stats: bool,
    pub previous_calories: Option<f64>,
}

impl Corroboration {
    /// Klokkeverdier er registrert tidligere hvis noen av aktive kalorier,
    /// snittpuls eller makspuls er satt (ikke 0).
    pub fn from_record(record: &CardioRecord) -> Self {
        let has_watch_stats = [record.active_calories, record.avg_heart_rate, record.max_heart_rate]
            .into_iter()
            .flatten()
            .any(is_truthy);

        Self {
            has_watch_stats,
            previous_calories: record.calories,
        }
    }
}

/// Slå sammen lokal payload med det serveren allerede har.
///
/// Med klokkeverdier på serveren fjernes aktive kalorier, puls og kalorier
/// fra kandidaten, og kalorier sendes med forrige serververdi (evt. `null`).
/// Uten klokkeverdier sendes kandidaten uendret.
pub fn decide(
    has_watch_stats: bool,
    previous_server_calories: Option<f64>,
    candidate: CardioPayload,
) -> CardioPayload {
    if !has_watch_stats {
        return candidate;
    }

    CardioPayload {
        calories: previous_server_calories,
        active_calories: Patch::Absent,
        avg_heart_rate: Patch::Absent,
        max_heart_rate: Patch::Absent,
        ..candidate
    }
}

pub fn decide_with(corroboration: Corroboration, candidate: CardioPayload) -> CardioPayload {
    decide(
        corroboration.has_watch_stats,
        corroboration.previous_calories,
        candidate,
    )
}
