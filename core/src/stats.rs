use serde::{Deserialize, Serialize};

use crate::models::{ActivityStats, CardioRecord};

/// Avledede verdier fra klokka, klare for payload.
///
/// Manglende felt blir `null` (ikke utelatt) så serialiseringen er stabil.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub avg_heart_rate: Option<f64>,
    pub max_heart_rate: Option<f64>,
    pub active_calories: Option<f64>,
    pub calories: Option<f64>,
}

#[inline]
fn finite(x: Option<f64>) -> Option<f64> {
    x.filter(|v| v.is_finite())
}

/// Kalorier = aktiv + basal når aktiv er et tall; basal som mangler teller 0.
/// Ikke-finitte verdier regnes som manglende.
pub fn compute_derived(stats: &ActivityStats) -> DerivedStats {
    let active = finite(stats.active_calories);
    let basal = finite(stats.basal_calories).unwrap_or(0.0);
    let calories = active.map(|a| a + basal);

    DerivedStats {
        avg_heart_rate: finite(stats.avg_heart_rate),
        max_heart_rate: finite(stats.max_heart_rate),
        active_calories: active,
        calories,
    }
}

/// Legg klokkeverdiene over en cardio-post (kalorier, aktive kalorier og puls).
/// Uten statistikk returneres posten uendret.
pub fn with_watch_stats(record: &CardioRecord, stats: Option<&ActivityStats>) -> CardioRecord {
    let Some(stats) = stats else {
        return record.clone();
    };
    let derived = compute_derived(stats);

    CardioRecord {
        active_calories: derived.active_calories,
        calories: derived.calories,
        avg_heart_rate: derived.avg_heart_rate,
        max_heart_rate: derived.max_heart_rate,
        ..record.clone()
    }
}
