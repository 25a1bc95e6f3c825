use crate::cache::WatchStatsCache;
use crate::cardio_types::is_time_cardio;
use crate::merge::CardioInputs;
use crate::models::{ActivityId, CardioRecord, CardioStatus, DurationData};
use crate::patch::Patch;
use crate::stats::with_watch_stats;

/// Hva som skjer når timer-skjermen avsluttes.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEnded {
    /// Klokka har levert tall for en tidsbasert øvelse: lagre direkte
    AutoSave { id: i64, inputs: CardioInputs },
    /// Åpne inntastingsskjemaet med tidene fra timeren
    ManualEntry {
        id: i64,
        time: f64,
        start_time: i64,
        end_time: i64,
    },
}

pub fn on_tracker_ended(cache: &WatchStatsCache, record: &CardioRecord, duration: DurationData) -> TrackerEnded {
    let stats = cache.get(&ActivityId::from(record.id));
    let time_cardio = record.exercise_id.is_some_and(is_time_cardio);

    if stats.is_none() || !time_cardio {
        return TrackerEnded::ManualEntry {
            id: record.id,
            time: duration.work_duration,
            start_time: duration.start_time,
            end_time: duration.end_time,
        };
    }

    let entry = with_watch_stats(record, stats.as_ref());
    let inputs = CardioInputs {
        time: Patch::Value(duration.work_duration),
        distance: entry.distance.into(),
        level: entry.level.into(),
        speed: entry.speed.into(),
        calories: entry.calories.into(),
        active_calories: entry.active_calories.into(),
        avg_heart_rate: entry.avg_heart_rate.into(),
        max_heart_rate: entry.max_heart_rate.into(),
        status: Patch::Value(CardioStatus::Tracked),
        start_time: Patch::Value(duration.start_time),
        end_time: Patch::Value(duration.end_time),
        work_duration: Patch::Value(duration.work_duration),
    };
    log::info!("cardio {}: lagrer automatisk med klokkeverdier", record.id);

    TrackerEnded::AutoSave { id: record.id, inputs }
}
