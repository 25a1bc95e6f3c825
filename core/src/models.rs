use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map as JsonMap, Value};

/// Aktivitets-id. Klienten sender både tall og strenger; begge normaliseres
/// til samme strengnøkkel (42 og "42" er samme aktivitet), slik den
/// persisterte JSON-mappen lagrer nøklene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ActivityId(String);

impl<'de> Deserialize<'de> for ActivityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Str(String),
        }
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(id) => ActivityId::from(id),
            RawId::Str(id) => ActivityId::from(id),
        })
    }
}

impl ActivityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ActivityId {
    fn from(id: i64) -> Self {
        ActivityId(id.to_string())
    }
}

impl From<u32> for ActivityId {
    fn from(id: u32) -> Self {
        ActivityId(id.to_string())
    }
}

impl From<&str> for ActivityId {
    fn from(id: &str) -> Self {
        ActivityId(id.trim().to_string())
    }
}

impl From<String> for ActivityId {
    fn from(id: String) -> Self {
        ActivityId::from(id.as_str())
    }
}

/// Statistikk fra klokka for én sporet økt.
///
/// Feltnavnene følger wire-formatet fra klokka (camelCase). `bpmAvg`/`bpmMax`
/// aksepteres som aliaser for pulsfeltene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    #[serde(default)]
    pub active_calories: Option<f64>,
    #[serde(default)]
    pub basal_calories: Option<f64>,
    #[serde(default, alias = "bpmAvg")]
    pub avg_heart_rate: Option<f64>,
    #[serde(default, alias = "bpmMax")]
    pub max_heart_rate: Option<f64>,
    /// epoch millis; klokka sender JS-tall, så brøkdeler forekommer
    #[serde(default)]
    pub start_time: f64,
    /// epoch millis
    #[serde(default)]
    pub end_time: f64,

    // Valgfrie felt fra klokka (ikke brukt i merge)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm_min: Option<f64>,
}

impl ActivityStats {
    /// Varighet (end - start), aldri negativ.
    pub fn duration(&self) -> chrono::Duration {
        let ms = self.end_time - self.start_time;
        if !ms.is_finite() || ms <= 0.0 {
            return chrono::Duration::zero();
        }
        chrono::Duration::microseconds((ms * 1000.0).round() as i64)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.start_time)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.end_time)
    }
}

fn millis_to_utc(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    let whole = ms.floor();
    let micros = ((ms - whole) * 1000.0).round() as i64;
    Utc.timestamp_millis_opt(whole as i64)
        .single()
        .map(|t| t + chrono::Duration::microseconds(micros))
}

pub type StatsMap = HashMap<ActivityId, ActivityStats>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardioStatus {
    #[default]
    Scheduled,
    Checkedin,
    Tracked,
}

/// Cardio-post slik fjerntjenesten returnerer den.
/// Ukjente felt beholdes i `extra` (mål, kommentarer, program-info ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardioRecord {
    pub id: i64,
    #[serde(default, rename = "exerciseID")]
    pub exercise_id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: CardioStatus,

    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub active_calories: Option<f64>,
    #[serde(default)]
    pub avg_heart_rate: Option<f64>,
    #[serde(default)]
    pub max_heart_rate: Option<f64>,

    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub level: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub number_of_comments: Option<u32>,

    #[serde(flatten)]
    pub extra: JsonMap<String, Value>,
}

/// Tider fra timer-skjermen når en sporet økt avsluttes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationData {
    pub start_time: i64,
    pub end_time: i64,
    /// sekunder med faktisk aktivitet (pauser trukket fra)
    pub work_duration: f64,
}
