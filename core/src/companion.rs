// core/src/companion.rs
//! Meldinger fra klokka under en sporet økt.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::WatchStatsCache;
use crate::error::{CardioError, CardioResult};
use crate::models::{ActivityId, ActivityStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    WatchContext,
    IosContext,
    ContextRequest,
    CompanionStart,
    CompanionStartResult,
    CompanionFinish,
    CompanionDiscard,
    CompanionStat,
    CompanionPause,
    CompanionResume,
    CompanionHaptic,
    CompanionIsPendingResponse,
    UpdateTodayList,
    WatchInfo,
}

/// Tid på klokka da kontrollhendelsen skjedde.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Pause,
    Resume,
    Discard,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlEvent {
    pub kind: ControlKind,
    pub message: ControlMessage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompanionMessage {
    Stat(Option<ActivityStats>),
    Control(ControlEvent),
    /// Alt annet (kontekst, haptikk, info ...) håndteres ikke her
    Other(MessageType),
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: MessageType,
    #[serde(default)]
    message: Value,
}

/// Innholdet i `message`, med feltsti i feilmeldingen.
fn decode_message<T: DeserializeOwned>(message: Value) -> CardioResult<T> {
    serde_path_to_error::deserialize(message).map_err(CardioError::from_path_error)
}

impl CompanionMessage {
    pub fn parse(json: &str) -> CardioResult<Self> {
        let de = &mut serde_json::Deserializer::from_str(json);
        let raw: RawMessage = serde_path_to_error::deserialize(de).map_err(CardioError::from_path_error)?;

        let control = |kind| -> CardioResult<Self> {
            let message: ControlMessage = decode_message(raw.message.clone())?;
            Ok(CompanionMessage::Control(ControlEvent { kind, message }))
        };

        match raw.kind {
            MessageType::CompanionStat => {
                let stats: Option<ActivityStats> = decode_message(raw.message.clone())?;
                Ok(CompanionMessage::Stat(stats))
            }
            MessageType::CompanionPause => control(ControlKind::Pause),
            MessageType::CompanionResume => control(ControlKind::Resume),
            MessageType::CompanionDiscard => control(ControlKind::Discard),
            MessageType::CompanionFinish => control(ControlKind::Finish),
            other => Ok(CompanionMessage::Other(other)),
        }
    }
}

/// Mottaker for kontrollhendelser; alt er no-op som default.
pub trait ControlHandler {
    fn on_pause(&mut self, _message: &ControlMessage) {}
    fn on_resume(&mut self, _message: &ControlMessage) {}
    fn on_discard(&mut self, _message: &ControlMessage) {}
    fn on_finish(&mut self, _message: &ControlMessage) {}
}

pub fn handle_control_event(event: &ControlEvent, handler: &mut dyn ControlHandler) {
    match event.kind {
        ControlKind::Pause => handler.on_pause(&event.message),
        ControlKind::Resume => handler.on_resume(&event.message),
        ControlKind::Discard => handler.on_discard(&event.message),
        ControlKind::Finish => handler.on_finish(&event.message),
    }
}

/// Kobler meldinger fra klokka til cachen for én aktivitet.
pub struct CompanionSession<'a> {
    cache: &'a WatchStatsCache,
    activity: ActivityId,
}

impl<'a> CompanionSession<'a> {
    pub fn new(cache: &'a WatchStatsCache, activity: impl Into<ActivityId>) -> Self {
        Self {
            cache,
            activity: activity.into(),
        }
    }

    pub fn activity(&self) -> &ActivityId {
        &self.activity
    }

    pub fn apply(&self, message: CompanionMessage, handler: &mut dyn ControlHandler) {
        match message {
            CompanionMessage::Stat(Some(stats)) => self.cache.set(self.activity.clone(), Some(stats)),
            CompanionMessage::Stat(None) => {}
            CompanionMessage::Control(event) => {
                if event.kind == ControlKind::Discard {
                    self.cache.clear_all();
                }
                handle_control_event(&event, handler);
            }
            CompanionMessage::Other(kind) => log::debug!("ignorerer melding {kind:?}"),
        }
    }
}

/// Økten ble lukket fra klokka: ingen statistikk skal overleve.
pub fn close_from_watch(cache: &WatchStatsCache) {
    cache.clear_all();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stat_with_bpm_aliases() {
        let msg = CompanionMessage::parse(
            r#"{"type":"companionStat","message":{"activeCalories":50,"basalCalories":10,"bpmAvg":120,"bpmMax":150,"startTime":1,"endTime":2,"walking":null}}"#,
        )
        .unwrap();
        match msg {
            CompanionMessage::Stat(Some(s)) => {
                assert_eq!(s.avg_heart_rate, Some(120.0));
                assert_eq!(s.max_heart_rate, Some(150.0));
            }
            other => panic!("uventet: {other:?}"),
        }
    }

    #[test]
    fn parses_control_and_other() {
        let msg = CompanionMessage::parse(r#"{"type":"companionPause","message":{"time":12.5,"timestamp":1700000000000}}"#).unwrap();
        assert!(matches!(msg, CompanionMessage::Control(ControlEvent { kind: ControlKind::Pause, .. })));

        let msg = CompanionMessage::parse(r#"{"type":"watchInfo","message":"hei"}"#).unwrap();
        assert_eq!(msg, CompanionMessage::Other(MessageType::WatchInfo));
    }

    #[test]
    fn fractional_stat_timestamps_are_accepted() {
        let msg = CompanionMessage::parse(
            r#"{"type":"companionStat","message":{"activeCalories":50,"startTime":1700000000123.5,"endTime":1700000600000.25}}"#,
        )
        .unwrap();
        match msg {
            CompanionMessage::Stat(Some(s)) => assert_eq!(s.start_time, 1_700_000_000_123.5),
            other => panic!("uventet: {other:?}"),
        }
    }

    #[test]
    fn bad_stat_field_reports_path() {
        let err = CompanionMessage::parse(r#"{"type":"companionStat","message":{"activeCalories":"mye"}}"#)
            .unwrap_err();
        match err {
            CardioError::Json { path, .. } => assert_eq!(path, "activeCalories"),
            other => panic!("uventet feil: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(CompanionMessage::parse(r#"{"type":"nope"}"#).is_err());
    }
}
