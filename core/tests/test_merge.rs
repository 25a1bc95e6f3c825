// core/tests/test_merge.rs
use cardiowatch_core::merge::decide_with;
use cardiowatch_core::{
    decide, prepare_for_request, CardioInputs, CardioPayload, CardioRecord, Corroboration, Patch,
};
use serde_json::json;

fn zeroed_candidate() -> CardioPayload {
    CardioPayload {
        calories: Some(0.0),
        active_calories: Patch::Value(0.0),
        avg_heart_rate: Patch::Value(0.0),
        max_heart_rate: Patch::Value(0.0),
        distance: Patch::Value(5.0),
        ..Default::default()
    }
}

#[test]
fn corroborated_merge_strips_watch_fields_and_keeps_server_calories() {
    let merged = decide(true, Some(450.0), zeroed_candidate());
    let v = serde_json::to_value(&merged).unwrap();
    assert_eq!(v, json!({ "distance": 5.0, "calories": 450.0 }));
}

#[test]
fn merge_without_watch_stats_leaves_candidate_untouched() {
    let candidate = zeroed_candidate();
    let merged = decide(false, Some(450.0), candidate.clone());
    assert_eq!(merged, candidate);
    assert_eq!(
        serde_json::to_value(&merged).unwrap(),
        serde_json::to_value(&candidate).unwrap()
    );
}

#[test]
fn corroborated_merge_without_server_calories_sends_null() {
    let merged = decide(true, None, zeroed_candidate());
    let v = serde_json::to_value(&merged).unwrap();
    assert_eq!(v, json!({ "distance": 5.0, "calories": null }));
}

#[test]
fn prepared_form_then_corroborated_against_server_record() {
    // Skjema der bruker har tastet inn egne kalorier og puls
    let inputs = CardioInputs {
        distance: Patch::Value(7.5),
        time: Patch::Value(2400.0),
        calories: Patch::Value(300.0),
        avg_heart_rate: Patch::Value(0.0),
        ..Default::default()
    };
    let candidate = prepare_for_request(&inputs);

    let server: CardioRecord = serde_json::from_value(json!({
        "id": 12,
        "exerciseID": 3021,
        "calories": 512.0,
        "activeCalories": 430.0,
        "avgHeartRate": 131.0,
        "maxHeartRate": 168.0
    }))
    .unwrap();

    let merged = decide_with(Corroboration::from_record(&server), candidate);
    let v = serde_json::to_value(&merged).unwrap();
    assert_eq!(v, json!({ "calories": 512.0, "distance": 7.5, "time": 2400.0 }));
}
