// core/src/service.rs
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ureq::Agent;

use crate::config::ServiceConfig;
use crate::error::{CardioError, CardioResult};
use crate::merge::CardioPayload;
use crate::models::CardioRecord;

/// Svar fra `set`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResponse {
    pub id: i64,
    #[serde(default)]
    pub broken_record: Option<Value>,
    #[serde(default)]
    pub milestone: Option<Value>,
}

/// Fjernlager for cardio-poster (prod: HttpCardioService, test: egen stub).
pub trait CardioService {
    fn get(&self, user_id: i64, id: i64) -> CardioResult<CardioRecord>;
    fn set(&self, user_id: i64, payload: &CardioPayload) -> CardioResult<SetResponse>;
    /// Returnerer id for ny post
    fn add(&self, user_id: i64, exercise_id: i64, date: NaiveDate, target_detail: &Value) -> CardioResult<i64>;
    fn delete(&self, user_id: i64, id: i64) -> CardioResult<()>;
}

/// Serveren kan svare 200 med `{"code": ...}` i body ved feil.
fn check_code(body: Value, id: i64) -> CardioResult<Value> {
    match body.get("code").and_then(Value::as_u64) {
        Some(404) => Err(CardioError::NotFound(id.to_string())),
        Some(code) => Err(CardioError::FailedResponse(code as u16)),
        None => Ok(body),
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: Value) -> CardioResult<T> {
    serde_path_to_error::deserialize(body).map_err(CardioError::from_path_error)
}

/// HTTP-klient – enkel blocking-versjon (ureq)
pub struct HttpCardioService {
    agent: Agent,
    base_url: String,
}

impl HttpCardioService {
    pub fn new(config: &ServiceConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, user_id: i64, tail: &str) -> String {
        format!("{}/users/{user_id}/cardio{tail}", self.base_url)
    }

    fn map_err(err: ureq::Error, id: i64) -> CardioError {
        match err {
            ureq::Error::Status(404, _) => CardioError::NotFound(id.to_string()),
            other => other.into(),
        }
    }
}

impl CardioService for HttpCardioService {
    fn get(&self, user_id: i64, id: i64) -> CardioResult<CardioRecord> {
        let resp = self
            .agent
            .get(&self.url(user_id, &format!("/{id}")))
            .call()
            .map_err(|e| Self::map_err(e, id))?;
        let body: Value = resp.into_json()?;
        parse(check_code(body, id)?)
    }

    fn set(&self, user_id: i64, payload: &CardioPayload) -> CardioResult<SetResponse> {
        let id = payload.id.unwrap_or_default();
        log::debug!("set cardio {id} for bruker {user_id}");
        let resp = self
            .agent
            .put(&self.url(user_id, &format!("/{id}")))
            .send_json(payload)
            .map_err(|e| Self::map_err(e, id))?;
        let body: Value = resp.into_json()?;
        parse(check_code(body, id)?)
    }

    fn add(&self, user_id: i64, exercise_id: i64, date: NaiveDate, target_detail: &Value) -> CardioResult<i64> {
        #[derive(Deserialize)]
        struct Added {
            id: i64,
        }
        let body = serde_json::json!({
            "exerciseID": exercise_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "targetDetail": target_detail,
        });
        let resp = self.agent.post(&self.url(user_id, "")).send_json(body)?;
        let body: Value = resp.into_json()?;
        let added: Added = parse(check_code(body, 0)?)?;
        Ok(added.id)
    }

    fn delete(&self, user_id: i64, id: i64) -> CardioResult<()> {
        let resp = self
            .agent
            .delete(&self.url(user_id, &format!("/{id}")))
            .call()
            .map_err(|e| Self::map_err(e, id))?;
        // Tom body er ok
        let body: Value = resp.into_json().unwrap_or(Value::Null);
        check_code(body, id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_code_maps_errors() {
        assert!(matches!(check_code(json!({"code": 404}), 3), Err(CardioError::NotFound(ref id)) if id.as_str() == "3"));
        assert!(matches!(check_code(json!({"code": 500}), 3), Err(CardioError::FailedResponse(500))));
        assert!(check_code(json!({"id": 3}), 3).is_ok());
    }

    #[test]
    fn url_trims_trailing_slash() {
        let svc = HttpCardioService::new(&ServiceConfig {
            base_url: "https://api.example.test/v1/".into(),
            timeout_secs: 5,
        });
        assert_eq!(svc.url(12, "/40"), "https://api.example.test/v1/users/12/cardio/40");
    }

    #[test]
    fn set_response_parses_optional_fields() {
        let r: SetResponse = parse(json!({"id": 40})).unwrap();
        assert_eq!(r.id, 40);
        assert!(r.broken_record.is_none());
    }
}
