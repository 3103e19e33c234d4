//! Engine stand-in that replays a recorded dataset.
//!
//! Validation happens locally (calendar, clock and coordinate checks) so the
//! pipeline behaves as it would against the real engine; `generate` hands back
//! the recorded charts whatever the birth data.

use super::{AstroEngine, EngineFields, EngineOutput, OutputMode, SENTINEL_INPUT_ERROR, STATUS_SUCCESS};
use crate::error::EngineError;
use crate::types::AstrologicalDataset;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use log::debug;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
struct Verdict {
    status: String,
    birth_data: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ReplayEngine {
    dataset: AstrologicalDataset,
    pending: Option<EngineFields>,
    verdict: Option<Verdict>,
}

impl ReplayEngine {
    pub fn new(dataset: AstrologicalDataset) -> Self {
        Self {
            dataset,
            pending: None,
            verdict: None,
        }
    }

    /// Load a dataset recorded as a JSON object keyed by chart id.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let dataset_error = |message: String| EngineError::Dataset {
            path: path.display().to_string(),
            message,
        };
        let text = fs::read_to_string(path).map_err(|e| dataset_error(e.to_string()))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| dataset_error(e.to_string()))?;
        match value {
            Value::Object(entries) => Ok(Self::new(AstrologicalDataset::new(
                entries.into_iter().collect(),
            ))),
            _ => Err(dataset_error("expected a JSON object keyed by chart id".to_string())),
        }
    }
}

/// Status for a record whose UTC instant falls outside chrono's calendar.
const OUT_OF_RANGE_STATUS: &str = "Date out of supported range";

/// Check a submitted record the way the engine does. `Ok` carries the
/// normalized birth data.
fn check_fields(fields: &EngineFields) -> Result<Value, String> {
    if fields.name.trim().is_empty() {
        return Err("Name is empty".to_string());
    }
    if !matches!(fields.gender.as_str(), "male" | "female" | "others") {
        return Err(format!("Invalid gender '{}'", fields.gender));
    }
    let year: i32 = number("year", &fields.year)?;
    let month: u32 = number("month", &fields.month)?;
    let day: u32 = number("day", &fields.day)?;
    let hour: u32 = number("hour", &fields.hour)?;
    let minute: u32 = number("minute", &fields.minute)?;
    let second: u32 = number("second", &fields.second)?;
    let longitude: f64 = number("longitude", &fields.longitude)?;
    let latitude: f64 = number("latitude", &fields.latitude)?;
    let timezone: f64 = number("timezone", &fields.timezone)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Invalid date {year}-{month:02}-{day:02}"))?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| format!("Invalid time {hour:02}:{minute:02}:{second:02}"))?;
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("Longitude {longitude} out of range"));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("Latitude {latitude} out of range"));
    }
    if !(-12.0..=14.0).contains(&timezone) {
        return Err(format!("Timezone {timezone} out of range"));
    }

    let local = NaiveDateTime::new(date, time);
    let utc = TimeDelta::try_seconds((timezone * 3600.0).round() as i64)
        .and_then(|offset| local.checked_sub_signed(offset))
        .ok_or_else(|| OUT_OF_RANGE_STATUS.to_string())?;

    Ok(json!({
        "name": fields.name.trim(),
        "gender": fields.gender,
        "place": fields.place.trim(),
        "DOB": { "year": year, "month": month, "day": day },
        "TOB": { "hour": hour, "min": minute, "sec": second },
        "POB": { "lon": longitude, "lat": latitude, "timezone": timezone },
        "utc": utc.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    }))
}

fn number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("Invalid {field} '{raw}'"))
}

impl AstroEngine for ReplayEngine {
    fn reset(&mut self) {
        self.pending = None;
        self.verdict = None;
    }

    fn submit(&mut self, fields: &EngineFields) -> Result<(), EngineError> {
        self.pending = Some(fields.clone());
        self.verdict = None;
        Ok(())
    }

    fn validate(&mut self) -> Result<String, EngineError> {
        let fields = self
            .pending
            .as_ref()
            .ok_or(EngineError::OutOfOrder("validate called before submit"))?;
        let verdict = match check_fields(fields) {
            Ok(birth_data) => Verdict {
                status: STATUS_SUCCESS.to_string(),
                birth_data: Some(birth_data),
            },
            Err(reason) => Verdict {
                status: reason,
                birth_data: None,
            },
        };
        debug!("replay engine: validate -> {}", verdict.status);
        let status = verdict.status.clone();
        self.verdict = Some(verdict);
        Ok(status)
    }

    fn is_valid(&self) -> bool {
        self.verdict
            .as_ref()
            .is_some_and(|v| v.status == STATUS_SUCCESS)
    }

    fn birth_data(&self) -> Option<Value> {
        self.verdict.as_ref().and_then(|v| v.birth_data.clone())
    }

    fn generate(
        &mut self,
        birth_data: &Value,
        _mode: OutputMode,
    ) -> Result<EngineOutput, EngineError> {
        if !birth_data.is_object() {
            return Ok(EngineOutput::Message(SENTINEL_INPUT_ERROR.to_string()));
        }
        debug!("replay engine: generate ({} charts recorded)", self.dataset.len());
        Ok(EngineOutput::Dataset(self.dataset.clone()))
    }
}
