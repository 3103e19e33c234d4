//! The seam to the external astrological engine.
//!
//! The engine is stateful: it holds a "current birth data" record that is
//! cleared with [`AstroEngine::reset`], filled with [`AstroEngine::submit`],
//! checked with [`AstroEngine::validate`] and [`AstroEngine::is_valid`], and
//! read back with [`AstroEngine::birth_data`]. Callers should not drive these
//! calls by hand; [`crate::validator::EngineSession`] fixes their order.

pub mod command;
pub mod replay;

pub use command::CommandEngine;
pub use replay::ReplayEngine;

use crate::error::EngineError;
use crate::types::{AstrologicalDataset, BirthDataInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status string the engine returns from `validate` when the record passed.
pub const STATUS_SUCCESS: &str = "SUCCESS";
/// Reply from `generate` when the submitted birth data was unusable.
pub const SENTINEL_INPUT_ERROR: &str = "INPUT_ERROR";
/// Reply from `generate` when it could not write to its output path.
pub const SENTINEL_OUTPUT_PATH_ERROR: &str = "OUTPUTPATH_ERROR";
/// Prefix of `generate` replies describing a bad argument.
pub const INVALID_PARAMETER_PREFIX: &str = "Invalid parameter";

/// Birth data in the engine's text format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFields {
    pub name: String,
    pub gender: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
    pub place: String,
    pub longitude: String,
    pub latitude: String,
    pub timezone: String,
}

impl From<&BirthDataInput> for EngineFields {
    fn from(input: &BirthDataInput) -> Self {
        Self {
            name: input.name.clone(),
            gender: input.gender.engine_token().to_string(),
            year: input.date.year.to_string(),
            month: input.date.month.to_string(),
            day: input.date.day.to_string(),
            hour: input.time.hour.to_string(),
            minute: input.time.minute.to_string(),
            second: input.time.second.to_string(),
            place: input.place.clone(),
            longitude: signed(input.longitude),
            latitude: signed(input.latitude),
            timezone: signed(input.timezone),
        }
    }
}

/// `+74.4439`, `-4`, `+0`.
fn signed(value: f64) -> String {
    format!("{value:+}")
}

/// What `generate` should do with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Return the dataset in memory.
    Dictionary,
}

/// Raw reply of `generate`, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineOutput {
    Dataset(AstrologicalDataset),
    Message(String),
    Nothing,
}

impl EngineOutput {
    /// Decode a JSON reply: object, string or null.
    pub fn from_json(value: Value) -> Result<Self, EngineError> {
        match value {
            Value::Null => Ok(EngineOutput::Nothing),
            Value::String(message) => Ok(EngineOutput::Message(message)),
            Value::Object(entries) => Ok(EngineOutput::Dataset(AstrologicalDataset::new(
                entries.into_iter().collect(),
            ))),
            other => Err(EngineError::Protocol(format!(
                "expected an object, string or null from generate, got {other}"
            ))),
        }
    }
}

/// The six calls of the external engine.
pub trait AstroEngine {
    /// Clear the engine's current birth data.
    fn reset(&mut self);

    /// Store `fields` as the current birth data.
    fn submit(&mut self, fields: &EngineFields) -> Result<(), EngineError>;

    /// Validate the current birth data; [`STATUS_SUCCESS`] means it passed,
    /// anything else is the reason it did not.
    fn validate(&mut self) -> Result<String, EngineError>;

    /// Independent validity flag for the current birth data.
    fn is_valid(&self) -> bool;

    /// The engine's normalized copy of the current birth data.
    fn birth_data(&self) -> Option<Value>;

    /// Compute the astrological dataset for `birth_data`.
    fn generate(&mut self, birth_data: &Value, mode: OutputMode)
        -> Result<EngineOutput, EngineError>;
}
