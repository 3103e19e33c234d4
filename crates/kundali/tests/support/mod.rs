#![allow(dead_code)]

use kundali::{AstroEngine, AstrologicalDataset, EngineError, EngineFields, EngineOutput, OutputMode};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::path::PathBuf;

pub fn sample_dataset_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("sample_astrodata.json")
}

pub fn sample_dataset() -> AstrologicalDataset {
    let text = std::fs::read_to_string(sample_dataset_path()).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reset,
    Submit(EngineFields),
    Validate,
    IsValid,
    BirthData,
    Generate(Value),
}

/// Engine double with canned answers that records every call it receives.
pub struct ScriptedEngine {
    pub status: String,
    pub valid: bool,
    pub returns_birth_data: bool,
    pub respond: Box<dyn Fn(&Value) -> EngineOutput>,
    calls: RefCell<Vec<Call>>,
    current: Option<EngineFields>,
}

impl ScriptedEngine {
    /// Accepts everything and answers `generate` with the sample dataset.
    pub fn accepting() -> Self {
        let dataset = sample_dataset();
        Self {
            status: "SUCCESS".to_string(),
            valid: true,
            returns_birth_data: true,
            respond: Box::new(move |_| EngineOutput::Dataset(dataset.clone())),
            calls: RefCell::new(Vec::new()),
            current: None,
        }
    }

    pub fn with_status(mut self, status: &str, valid: bool) -> Self {
        self.status = status.to_string();
        self.valid = valid;
        self
    }

    pub fn responding(mut self, respond: impl Fn(&Value) -> EngineOutput + 'static) -> Self {
        self.respond = Box::new(respond);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn generate_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Generate(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl AstroEngine for ScriptedEngine {
    fn reset(&mut self) {
        self.record(Call::Reset);
        self.current = None;
    }

    fn submit(&mut self, fields: &EngineFields) -> Result<(), EngineError> {
        self.record(Call::Submit(fields.clone()));
        // Deliberately keeps the first record when not reset, like the
        // real engine's sticky state.
        if self.current.is_none() {
            self.current = Some(fields.clone());
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<String, EngineError> {
        self.record(Call::Validate);
        Ok(self.status.clone())
    }

    fn is_valid(&self) -> bool {
        self.record(Call::IsValid);
        self.valid
    }

    fn birth_data(&self) -> Option<Value> {
        self.record(Call::BirthData);
        if !self.returns_birth_data {
            return None;
        }
        self.current
            .as_ref()
            .map(|fields| serde_json::to_value(fields).unwrap())
    }

    fn generate(&mut self, birth_data: &Value, mode: OutputMode) -> Result<EngineOutput, EngineError> {
        assert_eq!(mode, OutputMode::Dictionary);
        self.record(Call::Generate(birth_data.clone()));
        Ok((self.respond)(birth_data))
    }
}

/// A minimal D1 chart named after the person in `birth_data`.
pub fn chart_named_after(birth_data: &Value) -> EngineOutput {
    let name = birth_data["name"].as_str().unwrap_or_default().to_string();
    let houses: Vec<Value> = (0..12)
        .map(|_| json!({"sign": "Aries", "lord": "Mars"}))
        .collect();
    let mut dataset = AstrologicalDataset::default();
    dataset.insert(
        "D1",
        json!({
            "name": name,
            "symbol": "D1",
            "ascendant": "Aries",
            "planets": {},
            "houses": houses,
        }),
    );
    EngineOutput::Dataset(dataset)
}
