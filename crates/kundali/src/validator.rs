//! Birth data validation against the engine.
//!
//! An [`EngineSession`] is the only way to drive an [`AstroEngine`] through a
//! submission. Opening one resets the engine, so no record from an earlier
//! submission can survive into this one, and the only path to `generate` is
//! through a [`ValidatedSession`].

use crate::engine::{AstroEngine, EngineFields, EngineOutput, OutputMode, STATUS_SUCCESS};
use crate::error::{EngineError, PipelineError, ValidationError};
use crate::types::BirthDataInput;
use log::{debug, info, warn};
use serde_json::Value;

/// Reason reported when the status says success but the validity flag does not.
pub const NOT_VALID_REASON: &str = "Birth data is not valid.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Success,
    Failure(String),
}

impl ValidationResult {
    /// Both signals must agree: the `SUCCESS` status and the validity flag.
    pub fn interpret(status: &str, is_valid: bool) -> Self {
        if status != STATUS_SUCCESS {
            ValidationResult::Failure(status.to_string())
        } else if !is_valid {
            ValidationResult::Failure(NOT_VALID_REASON.to_string())
        } else {
            ValidationResult::Success
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Success => Ok(()),
            ValidationResult::Failure(reason) => Err(ValidationError { reason }),
        }
    }
}

/// One submission's exclusive use of the engine.
pub struct EngineSession<'e, E: AstroEngine + ?Sized> {
    engine: &'e mut E,
}

impl<'e, E: AstroEngine + ?Sized> EngineSession<'e, E> {
    /// Take the engine for one submission, clearing whatever it held.
    pub fn open(engine: &'e mut E) -> Self {
        debug!("engine: reset");
        engine.reset();
        Self { engine }
    }

    /// Submit `input` and accept it only if the engine's status and validity
    /// flag both say so.
    pub fn validate(self, input: &BirthDataInput) -> Result<ValidatedSession<'e, E>, PipelineError> {
        let fields = EngineFields::from(input);
        debug!("engine: submit {}", fields.name);
        self.engine.submit(&fields)?;

        let status = self.engine.validate()?;
        let is_valid = self.engine.is_valid();
        debug!("engine: validate -> {status:?}, is_valid -> {is_valid}");

        if let Err(err) = ValidationResult::interpret(&status, is_valid).into_result() {
            warn!("birth data for {} rejected: {}", input.name, err.reason);
            return Err(err.into());
        }

        let birth_data = self.engine.birth_data().ok_or_else(|| {
            EngineError::Protocol("engine accepted the birth data but returned no record".to_string())
        })?;
        info!("birth data for {} accepted", input.name);
        Ok(ValidatedSession {
            engine: self.engine,
            birth_data,
        })
    }
}

/// A session whose birth data the engine has accepted.
pub struct ValidatedSession<'e, E: AstroEngine + ?Sized> {
    engine: &'e mut E,
    birth_data: Value,
}

impl<'e, E: AstroEngine + ?Sized> ValidatedSession<'e, E> {
    /// The engine's normalized birth record.
    pub fn birth_data(&self) -> &Value {
        &self.birth_data
    }

    /// Run the generator once; consumes the session.
    pub fn generate(self) -> Result<(Value, EngineOutput), EngineError> {
        debug!("engine: generate");
        let output = self.engine.generate(&self.birth_data, OutputMode::Dictionary)?;
        Ok((self.birth_data, output))
    }
}
