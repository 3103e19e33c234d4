//! Birth data intake and chart retrieval for an external Vedic astrology
//! engine.
//!
//! The flow of one submission is fixed: [`form::BirthDataForm`] coerces raw
//! input, [`validator::EngineSession`] has the engine validate it,
//! [`retriever`] asks the engine for its dataset and extracts the selected
//! chart, and [`presenter`] renders that chart as text and JSON.
//! [`pipeline::submit`] runs the first three in order and stops at the first
//! failure.

pub mod engine;
pub mod error;
pub mod form;
pub mod pipeline;
pub mod presenter;
pub mod retriever;
pub mod types;
pub mod validator;

pub use engine::{AstroEngine, CommandEngine, EngineFields, EngineOutput, OutputMode, ReplayEngine};
pub use error::{ChartError, EngineError, FieldCoercionError, FieldError, PipelineError, ValidationError};
pub use form::BirthDataForm;
pub use pipeline::{submit, submit_input, Submission};
pub use presenter::{OutputFormat, Presentation};
pub use retriever::RetrievedChart;
pub use types::{
    AstrologicalDataset, BirthDataInput, CalendarDate, ChartData, ChartKind, ClockTime, Gender,
    HouseData, PlanetPlacement,
};
pub use validator::{EngineSession, ValidatedSession, ValidationResult};
