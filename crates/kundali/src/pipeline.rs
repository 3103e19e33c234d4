//! One submission, end to end: form → validation → retrieval.
//!
//! Rendering is left to the caller (see [`crate::presenter`]) so the same
//! result can be shown as text, JSON or both.

use crate::engine::AstroEngine;
use crate::error::PipelineError;
use crate::form::BirthDataForm;
use crate::retriever::{self, RetrievedChart};
use crate::types::{BirthDataInput, ChartKind};
use crate::validator::EngineSession;
use log::debug;

/// Everything a successful submission produced.
#[derive(Debug, Clone)]
pub struct Submission {
    pub input: BirthDataInput,
    pub retrieved: RetrievedChart,
}

/// Run a raw form through the whole pipeline.
///
/// Field errors stop the submission before the engine is touched.
pub fn submit<E: AstroEngine + ?Sized>(
    engine: &mut E,
    form: &BirthDataForm,
    kind: ChartKind,
) -> Result<Submission, PipelineError> {
    let input = form.parse()?;
    submit_input(engine, input, kind)
}

/// Run an already typed record through validation and retrieval.
pub fn submit_input<E: AstroEngine + ?Sized>(
    engine: &mut E,
    input: BirthDataInput,
    kind: ChartKind,
) -> Result<Submission, PipelineError> {
    debug!("submission for {} ({})", input.name, kind.label());
    let session = EngineSession::open(engine).validate(&input)?;
    let retrieved = retriever::retrieve(session, kind)?;
    Ok(Submission { input, retrieved })
}
