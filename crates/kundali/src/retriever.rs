//! Chart retrieval: one `generate` call, then classification and extraction.

use crate::engine::{
    AstroEngine, EngineOutput, INVALID_PARAMETER_PREFIX, SENTINEL_INPUT_ERROR,
    SENTINEL_OUTPUT_PATH_ERROR,
};
use crate::error::{ChartError, PipelineError};
use crate::types::{AstrologicalDataset, ChartData, ChartKind, HOUSE_COUNT};
use crate::validator::ValidatedSession;
use log::{error, info, warn};

/// Map a raw `generate` reply onto a dataset or a [`ChartError`].
pub fn classify(output: EngineOutput) -> Result<AstrologicalDataset, ChartError> {
    match output {
        EngineOutput::Dataset(dataset) if dataset.is_empty() => Err(ChartError::EmptyResult),
        EngineOutput::Dataset(dataset) => Ok(dataset),
        EngineOutput::Nothing => Err(ChartError::EmptyResult),
        EngineOutput::Message(message) => Err(classify_message(message)),
    }
}

fn classify_message(message: String) -> ChartError {
    let trimmed = message.trim();
    if trimmed == SENTINEL_INPUT_ERROR {
        ChartError::InvalidInput
    } else if trimmed == SENTINEL_OUTPUT_PATH_ERROR {
        // Only file output can fail this way; a dictionary request never should.
        error!("engine reported {SENTINEL_OUTPUT_PATH_ERROR} for an in-memory request");
        ChartError::OutputPathUnavailable
    } else if trimmed.starts_with(INVALID_PARAMETER_PREFIX) {
        ChartError::InvalidParameter(trimmed.to_string())
    } else if trimmed.is_empty() {
        ChartError::EmptyResult
    } else {
        ChartError::UnrecognizedResponse(message)
    }
}

/// Pull one chart out of a dataset.
pub fn extract_chart(dataset: &AstrologicalDataset, kind: ChartKind) -> Result<ChartData, ChartError> {
    let id = kind.id();
    let Some(entry) = dataset.get(id) else {
        let available = dataset.ids().collect::<Vec<_>>().join(", ");
        warn!("dataset has no {id}; available: [{available}]");
        return Err(ChartError::ChartNotFound(id.to_string()));
    };
    let malformed = |reason: String| ChartError::MalformedChart {
        id: id.to_string(),
        reason,
    };
    let chart: ChartData = serde_json::from_value(entry.clone()).map_err(|e| malformed(e.to_string()))?;
    if chart.houses.len() != HOUSE_COUNT {
        return Err(malformed(format!(
            "expected {HOUSE_COUNT} houses, got {}",
            chart.houses.len()
        )));
    }
    Ok(chart)
}

/// A validated session's dataset together with the chart that was asked for.
#[derive(Debug, Clone)]
pub struct RetrievedChart {
    pub kind: ChartKind,
    pub birth_data: serde_json::Value,
    pub dataset: AstrologicalDataset,
    pub chart: ChartData,
}

/// Generate the dataset for a validated session and extract `kind` from it.
pub fn retrieve<E: AstroEngine + ?Sized>(
    session: ValidatedSession<'_, E>,
    kind: ChartKind,
) -> Result<RetrievedChart, PipelineError> {
    let (birth_data, output) = session.generate()?;
    let result = classify(output).and_then(|dataset| {
        let chart = extract_chart(&dataset, kind)?;
        Ok((dataset, chart))
    });
    match result {
        Ok((dataset, chart)) => {
            info!(
                "retrieved {} ({} planets, {} houses)",
                kind.label(),
                chart.planets.len(),
                chart.houses.len()
            );
            Ok(RetrievedChart {
                kind,
                birth_data,
                dataset,
                chart,
            })
        }
        Err(err) => {
            warn!("chart retrieval for {} failed: {err}", kind.label());
            Err(err.into())
        }
    }
}
