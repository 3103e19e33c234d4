mod support;

use kundali::{
    pipeline, BirthDataForm, ChartError, ChartKind, EngineError, EngineOutput, FieldError,
    PipelineError,
};
use support::{chart_named_after, Call, ScriptedEngine};

#[test]
fn test_calls_reach_the_engine_in_order() {
    let mut engine = ScriptedEngine::accepting();
    pipeline::submit(&mut engine, &BirthDataForm::default(), ChartKind::Lagna).unwrap();

    let calls = engine.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0], Call::Reset);
    assert!(matches!(calls[1], Call::Submit(_)));
    assert_eq!(calls[2], Call::Validate);
    assert_eq!(calls[3], Call::IsValid);
    assert_eq!(calls[4], Call::BirthData);
    assert!(matches!(calls[5], Call::Generate(_)));
}

#[test]
fn test_submitted_fields_are_engine_text() {
    let mut engine = ScriptedEngine::accepting();
    pipeline::submit(&mut engine, &BirthDataForm::default(), ChartKind::Lagna).unwrap();

    match &engine.calls()[1] {
        Call::Submit(fields) => {
            assert_eq!(fields.name, "Shyam Bhat");
            assert_eq!(fields.month, "8");
            assert_eq!(fields.longitude, "+74.4439");
            assert_eq!(fields.timezone, "+5.5");
        }
        other => panic!("expected submit, got {other:?}"),
    }
}

#[test]
fn test_malformed_year_never_reaches_the_engine() {
    let mut engine = ScriptedEngine::accepting();
    let form = BirthDataForm {
        year: "abc".to_string(),
        ..Default::default()
    };
    let err = pipeline::submit(&mut engine, &form, ChartKind::Lagna).unwrap_err();

    match err {
        PipelineError::Form(err) => assert_eq!(
            err.errors,
            vec![FieldError::NotAnInteger {
                field: "year",
                value: "abc".to_string()
            }]
        ),
        other => panic!("expected form error, got {other:?}"),
    }
    assert!(engine.calls().is_empty());
}

#[test]
fn test_success_status_with_invalid_flag_is_rejected() {
    let mut engine = ScriptedEngine::accepting().with_status("SUCCESS", false);
    let err = pipeline::submit(&mut engine, &BirthDataForm::default(), ChartKind::Lagna).unwrap_err();

    match err {
        PipelineError::Validation(err) => assert_eq!(err.reason, "Birth data is not valid."),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(engine.generate_calls(), 0);
}

#[test]
fn test_failure_status_is_surfaced_verbatim() {
    let mut engine =
        ScriptedEngine::accepting().with_status("Timezone must be between -12 and +14", false);
    let err = pipeline::submit(&mut engine, &BirthDataForm::default(), ChartKind::Lagna).unwrap_err();

    assert_eq!(err.kind(), "Validation Error");
    assert_eq!(err.to_string(), "Timezone must be between -12 and +14");
    assert_eq!(engine.generate_calls(), 0);
}

#[test]
fn test_failure_status_wins_even_when_flag_is_true() {
    let mut engine = ScriptedEngine::accepting().with_status("Invalid day", true);
    let err = pipeline::submit(&mut engine, &BirthDataForm::default(), ChartKind::Lagna).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(ref e) if e.reason == "Invalid day"));
    assert_eq!(engine.generate_calls(), 0);
}

#[test]
fn test_consecutive_submissions_do_not_leak() {
    let mut engine = ScriptedEngine::accepting().responding(chart_named_after);

    let first = BirthDataForm {
        name: "Asha Rao".to_string(),
        ..Default::default()
    };
    let second = BirthDataForm {
        name: "Vikram Shenoy".to_string(),
        year: "1987".to_string(),
        ..Default::default()
    };

    let a = pipeline::submit(&mut engine, &first, ChartKind::Lagna).unwrap();
    let b = pipeline::submit(&mut engine, &second, ChartKind::Lagna).unwrap();

    assert_eq!(a.retrieved.chart.name, "Asha Rao");
    assert_eq!(b.retrieved.chart.name, "Vikram Shenoy");
    assert_eq!(b.retrieved.birth_data["year"], "1987");

    // Every submit is directly preceded by a reset.
    let calls = engine.calls();
    for (idx, call) in calls.iter().enumerate() {
        if matches!(call, Call::Submit(_)) {
            assert_eq!(calls[idx - 1], Call::Reset, "submit at {idx} not preceded by reset");
        }
    }
}

#[test]
fn test_missing_chart_is_not_found() {
    let mut engine = ScriptedEngine::accepting().responding(chart_named_after);
    let err =
        pipeline::submit(&mut engine, &BirthDataForm::default(), ChartKind::Navamsa).unwrap_err();
    match err {
        PipelineError::Chart(ChartError::ChartNotFound(id)) => assert_eq!(id, "D9"),
        other => panic!("expected chart not found, got {other:?}"),
    }
}

#[test]
fn test_generator_sentinels_stop_the_submission() {
    let cases: Vec<(EngineOutput, ChartError)> = vec![
        (
            EngineOutput::Message("INPUT_ERROR".to_string()),
            ChartError::InvalidInput,
        ),
        (
            EngineOutput::Message("OUTPUTPATH_ERROR".to_string()),
            ChartError::OutputPathUnavailable,
        ),
        (
            EngineOutput::Message("Invalid parameter 'returnval'".to_string()),
            ChartError::InvalidParameter("Invalid parameter 'returnval'".to_string()),
        ),
        (EngineOutput::Nothing, ChartError::EmptyResult),
    ];

    for (output, expected) in cases {
        let mut engine = ScriptedEngine::accepting().responding(move |_| output.clone());
        let err =
            pipeline::submit(&mut engine, &BirthDataForm::default(), ChartKind::Lagna).unwrap_err();
        match err {
            PipelineError::Chart(actual) => assert_eq!(actual, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
        assert_eq!(engine.generate_calls(), 1);
    }
}

#[test]
fn test_accepted_record_without_birth_data_is_an_engine_error() {
    let mut engine = ScriptedEngine::accepting();
    engine.returns_birth_data = false;
    let err = pipeline::submit(&mut engine, &BirthDataForm::default(), ChartKind::Lagna).unwrap_err();
    assert!(matches!(err, PipelineError::Engine(EngineError::Protocol(_))));
    assert_eq!(engine.generate_calls(), 0);
}
