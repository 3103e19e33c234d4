use anyhow::Context;
use kundali::presenter;
use kundali::types::month_name;
use kundali::{BirthDataInput, Submission};
use kundali_config::OutputSettings;
use std::fs;
use std::path::Path;

fn describe_birth(input: &BirthDataInput) -> String {
    let month = month_name(input.date.month).unwrap_or("?");
    format!(
        "{} ({}), born {} {} {} at {:02}:{:02}:{:02} in {} ({:+}, {:+}, GMT{:+})",
        input.name,
        input.gender,
        input.date.day,
        month,
        input.date.year,
        input.time.hour,
        input.time.minute,
        input.time.second,
        input.place,
        input.longitude,
        input.latitude,
        input.timezone,
    )
}

pub fn print_submission(submission: &Submission, settings: &OutputSettings) -> anyhow::Result<()> {
    let chart = &submission.retrieved.chart;
    let Some(shown) = presenter::present(Some(chart), settings.pretty_json)? else {
        return Ok(());
    };

    println!("{}", describe_birth(&submission.input));
    println!();
    if settings.format.wants_text() {
        println!("Chart Data (Text Format)");
        println!();
        print!("{}", shown.text);
    }
    if settings.format.wants_json() {
        if settings.format.wants_text() {
            println!();
        }
        println!("Chart Data (JSON Format)");
        println!();
        println!("{}", shown.json);
    }
    Ok(())
}

pub fn save(
    submission: &Submission,
    chart_path: Option<&Path>,
    dataset_path: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(path) = chart_path {
        let json = presenter::to_json(&submission.retrieved.chart, true)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("chart JSON written to {}", path.display());
    }
    if let Some(path) = dataset_path {
        let json = serde_json::to_string_pretty(&submission.retrieved.dataset)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("dataset written to {}", path.display());
    }
    Ok(())
}
