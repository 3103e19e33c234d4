mod output;

use clap::{Parser, ValueEnum};
use kundali::presenter::OutputFormat;
use kundali::{BirthDataForm, ChartKind};
use kundali_config::{EngineSettings, KundaliSettings};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EngineKind {
    /// External engine process speaking JSON on stdin/stdout.
    Command,
    /// Replay a recorded dataset.
    Replay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Both,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Both => OutputFormat::Both,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Vedic astrology charts from birth data")]
pub(crate) struct Args {
    /// Config file (default: configs/kundali.toml or kundali.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Engine to use; overrides engine.kind from the config.
    #[arg(long, value_enum)]
    engine: Option<EngineKind>,

    /// Engine program for --engine command.
    #[arg(long)]
    engine_program: Option<String>,

    /// Extra argument for the engine program (repeatable).
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Recorded dataset for --engine replay.
    #[arg(long)]
    dataset: Option<PathBuf>,

    #[arg(long, default_value = "Shyam Bhat")]
    name: String,

    /// male, female or other.
    #[arg(long, default_value = "male")]
    gender: String,

    #[arg(long, default_value = "1991", allow_hyphen_values = true)]
    year: String,

    /// Month number or name (8, August, aug).
    #[arg(long, default_value = "8")]
    month: String,

    #[arg(long, default_value = "8")]
    day: String,

    /// Hour in 24-hour format.
    #[arg(long, default_value = "14")]
    hour: String,

    #[arg(long, default_value = "47")]
    minute: String,

    #[arg(long, default_value = "9")]
    second: String,

    /// Place of birth.
    #[arg(long, default_value = "Honavar")]
    place: String,

    /// Degrees, e.g. +74.4439 for East, -74.4439 for West.
    #[arg(long, default_value = "+74.4439", allow_hyphen_values = true)]
    longitude: String,

    /// Degrees, e.g. +14.2798 for North, -14.2798 for South.
    #[arg(long, default_value = "+14.2798", allow_hyphen_values = true)]
    latitude: String,

    /// GMT offset in hours, e.g. +5.5 for IST, -4.0 for EST.
    #[arg(long, default_value = "+5.5", allow_hyphen_values = true)]
    timezone: String,

    /// Chart to show: "D1 (Lagna)" or "D9 (Navamsa)" (D1/D9 also accepted).
    #[arg(long, default_value = "D1 (Lagna)")]
    chart: ChartKind,

    /// Output format; overrides output.format from the config.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Print JSON on a single line.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Also write the chart JSON to this file.
    #[arg(long)]
    save_json: Option<PathBuf>,

    /// Also write the whole engine dataset to this file (replayable with --dataset).
    #[arg(long)]
    save_dataset: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence).
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn form(&self) -> BirthDataForm {
        BirthDataForm {
            name: self.name.clone(),
            gender: self.gender.clone(),
            year: self.year.clone(),
            month: self.month.clone(),
            day: self.day.clone(),
            hour: self.hour.clone(),
            minute: self.minute.clone(),
            second: self.second.clone(),
            place: self.place.clone(),
            longitude: self.longitude.clone(),
            latitude: self.latitude.clone(),
            timezone: self.timezone.clone(),
        }
    }

    /// Layer command-line overrides on top of the file settings.
    fn apply_overrides(&self, mut settings: KundaliSettings) -> anyhow::Result<KundaliSettings> {
        let kind = self.engine.unwrap_or(match settings.engine {
            EngineSettings::Command { .. } => EngineKind::Command,
            EngineSettings::Replay { .. } => EngineKind::Replay,
        });

        settings.engine = match (kind, settings.engine) {
            (EngineKind::Command, EngineSettings::Command { program, args, working_dir }) => {
                EngineSettings::Command {
                    program: self.engine_program.clone().unwrap_or(program),
                    args: if self.engine_args.is_empty() {
                        args
                    } else {
                        self.engine_args.clone()
                    },
                    working_dir,
                }
            }
            (EngineKind::Command, EngineSettings::Replay { .. }) => {
                let program = self.engine_program.clone().ok_or_else(|| {
                    anyhow::anyhow!("--engine command needs --engine-program (or engine.program in the config)")
                })?;
                EngineSettings::Command {
                    program,
                    args: self.engine_args.clone(),
                    working_dir: None,
                }
            }
            (EngineKind::Replay, EngineSettings::Replay { dataset }) => EngineSettings::Replay {
                dataset: self.dataset.clone().or(dataset),
            },
            (EngineKind::Replay, EngineSettings::Command { .. }) => EngineSettings::Replay {
                dataset: self.dataset.clone(),
            },
        };

        if let Some(format) = self.format {
            settings.output.format = format.into();
        }
        if self.compact {
            settings.output.pretty_json = false;
        }
        Ok(settings)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = kundali_config::load_settings(args.config.as_deref())?;
    if let Some(source) = &settings.source {
        log::info!("loaded settings from {}", source.display());
    }
    let settings = args.apply_overrides(settings)?;
    let mut engine = settings.engine.build()?;

    match kundali::submit(engine.as_mut(), &args.form(), args.chart) {
        Ok(submission) => {
            output::print_submission(&submission, &settings.output)?;
            output::save(&submission, args.save_json.as_deref(), args.save_dataset.as_deref())?;
            Ok(())
        }
        Err(err) => {
            eprintln!("{}: {}", err.kind(), err);
            std::process::exit(1);
        }
    }
}
