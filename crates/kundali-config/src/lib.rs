use anyhow::Context;
use kundali::presenter::OutputFormat;
use kundali::{AstroEngine, CommandEngine, ReplayEngine};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where `kundali.toml` is looked for when no path is given.
pub const CONFIG_PATHS: [&str; 3] = [
    "configs/kundali.toml",
    "kundali.toml",
    "../../configs/kundali.toml",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSettings {
    /// External engine process; see `kundali::engine::command`.
    Command {
        program: String,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
    },
    /// Recorded dataset; the path may also come from the command line.
    Replay { dataset: Option<PathBuf> },
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings::Replay { dataset: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub pretty_json: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Both,
            pretty_json: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KundaliSettings {
    pub engine: EngineSettings,
    pub output: OutputSettings,
    /// File the settings came from, if any.
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct EngineToml {
    #[serde(default = "default_engine_kind")]
    kind: String,
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    working_dir: Option<PathBuf>,
    #[serde(default)]
    dataset: Option<PathBuf>,
}

fn default_engine_kind() -> String {
    "replay".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct OutputToml {
    #[serde(default)]
    format: OutputFormat,
    #[serde(default = "default_pretty_json")]
    pretty_json: bool,
}

fn default_pretty_json() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    engine: Option<EngineToml>,
    #[serde(default)]
    output: Option<OutputToml>,
}

/// Read the config file: `explicit` if given (and it must exist), otherwise
/// the first of [`CONFIG_PATHS`] that can be read.
pub fn read_config_text(explicit: Option<&Path>) -> anyhow::Result<Option<(PathBuf, String)>> {
    if let Some(path) = explicit {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        return Ok(Some((path.to_path_buf(), text)));
    }
    for p in &CONFIG_PATHS {
        if let Ok(text) = fs::read_to_string(p) {
            return Ok(Some((PathBuf::from(p), text)));
        }
    }
    Ok(None)
}

/// Parse settings; relative paths are resolved against `base_dir`.
pub fn parse_settings(text: &str, base_dir: Option<&Path>) -> anyhow::Result<KundaliSettings> {
    let root: RootConfigToml =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse kundali.toml: {e}"))?;

    let engine = match root.engine {
        None => EngineSettings::default(),
        Some(engine) => engine_settings(engine, base_dir)?,
    };
    let output = root
        .output
        .map(|o| OutputSettings {
            format: o.format,
            pretty_json: o.pretty_json,
        })
        .unwrap_or_default();

    Ok(KundaliSettings {
        engine,
        output,
        source: None,
    })
}

fn engine_settings(cfg: EngineToml, base_dir: Option<&Path>) -> anyhow::Result<EngineSettings> {
    let EngineToml {
        kind,
        program,
        args,
        working_dir,
        dataset,
    } = cfg;
    match kind.as_str() {
        "command" => {
            let program = program.ok_or_else(|| {
                anyhow::anyhow!("engine.kind = \"command\" needs engine.program")
            })?;
            if program.trim().is_empty() {
                anyhow::bail!("engine.program must not be empty");
            }
            Ok(EngineSettings::Command {
                program,
                args,
                working_dir: working_dir.map(|p| resolve(base_dir, p)),
            })
        }
        "replay" => Ok(EngineSettings::Replay {
            dataset: dataset.map(|p| resolve(base_dir, p)),
        }),
        other => anyhow::bail!("Unknown engine.kind '{other}' (expected \"command\" or \"replay\")"),
    }
}

fn resolve(base_dir: Option<&Path>, path: PathBuf) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

/// Load settings from `explicit` or the default locations; defaults if none.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<KundaliSettings> {
    let Some((path, text)) = read_config_text(explicit)? else {
        return Ok(KundaliSettings::default());
    };
    let base_dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut settings =
        parse_settings(&text, base_dir).with_context(|| format!("in {}", path.display()))?;
    settings.source = Some(path);
    Ok(settings)
}

impl EngineSettings {
    /// Construct the configured engine.
    pub fn build(&self) -> anyhow::Result<Box<dyn AstroEngine>> {
        match self {
            EngineSettings::Command {
                program,
                args,
                working_dir,
            } => {
                let mut engine = CommandEngine::new(program.clone(), args.clone());
                if let Some(dir) = working_dir {
                    if !dir.is_dir() {
                        anyhow::bail!("engine.working_dir does not exist: {}", dir.display());
                    }
                    engine = engine.with_working_dir(dir);
                }
                Ok(Box::new(engine))
            }
            EngineSettings::Replay { dataset } => {
                let path = dataset.as_ref().ok_or_else(|| {
                    anyhow::anyhow!(
                        "The replay engine needs a recorded dataset (set engine.dataset or pass --dataset)"
                    )
                })?;
                Ok(Box::new(ReplayEngine::from_path(path)?))
            }
        }
    }
}
