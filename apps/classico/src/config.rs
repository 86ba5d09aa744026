use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use clap::Parser;
use regex::{Captures, Regex};
use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::errors::ClassicoError;
use crate::layout::catalog::cap_counts;
use crate::layout::PieceCounts;

/// Command-line flags. Every flag can also come from the environment (or `.env`).
#[derive(Debug, Parser)]
#[command(
    name = "classico",
    version,
    about = "Classico tile layout generator",
    long_about = "Arranges large, medium and small tiles into rows of a fixed pavement width, \
                  layer by layer, and renders the result as HTML."
)]
pub struct Cli {
    /// Config file path (.json, .yaml or .yml). Values in the file override flags.
    #[arg(long, env = "CLASSICO_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of large pieces in one layer
    #[arg(long, env = "CLASSICO_PALLET_LARGE", default_value_t = 32)]
    pub pallet_large: u32,

    /// Number of medium pieces in one layer
    #[arg(long, env = "CLASSICO_PALLET_MEDIUM", default_value_t = 32)]
    pub pallet_medium: u32,

    /// Number of small pieces in one layer
    #[arg(long, env = "CLASSICO_PALLET_SMALL", default_value_t = 8)]
    pub pallet_small: u32,

    /// Number of layers on a pallet
    #[arg(long, env = "CLASSICO_PALLET_LAYERS", default_value_t = 12)]
    pub pallet_layers: u32,

    /// Width of the pavement in small-piece units [default: 10]
    #[arg(long, env = "CLASSICO_PAVEMENT_WIDTH")]
    pub pavement_width: Option<u32>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "CLASSICO_LOG_LEVEL", default_value = "info",
          value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    /// Directory that receives matrix.html and layout.html
    #[arg(long, env = "CLASSICO_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Seed for the random source; drawn from entropy when omitted
    #[arg(long, env = "CLASSICO_SEED")]
    pub seed: Option<u64>,
}

/// Row width used when neither the flag nor either environment variable is set.
const DEFAULT_PAVEMENT_WIDTH: u32 = 10;

/// Older name of the width variable, kept working alongside `CLASSICO_PAVEMENT_WIDTH`.
const ROAD_WIDTH_ENV: &str = "CLASSICO_ROAD_WIDTH";

/// Upper bounds that keep count and width arithmetic inside `u32` across a whole run.
const MAX_PIECES_PER_SIZE: u32 = 10_000;
const MAX_LAYERS: u32 = 1_000;
const MAX_PAVEMENT_WIDTH: u32 = 1_000;

/// Pieces per pallet layer and the number of layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PalletConfig {
    pub large: u32,
    pub medium: u32,
    pub small: u32,
    pub layers: u32,
}

impl PalletConfig {
    pub fn counts(&self) -> PieceCounts {
        PieceCounts::new(self.large, self.medium, self.small)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PavementConfig {
    /// Row width in small-piece units.
    pub width: u32,
}

/// Application configuration: flags and environment, then the optional config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub pallet: PalletConfig,
    pub pavement: PavementConfig,
    pub log_level: String,
    pub output_dir: PathBuf,
    pub seed: Option<u64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Config file overrides
// ────────────────────────────────────────────────────────────────────────────

/// Shape of the config file. Only the fields present override the flags.
///
/// Capitalized and run-together key spellings (`Pallet`, `LogLevel`, `loglevel`)
/// are accepted so files written for earlier releases still load. The `color`
/// and `config_file` sections of those files are read and ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    #[serde(alias = "Pallet")]
    pallet: PalletOverride,
    #[serde(alias = "Pavement")]
    pavement: PavementOverride,
    #[serde(alias = "LogLevel", alias = "loglevel")]
    log_level: Option<String>,
    #[serde(alias = "OutputDir", alias = "outputdir")]
    output_dir: Option<PathBuf>,
    #[serde(alias = "Seed")]
    seed: Option<u64>,
    #[serde(alias = "Color")]
    color: Option<IgnoredAny>,
    #[serde(alias = "ConfigFile", alias = "configfile")]
    config_file: Option<IgnoredAny>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PalletOverride {
    #[serde(alias = "Large")]
    large: Option<u32>,
    #[serde(alias = "Medium")]
    medium: Option<u32>,
    #[serde(alias = "Small")]
    small: Option<u32>,
    #[serde(alias = "Layers")]
    layers: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PavementOverride {
    #[serde(alias = "Width")]
    width: Option<u32>,
}

/// Config file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self, ClassicoError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match extension {
            "json" => Ok(FileFormat::Json),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            _ => Err(ClassicoError::ConfigFile {
                path: path.to_path_buf(),
                reason: format!("unsupported config file type '.{extension}'"),
            }),
        }
    }
}

impl Config {
    /// Loads `.env`, parses flags, applies the config file, and validates.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut cli = Cli::parse();
        if cli.pavement_width.is_none() {
            cli.pavement_width = road_width(|name| std::env::var(name).ok())?;
        }
        let config_file = cli.config_file.clone();
        let mut config = Config::from(cli);
        if let Some(path) = config_file {
            config
                .apply_file(&path)
                .with_context(|| format!("Failed to apply config file '{}'", path.display()))?;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Reads a config file and overrides the fields it sets.
    ///
    /// `{{NAME}}` placeholders are replaced with the value of the environment
    /// variable `NAME` (uppercased) before parsing, so secrets can stay out of the file.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ClassicoError> {
        let format = FileFormat::from_path(path)?;
        let raw = std::fs::read_to_string(path).map_err(|e| ClassicoError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let expanded = substitute_placeholders(&raw, |name| std::env::var(name).ok());
        match format {
            FileFormat::Json => self.apply_json(&expanded),
            FileFormat::Yaml => self.apply_yaml(&expanded),
        }
    }

    fn apply_json(&mut self, json: &str) -> Result<(), ClassicoError> {
        let file: FileConfig = serde_json::from_str(json)?;
        self.apply_overrides(file);
        Ok(())
    }

    fn apply_yaml(&mut self, yaml: &str) -> Result<(), ClassicoError> {
        // An empty YAML document deserializes as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(());
        }
        let file: FileConfig = serde_yaml::from_str(yaml)?;
        self.apply_overrides(file);
        Ok(())
    }

    fn apply_overrides(&mut self, file: FileConfig) {
        let pallet = file.pallet;
        self.pallet.large = pallet.large.unwrap_or(self.pallet.large);
        self.pallet.medium = pallet.medium.unwrap_or(self.pallet.medium);
        self.pallet.small = pallet.small.unwrap_or(self.pallet.small);
        self.pallet.layers = pallet.layers.unwrap_or(self.pallet.layers);
        self.pavement.width = file.pavement.width.unwrap_or(self.pavement.width);
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(dir) = file.output_dir {
            self.output_dir = dir;
        }
        if file.seed.is_some() {
            self.seed = file.seed;
        }
    }

    /// Rejects values the layout core does not define behavior for.
    pub fn validate(&self) -> Result<(), ClassicoError> {
        let positive = [
            ("pallet.large", self.pallet.large),
            ("pallet.medium", self.pallet.medium),
            ("pallet.small", self.pallet.small),
            ("pallet.layers", self.pallet.layers),
            ("pavement.width", self.pavement.width),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ClassicoError::Config(format!("{name} must be positive")));
            }
        }
        let bounded = [
            ("pallet.large", self.pallet.large, MAX_PIECES_PER_SIZE),
            ("pallet.medium", self.pallet.medium, MAX_PIECES_PER_SIZE),
            ("pallet.small", self.pallet.small, MAX_PIECES_PER_SIZE),
            ("pallet.layers", self.pallet.layers, MAX_LAYERS),
            ("pavement.width", self.pavement.width, MAX_PAVEMENT_WIDTH),
        ];
        for (name, value, max) in bounded {
            if value > max {
                return Err(ClassicoError::Config(format!(
                    "{name} must be at most {max}, got {value}"
                )));
            }
        }
        if cap_counts(self.pallet.counts(), self.pavement.width).is_none() {
            return Err(ClassicoError::Config(
                "pallet counts do not yield a catalog cap".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            pallet: PalletConfig {
                large: cli.pallet_large,
                medium: cli.pallet_medium,
                small: cli.pallet_small,
                layers: cli.pallet_layers,
            },
            pavement: PavementConfig {
                width: cli.pavement_width.unwrap_or(DEFAULT_PAVEMENT_WIDTH),
            },
            log_level: cli.log_level,
            output_dir: cli.output_dir,
            seed: cli.seed,
        }
    }
}

/// Reads the width from `CLASSICO_ROAD_WIDTH` when `CLASSICO_PAVEMENT_WIDTH` and
/// the flag are both absent. `None` leaves the default in place.
fn road_width(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<u32>, ClassicoError> {
    let Some(raw) = lookup(ROAD_WIDTH_ENV) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|_| {
        ClassicoError::Config(format!("{ROAD_WIDTH_ENV} is not a valid width: '{raw}'"))
    })
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"))
}

/// Replaces each `{{NAME}}` (word characters only) with `lookup(NAME.to_uppercase())`.
/// Unset variables become empty strings; anything else is left as written.
fn substitute_placeholders(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    placeholder_pattern()
        .replace_all(raw, |caps: &Captures<'_>| {
            lookup(&caps[1].to_uppercase()).unwrap_or_default()
        })
        .into_owned()
}
