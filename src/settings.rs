//! Command line and config file handling.
//!
//! Lens values arrive as text and are never rejected: anything that is not a
//! finite positive number is replaced by its default and logged.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::optics::LensState;
use crate::sensor::Sensor;
use crate::state::{Theme, MAX_FOCAL_LENGTH_MM, MIN_FOCAL_LENGTH_MM};

pub const DEFAULT_FOCAL_LENGTH_MM: f64 = 50.0;
pub const DEFAULT_F_NUMBER: f64 = 2.8;
pub const DEFAULT_SUBJECT_DISTANCE_M: f64 = 5.0;

/// Depth-of-field calculator with a live focus-zone scene
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct Args {
    /// Focal length in millimetres
    #[arg(short, long)]
    pub focal: Option<String>,

    /// Aperture as an f-number
    #[arg(short, long)]
    pub aperture: Option<String>,

    /// Subject distance in metres
    #[arg(short, long)]
    pub distance: Option<String>,

    /// Sensor format used for the circle of confusion
    #[arg(short, long, value_enum)]
    pub sensor: Option<Sensor>,

    /// Circle of confusion in millimetres, overrides the sensor format
    #[arg(long)]
    pub coc: Option<String>,

    /// JSON file with default values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the results and exit instead of starting the interactive view
    #[arg(short, long)]
    pub print: bool,

    /// Print the results as JSON
    #[arg(long, requires = "print")]
    pub json: bool,

    /// Colour theme of the interactive view
    #[arg(short, long, value_enum)]
    pub theme: Option<Theme>,

    /// Write log output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Contents of a `--config` file. Numbers may also be given as strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub focal_length_mm: Option<Value>,
    pub f_number: Option<Value>,
    pub subject_distance_m: Option<Value>,
    pub sensor: Option<String>,
    pub circle_of_confusion_mm: Option<Value>,
    pub theme: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved starting values for the calculator
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub focal_length_mm: f64,
    pub f_number: f64,
    pub subject_distance_m: f64,
    pub sensor: Sensor,
    /// Explicit circle of confusion replacing the sensor's
    pub coc_override_mm: Option<f64>,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            focal_length_mm: DEFAULT_FOCAL_LENGTH_MM,
            f_number: DEFAULT_F_NUMBER,
            subject_distance_m: DEFAULT_SUBJECT_DISTANCE_M,
            sensor: Sensor::default(),
            coc_override_mm: None,
            theme: Theme::default(),
        }
    }
}

impl Settings {
    /// Loads the config file named by `args`, if any, and merges the command line over it.
    pub fn from_args(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                log::info!("Loading config from {:?}", path);
                FileConfig::load(path)?
            }
            None => FileConfig::default(),
        };
        Ok(Self::resolve(args, &file))
    }

    /// Merges command line values over config file values over defaults.
    pub fn resolve(args: &Args, file: &FileConfig) -> Self {
        let focal_length_mm = pick_number(
            "focal length",
            args.focal.as_deref(),
            file.focal_length_mm.as_ref(),
            DEFAULT_FOCAL_LENGTH_MM,
        );
        let focal_length_mm = within_focal_range(focal_length_mm);
        let f_number = pick_number(
            "aperture",
            args.aperture.as_deref(),
            file.f_number.as_ref(),
            DEFAULT_F_NUMBER,
        );
        let subject_distance_m = pick_number(
            "subject distance",
            args.distance.as_deref(),
            file.subject_distance_m.as_ref(),
            DEFAULT_SUBJECT_DISTANCE_M,
        );

        let sensor = args
            .sensor
            .or_else(|| file.sensor.as_deref().and_then(|name| parse_named(name, "sensor")))
            .unwrap_or_default();
        let theme = args
            .theme
            .or_else(|| file.theme.as_deref().and_then(|name| parse_named(name, "theme")))
            .unwrap_or_default();

        let coc_override_mm = args
            .coc
            .as_deref()
            .and_then(|raw| checked("circle of confusion", parse_text(raw), raw))
            .or_else(|| {
                file.circle_of_confusion_mm
                    .as_ref()
                    .and_then(|value| checked("circle of confusion", parse_value(value), value))
            });

        Settings {
            focal_length_mm,
            f_number,
            subject_distance_m,
            sensor,
            coc_override_mm,
            theme,
        }
    }

    pub fn circle_of_confusion_mm(&self) -> f64 {
        self.coc_override_mm
            .unwrap_or_else(|| self.sensor.circle_of_confusion_mm())
    }

    /// Lens state with the subject distance converted to millimetres and clamped.
    pub fn lens_state(&self) -> LensState {
        LensState::new(
            self.focal_length_mm,
            self.f_number,
            self.subject_distance_m * 1000.0,
            self.circle_of_confusion_mm(),
        )
        .clamped()
    }
}

fn pick_number(name: &str, cli: Option<&str>, file: Option<&Value>, default: f64) -> f64 {
    if let Some(raw) = cli {
        if let Some(value) = checked(name, parse_text(raw), raw) {
            return value;
        }
    }
    if let Some(raw) = file {
        if let Some(value) = checked(name, parse_value(raw), raw) {
            return value;
        }
    }
    default
}

fn within_focal_range(focal_length_mm: f64) -> f64 {
    let clamped = focal_length_mm.clamp(MIN_FOCAL_LENGTH_MM, MAX_FOCAL_LENGTH_MM);
    if clamped != focal_length_mm {
        log::warn!(
            "Focal length {}mm is out of range, using {}mm",
            focal_length_mm,
            clamped
        );
    }
    clamped
}

fn checked(name: &str, parsed: Option<f64>, raw: impl std::fmt::Debug) -> Option<f64> {
    match parsed {
        Some(value) if value.is_finite() && value > 0.0 => Some(value),
        _ => {
            log::warn!("Ignoring invalid {} {:?}, using default", name, raw);
            None
        }
    }
}

fn parse_text(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

fn parse_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_text(text),
        _ => None,
    }
}

fn parse_named<T: ValueEnum>(name: &str, kind: &str) -> Option<T> {
    let parsed = T::from_str(name, true).ok();
    if parsed.is_none() {
        log::warn!("Unknown {} {:?}, using default", kind, name);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(focal: Option<&str>, aperture: Option<&str>, distance: Option<&str>) -> Args {
        Args {
            focal: focal.map(String::from),
            aperture: aperture.map(String::from),
            distance: distance.map(String::from),
            ..Args::default()
        }
    }

    #[test]
    fn test_defaults_when_nothing_given() {
        let settings = Settings::resolve(&Args::default(), &FileConfig::default());
        assert_eq!(settings, Settings::default());
        let lens = settings.lens_state();
        assert_eq!(lens.focal_length_mm, 50.0);
        assert_eq!(lens.f_number, 2.8);
        assert_eq!(lens.subject_distance_mm, 5000.0);
        assert_eq!(lens.circle_of_confusion_mm, 0.03);
    }

    #[test]
    fn test_non_numeric_input_falls_back() {
        let settings = Settings::resolve(
            &args(Some("wide"), Some("-2"), Some("NaN")),
            &FileConfig::default(),
        );
        assert_eq!(settings.focal_length_mm, DEFAULT_FOCAL_LENGTH_MM);
        assert_eq!(settings.f_number, DEFAULT_F_NUMBER);
        assert_eq!(settings.subject_distance_m, DEFAULT_SUBJECT_DISTANCE_M);
    }

    #[test]
    fn test_command_line_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{"focal_length_mm": "85", "f_number": 1.4, "subject_distance_m": 3,
                "sensor": "aps-c", "theme": "light"}"#,
        )
        .unwrap();
        let settings = Settings::resolve(&args(Some("135"), None, Some("oops")), &file);
        assert_eq!(settings.focal_length_mm, 135.0);
        assert_eq!(settings.f_number, 1.4);
        assert_eq!(settings.subject_distance_m, 3.0);
        assert_eq!(settings.sensor, Sensor::ApsC);
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn test_bad_file_values_fall_back() {
        let file: FileConfig = serde_json::from_str(
            r#"{"focal_length_mm": [1, 2], "f_number": null, "sensor": "pinhole",
                "circle_of_confusion_mm": 0}"#,
        )
        .unwrap();
        let settings = Settings::resolve(&Args::default(), &file);
        assert_eq!(settings.focal_length_mm, DEFAULT_FOCAL_LENGTH_MM);
        assert_eq!(settings.f_number, DEFAULT_F_NUMBER);
        assert_eq!(settings.sensor, Sensor::FullFrame);
        assert_eq!(settings.coc_override_mm, None);
    }

    #[test]
    fn test_coc_override() {
        let mut cli = Args::default();
        cli.coc = Some("0.005".to_string());
        cli.sensor = Some(Sensor::MediumFormat);
        let settings = Settings::resolve(&cli, &FileConfig::default());
        assert_eq!(settings.circle_of_confusion_mm(), 0.005);
        cli.coc = None;
        let settings = Settings::resolve(&cli, &FileConfig::default());
        assert_eq!(settings.circle_of_confusion_mm(), 0.043);
    }

    #[test]
    fn test_distance_is_clamped_to_minimum_focus() {
        let settings = Settings::resolve(&args(Some("400"), None, Some("1")), &FileConfig::default());
        assert_eq!(settings.lens_state().subject_distance_mm, 4000.0);
    }

    #[test]
    fn test_focal_length_is_kept_in_range() {
        let settings = Settings::resolve(&args(Some("5000"), None, None), &FileConfig::default());
        assert_eq!(settings.focal_length_mm, MAX_FOCAL_LENGTH_MM);

        let file: FileConfig = serde_json::from_str(r#"{"focal_length_mm": 0.5}"#).unwrap();
        let settings = Settings::resolve(&Args::default(), &file);
        assert_eq!(settings.focal_length_mm, MIN_FOCAL_LENGTH_MM);
        assert_eq!(settings.lens_state().subject_distance_mm, 5000.0);
    }

    #[test]
    fn test_load_config_file() {
        let path = std::env::temp_dir().join(format!("dofview-settings-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"f_number": "8"}}"#).unwrap();
        let config = FileConfig::load(&path).unwrap();
        assert_eq!(parse_value(config.f_number.as_ref().unwrap()), Some(8.0));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(FileConfig::load(&path), Err(Error::ConfigParse { .. })));
        fs::remove_file(&path).unwrap();
        assert!(matches!(FileConfig::load(&path), Err(Error::ConfigRead { .. })));
    }

    #[test]
    fn test_parses_command_line() {
        let args = Args::parse_from(["dofview", "-f", "35", "--sensor", "one-inch", "--print", "--json"]);
        assert_eq!(args.focal.as_deref(), Some("35"));
        assert_eq!(args.sensor, Some(Sensor::OneInch));
        assert!(args.print && args.json);
    }
}
