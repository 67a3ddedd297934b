//! Reads the fuel configuration file and builds the catalog and configs.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and the
//! resolution step from [`FuelConfigData`] to a [`FuelConfig`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use fuelsim_core::catalog::{FuelSettings, VehicleCatalog};
use fuelsim_core::config::{ServiceConfig, SimConfig};
use fuelsim_core::fuel::FuelType;
use fuelsim_core::id::ModelHash;
use serde::de::DeserializeOwned;

use crate::schema::FuelConfigData;

/// Base name of the configuration file inside a data directory.
pub const CONFIG_BASE_NAME: &str = "fuel";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading the fuel configuration.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A fuel type name is not one of the known types.
    #[error("unknown fuel type '{name}' in {file}")]
    UnknownFuelType { file: PathBuf, name: String },

    /// A model appears twice where it may appear once.
    #[error("duplicate model '{name}' in {file}")]
    DuplicateModel { file: PathBuf, name: String },

    /// A numeric value is out of range.
    #[error("invalid value for '{name}' in {file}: {detail}")]
    InvalidValue {
        file: PathBuf,
        name: String,
        detail: String,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for `{base_name}.ron`, `.toml` and `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Deserialize already-read text. `path` is only used in error messages.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    path: &Path,
) -> Result<T, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

// ===========================================================================
// Resolution
// ===========================================================================

/// A fully resolved fuel configuration.
#[derive(Debug, Clone, Default)]
pub struct FuelConfig {
    pub catalog: VehicleCatalog,
    pub simulation: SimConfig,
    pub service: ServiceConfig,
}

/// Load `fuel.{ron,toml,json}` from a directory.
pub fn load_fuel_config_dir(dir: &Path) -> Result<FuelConfig, DataLoadError> {
    let path = require_data_file(dir, CONFIG_BASE_NAME)?;
    load_fuel_config(&path)
}

/// Load and resolve a fuel configuration file.
pub fn load_fuel_config(path: &Path) -> Result<FuelConfig, DataLoadError> {
    let data: FuelConfigData = deserialize_file(path)?;
    let config = resolve(data, path)?;
    log::info!(
        "loaded fuel config from {} ({} models)",
        path.display(),
        config.catalog.len()
    );
    Ok(config)
}

/// Turn the raw file contents into a [`FuelConfig`].
pub fn resolve(data: FuelConfigData, file: &Path) -> Result<FuelConfig, DataLoadError> {
    let settings = FuelSettings {
        default_consumption: positive(data.settings.default_consumption, "default_consumption", file)?,
        default_fuel: parse_fuel_type(&data.settings.default_fuel, file)?,
        default_max: positive(data.settings.default_max, "default_max", file)?,
    };
    let mut catalog = VehicleCatalog::new(settings);

    let mut seen: HashSet<&str> = HashSet::new();
    for vehicle in &data.vehicles {
        if !seen.insert(&vehicle.model) {
            return Err(duplicate(&vehicle.model, file));
        }

        let consumption = positive(vehicle.consume, &vehicle.model, file)?;
        let max_fuel = positive(vehicle.max_fuel, &vehicle.model, file)?;
        let fuel_type = vehicle
            .fuel_type
            .as_deref()
            .map(|name| parse_fuel_type(name, file))
            .transpose()?;
        catalog.insert(
            ModelHash::from_name(&vehicle.model),
            consumption,
            max_fuel,
            fuel_type,
        );
    }

    // Groups override the per-vehicle type.
    let mut grouped: HashMap<&str, FuelType> = HashMap::new();
    for (type_name, models) in &data.fuel_types {
        let fuel_type = parse_fuel_type(type_name, file)?;
        for model in models {
            if grouped.insert(model, fuel_type).is_some() {
                return Err(duplicate(model, file));
            }
            catalog.set_fuel_type(ModelHash::from_name(model), fuel_type);
        }
    }

    let simulation = data.simulation;
    positive(simulation.health_decrement, "health_decrement", file)?;
    positive(simulation.degrade_interval_secs, "degrade_interval_secs", file)?;
    non_negative(simulation.health_regen, "health_regen", file)?;
    positive(simulation.sensitivity, "sensitivity", file)?;
    positive(simulation.max_health, "max_health", file)?;

    Ok(FuelConfig {
        catalog,
        simulation,
        service: data.service,
    })
}

// ===========================================================================
// Helpers
// ===========================================================================

fn parse_fuel_type(name: &str, file: &Path) -> Result<FuelType, DataLoadError> {
    name.parse().map_err(|_| DataLoadError::UnknownFuelType {
        file: file.to_path_buf(),
        name: name.to_string(),
    })
}

fn duplicate(name: &str, file: &Path) -> DataLoadError {
    DataLoadError::DuplicateModel {
        file: file.to_path_buf(),
        name: name.to_string(),
    }
}

fn non_negative(value: f64, name: &str, file: &Path) -> Result<f64, DataLoadError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(name, file, format!("{value} must be a finite non-negative number")))
    }
}

fn positive(value: f64, name: &str, file: &Path) -> Result<f64, DataLoadError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(name, file, format!("{value} must be a finite positive number")))
    }
}

fn invalid(name: &str, file: &Path, detail: String) -> DataLoadError {
    DataLoadError::InvalidValue {
        file: file.to_path_buf(),
        name: name.to_string(),
        detail,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fuelsim_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const RON_CONFIG: &str = r#"(
        settings: (default_consumption: 0.003, default_fuel: "Diesel", default_max: 30.0),
        simulation: (health_decrement: 50.0),
        service: (refill_radius: 8.0),
        vehicles: [
            (model: "t20", consume: 0.009, type: Some("Diesel"), max_fuel: 40.0),
            (model: "panto", consume: 0.05, max_fuel: 15.0),
            (model: "italirsx", consume: 0.002, type: Some("Diesel"), max_fuel: 30.0),
        ],
        fuel_types: {
            "Gasolin": ["panto", "zentorno"],
            "electric": ["italirsx"],
        },
    )"#;

    const TOML_CONFIG: &str = r#"
[settings]
default_fuel = "Electric"

[simulation]
degrade_interval_secs = 2.0

[[vehicles]]
model = "krieger"
consume = 0.01
max_fuel = 50.0

[fuel_types]
Kerosin = ["krieger"]
"#;

    const JSON_CONFIG: &str = r#"{
        "vehicles": [
            {"model": "italirsx", "consume": 0.002, "type": "Electric", "max_fuel": 30.0}
        ]
    }"#;

    // -----------------------------------------------------------------------
    // detect_format / discovery
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("fuel.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("fuel.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("fuel.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("fuel.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("fuel")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn find_data_file_variants() {
        let dir = make_test_dir("find");
        assert_eq!(find_data_file(&dir, "fuel").unwrap(), None);

        fs::write(dir.join("fuel.toml"), "").unwrap();
        assert_eq!(
            find_data_file(&dir, "fuel").unwrap(),
            Some(dir.join("fuel.toml"))
        );

        fs::write(dir.join("fuel.json"), "{}").unwrap();
        assert!(matches!(
            find_data_file(&dir, "fuel"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn missing_config_dir_file() {
        let dir = make_test_dir("missing");
        assert!(matches!(
            load_fuel_config_dir(&dir),
            Err(DataLoadError::MissingRequired { .. })
        ));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    #[test]
    fn load_ron_config() {
        let dir = make_test_dir("ron");
        fs::write(dir.join("fuel.ron"), RON_CONFIG).unwrap();

        let config = load_fuel_config_dir(&dir).unwrap();
        let t20 = config.catalog.resolve(ModelHash::from_name("t20"));
        assert_eq!(t20.consumption, 0.009);
        assert_eq!(t20.max_fuel, 40.0);
        assert_eq!(t20.fuel_type, FuelType::Diesel);

        // Group type wins over the table.
        let italirsx = config.catalog.resolve(ModelHash::from_name("italirsx"));
        assert_eq!(italirsx.fuel_type, FuelType::Electric);

        // Type from the group, numbers from the table.
        let panto = config.catalog.resolve(ModelHash::from_name("panto"));
        assert_eq!(panto.fuel_type, FuelType::Gasoline);
        assert_eq!(panto.max_fuel, 15.0);

        // Type-only entry falls back for the numbers.
        let zentorno = config.catalog.resolve(ModelHash::from_name("zentorno"));
        assert_eq!(zentorno.fuel_type, FuelType::Gasoline);
        assert_eq!(zentorno.max_fuel, 30.0);

        assert_eq!(config.simulation.health_decrement, 50.0);
        assert_eq!(config.simulation.max_health, 1000.0);
        assert_eq!(config.service.refill_radius, 8.0);
        assert_eq!(config.service.tick_interval_ms, 1000);

        cleanup(&dir);
    }

    #[test]
    fn load_toml_config() {
        let dir = make_test_dir("toml");
        let path = dir.join("fuel.toml");
        fs::write(&path, TOML_CONFIG).unwrap();

        let config = load_fuel_config(&path).unwrap();
        assert_eq!(config.catalog.settings().default_fuel, FuelType::Electric);
        assert_eq!(
            config.catalog.resolve(ModelHash::from_name("krieger")).fuel_type,
            FuelType::Kerosene
        );
        assert_eq!(config.simulation.degrade_interval_secs, 2.0);

        cleanup(&dir);
    }

    #[test]
    fn load_json_config() {
        let dir = make_test_dir("json");
        let path = dir.join("fuel.json");
        fs::write(&path, JSON_CONFIG).unwrap();

        let config = load_fuel_config(&path).unwrap();
        assert_eq!(config.catalog.len(), 1);
        let spec = config.catalog.resolve(ModelHash::from_name("italirsx"));
        assert_eq!(spec.fuel_type, FuelType::Electric);
        assert_eq!(spec.consumption, 0.002);

        cleanup(&dir);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = resolve(FuelConfigData::default(), Path::new("fuel.ron")).unwrap();
        assert!(config.catalog.is_empty());
        assert_eq!(config.simulation, SimConfig::default());
        assert_eq!(config.service, ServiceConfig::default());
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_fuel_type_is_rejected() {
        let json = r#"{"vehicles": [{"model": "t20", "consume": 0.1, "type": "Plasma", "max_fuel": 10.0}]}"#;
        let data: FuelConfigData =
            deserialize_str(json, Format::Json, Path::new("fuel.json")).unwrap();
        assert!(matches!(
            resolve(data, Path::new("fuel.json")),
            Err(DataLoadError::UnknownFuelType { ref name, .. }) if name == "Plasma"
        ));
    }

    #[test]
    fn duplicate_vehicle_is_rejected() {
        let json = r#"{"vehicles": [
            {"model": "t20", "consume": 0.1, "max_fuel": 10.0},
            {"model": "t20", "consume": 0.2, "max_fuel": 10.0}
        ]}"#;
        let data: FuelConfigData =
            deserialize_str(json, Format::Json, Path::new("fuel.json")).unwrap();
        assert!(matches!(
            resolve(data, Path::new("fuel.json")),
            Err(DataLoadError::DuplicateModel { ref name, .. }) if name == "t20"
        ));
    }

    #[test]
    fn model_in_two_groups_is_rejected() {
        let json = r#"{"fuel_types": {"Diesel": ["t20"], "Electric": ["t20"]}}"#;
        let data: FuelConfigData =
            deserialize_str(json, Format::Json, Path::new("fuel.json")).unwrap();
        assert!(matches!(
            resolve(data, Path::new("fuel.json")),
            Err(DataLoadError::DuplicateModel { .. })
        ));
    }

    #[test]
    fn bad_capacity_is_rejected() {
        let json = r#"{"vehicles": [{"model": "t20", "consume": 0.1, "max_fuel": 0.0}]}"#;
        let data: FuelConfigData =
            deserialize_str(json, Format::Json, Path::new("fuel.json")).unwrap();
        assert!(matches!(
            resolve(data, Path::new("fuel.json")),
            Err(DataLoadError::InvalidValue { ref name, .. }) if name == "t20"
        ));
    }

    fn simulation_error(simulation: &str) -> Option<String> {
        let json = format!(r#"{{"simulation": {simulation}}}"#);
        let data: FuelConfigData =
            deserialize_str(&json, Format::Json, Path::new("fuel.json")).unwrap();
        match resolve(data, Path::new("fuel.json")) {
            Err(DataLoadError::InvalidValue { name, .. }) => Some(name),
            _ => None,
        }
    }

    #[test]
    fn zero_consumption_is_rejected() {
        let json = r#"{"vehicles": [{"model": "t20", "consume": 0.0, "max_fuel": 10.0}]}"#;
        let data: FuelConfigData =
            deserialize_str(json, Format::Json, Path::new("fuel.json")).unwrap();
        assert!(matches!(
            resolve(data, Path::new("fuel.json")),
            Err(DataLoadError::InvalidValue { ref name, .. }) if name == "t20"
        ));

        let json = r#"{"settings": {"default_consumption": 0.0}}"#;
        let data: FuelConfigData =
            deserialize_str(json, Format::Json, Path::new("fuel.json")).unwrap();
        assert!(matches!(
            resolve(data, Path::new("fuel.json")),
            Err(DataLoadError::InvalidValue { ref name, .. }) if name == "default_consumption"
        ));
    }

    #[test]
    fn degrade_interval_must_be_positive() {
        for interval in ["0.0", "-1.0"] {
            assert_eq!(
                simulation_error(&format!(r#"{{"degrade_interval_secs": {interval}}}"#)),
                Some("degrade_interval_secs".to_string())
            );
        }
        assert_eq!(
            simulation_error(r#"{"degrade_interval_secs": 0.5}"#),
            None
        );
    }

    #[test]
    fn zero_health_decrement_is_rejected() {
        assert_eq!(
            simulation_error(r#"{"health_decrement": 0.0}"#),
            Some("health_decrement".to_string())
        );
    }

    #[test]
    fn non_finite_degrade_interval_is_rejected() {
        let data = FuelConfigData {
            simulation: SimConfig {
                degrade_interval_secs: f64::NAN,
                ..SimConfig::default()
            },
            ..FuelConfigData::default()
        };
        assert!(matches!(
            resolve(data, Path::new("fuel.ron")),
            Err(DataLoadError::InvalidValue { ref name, .. }) if name == "degrade_interval_secs"
        ));
    }

    #[test]
    fn parse_error_names_file() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("fuel.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let err = load_fuel_config(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
        assert!(err.to_string().contains("fuel.ron"));

        cleanup(&dir);
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(format!("{data_err}").contains("file not found"));
    }
}
