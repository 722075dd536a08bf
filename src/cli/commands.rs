//! CLI command implementations
//!
//! Each command resolves its configuration, builds (or reuses) a registry,
//! and returns the JSON payload written on success.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::ModelLoader;
use crate::schema::{registry, unique_key_names, Registry, ValidationConfig, Validator};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_error, write_response};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "./hireguard.json";

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory of catalog fragments; the built-in catalog when absent
    #[serde(default)]
    pub models_dir: Option<String>,

    /// Validator limits
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Explicit path, else `./hireguard.json` if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> CliResult<()> {
        if let Some(dir) = &self.models_dir {
            if dir.trim().is_empty() {
                return Err(CliError::config_error("models_dir must not be empty"));
            }
        }
        self.validation
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))
    }

    pub fn models_path(&self) -> Option<PathBuf> {
        self.models_dir.as_ref().map(PathBuf::from)
    }
}

/// Registry a command runs against.
enum Loaded {
    Builtin(&'static Registry),
    Custom(Registry),
}

impl Loaded {
    fn get(&self) -> &Registry {
        match self {
            Loaded::Builtin(registry) => registry,
            Loaded::Custom(registry) => registry,
        }
    }
}

fn load_registry(config: &Config) -> CliResult<Loaded> {
    let Some(dir) = config.models_path() else {
        return Ok(Loaded::Builtin(registry()));
    };
    let mut loader = ModelLoader::new(&dir);
    loader.load_all()?;
    let catalog = loader.into_catalog()?;
    Ok(Loaded::Custom(Registry::build(catalog)?))
}

/// Parses arguments, runs the command and prints the result.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(&e)?;
            Err(e)
        }
    }
}

/// Runs one command, returning its output payload.
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Validate {
            schema,
            input,
            config,
        } => {
            let config = Config::resolve(config.as_deref())?;
            let document = read_input(input.as_deref())?;
            validate(&config, &schema, &document)
        }
        Command::Schemas { model, config } => {
            let config = Config::resolve(config.as_deref())?;
            schemas(&config, model.as_deref())
        }
        Command::Models { config } => {
            let config = Config::resolve(config.as_deref())?;
            models(&config)
        }
    }
}

/// Validates a document, returning its normalized form.
pub fn validate(config: &Config, schema: &str, document: &Value) -> CliResult<Value> {
    let loaded = load_registry(config)?;
    let validator = Validator::with_config(loaded.get(), config.validation);
    Ok(validator.validate(schema, document)?)
}

/// Lists schema names, optionally those of one model.
pub fn schemas(config: &Config, model: Option<&str>) -> CliResult<Value> {
    let loaded = load_registry(config)?;
    let registry = loaded.get();
    let names: Vec<&str> = match model {
        Some(model) => {
            if registry.catalog().model(model).is_none() {
                return Err(CliError::not_found(format!("model '{}' is not declared", model)));
            }
            registry
                .names_for_model(model)
                .iter()
                .map(String::as_str)
                .collect()
        }
        None => registry.names(),
    };
    Ok(json!({
        "count": names.len(),
        "schemas": names,
    }))
}

/// Summarizes models and enums of the catalog.
pub fn models(config: &Config) -> CliResult<Value> {
    let loaded = load_registry(config)?;
    let catalog = loaded.get().catalog();
    let models: Vec<Value> = catalog
        .models
        .iter()
        .map(|model| {
            json!({
                "name": model.name,
                "fields": model.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                "relations": model.relations.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                "uniqueKeys": unique_key_names(model),
            })
        })
        .collect();
    let enums: Vec<Value> = catalog
        .enums
        .iter()
        .map(|e| json!({"name": e.name, "values": e.values}))
        .collect();
    Ok(json!({
        "models": models,
        "enums": enums,
    }))
}
