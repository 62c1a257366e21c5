//! Settings loader.
//!
//! Settings are layered: built-in defaults, then the YAML configuration
//! file, then `STACKLENS_*` environment variables. Command-line flags are
//! applied last by the binary.

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, Result, StacklensError};

use super::settings::{OutputFormat, Settings, TableStyle};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "STACKLENS_CONFIG";

/// Every key the configuration file may contain, as dotted paths.
const KNOWN_KEYS: &[&str] = &[
    "output",
    "verbose",
    "table",
    "table.style",
    "table.max-column-width",
    "changeset",
    "changeset.name-format",
    "terraform",
    "terraform.binary",
    "aws",
    "aws.region",
    "aws.profile",
];

/// Keys that hold nested mappings.
const SECTIONS: &[&str] = &["table", "changeset", "terraform", "aws"];

/// Loader for stacklens settings.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Directory searched for `.env`.
    base_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Creates a new loader.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the directory searched for `.env`.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads settings from the explicit file, or the default location when
    /// it exists, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, a file cannot be
    /// parsed, or a key or environment value is invalid.
    pub fn load(&self, explicit: Option<&Path>) -> Result<Settings> {
        let mut settings = match explicit {
            Some(path) => self.load_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => self.load_file(&path)?,
                None => {
                    debug!("No configuration file found, using defaults");
                    Settings::default()
                }
            },
        };

        apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(StacklensError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            StacklensError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or names an unknown key.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<Settings> {
        let location = source.map(|p| p.display().to_string());

        let value: Value = serde_yaml::from_str(content).map_err(|e| {
            StacklensError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: location.clone(),
            })
        })?;

        let mapping = match value {
            Value::Null => return Ok(Settings::default()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(StacklensError::Config(ConfigError::ParseError {
                    message: String::from("top level must be a mapping"),
                    location,
                }));
            }
        };

        check_keys(&mapping, "")?;

        let settings: Settings = serde_yaml::from_value(Value::Mapping(mapping)).map_err(|e| {
            StacklensError::Config(ConfigError::ParseError {
                message: e.to_string(),
                location,
            })
        })?;

        debug!("Parsed configuration: output={}, style={}", settings.output, settings.table.style);
        Ok(settings)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                StacklensError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        }

        Ok(())
    }
}

/// Returns the per-user configuration file location.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stacklens").join("config.yaml"))
}

/// Rejects any key outside `KNOWN_KEYS`, recursing into sections.
fn check_keys(mapping: &Mapping, prefix: &str) -> Result<()> {
    for (key, value) in mapping {
        let name = match key {
            Value::String(s) => s.clone(),
            other => serde_yaml::to_string(other)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        };
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}.{name}")
        };

        if !KNOWN_KEYS.contains(&path.as_str()) {
            return Err(StacklensError::Config(ConfigError::UnknownKey { key: path }));
        }

        if SECTIONS.contains(&path.as_str()) {
            if let Value::Mapping(inner) = value {
                check_keys(inner, &path)?;
            }
        }
    }
    Ok(())
}

/// Applies `STACKLENS_*` overrides read through `lookup`.
///
/// # Errors
///
/// Returns an error if a variable holds a value its key cannot accept.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(output) = lookup("STACKLENS_OUTPUT") {
        debug!("Overriding output from environment");
        settings.output = parse_enum::<OutputFormat>("output", &output)?;
    }

    if let Some(style) = lookup("STACKLENS_TABLE_STYLE") {
        debug!("Overriding table.style from environment");
        settings.table.style = parse_enum::<TableStyle>("table.style", &style)?;
    }

    if let Some(width) = lookup("STACKLENS_TABLE_MAX_COLUMN_WIDTH") {
        debug!("Overriding table.max-column-width from environment");
        settings.table.max_column_width = width.trim().parse().map_err(|e| {
            ConfigError::invalid("table.max-column-width", format!("{width:?}: {e}"))
        })?;
    }

    if let Some(format) = lookup("STACKLENS_CHANGESET_NAME_FORMAT") {
        debug!("Overriding changeset.name-format from environment");
        settings.changeset.name_format = format;
    }

    if let Some(binary) = lookup("STACKLENS_TERRAFORM_BINARY") {
        debug!("Overriding terraform.binary from environment");
        settings.terraform.binary = binary;
    }

    if let Some(verbose) = lookup("STACKLENS_VERBOSE") {
        debug!("Overriding verbose from environment");
        settings.verbose = parse_bool("verbose", &verbose)?;
    }

    Ok(())
}

fn parse_enum<T: clap::ValueEnum>(key: &str, raw: &str) -> Result<T> {
    T::from_str(raw.trim(), true)
        .map_err(|e| StacklensError::Config(ConfigError::invalid(key, e)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(StacklensError::Config(ConfigError::invalid(
            key,
            format!("expected a boolean, got {other:?}"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_empty_config() {
        let loader = ConfigLoader::new();
        let settings = loader.parse_yaml("", None).expect("empty config is valid");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
output: json
verbose: true
table:
  style: markdown
  max-column-width: 40
changeset:
  name-format: "plan-{uuid}"
terraform:
  binary: /usr/local/bin/tofu
aws:
  region: eu-west-1
  profile: ops
"#;
        let settings = ConfigLoader::new()
            .parse_yaml(yaml, None)
            .expect("valid config");

        assert_eq!(settings.output, OutputFormat::Json);
        assert!(settings.verbose);
        assert_eq!(settings.table.style, TableStyle::Markdown);
        assert_eq!(settings.table.max_column_width, 40);
        assert_eq!(settings.changeset.name_format, "plan-{uuid}");
        assert_eq!(settings.terraform.binary, "/usr/local/bin/tofu");
        assert_eq!(settings.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.aws.profile.as_deref(), Some("ops"));
    }

    #[test]
    fn test_unknown_top_level_key() {
        let result = ConfigLoader::new().parse_yaml("colour: always\n", None);
        match result {
            Err(StacklensError::Config(ConfigError::UnknownKey { key })) => {
                assert_eq!(key, "colour");
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_nested_key_reports_dotted_path() {
        let yaml = "table:\n  style: psql\n  padding: 2\n";
        let result = ConfigLoader::new().parse_yaml(yaml, None);
        match result {
            Err(StacklensError::Config(ConfigError::UnknownKey { key })) => {
                assert_eq!(key, "table.padding");
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_style_is_parse_error() {
        let result = ConfigLoader::new().parse_yaml("table:\n  style: fancy\n", None);
        assert!(matches!(
            result,
            Err(StacklensError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = ConfigLoader::new().load_file("/nonexistent/stacklens.yaml");
        assert!(matches!(
            result,
            Err(StacklensError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STACKLENS_OUTPUT", "JSON"),
            ("STACKLENS_TABLE_STYLE", "ascii-rounded"),
            ("STACKLENS_TABLE_MAX_COLUMN_WIDTH", "24"),
            ("STACKLENS_VERBOSE", "yes"),
        ]);
        let mut settings = Settings::default();

        apply_env_overrides(&mut settings, |name| vars.get(name).map(|v| (*v).to_string()))
            .expect("overrides apply");

        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.table.style, TableStyle::AsciiRounded);
        assert_eq!(settings.table.max_column_width, 24);
        assert!(settings.verbose);
    }

    #[test]
    fn test_dotenv_loaded_from_base_path() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(
            dir.path().join(".env"),
            "STACKLENS_DOTENV_FIXTURE=from-base-path\n",
        )
        .expect("write .env");

        ConfigLoader::new()
            .with_base_path(dir.path())
            .load_dotenv()
            .expect(".env loads");

        assert_eq!(
            std::env::var("STACKLENS_DOTENV_FIXTURE").as_deref(),
            Ok("from-base-path")
        );
    }

    #[test]
    fn test_missing_dotenv_is_ignored() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        assert!(ConfigLoader::new()
            .with_base_path(dir.path())
            .load_dotenv()
            .is_ok());
    }

    #[test]
    fn test_env_override_rejects_bad_width() {
        let mut settings = Settings::default();
        let result = apply_env_overrides(&mut settings, |name| {
            (name == "STACKLENS_TABLE_MAX_COLUMN_WIDTH").then(|| String::from("wide"))
        });
        assert!(matches!(
            result,
            Err(StacklensError::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
