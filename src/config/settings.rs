//! Settings types for stacklens.
//!
//! These structs map to the user configuration file. Every field has a
//! default, so an absent or empty file yields a usable configuration.

use serde::{Deserialize, Serialize};

/// Default planner binary.
pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

/// Default plan-artifact name template.
pub const DEFAULT_NAME_FORMAT: &str = "stacklens-{timestamp}.tfplan";

/// Default maximum column width, in characters.
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 80;

/// The root settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Rendering mode for commands that honor it.
    pub output: OutputFormat,
    /// Verbose mode: debug logging and extra plan columns.
    pub verbose: bool,
    /// Table rendering settings.
    pub table: TableSettings,
    /// Plan artifact settings.
    pub changeset: ChangesetSettings,
    /// Planner settings.
    pub terraform: TerraformSettings,
    /// AWS client settings.
    pub aws: AwsSettings,
}

/// Table rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct TableSettings {
    /// Border style from the renderer catalog.
    pub style: TableStyle,
    /// Maximum characters per cell; `0` disables truncation.
    pub max_column_width: usize,
}

/// Plan artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChangesetSettings {
    /// Template for the plan artifact basename.
    pub name_format: String,
}

/// Planner settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct TerraformSettings {
    /// Path or name of the planner binary.
    pub binary: String,
}

/// AWS client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct AwsSettings {
    /// Region override; the SDK default chain applies when unset.
    pub region: Option<String>,
    /// Named profile from the shared config files.
    pub profile: Option<String>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Titled tables.
    #[default]
    Table,
    /// JSON for scripting.
    Json,
}

/// Table border styles offered by the renderer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TableStyle {
    /// Plain ASCII borders.
    Ascii,
    /// ASCII borders with rounded corners.
    AsciiRounded,
    /// No borders, space separated.
    Blank,
    /// Dotted borders.
    Dots,
    /// No borders at all.
    Empty,
    /// Double-line box drawing.
    Extended,
    /// GitHub flavored markdown.
    Markdown,
    /// Single-line box drawing.
    Modern,
    /// `PostgreSQL` client style.
    Psql,
    /// reStructuredText simple table.
    ReStructuredText,
    /// Box drawing with rounded corners.
    #[default]
    Rounded,
    /// Box drawing without inner horizontal lines.
    Sharp,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
        }
    }
}

impl Default for ChangesetSettings {
    fn default() -> Self {
        Self {
            name_format: String::from(DEFAULT_NAME_FORMAT),
        }
    }
}

impl Default for TerraformSettings {
    fn default() -> Self {
        Self {
            binary: String::from(DEFAULT_TERRAFORM_BINARY),
        }
    }
}

impl TableStyle {
    /// All catalog entries, in display order.
    pub const ALL: [Self; 12] = [
        Self::Ascii,
        Self::AsciiRounded,
        Self::Blank,
        Self::Dots,
        Self::Empty,
        Self::Extended,
        Self::Markdown,
        Self::Modern,
        Self::Psql,
        Self::ReStructuredText,
        Self::Rounded,
        Self::Sharp,
    ];
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::fmt::Display for TableStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ascii => "ascii",
            Self::AsciiRounded => "ascii-rounded",
            Self::Blank => "blank",
            Self::Dots => "dots",
            Self::Empty => "empty",
            Self::Extended => "extended",
            Self::Markdown => "markdown",
            Self::Modern => "modern",
            Self::Psql => "psql",
            Self::ReStructuredText => "re-structured-text",
            Self::Rounded => "rounded",
            Self::Sharp => "sharp",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.output, OutputFormat::Table);
        assert!(!settings.verbose);
        assert_eq!(settings.table.style, TableStyle::Rounded);
        assert_eq!(settings.table.max_column_width, DEFAULT_MAX_COLUMN_WIDTH);
        assert_eq!(settings.changeset.name_format, DEFAULT_NAME_FORMAT);
        assert_eq!(settings.terraform.binary, "terraform");
    }

    #[test]
    fn test_style_names_match_serde() {
        for style in TableStyle::ALL {
            let yaml = serde_yaml::to_string(&style).expect("serialize style");
            assert_eq!(yaml.trim(), style.to_string());
        }
    }
}
