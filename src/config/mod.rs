//! Configuration module for stacklens.
//!
//! This module handles all configuration-related functionality:
//! - Settings types and their defaults
//! - Layered loading from file, `.env` and environment variables
//! - Plan artifact name templates

mod name_format;
mod parser;
mod settings;

pub use name_format::NameFormat;
pub use parser::{apply_env_overrides, default_config_path, ConfigLoader, CONFIG_ENV};
pub use settings::{
    AwsSettings, ChangesetSettings, OutputFormat, Settings, TableSettings, TableStyle,
    TerraformSettings, DEFAULT_MAX_COLUMN_WIDTH, DEFAULT_NAME_FORMAT, DEFAULT_TERRAFORM_BINARY,
};
