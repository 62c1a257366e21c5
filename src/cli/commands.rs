//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{OutputFormat, Settings, TableStyle, CONFIG_ENV};

/// Stacklens - inspect deployed stacks and summarize Terraform plans.
#[derive(Parser, Debug)]
#[command(name = "stacklens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Output format (table, json).
    #[arg(long, global = true)]
    pub output: Option<OutputFormat>,

    /// Enable verbose output and extra plan columns.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Table border style.
    #[arg(long, global = true)]
    pub style: Option<TableStyle>,

    /// AWS region.
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// AWS named profile.
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Describe a deployed resource.
    Describe {
        /// What to describe.
        #[command(subcommand)]
        command: DescribeCommands,
    },

    /// Plan a Terraform configuration and summarize the changes.
    Terraform {
        /// Directory holding the configuration.
        #[arg(long, default_value = ".")]
        workdir: PathBuf,
    },

    /// Renderer demonstrations.
    Demo {
        /// Demo subcommand.
        #[command(subcommand)]
        command: DemoCommands,
    },
}

/// Describe subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DescribeCommands {
    /// Show parameters, conditions, rules, resources and outputs of a stack.
    Stack {
        /// Name of the deployed stack.
        #[arg(long)]
        stack_name: String,
    },
}

/// Demo subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DemoCommands {
    /// Render canned tables in the configured style.
    Tables,
}

impl Cli {
    /// Applies flags on top of loaded settings; flags win.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(output) = self.output {
            settings.output = output;
        }
        if self.verbose {
            settings.verbose = true;
        }
        if let Some(style) = self.style {
            settings.table.style = style;
        }
        if let Some(region) = &self.region {
            settings.aws.region = Some(region.clone());
        }
        if let Some(profile) = &self.profile {
            settings.aws.profile = Some(profile.clone());
        }
    }
}
