//! Command-line arguments for the itemqueue binary

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::logging::{LOG_FORMATS, LOG_LEVELS};

/// Which numbers the demo queue's predicate accepts
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NumberFilter {
    #[default]
    All,
    Even,
    Odd,
    Positive,
}

impl NumberFilter {
    pub fn accepts(self, value: i64) -> bool {
        match self {
            NumberFilter::All => true,
            NumberFilter::Even => value % 2 == 0,
            NumberFilter::Odd => value % 2 != 0,
            NumberFilter::Positive => value > 0,
        }
    }
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "itemqueue")]
#[command(about = "Sum numbers through a predicate-filtered processing queue")]
#[command(version)]
#[command(after_help = "Numbers are read from standard input when none are given")]
pub struct Args {
    /// Numbers to enqueue
    #[arg(value_name = "NUMBERS", allow_negative_numbers = true)]
    pub numbers: Vec<i64>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Queue name (generated when omitted)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Numbers accepted by the predicate
    #[arg(short = 'F', long = "filter", value_enum, value_name = "FILTER")]
    pub filter: Option<NumberFilter>,

    /// Stop without processing items still queued
    #[arg(short = 'd', long = "discard")]
    pub discard: bool,

    /// Force colored output
    #[arg(short = 'g', long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = LOG_LEVELS)]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = LOG_FORMATS)]
    pub log_format: Option<String>,
}

impl Args {
    /// Resolve color output from the flags, falling back to `auto`
    ///
    /// Some(true) forces color, Some(false) disables it, None leaves the
    /// decision to the terminal check.
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
