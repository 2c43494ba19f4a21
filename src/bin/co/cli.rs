//! Everything needed for parsing the CLI arguments for `co`.

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The path to the CO source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,

    /// The path the emitted C source is written to.
    #[arg(short, long)]
    pub output: std::path::PathBuf,

    /// Whether to dump the raw (lossless) parse tree (for debugging).
    #[arg(long)]
    pub dump_parsed: bool,

    /// Whether to dump the resolved issues before emitting C, even when
    /// none are errors.
    #[arg(long)]
    pub dump_issues: bool,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
