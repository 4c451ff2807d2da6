mod color;

use crate::config::DEFAULT_SECTION;
use crate::consumer::StderrMode;
use crate::filter::MatchOptions;
use clap::Parser;
pub use color::ColorMode;
use std::path::PathBuf;

/// Find messages in Kafka topics by time window and search terms, using kcat
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// kcat executable to run, if it is not on PATH as `kcat`
    #[arg(short = 'k', long = "kcat", env = "KCAT_PATH", default_value = "kcat")]
    pub kcat: PathBuf,

    /// TOML file whose section holds bootstrap.servers and extra kcat -X properties
    #[arg(short, long)]
    pub config: PathBuf,

    /// Section of the config file to read
    #[arg(long, default_value = DEFAULT_SECTION)]
    pub section: String,

    /// Topics to read from
    #[arg(short, long, num_args = 1.., required = true)]
    pub topics: Vec<String>,

    /// Start reading this long ago: <n>d (days), <n>h (hours), <n>m (minutes) or <n>s (seconds)
    #[arg(short, long, default_value = "1d")]
    pub begin: String,

    /// Stop reading this long ago, same format as --begin; 0s reads up to now
    #[arg(short, long, default_value = "0s")]
    pub end: String,

    /// Search terms, any of which may match anywhere in the message (topic, key,
    /// headers, payload). Join tokens with ~~ to require all of them.
    #[arg(short, long, num_args = 1..)]
    pub search: Vec<String>,

    /// Make the search terms case insensitive
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Treat search terms as literal text rather than regular expressions
    #[arg(short = 'F', long)]
    pub fixed_strings: bool,

    /// Do not check that the consumer executable is kcat
    #[arg(long)]
    pub skip_verify: bool,

    /// Show kcat's own stderr messages
    #[arg(long)]
    pub show_consumer_stderr: bool,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_insensitive: self.ignore_case,
            fixed_strings: self.fixed_strings,
        }
    }

    pub fn stderr_mode(&self) -> StderrMode {
        if self.show_consumer_stderr {
            StderrMode::Inherit
        } else {
            StderrMode::Discard
        }
    }

    /// Log level used when RUST_LOG is not set
    pub fn default_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
