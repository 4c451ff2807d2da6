use clap::ValueEnum;

/// When to color console output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when writing to a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Install this choice as the process-wide `colored` setting
    pub fn apply(self) {
        match self {
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
            // Let `colored` look at the terminal and NO_COLOR / CLICOLOR
            ColorMode::Auto => colored::control::unset_override(),
        }
    }
}
