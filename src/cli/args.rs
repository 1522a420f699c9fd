use clap::Parser;
use console_menu::MenuConfig;
use std::env;
use std::path::PathBuf;

/// Environment variable holding the menu title.
pub const TITLE_VAR: &str = "MENU_TITLE";
/// Environment variable holding the main menu subtitle.
pub const SUBTITLE_VAR: &str = "MENU_SUBTITLE";
/// Environment variable naming a log file.
pub const LOG_FILE_VAR: &str = "MENU_LOG_FILE";
/// Any non-empty value disables colour (https://no-color.org).
pub const NO_COLOR_VAR: &str = "NO_COLOR";

/// Interactive console menu demo
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Title shown in the menu header [env: MENU_TITLE]
    #[arg(short, long)]
    pub title: Option<String>,

    /// Subtitle of the main menu screen [env: MENU_SUBTITLE]
    #[arg(short, long)]
    pub subtitle: Option<String>,

    /// Disable coloured notices [env: NO_COLOR]
    #[arg(long)]
    pub no_color: bool,

    /// Write logs to this file instead of stderr [env: MENU_LOG_FILE]
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Builds the menu configuration from flags, falling back to the process environment.
    pub fn menu_config(&self) -> MenuConfig {
        self.menu_config_with(|key| env::var(key).ok())
    }

    /// Builds the menu configuration, resolving unset flags through `lookup`.
    pub fn menu_config_with<F>(&self, lookup: F) -> MenuConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = MenuConfig::default();
        if let Some(title) = self.title.clone().or_else(|| lookup(TITLE_VAR)) {
            config.title = title;
        }
        if let Some(subtitle) = self.subtitle.clone().or_else(|| lookup(SUBTITLE_VAR)) {
            config.subtitle = subtitle;
        }
        let no_color_env = lookup(NO_COLOR_VAR).is_some_and(|v| !v.is_empty());
        config.color = !(self.no_color || no_color_env);
        config
    }

    /// The log file from `--log-file` or the environment, if any.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file_with(|key| env::var(key).ok())
    }

    pub fn log_file_with<F>(&self, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.log_file
            .clone()
            .or_else(|| lookup(LOG_FILE_VAR).filter(|v| !v.is_empty()).map(PathBuf::from))
    }
}
