use crate::render::DEFAULT_COLUMN_WIDTH;

/// Default application title shown in the menu header.
pub const DEFAULT_TITLE: &str = "My TUI App";

/// Default subtitle of the main menu screen.
pub const DEFAULT_SUBTITLE: &str = "Main Menu";

/// Width of the `=` and `-` rules framing each screen.
pub const DEFAULT_RULE_WIDTH: usize = 50;

/// Presentation settings for a `MenuEngine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    pub title: String,
    /// Shown under the title on the main menu; empty to omit.
    pub subtitle: String,
    pub rule_width: usize,
    pub column_width: usize,
    /// Colour notices with ANSI escapes.
    pub color: bool,
}

impl MenuConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            rule_width: DEFAULT_RULE_WIDTH,
            column_width: DEFAULT_COLUMN_WIDTH,
            color: true,
        }
    }
}
