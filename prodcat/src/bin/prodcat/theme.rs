use colored::Color;

/// Colors used across prodcat's terminal output
pub struct ColorTheme {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    /// Section headings in help text and command output
    pub heading: Color,
    /// Usage line and example group titles
    pub title: Color,
    /// Example commands and flag literals in help text
    pub command: Color,
    pub muted: Color,
    /// `config show` style listings
    pub key: Color,
    pub value: Color,
    /// Permission matrix cells
    pub allowed: Color,
    pub denied: Color,
}

pub const THEME: ColorTheme = ColorTheme {
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    info: Color::Blue,
    heading: Color::Cyan,
    title: Color::BrightBlue,
    command: Color::Magenta,
    muted: Color::BrightBlack,
    key: Color::BrightCyan,
    value: Color::White,
    allowed: Color::Green,
    denied: Color::BrightBlack,
};

pub struct Icons {
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub arrow: &'static str,
    pub bullet: &'static str,
    pub allowed: &'static str,
    pub denied: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    error: "✗",
    warning: "⚠",
    info: "ℹ",
    arrow: "→",
    bullet: "•",
    allowed: "✓",
    denied: "·",
};
