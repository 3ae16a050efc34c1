use colored::Colorize;

use inquire::set_global_render_config;
use inquire::ui::{Color as InquireColor, RenderConfig, StyleSheet, Styled};

fn no_color() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}

fn prompt_render_config() -> RenderConfig<'static> {
    if no_color() {
        return RenderConfig::empty();
    }

    let accent = InquireColor::LightCyan;
    RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(accent))
        .with_answered_prompt_prefix(Styled::new(">").with_fg(accent))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(accent))
        .with_selected_option(Some(StyleSheet::new().with_fg(accent)))
        .with_help_message(StyleSheet::new().with_fg(accent))
        .with_answer(StyleSheet::new().with_fg(accent))
}

/// Install the prompt theme used by the interactive editor.
pub fn apply_inquire_theme() {
    set_global_render_config(prompt_render_config());
}

pub fn success(text: &str) -> String {
    text.green().to_string()
}

pub fn error(text: &str) -> String {
    text.red().to_string()
}

pub fn info(text: &str) -> String {
    text.cyan().to_string()
}

pub fn highlight(text: &str) -> String {
    text.bright_cyan().bold().to_string()
}
