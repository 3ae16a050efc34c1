use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub ok: Color,
    pub warn: Color,
    pub err: Color,
    pub dim: Color,
    pub no_color: bool,
}

pub fn theme() -> Theme {
    theme_with(std::env::var_os("NO_COLOR").is_some())
}

pub fn theme_with(no_color: bool) -> Theme {
    if no_color {
        Theme {
            accent: Color::Reset,
            ok: Color::Reset,
            warn: Color::Reset,
            err: Color::Reset,
            dim: Color::Reset,
            no_color: true,
        }
    } else {
        Theme {
            accent: Color::Cyan,
            ok: Color::Green,
            warn: Color::Yellow,
            err: Color::Red,
            dim: Color::DarkGray,
            no_color: false,
        }
    }
}
