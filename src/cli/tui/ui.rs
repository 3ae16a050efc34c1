use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::cli::i18n::{texts, Localize};
use crate::controller::{FormAction, Phase};

use super::{
    app::{App, Focus, ToastKind},
    form::FieldInput,
    theme::{theme, Theme},
    SETTINGS_TAB,
};

fn pane_border_style(app: &App, pane: Focus, theme: &Theme) -> Style {
    if app.focus == pane {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim)
    }
}

fn inactive_chip_style(theme: &Theme) -> Style {
    if theme.no_color {
        Style::default()
    } else {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }
}

fn active_chip_style(theme: &Theme) -> Style {
    if theme.no_color {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
            .fg(Color::Black)
            .bg(theme.accent)
            .add_modifier(Modifier::BOLD)
    }
}

fn disabled_style(theme: &Theme) -> Style {
    if theme.no_color {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(theme.dim)
    }
}

fn pad_to_display_width(label: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(label);
    if w >= width {
        label.to_string()
    } else {
        format!("{label}{}", " ".repeat(width - w))
    }
}

/// Slice of `text` that fits `width` columns and keeps the char at `cursor`
/// visible. Returns the slice and the cursor's column within it.
fn visible_text_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());

    let mut start = 0usize;
    let mut used: usize = chars[..cursor]
        .iter()
        .map(|c| UnicodeWidthChar::width(*c).unwrap_or(0))
        .sum();
    while used >= width && start < cursor {
        used -= UnicodeWidthChar::width(chars[start]).unwrap_or(0);
        start += 1;
    }

    let mut out = String::new();
    let mut taken = 0usize;
    for c in &chars[start..] {
        let w = UnicodeWidthChar::width(*c).unwrap_or(0);
        if taken + w > width {
            break;
        }
        out.push(*c);
        taken += w;
    }
    (out, used)
}

fn key_bar_line(theme: &Theme, items: &[(&str, &str)]) -> Line<'static> {
    if theme.no_color {
        let mut parts = Vec::new();
        for (k, v) in items {
            parts.push(format!("{k}={v}"));
        }
        return Line::raw(parts.join("  "));
    }

    let base = inactive_chip_style(theme);
    let key = base.add_modifier(Modifier::BOLD);

    let mut spans: Vec<Span<'static>> = vec![Span::styled(" ", base)];
    for (idx, (k, v)) in items.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", base));
        }
        spans.push(Span::styled((*k).to_string(), key));
        spans.push(Span::styled(" ", base));
        spans.push(Span::styled((*v).to_string(), base));
    }
    spans.push(Span::styled(" ", base));
    Line::from(spans)
}

pub fn render(frame: &mut Frame<'_>, app: &App) {
    render_with_theme(frame, app, &theme());
}

pub fn render_with_theme(frame: &mut Frame<'_>, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0], theme);
    render_providers(frame, app, chunks[1], theme);
    render_fields(frame, app, chunks[2], theme);
    render_buttons(frame, app, chunks[3], theme);
    render_help_link(frame, app, chunks[4], theme);
    render_footer(frame, app, chunks[5], theme);
}

fn render_header(frame: &mut Frame<'_>, app: &App, area: Rect, theme: &Theme) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", texts::app_title()),
            active_chip_style(theme),
        ),
        Span::raw(" "),
        Span::styled(
            SETTINGS_TAB.title,
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(SETTINGS_TAB.path, Style::default().fg(theme.dim)),
    ];

    let status = match app.controller.phase() {
        Phase::Idle => None,
        Phase::Loading => Some(app.texts.lookup("loading")),
        Phase::Submitting => Some(app.texts.lookup("submitting")),
    };
    if let Some(status) = status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status, Style::default().fg(theme.warn)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_providers(frame: &mut Frame<'_>, app: &App, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(pane_border_style(app, Focus::Providers, theme))
        .title(format!(
            " {} · {} ",
            app.texts.lookup("ai"),
            texts::tui_providers_title()
        ));

    let busy = app.controller.is_busy();
    let active = app.controller.active_provider();
    let mut spans = Vec::new();
    for (idx, name) in app.controller.catalog().names().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        let selected = name == active;
        let mark = if selected { "(•)" } else { "( )" };
        let style = if busy {
            disabled_style(theme)
        } else if selected {
            active_chip_style(theme)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("{mark} {name}"), style));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn field_label(field: &FieldInput) -> String {
    if field.required {
        format!("{} {}", texts::tui_required_marker(), field.name)
    } else {
        format!("  {}", field.name)
    }
}

fn render_fields(frame: &mut Frame<'_>, app: &App, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(pane_border_style(app, Focus::Fields, theme))
        .title(format!(" {} · {} ", texts::tui_fields_title(), app.form.provider));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.form.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                texts::tui_no_fields(),
                Style::default().fg(theme.dim),
            )),
            inner,
        );
        return;
    }

    let label_width = app
        .form
        .fields
        .iter()
        .map(|f| UnicodeWidthStr::width(field_label(f).as_str()))
        .max()
        .unwrap_or(0)
        + 2;
    let value_width = (inner.width as usize).saturating_sub(label_width + 1);
    let busy = app.controller.is_busy();

    let mut lines = Vec::new();
    let mut cursor: Option<Position> = None;
    for (idx, field) in app.form.fields.iter().enumerate() {
        let focused = app.focus == Focus::Fields && app.field_idx == idx;
        let (shown, cursor_col) = visible_text_window(&field.input.value, field.input.cursor, value_width);

        let label_style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let value_style = if busy {
            disabled_style(theme)
        } else if focused {
            Style::default().add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default()
        };

        if focused && !busy {
            let row = inner.y + lines.len() as u16;
            let col = inner.x + (label_width + 1 + cursor_col) as u16;
            if row < inner.y + inner.height {
                cursor = Some(Position::new(col.min(inner.x + inner.width.saturating_sub(1)), row));
            }
        }

        lines.push(Line::from(vec![
            Span::styled(pad_to_display_width(&field_label(field), label_width), label_style),
            Span::raw(" "),
            Span::styled(shown, value_style),
        ]));
        if let Some(error) = &field.error {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(label_width + 1)),
                Span::styled(error.clone(), Style::default().fg(theme.err)),
            ]));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

fn render_buttons(frame: &mut Frame<'_>, app: &App, area: Rect, theme: &Theme) {
    let busy = app.controller.is_busy();
    let button = |action: FormAction, key: &str| {
        let label = format!("[ {} ]", app.texts.lookup(key));
        let style = if busy {
            disabled_style(theme)
        } else if app.focus == Focus::Buttons && app.button == action {
            active_chip_style(theme)
        } else {
            inactive_chip_style(theme)
        };
        Span::styled(label, style)
    };

    let line = Line::from(vec![
        button(FormAction::TestConnection, "connect_test"),
        Span::raw("  "),
        button(FormAction::Apply, "apply"),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

fn render_help_link(frame: &mut Frame<'_>, app: &App, area: Rect, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {}: ", texts::tui_help_link_label()),
            Style::default().fg(theme.dim),
        ),
        Span::raw(app.texts.lookup("click_here_to_get_apikey")),
        Span::raw(" → "),
        Span::styled(
            app.help_url.clone(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::UNDERLINED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame<'_>, app: &App, area: Rect, theme: &Theme) {
    let items = [
        ("←→", texts::tui_key_switch_provider()),
        ("Tab", texts::tui_key_move()),
        ("^R", texts::tui_key_reload()),
        ("^T", texts::tui_key_test()),
        ("^S", texts::tui_key_apply()),
        ("q", texts::tui_key_quit()),
    ];
    let mut spans = key_bar_line(theme, &items).spans;

    if let Some(toast) = &app.toast {
        let (prefix, color) = match toast.kind {
            ToastKind::Info => (texts::tui_toast_prefix_info(), theme.accent),
            ToastKind::Success => (texts::tui_toast_prefix_success(), theme.ok),
            ToastKind::Error => (texts::tui_toast_prefix_error(), theme.err),
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(prefix, Style::default().fg(color)));
        spans.push(Span::raw(toast.message.clone()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
