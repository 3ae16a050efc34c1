use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::catalog::RemoteConfig;
use crate::cli::i18n::{Localize, Texts};
use crate::controller::{FormAction, FormController};
use crate::error::AppError;
use crate::services::SaveResponse;

use super::form::CredentialsForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Providers,
    Fields,
    Buttons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub remaining_ticks: u16,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            remaining_ticks: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Reload,
    Submit(FormAction),
    Quit,
}

pub struct App {
    pub controller: FormController,
    pub form: CredentialsForm,
    pub texts: Texts,
    pub help_url: String,
    pub focus: Focus,
    pub field_idx: usize,
    pub button: FormAction,
    pub toast: Option<Toast>,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: FormController, texts: Texts, help_url: impl Into<String>) -> Self {
        let form = CredentialsForm::from_controller(&controller);
        Self {
            controller,
            form,
            texts,
            help_url: help_url.into(),
            focus: Focus::Providers,
            field_idx: 0,
            button: FormAction::Apply,
            toast: None,
            should_quit: false,
        }
    }

    pub fn on_tick(&mut self) {
        if let Some(toast) = &mut self.toast {
            if toast.remaining_ticks > 0 {
                toast.remaining_ticks -= 1;
            }
            if toast.remaining_ticks == 0 {
                self.toast = None;
            }
        }
    }

    pub fn push_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast::new(message, kind));
    }

    fn push_text_toast(&mut self, key: &str, kind: ToastKind) {
        let message = self.texts.lookup(key);
        self.push_toast(message, kind);
    }

    fn refresh_form(&mut self) {
        self.form = CredentialsForm::from_controller(&self.controller);
        if self.field_idx >= self.form.len() {
            self.field_idx = self.form.len().saturating_sub(1);
        }
        if self.focus == Focus::Fields && self.form.is_empty() {
            self.focus = Focus::Providers;
        }
    }

    pub fn provider_index(&self) -> usize {
        let active = self.controller.active_provider();
        self.controller
            .catalog()
            .names()
            .position(|name| name == active)
            .unwrap_or(0)
    }

    fn cycle_provider(&mut self, delta: isize) {
        if self.controller.is_busy() {
            self.push_text_toast("busy", ToastKind::Info);
            return;
        }
        let len = self.controller.catalog().len();
        if len == 0 {
            return;
        }
        let next = (self.provider_index() as isize + delta).rem_euclid(len as isize) as usize;
        let Some(name) = self.controller.catalog().names().nth(next).map(str::to_string) else {
            return;
        };
        match self.controller.select_provider(&name) {
            Ok(()) => {
                self.field_idx = 0;
                self.refresh_form();
            }
            Err(err) => self.push_toast(err.to_string(), ToastKind::Error),
        }
    }

    /// Enter the loading phase. False when another request is in flight.
    pub fn begin_load(&mut self) -> bool {
        match self.controller.begin_load() {
            Ok(()) => true,
            Err(AppError::Busy) => {
                self.push_text_toast("busy", ToastKind::Info);
                false
            }
            Err(err) => {
                self.push_toast(err.to_string(), ToastKind::Error);
                false
            }
        }
    }

    pub fn finish_load(&mut self, result: Result<RemoteConfig, AppError>) {
        match self.controller.finish_load(result) {
            Ok(()) => self.refresh_form(),
            Err(err) => {
                log::warn!("loading AI token settings failed: {err}");
                self.push_text_toast("fail", ToastKind::Error);
            }
        }
    }

    /// Validate the form and enter the submitting phase. Returns the body to
    /// post, or `None` after reporting why nothing is sent.
    pub fn begin_submit(&mut self, action: FormAction) -> Option<RemoteConfig> {
        self.button = action;
        let values = self.form.values();
        match self.controller.begin_submit(values, &self.texts) {
            Ok(body) => {
                self.form.apply_errors(&[]);
                Some(body)
            }
            Err(AppError::Validation(errors)) => {
                self.form.apply_errors(&errors);
                if let Some(idx) = self.form.first_error_index() {
                    self.focus = Focus::Fields;
                    self.field_idx = idx;
                }
                None
            }
            Err(AppError::Busy) => {
                self.push_text_toast("busy", ToastKind::Info);
                None
            }
            Err(err) => {
                self.push_toast(err.to_string(), ToastKind::Error);
                None
            }
        }
    }

    /// Report a save result. True when the settings should be reloaded.
    pub fn finish_submit(&mut self, result: Result<SaveResponse, AppError>) -> bool {
        match self.controller.finish_submit(result) {
            Ok(()) => {
                self.push_text_toast("save_success", ToastKind::Success);
                true
            }
            Err(err) => {
                log::warn!("saving AI token settings failed: {err}");
                self.push_text_toast("save_failed", ToastKind::Error);
                false
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                KeyCode::Char('r') => return Action::Reload,
                KeyCode::Char('s') => return Action::Submit(FormAction::Apply),
                KeyCode::Char('t') => return Action::Submit(FormAction::TestConnection),
                _ => return Action::None,
            }
        }

        match key.code {
            KeyCode::F(5) => return Action::Reload,
            KeyCode::Tab => {
                self.focus_next();
                return Action::None;
            }
            KeyCode::BackTab => {
                self.focus_prev();
                return Action::None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Providers => self.on_providers_key(key),
            Focus::Fields => self.on_fields_key(key),
            Focus::Buttons => self.on_buttons_key(key),
        }
    }

    fn quit(&mut self) -> Action {
        self.should_quit = true;
        Action::Quit
    }

    fn focus_next(&mut self) {
        match self.focus {
            Focus::Providers if !self.form.is_empty() => {
                self.focus = Focus::Fields;
                self.field_idx = 0;
            }
            Focus::Providers => self.focus = Focus::Buttons,
            Focus::Fields if self.field_idx + 1 < self.form.len() => self.field_idx += 1,
            Focus::Fields => self.focus = Focus::Buttons,
            Focus::Buttons => self.focus = Focus::Providers,
        }
    }

    fn focus_prev(&mut self) {
        match self.focus {
            Focus::Providers => self.focus = Focus::Buttons,
            Focus::Fields if self.field_idx > 0 => self.field_idx -= 1,
            Focus::Fields => self.focus = Focus::Providers,
            Focus::Buttons if !self.form.is_empty() => {
                self.focus = Focus::Fields;
                self.field_idx = self.form.len() - 1;
            }
            Focus::Buttons => self.focus = Focus::Providers,
        }
    }

    fn on_providers_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.cycle_provider(-1),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_provider(1),
            KeyCode::Down | KeyCode::Enter => self.focus_next(),
            KeyCode::Up => self.focus_prev(),
            KeyCode::Char('q') | KeyCode::Esc => return self.quit(),
            _ => {}
        }
        Action::None
    }

    fn on_buttons_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.button = match self.button {
                    FormAction::TestConnection => FormAction::Apply,
                    FormAction::Apply => FormAction::TestConnection,
                };
            }
            KeyCode::Enter => return Action::Submit(self.button),
            KeyCode::Up => self.focus_prev(),
            KeyCode::Down => self.focus_next(),
            KeyCode::Char('q') | KeyCode::Esc => return self.quit(),
            _ => {}
        }
        Action::None
    }

    fn on_fields_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up => {
                self.focus_prev();
                return Action::None;
            }
            KeyCode::Down | KeyCode::Enter => {
                self.focus_next();
                return Action::None;
            }
            KeyCode::Esc => {
                self.focus = Focus::Providers;
                return Action::None;
            }
            _ => {}
        }

        if self.controller.is_busy() {
            return Action::None;
        }
        let Some(field) = self.form.field_mut(self.field_idx) else {
            return Action::None;
        };
        let edited = match key.code {
            KeyCode::Left => {
                field.input.move_left();
                false
            }
            KeyCode::Right => {
                field.input.move_right();
                false
            }
            KeyCode::Home => {
                field.input.move_home();
                false
            }
            KeyCode::End => {
                field.input.move_end();
                false
            }
            KeyCode::Backspace => field.input.backspace(),
            KeyCode::Delete => field.input.delete(),
            KeyCode::Char(c) => {
                field.input.insert_char(c);
                true
            }
            _ => false,
        };
        if edited {
            field.error = None;
        }
        Action::None
    }
}
