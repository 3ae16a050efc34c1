use std::io::{self, Stdout};

use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use crate::error::AppError;

fn terminal_error(err: impl std::fmt::Display) -> AppError {
    let msg = err.to_string();
    AppError::localized(
        "tui_terminal_error",
        format!("终端错误: {msg}"),
        format!("Terminal error: {msg}"),
    )
}

fn restore() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
}

/// Raw-mode alternate screen, restored on drop.
pub struct TuiTerminal {
    inner: Terminal<CrosstermBackend<Stdout>>,
}

impl TuiTerminal {
    pub fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(terminal_error)?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            restore();
            return Err(terminal_error(err));
        }
        let inner = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(t) => t,
            Err(err) => {
                restore();
                return Err(terminal_error(err));
            }
        };
        Ok(Self { inner })
    }

    pub fn draw(&mut self, f: impl FnOnce(&mut Frame<'_>)) -> Result<(), AppError> {
        self.inner.draw(f).map(|_| ()).map_err(terminal_error)
    }
}

impl Drop for TuiTerminal {
    fn drop(&mut self) {
        restore();
        let _ = self.inner.show_cursor();
    }
}

/// Puts the terminal back before the panic message prints. Dropping the
/// guard goes back to the default hook.
pub struct PanicRestoreHookGuard;

impl PanicRestoreHookGuard {
    pub fn install() -> Self {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore();
            previous(info);
        }));
        Self
    }
}

impl Drop for PanicRestoreHookGuard {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            let _ = std::panic::take_hook();
        }
    }
}
