use serial_test::serial;

use openkey_lib::cli::i18n::{current_language, set_language};
use openkey_lib::{AppError, AppSettings, Language};

struct ConfigDirGuard {
    prev: Option<std::ffi::OsString>,
    _dir: tempfile::TempDir,
}

impl ConfigDirGuard {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let prev = std::env::var_os("OPENKEY_CONFIG_DIR");
        std::env::set_var("OPENKEY_CONFIG_DIR", dir.path());
        Self { prev, _dir: dir }
    }
}

impl Drop for ConfigDirGuard {
    fn drop(&mut self) {
        let _ = set_language(Language::English);
        match &self.prev {
            None => std::env::remove_var("OPENKEY_CONFIG_DIR"),
            Some(v) => std::env::set_var("OPENKEY_CONFIG_DIR", v),
        }
    }
}

#[test]
#[serial]
fn error_labels_follow_selected_language() {
    let _guard = ConfigDirGuard::new();

    set_language(Language::English).expect("set english");
    let err = AppError::InvalidInput("Provider not found: Nope".to_string());
    assert_eq!(err.to_string(), "Invalid input: Provider not found: Nope");

    set_language(Language::Chinese).expect("set chinese");
    assert_eq!(current_language(), Language::Chinese);
    assert_eq!(err.to_string(), "无效输入: Provider not found: Nope");
    assert_eq!(AppError::Config("x".to_string()).to_string(), "配置错误: x");
}

#[test]
#[serial]
fn localized_error_shows_the_selected_language() {
    let _guard = ConfigDirGuard::new();
    let err = AppError::localized("tui_terminal_error", "终端初始化失败", "terminal setup failed");

    set_language(Language::English).expect("set english");
    assert_eq!(err.to_string(), "terminal setup failed");

    set_language(Language::Chinese).expect("set chinese");
    assert_eq!(err.to_string(), "终端初始化失败");
}

#[test]
#[serial]
fn language_choice_is_persisted_to_settings_file() {
    let _guard = ConfigDirGuard::new();

    set_language(Language::Chinese).expect("set chinese");
    let saved = AppSettings::load();
    assert_eq!(saved.language.as_deref(), Some("zh"));
}
