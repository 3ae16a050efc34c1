//! Display language and the string table injected into the form controller.

use crate::settings::{get_settings, update_settings};
use std::sync::OnceLock;
use std::sync::RwLock;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "中文",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.to_lowercase().as_str() {
            "zh" | "zh-cn" | "zh-tw" | "chinese" => Language::Chinese,
            _ => Language::English,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Global language state
fn language_store() -> &'static RwLock<Language> {
    static STORE: OnceLock<RwLock<Language>> = OnceLock::new();
    STORE.get_or_init(|| {
        let lang = if cfg!(test) {
            // Keep unit tests deterministic and avoid reading real user settings.
            Language::English
        } else {
            let settings = get_settings();
            settings
                .language
                .as_deref()
                .map(Language::from_code)
                .unwrap_or(Language::English)
        };
        RwLock::new(lang)
    })
}

/// Get current language
pub fn current_language() -> Language {
    language_store()
        .read()
        .map(|guard| *guard)
        .unwrap_or(Language::English)
}

/// Switch the language for this process only.
pub(crate) fn set_current_language(lang: Language) {
    if let Ok(mut guard) = language_store().write() {
        *guard = lang;
    }
}

/// Set current language and persist
pub fn set_language(lang: Language) -> Result<(), crate::error::AppError> {
    set_current_language(lang);

    let mut settings = get_settings();
    settings.language = Some(lang.code().to_string());
    update_settings(settings)
}

/// Check if current language is Chinese
pub fn is_chinese() -> bool {
    current_language() == Language::Chinese
}

// ============================================================================
// Injected string lookup
// ============================================================================

/// String lookup handed to the form controller and its front ends.
pub trait Localize {
    /// Text for `key`; unknown keys come back unchanged.
    fn lookup(&self, key: &str) -> String;
}

/// Built-in table for the settings page, bound to one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texts {
    lang: Language,
}

impl Texts {
    pub fn new(lang: Language) -> Self {
        Self { lang }
    }

    /// Table for the language currently selected in settings.
    pub fn current() -> Self {
        Self::new(current_language())
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    fn entry(key: &str) -> Option<(&'static str, &'static str)> {
        let pair = match key {
            "fail" => ("Failed to load AI settings", "获取 AI 配置失败"),
            "save_success" => ("Saved successfully", "保存成功"),
            "save_failed" => ("Save failed", "保存失败"),
            "please_enter" => ("Please enter ", "请输入"),
            "click_here_to_get_apikey" => ("Click here to get an API key", "点击这里获取 API Key"),
            "connect_test" => ("Test connection", "连接测试"),
            "apply" => ("Apply", "应用"),
            "ai" => ("AI", "AI"),
            "loading" => ("Loading…", "加载中…"),
            "submitting" => ("Saving…", "保存中…"),
            "busy" => ("Please wait for the current request", "请等待当前请求完成"),
            _ => return None,
        };
        Some(pair)
    }
}

impl Default for Texts {
    fn default() -> Self {
        Self::new(Language::English)
    }
}

impl Localize for Texts {
    fn lookup(&self, key: &str) -> String {
        match Self::entry(key) {
            Some((en, zh)) => match self.lang {
                Language::English => en.to_string(),
                Language::Chinese => zh.to_string(),
            },
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texts_lookup_follows_bound_language() {
        assert_eq!(Texts::new(Language::English).lookup("save_success"), "Saved successfully");
        assert_eq!(Texts::new(Language::Chinese).lookup("save_failed"), "保存失败");
    }

    #[test]
    fn texts_lookup_returns_unknown_keys_verbatim() {
        assert_eq!(Texts::default().lookup("no_such_key"), "no_such_key");
    }

    #[test]
    fn language_from_code_accepts_regional_variants() {
        assert_eq!(Language::from_code("zh-CN"), Language::Chinese);
        assert_eq!(Language::from_code("fr"), Language::English);
    }
}
