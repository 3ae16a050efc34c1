use std::path::Path;

use thiserror::Error;

use crate::localize::is_chinese;

/// A single client-side validation failure on a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("fetching AI token settings failed: {0}")]
    FetchFailed(String),
    #[error("saving AI token settings failed: {0}")]
    SubmitFailed(String),
    #[error("{}", join_field_errors(.0))]
    Validation(Vec<FieldError>),
    #[error("another request is still in progress")]
    Busy,
    #[error("no session key configured; run `openkey config set-session-key <KEY>` first")]
    Unauthenticated,
    #[error("side channel error: {0}")]
    SideChannel(String),
    #[error("{label}: {0}", label = localized_text("Configuration error", "配置错误"))]
    Config(String),
    #[error("{label}: {0}", label = localized_text("Invalid input", "无效输入"))]
    InvalidInput(String),
    #[error("{label}: {path}: {source}", label = localized_text("IO error", "IO 错误"))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    IoContext {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{label}: {source}", label = localized_text("Failed to serialize JSON", "序列化 JSON 失败"))]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("{}", localized_text(.en, .zh))]
    Localized {
        key: &'static str,
        zh: String,
        en: String,
    },
    #[error("{0}")]
    Message(String),
}

impl AppError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn localized(key: &'static str, zh: impl Into<String>, en: impl Into<String>) -> Self {
        Self::Localized {
            key,
            zh: zh.into(),
            en: en.into(),
        }
    }

    /// Field errors carried by a rejected submit, empty for every other kind.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn localized_text<'a>(en: &'a str, zh: &'a str) -> &'a str {
    if is_chinese() {
        zh
    } else {
        en
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_field_message() {
        let err = AppError::Validation(vec![
            FieldError {
                field: "ApiKey".to_string(),
                message: "Please enter ApiKey".to_string(),
            },
            FieldError {
                field: "ApiSecret".to_string(),
                message: "Please enter ApiSecret".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "Please enter ApiKey; Please enter ApiSecret");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn wrapped_messages_follow_the_english_default() {
        assert_eq!(
            AppError::InvalidInput("Provider not found: Nope".to_string()).to_string(),
            "Invalid input: Provider not found: Nope"
        );
        assert_eq!(
            AppError::Config("provider catalog is empty".to_string()).to_string(),
            "Configuration error: provider catalog is empty"
        );
        assert_eq!(
            AppError::localized("tui_terminal_error", "终端错误", "terminal error").to_string(),
            "terminal error"
        );
    }

    #[test]
    fn field_errors_is_empty_for_other_kinds() {
        assert!(AppError::Busy.field_errors().is_empty());
    }
}
