pub use crate::localize::{
    current_language, is_chinese, set_language, Language, Localize, Texts,
};

/// Get localized text based on current language
#[macro_export]
macro_rules! t {
    ($en:expr, $zh:expr) => {
        if $crate::cli::i18n::is_chinese() {
            $zh
        } else {
            $en
        }
    };
}

pub use t;

// ============================================================================
// Common UI Texts
// ============================================================================

pub mod texts {
    use super::is_chinese;

    pub fn app_title() -> &'static str {
        "openkey"
    }

    pub fn provider_not_found(name: &str) -> String {
        if is_chinese() {
            format!("供应商不存在: {name}")
        } else {
            format!("Provider not found: {name}")
        }
    }

    pub fn field_not_found(provider: &str, field: &str) -> String {
        if is_chinese() {
            format!("供应商 '{provider}' 没有字段 '{field}'")
        } else {
            format!("Provider '{provider}' has no field '{field}'")
        }
    }

    pub fn invalid_pair(raw: &str) -> String {
        if is_chinese() {
            format!("参数格式应为 KEY=VALUE: {raw}")
        } else {
            format!("Expected KEY=VALUE, got: {raw}")
        }
    }

    pub fn header_provider() -> &'static str {
        if is_chinese() {
            "供应商"
        } else {
            "Provider"
        }
    }

    pub fn header_field() -> &'static str {
        if is_chinese() {
            "字段"
        } else {
            "Field"
        }
    }

    pub fn header_value() -> &'static str {
        if is_chinese() {
            "值"
        } else {
            "Value"
        }
    }

    pub fn header_required() -> &'static str {
        if is_chinese() {
            "必填"
        } else {
            "Required"
        }
    }

    pub fn active_provider(name: &str) -> String {
        if is_chinese() {
            format!("当前使用: {name}")
        } else {
            format!("In use: {name}")
        }
    }

    pub fn switched_provider(name: &str) -> String {
        if is_chinese() {
            format!("✓ 已切换到 '{name}'")
        } else {
            format!("✓ Now using '{name}'")
        }
    }

    pub fn updated_provider(name: &str) -> String {
        if is_chinese() {
            format!("✓ 已更新 '{name}'")
        } else {
            format!("✓ Updated '{name}'")
        }
    }

    pub fn select_provider_prompt() -> &'static str {
        if is_chinese() {
            "选择 AI 供应商："
        } else {
            "Select AI provider:"
        }
    }

    pub fn confirm_apply(name: &str) -> String {
        if is_chinese() {
            format!("\n确认保存 '{name}' 的配置？")
        } else {
            format!("\nSave settings for '{name}'?")
        }
    }

    pub fn cancelled() -> &'static str {
        if is_chinese() {
            "已取消"
        } else {
            "Cancelled."
        }
    }

    pub fn interactive_requires_tty() -> &'static str {
        if is_chinese() {
            "交互模式需要在终端中运行"
        } else {
            "Interactive mode requires a TTY"
        }
    }

    pub fn settings_saved() -> &'static str {
        if is_chinese() {
            "✓ 设置已保存"
        } else {
            "✓ Settings saved"
        }
    }

    pub fn settings_path(path: &str) -> String {
        if is_chinese() {
            format!("设置文件: {path}")
        } else {
            format!("Settings file: {path}")
        }
    }

    pub fn not_set() -> &'static str {
        if is_chinese() {
            "未设置"
        } else {
            "not set"
        }
    }

    // ============================================
    // TUI
    // ============================================

    pub fn tui_providers_title() -> &'static str {
        if is_chinese() {
            "AI 供应商"
        } else {
            "AI provider"
        }
    }

    pub fn tui_fields_title() -> &'static str {
        if is_chinese() {
            "凭据"
        } else {
            "Credentials"
        }
    }

    pub fn tui_no_fields() -> &'static str {
        if is_chinese() {
            "该供应商没有可配置字段"
        } else {
            "This provider has no fields"
        }
    }

    pub fn tui_help_link_label() -> &'static str {
        if is_chinese() {
            "帮助"
        } else {
            "Help"
        }
    }

    pub fn tui_key_switch_provider() -> &'static str {
        if is_chinese() {
            "切换供应商"
        } else {
            "provider"
        }
    }

    pub fn tui_key_move() -> &'static str {
        if is_chinese() {
            "移动"
        } else {
            "move"
        }
    }

    pub fn tui_key_reload() -> &'static str {
        if is_chinese() {
            "刷新"
        } else {
            "reload"
        }
    }

    pub fn tui_key_apply() -> &'static str {
        if is_chinese() {
            "应用"
        } else {
            "apply"
        }
    }

    pub fn tui_key_test() -> &'static str {
        if is_chinese() {
            "测试"
        } else {
            "test"
        }
    }

    pub fn tui_key_quit() -> &'static str {
        if is_chinese() {
            "退出"
        } else {
            "quit"
        }
    }

    pub fn tui_required_marker() -> &'static str {
        "*"
    }

    pub fn tui_toast_prefix_info() -> &'static str {
        " i "
    }

    pub fn tui_toast_prefix_success() -> &'static str {
        " ✓ "
    }

    pub fn tui_toast_prefix_error() -> &'static str {
        " ✗ "
    }

    pub fn tui_worker_unavailable(err: &str) -> String {
        if is_chinese() {
            format!("网络线程启动失败: {err}")
        } else {
            format!("Network worker unavailable: {err}")
        }
    }
}
