use clap::Subcommand;

use crate::cli::i18n::{set_language, t, texts, Language};
use crate::cli::ui::{highlight, info, success};
use crate::cli::Connection;
use crate::error::AppError;
use crate::settings::{get_settings, set_server_url, set_session_key, AppSettings};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective client settings
    Show,
    /// Set the settings server base URL
    SetServer {
        /// Base URL, e.g. https://bi.example.com
        url: String,
    },
    /// Store the session key used to authenticate
    SetSessionKey {
        /// The key; omit with --clear to remove it
        key: Option<String>,
        /// Remove the stored key
        #[arg(long, conflicts_with = "key")]
        clear: bool,
    },
    /// Set the interface language (en or zh)
    SetLanguage {
        /// Language code
        code: String,
    },
}

pub fn execute(cmd: ConfigCommand, conn: &Connection) -> Result<(), AppError> {
    match cmd {
        ConfigCommand::Show => show_config(conn),
        ConfigCommand::SetServer { url } => {
            set_server_url(&url)?;
            println!("{}", success(texts::settings_saved()));
            Ok(())
        }
        ConfigCommand::SetSessionKey { key, clear } => {
            if !clear && key.is_none() {
                return Err(AppError::InvalidInput(
                    t!("provide a key or pass --clear", "请提供密钥或使用 --clear").to_string(),
                ));
            }
            set_session_key(key.as_deref().filter(|_| !clear))?;
            println!("{}", success(texts::settings_saved()));
            Ok(())
        }
        ConfigCommand::SetLanguage { code } => {
            let code = code.trim().to_lowercase();
            if !matches!(code.as_str(), "en" | "zh") {
                return Err(AppError::InvalidInput(t!(
                    format!("unsupported language '{code}', use en or zh"),
                    format!("不支持的语言 '{code}'，请使用 en 或 zh")
                )));
            }
            set_language(Language::from_code(&code))?;
            println!("{}", success(texts::settings_saved()));
            Ok(())
        }
    }
}

fn show_config(conn: &Connection) -> Result<(), AppError> {
    let settings = get_settings();
    let not_set = texts::not_set();

    println!("{}", highlight("openkey"));
    println!("{}", "═".repeat(50));
    println!("  Server:        {}", conn.server_url);
    println!(
        "  Session key:   {}",
        conn.session_key
            .as_deref()
            .map(crate::cli::ui::mask_secret)
            .unwrap_or_else(|| not_set.to_string())
    );
    println!(
        "  Side channel:  {}",
        conn.side_channel_url.as_deref().unwrap_or(not_set)
    );
    println!("  Timeout:       {}s", conn.timeout_secs);
    println!(
        "  Language:      {}",
        settings
            .language
            .as_deref()
            .map(Language::from_code)
            .unwrap_or(Language::English)
    );
    println!("  Help:          {}", conn.help_url);

    match AppSettings::settings_path() {
        Some(path) => println!("\n{}", info(&texts::settings_path(&path.display().to_string()))),
        None => println!("\n{}", info(&texts::settings_path(not_set))),
    }
    Ok(())
}
