use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod commands;
pub mod i18n;
pub mod interactive;
pub mod tui;
pub mod ui;

use crate::error::AppError;
use crate::services::{
    derive_side_channel_url, HttpTokenStore, NoopSideChannel, SideChannel, WebSocketSideChannel,
};
use crate::settings::{get_settings, AppSettings};

#[derive(Parser)]
#[command(
    name = "openkey",
    version,
    about = "Configure the AI provider and API keys of your BI server",
    long_about = "Pick the AI backend your server uses and fill in its credentials.\n\nRun without arguments to open the settings page."
)]
pub struct Cli {
    /// Settings server base URL
    #[arg(long, global = true, env = "OPENKEY_SERVER")]
    pub server: Option<String>,

    /// Session key of the signed-in user
    #[arg(long, global = true, env = "OPENKEY_SESSION_KEY", hide_env_values = true)]
    pub session_key: Option<String>,

    /// Do not open the side channel around test/apply
    #[arg(long, global = true)]
    pub no_side_channel: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the API key settings page
    #[command(alias = "interactive")]
    Ui,

    /// Show providers and their stored fields
    Show {
        /// Only show this provider
        #[arg(long, short)]
        provider: Option<String>,
    },

    /// Make a provider the one in use, keeping its stored fields
    Use {
        /// Provider name
        provider: String,
    },

    /// Update fields of a provider and make it the one in use
    Set {
        /// Provider name
        provider: String,
        /// Field assignments, KEY=VALUE
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Edit a provider's fields with prompts
    Edit {
        /// Provider name (asked for when omitted)
        provider: Option<String>,
    },

    /// Manage local client settings
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Where and how to reach the settings server for this invocation:
/// persisted settings overlaid with command line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub server_url: String,
    pub session_key: Option<String>,
    pub timeout_secs: u64,
    pub side_channel_url: Option<String>,
    pub help_url: String,
}

impl Connection {
    pub fn resolve(cli: &Cli) -> Self {
        Self::from_parts(
            &get_settings(),
            cli.server.as_deref(),
            cli.session_key.as_deref(),
            cli.no_side_channel,
        )
    }

    pub fn from_parts(
        settings: &AppSettings,
        server: Option<&str>,
        session_key: Option<&str>,
        no_side_channel: bool,
    ) -> Self {
        let server_url = server
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(settings.server_url())
            .to_string();
        let session_key = session_key
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| settings.session_key.clone());
        let side_channel_url = if no_side_channel {
            None
        } else {
            settings
                .side_channel_url
                .clone()
                .or_else(|| derive_side_channel_url(&server_url))
        };

        Self {
            server_url,
            session_key,
            timeout_secs: settings.timeout_secs(),
            side_channel_url,
            help_url: settings.help_url().to_string(),
        }
    }

    pub fn token_store(&self) -> Result<HttpTokenStore, AppError> {
        HttpTokenStore::new(&self.server_url, self.session_key.clone(), self.timeout_secs)
    }

    pub fn side_channel(&self) -> Box<dyn SideChannel + Send> {
        match &self.side_channel_url {
            Some(url) => Box::new(
                WebSocketSideChannel::new(url.clone())
                    .with_timeout(Duration::from_secs(self.timeout_secs)),
            ),
            None => Box::new(NoopSideChannel::default()),
        }
    }

    /// Authenticated surfaces refuse to start without a session key.
    pub fn require_session(&self) -> Result<(), AppError> {
        if self.session_key.is_some() {
            Ok(())
        } else {
            Err(AppError::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_persisted_settings() {
        let settings = AppSettings {
            server_url: Some("https://saved.example.com".to_string()),
            session_key: Some("saved".to_string()),
            ..AppSettings::default()
        };
        let conn = Connection::from_parts(&settings, Some("http://flag:8080"), Some("flag"), false);
        assert_eq!(conn.server_url, "http://flag:8080");
        assert_eq!(conn.session_key.as_deref(), Some("flag"));
        assert_eq!(conn.side_channel_url.as_deref(), Some("ws://flag:8080/ws"));
    }

    #[test]
    fn no_side_channel_flag_wins_over_configured_url() {
        let settings = AppSettings {
            side_channel_url: Some("ws://elsewhere/ws".to_string()),
            ..AppSettings::default()
        };
        let conn = Connection::from_parts(&settings, None, None, true);
        assert_eq!(conn.side_channel_url, None);
        assert!(matches!(conn.require_session(), Err(AppError::Unauthenticated)));
        assert!(!conn.side_channel().is_open());
    }

    #[test]
    fn cli_parses_set_pairs() {
        let cli = Cli::try_parse_from(["openkey", "set", "OpenAI", "OpenAIKey=sk", "OpenAIModel=gpt-4"])
            .expect("parse");
        match cli.command {
            Some(Commands::Set { provider, pairs }) => {
                assert_eq!(provider, "OpenAI");
                assert_eq!(pairs.len(), 2);
            }
            _ => panic!("expected set command"),
        }
    }
}
