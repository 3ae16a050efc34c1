// Core modules
mod catalog;
mod controller;
mod error;
mod localize;
mod services;
mod settings;

// CLI module
pub mod cli;

// Public exports
pub use catalog::{
    merge_catalog, ProviderCatalog, ProviderSchema, RemoteConfig, DEFAULT_PROVIDER, IN_USE_KEY,
    REQUIRED_KEY,
};
pub use localize::{Language, Localize, Texts};
pub use controller::{FormAction, FormController, Phase};
pub use error::{AppError, FieldError};
pub use services::{
    build_endpoint_url, derive_side_channel_url, HttpTokenStore, NoopSideChannel, NoticeKind,
    Notifier, SaveResponse, SettingsSession, SideChannel, TokenService, TokenStore,
    WebSocketSideChannel,
};
pub use settings::{get_settings, update_settings, AppSettings};
