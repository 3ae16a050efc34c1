pub mod session;
pub mod side_channel;
pub mod token_store;

pub use session::{NoticeKind, Notifier, SettingsSession, TokenService};
pub use side_channel::{derive_side_channel_url, NoopSideChannel, SideChannel, WebSocketSideChannel};
pub use token_store::{build_endpoint_url, HttpTokenStore, SaveResponse, TokenStore};
