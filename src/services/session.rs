use indexmap::IndexMap;

use crate::catalog::{ProviderCatalog, RemoteConfig};
use crate::localize::Localize;
use crate::controller::FormController;
use crate::error::AppError;

use super::side_channel::SideChannel;
use super::token_store::{SaveResponse, TokenStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient user-facing notification sink.
pub trait Notifier {
    fn notify(&mut self, kind: NoticeKind, message: &str);
}

/// Store requests with the side channel sequenced around them: opened once a
/// fetch completes, closed once a save completes, whatever the outcome.
pub struct TokenService<S, C> {
    store: S,
    channel: C,
}

impl<S: TokenStore, C: SideChannel> TokenService<S, C> {
    pub fn new(store: S, channel: C) -> Self {
        Self { store, channel }
    }

    pub fn fetch(&mut self) -> Result<RemoteConfig, AppError> {
        let result = self.store.fetch();
        if let Err(err) = self.channel.open() {
            log::warn!("{err}");
        }
        result
    }

    pub fn save(&mut self, body: &RemoteConfig) -> Result<SaveResponse, AppError> {
        let result = self.store.save(body);
        self.channel.close();
        result
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Close the side channel when the owner is done with the service.
    pub fn shutdown(&mut self) {
        self.channel.close();
    }
}

/// Blocking driver for the whole settings flow: controller, store, side
/// channel and notifications.
pub struct SettingsSession<S, C, N> {
    controller: FormController,
    service: TokenService<S, C>,
    notifier: N,
    texts: Box<dyn Localize>,
}

impl<S, C, N> SettingsSession<S, C, N>
where
    S: TokenStore,
    C: SideChannel,
    N: Notifier,
{
    pub fn new(store: S, channel: C, notifier: N, texts: Box<dyn Localize>) -> Self {
        Self {
            controller: FormController::with_builtin_catalog(),
            service: TokenService::new(store, channel),
            notifier,
            texts,
        }
    }

    pub fn with_catalog(
        catalog: ProviderCatalog,
        store: S,
        channel: C,
        notifier: N,
        texts: Box<dyn Localize>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            controller: FormController::new(catalog)?,
            service: TokenService::new(store, channel),
            notifier,
            texts,
        })
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn service(&self) -> &TokenService<S, C> {
        &self.service
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn texts(&self) -> &dyn Localize {
        self.texts.as_ref()
    }

    /// Fetch, merge and select the server's active provider. A failed fetch
    /// is reported through the notifier and returned.
    pub fn load(&mut self) -> Result<(), AppError> {
        self.controller.begin_load()?;
        let result = self.service.fetch();
        match self.controller.finish_load(result) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("loading AI token settings failed: {err}");
                let message = self.texts.lookup("fail");
                self.notifier.notify(NoticeKind::Error, &message);
                Err(err)
            }
        }
    }

    pub fn select_provider(&mut self, name: &str) -> Result<(), AppError> {
        self.controller.select_provider(name)
    }

    /// Validate and save `values` for the active provider, then reload on
    /// success. Validation failures never reach the store.
    pub fn submit(&mut self, values: IndexMap<String, String>) -> Result<(), AppError> {
        let body = self.controller.begin_submit(values, self.texts.as_ref())?;
        let result = self.service.save(&body);
        match self.controller.finish_submit(result) {
            Ok(()) => {
                let message = self.texts.lookup("save_success");
                self.notifier.notify(NoticeKind::Success, &message);
                if let Err(err) = self.load() {
                    log::debug!("reload after save failed: {err}");
                }
                Ok(())
            }
            Err(err) => {
                log::warn!("saving AI token settings failed: {err}");
                let message = self.texts.lookup("save_failed");
                self.notifier.notify(NoticeKind::Error, &message);
                Err(err)
            }
        }
    }

    /// Submit the values currently held by the form.
    pub fn submit_current(&mut self) -> Result<(), AppError> {
        let values = self.controller.values().clone();
        self.submit(values)
    }

    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> Result<(), AppError> {
        self.controller.set_value(field, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localize::Texts;
    use crate::services::side_channel::{NoopSideChannel, WebSocketSideChannel};
    use serde_json::json;
    use std::cell::RefCell;
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingStore {
        fetches: RefCell<usize>,
        saves: RefCell<Vec<RemoteConfig>>,
    }

    impl TokenStore for RecordingStore {
        fn fetch(&self) -> Result<RemoteConfig, AppError> {
            *self.fetches.borrow_mut() += 1;
            RemoteConfig::from_value(json!({ "in_use": "DeepSeek" }))
        }

        fn save(&self, body: &RemoteConfig) -> Result<SaveResponse, AppError> {
            self.saves.borrow_mut().push(body.clone());
            Ok(SaveResponse::ok())
        }
    }

    #[derive(Default)]
    struct Collected(Vec<(NoticeKind, String)>);

    impl Notifier for Collected {
        fn notify(&mut self, kind: NoticeKind, message: &str) {
            self.0.push((kind, message.to_string()));
        }
    }

    #[test]
    fn token_service_opens_after_fetch_and_closes_after_save() {
        let mut service = TokenService::new(RecordingStore::default(), NoopSideChannel::default());
        let remote = service.fetch().expect("fetch");
        assert!(service.channel().is_open());
        service.save(&remote).expect("save");
        assert!(!service.channel().is_open());
    }

    #[test]
    fn fetch_returns_when_side_channel_peer_never_answers() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("ws://{}/ws", listener.local_addr().expect("local addr"));
        let channel = WebSocketSideChannel::new(url).with_timeout(Duration::from_millis(300));
        let mut service = TokenService::new(RecordingStore::default(), channel);

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let in_use = service.fetch().map(|remote| remote.in_use);
            let _ = tx.send((in_use, service.channel().is_open()));
        });

        let (in_use, open) = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("fetch should not wait on the side channel handshake");
        assert_eq!(in_use.expect("fetch").as_deref(), Some("DeepSeek"));
        assert!(!open);
        drop(listener);
    }

    #[test]
    fn with_catalog_starts_on_first_provider_and_rejects_empty() {
        let mut catalog = ProviderCatalog::new();
        catalog.insert(
            "DeepSeek",
            crate::catalog::ProviderSchema::new([("ApiKey", "")], &["ApiKey"]),
        );
        let session = SettingsSession::with_catalog(
            catalog,
            RecordingStore::default(),
            NoopSideChannel::default(),
            Collected::default(),
            Box::new(Texts::default()),
        )
        .expect("session");
        assert_eq!(session.controller().active_provider(), "DeepSeek");
        assert_eq!(session.controller().catalog().len(), 1);

        let err = SettingsSession::with_catalog(
            ProviderCatalog::new(),
            RecordingStore::default(),
            NoopSideChannel::default(),
            Collected::default(),
            Box::new(Texts::default()),
        )
        .err()
        .expect("empty catalog");
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn submit_current_saves_then_reloads() {
        let mut session = SettingsSession::new(
            RecordingStore::default(),
            NoopSideChannel::default(),
            Collected::default(),
            Box::new(Texts::default()),
        );
        session.load().expect("load");
        assert_eq!(session.controller().active_provider(), "DeepSeek");

        session.set_value("ApiKey", "sk-test").expect("set");
        session.submit_current().expect("submit");

        let store = session.service().store();
        assert_eq!(*store.fetches.borrow(), 2);
        assert_eq!(store.saves.borrow().len(), 1);
        assert_eq!(
            session.notifier().0,
            vec![(NoticeKind::Success, "Saved successfully".to_string())]
        );
    }
}
