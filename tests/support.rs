#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use openkey_lib::{
    AppError, NoticeKind, Notifier, RemoteConfig, SaveResponse, SideChannel, TokenStore,
};

/// Shared, ordered record of everything the fakes saw.
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Store that answers fetches from a script and records each call.
pub struct FakeStore {
    pub log: EventLog,
    pub remote: Value,
    pub save_code: Option<i64>,
    pub fail_fetch: bool,
    pub posted: RefCell<Vec<Value>>,
}

impl FakeStore {
    pub fn new(log: &EventLog, remote: Value) -> Self {
        Self {
            log: log.clone(),
            remote,
            save_code: Some(200),
            fail_fetch: false,
            posted: RefCell::new(Vec::new()),
        }
    }
}

impl TokenStore for FakeStore {
    fn fetch(&self) -> Result<RemoteConfig, AppError> {
        self.log.borrow_mut().push("GET".to_string());
        if self.fail_fetch {
            return Err(AppError::FetchFailed("connection refused".to_string()));
        }
        RemoteConfig::from_value(self.remote.clone())
    }

    fn save(&self, body: &RemoteConfig) -> Result<SaveResponse, AppError> {
        self.log.borrow_mut().push("POST".to_string());
        self.posted.borrow_mut().push(body.to_value());
        Ok(SaveResponse {
            code: self.save_code,
            message: None,
        })
    }
}

pub struct FakeChannel {
    pub log: EventLog,
    open: bool,
}

impl FakeChannel {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            open: false,
        }
    }
}

impl SideChannel for FakeChannel {
    fn open(&mut self) -> Result<(), AppError> {
        self.log.borrow_mut().push("open".to_string());
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.log.borrow_mut().push("close".to_string());
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

pub struct FakeNotifier {
    pub log: EventLog,
}

impl FakeNotifier {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl Notifier for FakeNotifier {
    fn notify(&mut self, kind: NoticeKind, message: &str) {
        let tag = match kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        self.log.borrow_mut().push(format!("{tag}: {message}"));
    }
}
