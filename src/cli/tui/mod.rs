mod app;
mod form;
mod terminal;
mod theme;
mod ui;

use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyEventKind};

use crate::catalog::RemoteConfig;
use crate::cli::i18n::{texts, Texts};
use crate::cli::Connection;
use crate::controller::{FormAction, FormController};
use crate::error::AppError;
use crate::services::{SaveResponse, SideChannel, TokenService, TokenStore};

use app::{Action, App, ToastKind};
use terminal::{PanicRestoreHookGuard, TuiTerminal};

/// Where the page sits in the host application's settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsTab {
    pub id: &'static str,
    pub title: &'static str,
    pub path: &'static str,
    pub order: u32,
}

pub const SETTINGS_TAB: SettingsTab = SettingsTab {
    id: "Settings.OpenKey",
    title: "API Key",
    path: "/settings/OpenKey",
    order: 9,
};

enum NetReq {
    Load,
    Save(RemoteConfig),
}

enum NetMsg {
    Loaded(Result<RemoteConfig, AppError>),
    Saved(Result<SaveResponse, AppError>),
}

struct NetSystem {
    req_tx: mpsc::Sender<NetReq>,
    result_rx: mpsc::Receiver<NetMsg>,
    _handle: std::thread::JoinHandle<()>,
}

pub fn run(conn: &Connection) -> Result<(), AppError> {
    conn.require_session()?;
    let service = TokenService::new(conn.token_store()?, conn.side_channel());

    let _panic_hook = PanicRestoreHookGuard::install();
    let mut terminal = TuiTerminal::new()?;
    let mut app = App::new(
        FormController::with_builtin_catalog(),
        Texts::current(),
        conn.help_url.clone(),
    );

    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    let net = match start_net_system(service) {
        Ok(system) => Some(system),
        Err(err) => {
            app.push_toast(texts::tui_worker_unavailable(&err.to_string()), ToastKind::Error);
            None
        }
    };
    request_load(&mut app, net.as_ref());

    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(net) = net.as_ref() {
            while let Ok(msg) = net.result_rx.try_recv() {
                handle_net_msg(&mut app, Some(net), msg);
            }
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).map_err(|e| AppError::Message(e.to_string()))? {
            match event::read().map_err(|e| AppError::Message(e.to_string()))? {
                event::Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let action = app.on_key(key);
                    handle_action(&mut app, net.as_ref(), action);
                }
                event::Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_action(app: &mut App, net: Option<&NetSystem>, action: Action) {
    match action {
        Action::None | Action::Quit => {}
        Action::Reload => request_load(app, net),
        Action::Submit(kind) => request_save(app, net, kind),
    }
}

fn handle_net_msg(app: &mut App, net: Option<&NetSystem>, msg: NetMsg) {
    match msg {
        NetMsg::Loaded(result) => app.finish_load(result),
        NetMsg::Saved(result) => {
            if app.finish_submit(result) {
                request_load(app, net);
            }
        }
    }
}

fn worker_gone(err: impl std::fmt::Display) -> AppError {
    AppError::Message(texts::tui_worker_unavailable(&err.to_string()))
}

fn request_load(app: &mut App, net: Option<&NetSystem>) {
    let Some(net) = net else {
        app.push_toast(texts::tui_worker_unavailable("not running"), ToastKind::Error);
        return;
    };
    if !app.begin_load() {
        return;
    }
    if let Err(err) = net.req_tx.send(NetReq::Load) {
        app.finish_load(Err(worker_gone(err)));
    }
}

fn request_save(app: &mut App, net: Option<&NetSystem>, action: FormAction) {
    let Some(net) = net else {
        app.push_toast(texts::tui_worker_unavailable("not running"), ToastKind::Error);
        return;
    };
    let Some(body) = app.begin_submit(action) else {
        return;
    };
    log::debug!("submitting AI token settings ({action:?})");
    if let Err(err) = net.req_tx.send(NetReq::Save(body)) {
        app.finish_submit(Err(worker_gone(err)));
    }
}

fn start_net_system<S, C>(service: TokenService<S, C>) -> Result<NetSystem, AppError>
where
    S: TokenStore + Send + 'static,
    C: SideChannel + Send + 'static,
{
    let (result_tx, result_rx) = mpsc::channel::<NetMsg>();
    let (req_tx, req_rx) = mpsc::channel::<NetReq>();

    let handle = std::thread::Builder::new()
        .name("openkey-net".to_string())
        .spawn(move || net_worker_loop(service, req_rx, result_tx))
        .map_err(|e| AppError::IoContext {
            context: "failed to spawn network worker thread".to_string(),
            source: e,
        })?;

    Ok(NetSystem {
        req_tx,
        result_rx,
        _handle: handle,
    })
}

/// Requests run one at a time in arrival order, so the side channel opens
/// after a fetch and closes after a save before anything queued behind it.
fn net_worker_loop<S, C>(
    mut service: TokenService<S, C>,
    rx: mpsc::Receiver<NetReq>,
    tx: mpsc::Sender<NetMsg>,
) where
    S: TokenStore,
    C: SideChannel,
{
    while let Ok(req) = rx.recv() {
        let msg = match req {
            NetReq::Load => NetMsg::Loaded(service.fetch()),
            NetReq::Save(body) => NetMsg::Saved(service.save(&body)),
        };
        if tx.send(msg).is_err() {
            break;
        }
    }
    service.shutdown();
}
