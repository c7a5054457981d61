//! Browser window built on `wry` + `tao`.
//!
//! One window, one WebView shared by all tabs: switching tabs loads the
//! selected tab's URI. The chrome (tab strip, toolbar, status line, downloads)
//! is injected into every page by `chrome.js` and talks back over IPC.
//!
//! Engine callbacks become [`UserEvent`]s sent through the event-loop proxy,
//! so the core is only touched from the loop. Navigation and download-start
//! callbacks need an answer immediately and lock the shared state instead.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::WindowBuilder;
use wry::{PageLoadEvent, WebViewBuilder};

use crate::app::{App, AppPaths};
use crate::managers::download_manager::DownloadManagerTrait;
use crate::managers::tab_manager::TabManagerTrait;
use crate::platform;
use crate::types::event::{
    DownloadEvent, Effect, EngineEvent, NavigationRequest, PolicyDecision, TlsChoice,
};
use crate::types::keys::{Action, FocusScope, Key, KeyChord, Modifiers, PointerButton};

const CHROME_JS: &str = include_str!("../../resources/ui/chrome.js");

/// Messages posted by `chrome.js`.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum ChromeMessage {
    Ready { can_go_back: bool, can_go_forward: bool },
    Key {
        key: String,
        ctrl: bool,
        alt: bool,
        shift: bool,
        meta: bool,
        scope: FocusScope,
        text_entry: bool,
    },
    Navigate {
        uri: String,
        ctrl: bool,
        alt: bool,
        shift: bool,
        meta: bool,
        button: Option<u32>,
    },
    Hover { uri: Option<String> },
    Audio { playing: bool },
    Wheel { delta_y: f64 },
    Location { text: String },
    Search { text: String },
    Action { name: String },
    SwitchTab { id: String },
    TabPointer { id: String, button: u32 },
    DismissDownload { id: String },
    Tls { uri: String, trust: bool },
    CloseWindow,
}

#[derive(Debug)]
enum UserEvent {
    Chrome(ChromeMessage),
    Engine { tab_id: String, event: EngineEvent },
    Download { id: String, event: DownloadEvent },
    Rerender,
}

/// What the loop does to the window after the state lock is released.
enum WebCommand {
    Load(String),
    Eval(String),
    Zoom(f64),
    Print,
    Title(String),
    Exit,
}

struct ShellState {
    app: App,
    /// Source URI -> download id, for the completion callback.
    downloads_by_uri: HashMap<String, String>,
    last_search: Option<String>,
}

fn lock(state: &Mutex<ShellState>) -> MutexGuard<'_, ShellState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn current_tab_id(state: &ShellState) -> Option<String> {
    state.app.tab_manager.get_current_tab().map(|t| t.id.clone())
}

fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// Everything `chrome.js` draws, as one JSON object.
fn chrome_state(app: &App) -> serde_json::Value {
    let tabs = &app.tab_manager;
    let current = tabs.get_current_tab();
    let current_id = current.map(|t| t.id.as_str());

    let tab_list: Vec<serde_json::Value> = tabs
        .get_all_tabs()
        .into_iter()
        .map(|t| {
            serde_json::json!({
                "id": t.id,
                "label": t.label,
                "tag": crate::managers::context_allocator::format_context_tag(t.context_id),
                "current": Some(t.id.as_str()) == current_id,
                "playing_audio": t.playing_audio,
            })
        })
        .collect();

    let downloads: Vec<serde_json::Value> = app
        .download_manager
        .list()
        .into_iter()
        .map(|d| {
            let name = d
                .destination
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .or_else(|| d.suggested_filename.clone())
                .unwrap_or_else(|| d.source_uri.clone());
            serde_json::json!({ "id": d.id, "name": name, "status": d.status_text() })
        })
        .collect();

    let bindings: Vec<serde_json::Value> = app
        .keybinding_manager
        .list_bindings()
        .into_iter()
        .map(|(action, chord)| {
            serde_json::json!({
                "chord": chord.to_string(),
                "intercepts_text_entry": action.intercepts_text_entry(),
            })
        })
        .chain(["F5", "Escape"].iter().map(|chord| {
            serde_json::json!({ "chord": chord, "intercepts_text_entry": false })
        }))
        .collect();

    serde_json::json!({
        "tabs": tab_list,
        "location": current.map(|t| t.location.as_str()).unwrap_or(""),
        "progress": current.map(|t| t.load_progress).unwrap_or(0.0),
        "status": current.and_then(|t| t.status_text.as_deref()),
        "can_go_back": current.map(|t| t.can_go_back).unwrap_or(false),
        "can_go_forward": current.map(|t| t.can_go_forward).unwrap_or(false),
        "javascript": current.map(|t| t.javascript_enabled).unwrap_or(true),
        "images": current.map(|t| t.auto_load_images).unwrap_or(true),
        "label_charwidth": app.settings().window.tab_label_charwidth,
        "downloads": downloads,
        "bindings": bindings,
    })
}

/// Applies one chrome message to the core.
fn handle_chrome(state: &mut ShellState, msg: ChromeMessage) -> Vec<Effect> {
    let current = current_tab_id(state);
    if let ChromeMessage::Search { text } = &msg {
        state.last_search = Some(text.clone()).filter(|t| !t.is_empty());
    }
    let app = &mut state.app;
    match msg {
        ChromeMessage::Ready { can_go_back, can_go_forward } => match current {
            Some(id) => {
                app.handle_engine_event(&id, EngineEvent::LoadChanged { can_go_back, can_go_forward })
            }
            None => Vec::new(),
        },
        ChromeMessage::Key { key, ctrl, alt, shift, meta, scope, text_entry } => {
            let Some(key) = Key::from_dom_key(&key) else {
                return Vec::new();
            };
            let chord = KeyChord::new(key, Modifiers { ctrl, alt, shift, logo: meta });
            app.handle_key(&chord, scope, text_entry).unwrap_or_default()
        }
        ChromeMessage::Navigate { uri, ctrl, alt, shift, meta, button } => match current {
            Some(id) => {
                let request = NavigationRequest {
                    uri: uri.clone(),
                    modifiers: Modifiers { ctrl, alt, shift, logo: meta },
                    mouse_button: button.map(PointerButton::from_number),
                };
                let mut effects = app.handle_engine_event(&id, EngineEvent::NavigationDecision(request));
                // The page's default was suppressed; carry it out here.
                if effects.contains(&Effect::Decide(PolicyDecision::Default)) {
                    effects.push(Effect::LoadUri { tab_id: id, uri });
                }
                effects
            }
            None => Vec::new(),
        },
        ChromeMessage::Hover { uri } => match current {
            Some(id) => app.handle_engine_event(&id, EngineEvent::MouseTargetChanged(uri)),
            None => Vec::new(),
        },
        ChromeMessage::Audio { playing } => match current {
            Some(id) => app.handle_engine_event(&id, EngineEvent::AudioStateChanged(playing)),
            None => Vec::new(),
        },
        ChromeMessage::Wheel { delta_y } => match current {
            Some(id) => app.scroll_zoom(&id, delta_y),
            None => Vec::new(),
        },
        ChromeMessage::Location { text } => match current {
            Some(id) => app.submit_location(&id, &text),
            None => Vec::new(),
        },
        ChromeMessage::Search { text } => match current {
            Some(id) => app.search(&id, &text),
            None => Vec::new(),
        },
        ChromeMessage::Action { name } => match Action::from_name(&name) {
            Some(action) => app.handle_action(action),
            None => {
                log::warn!("unknown chrome action {}", name);
                Vec::new()
            }
        },
        ChromeMessage::SwitchTab { id } => app.switch_tab(&id),
        ChromeMessage::TabPointer { id, button } => {
            app.handle_pointer(&id, FocusScope::TabBox, PointerButton::from_number(button))
        }
        ChromeMessage::DismissDownload { id } => app.dismiss_download(&id),
        ChromeMessage::Tls { uri, trust } => match current {
            Some(id) => {
                let choice = if trust { TlsChoice::TrustHost } else { TlsChoice::Cancel };
                app.resolve_tls(&id, &uri, choice)
            }
            None => Vec::new(),
        },
        ChromeMessage::CloseWindow => match current {
            Some(id) => app.handle_engine_event(&id, EngineEvent::CloseRequested),
            None => Vec::new(),
        },
    }
}

/// Turns effects into window commands. Effects for background tabs are
/// already reflected in their state and show up when they are selected.
fn plan(state: &ShellState, effects: Vec<Effect>) -> Vec<WebCommand> {
    let current = current_tab_id(state);
    let is_current = |tab_id: &str| current.as_deref() == Some(tab_id);
    let mut commands = Vec::new();

    for effect in effects {
        match effect {
            Effect::LoadUri { tab_id, uri } if is_current(&tab_id) => {
                commands.push(WebCommand::Load(uri))
            }
            Effect::GoBack { tab_id } if is_current(&tab_id) => {
                commands.push(WebCommand::Eval("history.back()".into()))
            }
            Effect::GoForward { tab_id } if is_current(&tab_id) => {
                commands.push(WebCommand::Eval("history.forward()".into()))
            }
            Effect::Reload { tab_id, .. } if is_current(&tab_id) => {
                commands.push(WebCommand::Eval("location.reload()".into()))
            }
            Effect::StopLoading { tab_id } if is_current(&tab_id) => {
                commands.push(WebCommand::Eval("window.stop()".into()))
            }
            Effect::Print { tab_id } if is_current(&tab_id) => commands.push(WebCommand::Print),
            Effect::SetZoom { tab_id, level } if is_current(&tab_id) => {
                commands.push(WebCommand::Zoom(level))
            }
            Effect::Find { tab_id, text } if is_current(&tab_id) => {
                commands.push(WebCommand::Eval(format!("window.find({})", js_string(&text))))
            }
            Effect::FindNext { tab_id } if is_current(&tab_id) => {
                if let Some(text) = &state.last_search {
                    commands.push(WebCommand::Eval(format!("window.find({}, false, false)", js_string(text))));
                }
            }
            Effect::FindPrevious { tab_id } if is_current(&tab_id) => {
                if let Some(text) = &state.last_search {
                    commands.push(WebCommand::Eval(format!("window.find({}, false, true)", js_string(text))));
                }
            }
            Effect::FindFinish { tab_id } if is_current(&tab_id) => {
                commands.push(WebCommand::Eval("window.getSelection().removeAllRanges()".into()))
            }
            Effect::SetWindowTitle(title) => commands.push(WebCommand::Title(title)),
            Effect::SwitchTo { tab_id } => {
                if let Some(tab) = state.app.tab_manager.get_tab(&tab_id) {
                    let target = tab.uri.clone().unwrap_or_else(|| tab.location.clone());
                    commands.push(WebCommand::Load(target));
                    commands.push(WebCommand::Zoom(tab.zoom_level));
                }
            }
            Effect::FocusLocation { .. } => {
                commands.push(WebCommand::Eval("window.__lupine && window.__lupine.focusLocation()".into()))
            }
            Effect::FocusSearch { .. } => {
                commands.push(WebCommand::Eval("window.__lupine && window.__lupine.focusSearch()".into()))
            }
            Effect::PromptTlsException { failing_uri, host, details, .. } => {
                commands.push(WebCommand::Eval(format!(
                    "window.__lupine && window.__lupine.promptTls({}, {}, {})",
                    js_string(&failing_uri),
                    host.as_deref().map(js_string).unwrap_or_else(|| "null".into()),
                    js_string(&details)
                )))
            }
            Effect::SetJavascript { .. } | Effect::SetAutoLoadImages { .. } => {
                log::debug!("{:?} is not supported by this engine backend", effect);
            }
            Effect::AllowCertificateForHost { host, .. } => {
                log::warn!("certificate exceptions are not supported by this engine backend ({})", host);
            }
            Effect::Quit => commands.push(WebCommand::Exit),
            _ => {}
        }
    }

    commands.push(WebCommand::Eval(format!(
        "window.__lupine && window.__lupine.render({})",
        chrome_state(&state.app)
    )));
    commands
}

/// Opens the browser window on `args` and runs until it is closed.
pub fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(AppPaths::platform());
    let startup_effects = app.startup(&args);
    let window_settings = app.settings().window.clone();
    let devtools = app.settings().web.enable_developer_extras;
    let first_uri = app
        .tab_manager
        .get_current_tab()
        .map(|t| t.location.clone())
        .unwrap_or_else(|| crate::services::uri::BLANK_URI.to_string());
    let scripts: Vec<String> = app.userscripts.iter().map(|s| s.source.clone()).collect();

    let state = Arc::new(Mutex::new(ShellState {
        app,
        downloads_by_uri: HashMap::new(),
        last_search: None,
    }));

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = WindowBuilder::new()
        .with_title("Lupine")
        .with_inner_size(tao::dpi::LogicalSize::new(
            window_settings.default_width as f64,
            window_settings.default_height as f64,
        ))
        .build(&event_loop)?;

    let mut builder = WebViewBuilder::new()
        .with_url(&first_uri)
        .with_initialization_script(CHROME_JS)
        .with_devtools(devtools);

    let interface_css = fs::read_to_string(platform::get_interface_css_path())
        .map(|css| {
            format!(
                "document.addEventListener('DOMContentLoaded',function(){{var s=document.createElement('style');\
                 s.textContent={};document.documentElement.appendChild(s);}});",
                js_string(&css)
            )
        })
        .ok();
    if let Some(css_script) = &interface_css {
        builder = builder.with_initialization_script(css_script);
    }
    for script in &scripts {
        builder = builder.with_initialization_script(script.as_str());
    }

    let builder = builder
        .with_ipc_handler({
            let proxy = proxy.clone();
            move |req: wry::http::Request<String>| match serde_json::from_str::<ChromeMessage>(req.body()) {
                Ok(msg) => {
                    let _ = proxy.send_event(UserEvent::Chrome(msg));
                }
                Err(e) => log::debug!("bad chrome message {}: {}", req.body(), e),
            }
        })
        .with_navigation_handler({
            let state = state.clone();
            move |uri: String| {
                let mut s = lock(&state);
                let Some(id) = current_tab_id(&s) else {
                    return true;
                };
                let effects = s
                    .app
                    .handle_engine_event(&id, EngineEvent::NavigationDecision(NavigationRequest::plain(&uri)));
                !effects.contains(&Effect::Decide(PolicyDecision::Ignore))
            }
        })
        .with_document_title_changed_handler(engine_forwarder(&state, &proxy, |title| {
            EngineEvent::TitleChanged(Some(title))
        }))
        .with_on_page_load_handler({
            let state = state.clone();
            let proxy = proxy.clone();
            move |event, uri| {
                let Some(tab_id) = current_tab_id(&lock(&state)) else {
                    return;
                };
                let events = match event {
                    PageLoadEvent::Started => {
                        vec![EngineEvent::UriChanged(Some(uri)), EngineEvent::LoadProgress(0.1)]
                    }
                    PageLoadEvent::Finished => {
                        vec![EngineEvent::UriChanged(Some(uri)), EngineEvent::LoadProgress(1.0)]
                    }
                };
                for event in events {
                    let _ = proxy.send_event(UserEvent::Engine { tab_id: tab_id.clone(), event });
                }
            }
        })
        .with_new_window_req_handler(popup_forwarder(&state, &proxy))
        .with_download_started_handler({
            let state = state.clone();
            let proxy = proxy.clone();
            move |uri: String, path: &mut PathBuf| {
                let mut s = lock(&state);
                let tab_id = current_tab_id(&s);
                let suggested = path.file_name().map(|n| n.to_string_lossy().to_string());
                let (id, destination) = s.app.begin_download(tab_id.as_deref(), &uri, suggested.as_deref());
                s.downloads_by_uri.insert(uri, id);
                *path = destination;
                let _ = proxy.send_event(UserEvent::Rerender);
                true
            }
        })
        .with_download_completed_handler({
            let state = state.clone();
            let proxy = proxy.clone();
            move |uri: String, _path: Option<PathBuf>, success: bool| {
                let Some(id) = lock(&state).downloads_by_uri.remove(&uri) else {
                    return;
                };
                let event = if success {
                    DownloadEvent::Finished
                } else {
                    DownloadEvent::Failed("transfer failed".to_string())
                };
                let _ = proxy.send_event(UserEvent::Download { id, event });
            }
        });

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window.default_vbox().ok_or("no GTK container in window")?;
        builder.build_gtk(vbox)?
    };

    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window)?;

    // The first page is already loading through `with_url`; only the title applies.
    for command in plan(&lock(&state), startup_effects) {
        if let WebCommand::Title(title) = command {
            window.set_title(&title);
        }
    }

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        let commands = match event {
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                log::info!("window closed");
                *control_flow = ControlFlow::Exit;
                return;
            }
            Event::UserEvent(user_event) => {
                let mut s = lock(&state);
                let effects = match user_event {
                    UserEvent::Chrome(msg) => handle_chrome(&mut s, msg),
                    UserEvent::Engine { tab_id, event } => s.app.handle_engine_event(&tab_id, event),
                    UserEvent::Download { id, event } => s.app.handle_download_event(&id, event),
                    UserEvent::Rerender => Vec::new(),
                };
                plan(&s, effects)
            }
            _ => return,
        };

        // The lock is released here; webview calls may re-enter the handlers.
        for command in commands {
            let result = match command {
                WebCommand::Load(uri) => webview.load_url(&uri),
                WebCommand::Eval(js) => webview.evaluate_script(&js),
                WebCommand::Zoom(level) => webview.zoom(level),
                WebCommand::Print => webview.print(),
                WebCommand::Title(title) => {
                    window.set_title(&title);
                    Ok(())
                }
                WebCommand::Exit => {
                    *control_flow = ControlFlow::Exit;
                    Ok(())
                }
            };
            if let Err(e) = result {
                log::warn!("webview command failed: {}", e);
            }
        }
    });
}

/// Forwards a single-argument engine callback for the current tab.
fn engine_forwarder<F>(
    state: &Arc<Mutex<ShellState>>,
    proxy: &EventLoopProxy<UserEvent>,
    make: F,
) -> impl Fn(String) + 'static
where
    F: Fn(String) -> EngineEvent + 'static,
{
    let state = state.clone();
    let proxy = proxy.clone();
    move |value| {
        if let Some(tab_id) = current_tab_id(&lock(&state)) {
            let _ = proxy.send_event(UserEvent::Engine { tab_id, event: make(value) });
        }
    }
}

/// New-window requests become related tabs; the engine never opens a window itself.
fn popup_forwarder(
    state: &Arc<Mutex<ShellState>>,
    proxy: &EventLoopProxy<UserEvent>,
) -> impl Fn(String, wry::NewWindowFeatures) -> wry::NewWindowResponse + 'static {
    let state = state.clone();
    let proxy = proxy.clone();
    move |uri, _features| {
        if let Some(tab_id) = current_tab_id(&lock(&state)) {
            let _ = proxy.send_event(UserEvent::Engine {
                tab_id,
                event: EngineEvent::PopupRequested { uri: Some(uri) },
            });
        }
        wry::NewWindowResponse::Deny
    }
}
