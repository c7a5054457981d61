use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::managers::context_allocator::{format_context_tag, ContextAllocator};
use crate::services::uri;
use crate::types::context::ContextId;
use crate::types::errors::TabError;
use crate::types::event::{
    Effect, EngineEvent, NavigationRequest, PolicyDecision, ResponseInfo, TlsChoice,
};
use crate::types::keys::{Modifiers, PointerButton};
use crate::types::settings::WebSettings;
use crate::types::tab::{Tab, TabState, EMPTY_TITLE, NEW_TAB_TITLE};

const MIN_ZOOM: f64 = 0.1;

/// Trait defining the tab lifecycle interface.
pub trait TabManagerTrait {
    fn create_root_tab(
        &mut self,
        contexts: &mut ContextAllocator,
        target: Option<&str>,
        auto_switch: bool,
    ) -> (String, Vec<Effect>);
    fn create_related_tab(
        &mut self,
        opener_id: &str,
        target: Option<&str>,
        auto_switch: bool,
    ) -> Result<(String, Vec<Effect>), TabError>;
    fn open_startup_tabs(
        &mut self,
        contexts: &mut ContextAllocator,
        args: &[String],
        homepage: &str,
    ) -> Vec<Effect>;
    fn close_tab(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError>;
    fn switch_tab(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError>;
    fn select_relative(&mut self, offset: isize) -> Vec<Effect>;
    fn select_position(&mut self, position: usize) -> Result<Vec<Effect>, TabError>;
    fn relabel(&mut self, tab_id: &str, override_text: Option<&str>) -> Result<Vec<Effect>, TabError>;
    fn handle_event(&mut self, tab_id: &str, event: EngineEvent) -> Vec<Effect>;
    fn submit_location(&mut self, tab_id: &str, text: &str) -> Result<Vec<Effect>, TabError>;
    fn resolve_tls(&mut self, tab_id: &str, failing_uri: &str, choice: TlsChoice) -> Vec<Effect>;
    fn get_tab(&self, tab_id: &str) -> Option<&Tab>;
    fn get_all_tabs(&self) -> Vec<&Tab>;
    fn get_current_tab(&self) -> Option<&Tab>;
    fn tabs_in_context(&self, context_id: ContextId) -> Vec<&Tab>;
    fn tab_count(&self) -> usize;
    fn get_tab_order(&self) -> &[String];
    fn window_title(&self) -> &str;
}

/// Whether a navigation should open in a new tab of the same context:
/// Ctrl held alone, or the middle button used.
pub fn opens_in_new_tab(request: &NavigationRequest) -> bool {
    request.modifiers == Modifiers::CTRL || request.mouse_button == Some(PointerButton::Middle)
}

/// Response policy: display what the engine can render, download the rest.
pub fn decide_response(response: &ResponseInfo) -> PolicyDecision {
    if response.mime_type_supported {
        PolicyDecision::Use
    } else {
        PolicyDecision::Download
    }
}

/// Picks the label text: override, then title, then URI, then a placeholder.
pub fn choose_label(override_text: Option<&str>, title: Option<&str>, uri: Option<&str>) -> String {
    [override_text, title, uri]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or(EMPTY_TITLE)
        .to_string()
}

/// In-memory tab strip for one window.
pub struct TabManager {
    tabs: Vec<Tab>,
    tab_order: Vec<String>,
    current_tab_id: Option<String>,
    window_title: String,
    web_settings: WebSettings,
}

impl TabManager {
    pub fn new() -> Self {
        Self::with_web_settings(WebSettings::default())
    }

    pub fn with_web_settings(web_settings: WebSettings) -> Self {
        Self {
            tabs: Vec::new(),
            tab_order: Vec::new(),
            current_tab_id: None,
            window_title: String::new(),
            web_settings,
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn find_tab_index(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn find_order_index(&self, tab_id: &str) -> Option<usize> {
        self.tab_order.iter().position(|id| id == tab_id)
    }

    fn live_tab_mut(&mut self, tab_id: &str) -> Result<&mut Tab, TabError> {
        let tab = self
            .tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        if !tab.is_live() {
            return Err(TabError::Closing(tab_id.to_string()));
        }
        Ok(tab)
    }

    fn is_current(&self, tab_id: &str) -> bool {
        self.current_tab_id.as_deref() == Some(tab_id)
    }

    /// Builds, inserts and wires a tab. Navigation is left to the caller.
    fn insert_tab(
        &mut self,
        context_id: ContextId,
        opener: Option<String>,
        location: String,
        auto_switch: bool,
    ) -> (String, Vec<Effect>) {
        let id = Uuid::new_v4().to_string();
        let mut tab = Tab {
            id: id.clone(),
            context_id,
            opener,
            title: None,
            uri: None,
            location: location.clone(),
            label: NEW_TAB_TITLE.to_string(),
            playing_audio: false,
            load_progress: 0.0,
            can_go_back: false,
            can_go_forward: false,
            status_text: None,
            javascript_enabled: self.web_settings.enable_javascript,
            auto_load_images: self.web_settings.auto_load_images,
            zoom_level: self.web_settings.default_zoom,
            state: TabState::Created,
            termination: None,
            created_at: Self::now(),
        };

        let position = match self.current_tab_id.as_deref().and_then(|c| self.find_order_index(c)) {
            Some(current) => current + 1,
            None => self.tab_order.len(),
        };

        let mut effects = vec![
            Effect::InsertTab { tab_id: id.clone(), position },
            Effect::SetTabLabel {
                tab_id: id.clone(),
                label: tab.label.clone(),
                context_tag: format_context_tag(context_id),
            },
            Effect::SetLocation { tab_id: id.clone(), text: location },
            Effect::SetJavascript { tab_id: id.clone(), enabled: tab.javascript_enabled },
            Effect::SetAutoLoadImages { tab_id: id.clone(), enabled: tab.auto_load_images },
        ];

        tab.state = TabState::Active;
        self.tabs.push(tab);
        self.tab_order.insert(position, id.clone());

        if auto_switch || self.current_tab_id.is_none() {
            effects.extend(self.make_current(&id));
        }

        log::debug!("inserted tab {} (context {}) at {}", id, context_id, position);
        (id, effects)
    }

    fn make_current(&mut self, tab_id: &str) -> Vec<Effect> {
        self.current_tab_id = Some(tab_id.to_string());
        let label = self
            .get_tab(tab_id)
            .map(|t| t.label.clone())
            .unwrap_or_default();
        self.window_title = label.clone();
        vec![
            Effect::SwitchTo { tab_id: tab_id.to_string() },
            Effect::SetWindowTitle(label),
        ]
    }

    fn decide_navigation(&mut self, tab_id: &str, request: NavigationRequest) -> Vec<Effect> {
        if !opens_in_new_tab(&request) {
            return vec![Effect::Decide(PolicyDecision::Default)];
        }
        match self.create_related_tab(tab_id, Some(&request.uri), false) {
            Ok((new_id, mut effects)) => {
                let target = self
                    .get_tab(&new_id)
                    .map(|t| t.location.clone())
                    .unwrap_or_else(|| request.uri.clone());
                effects.push(Effect::LoadUri { tab_id: new_id, uri: target });
                effects.push(Effect::Decide(PolicyDecision::Ignore));
                effects
            }
            Err(e) => {
                log::warn!("could not open {} in a new tab: {}", request.uri, e);
                vec![Effect::Decide(PolicyDecision::Default)]
            }
        }
    }

    /// Runs a toolbar action on a live tab.
    fn with_live_tab<F>(&mut self, tab_id: &str, f: F) -> Result<Vec<Effect>, TabError>
    where
        F: FnOnce(&mut Tab, &WebSettings) -> Vec<Effect>,
    {
        let settings = self.web_settings.clone();
        let tab = self.live_tab_mut(tab_id)?;
        Ok(f(tab, &settings))
    }

    pub fn go_back(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| vec![Effect::GoBack { tab_id: t.id.clone() }])
    }

    pub fn go_forward(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| vec![Effect::GoForward { tab_id: t.id.clone() }])
    }

    pub fn reload(&mut self, tab_id: &str, bypass_cache: bool) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| {
            t.termination = None;
            vec![Effect::Reload { tab_id: t.id.clone(), bypass_cache }]
        })
    }

    pub fn stop_loading(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| vec![Effect::StopLoading { tab_id: t.id.clone() }])
    }

    pub fn print(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| vec![Effect::Print { tab_id: t.id.clone() }])
    }

    pub fn toggle_javascript(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| {
            t.javascript_enabled = !t.javascript_enabled;
            vec![Effect::SetJavascript { tab_id: t.id.clone(), enabled: t.javascript_enabled }]
        })
    }

    pub fn toggle_images(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| {
            t.auto_load_images = !t.auto_load_images;
            vec![Effect::SetAutoLoadImages { tab_id: t.id.clone(), enabled: t.auto_load_images }]
        })
    }

    /// Changes the zoom level by `delta`, clamped to a small positive minimum.
    pub fn adjust_zoom(&mut self, tab_id: &str, delta: f64) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| {
            t.zoom_level = (t.zoom_level + delta).max(MIN_ZOOM);
            vec![Effect::SetZoom { tab_id: t.id.clone(), level: t.zoom_level }]
        })
    }

    pub fn zoom_in(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        let step = self.web_settings.zoom_step;
        self.adjust_zoom(tab_id, step)
    }

    pub fn zoom_out(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        let step = self.web_settings.zoom_step;
        self.adjust_zoom(tab_id, -step)
    }

    /// Ctrl+scroll: scrolling down (positive delta) zooms out.
    pub fn scroll_zoom(&mut self, tab_id: &str, delta_y: f64) -> Result<Vec<Effect>, TabError> {
        let step = self.web_settings.zoom_step;
        self.adjust_zoom(tab_id, -delta_y * step)
    }

    pub fn reset_zoom(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, s| {
            t.zoom_level = s.default_zoom;
            vec![Effect::SetZoom { tab_id: t.id.clone(), level: t.zoom_level }]
        })
    }

    pub fn search(&mut self, tab_id: &str, text: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| {
            if text.is_empty() {
                vec![Effect::FindFinish { tab_id: t.id.clone() }]
            } else {
                vec![Effect::Find { tab_id: t.id.clone(), text: text.to_string() }]
            }
        })
    }

    pub fn search_next(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| vec![Effect::FindNext { tab_id: t.id.clone() }])
    }

    pub fn search_previous(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.with_live_tab(tab_id, |t, _| vec![Effect::FindPrevious { tab_id: t.id.clone() }])
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabManagerTrait for TabManager {
    /// Opens a tab in a brand new browsing context and starts loading `target`.
    /// Local paths are accepted here.
    fn create_root_tab(
        &mut self,
        contexts: &mut ContextAllocator,
        target: Option<&str>,
        auto_switch: bool,
    ) -> (String, Vec<Effect>) {
        let uri = uri::normalize(target, true);
        let context_id = contexts.allocate();
        let (id, mut effects) = self.insert_tab(context_id, None, uri.clone(), auto_switch);
        effects.push(Effect::LoadUri { tab_id: id.clone(), uri });
        (id, effects)
    }

    /// Opens a tab sharing the opener's context. The engine drives its navigation.
    fn create_related_tab(
        &mut self,
        opener_id: &str,
        target: Option<&str>,
        auto_switch: bool,
    ) -> Result<(String, Vec<Effect>), TabError> {
        let opener = self
            .get_tab(opener_id)
            .ok_or_else(|| TabError::NotFound(opener_id.to_string()))?;
        if !opener.is_live() {
            return Err(TabError::Closing(opener_id.to_string()));
        }
        let context_id = opener.context_id;
        let location = uri::normalize(target, false);
        Ok(self.insert_tab(context_id, Some(opener_id.to_string()), location, auto_switch))
    }

    /// One root tab per argument, or the homepage when there are none.
    /// The first tab opened becomes current.
    fn open_startup_tabs(
        &mut self,
        contexts: &mut ContextAllocator,
        args: &[String],
        homepage: &str,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let targets: Vec<&str> = if args.is_empty() {
            vec![homepage]
        } else {
            args.iter().map(|a| a.as_str()).collect()
        };

        let mut first = None;
        for target in targets {
            // Append in argument order.
            let saved_current = self.current_tab_id.take();
            self.current_tab_id = self.tab_order.last().cloned();
            let (id, tab_effects) = self.create_root_tab(contexts, Some(target), false);
            self.current_tab_id = saved_current;
            effects.extend(tab_effects.into_iter().filter(|e| {
                !matches!(e, Effect::SwitchTo { .. } | Effect::SetWindowTitle(_))
            }));
            first.get_or_insert(id);
        }

        if let Some(first) = first {
            effects.extend(self.make_current(&first));
        }
        effects
    }

    /// Tears a tab down. The tab goes through `Closing` and is then dropped;
    /// later callbacks carrying its id find nothing.
    fn close_tab(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        let tab_idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        if self.tabs[tab_idx].state == TabState::Closing {
            return Err(TabError::Closing(tab_id.to_string()));
        }
        self.tabs[tab_idx].state = TabState::Closing;

        let order_idx = self.find_order_index(tab_id);
        let was_current = self.is_current(tab_id);

        let mut removed = self.tabs.remove(tab_idx);
        if let Some(idx) = order_idx {
            self.tab_order.remove(idx);
        }
        removed.state = TabState::Destroyed;
        log::debug!("destroyed tab {} (context {})", removed.id, removed.context_id);

        let mut effects = vec![Effect::DestroyTab { tab_id: tab_id.to_string() }];

        if was_current {
            self.current_tab_id = None;
            if !self.tab_order.is_empty() {
                let idx = order_idx.unwrap_or(0).min(self.tab_order.len() - 1);
                let next = self.tab_order[idx].clone();
                effects.extend(self.make_current(&next));
            } else {
                self.window_title.clear();
            }
        }

        Ok(effects)
    }

    fn switch_tab(&mut self, tab_id: &str) -> Result<Vec<Effect>, TabError> {
        self.live_tab_mut(tab_id)?;
        Ok(self.make_current(tab_id))
    }

    /// Moves the selection left (negative) or right, wrapping around.
    fn select_relative(&mut self, offset: isize) -> Vec<Effect> {
        let len = self.tab_order.len() as isize;
        if len == 0 {
            return Vec::new();
        }
        let current = self
            .current_tab_id
            .as_deref()
            .and_then(|c| self.find_order_index(c))
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        let id = self.tab_order[next].clone();
        self.make_current(&id)
    }

    /// Selects the tab at a 1-based position.
    fn select_position(&mut self, position: usize) -> Result<Vec<Effect>, TabError> {
        let id = position
            .checked_sub(1)
            .and_then(|i| self.tab_order.get(i))
            .cloned()
            .ok_or(TabError::InvalidIndex(position))?;
        Ok(self.make_current(&id))
    }

    /// Recomputes a tab's label. The window title follows when the tab is current.
    fn relabel(&mut self, tab_id: &str, override_text: Option<&str>) -> Result<Vec<Effect>, TabError> {
        let tab = self.live_tab_mut(tab_id)?;
        let label = choose_label(override_text, tab.title.as_deref(), tab.uri.as_deref());
        tab.label = label.clone();
        let context_tag = format_context_tag(tab.context_id);

        let mut effects = vec![Effect::SetTabLabel {
            tab_id: tab_id.to_string(),
            label: label.clone(),
            context_tag,
        }];
        if self.is_current(tab_id) {
            self.window_title = label.clone();
            effects.push(Effect::SetWindowTitle(label));
        }
        Ok(effects)
    }

    /// Applies one engine event to the tab that owns the view.
    /// Events for unknown or closing tabs are dropped.
    fn handle_event(&mut self, tab_id: &str, event: EngineEvent) -> Vec<Effect> {
        let terminated = match self.get_tab(tab_id) {
            Some(tab) if tab.is_live() => tab.is_terminated(),
            _ => {
                log::debug!("dropping {:?} for gone tab {}", event, tab_id);
                return Vec::new();
            }
        };

        match event {
            EngineEvent::UriChanged(Some(uri)) if !uri.is_empty() => {
                let mut titled = false;
                if let Ok(tab) = self.live_tab_mut(tab_id) {
                    tab.uri = Some(uri.clone());
                    tab.location = uri.clone();
                    titled = tab.title.as_deref().is_some_and(|t| !t.is_empty());
                }
                let mut effects = vec![Effect::SetLocation { tab_id: tab_id.to_string(), text: uri }];
                if titled && !terminated {
                    effects.extend(self.relabel(tab_id, None).unwrap_or_default());
                }
                effects
            }
            EngineEvent::UriChanged(_) => Vec::new(),
            EngineEvent::TitleChanged(Some(title)) if !title.is_empty() && !terminated => {
                if let Ok(tab) = self.live_tab_mut(tab_id) {
                    tab.title = Some(title);
                }
                self.relabel(tab_id, None).unwrap_or_default()
            }
            EngineEvent::TitleChanged(_) => Vec::new(),
            EngineEvent::LoadProgress(progress) => {
                let fraction = if progress >= 1.0 { 0.0 } else { progress.max(0.0) };
                if let Ok(tab) = self.live_tab_mut(tab_id) {
                    tab.load_progress = fraction;
                }
                vec![Effect::SetProgress { tab_id: tab_id.to_string(), fraction }]
            }
            EngineEvent::LoadChanged { can_go_back, can_go_forward } => {
                if let Ok(tab) = self.live_tab_mut(tab_id) {
                    tab.can_go_back = can_go_back;
                    tab.can_go_forward = can_go_forward;
                }
                vec![Effect::SetNavigationSensitivity {
                    tab_id: tab_id.to_string(),
                    can_go_back,
                    can_go_forward,
                }]
            }
            EngineEvent::AudioStateChanged(playing) => {
                if let Ok(tab) = self.live_tab_mut(tab_id) {
                    tab.playing_audio = playing;
                }
                let mut effects =
                    vec![Effect::SetAudioIndicator { tab_id: tab_id.to_string(), playing }];
                if !terminated {
                    effects.extend(self.relabel(tab_id, None).unwrap_or_default());
                }
                effects
            }
            EngineEvent::MouseTargetChanged(link) => {
                if let Ok(tab) = self.live_tab_mut(tab_id) {
                    tab.status_text = link.clone();
                }
                vec![Effect::SetStatus { tab_id: tab_id.to_string(), text: link }]
            }
            EngineEvent::ProcessTerminated(reason) => {
                log::warn!("web process for tab {} terminated: {}", tab_id, reason.label());
                if let Ok(tab) = self.live_tab_mut(tab_id) {
                    tab.termination = Some(reason);
                }
                self.relabel(tab_id, Some(reason.label())).unwrap_or_default()
            }
            EngineEvent::PopupRequested { uri } => {
                match self.create_related_tab(tab_id, uri.as_deref(), false) {
                    Ok((_, effects)) => effects,
                    Err(e) => {
                        log::warn!("popup from tab {} refused: {}", tab_id, e);
                        Vec::new()
                    }
                }
            }
            EngineEvent::CloseRequested => self.close_tab(tab_id).unwrap_or_default(),
            EngineEvent::NavigationDecision(request) => self.decide_navigation(tab_id, request),
            EngineEvent::ResponseDecision(response) => {
                vec![Effect::Decide(decide_response(&response))]
            }
            EngineEvent::DownloadStarted { uri, .. } => {
                log::debug!("download of {} reported to tab {}, ignored here", uri, tab_id);
                Vec::new()
            }
            EngineEvent::TlsError { failing_uri, errors } => {
                log::warn!("TLS error for {}", failing_uri);
                vec![Effect::PromptTlsException {
                    tab_id: tab_id.to_string(),
                    host: uri::host_of(&failing_uri),
                    failing_uri,
                    details: errors.describe(),
                }]
            }
        }
    }

    /// Location entry activation. Local paths are accepted.
    fn submit_location(&mut self, tab_id: &str, text: &str) -> Result<Vec<Effect>, TabError> {
        let target = uri::normalize(Some(text), true);
        let tab = self.live_tab_mut(tab_id)?;
        tab.termination = None;
        tab.location = target.clone();
        Ok(vec![
            Effect::SetLocation { tab_id: tab_id.to_string(), text: target.clone() },
            Effect::LoadUri { tab_id: tab_id.to_string(), uri: target },
        ])
    }

    /// Outcome of the TLS dialog. Trusting needs a host; without one it is a cancel.
    fn resolve_tls(&mut self, tab_id: &str, failing_uri: &str, choice: TlsChoice) -> Vec<Effect> {
        if self.live_tab_mut(tab_id).is_err() {
            return Vec::new();
        }
        match (choice, uri::host_of(failing_uri)) {
            (TlsChoice::TrustHost, Some(host)) => {
                log::info!("temporarily trusting certificate for {}", host);
                vec![
                    Effect::AllowCertificateForHost { tab_id: tab_id.to_string(), host },
                    Effect::Reload { tab_id: tab_id.to_string(), bypass_cache: false },
                ]
            }
            _ => Vec::new(),
        }
    }

    fn get_tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn get_all_tabs(&self) -> Vec<&Tab> {
        self.tab_order
            .iter()
            .filter_map(|id| self.tabs.iter().find(|t| t.id == *id))
            .collect()
    }

    fn get_current_tab(&self) -> Option<&Tab> {
        self.current_tab_id
            .as_ref()
            .and_then(|id| self.tabs.iter().find(|t| t.id == *id))
    }

    fn tabs_in_context(&self, context_id: ContextId) -> Vec<&Tab> {
        self.get_all_tabs()
            .into_iter()
            .filter(|t| t.context_id == context_id)
            .collect()
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn get_tab_order(&self) -> &[String] {
        &self.tab_order
    }

    fn window_title(&self) -> &str {
        &self.window_title
    }
}
