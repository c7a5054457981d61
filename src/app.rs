//! App Core for Lupine.
//!
//! Owns every manager and service and is the single entry point the UI shell
//! talks to. All methods return [`Effect`]s for the shell to apply.

use std::env;
use std::path::PathBuf;

use crate::managers::context_allocator::ContextAllocator;
use crate::managers::download_manager::{DownloadManager, DownloadManagerTrait};
use crate::managers::keybinding_manager::{KeybindingManager, KeybindingManagerTrait};
use crate::managers::tab_manager::{TabManager, TabManagerTrait};
use crate::platform;
use crate::services::content_filter::{ContentFilter, FilterStore};
use crate::services::settings_engine::SettingsEngine;
use crate::services::uri;
use crate::services::userscripts::{self, UserScript};
use crate::types::errors::TabError;
use crate::types::event::{DownloadEvent, Effect, EngineEvent, PolicyDecision, TlsChoice};
use crate::types::keys::{Action, FocusScope, KeyChord, PointerButton};
use crate::types::settings::BrowserSettings;

/// Environment variable listing spellcheck languages, colon-separated.
pub const L10N_ENV: &str = "LUPINE_L10N";

/// Files and directories the app reads and writes.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub settings: PathBuf,
    pub filter_source: PathBuf,
    pub filter_store: PathBuf,
    pub scripts_dir: PathBuf,
    pub downloads_dir: PathBuf,
}

impl AppPaths {
    /// The platform layout.
    pub fn platform() -> Self {
        Self {
            settings: platform::get_settings_path(),
            filter_source: platform::get_filter_source_path(),
            filter_store: platform::get_filter_store_dir(),
            scripts_dir: platform::get_scripts_dir(),
            downloads_dir: platform::get_downloads_dir(),
        }
    }
}

/// Splits a colon-separated language list, dropping empty entries.
pub fn parse_language_list(list: &str) -> Vec<String> {
    list.split(':')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Central application struct holding all managers and services.
pub struct App {
    pub contexts: ContextAllocator,
    pub tab_manager: TabManager,
    pub download_manager: DownloadManager,
    pub keybinding_manager: KeybindingManager,
    pub settings_engine: SettingsEngine,
    pub filter_store: FilterStore,
    pub content_filter: Option<ContentFilter>,
    pub userscripts: Vec<UserScript>,
    settings: BrowserSettings,
    paths: AppPaths,
}

impl App {
    /// Loads settings and builds the managers. Nothing is opened yet.
    pub fn new(paths: AppPaths) -> Self {
        let mut settings_engine = SettingsEngine::new(Some(paths.settings.clone()));
        let settings = settings_engine.load_or_default();

        Self {
            contexts: ContextAllocator::new(),
            tab_manager: TabManager::with_web_settings(settings.web.clone()),
            download_manager: DownloadManager::new(),
            keybinding_manager: KeybindingManager::from_settings(&settings.keybindings),
            settings_engine,
            filter_store: FilterStore::new(paths.filter_store.clone()),
            content_filter: None,
            userscripts: Vec::new(),
            settings,
            paths,
        }
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Startup sequence: content filter, userscripts, then one tab per argument.
    pub fn startup(&mut self, args: &[String]) -> Vec<Effect> {
        if self.settings.content.content_filtering {
            if self.paths.filter_source.exists() {
                self.content_filter = self
                    .filter_store
                    .refresh(&self.settings.content.filter_identifier, &self.paths.filter_source);
            } else {
                log::info!(
                    "no content filter at {}, browsing unfiltered",
                    self.paths.filter_source.display()
                );
            }
        }

        if self.settings.content.load_userscripts {
            match userscripts::load_userscripts(&self.paths.scripts_dir) {
                Ok(report) => self.userscripts = report.scripts,
                Err(e) => log::warn!("failed to list userscripts: {}", e),
            }
        }

        let languages = self.spellcheck_languages();
        if !languages.is_empty() {
            log::info!("spellchecking enabled for {}", languages.join(", "));
        }

        let homepage = self.settings.general.homepage.clone();
        self.tab_manager.open_startup_tabs(&mut self.contexts, args, &homepage)
    }

    /// `LUPINE_L10N` when set, otherwise the configured list.
    pub fn spellcheck_languages(&self) -> Vec<String> {
        match env::var(L10N_ENV) {
            Ok(list) => parse_language_list(&list),
            Err(_) => self
                .settings
                .general
                .spellcheck_languages
                .as_deref()
                .map(parse_language_list)
                .unwrap_or_default(),
        }
    }

    fn log_tab_error(result: Result<Vec<Effect>, TabError>) -> Vec<Effect> {
        result.unwrap_or_else(|e| {
            log::warn!("{}", e);
            Vec::new()
        })
    }

    /// Closing the last tab quits.
    fn quit_if_empty(&self, mut effects: Vec<Effect>) -> Vec<Effect> {
        if self.tab_manager.tab_count() == 0 && effects.iter().any(|e| matches!(e, Effect::DestroyTab { .. })) {
            log::info!("last tab closed, quitting");
            effects.push(Effect::Quit);
        }
        effects
    }

    /// Routes an engine event for a tab. Downloads and content filtering are
    /// handled here; everything else goes to the tab manager.
    pub fn handle_engine_event(&mut self, tab_id: &str, event: EngineEvent) -> Vec<Effect> {
        match event {
            EngineEvent::DownloadStarted { uri, suggested_filename } => {
                let (download_id, _) =
                    self.begin_download(Some(tab_id), &uri, suggested_filename.as_deref());
                vec![Effect::UpdateDownloadRow { download_id }]
            }
            EngineEvent::NavigationDecision(request) if self.is_blocked(&request.uri) => {
                log::debug!("content filter blocked {}", request.uri);
                vec![Effect::Decide(PolicyDecision::Ignore)]
            }
            other => {
                let effects = self.tab_manager.handle_event(tab_id, other);
                self.quit_if_empty(effects)
            }
        }
    }

    fn is_blocked(&self, uri: &str) -> bool {
        self.content_filter
            .as_ref()
            .map(|f| f.should_block(uri))
            .unwrap_or(false)
    }

    /// Registers a download and picks its destination in the downloads directory.
    /// Returns the download id and the destination path for the engine.
    pub fn begin_download(
        &mut self,
        tab_id: Option<&str>,
        source_uri: &str,
        suggested_filename: Option<&str>,
    ) -> (String, PathBuf) {
        let context_id = tab_id
            .and_then(|id| self.tab_manager.get_tab(id))
            .map(|t| t.context_id);
        let id = self.download_manager.start(source_uri, context_id);

        let suggested = suggested_filename
            .map(String::from)
            .or_else(|| uri::filename_of(source_uri));
        let mut destination = self.paths.downloads_dir.join("download");
        if let Err(e) = self.download_manager.request_destination(&id, suggested.as_deref()) {
            log::warn!("{}", e);
        }
        if let Some(download) = self.download_manager.get(&id) {
            destination = DownloadManager::default_destination(&self.paths.downloads_dir, download);
        }
        if let Err(e) = self.download_manager.choose_destination(&id, &destination) {
            log::warn!("{}", e);
        }
        (id, destination)
    }

    pub fn handle_download_event(&mut self, download_id: &str, event: DownloadEvent) -> Vec<Effect> {
        self.download_manager.handle_event(download_id, event)
    }

    /// Removes a download row.
    pub fn dismiss_download(&mut self, download_id: &str) -> Vec<Effect> {
        match self.download_manager.dismiss(download_id) {
            Ok(_) => vec![Effect::RemoveDownloadRow { download_id: download_id.to_string() }],
            Err(e) => {
                log::warn!("{}", e);
                Vec::new()
            }
        }
    }

    /// Dispatches a key chord. `None` means the chord is not ours and the
    /// toolkit should handle it.
    pub fn handle_key(
        &mut self,
        chord: &KeyChord,
        scope: FocusScope,
        text_entry_focused: bool,
    ) -> Option<Vec<Effect>> {
        let action = self
            .keybinding_manager
            .dispatch(chord, scope, text_entry_focused)?;
        log::debug!("{} -> {}", chord, action.name());
        Some(self.handle_action(action))
    }

    /// Pointer press on a tab's chrome.
    pub fn handle_pointer(&mut self, tab_id: &str, scope: FocusScope, button: PointerButton) -> Vec<Effect> {
        match self.keybinding_manager.dispatch_pointer(scope, button) {
            Some(Action::CloseTab) => {
                let effects = Self::log_tab_error(self.tab_manager.close_tab(tab_id));
                self.quit_if_empty(effects)
            }
            Some(action) => self.handle_action(action),
            None => Vec::new(),
        }
    }

    /// Runs an action against the current tab.
    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        if action == Action::NewTab {
            let (id, mut effects) = self.tab_manager.create_root_tab(&mut self.contexts, None, true);
            effects.push(Effect::FocusLocation { tab_id: id });
            return effects;
        }
        match action {
            Action::PreviousTab => return self.tab_manager.select_relative(-1),
            Action::NextTab => return self.tab_manager.select_relative(1),
            Action::SelectTab(n) => {
                return Self::log_tab_error(self.tab_manager.select_position(n as usize))
            }
            _ => {}
        }

        let tab_id = match self.tab_manager.get_current_tab() {
            Some(tab) => tab.id.clone(),
            None => {
                log::debug!("{} with no current tab", action.name());
                return Vec::new();
            }
        };
        let tabs = &mut self.tab_manager;
        let result = match action {
            Action::CloseTab => tabs.close_tab(&tab_id),
            Action::FocusLocation => Ok(vec![Effect::FocusLocation { tab_id }]),
            Action::FocusSearch => Ok(vec![Effect::FocusSearch { tab_id }]),
            Action::GoBack => tabs.go_back(&tab_id),
            Action::GoForward => tabs.go_forward(&tab_id),
            Action::Reload => tabs.reload(&tab_id, false),
            Action::ReloadBypassCache => tabs.reload(&tab_id, true),
            Action::StopLoading => tabs.stop_loading(&tab_id),
            Action::Print => tabs.print(&tab_id),
            Action::ZoomIn => tabs.zoom_in(&tab_id),
            Action::ZoomOut => tabs.zoom_out(&tab_id),
            Action::ZoomReset => tabs.reset_zoom(&tab_id),
            Action::ToggleJavascript => tabs.toggle_javascript(&tab_id),
            Action::ToggleImages => tabs.toggle_images(&tab_id),
            Action::FindNext => tabs.search_next(&tab_id),
            Action::FindPrevious => tabs.search_previous(&tab_id),
            Action::NewTab | Action::PreviousTab | Action::NextTab | Action::SelectTab(_) => {
                Ok(Vec::new())
            }
        };
        let effects = Self::log_tab_error(result);
        self.quit_if_empty(effects)
    }

    /// Location entry activated in a tab.
    pub fn submit_location(&mut self, tab_id: &str, text: &str) -> Vec<Effect> {
        Self::log_tab_error(self.tab_manager.submit_location(tab_id, text))
    }

    /// Ctrl+wheel over a page. One notch is one zoom step.
    pub fn scroll_zoom(&mut self, tab_id: &str, delta_y: f64) -> Vec<Effect> {
        Self::log_tab_error(self.tab_manager.scroll_zoom(tab_id, delta_y))
    }

    /// Search entry changed or activated in a tab.
    pub fn search(&mut self, tab_id: &str, text: &str) -> Vec<Effect> {
        Self::log_tab_error(self.tab_manager.search(tab_id, text))
    }

    pub fn switch_tab(&mut self, tab_id: &str) -> Vec<Effect> {
        Self::log_tab_error(self.tab_manager.switch_tab(tab_id))
    }

    pub fn resolve_tls(&mut self, tab_id: &str, failing_uri: &str, choice: TlsChoice) -> Vec<Effect> {
        self.tab_manager.resolve_tls(tab_id, failing_uri, choice)
    }
}
