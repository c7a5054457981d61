//! Lupine: a minimalist browser chrome over an embedded web engine.
//!
//! Positional arguments are URIs or paths, one tab each.
//! Without the `gui` feature the session runs headless: tabs are opened in
//! the core and their state is logged.

use std::env;
use std::process::ExitCode;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(feature = "gui")]
fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = env::args().skip(1).collect();
    match lupine::ui::shell::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "gui"))]
fn main() -> ExitCode {
    use lupine::app::{App, AppPaths};
    use lupine::managers::context_allocator::format_context_tag;
    use lupine::managers::tab_manager::TabManagerTrait;

    init_logging();
    let args: Vec<String> = env::args().skip(1).collect();

    let mut app = App::new(AppPaths::platform());
    let effects = app.startup(&args);
    log::debug!("startup produced {} effects", effects.len());

    for tab in app.tab_manager.get_all_tabs() {
        log::info!("{}{} -> {}", format_context_tag(tab.context_id), tab.label, tab.location);
    }
    log::info!("built without the gui feature; no window opened");
    ExitCode::SUCCESS
}
