// Lupine state managers
// Managers handle stateful operations: browsing contexts, tabs, downloads, keybindings.

pub mod context_allocator;
pub mod download_manager;
pub mod keybinding_manager;
pub mod tab_manager;
