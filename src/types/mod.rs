// Lupine shared type definitions
// Each submodule defines types used across the application.

pub mod context;
pub mod download;
pub mod errors;
pub mod event;
pub mod keys;
pub mod settings;
pub mod tab;
