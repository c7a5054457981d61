//! Lupine UI layer.
//!
//! Uses `wry` for the engine view and `tao` for the window:
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//! - Windows: WebView2
//!
//! The chrome is HTML/CSS/JS injected into the page; it talks to the core over wry IPC.

pub mod shell;
