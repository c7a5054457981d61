// Lupine services
// Services are stateless or file-backed helpers: URI normalization, settings, content filters, userscripts.

pub mod content_filter;
pub mod settings_engine;
pub mod uri;
pub mod userscripts;
