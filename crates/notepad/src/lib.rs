//! Terminal text editor with dynamically loaded plugins.

pub mod app;
pub mod config;
pub mod editor;
pub mod file_manager;
pub mod menu;
pub mod plugin;
pub mod plugin_host;
pub mod prompt;
pub mod search;
pub mod status_manager;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use editor::{Editor, Line};
pub use plugin::{AppHandle, DocumentHandle, Plugin, PluginContext, PluginMenuItem};
pub use plugin_host::{PluginError, PluginHost};
