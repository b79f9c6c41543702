//! The contract between the editor and dynamically loaded plugins.
//!
//! A plugin is any type implementing [`Plugin`], compiled into a
//! `cdylib` that exports a factory and a destructor with the names in
//! [`CREATE_SYMBOL`] and [`DESTROY_SYMBOL`]. The [`declare_plugin!`] macro
//! generates both exports.
//!
//! ```ignore
//! #[derive(Default)]
//! struct Shout;
//!
//! impl notepad::plugin::Plugin for Shout {
//!     /* ... */
//! }
//!
//! notepad::declare_plugin!(Shout, Shout::default);
//! ```
//!
//! Host and plugin must be built by the same compiler from the same
//! `notepad` sources: the boundary passes Rust trait objects, not a
//! stable C ABI.

use anyhow::Result;
use crossterm::event::KeyCode;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use crate::editor::{Editor, Line};

/// Name of the exported factory symbol.
pub const CREATE_SYMBOL: &[u8] = b"notepad_create_plugin";
/// Name of the exported destructor symbol.
pub const DESTROY_SYMBOL: &[u8] = b"notepad_destroy_plugin";

/// Thin pointer to a boxed plugin, the unit exchanged across the module
/// boundary.
pub type RawPlugin = *mut Box<dyn Plugin>;

/// Factory exported by a plugin module. Returns null when no instance
/// could be created.
#[allow(improper_ctypes_definitions)]
pub type CreatePluginFn = unsafe extern "C" fn() -> RawPlugin;

/// Destructor exported by a plugin module, releasing a pointer previously
/// returned by the factory of the same module.
#[allow(improper_ctypes_definitions)]
pub type DestroyPluginFn = unsafe extern "C" fn(RawPlugin);

/// Entry contributed by a plugin to the editor's menu bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMenuItem {
    pub label: String,
    pub category: String,
    pub shortcut: Option<KeyCode>,
}

impl PluginMenuItem {
    pub fn new(label: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            category: category.into(),
            shortcut: None,
        }
    }

    pub fn with_shortcut(mut self, key: KeyCode) -> Self {
        self.shortcut = Some(key);
        self
    }
}

pub trait Plugin {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn description(&self) -> &str;

    /// Called exactly once, right after the module is loaded and before
    /// any other hook.
    fn initialize(&mut self, ctx: PluginContext);

    fn menu_items(&self) -> Vec<PluginMenuItem>;

    /// Run the action behind one of this plugin's menu items.
    fn execute(&mut self, action: &str) -> Result<()>;

    fn on_open(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn on_save(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// High-level application actions a plugin may ask for. They are queued
/// and carried out by the application once the plugin call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRequest {
    New,
    Open(Option<PathBuf>),
    Save,
    Quit,
    Message(String),
}

/// Queue shared between the application and the [`AppHandle`]s it hands
/// out.
pub type RequestQueue = Rc<RefCell<VecDeque<AppRequest>>>;

/// Capabilities handed to a plugin in [`Plugin::initialize`].
#[derive(Clone)]
pub struct PluginContext {
    pub document: DocumentHandle,
    pub app: AppHandle,
}

impl PluginContext {
    pub fn new(document: &Rc<RefCell<Editor>>, requests: &RequestQueue) -> Self {
        Self {
            document: DocumentHandle::new(document),
            app: AppHandle::new(requests),
        }
    }
}

/// Non-owning access to the live document. Every method is a no-op (or
/// returns `None`) once the editor has been dropped, and also while the
/// editor is already borrowed, for example when `insert_text` is called
/// from inside a `with_lines` closure. The latter is logged as a warning.
#[derive(Clone)]
pub struct DocumentHandle {
    editor: Weak<RefCell<Editor>>,
}

impl DocumentHandle {
    pub fn new(editor: &Rc<RefCell<Editor>>) -> Self {
        Self {
            editor: Rc::downgrade(editor),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&Editor) -> R) -> Option<R> {
        let editor = self.editor.upgrade()?;
        let Ok(editor) = editor.try_borrow() else {
            log::warn!("Plugin read of the document ignored: document is being modified");
            return None;
        };
        Some(f(&editor))
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut Editor) -> R) -> Option<R> {
        let editor = self.editor.upgrade()?;
        let Ok(mut editor) = editor.try_borrow_mut() else {
            log::warn!("Plugin edit of the document dropped: document is already borrowed");
            return None;
        };
        Some(f(&mut editor))
    }

    pub fn is_alive(&self) -> bool {
        self.editor.strong_count() > 0
    }

    pub fn with_lines<R>(&self, f: impl FnOnce(&[Line]) -> R) -> Option<R> {
        self.with(|editor| f(editor.lines()))
    }

    pub fn lines(&self) -> Option<Vec<Line>> {
        self.with_lines(|lines| lines.to_vec())
    }

    /// Document text with invalid UTF-8 replaced by U+FFFD.
    pub fn text(&self) -> Option<String> {
        self.with(Editor::get_text)
    }

    /// Document content exactly as stored, rows joined by `\n`.
    pub fn text_bytes(&self) -> Option<Vec<u8>> {
        self.with(Editor::get_bytes)
    }

    pub fn cursor(&self) -> Option<(usize, usize)> {
        self.with(Editor::cursor_position)
    }

    pub fn insert_text(&self, text: &str) {
        self.with_mut(|editor| editor.insert_text(text));
    }

    pub fn is_dirty(&self) -> bool {
        self.with(Editor::is_dirty).unwrap_or(false)
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.with_mut(|editor| editor.set_dirty(dirty));
    }

    pub fn find_replace(
        &self,
        needle: &str,
        replacement: &str,
        case_sensitive: bool,
        replace_all: bool,
    ) -> usize {
        self.with_mut(|editor| {
            editor.find_replace(needle, replacement, case_sensitive, replace_all)
        })
        .unwrap_or(0)
    }
}

/// Non-owning access to the application's high-level actions.
#[derive(Clone)]
pub struct AppHandle {
    requests: Weak<RefCell<VecDeque<AppRequest>>>,
}

impl AppHandle {
    pub fn new(requests: &RequestQueue) -> Self {
        Self {
            requests: Rc::downgrade(requests),
        }
    }

    fn push(&self, request: AppRequest) {
        if let Some(queue) = self.requests.upgrade() {
            queue.borrow_mut().push_back(request);
        }
    }

    pub fn new_document(&self) {
        self.push(AppRequest::New);
    }

    /// Open a file; `None` lets the user pick the path.
    pub fn open(&self, path: Option<PathBuf>) {
        self.push(AppRequest::Open(path));
    }

    pub fn save(&self) {
        self.push(AppRequest::Save);
    }

    pub fn quit(&self) {
        self.push(AppRequest::Quit);
    }

    /// Show a one-shot message on the status line.
    pub fn message(&self, text: impl Into<String>) {
        self.push(AppRequest::Message(text.into()));
    }
}

/// Export the factory and destructor symbols for a plugin type.
///
/// `$ctor` must evaluate to a value of `$plugin_type`.
#[macro_export]
macro_rules! declare_plugin {
    ($plugin_type:ty, $ctor:path) => {
        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn notepad_create_plugin() -> $crate::plugin::RawPlugin {
            let plugin: $plugin_type = $ctor();
            let boxed: ::std::boxed::Box<dyn $crate::plugin::Plugin> =
                ::std::boxed::Box::new(plugin);
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(boxed))
        }

        /// # Safety
        ///
        /// `plugin` must come from `notepad_create_plugin` of this module
        /// and must not be used afterwards.
        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub unsafe extern "C" fn notepad_destroy_plugin(plugin: $crate::plugin::RawPlugin) {
            if !plugin.is_null() {
                drop(::std::boxed::Box::from_raw(plugin));
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_handle_reads_and_writes() {
        let editor = Rc::new(RefCell::new(Editor::new()));
        let handle = DocumentHandle::new(&editor);

        handle.insert_text("hello\nworld");
        assert_eq!(handle.text().as_deref(), Some("hello\nworld"));
        assert_eq!(handle.cursor(), Some((1, 5)));
        assert!(handle.is_dirty());

        handle.set_dirty(false);
        assert!(!editor.borrow().is_dirty());

        assert_eq!(handle.find_replace("O", "0", false, true), 2);
        assert_eq!(
            handle.lines(),
            Some(vec![b"hell0".to_vec(), b"w0rld".to_vec()])
        );
    }

    #[test]
    fn test_document_handle_text_bytes_are_exact() {
        let editor = Rc::new(RefCell::new(Editor::new()));
        editor
            .borrow_mut()
            .set_lines(vec![b"caf\xe9".to_vec(), b"ok".to_vec()]);
        let handle = DocumentHandle::new(&editor);

        assert_eq!(handle.text_bytes(), Some(b"caf\xe9\nok".to_vec()));
        assert_eq!(handle.text().as_deref(), Some("caf\u{fffd}\nok"));
    }

    #[test]
    fn test_nested_edit_is_dropped_not_applied() {
        let editor = Rc::new(RefCell::new(Editor::new()));
        let handle = DocumentHandle::new(&editor);
        handle.insert_text("abc");

        let seen = handle.with_lines(|lines| {
            handle.insert_text("x");
            lines.len()
        });
        assert_eq!(seen, Some(1));
        assert_eq!(handle.text().as_deref(), Some("abc"));

        let _outer = editor.borrow_mut();
        assert_eq!(handle.cursor(), None);
    }

    #[test]
    fn test_document_handle_after_editor_dropped() {
        let editor = Rc::new(RefCell::new(Editor::new()));
        let handle = DocumentHandle::new(&editor);
        drop(editor);

        assert!(!handle.is_alive());
        handle.insert_text("ignored");
        assert_eq!(handle.text(), None);
        assert!(!handle.is_dirty());
        assert_eq!(handle.find_replace("a", "b", true, true), 0);
    }

    #[test]
    fn test_document_handle_does_not_hold_ownership() {
        let editor = Rc::new(RefCell::new(Editor::new()));
        let ctx = PluginContext::new(&editor, &RequestQueue::default());
        let _copy = ctx.clone();
        assert_eq!(Rc::strong_count(&editor), 1);
    }

    #[test]
    fn test_app_handle_queues_requests() {
        let queue = RequestQueue::default();
        let handle = AppHandle::new(&queue);

        handle.save();
        handle.message("done");
        handle.open(Some(PathBuf::from("a.txt")));
        handle.quit();

        let drained: Vec<_> = queue.borrow_mut().drain(..).collect();
        assert_eq!(
            drained,
            vec![
                AppRequest::Save,
                AppRequest::Message("done".into()),
                AppRequest::Open(Some(PathBuf::from("a.txt"))),
                AppRequest::Quit,
            ]
        );
    }

    #[test]
    fn test_app_handle_after_queue_dropped() {
        let queue = RequestQueue::default();
        let handle = AppHandle::new(&queue);
        drop(queue);
        handle.new_document();
    }

    #[test]
    fn test_menu_item_builder() {
        let item = PluginMenuItem::new("Count", "Plugins").with_shortcut(KeyCode::F(5));
        assert_eq!(item.label, "Count");
        assert_eq!(item.category, "Plugins");
        assert_eq!(item.shortcut, Some(KeyCode::F(5)));
    }
}
