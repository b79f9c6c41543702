use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use docformat::FileFormat;
use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::Config;
use crate::editor::Editor;
use crate::file_manager::{basename, FileManager};
use crate::menu::{Menu, MenuAction, MenuBar, MenuItem, MenuOutcome};
use crate::plugin::{AppRequest, PluginContext, RequestQueue};
use crate::plugin_host::{PluginError, PluginHost};
use crate::prompt::{parse_line_number, Prompt, PromptOutcome, PromptValue};
use crate::search::FindReplace;
use crate::status_manager::StatusManager;

/// Upper bound on plugin requests handled per key press, so two plugins
/// cannot keep each other busy forever.
const MAX_REQUESTS_PER_KEY: usize = 64;

/// What to do once the user has agreed to discard unsaved changes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Discard {
    New,
    Open,
    OpenPath(PathBuf),
    Quit,
}

/// What an open prompt is collecting input for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Discard(Discard),
    OpenPath,
    SaveAsPath,
    ExportFormat,
    ExportPath(FileFormat),
    FindReplace,
    GotoLine,
    Notice,
}

pub struct App {
    // Declared first so plugins are destroyed before the document they
    // hold handles to.
    plugins: PluginHost,
    document: Rc<RefCell<Editor>>,
    requests: RequestQueue,
    pub config: Config,
    pub file_manager: FileManager,
    pub status: StatusManager,
    menu_bar: MenuBar,
    prompt: Option<(Prompt, Pending)>,
    last_find: FindReplace,
    running: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let mut editor = Editor::new();
        editor.set_tab_width(config.editor.tab_width);

        Self {
            plugins: PluginHost::new(),
            document: Rc::new(RefCell::new(editor)),
            requests: RequestQueue::default(),
            file_manager: FileManager::new(config.files.default_format),
            status: StatusManager::new(),
            menu_bar: MenuBar::standard(),
            prompt: None,
            last_find: FindReplace::default(),
            running: true,
            config,
        }
    }

    pub fn document(&self) -> Ref<'_, Editor> {
        self.document.borrow()
    }

    pub fn menu_bar(&self) -> &MenuBar {
        &self.menu_bar
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref().map(|(prompt, _)| prompt)
    }

    pub fn plugins(&self) -> &PluginHost {
        &self.plugins
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn file_name(&self) -> String {
        self.file_manager.display_name()
    }

    /// Terminal size changed. Menu bar and status line take one row each.
    pub fn resize(&mut self, width: u16, height: u16) {
        let rows = usize::from(height).saturating_sub(2);
        self.document
            .borrow_mut()
            .resize(rows, usize::from(width));
    }

    pub fn plugin_context(&self) -> PluginContext {
        PluginContext::new(&self.document, &self.requests)
    }

    /// Load every plugin from the configured directory and add their menu
    /// entries.
    pub fn load_plugins(&mut self) {
        if !self.config.plugins.enabled {
            log::info!("Plugins disabled by configuration");
            return;
        }

        let ctx = self.plugin_context();
        let directory = self.config.plugins.directory.clone();
        match self.plugins.load_from_directory(&directory, &ctx) {
            Ok(report) => {
                if !report.failures.is_empty() {
                    self.status.set_warning(format!(
                        "{} plugin(s) failed to load, see log",
                        report.failures.len()
                    ));
                }
            }
            Err(PluginError::Directory { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::debug!("No plugin directory at {}", directory.display());
            }
            Err(e) => log::warn!("{e}"),
        }
        self.rebuild_plugin_menus();
    }

    /// One menu per plugin category, in first-seen order.
    fn rebuild_plugin_menus(&mut self) {
        let mut bar = MenuBar::standard();
        let mut menus: Vec<Menu> = Vec::new();
        for (id, item) in self.plugins.collect_menu_items() {
            let category = if item.category.is_empty() {
                "Plugins".to_string()
            } else {
                item.category.clone()
            };
            let entry = match item.shortcut {
                Some(key) => MenuItem::new(item.label.clone(), key_hint(key), MenuAction::Plugin {
                    id,
                    label: item.label.clone(),
                })
                .with_shortcut(key),
                None => MenuItem::new(item.label.clone(), "", MenuAction::Plugin {
                    id,
                    label: item.label.clone(),
                }),
            };
            match menus.iter_mut().find(|menu| menu.title == category) {
                Some(menu) => menu.items.push(entry),
                None => menus.push(Menu::new(category, vec![entry])),
            }
        }
        for menu in menus {
            bar.add_menu(menu);
        }
        self.menu_bar = bar;
    }

    /// Destroy all plugins while the document is still alive.
    pub fn shutdown(&mut self) {
        self.plugins.unload_all();
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if let Some((mut prompt, pending)) = self.prompt.take() {
            match prompt.handle_key(key) {
                PromptOutcome::Pending => self.prompt = Some((prompt, pending)),
                PromptOutcome::Cancelled => {}
                PromptOutcome::Accepted(value) => self.complete_prompt(pending, value).await,
            }
        } else if let Some(action) = shortcut_action(key) {
            self.menu_bar.close();
            self.run_action(action).await;
        } else {
            match self.menu_bar.handle_key(key) {
                MenuOutcome::Execute(action) => self.run_action(action).await,
                MenuOutcome::Consumed => {}
                MenuOutcome::Ignored => {
                    self.document.borrow_mut().handle_key(key);
                }
            }
        }

        self.drain_requests().await;
        Ok(())
    }

    pub async fn run_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::New => self.with_discard_check(Discard::New).await,
            MenuAction::Open => self.with_discard_check(Discard::Open).await,
            MenuAction::Quit => self.with_discard_check(Discard::Quit).await,
            MenuAction::Save => self.save().await,
            MenuAction::SaveAs => self.ask_save_as(),
            MenuAction::SaveAsFormat => {
                let options = FileFormat::ALL
                    .iter()
                    .map(|format| format.label().to_string())
                    .collect();
                let selected = FileFormat::ALL
                    .iter()
                    .position(|&format| format == self.file_manager.format())
                    .unwrap_or(0);
                self.open_prompt(
                    Prompt::choice("Choose save format", options, selected),
                    Pending::ExportFormat,
                );
            }
            MenuAction::FindReplace => {
                let prompt = Prompt::find_replace(&self.last_find);
                self.open_prompt(prompt, Pending::FindReplace);
            }
            MenuAction::GotoLine => {
                let (current, total) = {
                    let doc = self.document.borrow();
                    (doc.cursor_row() + 1, doc.line_count())
                };
                self.open_prompt(
                    Prompt::input(
                        "Go To Line",
                        format!("Go to line (1-{total}):"),
                        current.to_string(),
                        10,
                    ),
                    Pending::GotoLine,
                );
            }
            MenuAction::About => {
                let prompt = Prompt::alert("About NotepadTUI", self.about_text());
                self.open_prompt(prompt, Pending::Notice);
            }
            MenuAction::Plugin { id, label } => {
                if let Err(e) = self.plugins.execute(id, &label) {
                    self.status.set_error(e.to_string());
                }
            }
        }
    }

    fn open_prompt(&mut self, prompt: Prompt, pending: Pending) {
        self.prompt = Some((prompt, pending));
    }

    fn alert(&mut self, title: &str, message: impl Into<String>) {
        self.open_prompt(Prompt::alert(title, message), Pending::Notice);
    }

    async fn with_discard_check(&mut self, then: Discard) {
        if self.document.borrow().is_dirty() {
            self.open_prompt(
                Prompt::confirm(
                    "Unsaved changes",
                    "There are unsaved changes. Discard them and continue? [y/n]",
                ),
                Pending::Discard(then),
            );
        } else {
            self.discard_and(then).await;
        }
    }

    async fn discard_and(&mut self, then: Discard) {
        match then {
            Discard::New => self.new_document(),
            Discard::Open => {
                self.open_prompt(Prompt::file_path("Open file", ""), Pending::OpenPath);
            }
            Discard::OpenPath(path) => self.open_path(path).await,
            Discard::Quit => {
                log::info!("Quit requested");
                self.running = false;
            }
        }
    }

    async fn complete_prompt(&mut self, pending: Pending, value: PromptValue) {
        match (pending, value) {
            (Pending::Discard(then), PromptValue::Confirmed) => self.discard_and(then).await,
            (Pending::OpenPath, PromptValue::Text(path)) if !path.is_empty() => {
                self.open_path(PathBuf::from(path)).await;
            }
            (Pending::SaveAsPath, PromptValue::Text(path)) if !path.is_empty() => {
                self.save_as(PathBuf::from(path)).await;
            }
            (Pending::ExportFormat, PromptValue::Choice(index)) => {
                let format = FileFormat::ALL.get(index).copied().unwrap_or_default();
                let suggested = self.file_manager.suggested_path(format);
                self.open_prompt(
                    Prompt::file_path("Save in format", suggested.display().to_string()),
                    Pending::ExportPath(format),
                );
            }
            (Pending::ExportPath(format), PromptValue::Text(path)) if !path.is_empty() => {
                self.export(PathBuf::from(path), format).await;
            }
            (Pending::FindReplace, PromptValue::FindReplace(params)) => {
                self.last_find = params.clone();
                if params.needle.is_empty() {
                    return;
                }
                let count = self.document.borrow_mut().apply_find_replace(&params);
                if count == 0 {
                    self.status.set_warning(format!("Not found: {}", params.needle));
                } else {
                    self.status.set_success(format!("{count} replacement(s) made."));
                }
            }
            (Pending::GotoLine, PromptValue::Text(input)) => {
                let total = self.document.borrow().line_count();
                match parse_line_number(&input, total) {
                    Some(line) => self.document.borrow_mut().goto_line(line),
                    None => self.status.set_error(format!("Invalid line number: {input}")),
                }
            }
            _ => {}
        }
    }

    fn new_document(&mut self) {
        self.document.borrow_mut().clear();
        self.file_manager.reset();
        self.status.set_info("New document created.");
    }

    /// Load `path` into the document and tell the plugins about it.
    pub async fn open_path(&mut self, path: PathBuf) {
        match self.file_manager.load(&path).await {
            Ok(lines) => {
                self.document.borrow_mut().set_lines(lines);
                let failures = self.plugins.notify_open(&path);
                self.report_hook_failures(&format!("Opened: {}", basename(&path)), failures.len());
            }
            Err(e) => {
                log::error!("Open failed: {e:#}");
                self.alert("Error", format!("Could not open the file: {e}"));
            }
        }
    }

    async fn save(&mut self) {
        if !self.file_manager.has_file() {
            self.ask_save_as();
            return;
        }
        let lines = self.document.borrow().lines().to_vec();
        match self.file_manager.save_current(&lines).await {
            Ok(path) => self.after_save(&path, "Saved"),
            Err(e) => {
                log::error!("Save failed: {e:#}");
                self.alert("Error", format!("Could not save the file: {e}"));
            }
        }
    }

    fn ask_save_as(&mut self) {
        let initial = self
            .file_manager
            .current_path()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        self.open_prompt(Prompt::file_path("Save as", initial), Pending::SaveAsPath);
    }

    async fn save_as(&mut self, path: PathBuf) {
        let lines = self.document.borrow().lines().to_vec();
        let format = docformat::detect_format(&path);
        match self.file_manager.save(&path, &lines, format).await {
            Ok(_) => self.after_save(&path, "Saved as"),
            Err(e) => {
                log::error!("Save failed: {e:#}");
                self.alert("Error", format!("Could not save the file: {e}"));
            }
        }
    }

    fn after_save(&mut self, path: &Path, verb: &str) {
        self.document.borrow_mut().set_dirty(false);
        let failures = self.plugins.notify_save(path);
        self.report_hook_failures(&format!("{verb}: {}", basename(path)), failures.len());
    }

    /// Export without notifying plugins.
    async fn export(&mut self, path: PathBuf, format: FileFormat) {
        let lines = self.document.borrow().lines().to_vec();
        match self.file_manager.save(&path, &lines, format).await {
            Ok(_) => {
                self.document.borrow_mut().set_dirty(false);
                self.status
                    .set_success(format!("Exported as: {}", basename(&path)));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.alert("Error", format!("Could not save: {e}"));
            }
        }
    }

    fn report_hook_failures(&mut self, message: &str, failures: usize) {
        if failures == 0 {
            self.status.set_success(message);
        } else {
            self.status
                .set_warning(format!("{message} ({failures} plugin hook(s) failed)"));
        }
    }

    fn about_text(&self) -> String {
        let mut text = format!(
            "NotepadTUI v{}\n\
             Shortcuts:\n  \
             Ctrl+N New    Ctrl+O Open\n  \
             Ctrl+S Save   Ctrl+Q Quit\n  \
             Ctrl+F Find   Ctrl+G Go to line\n  \
             F10    Menu",
            env!("CARGO_PKG_VERSION")
        );
        let plugins = self.plugins.plugins();
        if !plugins.is_empty() {
            text.push_str("\nPlugins:");
            for info in plugins {
                text.push_str(&format!(
                    "\n  {} v{} - {}",
                    info.name, info.version, info.description
                ));
            }
        }
        text
    }

    /// Carry out what plugins asked for during the last call. Stops early
    /// when a request needs user input.
    async fn drain_requests(&mut self) {
        for _ in 0..MAX_REQUESTS_PER_KEY {
            if self.prompt.is_some() || !self.running {
                return;
            }
            let Some(request) = self.requests.borrow_mut().pop_front() else {
                return;
            };
            log::debug!("Plugin request: {request:?}");
            match request {
                AppRequest::New => self.with_discard_check(Discard::New).await,
                AppRequest::Open(None) => self.with_discard_check(Discard::Open).await,
                AppRequest::Open(Some(path)) => {
                    self.with_discard_check(Discard::OpenPath(path)).await;
                }
                AppRequest::Save => self.save().await,
                AppRequest::Quit => self.with_discard_check(Discard::Quit).await,
                AppRequest::Message(text) => self.status.set_info(text),
            }
        }
        log::warn!("Too many plugin requests in one step, dropping the rest");
        self.requests.borrow_mut().clear();
    }
}

/// Global Ctrl shortcuts, honoured even while the menu is open.
fn shortcut_action(key: KeyEvent) -> Option<MenuAction> {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char('n') => Some(MenuAction::New),
        KeyCode::Char('o') => Some(MenuAction::Open),
        KeyCode::Char('s') => Some(MenuAction::Save),
        KeyCode::Char('q') => Some(MenuAction::Quit),
        KeyCode::Char('f') => Some(MenuAction::FindReplace),
        KeyCode::Char('g') => Some(MenuAction::GotoLine),
        _ => None,
    }
}

fn key_hint(key: KeyCode) -> String {
    match key {
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Char(c) => c.to_uppercase().to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::AppHandle;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c))).await.unwrap();
        }
    }

    fn app() -> App {
        let mut config = Config::default();
        config.plugins.enabled = false;
        App::new(config)
    }

    #[tokio::test]
    async fn test_app_creation() {
        let app = app();
        assert!(app.is_running());
        assert_eq!(app.file_name(), "[Untitled]");
        assert!(app.prompt().is_none());
        assert!(!app.document().is_dirty());
    }

    #[tokio::test]
    async fn test_typing_reaches_editor() {
        let mut app = app();
        type_text(&mut app, "hi").await;
        app.handle_key_event(key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.document().get_text(), "hi    ");
        assert!(app.document().is_dirty());
    }

    #[tokio::test]
    async fn test_open_and_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "one\ntwo\n").unwrap();

        let mut app = app();
        app.open_path(path.clone()).await;
        assert_eq!(app.document().get_text(), "one\ntwo");
        assert_eq!(app.file_name(), "a.txt");

        type_text(&mut app, "x").await;
        app.handle_key_event(ctrl('s')).await.unwrap();
        assert!(!app.document().is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "xone\ntwo");
    }

    #[tokio::test]
    async fn test_open_failure_shows_alert() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        app.open_path(dir.path().join("missing.txt")).await;
        assert!(matches!(app.prompt(), Some(p) if p.title == "Error"));
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert!(app.prompt().is_none());
    }

    #[tokio::test]
    async fn test_save_untitled_asks_for_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.md");
        let mut app = app();
        type_text(&mut app, "# hi").await;

        app.handle_key_event(ctrl('s')).await.unwrap();
        assert!(matches!(app.prompt(), Some(p) if p.title == "Save as"));
        type_text(&mut app, &path.display().to_string()).await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hi");
        assert_eq!(app.file_name(), "new.md");
        assert!(!app.document().is_dirty());
    }

    #[tokio::test]
    async fn test_export_as_html() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        let mut app = app();
        type_text(&mut app, "a<b").await;

        app.run_action(MenuAction::SaveAsFormat).await;
        app.handle_key_event(key(KeyCode::Down)).await.unwrap();
        app.handle_key_event(key(KeyCode::Down)).await.unwrap();
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert!(matches!(app.prompt(), Some(p) if p.title == "Save in format"));

        // Replace the suggested name.
        for _ in 0.."document.html".len() {
            app.handle_key_event(key(KeyCode::Backspace)).await.unwrap();
        }
        type_text(&mut app, &path.display().to_string()).await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("a&lt;b<br>"));
        assert!(!app.document().is_dirty());
    }

    #[tokio::test]
    async fn test_new_with_unsaved_changes_asks_first() {
        let mut app = app();
        type_text(&mut app, "draft").await;

        app.handle_key_event(ctrl('n')).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.document().get_text(), "draft");

        app.handle_key_event(ctrl('n')).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('y'))).await.unwrap();
        assert_eq!(app.document().get_text(), "");
        assert!(!app.document().is_dirty());
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app();
        app.handle_key_event(ctrl('q')).await.unwrap();
        assert!(!app.is_running());

        let mut app = self::app();
        type_text(&mut app, "x").await;
        app.handle_key_event(ctrl('q')).await.unwrap();
        assert!(app.is_running());
        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert!(app.is_running());
        app.handle_key_event(ctrl('q')).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('y'))).await.unwrap();
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_find_replace_prompt() {
        let mut app = app();
        type_text(&mut app, "foo Foo").await;

        app.handle_key_event(ctrl('f')).await.unwrap();
        type_text(&mut app, "foo").await;
        app.handle_key_event(key(KeyCode::Tab)).await.unwrap();
        type_text(&mut app, "bar").await;
        app.handle_key_event(key(KeyCode::F(3))).await.unwrap();
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.document().get_text(), "bar bar");
        assert_eq!(app.document().cursor_position(), (0, 0));
        assert!(app.status.peek().unwrap().content.starts_with("2 replacement"));
    }

    #[tokio::test]
    async fn test_goto_line_prompt() {
        let mut app = app();
        type_text(&mut app, "a").await;
        for _ in 0..4 {
            app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        }

        app.handle_key_event(ctrl('g')).await.unwrap();
        app.handle_key_event(key(KeyCode::Backspace)).await.unwrap();
        type_text(&mut app, "2").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.document().cursor_position(), (1, 0));

        app.handle_key_event(ctrl('g')).await.unwrap();
        type_text(&mut app, "0").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.document().cursor_position(), (1, 0));
        assert!(app.status.has_message());
    }

    #[tokio::test]
    async fn test_menu_drives_actions() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::F(10))).await.unwrap();
        assert!(app.menu_bar().is_open());
        app.handle_key_event(key(KeyCode::Right)).await.unwrap();
        app.handle_key_event(key(KeyCode::Right)).await.unwrap();
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert!(!app.menu_bar().is_open());
        assert!(matches!(app.prompt(), Some(p) if p.title == "About NotepadTUI"));

        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        app.handle_key_event(key(KeyCode::F(10))).await.unwrap();
        type_text(&mut app, "x").await;
        assert_eq!(app.document().get_text(), "");
    }

    #[tokio::test]
    async fn test_plugin_requests_are_drained() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("req.txt");
        std::fs::write(&path, "from disk").unwrap();

        let mut app = app();
        let handle = AppHandle::new(&app.requests);
        handle.message("hello from plugin");
        app.drain_requests().await;
        assert_eq!(app.status.peek().unwrap().content, "hello from plugin");

        handle.open(Some(path));
        handle.quit();
        app.drain_requests().await;
        assert_eq!(app.document().get_text(), "from disk");
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_plugin_request_waits_for_prompt() {
        let mut app = app();
        type_text(&mut app, "dirty").await;
        let handle = AppHandle::new(&app.requests);
        handle.new_document();
        handle.message("after");

        app.drain_requests().await;
        assert!(app.prompt().is_some());
        assert_eq!(app.requests.borrow().len(), 1);

        app.handle_key_event(key(KeyCode::Char('y'))).await.unwrap();
        assert_eq!(app.document().get_text(), "");
        assert_eq!(app.status.peek().unwrap().content, "after");
    }

    #[tokio::test]
    async fn test_resize_reserves_bars() {
        let mut app = app();
        app.resize(80, 24);
        assert_eq!(app.document().viewport_size(), (22, 80));
        app.resize(1, 1);
        assert_eq!(app.document().viewport_size(), (1, 1));
    }

    #[tokio::test]
    async fn test_missing_plugin_directory_is_quiet() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.plugins.directory = dir.path().join("none");
        let mut app = App::new(config);
        app.load_plugins();
        assert!(app.plugins().is_empty());
        assert_eq!(app.menu_bar().menus().len(), 3);
        assert!(!app.status.has_message());
    }

    #[test]
    fn test_key_hint() {
        assert_eq!(key_hint(KeyCode::F(5)), "F5");
        assert_eq!(key_hint(KeyCode::Char('w')), "W");
    }
}
