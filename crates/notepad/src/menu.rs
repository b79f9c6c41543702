use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::plugin_host::PluginId;

/// Everything a menu entry can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    New,
    Open,
    Save,
    SaveAs,
    SaveAsFormat,
    FindReplace,
    GotoLine,
    About,
    Quit,
    Plugin { id: PluginId, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    /// Shortcut text shown right-aligned in the dropdown.
    pub hint: String,
    /// Key that runs the item while the menu bar is closed.
    pub shortcut: Option<KeyCode>,
    /// `None` marks a separator.
    pub action: Option<MenuAction>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, hint: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            hint: hint.into(),
            shortcut: None,
            action: Some(action),
        }
    }

    pub fn separator() -> Self {
        Self {
            label: String::new(),
            hint: String::new(),
            shortcut: None,
            action: None,
        }
    }

    pub fn with_shortcut(mut self, key: KeyCode) -> Self {
        self.shortcut = Some(key);
        self
    }

    pub fn is_separator(&self) -> bool {
        self.action.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// Result of offering a key to the menu bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    /// The key is not for the menu bar.
    Ignored,
    Consumed,
    Execute(MenuAction),
}

#[derive(Debug, Clone, Default)]
pub struct MenuBar {
    menus: Vec<Menu>,
    active_menu: Option<usize>,
    active_item: usize,
}

impl MenuBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// File, Edit and Help menus.
    pub fn standard() -> Self {
        let mut bar = Self::new();
        bar.add_menu(Menu::new(
            "File",
            vec![
                MenuItem::new("New", "Ctrl+N", MenuAction::New),
                MenuItem::new("Open...", "Ctrl+O", MenuAction::Open),
                MenuItem::separator(),
                MenuItem::new("Save", "Ctrl+S", MenuAction::Save),
                MenuItem::new("Save As...", "", MenuAction::SaveAs),
                MenuItem::new("Save As Format...", "", MenuAction::SaveAsFormat),
                MenuItem::separator(),
                MenuItem::new("Quit", "Ctrl+Q", MenuAction::Quit),
            ],
        ));
        bar.add_menu(Menu::new(
            "Edit",
            vec![
                MenuItem::new("Find/Replace", "Ctrl+F", MenuAction::FindReplace),
                MenuItem::new("Go To Line...", "Ctrl+G", MenuAction::GotoLine),
            ],
        ));
        bar.add_menu(Menu::new(
            "Help",
            vec![MenuItem::new("About", "F1", MenuAction::About).with_shortcut(KeyCode::F(1))],
        ));
        bar
    }

    pub fn add_menu(&mut self, menu: Menu) {
        self.menus.push(menu);
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn is_open(&self) -> bool {
        self.active_menu.is_some()
    }

    pub fn active_menu(&self) -> Option<usize> {
        self.active_menu
    }

    pub fn active_item(&self) -> usize {
        self.active_item
    }

    /// Column where the title of menu `index` starts on the bar.
    pub fn title_x(&self, index: usize) -> usize {
        1 + self.menus[..index]
            .iter()
            .map(|menu| menu.title.len() + 2)
            .sum::<usize>()
    }

    pub fn open(&mut self, index: usize) {
        let Some(menu) = self.menus.get(index) else {
            return;
        };
        self.active_menu = Some(index);
        self.active_item = menu
            .items
            .iter()
            .position(|item| !item.is_separator())
            .unwrap_or(0);
    }

    pub fn close(&mut self) {
        self.active_menu = None;
        self.active_item = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> MenuOutcome {
        match self.active_menu {
            None => self.handle_closed(key),
            Some(index) => self.handle_open(index, key),
        }
    }

    fn handle_closed(&mut self, key: KeyEvent) -> MenuOutcome {
        let shortcut = self
            .menus
            .iter()
            .flat_map(|menu| &menu.items)
            .find(|item| item.shortcut == Some(key.code))
            .and_then(|item| item.action.clone());
        if let Some(action) = shortcut {
            return MenuOutcome::Execute(action);
        }

        match key.code {
            KeyCode::F(10) | KeyCode::Esc if !self.menus.is_empty() => {
                self.open(0);
                MenuOutcome::Consumed
            }
            _ => MenuOutcome::Ignored,
        }
    }

    fn handle_open(&mut self, index: usize, key: KeyEvent) -> MenuOutcome {
        let count = self.menus.len();
        match key.code {
            KeyCode::Left => self.open((index + count - 1) % count),
            KeyCode::Right => self.open((index + 1) % count),
            KeyCode::Up => self.step_item(index, false),
            KeyCode::Down => self.step_item(index, true),
            KeyCode::Enter => return self.execute(index, self.active_item),
            KeyCode::Esc | KeyCode::F(10) => self.close(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let hit = self.menus[index].items.iter().position(|item| {
                    !item.is_separator()
                        && item
                            .label
                            .chars()
                            .next()
                            .is_some_and(|first| first.eq_ignore_ascii_case(&c))
                });
                if let Some(item) = hit {
                    return self.execute(index, item);
                }
            }
            _ => {}
        }
        // An open menu swallows every key.
        MenuOutcome::Consumed
    }

    fn step_item(&mut self, index: usize, forward: bool) {
        let items = &self.menus[index].items;
        if items.iter().all(MenuItem::is_separator) {
            return;
        }
        let count = items.len();
        let mut next = self.active_item;
        loop {
            next = if forward {
                (next + 1) % count
            } else {
                (next + count - 1) % count
            };
            if !items[next].is_separator() {
                break;
            }
        }
        self.active_item = next;
    }

    fn execute(&mut self, index: usize, item: usize) -> MenuOutcome {
        let action = self.menus[index]
            .items
            .get(item)
            .and_then(|item| item.action.clone());
        match action {
            Some(action) => {
                self.close();
                MenuOutcome::Execute(action)
            }
            None => MenuOutcome::Consumed,
        }
    }
}
