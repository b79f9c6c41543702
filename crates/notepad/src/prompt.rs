use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::search::FindReplace;

/// Single-line text buffer with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    cursor: usize,
    max_len: usize,
}

impl TextField {
    pub fn new(initial: impl Into<String>, max_len: usize) -> Self {
        let text: String = initial.into();
        let cursor = text.chars().count();
        Self {
            text,
            cursor,
            max_len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Returns `false` for keys the field does not use.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let len = self.text.chars().count();
        match key.code {
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.text.remove(at);
            }
            KeyCode::Delete if self.cursor < len => {
                let at = self.byte_index(self.cursor);
                self.text.remove(at);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            KeyCode::Char(c)
                if !c.is_control()
                    && !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if len < self.max_len {
                    let at = self.byte_index(self.cursor);
                    self.text.insert(at, c);
                    self.cursor += 1;
                }
            }
            KeyCode::Backspace | KeyCode::Delete => {}
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Input {
        label: String,
        field: TextField,
    },
    Confirm {
        message: String,
    },
    Choice {
        options: Vec<String>,
        selected: usize,
    },
    FindReplace {
        needle: TextField,
        replacement: TextField,
        /// 0 for the needle, 1 for the replacement.
        active: usize,
        case_sensitive: bool,
        replace_all: bool,
    },
    Alert {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptValue {
    Text(String),
    Confirmed,
    Choice(usize),
    FindReplace(FindReplace),
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Pending,
    Cancelled,
    Accepted(PromptValue),
}

/// A modal dialog. Enter accepts and Esc cancels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub kind: PromptKind,
}

impl Prompt {
    pub fn input(
        title: impl Into<String>,
        label: impl Into<String>,
        initial: impl Into<String>,
        max_len: usize,
    ) -> Self {
        Self {
            title: title.into(),
            kind: PromptKind::Input {
                label: label.into(),
                field: TextField::new(initial, max_len),
            },
        }
    }

    pub fn file_path(title: impl Into<String>, initial: impl Into<String>) -> Self {
        Self::input(title, "File path:", initial, 512)
    }

    pub fn confirm(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: PromptKind::Confirm {
                message: message.into(),
            },
        }
    }

    pub fn choice(title: impl Into<String>, options: Vec<String>, selected: usize) -> Self {
        let selected = if selected < options.len() { selected } else { 0 };
        Self {
            title: title.into(),
            kind: PromptKind::Choice { options, selected },
        }
    }

    pub fn find_replace(initial: &FindReplace) -> Self {
        Self {
            title: "Find and Replace".to_string(),
            kind: PromptKind::FindReplace {
                needle: TextField::new(initial.needle.clone(), 255),
                replacement: TextField::new(initial.replacement.clone(), 255),
                active: 0,
                case_sensitive: initial.case_sensitive,
                replace_all: initial.replace_all,
            },
        }
    }

    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: PromptKind::Alert {
                message: message.into(),
            },
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptOutcome {
        if key.code == KeyCode::Esc {
            return match self.kind {
                PromptKind::Alert { .. } => PromptOutcome::Accepted(PromptValue::Dismissed),
                _ => PromptOutcome::Cancelled,
            };
        }

        match &mut self.kind {
            PromptKind::Input { field, .. } => match key.code {
                KeyCode::Enter => {
                    PromptOutcome::Accepted(PromptValue::Text(field.text().to_string()))
                }
                _ => {
                    field.handle_key(key);
                    PromptOutcome::Pending
                }
            },
            PromptKind::Confirm { .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    PromptOutcome::Accepted(PromptValue::Confirmed)
                }
                KeyCode::Char('n') | KeyCode::Char('N') => PromptOutcome::Cancelled,
                _ => PromptOutcome::Pending,
            },
            PromptKind::Choice { options, selected } => {
                match key.code {
                    KeyCode::Enter => {
                        return PromptOutcome::Accepted(PromptValue::Choice(*selected))
                    }
                    KeyCode::Up => *selected = selected.saturating_sub(1),
                    KeyCode::Down if *selected + 1 < options.len() => *selected += 1,
                    _ => {}
                }
                PromptOutcome::Pending
            }
            PromptKind::FindReplace {
                needle,
                replacement,
                active,
                case_sensitive,
                replace_all,
            } => {
                match key.code {
                    KeyCode::Enter => {
                        return PromptOutcome::Accepted(PromptValue::FindReplace(FindReplace {
                            needle: needle.text().to_string(),
                            replacement: replacement.text().to_string(),
                            case_sensitive: *case_sensitive,
                            replace_all: *replace_all,
                        }))
                    }
                    KeyCode::Tab | KeyCode::BackTab => *active = 1 - *active,
                    KeyCode::F(2) => *case_sensitive = !*case_sensitive,
                    KeyCode::F(3) => *replace_all = !*replace_all,
                    _ => {
                        let field = if *active == 0 { needle } else { replacement };
                        field.handle_key(key);
                    }
                }
                PromptOutcome::Pending
            }
            PromptKind::Alert { .. } => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    PromptOutcome::Accepted(PromptValue::Dismissed)
                }
                _ => PromptOutcome::Pending,
            },
        }
    }
}

/// Parse a 1-based line number typed into the go-to prompt.
pub fn parse_line_number(input: &str, max_line: usize) -> Option<usize> {
    let line = input.trim().parse::<usize>().ok()?;
    (1..=max_line).contains(&line).then_some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(prompt: &mut Prompt, text: &str) {
        for c in text.chars() {
            assert_eq!(prompt.handle_key(key(KeyCode::Char(c))), PromptOutcome::Pending);
        }
    }

    #[test]
    fn test_text_field_editing() {
        let mut field = TextField::new("héllo", 10);
        assert_eq!(field.cursor(), 5);
        field.handle_key(key(KeyCode::Home));
        field.handle_key(key(KeyCode::Right));
        field.handle_key(key(KeyCode::Delete));
        assert_eq!(field.text(), "hllo");
        field.handle_key(key(KeyCode::Char('e')));
        field.handle_key(key(KeyCode::End));
        field.handle_key(key(KeyCode::Backspace));
        assert_eq!(field.text(), "hell");
        assert!(!field.handle_key(key(KeyCode::Up)));
    }

    #[test]
    fn test_text_field_max_len() {
        let mut field = TextField::new("ab", 3);
        field.handle_key(key(KeyCode::Char('c')));
        field.handle_key(key(KeyCode::Char('d')));
        assert_eq!(field.text(), "abc");
    }

    #[test]
    fn test_input_accept_and_cancel() {
        let mut prompt = Prompt::file_path("Open", "");
        type_text(&mut prompt, "notes.txt");
        assert_eq!(
            prompt.handle_key(key(KeyCode::Enter)),
            PromptOutcome::Accepted(PromptValue::Text("notes.txt".into()))
        );

        let mut prompt = Prompt::file_path("Open", "x");
        assert_eq!(prompt.handle_key(key(KeyCode::Esc)), PromptOutcome::Cancelled);
    }

    #[test]
    fn test_confirm() {
        let mut prompt = Prompt::confirm("Unsaved changes", "Discard?");
        assert_eq!(prompt.handle_key(key(KeyCode::Char('q'))), PromptOutcome::Pending);
        assert_eq!(
            prompt.handle_key(key(KeyCode::Char('Y'))),
            PromptOutcome::Accepted(PromptValue::Confirmed)
        );
        assert_eq!(prompt.handle_key(key(KeyCode::Char('n'))), PromptOutcome::Cancelled);
    }

    #[test]
    fn test_choice_stays_in_range() {
        let mut prompt = Prompt::choice("Format", vec!["a".into(), "b".into()], 9);
        prompt.handle_key(key(KeyCode::Up));
        prompt.handle_key(key(KeyCode::Down));
        prompt.handle_key(key(KeyCode::Down));
        assert_eq!(
            prompt.handle_key(key(KeyCode::Enter)),
            PromptOutcome::Accepted(PromptValue::Choice(1))
        );
    }

    #[test]
    fn test_find_replace_fields_and_toggles() {
        let mut prompt = Prompt::find_replace(&FindReplace::default());
        type_text(&mut prompt, "mad");
        prompt.handle_key(key(KeyCode::Tab));
        type_text(&mut prompt, "all");
        prompt.handle_key(key(KeyCode::F(2)));
        prompt.handle_key(key(KeyCode::F(3)));

        assert_eq!(
            prompt.handle_key(key(KeyCode::Enter)),
            PromptOutcome::Accepted(PromptValue::FindReplace(FindReplace {
                needle: "mad".into(),
                replacement: "all".into(),
                case_sensitive: true,
                replace_all: true,
            }))
        );
    }

    #[test]
    fn test_alert_dismissed_by_esc() {
        let mut prompt = Prompt::alert("Error", "boom");
        assert_eq!(prompt.handle_key(key(KeyCode::Char('x'))), PromptOutcome::Pending);
        assert_eq!(
            prompt.handle_key(key(KeyCode::Esc)),
            PromptOutcome::Accepted(PromptValue::Dismissed)
        );
    }

    #[test]
    fn test_parse_line_number() {
        assert_eq!(parse_line_number(" 3 ", 5), Some(3));
        assert_eq!(parse_line_number("0", 5), None);
        assert_eq!(parse_line_number("6", 5), None);
        assert_eq!(parse_line_number("abc", 5), None);
    }
}
