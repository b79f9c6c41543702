use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cmp;

/// A single document row. Columns index bytes, not characters.
pub type Line = Vec<u8>;

/// Line buffer plus the logical cursor and the viewport scrolled over it.
///
/// `lines` is never empty and the cursor always addresses a valid
/// position: `row < lines.len()` and `col <= lines[row].len()`. Every
/// operation that moves the cursor re-scrolls the viewport so the cursor
/// stays inside it.
#[derive(Debug, Clone)]
pub struct Editor {
    pub(crate) lines: Vec<Line>,
    pub(crate) cursor_row: usize,
    pub(crate) cursor_col: usize,
    view_row: usize,
    view_col: usize,
    height: usize,
    width: usize,
    dirty: bool,
    tab_width: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self::with_size(24, 80)
    }

    pub fn with_size(height: usize, width: usize) -> Self {
        Self {
            lines: vec![Line::new()],
            cursor_row: 0,
            cursor_col: 0,
            view_row: 0,
            view_col: 0,
            height: cmp::max(height, 1),
            width: cmp::max(width, 1),
            dirty: false,
            tab_width: 4,
        }
    }

    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.tab_width = tab_width;
    }

    /// Replace the whole document. An empty set of lines becomes a single
    /// empty line. Cursor and viewport go back to the origin and the dirty
    /// flag is cleared.
    pub fn set_lines(&mut self, lines: Vec<Line>) {
        self.lines = if lines.is_empty() {
            vec![Line::new()]
        } else {
            lines
        };
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.view_row = 0;
        self.view_col = 0;
        self.dirty = false;
    }

    pub fn clear(&mut self) {
        self.set_lines(Vec::new());
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    pub fn viewport_offset(&self) -> (usize, usize) {
        (self.view_row, self.view_col)
    }

    pub fn viewport_size(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// All rows joined by a single `\n`, without a trailing newline.
    /// Invalid UTF-8 is replaced with U+FFFD; use [`Editor::get_bytes`] for
    /// the exact content.
    pub fn get_text(&self) -> String {
        String::from_utf8_lossy(&self.get_bytes()).into_owned()
    }

    /// Byte-exact form of [`Editor::get_text`].
    pub fn get_bytes(&self) -> Vec<u8> {
        self.lines.join(&b'\n')
    }

    /// Visible slice of each row inside the viewport, top to bottom.
    pub fn visible_lines(&self) -> Vec<&[u8]> {
        let end = cmp::min(self.view_row + self.height, self.lines.len());
        self.lines[self.view_row..end]
            .iter()
            .map(|line| {
                let start = cmp::min(self.view_col, line.len());
                let stop = cmp::min(self.view_col + self.width, line.len());
                &line[start..stop]
            })
            .collect()
    }

    pub fn resize(&mut self, height: usize, width: usize) {
        self.height = cmp::max(height, 1);
        self.width = cmp::max(width, 1);
        self.clamp_cursor();
        self.scroll_to_cursor();
    }

    pub fn insert_char(&mut self, byte: u8) {
        self.lines[self.cursor_row].insert(self.cursor_col, byte);
        self.cursor_col += 1;
        self.dirty = true;
        self.scroll_to_cursor();
    }

    /// Split the current row at the cursor.
    pub fn insert_newline(&mut self) {
        let rest = self.lines[self.cursor_row].split_off(self.cursor_col);
        self.lines.insert(self.cursor_row + 1, rest);
        self.cursor_row += 1;
        self.cursor_col = 0;
        self.dirty = true;
        self.scroll_to_cursor();
    }

    /// Typing simulation: every `\n` splits a row, every other byte is
    /// inserted at the cursor.
    pub fn insert_text(&mut self, text: &str) {
        for &byte in text.as_bytes() {
            if byte == b'\n' {
                self.insert_newline();
            } else {
                self.insert_char(byte);
            }
        }
    }

    pub fn insert_tab(&mut self) {
        for _ in 0..self.tab_width {
            self.insert_char(b' ');
        }
    }

    /// Backspace. At column 0 the row is joined onto the previous one.
    pub fn delete_char_back(&mut self) {
        if self.cursor_col > 0 {
            self.lines[self.cursor_row].remove(self.cursor_col - 1);
            self.cursor_col -= 1;
            self.dirty = true;
        } else if self.cursor_row > 0 {
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            let previous = &mut self.lines[self.cursor_row];
            self.cursor_col = previous.len();
            previous.extend(current);
            self.dirty = true;
        }
        self.scroll_to_cursor();
    }

    /// Delete. At the end of a row the next row is joined onto it.
    pub fn delete_char_fwd(&mut self) {
        let line_len = self.lines[self.cursor_row].len();
        if self.cursor_col < line_len {
            self.lines[self.cursor_row].remove(self.cursor_col);
            self.dirty = true;
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].extend(next);
            self.dirty = true;
        }
        self.scroll_to_cursor();
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.clamp_cursor();
        }
        self.scroll_to_cursor();
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.clamp_cursor();
        }
        self.scroll_to_cursor();
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].len();
        }
        self.scroll_to_cursor();
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.lines[self.cursor_row].len() {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
        self.scroll_to_cursor();
    }

    pub fn move_to_line_start(&mut self) {
        self.cursor_col = 0;
        self.scroll_to_cursor();
    }

    pub fn move_to_line_end(&mut self) {
        self.cursor_col = self.lines[self.cursor_row].len();
        self.scroll_to_cursor();
    }

    fn page_step(&self) -> usize {
        cmp::max(self.height.saturating_sub(1), 1)
    }

    pub fn page_up(&mut self) {
        self.cursor_row = self.cursor_row.saturating_sub(self.page_step());
        self.clamp_cursor();
        self.scroll_to_cursor();
    }

    pub fn page_down(&mut self) {
        self.cursor_row += self.page_step();
        self.clamp_cursor();
        self.scroll_to_cursor();
    }

    /// Jump to the start of a 1-based line number, clamped into the
    /// document.
    pub fn goto_line(&mut self, line: usize) {
        let line = line.clamp(1, self.lines.len());
        self.cursor_row = line - 1;
        self.cursor_col = 0;
        self.scroll_to_cursor();
    }

    /// Move the cursor to an arbitrary position, clamped into the document.
    pub fn set_cursor_position(&mut self, row: usize, col: usize) {
        self.cursor_row = row;
        self.cursor_col = col;
        self.clamp_cursor();
        self.scroll_to_cursor();
    }

    /// Route a key press to the matching edit or navigation. Returns
    /// `false` when the key means nothing to the editor.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => self.move_cursor_up(),
            KeyCode::Down => self.move_cursor_down(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.move_to_line_start(),
            KeyCode::End => self.move_to_line_end(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::Backspace => self.delete_char_back(),
            KeyCode::Delete => self.delete_char_fwd(),
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Tab => self.insert_tab(),
            KeyCode::Char(c)
                if !c.is_control()
                    && !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let mut buf = [0u8; 4];
                for &byte in c.encode_utf8(&mut buf).as_bytes() {
                    self.insert_char(byte);
                }
            }
            _ => return false,
        }
        true
    }

    /// Row first, then column against the (possibly new) row's length.
    pub(crate) fn clamp_cursor(&mut self) {
        self.cursor_row = cmp::min(self.cursor_row, self.lines.len() - 1);
        self.cursor_col = cmp::min(self.cursor_col, self.lines[self.cursor_row].len());
    }

    /// Minimal-motion scroll: move the window just far enough to include
    /// the cursor, independently on each axis.
    pub(crate) fn scroll_to_cursor(&mut self) {
        if self.cursor_row < self.view_row {
            self.view_row = self.cursor_row;
        } else if self.cursor_row >= self.view_row + self.height {
            self.view_row = self.cursor_row + 1 - self.height;
        }

        if self.cursor_col < self.view_col {
            self.view_col = self.cursor_col;
        } else if self.cursor_col >= self.view_col + self.width {
            self.view_col = self.cursor_col + 1 - self.width;
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<Line> {
        text.iter().map(|l| l.as_bytes().to_vec()).collect()
    }

    fn editor_with(text: &[&str]) -> Editor {
        let mut editor = Editor::new();
        editor.set_lines(lines(text));
        editor
    }

    fn assert_invariants(editor: &Editor) {
        assert!(!editor.lines.is_empty());
        assert!(editor.cursor_row < editor.lines.len());
        assert!(editor.cursor_col <= editor.lines[editor.cursor_row].len());
        let (view_row, view_col) = editor.viewport_offset();
        let (height, width) = editor.viewport_size();
        assert!(editor.cursor_row >= view_row && editor.cursor_row < view_row + height);
        assert!(editor.cursor_col >= view_col && editor.cursor_col < view_col + width);
    }

    #[test]
    fn test_editor_creation() {
        let editor = Editor::new();
        assert_eq!(editor.line_count(), 1);
        assert_eq!(editor.cursor_position(), (0, 0));
        assert!(!editor.is_dirty());
        assert_eq!(editor.get_text(), "");
    }

    #[test]
    fn test_set_lines_empty_becomes_single_line() {
        let mut editor = editor_with(&["a", "b"]);
        editor.set_lines(Vec::new());
        assert_eq!(editor.lines(), &[Line::new()]);
        assert_eq!(editor.cursor_position(), (0, 0));
    }

    #[test]
    fn test_set_lines_resets_state_and_is_idempotent() {
        let mut editor = Editor::with_size(2, 4);
        editor.set_lines(lines(&["first line", "two", "three"]));
        editor.goto_line(3);
        editor.move_to_line_end();
        editor.insert_char(b'!');
        assert!(editor.is_dirty());

        editor.set_lines(lines(&["x", "y"]));
        let once = (
            editor.lines().to_vec(),
            editor.cursor_position(),
            editor.viewport_offset(),
            editor.is_dirty(),
        );
        editor.set_lines(lines(&["x", "y"]));
        let twice = (
            editor.lines().to_vec(),
            editor.cursor_position(),
            editor.viewport_offset(),
            editor.is_dirty(),
        );
        assert_eq!(once, twice);
        assert_eq!(once.1, (0, 0));
        assert_eq!(once.2, (0, 0));
        assert!(!once.3);
    }

    #[test]
    fn test_text_insertion() {
        let mut editor = Editor::new();
        editor.insert_char(b'H');
        editor.insert_char(b'i');
        assert_eq!(editor.get_text(), "Hi");
        assert_eq!(editor.cursor_col(), 2);
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_newline_splits_row_at_cursor() {
        let mut editor = editor_with(&["hello"]);
        editor.set_cursor_position(0, 2);
        editor.insert_newline();
        assert_eq!(editor.lines(), lines(&["he", "llo"]).as_slice());
        assert_eq!(editor.cursor_position(), (1, 0));
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_get_text_and_insert_text_round_trip() {
        let editor = editor_with(&["ab", "cd"]);
        let text = editor.get_text();
        assert_eq!(text, "ab\ncd");

        let mut fresh = Editor::new();
        fresh.insert_text(&text);
        assert_eq!(fresh.lines(), lines(&["ab", "cd"]).as_slice());
        assert_eq!(fresh.cursor_position(), (1, 2));
    }

    #[test]
    fn test_get_bytes_keeps_invalid_utf8() {
        let mut editor = Editor::new();
        editor.set_lines(vec![b"\xff\xfe".to_vec(), b"x".to_vec()]);
        assert_eq!(editor.get_bytes(), b"\xff\xfe\nx".to_vec());
        assert_eq!(editor.get_text(), "\u{fffd}\u{fffd}\nx");
    }

    #[test]
    fn test_backspace_within_row() {
        let mut editor = Editor::new();
        editor.insert_text("Hi");
        editor.delete_char_back();
        assert_eq!(editor.get_text(), "H");
        assert_eq!(editor.cursor_col(), 1);
    }

    #[test]
    fn test_backspace_joins_previous_row() {
        let mut editor = editor_with(&["abc", "de"]);
        editor.set_cursor_position(1, 0);
        editor.delete_char_back();
        assert_eq!(editor.lines(), lines(&["abcde"]).as_slice());
        assert_eq!(editor.cursor_position(), (0, 3));
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_backspace_at_document_start_is_noop() {
        let mut editor = editor_with(&["abc"]);
        editor.delete_char_back();
        assert_eq!(editor.lines(), lines(&["abc"]).as_slice());
        assert_eq!(editor.cursor_position(), (0, 0));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_delete_forward_joins_next_row() {
        let mut editor = editor_with(&["ab", "cd"]);
        editor.move_to_line_end();
        editor.delete_char_fwd();
        assert_eq!(editor.lines(), lines(&["abcd"]).as_slice());
        assert_eq!(editor.cursor_position(), (0, 2));
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_delete_forward_at_document_end_is_noop() {
        let mut editor = editor_with(&["ab", "cd"]);
        editor.set_cursor_position(1, 2);
        editor.delete_char_fwd();
        assert_eq!(editor.lines(), lines(&["ab", "cd"]).as_slice());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_horizontal_movement_wraps_rows() {
        let mut editor = editor_with(&["ab", "c"]);
        editor.move_to_line_end();
        editor.move_cursor_right();
        assert_eq!(editor.cursor_position(), (1, 0));
        editor.move_cursor_left();
        assert_eq!(editor.cursor_position(), (0, 2));

        editor.set_cursor_position(0, 0);
        editor.move_cursor_left();
        assert_eq!(editor.cursor_position(), (0, 0));
        editor.set_cursor_position(1, 1);
        editor.move_cursor_right();
        assert_eq!(editor.cursor_position(), (1, 1));
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut editor = editor_with(&["a long line", "ab", "another long line"]);
        editor.move_to_line_end();
        editor.move_cursor_down();
        assert_eq!(editor.cursor_position(), (1, 2));
        editor.move_cursor_down();
        assert_eq!(editor.cursor_position(), (2, 2));
        editor.move_cursor_down();
        assert_eq!(editor.cursor_position(), (2, 2));
    }

    #[test]
    fn test_goto_line_clamps() {
        let mut editor = editor_with(&["1", "2", "3"]);
        editor.goto_line(0);
        assert_eq!(editor.cursor_position(), (0, 0));
        editor.goto_line(2);
        assert_eq!(editor.cursor_position(), (1, 0));
        editor.goto_line(99);
        assert_eq!(editor.cursor_position(), (2, 0));
    }

    #[test]
    fn test_viewport_follows_cursor_with_minimal_motion() {
        let rows: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
        let mut editor = Editor::with_size(5, 80);
        editor.set_lines(rows.iter().map(|r| r.as_bytes().to_vec()).collect());

        for _ in 0..6 {
            editor.move_cursor_down();
        }
        assert_eq!(editor.cursor_row(), 6);
        assert_eq!(editor.viewport_offset().0, 2);

        editor.move_cursor_up();
        assert_eq!(editor.viewport_offset().0, 2);
        for _ in 0..4 {
            editor.move_cursor_up();
        }
        assert_eq!(editor.cursor_row(), 1);
        assert_eq!(editor.viewport_offset().0, 1);
        assert_invariants(&editor);
    }

    #[test]
    fn test_horizontal_scroll() {
        let mut editor = Editor::with_size(3, 4);
        editor.insert_text("abcdefgh");
        assert_eq!(editor.viewport_offset(), (0, 5));
        assert_eq!(editor.visible_lines(), vec![&b"fgh"[..]]);
        editor.move_to_line_start();
        assert_eq!(editor.viewport_offset(), (0, 0));
        assert_invariants(&editor);
    }

    #[test]
    fn test_page_navigation() {
        let rows: Vec<Line> = (0..30).map(|i| vec![b'a'; i % 7]).collect();
        let mut editor = Editor::with_size(10, 80);
        editor.set_lines(rows);
        editor.page_down();
        assert_eq!(editor.cursor_row(), 9);
        editor.page_down();
        editor.page_down();
        editor.page_down();
        assert_eq!(editor.cursor_row(), 29);
        assert_invariants(&editor);
        editor.page_up();
        assert_eq!(editor.cursor_row(), 20);
        assert_invariants(&editor);
    }

    #[test]
    fn test_resize_keeps_cursor_visible() {
        let rows: Vec<Line> = (0..50).map(|_| b"text".to_vec()).collect();
        let mut editor = Editor::with_size(40, 80);
        editor.set_lines(rows);
        editor.goto_line(35);
        editor.resize(10, 2);
        assert_invariants(&editor);
        editor.resize(0, 0);
        assert_eq!(editor.viewport_size(), (1, 1));
        assert_invariants(&editor);
    }

    #[test]
    fn test_handle_key_dispatch() {
        let mut editor = Editor::new();
        editor.set_tab_width(2);
        assert!(editor.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)));
        assert!(editor.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
        assert!(editor.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(editor.handle_key(KeyEvent::new(KeyCode::Char('é'), KeyModifiers::NONE)));
        assert!(!editor.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(!editor.handle_key(KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE)));

        assert_eq!(editor.lines()[0], b"x  ".to_vec());
        assert_eq!(editor.lines()[1], "é".as_bytes().to_vec());
        assert_eq!(editor.cursor_position(), (1, 2));
    }

    #[test]
    fn test_invariants_hold_over_mixed_edits() {
        let mut editor = Editor::with_size(3, 5);
        let script = "hello\nworld\n\nthis is a long row\nx";
        editor.insert_text(script);
        assert_invariants(&editor);

        let ops: [fn(&mut Editor); 10] = [
            Editor::move_cursor_up,
            Editor::move_cursor_left,
            Editor::delete_char_back,
            Editor::move_cursor_down,
            Editor::delete_char_fwd,
            Editor::page_up,
            Editor::move_to_line_end,
            Editor::insert_newline,
            Editor::page_down,
            Editor::move_cursor_right,
        ];
        for round in 0..40 {
            ops[round % ops.len()](&mut editor);
            assert_invariants(&editor);
        }
    }
}
