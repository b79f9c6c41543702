use crate::editor::Editor;

/// Parameters collected by the find/replace prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindReplace {
    pub needle: String,
    pub replacement: String,
    pub case_sensitive: bool,
    pub replace_all: bool,
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.len() > haystack.len() - from {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

impl Editor {
    /// Replace occurrences of `needle` and return how many were replaced.
    ///
    /// Matching is case-insensitive when `case_sensitive` is false (ASCII
    /// folding of both sides), but the replacement is always inserted
    /// verbatim. Scanning resumes after each inserted replacement, so a
    /// replacement containing the needle is never rescanned. A single
    /// replacement leaves the cursor on it; replacing all moves the cursor
    /// back to the origin.
    pub fn find_replace(
        &mut self,
        needle: &str,
        replacement: &str,
        case_sensitive: bool,
        replace_all: bool,
    ) -> usize {
        if needle.is_empty() {
            return 0;
        }

        let needle = if case_sensitive {
            needle.as_bytes().to_vec()
        } else {
            needle.as_bytes().to_ascii_lowercase()
        };
        let replacement = replacement.as_bytes();
        let mut count = 0;

        for row in 0..self.lines.len() {
            let mut pos = 0;
            loop {
                let found = if case_sensitive {
                    find_from(&self.lines[row], &needle, pos)
                } else {
                    let folded = self.lines[row].to_ascii_lowercase();
                    find_from(&folded, &needle, pos)
                };
                let Some(start) = found else {
                    break;
                };

                self.lines[row].splice(start..start + needle.len(), replacement.iter().copied());
                pos = start + replacement.len();
                count += 1;
                self.set_dirty(true);

                if !replace_all {
                    self.set_cursor_position(row, start);
                    return count;
                }
            }
        }

        if count > 0 {
            self.set_cursor_position(0, 0);
        }
        count
    }

    pub fn apply_find_replace(&mut self, params: &FindReplace) -> usize {
        self.find_replace(
            &params.needle,
            &params.replacement,
            params.case_sensitive,
            params.replace_all,
        )
    }
}
