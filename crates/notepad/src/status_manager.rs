#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub content: String,
    pub message_type: MessageType,
}

impl StatusMessage {
    pub fn new(content: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            content: content.into(),
            message_type,
        }
    }
}

/// What the status line should show on the next draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Message(StatusMessage),
    Position {
        file_name: String,
        dirty: bool,
        /// 1-based line and column.
        row: usize,
        col: usize,
        total_lines: usize,
    },
}

impl StatusLine {
    /// Left and right halves of the position line.
    pub fn position_text(
        file_name: &str,
        dirty: bool,
        row: usize,
        col: usize,
        total_lines: usize,
    ) -> (String, String) {
        let mut left = file_name.to_string();
        if dirty {
            left.push_str(" [*]");
        }
        let right = format!("Ln {row}/{total_lines}  Col {col}  F1:Help");
        (left, right)
    }
}

/// Holds at most one temporary message. A message is shown by exactly one
/// draw and is gone afterwards.
#[derive(Debug, Clone, Default)]
pub struct StatusManager {
    pending: Option<StatusMessage>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.pending = Some(StatusMessage::new(message, MessageType::Info));
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.pending = Some(StatusMessage::new(message, MessageType::Success));
    }

    pub fn set_warning(&mut self, message: impl Into<String>) {
        self.pending = Some(StatusMessage::new(message, MessageType::Warning));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.pending = Some(StatusMessage::new(message, MessageType::Error));
    }

    pub fn has_message(&self) -> bool {
        self.pending.is_some()
    }

    pub fn peek(&self) -> Option<&StatusMessage> {
        self.pending.as_ref()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Decide what this draw shows, consuming any pending message.
    pub fn take_for_draw(
        &mut self,
        file_name: &str,
        dirty: bool,
        cursor: (usize, usize),
        total_lines: usize,
    ) -> StatusLine {
        match self.pending.take() {
            Some(message) => StatusLine::Message(message),
            None => StatusLine::Position {
                file_name: file_name.to_string(),
                dirty,
                row: cursor.0 + 1,
                col: cursor.1 + 1,
                total_lines,
            },
        }
    }
}
