use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{csv, html};

/// On-disk representation chosen for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FileFormat {
    #[default]
    Txt,
    Md,
    Html,
    Csv,
}

impl FileFormat {
    pub const ALL: [FileFormat; 4] = [
        FileFormat::Txt,
        FileFormat::Md,
        FileFormat::Html,
        FileFormat::Csv,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Txt => "txt",
            FileFormat::Md => "md",
            FileFormat::Html => "html",
            FileFormat::Csv => "csv",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileFormat::Txt => "TXT  - Plain text (.txt)",
            FileFormat::Md => "MD   - Markdown (.md)",
            FileFormat::Html => "HTML - Web page (.html)",
            FileFormat::Csv => "CSV  - Comma separated values (.csv)",
        }
    }
}

/// Infer the format from the file extension. Unknown or missing
/// extensions are treated as plain text.
pub fn detect_format(path: impl AsRef<Path>) -> FileFormat {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("md") | Some("markdown") => FileFormat::Md,
        Some("html") | Some("htm") => FileFormat::Html,
        Some("csv") => FileFormat::Csv,
        _ => FileFormat::Txt,
    }
}

/// Split raw file content into lines.
///
/// A trailing `\r` is stripped from every line, a final newline does not
/// produce an extra empty line, and empty input yields one empty line.
pub fn decode(bytes: &[u8]) -> Vec<Vec<u8>> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    if body.is_empty() {
        return vec![Vec::new()];
    }

    body.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect()
}

/// Serialise lines in the requested format.
pub fn encode(lines: &[Vec<u8>], format: FileFormat) -> Vec<u8> {
    match format {
        FileFormat::Txt | FileFormat::Md => lines.join(&b'\n'),
        FileFormat::Html => html::render_document(lines),
        FileFormat::Csv => csv::render_rows(lines),
    }
}
