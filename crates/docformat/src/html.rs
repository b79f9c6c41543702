const PROLOGUE: &str = "<!DOCTYPE html>\n<html>\n<head>\n\
<meta charset=\"UTF-8\">\n\
<title>Document</title>\n\
<style>body{font-family:monospace;white-space:pre-wrap;}</style>\n\
</head>\n<body>\n";

const EPILOGUE: &str = "</body>\n</html>\n";

/// Escape the characters that are significant inside HTML text.
pub fn escape(line: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(line.len());
    for &b in line {
        match b {
            b'&' => escaped.extend_from_slice(b"&amp;"),
            b'<' => escaped.extend_from_slice(b"&lt;"),
            b'>' => escaped.extend_from_slice(b"&gt;"),
            b'"' => escaped.extend_from_slice(b"&quot;"),
            _ => escaped.push(b),
        }
    }
    escaped
}

/// Wrap every line in a standalone monospace HTML page.
pub fn render_document(lines: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::from(PROLOGUE.as_bytes());
    for line in lines {
        out.extend(escape(line));
        out.extend_from_slice(b"<br>\n");
    }
    out.extend_from_slice(EPILOGUE.as_bytes());
    out
}
