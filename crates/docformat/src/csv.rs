fn needs_quotes(field: &[u8]) -> bool {
    field.iter().any(|&b| matches!(b, b',' | b'"' | b'\n'))
}

/// Quote a single field, doubling embedded quotes, when it contains a
/// separator, a quote or a newline.
pub fn quote_field(field: &[u8]) -> Vec<u8> {
    if !needs_quotes(field) {
        return field.to_vec();
    }

    let mut quoted = Vec::with_capacity(field.len() + 2);
    quoted.push(b'"');
    for &b in field {
        if b == b'"' {
            quoted.push(b'"');
        }
        quoted.push(b);
    }
    quoted.push(b'"');
    quoted
}

/// One row per line, each line being a single column.
pub fn render_rows(lines: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend(quote_field(line));
        out.push(b'\n');
    }
    out
}
