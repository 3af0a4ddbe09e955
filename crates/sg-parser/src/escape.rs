/// Encodes text for a double-quoted operand. Commas are hex-escaped because the
/// assembler splits operands on them without regard to quoting.
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\x2c"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\x0a"),
            '\r' => escaped.push_str("\\x0d"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn quote_literal(text: &str) -> String {
    format!("\"{}\"", escape_literal(text))
}

/// Decodes the body of a quoted operand (without the surrounding quotes).
/// Unknown escapes are kept verbatim.
pub fn unescape_literal(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        match chars.peek().map(|(_, next)| *next) {
            Some('\\') | Some('"') => {
                let (_, next) = chars.next().expect("peeked escape char");
                decoded.push(next);
            }
            Some('x') => {
                let hex = raw.get(index + 2..index + 4);
                let byte = hex
                    .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match byte {
                    Some(byte) => {
                        decoded.push(char::from(byte));
                        chars.next();
                        chars.next();
                        chars.next();
                    }
                    None => decoded.push('\\'),
                }
            }
            _ => decoded.push('\\'),
        }
    }

    decoded
}
