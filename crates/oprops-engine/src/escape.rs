//! Escaping rules of the `.properties` text grammar.

/// Escape a key for output. Every space is escaped.
pub fn escape_key(key: &str, escape_unicode: bool) -> String {
    escape(key, true, escape_unicode)
}

/// Escape a value for output. Only a leading space is escaped.
pub fn escape_value(value: &str, escape_unicode: bool) -> String {
    escape(value, false, escape_unicode)
}

fn escape(s: &str, escape_space: bool, escape_unicode: bool) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' if i == 0 || escape_space => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if escape_unicode && !(' '..='~').contains(&c) => push_unicode_escape(&mut out, c),
            c => out.push(c),
        }
    }
    out
}

/// Append `c` as one `\uXXXX` escape per UTF-16 unit.
pub(crate) fn push_unicode_escape(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{unit:04X}"));
    }
}

/// Resolve escapes in a key or value segment.
///
/// `\t`, `\n`, `\r`, `\f` and `\uXXXX` have their usual meaning; any other
/// escaped character stands for itself. A trailing lone backslash is
/// dropped. Surrogate pairs written as two `\u` escapes are combined.
pub fn unescape(segment: &[char]) -> Result<String, String> {
    let mut out = String::with_capacity(segment.len());
    let mut i = 0;
    while i < segment.len() {
        let c = segment[i];
        i += 1;
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&escaped) = segment.get(i) else {
            break;
        };
        i += 1;
        match escaped {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\u{c}'),
            'u' => {
                let unit = read_hex4(segment, i)?;
                i += 4;
                if (0xD800..0xDC00).contains(&unit) {
                    let low = match segment.get(i..i + 2) {
                        Some(['\\', 'u']) => read_hex4(segment, i + 2)?,
                        _ => return Err("unpaired high surrogate in \\uxxxx escape".into()),
                    };
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err("unpaired high surrogate in \\uxxxx escape".into());
                    }
                    i += 6;
                    let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    out.push(char::from_u32(code).ok_or("invalid surrogate pair")?);
                } else {
                    let c = char::from_u32(u32::from(unit))
                        .ok_or("unpaired low surrogate in \\uxxxx escape")?;
                    out.push(c);
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn read_hex4(segment: &[char], start: usize) -> Result<u16, String> {
    let digits = segment
        .get(start..start + 4)
        .ok_or("malformed \\uxxxx encoding: fewer than four hex digits")?;
    let mut value = 0u16;
    for d in digits {
        let v = d
            .to_digit(16)
            .ok_or_else(|| format!("malformed \\uxxxx encoding: {d:?} is not a hex digit"))?;
        value = (value << 4) | v as u16;
    }
    Ok(value)
}
