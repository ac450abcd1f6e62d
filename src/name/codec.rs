//! Conversion between logical names and filesystem-safe folder names.
//!
//! Encoding keeps as much of the name readable as possible: ASCII letters,
//! digits, space and a punctuation set accepted by every major filesystem
//! pass through verbatim. Everything else becomes `%XX` escapes of its UTF-8
//! bytes. Windows forbids `\ / : * ? " < > |`, none of which are in the set.
//!
//! Decoding is total. Folder names created by hand (or by other tools) decode
//! to something sensible even if they contain stray `%` characters.

use super::LogicalName;

/// Punctuation treated as safe on every supported platform.
const SAFE_PUNCTUATION: &str = " ()[]{}'&^$#@!`~;.+=-_,";

/// Returns true if `c` is emitted verbatim by [`encode`].
pub fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || SAFE_PUNCTUATION.contains(c)
}

/// Encode a name's original spelling into a folder name.
pub fn encode(name: &LogicalName) -> String {
    let original = name.original();
    let mut out = String::with_capacity(original.len());
    let mut utf8 = [0u8; 4];

    for c in original.chars() {
        if is_safe_char(c) {
            out.push(c);
        } else {
            for byte in c.encode_utf8(&mut utf8).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }

    out
}

/// Decode a folder name into a logical name.
pub fn decode(filename: &str) -> LogicalName {
    if !filename.contains('%') {
        return LogicalName::new(filename);
    }

    let bytes = filename.as_bytes();
    let mut out = String::with_capacity(filename.len());
    // Raw bytes from consecutive escapes; multi-byte sequences span escapes
    let mut pending: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(byte) = hex_pair(bytes, i + 1) {
                pending.push(byte);
                i += 3;
                continue;
            }
            flush(&mut pending, &mut out);
            out.push('%');
            i += 1;
            continue;
        }

        flush(&mut pending, &mut out);

        // `i` is always on a char boundary here: escapes consume ASCII only
        let rest = &filename[i..];
        if let Some(c) = rest.chars().next() {
            out.push(c);
            i += c.len_utf8();
        } else {
            break;
        }
    }

    flush(&mut pending, &mut out);
    LogicalName::new(out)
}

fn hex_pair(bytes: &[u8], at: usize) -> Option<u8> {
    let hi = hex_value(*bytes.get(at)?)?;
    let lo = hex_value(*bytes.get(at + 1)?)?;
    Some((hi << 4) | lo)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn flush(pending: &mut Vec<u8>, out: &mut String) {
    if pending.is_empty() {
        return;
    }
    out.push_str(&String::from_utf8_lossy(pending));
    pending.clear();
}
