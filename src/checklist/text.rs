/// Zero-width space kept inside an otherwise empty text span so the caret has
/// something to anchor to.
pub(crate) const PLACEHOLDER: char = '\u{200B}';
pub(crate) const PLACEHOLDER_STR: &str = "\u{200B}";

/// Text with every placeholder removed. Whitespace is kept.
pub(crate) fn strip_placeholders(raw: &str) -> String {
    raw.chars().filter(|c| *c != PLACEHOLDER).collect()
}

/// Canonical comparison form of an item's text: placeholders removed, trimmed.
pub fn clean_text(raw: &str) -> String {
    strip_placeholders(raw).trim().to_string()
}

pub(crate) fn is_blank(text: &str) -> bool {
    clean_text(text).is_empty()
}

/// What a text span actually renders for `text`.
pub(crate) fn display_text(text: &str) -> &str {
    if text.is_empty() {
        PLACEHOLDER_STR
    } else {
        text
    }
}

pub(crate) fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

pub(crate) fn utf16_to_byte_idx(s: &str, pos_utf16: u32) -> usize {
    if pos_utf16 == 0 {
        return 0;
    }
    let mut acc: u32 = 0;
    for (i, ch) in s.char_indices() {
        let w = ch.len_utf16() as u32;
        if acc + w > pos_utf16 {
            return i;
        }
        acc += w;
        if acc == pos_utf16 {
            return i + ch.len_utf8();
        }
    }
    s.len()
}

/// Raw UTF-16 offset in `raw` where the first `clean` placeholder-free units
/// end. `Err` carries how many clean units `raw` holds when it is too short.
pub(crate) fn clean_to_raw_utf16(raw: &str, clean: u32) -> Result<u32, u32> {
    let mut raw_pos: u32 = 0;
    let mut seen: u32 = 0;
    for ch in raw.chars() {
        if seen >= clean {
            return Ok(raw_pos);
        }
        let w = ch.len_utf16() as u32;
        if ch != PLACEHOLDER {
            seen += w;
        }
        raw_pos += w;
    }
    if seen >= clean {
        Ok(raw_pos)
    } else {
        Err(seen)
    }
}

/// Split `s` at a UTF-16 offset, clamped to the string length.
pub(crate) fn split_at_utf16(s: &str, pos_utf16: u32) -> (String, String) {
    let idx = utf16_to_byte_idx(s, pos_utf16);
    (s[..idx].to_string(), s[idx..].to_string())
}
