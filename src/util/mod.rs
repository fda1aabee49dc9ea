pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Route segment to note id. Falls back to the raw segment when it is not
/// valid percent-encoding.
pub(crate) fn decode_note_id(raw: &str) -> String {
    let raw = raw.trim();
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Format a snapshot time for the save status line.
pub(crate) fn format_saved_at(ms: i64) -> String {
    let d = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(ms as f64));
    format!(
        "{:02}:{:02}:{:02}",
        d.get_hours(),
        d.get_minutes(),
        d.get_seconds()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_note_id() {
        assert_eq!(decode_note_id("shopping%20list"), "shopping list");
        assert_eq!(decode_note_id(" plain "), "plain");
        assert_eq!(decode_note_id("%E2%9C%93"), "\u{2713}");
    }
}
