/// Collapses whitespace runs to single spaces and trims both ends.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = false;
    for ch in s.chars() {
        let is_space = ch.is_whitespace();
        if is_space {
            if !last_space { out.push(' '); }
        } else {
            out.push(ch);
        }
        last_space = is_space;
    }
    out.trim().to_string()
}

/// Description for an element nobody selected text in: its text, cut at the
/// last word or sentence boundary within `max_chars` and suffixed with `…`.
/// Text that already fits is returned whole.
pub fn make_excerpt(text: &str, max_chars: usize) -> String {
    let text = normalize_ws(text);
    if text.chars().count() <= max_chars { return text; }
    let end = byte_index_of_char(&text, max_chars);
    let window = &text[..end];
    let cut = if text[end..].starts_with(' ') {
        window
    } else {
        match window.rfind(' ') {
            Some(pos) if pos > 0 => &window[..pos],
            _ => window,
        }
    };
    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '.' | '!' | '?' | '-'));
    format!("{}\u{2026}", cut)
}

fn byte_index_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
