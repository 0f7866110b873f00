/// A cleaned, non-blank source line and its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self { number, text: text.into() }
    }
}

/// Drops everything from `//` to end of line and trims the rest.
pub fn strip_comment(raw: &str) -> &str {
    match raw.find("//") {
        Some(p) => raw[..p].trim(),
        None => raw.trim(),
    }
}

/// Splits `text` into cleaned lines, skipping the ones left blank.
pub fn clean(text: &str) -> Vec<SourceLine> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let s = strip_comment(raw);
            (!s.is_empty()).then(|| SourceLine::new(i + 1, s))
        })
        .collect()
}
