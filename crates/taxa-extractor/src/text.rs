//! Text cleaning and char-boundary-safe slicing

use regex::Regex;

/// Rewrites applied to document text before matching
pub(crate) struct TextCleaner {
    whitespace: Regex,
    per_hour: Regex,
    currency: Regex,
    plan_och_bygg: Regex,
    billing_phrase: Regex,
}

impl TextCleaner {
    pub(crate) fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            per_hour: Regex::new(r"(?i)kr/(?:tim|h)\b")?,
            currency: Regex::new(r"\bSEK\b")?,
            plan_och_bygg: Regex::new(r"(?i)plan-\s*och\s*bygg")?,
            billing_phrase: Regex::new(r"(?i)\bi\s+(förskott|efterhand)")?,
        })
    }

    /// Collapse whitespace and normalize unit, currency and phrase spellings
    pub(crate) fn clean(&self, text: &str) -> String {
        let text = self.whitespace.replace_all(text, " ");
        let text = self.per_hour.replace_all(&text, "kr/timme");
        let text = self.currency.replace_all(&text, "kr");
        let text = self.plan_och_bygg.replace_all(&text, "plan och bygg");
        let text = self.billing_phrase.replace_all(&text, "i $1");
        text.trim().to_string()
    }
}

/// First `max_chars` characters of `text`
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Text around `start..end`, widened by `window` bytes on each side and
/// snapped outwards to char boundaries
pub(crate) fn context(text: &str, start: usize, end: usize, window: usize) -> &str {
    let mut from = start.saturating_sub(window);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = end.saturating_add(window).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_normalizes_units() {
        let cleaner = TextCleaner::new().unwrap();
        assert_eq!(
            cleaner.clean("Timtaxa  1 200\nkr/tim för\tbygglov"),
            "Timtaxa 1 200 kr/timme för bygglov"
        );
        assert_eq!(cleaner.clean("1200 kr/h"), "1200 kr/timme");
        assert_eq!(cleaner.clean("1200 kr/timme"), "1200 kr/timme");
        assert_eq!(cleaner.clean("1 350 SEK"), "1 350 kr");
        assert_eq!(cleaner.clean("Plan- och bygglagen"), "plan och bygglagen");
        assert_eq!(cleaner.clean("betalas i\u{a0} förskott"), "betalas i förskott");
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_chars("åäö", 2), "åä");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_context_snaps_to_char_boundaries() {
        let text = "ööööö 1200 kr ööööö";
        let start = text.find("1200").unwrap();
        let ctx = context(text, start, start + 4, 3);
        assert!(ctx.contains("1200"));
        assert!(ctx.is_char_boundary(0));
        assert_eq!(context(text, 0, text.len(), 500), text);
    }
}
