//! Log Redaction
//!
//! Scrubs bearer tokens, JWTs, e-mail addresses and phone numbers from text
//! before it reaches a log sink. Quote requests and profiles carry customer
//! contact details.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-._~+/]+=*").expect("valid bearer pattern"));
static JWT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"eyJ[A-Za-z0-9_-]{5,}\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+").expect("valid jwt pattern")
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+\d{1,3}[-.\s]?\d[\d\s.-]{7,}\d|\(?\d{3}\)?[-.\s]\d{3}[-.\s]\d{4}").expect("valid phone pattern")
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let out = BEARER_RE.replace_all(input, "[REDACTED_TOKEN]");
    let out = JWT_RE.replace_all(&out, "[REDACTED_TOKEN]");
    let out = EMAIL_RE.replace_all(&out, "[REDACTED_EMAIL]");
    PHONE_RE.replace_all(&out, "[REDACTED_PHONE]").into_owned()
}
