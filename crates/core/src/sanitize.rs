//! Hides provider identifiers in answers shown to end users

use std::sync::LazyLock;

use regex::Regex;

const NEUTRAL_TERM: &str = "doctor";

static PROVIDER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"provider id \d+").expect("provider id pattern is valid"));

/// Replaced in this order. A phrase must come before any shorter phrase it contains.
const PROVIDER_PHRASES: [&str; 6] = [
    "attending_provider_id",
    "attending provider id",
    "attending provider",
    "provider_id",
    "provider id",
    "provider",
];

/// Rewrite provider-identifying terms in an LLM answer to "doctor".
pub fn sanitize_answer(answer: &str) -> String {
    let mut text = PROVIDER_ID_PATTERN
        .replace_all(answer, NEUTRAL_TERM)
        .into_owned();

    for phrase in PROVIDER_PHRASES {
        if text.contains(phrase) {
            text = text.replace(phrase, NEUTRAL_TERM);
        }
    }

    text
}
