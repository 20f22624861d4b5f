//! Natural-language app requests.
//!
//! Extracts the requested app name from chat text such as
//! "make me the app todo list".

use std::sync::OnceLock;

use regex::Regex;

/// Phrasings recognized as app requests, in priority order.
const APP_NAME_PATTERNS: [&str; 4] = [
    r"(?i)make me the app (.+)",
    r"(?i)create app (.+)",
    r"(?i)build me (.+) app",
    r"(?i)i want (.+) app",
];

/// Substrings that mark a message as an app request even when no name
/// can be extracted from it.
const TRIGGER_PHRASES: [&str; 2] = ["make me the app", "create app"];

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        APP_NAME_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("app name pattern is valid"))
            .collect()
    })
}

/// Extracts an app name from a chat message.
///
/// The first pattern that matches wins; its capture is trimmed and
/// returned as-is. Returns `None` when nothing matches or the capture is
/// blank.
pub fn extract_app_name(message: &str) -> Option<String> {
    patterns().iter().find_map(|re| {
        re.captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|name| !name.is_empty())
    })
}

/// Whether a message asks for a new app.
///
/// True when the message contains a trigger phrase or any pattern
/// yields a name.
pub fn is_app_request(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRIGGER_PHRASES.iter().any(|p| lower.contains(p)) || extract_app_name(message).is_some()
}
