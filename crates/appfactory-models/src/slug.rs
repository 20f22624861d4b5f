//! URL-safe identifiers derived from app names.

/// Fallback slug for names without any alphanumeric characters.
const EMPTY_SLUG: &str = "app";

/// Converts an app name into a lowercase, dash-separated slug.
///
/// Runs of anything that is not an ASCII letter or digit collapse into a
/// single `-`, and leading/trailing dashes are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}
