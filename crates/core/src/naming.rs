//! Slug generation for organization URLs.

/// Lowercase ASCII alphanumerics joined by single dashes.
///
/// Returns `"org"` when nothing usable remains so a slug is never empty.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("org");
    }
    slug
}

/// Append a six-character random suffix, used after a slug collision.
pub fn with_random_suffix(slug: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{slug}-{}", &id[..6])
}
