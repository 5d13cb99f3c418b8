//! URL slugs for articles
//!
//! Slugs are lowercase ASCII words joined by dashes (e.g., `my-article`).
//! They key articles in the store and are what an issue's hidden
//! `<!-- SLUG: ... -->` comments point at.

use thiserror::Error;

/// Titles are cut to this many characters before slugifying
pub const MAX_TITLE_CHARS: usize = 80;

/// Slugs longer than this never validate
pub const MAX_SLUG_LEN: usize = 200;

/// Titles slugifying to fewer characters fall back to the URL
const MIN_TITLE_SLUG_LEN: usize = 5;

const MAX_ATTEMPTS: u32 = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum SlugError {
    #[error("Unable to generate unique slug after {MAX_ATTEMPTS} attempts: {0}")]
    Exhausted(String),

    #[error("Invalid slug '{0}': expected lowercase letters, digits, '-' or '_'")]
    Invalid(String),

    #[error("Invalid issue slug '{0}': expected letters, digits, '-' or '_' (e.g., 2026-W04-tech)")]
    InvalidIssue(String),
}

/// Converts text to a dash separated lowercase ASCII slug
///
/// Every run of characters that are not ASCII letters or digits becomes a
/// single dash; leading and trailing dashes are dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
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

    slug
}

/// Last non-empty path segment of a URL, without scheme, query or fragment
fn last_path_segment(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let path = path.split_once('/').map_or("", |(_, p)| p);
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default()
}

/// Derives the base slug for an article
///
/// Uses the title when it yields at least five characters, otherwise the
/// last URL path segment, then the whole URL, then `untitled`.
pub fn base_slug(title: &str, url: &str) -> String {
    let truncated: String = title.chars().take(MAX_TITLE_CHARS).collect();
    let slug = slugify(&truncated);
    if slug.len() >= MIN_TITLE_SLUG_LEN {
        return slug;
    }

    let from_path = slugify(last_path_segment(url));
    if !from_path.is_empty() {
        return from_path;
    }

    let from_url = slugify(url);
    if !from_url.is_empty() {
        return from_url;
    }

    if !slug.is_empty() {
        return slug;
    }

    "untitled".to_string()
}

/// Appends `-1`, `-2`, ... to `base` until `taken` reports a free slug
pub fn unique_slug<E>(
    base: &str,
    mut taken: impl FnMut(&str) -> Result<bool, E>,
) -> Result<String, E>
where
    E: From<SlugError>,
{
    if !taken(base)? {
        return Ok(base.to_string());
    }

    for counter in 1..=MAX_ATTEMPTS {
        let candidate = format!("{}-{}", base, counter);
        if !taken(&candidate)? {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted(base.to_string()).into())
}

/// Returns true if the slug is well-formed
pub fn is_valid(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return false;
    }

    let bytes = slug.as_bytes();
    let edge_ok = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let inner_ok = |b: &u8| edge_ok(b) || *b == b'-' || *b == b'_';

    bytes.first().is_some_and(edge_ok)
        && bytes.last().is_some_and(edge_ok)
        && bytes.iter().all(inner_ok)
}

/// Validates a slug, returning it on success
pub fn validate(slug: &str) -> Result<&str, SlugError> {
    if is_valid(slug) {
        Ok(slug)
    } else {
        Err(SlugError::Invalid(slug.to_string()))
    }
}

/// Validates an issue slug, returning it on success
///
/// Issue slugs name files in the issues, exports and vault directories, so
/// they are single path components: ASCII letters, digits, `-` and `_`,
/// starting and ending with a letter or digit. Case is kept for the `W` in
/// `2026-W04-tech`.
pub fn validate_issue(slug: &str) -> Result<&str, SlugError> {
    let bytes = slug.as_bytes();
    let edge_ok = |b: &u8| b.is_ascii_alphanumeric();
    let inner_ok = |b: &u8| edge_ok(b) || *b == b'-' || *b == b'_';

    let valid = slug.len() <= MAX_SLUG_LEN
        && bytes.first().is_some_and(edge_ok)
        && bytes.last().is_some_and(edge_ok)
        && bytes.iter().all(inner_ok);

    if valid {
        Ok(slug)
    } else {
        Err(SlugError::InvalidIssue(slug.to_string()))
    }
}
