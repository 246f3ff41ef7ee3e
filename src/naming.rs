//! Filename normalization
//!
//! Maps user-supplied filenames to storage keys and public slugs:
//!
//! - `My Report.html` -> key `My-Report.html`, slug `My-Report`
//! - `notes.txt` -> key `notes.html`, slug `notes`
//! - `../dir/index.HTML` -> key `index.html`, slug `index`
//!
//! Normalization never fails. An empty or unusable name becomes the key
//! `.html` with an empty slug, and a name made only of dots keeps a slug
//! (`.`, `..`) that no URL can address; callers check
//! [`StorageKey::is_malformed`].

use std::fmt;

use serde::Serialize;

/// Suffix every storage key ends with
pub const HTML_SUFFIX: &str = ".html";

/// Path prefix pages are served under
pub const PUBLIC_PREFIX: &str = "/up/";

/// Normalized storage key, always ending in lowercase `.html`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key for a slug, the inverse of [`StorageKey::slug`]
    pub fn from_slug(slug: &str) -> Self {
        Self(format!("{}{}", slug, HTML_SUFFIX))
    }

    /// Public slug (key without `.html`)
    pub fn slug(&self) -> &str {
        slug_of(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nothing addressable survived normalization: the slug is empty or a
    /// dot segment
    pub fn is_malformed(&self) -> bool {
        self.slug().chars().all(|c| c == '.')
    }

    /// Key with a numeric suffix before `.html` (`a.html` -> `a-2.html`)
    pub fn with_counter(&self, n: u32) -> Self {
        Self::from_slug(&format!("{}-{}", self.slug(), n))
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a raw filename into a storage key
pub fn normalize(raw_name: &str) -> StorageKey {
    // Single path segment only
    let segment = raw_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let mut name = String::with_capacity(segment.len() + HTML_SUFFIX.len());
    let mut pending_hyphen = false;
    for c in segment.trim().chars() {
        if is_safe(c) {
            if pending_hyphen {
                name.push('-');
                pending_hyphen = false;
            }
            name.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if has_html_suffix(&name) {
        name.truncate(name.len() - HTML_SUFFIX.len());
    } else if let Some(dot) = name.rfind('.').filter(|&i| i > 0) {
        name.truncate(dot);
    }
    name.push_str(HTML_SUFFIX);

    StorageKey(name)
}

/// Strip the trailing `.html` from a key
pub fn slug_of(key: &str) -> &str {
    key.strip_suffix(HTML_SUFFIX).unwrap_or(key)
}

/// Public URL of a page (`/up/<slug>`)
pub fn public_url(slug: &str) -> String {
    format!("{}{}", PUBLIC_PREFIX, urlencoding::encode(slug))
}

/// Whether a requested slug is in normalized form
///
/// Only such slugs can have been produced by an upload, anything else is
/// answered with "not found" before the store is consulted.
pub fn is_canonical_slug(slug: &str) -> bool {
    let key = StorageKey::from_slug(slug);
    !key.is_malformed() && normalize(key.as_str()) == key
}

fn is_safe(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn has_html_suffix(name: &str) -> bool {
    name.len() >= HTML_SUFFIX.len()
        && name.is_char_boundary(name.len() - HTML_SUFFIX.len())
        && name[name.len() - HTML_SUFFIX.len()..].eq_ignore_ascii_case(HTML_SUFFIX)
}

/// Logical collection all pages live under (`uploads/<key>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim_matches('/').to_string())
    }

    /// Full object path for a key
    pub fn object_path(&self, key: &StorageKey) -> String {
        if self.0.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.0, key)
        }
    }

    /// Prefix passed to `list`
    pub fn list_prefix(&self) -> String {
        if self.0.is_empty() {
            String::new()
        } else {
            format!("{}/", self.0)
        }
    }

    /// Key of an object directly under this namespace
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(&self.list_prefix())?;
        (!rest.is_empty() && !rest.contains('/')).then_some(rest)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace_and_extension() {
        assert_eq!(normalize("My Report.html").as_str(), "My-Report.html");
        assert_eq!(normalize("notes.txt").as_str(), "notes.html");
        assert_eq!(normalize("a  \t b.html").as_str(), "a-b.html");
        assert_eq!(normalize("  padded.html  ").as_str(), "padded.html");
    }

    #[test]
    fn test_normalize_case_insensitive_suffix() {
        assert_eq!(normalize("Index.HTML").as_str(), "Index.html");
        assert_eq!(normalize("page.Html").slug(), "page");
    }

    #[test]
    fn test_normalize_single_segment() {
        assert_eq!(normalize("../../etc/passwd").as_str(), "passwd.html");
        assert_eq!(normalize("C:\\Users\\me\\site.html").as_str(), "site.html");
    }

    #[test]
    fn test_normalize_unsafe_characters() {
        assert_eq!(normalize("what?#now.html").as_str(), "what-now.html");
        assert_eq!(normalize("100% done.html").as_str(), "100-done.html");
        assert_eq!(normalize("café menu.html").as_str(), "café-menu.html");
    }

    #[test]
    fn test_normalize_dotfiles_and_multiple_dots() {
        assert_eq!(normalize(".hidden").as_str(), ".hidden.html");
        assert_eq!(normalize("archive.tar.gz").as_str(), "archive.tar.html");
        assert_eq!(normalize("v1.2.html").as_str(), "v1.2.html");
    }

    #[test]
    fn test_normalize_empty_is_malformed() {
        let key = normalize("");
        assert_eq!(key.as_str(), ".html");
        assert_eq!(key.slug(), "");
        assert!(key.is_malformed());

        assert!(normalize("   ").is_malformed());
        assert!(normalize("dir/").is_malformed());
        assert!(!normalize("x").is_malformed());

        // Dot segments are collapsed by every URL client
        assert_eq!(normalize("..html").slug(), ".");
        assert!(normalize("..html").is_malformed());
        assert!(normalize("...html").is_malformed());
        assert!(!normalize(".hidden").is_malformed());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "My Report.html",
            "notes.txt",
            "",
            "a b c",
            ".hidden",
            "UPPER.HTML",
            "x.y.z",
            "weird  ?? name .htm",
            "trailing-",
        ];

        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(once.as_str()), once, "input {:?}", input);
            let rebuilt = StorageKey::from_slug(once.slug());
            assert_eq!(normalize(rebuilt.as_str()), once, "slug of {:?}", input);
        }
    }

    #[test]
    fn test_slug_round_trip() {
        for input in ["My Report.html", "notes.txt", "a.b.html", ".hidden"] {
            let key = normalize(input);
            assert_eq!(StorageKey::from_slug(key.slug()), key);
        }
    }

    #[test]
    fn test_canonical_slug() {
        assert!(is_canonical_slug("My-Report"));
        assert!(is_canonical_slug("v1.2"));
        assert!(!is_canonical_slug("My Report"));
        assert!(!is_canonical_slug("../secret"));
        assert!(!is_canonical_slug(""));
        assert!(!is_canonical_slug("."));
        assert!(!is_canonical_slug(".."));
    }

    #[test]
    fn test_public_url() {
        assert_eq!(public_url("My-Report"), "/up/My-Report");
        assert_eq!(public_url("café"), "/up/caf%C3%A9");
    }

    #[test]
    fn test_with_counter() {
        let key = normalize("a.html");
        assert_eq!(key.with_counter(2).as_str(), "a-2.html");
    }

    #[test]
    fn test_namespace_paths() {
        let ns = Namespace::new("/uploads/");
        let key = normalize("page.html");

        assert_eq!(ns.object_path(&key), "uploads/page.html");
        assert_eq!(ns.list_prefix(), "uploads/");
        assert_eq!(ns.strip("uploads/page.html"), Some("page.html"));
        assert_eq!(ns.strip("uploads/nested/page.html"), None);
        assert_eq!(ns.strip("other/page.html"), None);
        assert_eq!(ns.strip("uploads/"), None);
    }
}
