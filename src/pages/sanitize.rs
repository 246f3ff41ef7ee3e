//! HTML sanitization
//!
//! Pages are rendered exactly as uploaded unless a sanitizer other than
//! [`Passthrough`] is configured. Choosing one is a trust decision about who
//! may upload.
//!
//! Uses lol_html for efficient streaming HTML processing.

use std::str::FromStr;
use std::sync::Arc;

use lol_html::{element, rewrite_str, RewriteStrSettings};
use serde::{Deserialize, Serialize};

use super::types::SanitizeError;

/// Transforms page HTML before it is served
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> Result<String, SanitizeError>;
}

/// Serves content verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Sanitizer for Passthrough {
    fn sanitize(&self, html: &str) -> Result<String, SanitizeError> {
        Ok(html.to_string())
    }
}

/// Removes active content: scripts, embedded frames, inline event handlers
/// and `javascript:` URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptStripper;

impl Sanitizer for ScriptStripper {
    fn sanitize(&self, html: &str) -> Result<String, SanitizeError> {
        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!("script", |el| {
                        el.remove();
                        Ok(())
                    }),
                    element!("iframe", |el| {
                        el.remove();
                        Ok(())
                    }),
                    element!("object", |el| {
                        el.remove();
                        Ok(())
                    }),
                    element!("embed", |el| {
                        el.remove();
                        Ok(())
                    }),
                    element!("*", |el| {
                        let handlers: Vec<String> = el
                            .attributes()
                            .iter()
                            .map(|attr| attr.name())
                            .filter(|name| name.starts_with("on"))
                            .collect();
                        for name in handlers {
                            el.remove_attribute(&name);
                        }

                        for attr in ["href", "src", "action", "formaction"] {
                            if let Some(value) = el.get_attribute(attr) {
                                if value.trim().to_lowercase().starts_with("javascript:") {
                                    el.remove_attribute(attr);
                                }
                            }
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| SanitizeError::Rewrite(e.to_string()))
    }
}

/// Configurable sanitizer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SanitizerKind {
    #[default]
    None,
    StripScripts,
}

impl SanitizerKind {
    pub fn build(self) -> Arc<dyn Sanitizer> {
        match self {
            SanitizerKind::None => Arc::new(Passthrough),
            SanitizerKind::StripScripts => Arc::new(ScriptStripper),
        }
    }
}

impl FromStr for SanitizerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(SanitizerKind::None),
            "strip-scripts" => Ok(SanitizerKind::StripScripts),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_is_identity() {
        let html = "<p onclick=\"x()\">Hi</p><script>alert(1)</script>";
        assert_eq!(Passthrough.sanitize(html).unwrap(), html);
    }

    #[test]
    fn test_script_removal() {
        let html = "<p>Hello</p><script>alert('xss')</script><p>World</p>";
        let result = ScriptStripper.sanitize(html).unwrap();

        assert!(!result.contains("script"));
        assert!(result.contains("Hello"));
        assert!(result.contains("World"));
    }

    #[test]
    fn test_event_handlers_removed() {
        let html = r#"<body onload="boot()"><p onmouseenter="x()" class="keep">Hello</p></body>"#;
        let result = ScriptStripper.sanitize(html).unwrap();

        assert!(!result.contains("onload"));
        assert!(!result.contains("onmouseenter"));
        assert!(result.contains(r#"class="keep""#));
    }

    #[test]
    fn test_javascript_urls_removed() {
        let html = r#"<a href=" JavaScript:alert(1)">x</a><a href="/up/ok">ok</a>"#;
        let result = ScriptStripper.sanitize(html).unwrap();

        assert!(!result.to_lowercase().contains("javascript:"));
        assert!(result.contains(r#"href="/up/ok""#));
    }

    #[test]
    fn test_styles_are_kept() {
        let html = "<style>p { color: red; }</style><p>red</p>";
        assert_eq!(ScriptStripper.sanitize(html).unwrap(), html);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("strip-scripts".parse::<SanitizerKind>(), Ok(SanitizerKind::StripScripts));
        assert_eq!("none".parse::<SanitizerKind>(), Ok(SanitizerKind::None));
        assert!("aggressive".parse::<SanitizerKind>().is_err());
    }
}
