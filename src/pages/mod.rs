//! Page resolution module
//!
//! Turns slugs back into stored HTML:
//! - Slug enumeration from the object store
//! - A known-slug index built according to the resolution strategy
//! - Read URL lookup, content fetch and sanitization per request

mod index;
mod resolver;
mod sanitize;
mod types;

pub use index::PageIndex;
pub use resolver::PageResolver;
pub use sanitize::{Passthrough, Sanitizer, SanitizerKind, ScriptStripper};
pub use types::*;
