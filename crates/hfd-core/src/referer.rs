//! # Referer Hint
//!
//! A bare asset request (`/apps/style.css`) does not say which application
//! it belongs to. The referring page usually does: a document served at
//! `/apps/foo/` that loads `./style.css` sends `Referer: .../apps/foo/`.
//!
//! The hint only picks which application directory to look in. It is
//! client-controlled and is never used for authorization.

use std::sync::OnceLock;

use regex::Regex;

use crate::name::AppName;

static PRIMARY: OnceLock<Regex> = OnceLock::new();
static FALLBACK: OnceLock<Regex> = OnceLock::new();

/// `/apps/<segment>/`: the referring page lives inside an application.
fn primary_pattern() -> &'static Regex {
    PRIMARY.get_or_init(|| Regex::new(r"/apps/([^/?#]+)/").expect("primary pattern is valid"))
}

/// `/apps/<segment>` at the end of the path or before a query string.
fn fallback_pattern() -> &'static Regex {
    FALLBACK.get_or_init(|| Regex::new(r"/apps/([^/?#]+)").expect("fallback pattern is valid"))
}

/// Extract the owning application name from a Referer header value.
///
/// The first match of the primary pattern wins. The looser pattern is only
/// consulted when the primary one does not match at all. A captured segment
/// that is not a valid application name yields `None`.
pub fn app_from_referer(referer: &str) -> Option<AppName> {
    let caps = primary_pattern()
        .captures(referer)
        .or_else(|| fallback_pattern().captures(referer))?;
    AppName::parse(&caps[1]).ok()
}
