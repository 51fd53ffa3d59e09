//! # Root Document Rewriting
//!
//! A directory-form application is served from `/apps/<name>/` instead of
//! the site root, so root-relative references in its `index.html` would
//! point outside the application. [`rewrite_document`] turns those
//! references into document-relative ones (`/x` → `./x`).
//!
//! This is regex substitution over the raw text, not an HTML parse.
//! Malformed markup passes through untouched apart from the targeted
//! substitutions. Callers only depend on the `&str -> String` signature.
//!
//! ## Rules (applied in order)
//!
//! 1. Quoted attribute values starting with `/` (but not `//`), whether the
//!    attribute follows whitespace, `<` or another attribute's closing quote.
//! 2. CSS `url(...)` arguments starting with `/` (but not `//`), quoted or not.
//! 3. `src="/...<ext>"` for common image and font extensions, wherever
//!    the attribute appears.
//!
//! Protocol-relative (`//host/x`) and absolute (`https://host/x`) URLs are
//! never changed, and the whole rewrite is idempotent.

use std::sync::OnceLock;

use regex::{Captures, Regex};

static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
static CSS_URL: OnceLock<Regex> = OnceLock::new();
static ASSET_SRC: OnceLock<Regex> = OnceLock::new();

/// `<ws|<|quote>name = "` or `'` followed by `/`. The match ends on the slash.
fn attribute_pattern() -> &'static Regex {
    ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"[\s<"'][A-Za-z_:][-A-Za-z0-9_:.]*\s*=\s*["']/"#)
            .expect("attribute pattern is valid")
    })
}

/// `url(` with optional whitespace and quote, followed by `/`.
fn css_url_pattern() -> &'static Regex {
    CSS_URL.get_or_init(|| {
        Regex::new(r#"(?i)url\(\s*["']?/"#).expect("css url pattern is valid")
    })
}

fn asset_src_pattern() -> &'static Regex {
    ASSET_SRC.get_or_init(|| {
        Regex::new(
            r#"(?i)(?P<open>\bsrc\s*=\s*)(?P<quote>["'])/(?P<path>[^/"'][^"']*\.(?:png|jpe?g|gif|svg|webp|ico|bmp|avif|woff2?|ttf|otf|eot))(?P<close>["'])"#,
        )
        .expect("asset src pattern is valid")
    })
}

/// Rewrite root-relative URLs in a root document to document-relative URLs.
pub fn rewrite_document(html: &str) -> String {
    let attributes = rewrite_leading_slash(attribute_pattern(), html);
    let css = rewrite_leading_slash(css_url_pattern(), &attributes);
    asset_src_pattern()
        .replace_all(&css, "${open}${quote}./${path}${close}")
        .into_owned()
}

/// Replace the trailing `/` of every match with `./`, unless the next
/// character is another `/` (protocol-relative URL).
fn rewrite_leading_slash(pattern: &Regex, text: &str) -> String {
    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let end = caps.get(0).map_or(text.len(), |m| m.end());
            if text[end..].starts_with('/') {
                whole.to_string()
            } else {
                format!("{}./", &whole[..whole.len() - 1])
            }
        })
        .into_owned()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Fragments that exercise every rule plus the URLs that must stay put.
    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,8}".prop_map(|p| format!(r#" href="/{p}.css""#)),
            "[a-z]{1,8}".prop_map(|p| format!(" src='/{p}.png'")),
            "[a-z]{1,8}".prop_map(|p| format!("url(/{p}.woff)")),
            "[a-z]{1,8}".prop_map(|p| format!(r#"url("/{p}.svg")"#)),
            "[a-z]{1,8}".prop_map(|p| format!(r#"src="/{p}.gif""#)),
            "[a-z]{1,8}".prop_map(|h| format!(r#" src="//{h}.com/x.js""#)),
            "[a-z]{1,8}".prop_map(|h| format!(r#" href="https://{h}.com/x""#)),
            Just("<div>".to_string()),
            Just(" = \"/\"".to_string()),
            Just("//".to_string()),
            "[ a-zA-Z<>=/\"'().]{0,12}",
        ]
    }

    fn document() -> impl Strategy<Value = String> {
        prop::collection::vec(fragment(), 0..16).prop_map(|parts| parts.concat())
    }

    proptest! {
        /// rewrite(rewrite(d)) == rewrite(d).
        #[test]
        fn rewrite_is_idempotent(doc in document()) {
            let once = rewrite_document(&doc);
            let twice = rewrite_document(&once);
            prop_assert_eq!(twice, once);
        }

        /// Absolute and protocol-relative URLs survive unchanged.
        #[test]
        fn absolute_urls_survive(host in "[a-z]{1,10}", path in "[a-z]{1,10}") {
            let doc = format!(
                r#"<a href="https://{host}.org/{path}"></a><script src="//{host}.net/{path}.js"></script>"#
            );
            prop_assert_eq!(rewrite_document(&doc), doc);
        }
    }
}
