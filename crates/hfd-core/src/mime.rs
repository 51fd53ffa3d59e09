//! # Content-Type Classification
//!
//! Extension-to-MIME lookup for static assets. Pure; the extension is taken
//! from the final path segment and compared case-insensitively.

/// Content type for anything not in the table.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content type used for root documents.
pub const HTML_DOCUMENT: &str = "text/html; charset=utf-8";

/// Map a path (or bare file name) to its MIME type.
pub fn classify(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return OCTET_STREAM;
    };

    match ext.to_ascii_lowercase().as_str() {
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        "html" | "htm" => "text/html",
        "json" | "map" => "application/json",
        "txt" => "text/plain",
        "webp" => "image/webp",
        "wasm" => "application/wasm",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_core_asset_types() {
        let cases = [
            ("style.css", "text/css"),
            ("app.js", "application/javascript"),
            ("logo.png", "image/png"),
            ("photo.jpg", "image/jpeg"),
            ("photo.jpeg", "image/jpeg"),
            ("anim.gif", "image/gif"),
            ("icon.svg", "image/svg+xml"),
            ("favicon.ico", "image/x-icon"),
            ("font.woff", "font/woff"),
            ("font.woff2", "font/woff2"),
            ("font.ttf", "font/ttf"),
            ("font.eot", "application/vnd.ms-fontobject"),
        ];
        for (path, expected) in cases {
            assert_eq!(classify(path), expected, "{path}");
        }
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(classify("LOGO.PNG"), "image/png");
        assert_eq!(classify("Site.Css"), "text/css");
    }

    #[test]
    fn uses_final_segment_only() {
        assert_eq!(classify("img.v2/logo"), OCTET_STREAM);
        assert_eq!(classify("assets/css/site.css"), "text/css");
    }

    #[test]
    fn unknown_or_missing_extension_is_binary() {
        assert_eq!(classify("archive.tar.xyz"), OCTET_STREAM);
        assert_eq!(classify("README"), OCTET_STREAM);
        assert_eq!(classify(""), OCTET_STREAM);
    }
}
