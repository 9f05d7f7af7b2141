//! Relative-link rewriting for rendered lesson HTML.
//!
//! Lesson authors write links relative to their own folder
//! (`./bild.png`, `uebung.pdf`); the browser needs them pointed at the
//! media route. This pass rewrites every `href`/`src` attribute whose value
//! is a relative path into `/unterlagen/<slug>/media/<path>`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `href=` / `src=` attributes with a double- or single-quoted value.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(href|src)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attribute pattern")
});

/// Values that are already absolute or non-navigational and must pass
/// through byte-identical.
const PASSTHROUGH_PREFIXES: &[&str] = &["http://", "https://", "/", "#", "mailto:", "tel:"];

/// Course-level folders shared between lessons; paths into them are not
/// prefixed with the lesson folder.
const SHARED_FOLDERS: &[&str] = &["assets/", "docs/", "static/"];

/// Rewrite relative `href`/`src` values in `html` to the media route for
/// `slug`, prefixing simple relative paths with `lesson_folder`.
pub fn rewrite_links(html: &str, slug: &str, lesson_folder: &str) -> String {
    ATTR_RE
        .replace_all(html, |caps: &Captures| {
            let attr = &caps[1];
            // Group 2 for double quotes, 3 for single; keep the author's
            // quote style on the way out.
            let (value, quote) = match caps.get(2) {
                Some(m) => (m.as_str(), '"'),
                None => (&caps[3], '\''),
            };

            match rewrite_target(value, slug, lesson_folder) {
                Some(target) => format!("{attr}={quote}{target}{quote}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Media-route target for one attribute value, or `None` when the value
/// must be left alone.
fn rewrite_target(value: &str, slug: &str, lesson_folder: &str) -> Option<String> {
    if value.is_empty() || PASSTHROUGH_PREFIXES.iter().any(|p| value.starts_with(p)) {
        return None;
    }

    // Collapse leading ./ and ../ segments; the media route resolves
    // everything from the course root anyway.
    let mut path = value;
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else {
            break;
        }
    }
    if path.is_empty() {
        return None;
    }

    let rel = if SHARED_FOLDERS.iter().any(|f| path.starts_with(f)) {
        path.to_string()
    } else {
        format!("{lesson_folder}/{path}")
    };
    Some(format!("/unterlagen/{slug}/media/{rel}"))
}
