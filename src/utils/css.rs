//! Minimal CSS scanning for `url(...)` rewriting.
//!
//! Only top-level style rules are visited. At-rule blocks (`@media`,
//! `@font-face`, ...) and statement at-rules (`@import ...;`) are copied
//! through untouched, as are comments, strings, and all formatting.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static URL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"\s]*))\s*\)"#)
        .expect("url() pattern is valid")
});

static INLINE_BACKGROUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background-image\s*:\s*url\(\s*["']?([^"')]*?)["']?\s*\)"#)
        .expect("background-image pattern is valid")
});

/// Properties whose `url(...)` references are rewritten.
const BACKGROUND_PROPERTIES: &[&str] = &["background", "background-image"];

/// Rewrite `url(...)` references in `background`/`background-image`
/// declarations of top-level style rules.
///
/// `rewrite` receives the raw reference (quotes stripped) and returns the
/// replacement, or `None` to keep the original token.
pub fn rewrite_background_urls<F>(css: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len());
    let mut rule_start = 0;
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_comment(bytes, i),
            b'"' | b'\'' => i = skip_string(bytes, i),
            b';' | b'}' => {
                i += 1;
                rule_start = i;
            }
            b'{' => {
                let close = block_end(bytes, i + 1);
                out.push_str(&css[copied..=i]);

                let body = &css[i + 1..close];
                if is_style_rule(&css[rule_start..i]) {
                    out.push_str(&rewrite_declarations(body, &mut rewrite));
                } else {
                    out.push_str(body);
                }

                copied = close;
                i = (close + 1).min(bytes.len());
                rule_start = i;
            }
            _ => i += 1,
        }
    }

    out.push_str(&css[copied..]);
    out
}

/// First `background-image: url(...)` reference in an inline style attribute.
pub fn inline_background_image(style: &str) -> Option<String> {
    INLINE_BACKGROUND
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

fn is_style_rule(prelude: &str) -> bool {
    let prelude = strip_leading_comments(prelude);
    !prelude.is_empty() && !prelude.starts_with('@')
}

fn strip_leading_comments(mut s: &str) -> &str {
    loop {
        s = s.trim_start();
        match s.strip_prefix("/*") {
            Some(rest) => match rest.find("*/") {
                Some(end) => s = &rest[end + 2..],
                None => return "",
            },
            None => return s,
        }
    }
}

fn rewrite_declarations(body: &str, rewrite: &mut dyn FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(body.len());
    for segment in split_declarations(body) {
        out.push_str(&rewrite_declaration(segment, rewrite));
    }
    out
}

/// Split a declaration block after each top-level `;`, keeping separators.
fn split_declarations(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut parens = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(bytes, i);
                continue;
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b';' if parens == 0 => {
                segments.push(&body[start..=i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < body.len() {
        segments.push(&body[start..]);
    }
    segments
}

fn rewrite_declaration(
    declaration: &str,
    rewrite: &mut dyn FnMut(&str) -> Option<String>,
) -> String {
    let Some(colon) = declaration.find(':') else {
        return declaration.to_string();
    };

    let property = strip_leading_comments(&declaration[..colon])
        .trim()
        .to_ascii_lowercase();
    if !BACKGROUND_PROPERTIES.contains(&property.as_str()) {
        return declaration.to_string();
    }

    let value = &declaration[colon + 1..];
    let rewritten = URL_TOKEN.replace_all(value, |caps: &Captures<'_>| {
        let raw = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str());
        match rewrite(raw) {
            Some(replacement) => format!("url({replacement})"),
            None => caps[0].to_string(),
        }
    });

    format!("{}{}", &declaration[..=colon], rewritten)
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index of the `}` closing a block whose body starts at `from`.
fn block_end(bytes: &[u8], from: usize) -> usize {
    let mut depth = 1usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(bytes, i);
                continue;
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}
