//! Text Normalizer — turns HTML-bearing job descriptions into plain text.
//!
//! Regex based on purpose: descriptions scraped from job boards are rarely
//! well-formed, and a tag soup must still yield whatever text it contains.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Tags whose boundaries become line breaks.
const BLOCK_TAGS: &str = "address|article|aside|blockquote|br|dd|div|dl|dt|footer|h[1-6]|header|hr|li|main|nav|ol|p|pre|section|table|tbody|td|th|thead|tr|ul";

struct Patterns {
    dropped: Regex,
    comment: Regex,
    block: Regex,
    tag: Regex,
    entity: Regex,
    spaces: Regex,
    blank_lines: Regex,
}

static PATTERNS: Lazy<Patterns> = Lazy::new(|| Patterns {
    dropped: Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)\s*>")
        .expect("static regex"),
    comment: Regex::new(r"(?s)<!--.*?(-->|$)").expect("static regex"),
    block: Regex::new(&format!(r"(?i)</?(?:{BLOCK_TAGS})\b[^>]*>")).expect("static regex"),
    tag: Regex::new(r"</?[A-Za-z!?][^<>]*(>|$)").expect("static regex"),
    entity: Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]{2,8});").expect("static regex"),
    spaces: Regex::new(r"[ \t\u{a0}]+").expect("static regex"),
    blank_lines: Regex::new(r"\n{3,}").expect("static regex"),
});

/// Converts an HTML fragment to plain text.
///
/// Block-level tags become line breaks, every other tag is removed, entities
/// are decoded. Pure and infallible: unterminated tags or stray `<` characters
/// are kept or dropped on a best-effort basis.
pub fn html_to_text(raw_html: &str) -> String {
    let p = &*PATTERNS;

    let text = p.dropped.replace_all(raw_html, "");
    let text = p.comment.replace_all(&text, "");
    let text = p.block.replace_all(&text, "\n");
    let text = p.tag.replace_all(&text, "");
    let text = p
        .entity
        .replace_all(&text, |caps: &Captures| decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string()));

    let lines: Vec<String> = text
        .replace("\r\n", "\n")
        .split('\n')
        .map(|line| p.spaces.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");

    p.blank_lines.replace_all(&joined, "\n\n").trim().to_string()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from);
    }
    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "rsquo" => "\u{2019}",
        "lsquo" => "\u{2018}",
        "rdquo" => "\u{201d}",
        "ldquo" => "\u{201c}",
        "bull" => "\u{2022}",
        "euro" => "\u{20ac}",
        "eacute" => "\u{e9}",
        "egrave" => "\u{e8}",
        "euml" => "\u{eb}",
        "ouml" => "\u{f6}",
        "uuml" => "\u{fc}",
        "iuml" => "\u{ef}",
        _ => return None,
    };
    Some(decoded.to_string())
}
