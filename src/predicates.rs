//! Text predicates over submitted HTML/CSS.
//!
//! Everything here is a deliberate substring heuristic over normalized source
//! text, not a DOM or CSS parse. Case bank entries describe their checks as
//! declarative `Check` data; this module interprets them. All matching is
//! case-insensitive and whitespace-lenient (see `util::normalize_code`).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::util::normalize_code;

/// Outcome of looking up one CSS property in the stylesheet text.
/// Collapsed to a boolean by the individual checks, but the three cases stay
/// distinguishable: present-with-expected-value, never declared, and declared
/// with a different (or malformed) value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyVerdict {
  Match,
  Absent,
  Mismatch,
}

/// Declarative check resolved against `(html, css)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
  /// Normalized HTML contains the token.
  HtmlContains { token: String },
  /// Normalized HTML does not contain the token.
  HtmlLacks { token: String },
  /// An opening tag for `tag` appears in the HTML (`<tag>`, `<tag ...`).
  HtmlTag { tag: String },
  /// CSS declares `property: value` somewhere.
  CssProperty { property: String, value: String },
  /// CSS declares `property` with any value at all.
  CssDeclares { property: String },
  /// CSS no longer declares `property: value`.
  CssValueGone { property: String, value: String },
  /// CSS declares the `new` value and no longer carries `old`. Both present
  /// at once signals a malformed edit, so the check fails.
  CssSwapped { property: String, old: String, new: String },
  /// Anchored wildcard pattern over normalized HTML (see `wildcard_match`).
  HtmlPattern { pattern: String },
  /// Same, over normalized CSS.
  CssPattern { pattern: String },
  AllOf { checks: Vec<Check> },
  AnyOf { checks: Vec<Check> },
}

/// Interpret a declarative check. Pure in `(html, css)`.
pub fn check_met(check: &Check, html: &str, css: &str) -> bool {
  match check {
    Check::HtmlContains { token } => text_contains(html, token),
    Check::HtmlLacks { token } => !text_contains(html, token),
    Check::HtmlTag { tag } => tag_present(html, tag),
    Check::CssProperty { property, value } => {
      css_property(css, property, value) == PropertyVerdict::Match
    }
    Check::CssDeclares { property } => {
      css_property(css, property, "") != PropertyVerdict::Absent
    }
    Check::CssValueGone { property, value } => {
      css_property(css, property, value) != PropertyVerdict::Match
    }
    Check::CssSwapped { property, old, new } => {
      css_property(css, property, new) == PropertyVerdict::Match
        && css_property(css, property, old) != PropertyVerdict::Match
    }
    Check::HtmlPattern { pattern } => wildcard_match(pattern, html),
    Check::CssPattern { pattern } => wildcard_match(pattern, css),
    Check::AllOf { checks } => checks.iter().all(|c| check_met(c, html, css)),
    Check::AnyOf { checks } => checks.iter().any(|c| check_met(c, html, css)),
  }
}

/// Map a human-readable hint condition key to its predicate.
///
/// The lookup is explicit and exhaustive; an unrecognized key evaluates to
/// false (logged, never an error) so bank authors can stage placeholder
/// conditions before the predicate exists.
pub fn condition_met(condition: &str, html: &str, css: &str) -> bool {
  match normalize_code(condition).as_str() {
    "remove hidden attribute" => !text_contains(html, "hidden"),
    "add nav element" => tag_present(html, "nav"),
    "add semantic header" => tag_present(html, "header"),
    "add semantic footer" => tag_present(html, "footer"),
    "change display none to block" => {
      css_property(css, "display", "block") == PropertyVerdict::Match
        && css_property(css, "display", "none") != PropertyVerdict::Match
    }
    "use flexbox layout" => css_property(css, "display", "flex") == PropertyVerdict::Match,
    "use grid layout" => css_property(css, "display", "grid") == PropertyVerdict::Match,
    "remove center tag" => !tag_present(html, "center"),
    "remove font tag" => !tag_present(html, "font"),
    "add alt text to images" => text_contains(html, "alt="),
    "link the stylesheet" => text_contains(html, "<link") && text_contains(html, "stylesheet"),
    other => {
      warn!(target: "hints", condition = other, "Unknown hint condition; treated as not yet satisfiable");
      false
    }
  }
}

/// Substring containment over normalized text.
pub fn text_contains(text: &str, token: &str) -> bool {
  let token = normalize_code(token);
  !token.is_empty() && normalize_code(text).contains(&token)
}

/// True if an opening tag for `tag` appears: `<tag>`, `<tag attr...` or
/// `<tag/>`. A bare substring would also hit longer names (`<nav` inside
/// `<navigator>`), which is exactly the looseness partial checks opt into,
/// so the full-credit form requires the delimiter.
pub fn tag_present(html: &str, tag: &str) -> bool {
  let h = normalize_code(html);
  let t = normalize_code(tag);
  if t.is_empty() {
    return false;
  }
  h.contains(&format!("<{t}>")) || h.contains(&format!("<{t} ")) || h.contains(&format!("<{t}/"))
}

/// Scan normalized CSS for declarations of `property` and compare each value
/// against `expected`. With `expected` empty, any declaration counts as a
/// match (used by `Check::CssDeclares`).
pub fn css_property(css_text: &str, property: &str, expected: &str) -> PropertyVerdict {
  let css = normalize_code(css_text);
  let prop = normalize_code(property);
  let want = normalize_code(expected);
  if prop.is_empty() {
    return PropertyVerdict::Absent;
  }

  let mut declared = false;
  let mut matched = false;
  let mut from = 0usize;
  while let Some(pos) = css[from..].find(&prop) {
    let at = from + pos;
    from = at + prop.len();

    // Property-name boundary on the left, so "display" never matches inside
    // a longer identifier such as "grid-auto-display".
    if let Some(before) = css[..at].chars().next_back() {
      if before.is_alphanumeric() || before == '-' {
        continue;
      }
    }

    let mut tail = css[at + prop.len()..].trim_start();
    if !tail.starts_with(':') {
      continue;
    }
    tail = tail[1..].trim_start();
    let end = tail.find(|c| c == ';' || c == '}').unwrap_or(tail.len());
    let value = tail[..end].trim();

    declared = true;
    if want.is_empty() || value == want {
      matched = true;
    }
  }

  if matched {
    PropertyVerdict::Match
  } else if declared {
    PropertyVerdict::Mismatch
  } else {
    PropertyVerdict::Absent
  }
}

/// Tiny pattern matcher for bank-authored checks: literal chunks joined by
/// `.+` wildcards, with optional `^`/`$` anchors. Runs over normalized text;
/// nothing beyond this subset is supported.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
  let text = normalize_code(text);
  let mut pat = pattern.trim();

  let from_start = pat.starts_with('^');
  if from_start {
    pat = &pat[1..];
  }
  let to_end = pat.ends_with('$');
  if to_end && !pat.is_empty() {
    pat = &pat[..pat.len() - 1];
  }

  let open_head = pat.starts_with(".+");
  let open_tail = pat.ends_with(".+");
  let chunks: Vec<String> = pat
    .split(".+")
    .filter(|c| !c.is_empty())
    .map(normalize_code)
    .collect();

  if chunks.is_empty() {
    // Pattern was empty or pure wildcards.
    return pat.is_empty() || !text.is_empty();
  }

  let mut cursor = 0usize;
  for (i, lit) in chunks.iter().enumerate() {
    if i == 0 && from_start && !open_head {
      if !text.starts_with(lit.as_str()) {
        return false;
      }
      cursor = lit.len();
      continue;
    }
    match text[cursor..].find(lit.as_str()) {
      Some(off) => cursor += off + lit.len(),
      None => return false,
    }
  }

  if to_end && !open_tail {
    return cursor == text.len();
  }
  true
}
