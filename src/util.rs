//! Small utility helpers used across modules.

/// Normalize learner-submitted code for matching: lowercase everything and
/// collapse whitespace runs into single spaces. Cosmetic formatting
/// differences must never change a verdict.
pub fn normalize_code(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut gap = false;
  for ch in s.trim().chars() {
    if ch.is_whitespace() {
      gap = true;
      continue;
    }
    if gap && !out.is_empty() {
      out.push(' ');
    }
    gap = false;
    for lc in ch.to_lowercase() {
      out.push(lc);
    }
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
#[allow(dead_code)]
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalization_collapses_whitespace_and_case() {
    assert_eq!(normalize_code("  <NAV\n   class=\"menu\">  "), "<nav class=\"menu\">");
    assert_eq!(normalize_code("display :\tFLEX ;"), "display : flex ;");
    assert_eq!(normalize_code(""), "");
  }

  #[test]
  fn truncation_reports_total_size() {
    let s = trunc_for_log("abcdefgh", 4);
    assert!(s.starts_with("abcd"));
    assert!(s.contains("8 bytes"));
  }
}
