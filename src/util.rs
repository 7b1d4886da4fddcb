//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Values are scrubbed of control characters first so interpolated user text
/// can never break the provider's message framing.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, &scrub_control(v));
  }
  out
}

/// Remove control characters from interpolated text, keeping newlines and tabs.
pub fn scrub_control(s: &str) -> String {
  s.chars()
    .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
    .collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let mut end = max;
    while !s.is_char_boundary(end) {
      end -= 1;
    }
    format!("{}… ({} bytes total)", &s[..end], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_occurrences() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y and x");
  }

  #[test]
  fn fill_template_scrubs_control_chars() {
    let out = fill_template("q: {q}", &[("q", "line1\u{0}\u{1b}line2\nend")]);
    assert_eq!(out, "q: line1line2\nend");
  }

  #[test]
  fn trunc_respects_char_boundaries() {
    let s = "ábcdé";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with("áb"));
  }
}
