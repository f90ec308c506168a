/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Word-wrap `text` to `width` columns and keep at most `max_lines` lines.
///
/// The last kept line ends in "..." when text was cut.
pub fn clip_lines(text: &str, width: usize, max_lines: usize) -> Vec<String> {
  if width == 0 || max_lines == 0 {
    return Vec::new();
  }

  let mut lines: Vec<String> = Vec::new();
  let mut current = String::new();

  for word in text.split_whitespace() {
    let needed = if current.is_empty() {
      word.chars().count()
    } else {
      current.chars().count() + 1 + word.chars().count()
    };

    if needed > width && !current.is_empty() {
      lines.push(std::mem::take(&mut current));
    }
    if !current.is_empty() {
      current.push(' ');
    }
    current.push_str(word);
  }
  if !current.is_empty() {
    lines.push(current);
  }

  if lines.len() > max_lines {
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
      *last = truncate(&format!("{} ...", last), width);
      if !last.ends_with("...") {
        last.push_str("...");
      }
    }
  }

  lines
    .into_iter()
    .map(|line| truncate(&line, width))
    .collect()
}

/// Status word shown next to a list count
pub fn fetch_label(refreshing: bool) -> &'static str {
  if refreshing {
    "Refreshing..."
  } else {
    "Ready"
  }
}
