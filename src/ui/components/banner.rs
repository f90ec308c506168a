use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::time::{Duration, Instant};

/// Transient confirmation message that hides itself after a fixed time.
#[derive(Debug, Clone)]
pub struct Banner {
  message: String,
  ttl: Duration,
  shown_at: Option<Instant>,
}

impl Banner {
  pub fn new(message: impl Into<String>, ttl: Duration) -> Self {
    Self {
      message: message.into(),
      ttl,
      shown_at: None,
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  /// Show (or restart) the banner from `now`.
  pub fn show_at(&mut self, now: Instant) {
    self.shown_at = Some(now);
  }

  pub fn is_visible_at(&self, now: Instant) -> bool {
    self
      .shown_at
      .is_some_and(|shown| now.saturating_duration_since(shown) < self.ttl)
  }

  /// Hide the banner once its time is up. Returns true if it was hidden.
  pub fn expire_at(&mut self, now: Instant) -> bool {
    if self.shown_at.is_some() && !self.is_visible_at(now) {
      self.shown_at = None;
      return true;
    }
    false
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    if !self.is_visible_at(Instant::now()) {
      return;
    }

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Green));
    let paragraph = Paragraph::new(self.message())
      .style(Style::default().fg(Color::Green))
      .wrap(Wrap { trim: true })
      .block(block);
    frame.render_widget(paragraph, area);
  }
}
