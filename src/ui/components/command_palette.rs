use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Events emitted by the palette that the app needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteEvent {
  /// Command submitted (resolved suggestion name or raw input)
  Submitted(String),
  /// Palette closed without a command
  Cancelled,
}

/// `:` command input with autocomplete
#[derive(Debug, Clone, Default)]
pub struct CommandPalette {
  buffer: String,
  active: bool,
  selected_suggestion: usize,
}

impl CommandPalette {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.buffer)
  }

  fn reset(&mut self) {
    self.active = false;
    self.buffer.clear();
    self.selected_suggestion = 0;
  }

  /// Handle a key event, including the `:` that opens the palette
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PaletteEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.active = true;
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.reset();
        KeyResult::Event(PaletteEvent::Cancelled)
      }
      KeyCode::Enter => {
        let cmd = self.resolve_command();
        self.reset();
        KeyResult::Event(PaletteEvent::Submitted(cmd))
      }
      KeyCode::Tab | KeyCode::Down => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + 1) % count;
        }
        KeyResult::Handled
      }
      KeyCode::BackTab | KeyCode::Up => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + count - 1) % count;
        }
        KeyResult::Handled
      }
      KeyCode::Backspace => {
        self.buffer.pop();
        self.selected_suggestion = 0;
        KeyResult::Handled
      }
      KeyCode::Char(c) => {
        self.buffer.push(c);
        self.selected_suggestion = 0;
        KeyResult::Handled
      }
      // Swallow everything else while open
      _ => KeyResult::Handled,
    }
  }

  /// Route paths are passed through; otherwise the highlighted suggestion wins
  fn resolve_command(&self) -> String {
    let raw = self.buffer.trim();
    if raw.starts_with('/') {
      return raw.to_string();
    }
    let suggestions = self.suggestions();
    match suggestions.get(self.selected_suggestion) {
      Some(cmd) => cmd.name.to_string(),
      None => raw.to_lowercase(),
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let shown = suggestions.len().min(8) as u16;
    let height = (3 + shown).min(area.height);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width.saturating_sub(1), height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(0)])
      .split(inner);

    let input_line = Line::from(vec![
      Span::styled(":", Style::default().fg(Color::Yellow)),
      Span::raw(self.buffer.as_str()),
      Span::styled("_", Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(input_line), chunks[0]);

    if suggestions.is_empty() || chunks[1].height == 0 {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(8)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<8}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default();
    state.select(Some(self.selected_suggestion));
    frame.render_stateful_widget(list, chunks[1], &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(palette: &mut CommandPalette, s: &str) {
    for c in s.chars() {
      palette.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_inactive_ignores_keys() {
    let mut palette = CommandPalette::new();
    assert_eq!(
      palette.handle_key(key(KeyCode::Char('x'))),
      KeyResult::NotHandled
    );
  }

  #[test]
  fn test_submit_resolves_prefix() {
    let mut palette = CommandPalette::new();
    palette.handle_key(key(KeyCode::Char(':')));
    assert!(palette.is_active());
    type_str(&mut palette, "us");

    assert_eq!(
      palette.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(PaletteEvent::Submitted("users".to_string()))
    );
    assert!(!palette.is_active());
    assert_eq!(palette.value(), "");
  }

  #[test]
  fn test_route_path_passes_through() {
    let mut palette = CommandPalette::new();
    palette.handle_key(key(KeyCode::Char(':')));
    type_str(&mut palette, "/posts");

    assert_eq!(
      palette.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(PaletteEvent::Submitted("/posts".to_string()))
    );
  }

  #[test]
  fn test_tab_cycles_suggestions() {
    let mut palette = CommandPalette::new();
    palette.handle_key(key(KeyCode::Char(':')));
    palette.handle_key(key(KeyCode::Tab));

    assert_eq!(
      palette.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(PaletteEvent::Submitted("posts".to_string()))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut palette = CommandPalette::new();
    palette.handle_key(key(KeyCode::Char(':')));
    type_str(&mut palette, "po");

    assert_eq!(
      palette.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(PaletteEvent::Cancelled)
    );
    assert!(!palette.is_active());
  }
}
