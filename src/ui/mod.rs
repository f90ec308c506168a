pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current screen
      Constraint::Length(1), // Route tabs
    ])
    .split(frame.area());

  let route = app.route();
  let shortcuts = app.view().shortcuts();
  renderfns::draw_header(
    frame,
    chunks[0],
    &app.config().api.base_url,
    route,
    &shortcuts,
  );

  app.view_mut().render(frame, chunks[1]);
  renderfns::draw_footer(frame, chunks[2], route);

  app.palette().render_overlay(frame, chunks[1]);
}

/// Clamp a list selection to `len` items, selecting the first when unset.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    None => state.select(Some(0)),
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selects_first_when_unset() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));
  }

  #[test]
  fn test_clamps_past_end() {
    let mut state = ListState::default();
    state.select(Some(9));
    ensure_valid_selection(&mut state, 4);
    assert_eq!(state.selected(), Some(3));
  }

  #[test]
  fn test_clears_on_empty() {
    let mut state = ListState::default();
    state.select(Some(1));
    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
