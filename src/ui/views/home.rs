use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::routes::Route;
use crate::ui::view::{View, ViewAction};

/// Buttons on the welcome screen, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeButton {
  GetStarted,
  LearnMore,
  Docs,
  Examples,
}

impl HomeButton {
  pub const ALL: [HomeButton; 4] = [
    HomeButton::GetStarted,
    HomeButton::LearnMore,
    HomeButton::Docs,
    HomeButton::Examples,
  ];

  pub fn label(self) -> &'static str {
    match self {
      HomeButton::GetStarted => "Get Started",
      HomeButton::LearnMore => "Learn More",
      HomeButton::Docs => "Docs",
      HomeButton::Examples => "Examples",
    }
  }

  /// Visual variant, also used in the press log line
  pub fn kind(self) -> &'static str {
    match self {
      HomeButton::GetStarted => "Primary",
      HomeButton::LearnMore => "Outline",
      HomeButton::Docs => "Secondary",
      HomeButton::Examples => "Success",
    }
  }

  fn color(self) -> Color {
    match self {
      HomeButton::GetStarted => Color::Blue,
      HomeButton::LearnMore => Color::White,
      HomeButton::Docs => Color::Magenta,
      HomeButton::Examples => Color::Green,
    }
  }
}

const FEATURES: [(&str, &str); 2] = [
  (
    "⚡ Fast Setup",
    "Get started quickly with pre-built components and themes",
  ),
  (
    "🎨 Customizable",
    "Tailwind CSS integration for easy styling and theming",
  ),
];

/// Static welcome screen at `/`
#[derive(Debug, Default)]
pub struct HomeView {
  selected: usize,
  last_pressed: Option<HomeButton>,
}

impl HomeView {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn selected(&self) -> HomeButton {
    HomeButton::ALL[self.selected]
  }

  pub fn last_pressed(&self) -> Option<HomeButton> {
    self.last_pressed
  }

  pub fn press(&mut self, button: HomeButton) {
    tracing::info!("{} button pressed!", button.kind());
    self.last_pressed = Some(button);
  }

  fn move_selection(&mut self, delta: isize) {
    let len = HomeButton::ALL.len() as isize;
    self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
  }

  fn render_card(frame: &mut Frame, area: Rect, title: &str, body: &str) {
    let block = Block::default()
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(Style::default().fg(Color::DarkGray));
    let text = vec![
      Line::from(Span::styled(title.to_string(), Style::default().bold())),
      Line::from(Span::styled(
        body.to_string(),
        Style::default().fg(Color::Gray),
      )),
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
  }

  fn render_buttons(&self, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for (i, button) in HomeButton::ALL.iter().enumerate() {
      let mut style = Style::default().fg(button.color());
      if i == self.selected {
        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
      }
      spans.push(Span::styled(format!(" {} ", button.label()), style));
      spans.push(Span::raw("  "));
    }
    frame.render_widget(
      Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
      area,
    );
  }
}

impl View for HomeView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
        self.move_selection(-1)
      }
      KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
        self.move_selection(1)
      }
      KeyCode::Enter | KeyCode::Char(' ') => self.press(self.selected()),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let column = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([
        Constraint::Fill(1),
        Constraint::Max(64),
        Constraint::Fill(1),
      ])
      .split(area)[1];

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Fill(1),
        Constraint::Length(4), // Title
        Constraint::Length(1),
        Constraint::Length(4), // Feature cards
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Length(1), // Buttons
        Constraint::Fill(1),
        Constraint::Length(1), // Hint
      ])
      .split(column);

    let title = Paragraph::new(vec![
      Line::from(Span::styled("🎉 jpq", Style::default().bold())),
      Line::from(Span::styled(
        "JSONPlaceholder in your terminal",
        Style::default().fg(Color::Gray),
      )),
    ])
    .alignment(Alignment::Center)
    .block(
      Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(title, rows[1]);

    for (i, (title, body)) in FEATURES.iter().enumerate() {
      Self::render_card(frame, rows[3 + i], title, body);
    }

    self.render_buttons(frame, rows[6]);

    let hint = match self.last_pressed {
      Some(button) => format!("{} pressed", button.label()),
      None => "←/→ select  Enter press  :posts or :users to browse".to_string(),
    };
    frame.render_widget(
      Paragraph::new(hint)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray)),
      rows[8],
    );
  }

  fn route(&self) -> Route {
    Route::Home
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_selection_wraps() {
    let mut view = HomeView::new();
    assert_eq!(view.selected(), HomeButton::GetStarted);

    view.handle_key(key(KeyCode::Left));
    assert_eq!(view.selected(), HomeButton::Examples);

    view.handle_key(key(KeyCode::Right));
    view.handle_key(key(KeyCode::Right));
    assert_eq!(view.selected(), HomeButton::LearnMore);
  }

  #[test]
  fn test_enter_presses_selected() {
    let mut view = HomeView::new();
    view.handle_key(key(KeyCode::Right));
    view.handle_key(key(KeyCode::Right));

    assert_eq!(view.handle_key(key(KeyCode::Enter)), ViewAction::None);
    assert_eq!(view.last_pressed(), Some(HomeButton::Docs));
  }

  #[test]
  fn test_button_kinds() {
    let kinds: Vec<_> = HomeButton::ALL.iter().map(|b| b.kind()).collect();
    assert_eq!(kinds, vec!["Primary", "Outline", "Secondary", "Success"]);
  }

  #[test]
  fn test_quit_key() {
    let mut view = HomeView::new();
    assert_eq!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::Quit);
  }
}
