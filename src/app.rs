use crate::api::{bearer_token_hook, ApiClient, CachedApiClient};
use crate::cache::QueryCache;
use crate::commands::{self, CommandAction};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::routes::Route;
use crate::ui;
use crate::ui::components::{CommandPalette, KeyResult, PaletteEvent};
use crate::ui::view::{View, ViewAction};
use crate::ui::views;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{self, stdout, Stdout};
use std::sync::Arc;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App {
  config: Config,

  /// Shared by every screen; one cache per app
  api: CachedApiClient,

  /// Currently mounted screen. Replacing it unmounts the old one.
  view: Box<dyn View>,

  palette: CommandPalette,

  should_quit: bool,
}

impl App {
  /// Build the client stack from config and mount the start route.
  pub fn new(config: Config) -> Result<Self> {
    let mut client = ApiClient::new(&config.api.base_url)?;
    if let Some(hook) = bearer_token_hook(Config::get_api_token()) {
      client = client.with_header_hook(hook);
    }
    let api = CachedApiClient::new(client, Arc::new(QueryCache::new()));
    Ok(Self::with_client(config, api))
  }

  /// Mount the start route against an existing client.
  pub fn with_client(config: Config, api: CachedApiClient) -> Self {
    let route = Route::from_path(&config.ui.start_route).unwrap_or_else(|| {
      tracing::warn!(route = %config.ui.start_route, "Unknown start route, showing home");
      Route::Home
    });
    let view = views::for_route(route, &api, &config.ui);

    Self {
      config,
      api,
      view,
      palette: CommandPalette::new(),
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut terminal = setup_terminal()?;

    let mut events = EventHandler::new(TICK_RATE);
    let result = self.event_loop(&mut terminal, &mut events).await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  pub fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.view.tick(),
      Event::Resize => {}
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    let result = self.palette.handle_key(key);
    if let KeyResult::Event(PaletteEvent::Submitted(input)) = &result {
      self.run_command(input);
    }
    if result.consumed() {
      return;
    }

    match key.code {
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }
      KeyCode::Char(c @ '1'..='3') => {
        let idx = (c as usize) - ('1' as usize);
        self.navigate(Route::ALL[idx]);
      }
      _ => {
        let action = self.view.handle_key(key);
        self.apply(action);
      }
    }
  }

  fn run_command(&mut self, input: &str) {
    match commands::resolve(input) {
      Some(CommandAction::Navigate(route)) => self.navigate(route),
      Some(CommandAction::Quit) => self.should_quit = true,
      None => tracing::debug!(input, "Unknown command"),
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Navigate(route) => self.navigate(route),
      ViewAction::Quit => self.should_quit = true,
    }
  }

  /// Replace the current screen. Navigating to the mounted route is a no-op.
  pub fn navigate(&mut self, route: Route) {
    if route == self.view.route() {
      return;
    }
    tracing::debug!(from = %self.view.route(), to = %route, "Navigating");
    self.view = views::for_route(route, &self.api, &self.config.ui);
  }

  pub fn route(&self) -> Route {
    self.view.route()
  }

  pub fn view(&self) -> &dyn View {
    self.view.as_ref()
  }

  pub fn view_mut(&mut self) -> &mut dyn View {
    self.view.as_mut()
  }

  pub fn palette(&self) -> &CommandPalette {
    &self.palette
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn api(&self) -> &CachedApiClient {
    &self.api
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }
}

/// Enter raw mode and the alternate screen. If any step after raw mode
/// fails, raw mode is switched off again before the error is returned.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
  enable_raw_mode()?;
  let entered = stdout()
    .execute(EnterAlternateScreen)
    .and_then(|_| Terminal::new(CrosstermBackend::new(stdout())));
  undo_on_error(entered, || {
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
  })
}

fn undo_on_error<T>(result: io::Result<T>, undo: impl FnOnce()) -> Result<T> {
  result.map_err(|e| {
    undo();
    e.into()
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_command(app: &mut App, text: &str) {
    app.handle_event(Event::Key(key(KeyCode::Char(':'))));
    for c in text.chars() {
      app.handle_event(Event::Key(key(KeyCode::Char(c))));
    }
    app.handle_event(Event::Key(key(KeyCode::Enter)));
  }

  // Screens that fetch point at a closed port; only routing is under test
  fn test_app(start_route: &str) -> App {
    let mut config = Config::default();
    config.api.base_url = "http://127.0.0.1:9/".to_string();
    config.ui.start_route = start_route.to_string();
    App::new(config).unwrap()
  }

  #[tokio::test]
  async fn test_starts_on_configured_route() {
    assert_eq!(test_app("/users").route(), Route::Users);
    assert_eq!(test_app("/nowhere").route(), Route::Home);
  }

  #[tokio::test]
  async fn test_number_keys_switch_screens() {
    let mut app = test_app("/");
    app.handle_event(Event::Key(key(KeyCode::Char('2'))));
    assert_eq!(app.route(), Route::Posts);
    app.handle_event(Event::Key(key(KeyCode::Char('3'))));
    assert_eq!(app.route(), Route::Users);
    app.handle_event(Event::Key(key(KeyCode::Char('1'))));
    assert_eq!(app.route(), Route::Home);
  }

  #[tokio::test]
  async fn test_palette_navigates_and_quits() {
    let mut app = test_app("/");
    type_command(&mut app, "users");
    assert_eq!(app.route(), Route::Users);
    assert!(!app.palette().is_active());

    type_command(&mut app, "/posts");
    assert_eq!(app.route(), Route::Posts);

    type_command(&mut app, "quit");
    assert!(app.should_quit());
  }

  #[tokio::test]
  async fn test_palette_swallows_screen_keys() {
    let mut app = test_app("/");
    app.handle_event(Event::Key(key(KeyCode::Char(':'))));
    app.handle_event(Event::Key(key(KeyCode::Char('q'))));
    assert!(!app.should_quit());
    assert!(app.palette().is_active());

    app.handle_event(Event::Key(key(KeyCode::Esc)));
    assert!(!app.palette().is_active());
    assert_eq!(app.route(), Route::Home);
  }

  #[test]
  fn test_failed_terminal_setup_is_undone() {
    let mut undone = false;
    let failed: io::Result<()> = Err(io::Error::other("no tty"));
    assert!(undo_on_error(failed, || undone = true).is_err());
    assert!(undone);

    let mut undone = false;
    assert_eq!(undo_on_error(Ok(7), || undone = true).unwrap(), 7);
    assert!(!undone);
  }

  #[tokio::test]
  async fn test_ctrl_c_quits() {
    let mut app = test_app("/posts");
    app.handle_event(Event::Key(KeyEvent::new(
      KeyCode::Char('c'),
      KeyModifiers::CONTROL,
    )));
    assert!(app.should_quit());
  }
}
