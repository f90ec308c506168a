use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::{screen_status, ScreenStatus};
use crate::api::users::GET_USERS;
use crate::api::{CachedApiClient, User};
use crate::cache::CacheKey;
use crate::query::Query;
use crate::routes::Route;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{fetch_label, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

pub fn header_text(total: usize, refreshing: bool) -> String {
  format!("{} users • {}", total, fetch_label(refreshing))
}

/// Labelled detail rows for one user card. Website is skipped when empty.
pub fn detail_rows(user: &User) -> Vec<(&'static str, &str)> {
  let mut rows = vec![
    ("Email:", user.email.as_str()),
    ("Phone:", user.phone.as_str()),
    ("City:", user.address.city.as_str()),
  ];
  if !user.website.is_empty() {
    rows.push(("Website:", user.website.as_str()));
  }
  rows
}

/// Users directory
pub struct UsersView {
  query: Query<Vec<User>>,
  list_state: ListState,
}

impl UsersView {
  pub fn new(api: CachedApiClient) -> Self {
    let api_for_query = api.clone();
    let mut query = Query::new(move |mode| {
      let api = api_for_query.clone();
      async move { api.get_users(mode).await }
    })
    .watching(api.cache(), CacheKey::new(GET_USERS.name, None));

    query.fetch();

    Self {
      query,
      list_state: ListState::default(),
    }
  }

  pub fn query(&self) -> &Query<Vec<User>> {
    &self.query
  }

  fn card(user: &User, width: usize) -> ListItem<'static> {
    let id_badge = format!("ID: {}", user.id);
    let name_width = width.saturating_sub(id_badge.len() + 1);

    let mut lines = vec![
      Line::from(vec![
        Span::styled(
          format!("{:<w$}", truncate(&user.name, name_width), w = name_width),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(id_badge, Style::default().fg(Color::DarkGray)),
      ]),
      Line::styled(
        format!("@{}", user.username),
        Style::default().fg(Color::Cyan),
      ),
    ];

    for (label, value) in detail_rows(user) {
      lines.push(Line::from(vec![
        Span::styled(format!("{:<9}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(truncate(value, width.saturating_sub(9))),
      ]));
    }

    lines.push(Line::styled(
      format!("Company: {}", user.company.name),
      Style::default().fg(Color::Gray),
    ));
    lines.push(Line::styled(
      truncate(&format!("\"{}\"", user.company.catch_phrase), width),
      Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC),
    ));
    lines.push(Line::raw(""));

    ListItem::new(lines)
  }
}

impl View for UsersView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Esc => return ViewAction::Navigate(Route::Home),
      KeyCode::Char('q') => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Users Directory ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Magenta));

    let (users, refreshing) = match screen_status(&self.query) {
      ScreenStatus::Loading => {
        let paragraph = Paragraph::new("Loading users...")
          .alignment(Alignment::Center)
          .block(block);
        frame.render_widget(paragraph, area);
        return;
      }
      ScreenStatus::Error(e) => {
        let paragraph = Paragraph::new(vec![
          Line::styled(
            format!("Error loading users: {}", e),
            Style::default().fg(Color::Red),
          ),
          Line::raw(""),
          Line::raw("Press 'r' to retry."),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block.border_style(Style::default().fg(Color::Red)));
        frame.render_widget(paragraph, area);
        return;
      }
      ScreenStatus::Ready { data, refreshing } => (data, refreshing),
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(2), Constraint::Min(0)])
      .split(inner);

    let refresh = if refreshing {
      "[r] Refreshing..."
    } else {
      "[r] Refresh Users"
    };
    frame.render_widget(
      Paragraph::new(vec![
        Line::raw(header_text(users.len(), refreshing)),
        Line::styled(refresh, Style::default().fg(Color::DarkGray)),
      ]),
      chunks[0],
    );

    ensure_valid_selection(&mut self.list_state, users.len());

    let width = chunks[1].width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = users.iter().map(|u| Self::card(u, width)).collect();
    let list = List::new(items)
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
  }

  fn route(&self) -> Route {
    Route::Users
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("1-3", "screens").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiClient;
  use crate::cache::QueryCache;
  use crossterm::event::KeyModifiers;
  use serde_json::{json, Value};
  use std::sync::Arc;
  use std::time::Duration;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn user_json(id: u64, website: &str) -> Value {
    json!({
      "id": id,
      "name": "Leanne Graham",
      "username": "Bret",
      "email": "Sincere@april.biz",
      "address": {
        "street": "Kulas Light",
        "suite": "Apt. 556",
        "city": "Gwenborough",
        "zipcode": "92998-3874",
        "geo": {"lat": "-37.3159", "lng": "81.1496"}
      },
      "phone": "1-770-736-8031 x56442",
      "website": website,
      "company": {
        "name": "Romaguera-Crona",
        "catchPhrase": "Multi-layered client-server neural-net",
        "bs": "harness real-time e-markets"
      }
    })
  }

  fn client_for(server: &MockServer) -> CachedApiClient {
    let inner = ApiClient::new(&server.uri()).unwrap();
    CachedApiClient::new(inner, Arc::new(QueryCache::new()))
  }

  async fn settle(view: &mut UsersView) {
    for _ in 0..20 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      view.tick();
    }
  }

  #[test]
  fn test_header_text() {
    assert_eq!(header_text(10, false), "10 users • Ready");
    assert_eq!(header_text(10, true), "10 users • Refreshing...");
  }

  #[test]
  fn test_detail_rows_skip_empty_website() {
    let with_site: User = serde_json::from_value(user_json(1, "hildegard.org")).unwrap();
    let rows = detail_rows(&with_site);
    assert_eq!(rows.last(), Some(&("Website:", "hildegard.org")));

    let without: User = serde_json::from_value(user_json(2, "")).unwrap();
    assert!(detail_rows(&without).iter().all(|(label, _)| *label != "Website:"));
  }

  #[tokio::test]
  async fn test_server_error_then_refetch_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/users"))
      .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
      .up_to_n_times(1)
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/users"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        user_json(1, "hildegard.org"),
        user_json(2, "")
      ])))
      .mount(&server)
      .await;

    let mut view = UsersView::new(client_for(&server));
    settle(&mut view).await;

    match screen_status(view.query()) {
      ScreenStatus::Error(e) => assert_eq!(e.status(), Some(500)),
      _ => panic!("expected error state"),
    }

    view.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
    assert!(view.query().is_loading());
    settle(&mut view).await;

    assert_eq!(view.query().data().map(|u| u.len()), Some(2));
  }
}
