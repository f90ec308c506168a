use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::time::{Duration, Instant};

use super::{screen_status, ScreenStatus};
use crate::api::posts::GET_POSTS;
use crate::api::{CachedApiClient, CreatePost, Post};
use crate::cache::CacheKey;
use crate::query::{Mutation, Query};
use crate::routes::Route;
use crate::ui::components::Banner;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{clip_lines, fetch_label, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// Posts rendered as cards; the rest are only counted.
pub const VISIBLE_POSTS: usize = 10;

const BODY_LINES: usize = 3;

const DEMO_BODY: &str = "This is a demo post created from the terminal with a cached mutation!";

const CREATED_MESSAGE: &str =
  "✅ New post created! (The demo API does not store it, so the list will not change)";

pub fn header_text(total: usize, refreshing: bool) -> String {
  format!("Posts: {} • {}", total, fetch_label(refreshing))
}

pub fn footer_text(total: usize) -> String {
  format!("Showing first {} posts • Total: {}", VISIBLE_POSTS, total)
}

/// Post list with create and delete actions
pub struct PostsView {
  api: CachedApiClient,
  query: Query<Vec<Post>>,
  create: Mutation<Post>,
  delete: Mutation<u64>,
  deleting: Option<u64>,
  banner: Banner,
  list_state: ListState,
}

impl PostsView {
  pub fn new(api: CachedApiClient, banner_ttl: Duration) -> Self {
    let api_for_query = api.clone();
    let mut query = Query::new(move |mode| {
      let api = api_for_query.clone();
      async move { api.get_posts(mode).await }
    })
    .watching(api.cache(), CacheKey::new(GET_POSTS.name, None));

    query.fetch();

    Self {
      api,
      query,
      create: Mutation::new(),
      delete: Mutation::new(),
      deleting: None,
      banner: Banner::new(CREATED_MESSAGE, banner_ttl),
      list_state: ListState::default(),
    }
  }

  pub fn query(&self) -> &Query<Vec<Post>> {
    &self.query
  }

  pub fn is_creating(&self) -> bool {
    self.create.is_pending()
  }

  pub fn is_deleting(&self) -> bool {
    self.delete.is_pending()
  }

  pub fn banner_visible(&self) -> bool {
    self.banner.is_visible_at(Instant::now())
  }

  fn visible_posts(&self) -> &[Post] {
    let posts = self.query.data().map(|v| v.as_slice()).unwrap_or(&[]);
    &posts[..posts.len().min(VISIBLE_POSTS)]
  }

  fn selected_post(&self) -> Option<&Post> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.visible_posts().get(idx))
  }

  /// Fire the create mutation with a timestamped title.
  pub fn create_demo_post(&mut self) -> bool {
    let post = CreatePost {
      title: format!("Demo Post {}", Utc::now().timestamp_millis()),
      body: DEMO_BODY.to_string(),
      user_id: 1,
    };
    let api = self.api.clone();
    self
      .create
      .run(async move { api.create_post(&post).await })
  }

  /// Delete the highlighted post. Ignored while another delete runs.
  pub fn delete_selected(&mut self) -> bool {
    let Some(id) = self.selected_post().map(|p| p.id) else {
      return false;
    };
    let api = self.api.clone();
    let started = self
      .delete
      .run(async move { api.delete_post(id).await.map(|_| id) });
    if started {
      self.deleting = Some(id);
    }
    started
  }

  fn settle_mutations(&mut self) {
    if let Some(outcome) = self.create.poll() {
      match outcome {
        Ok(post) => {
          tracing::info!(id = post.id, title = %post.title, "Post created");
          self.banner.show_at(Instant::now());
        }
        Err(e) => tracing::error!("Failed to create post: {}", e),
      }
    }

    if let Some(outcome) = self.delete.poll() {
      self.deleting = None;
      match outcome {
        Ok(id) => tracing::info!("Post {} deleted successfully!", id),
        Err(e) => tracing::error!("Failed to delete post: {}", e),
      }
    }
  }

  fn render_message(frame: &mut Frame, area: Rect, lines: Vec<Line>, color: Color) {
    let block = Block::default()
      .title(" Posts ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(color));
    let paragraph = Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true })
      .block(block);
    frame.render_widget(paragraph, area);
  }

  fn render_actions(&self, frame: &mut Frame, area: Rect, refreshing: bool) {
    let create = if self.is_creating() {
      "[c] Creating..."
    } else {
      "[c] Create Post"
    };
    let refresh = if refreshing {
      "[r] Refreshing..."
    } else {
      "[r] Refresh"
    };
    let delete = if self.is_deleting() {
      "[d] Deleting..."
    } else {
      "[d] Delete"
    };

    let line = Line::from(vec![
      Span::styled(create, Style::default().fg(Color::Blue)),
      Span::raw("   "),
      Span::styled(refresh, Style::default().fg(Color::White)),
      Span::raw("   "),
      Span::styled(delete, Style::default().fg(Color::Red)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
  }

  fn card(post: &Post, width: usize, deleting: bool) -> ListItem<'static> {
    let id_badge = format!("#{}", post.id);
    let title_width = width.saturating_sub(id_badge.len() + 1);

    let mut lines = vec![Line::from(vec![
      Span::styled(
        format!("{:<w$}", truncate(&post.title, title_width), w = title_width),
        Style::default().add_modifier(Modifier::BOLD),
      ),
      Span::raw(" "),
      Span::styled(id_badge, Style::default().fg(Color::DarkGray)),
    ])];

    for line in clip_lines(&post.body, width, BODY_LINES) {
      lines.push(Line::from(Span::styled(
        line,
        Style::default().fg(Color::Gray),
      )));
    }

    let action = if deleting { "Deleting..." } else { "" };
    lines.push(Line::from(vec![
      Span::styled(
        format!("User ID: {}", post.user_id),
        Style::default().fg(Color::DarkGray),
      ),
      Span::raw("  "),
      Span::styled(action, Style::default().fg(Color::Red)),
    ]));
    lines.push(Line::raw(""));

    ListItem::new(lines)
  }
}

impl View for PostsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Char('c') => {
        self.create_demo_post();
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        self.delete_selected();
      }
      KeyCode::Esc => return ViewAction::Navigate(Route::Home),
      KeyCode::Char('q') => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (posts, refreshing) = match screen_status(&self.query) {
      ScreenStatus::Loading => {
        Self::render_message(frame, area, vec![Line::raw("Loading posts...")], Color::Blue);
        return;
      }
      ScreenStatus::Error(e) => {
        let lines = vec![
          Line::styled(
            format!("Error loading posts: {}", e),
            Style::default().fg(Color::Red),
          ),
          Line::raw(""),
          Line::raw("Press 'r' to retry."),
        ];
        Self::render_message(frame, area, lines, Color::Red);
        return;
      }
      ScreenStatus::Ready { data, refreshing } => (data, refreshing),
    };

    let total = posts.len();
    let banner_height = if self.banner.is_visible_at(Instant::now()) {
      4
    } else {
      0
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(1),
      ])
      .split(area);

    let header = Paragraph::new(header_text(total, refreshing)).block(
      Block::default()
        .title(" RTK-style Query Demo ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(header, chunks[0]);

    self.render_actions(frame, chunks[1], refreshing);
    self.banner.render(frame, chunks[2]);

    let visible = &posts[..total.min(VISIBLE_POSTS)];
    ensure_valid_selection(&mut self.list_state, visible.len());

    let width = chunks[3].width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = visible
      .iter()
      .map(|post| Self::card(post, width, self.deleting == Some(post.id)))
      .collect();

    let list = List::new(items)
      .block(Block::default().borders(Borders::TOP))
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[3], &mut self.list_state);

    frame.render_widget(
      Paragraph::new(footer_text(total))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray)),
      chunks[4],
    );
  }

  fn route(&self) -> Route {
    Route::Posts
  }

  fn tick(&mut self) {
    self.query.poll();
    self.settle_mutations();
    self.banner.expire_at(Instant::now());
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("c", "create").with_priority(30),
      ShortcutInfo::new("d", "delete").with_priority(31),
      ShortcutInfo::new("r", "refresh").with_priority(32),
      ShortcutInfo::new("j/k", "move").with_priority(40),
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("1-3", "screens").with_priority(20),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
