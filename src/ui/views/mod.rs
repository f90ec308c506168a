mod home;
mod posts;
mod users;

pub use home::{HomeButton, HomeView};
pub use posts::PostsView;
pub use users::UsersView;

use crate::api::{ApiError, CachedApiClient};
use crate::config::UiConfig;
use crate::query::{Query, QueryState};
use crate::routes::Route;
use crate::ui::view::View;

/// What a query-backed screen shows, derived only from its query.
#[derive(Debug, PartialEq)]
pub enum ScreenStatus<'a, T> {
  /// No data yet
  Loading,
  /// Last fetch failed; offer a retry
  Error(&'a ApiError),
  /// Data on screen; `refreshing` while a background fetch runs
  Ready { data: &'a T, refreshing: bool },
}

pub fn screen_status<T: Send + 'static>(query: &Query<T>) -> ScreenStatus<'_, T> {
  match query.state() {
    QueryState::Idle | QueryState::Loading => ScreenStatus::Loading,
    QueryState::Error(e) => ScreenStatus::Error(e),
    QueryState::Success(data) => ScreenStatus::Ready {
      data,
      refreshing: query.is_fetching(),
    },
  }
}

/// Mount the screen for a route.
pub fn for_route(route: Route, api: &CachedApiClient, ui: &UiConfig) -> Box<dyn View> {
  match route {
    Route::Home => Box::new(HomeView::new()),
    Route::Posts => Box::new(PostsView::new(api.clone(), ui.banner_duration())),
    Route::Users => Box::new(UsersView::new(api.clone())),
  }
}
