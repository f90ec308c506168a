/// Outcome of offering a key to a component before the screen sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Swallowed; nothing for the caller to do
  Handled,
  /// Swallowed, and the caller should act on this event
  Event(T),
  /// Not ours; pass it on
  NotHandled,
}

impl<T> KeyResult<T> {
  /// The component took the key, with or without an event.
  pub fn consumed(&self) -> bool {
    !matches!(self, KeyResult::NotHandled)
  }
}
