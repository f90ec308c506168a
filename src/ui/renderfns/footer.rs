use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::routes::Route;

/// Draw the footer bar listing the routes, current one highlighted
pub fn draw_footer(frame: &mut Frame, area: Rect, current: Route) {
  let mut spans = vec![Span::raw(" ")];

  for (i, route) in Route::ALL.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
    }

    let style = if *route == current {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(
      format!("{} {}", i + 1, route.title()),
      style,
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
