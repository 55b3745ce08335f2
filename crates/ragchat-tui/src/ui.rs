use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use ragchat_core::Sender;
use ragchat_core::ui::{LineKind, SendButton, VisualLine};
use crate::app::App;

const SEND_BUTTON_WIDTH: u16 = 10;

fn sender_color(sender: Sender) -> Color {
    match sender {
        Sender::User => Color::Cyan,
        Sender::Bot => Color::Yellow,
    }
}

fn styled_line(line: VisualLine) -> Line<'static> {
    match line.kind {
        LineKind::Header => Line::from(Span::styled(
            line.text,
            Style::default()
                .fg(sender_color(line.sender))
                .add_modifier(Modifier::BOLD),
        )),
        LineKind::Loading => Line::from(Span::styled(
            line.text,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        LineKind::Body | LineKind::Spacer => Line::from(line.text),
    }
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let [chat_area, input_row] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(frame.area());
    let [input_area, button_area] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(SEND_BUTTON_WIDTH)])
            .areas(input_row);

    // Store areas for mouse hit-testing
    app.chat_area = Some(chat_area);
    app.send_button_area = Some(button_area);

    draw_chat(frame, app, chat_area);
    draw_input(frame, app, input_area);
    draw_send_button(frame, app, button_area);
}

fn draw_chat(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.is_sending() {
        format!(" {} · waiting for answer ", app.endpoint)
    } else {
        format!(" {} ", app.endpoint)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let frame_idx = app.animation_frame;

    let Some(chat_box) = app.ui.chat_box_mut() else {
        frame.render_widget(block, area);
        return;
    };
    chat_box.set_viewport(inner_width, inner_height);

    let text = if chat_box.is_empty() {
        Text::from(Span::styled(
            "Ask a question about your documents...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(
            chat_box
                .visual_lines(inner_width, frame_idx)
                .into_iter()
                .map(styled_line)
                .collect::<Vec<_>>(),
        )
    };

    let chat = Paragraph::new(text)
        .block(block)
        .scroll((chat_box.scroll_top(), 0));

    frame.render_widget(chat, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let Some(input) = app.ui.input() else {
        return;
    };

    let (border_color, text_style) = if input.is_disabled() {
        (Color::DarkGray, Style::default().fg(Color::DarkGray))
    } else {
        (Color::Cyan, Style::default())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Question (Enter to send, Esc to quit) ");

    // Keep the cursor in view for long input
    let inner_width = usize::from(area.width.saturating_sub(2));
    let before_cursor: String = input.value().chars().take(input.cursor()).collect();
    let cursor_col = Span::raw(before_cursor.as_str()).width();
    let h_scroll = cursor_col.saturating_sub(inner_width.saturating_sub(1));

    let paragraph = Paragraph::new(Span::styled(input.value(), text_style))
        .block(block)
        .scroll((0, u16::try_from(h_scroll).unwrap_or(0)));
    frame.render_widget(paragraph, area);

    if input.is_focused() && !input.is_disabled() {
        let x = area.x + 1 + u16::try_from(cursor_col - h_scroll).unwrap_or(0);
        frame.set_cursor_position((x, area.y + 1));
    }
}

fn draw_send_button(frame: &mut Frame, app: &App, area: Rect) {
    let Some(button) = app.ui.send_button() else {
        return;
    };

    let style = if button.is_disabled() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let paragraph = Paragraph::new(SendButton::LABEL)
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app_with, StubApi};
    use ragchat_core::Trigger;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_empty_chat_shows_hint_and_button() {
        let mut app = app_with(StubApi::answering("unused"));
        let screen = render(&mut app, 60, 12);

        assert!(screen.contains("Ask a question about your documents..."));
        assert!(screen.contains("Send"));
        assert!(screen.contains("http://test.invalid/api/chat"));
        assert!(app.send_button_area.is_some());
    }

    #[tokio::test]
    async fn test_loading_bubble_is_drawn_while_sending() {
        let mut app = app_with(StubApi::answering("unused"));
        app.ui.input_mut().unwrap().set_value("What is X?");
        app.submit(Trigger::Enter);

        let screen = render(&mut app, 60, 12);

        assert!(screen.contains("You"));
        assert!(screen.contains("What is X?"));
        assert!(screen.contains("●○○"));
        assert!(screen.contains("waiting for answer"));
    }

    #[tokio::test]
    async fn test_long_conversation_keeps_latest_message_visible() {
        let mut app = app_with(StubApi::answering("unused"));
        render(&mut app, 40, 10);

        for i in 0..10 {
            app.ui
                .append_message(&format!("answer number {i}"), Sender::Bot, false);
        }
        let screen = render(&mut app, 40, 10);

        assert!(screen.contains("answer number 9"));
        assert!(!screen.contains("answer number 0"));
    }
}
