use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ragchat_core::Trigger;
use crate::app::App;
use crate::tui::AppEvent;

/// Rows moved per mouse wheel notch
const WHEEL_STEP: i32 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit(Trigger::Enter),

        // Conversation scrolling
        KeyCode::PageUp => app.scroll_chat(-app.page_size()),
        KeyCode::PageDown => app.scroll_chat(app.page_size()),
        KeyCode::Up => app.scroll_chat(-1),
        KeyCode::Down => app.scroll_chat(1),

        // Input editing; the field ignores these while disabled
        code => {
            let Some(input) = app.ui.input_mut() else {
                return;
            };
            match code {
                KeyCode::Backspace => input.backspace(),
                KeyCode::Delete => input.delete(),
                KeyCode::Left => input.move_left(),
                KeyCode::Right => input.move_right(),
                KeyCode::Home => input.move_home(),
                KeyCode::End => input.move_end(),
                // Ctrl/Alt chords are shortcuts, not text
                KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                    input.insert_char(c)
                }
                _ => {}
            }
        }
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let position = Position::new(mouse.column, mouse.row);
    let inside = |area: Option<Rect>| area.is_some_and(|a| a.contains(position));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if inside(app.send_button_area) => {
            app.submit(Trigger::Click);
        }
        MouseEventKind::ScrollUp if inside(app.chat_area) => app.scroll_chat(-WHEEL_STEP),
        MouseEventKind::ScrollDown if inside(app.chat_area) => app.scroll_chat(WHEEL_STEP),
        _ => {}
    }
}
