//! Presentation layer of the chat widget
//!
//! `ChatUi` is handed the three surface elements it drives (conversation box,
//! text input, send button) when it is built. Any of them may be missing;
//! operations that need a missing element quietly do nothing so a partially
//! assembled screen never turns into an error.

use crate::config::RenderMode;
use crate::state::{Message, Sender};

/// Identifier carried by the single loading placeholder bubble
pub const LOADING_ID: &str = "loading-msg";

/// Fallback viewport used before the first draw reports real dimensions
const DEFAULT_WRAP_WIDTH: u16 = 50;
const DEFAULT_VIEWPORT_HEIGHT: u16 = 20;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// User actions that can submit the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Send button clicked
    Click,
    /// Enter pressed inside the input field
    Enter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleBody {
    Text(Vec<String>),
    Loading,
}

/// A rendered message in the conversation box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub sender: Sender,
    pub body: BubbleBody,
    pub id: Option<&'static str>,
}

impl Bubble {
    pub fn from_message(message: &Message, mode: RenderMode) -> Self {
        if message.is_loading {
            Self {
                sender: message.sender,
                body: BubbleBody::Loading,
                id: Some(LOADING_ID),
            }
        } else {
            Self {
                sender: message.sender,
                body: BubbleBody::Text(render_lines(&message.text, mode)),
                id: None,
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.body, BubbleBody::Loading)
    }

    /// Body text with line breaks restored; `None` for the loading placeholder
    pub fn text(&self) -> Option<String> {
        match &self.body {
            BubbleBody::Text(lines) => Some(lines.join("\n")),
            BubbleBody::Loading => None,
        }
    }
}

/// Split text on line breaks, sanitizing each line according to `mode`.
pub fn render_lines(text: &str, mode: RenderMode) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|line| match mode {
            RenderMode::Plain => sanitize_line(line),
            RenderMode::Raw => line.to_string(),
        })
        .collect()
}

/// Bidi embedding, override and isolate controls plus the directional marks
fn is_bidi_control(c: char) -> bool {
    matches!(
        c,
        '\u{061c}' | '\u{200e}' | '\u{200f}' | '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}'
    )
}

/// Drop control characters, escape sequences and bidi controls, expand tabs.
fn sanitize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\t' => out.push_str("    "),
            '\u{1b}' => match chars.next() {
                // CSI: parameters and intermediates run until the final byte
                Some('[') => {
                    for c in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC, DCS, SOS, PM, APC: string runs until BEL or ST (ESC \)
                Some(']' | 'P' | 'X' | '^' | '_') => {
                    while let Some(c) = chars.next() {
                        if c == '\u{7}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                // Two-character escapes take the next char with them
                _ => {}
            },
            c if c.is_control() || is_bidi_control(c) => {}
            c => out.push(c),
        }
    }

    out
}

/// Word-wrap a single line to `width` display columns.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || line.is_empty() {
        return vec![line.to_string()];
    }

    textwrap::wrap(line, width)
        .into_iter()
        .map(|row| row.into_owned())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Body,
    Loading,
    Spacer,
}

/// One display row of the conversation box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualLine {
    pub sender: Sender,
    pub kind: LineKind,
    pub text: String,
}

/// The scrollable conversation container
#[derive(Debug, Clone, Default)]
pub struct ChatBox {
    bubbles: Vec<Bubble>,
    scroll_top: u16,
    width: u16,
    height: u16,
}

impl ChatBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn scroll_top(&self) -> u16 {
        self.scroll_top
    }

    /// Record the inner size of the box; called on every draw.
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        // A box showing its last line keeps showing it across resizes
        let pinned = self.scroll_top >= self.max_scroll();
        self.width = width;
        self.height = height;
        self.scroll_top = if pinned {
            self.max_scroll()
        } else {
            self.scroll_top.min(self.max_scroll())
        };
    }

    fn wrap_width(&self) -> u16 {
        if self.width > 0 {
            self.width
        } else {
            DEFAULT_WRAP_WIDTH
        }
    }

    fn viewport_height(&self) -> u16 {
        if self.height > 0 {
            self.height
        } else {
            DEFAULT_VIEWPORT_HEIGHT
        }
    }

    /// Lay the conversation out as display rows.
    ///
    /// `frame` selects the loading animation step (0-2).
    pub fn visual_lines(&self, width: u16, frame: u8) -> Vec<VisualLine> {
        let mut lines = Vec::new();

        for bubble in &self.bubbles {
            lines.push(VisualLine {
                sender: bubble.sender,
                kind: LineKind::Header,
                text: bubble.sender.icon().to_string(),
            });

            match &bubble.body {
                BubbleBody::Text(body) => {
                    for line in body {
                        for row in wrap_line(line, width as usize) {
                            lines.push(VisualLine {
                                sender: bubble.sender,
                                kind: LineKind::Body,
                                text: row,
                            });
                        }
                    }
                }
                BubbleBody::Loading => {
                    let dots = (frame % 3) as usize + 1;
                    lines.push(VisualLine {
                        sender: bubble.sender,
                        kind: LineKind::Loading,
                        text: format!("{}{}", "●".repeat(dots), "○".repeat(3 - dots)),
                    });
                }
            }

            lines.push(VisualLine {
                sender: bubble.sender,
                kind: LineKind::Spacer,
                text: String::new(),
            });
        }

        lines
    }

    /// Total content height in rows at the current width
    pub fn scroll_height(&self) -> u16 {
        let rows = self.visual_lines(self.wrap_width(), 0).len();
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    pub fn max_scroll(&self) -> u16 {
        self.scroll_height().saturating_sub(self.viewport_height())
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.max_scroll();
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let target = i32::from(self.scroll_top) + delta;
        let clamped = target.clamp(0, i32::from(self.max_scroll()));
        self.scroll_top = u16::try_from(clamped).unwrap_or(0);
    }

    pub fn page_size(&self) -> i32 {
        i32::from((self.viewport_height() / 2).max(1))
    }

    /// Drop every bubble and reset the scroll offset.
    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.scroll_top = 0;
    }

    fn push(&mut self, bubble: Bubble) {
        self.bubbles.push(bubble);
    }

    fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.bubbles.len();
        self.bubbles.retain(|b| b.id != Some(id));
        self.bubbles.len() != before
    }
}

/// Single-line text input
#[derive(Debug, Clone, Default)]
pub struct InputField {
    value: String,
    cursor: usize, // in chars
    disabled: bool,
    focused: bool,
}

impl InputField {
    pub fn new() -> Self {
        Self {
            focused: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        if self.disabled {
            return;
        }
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.disabled || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if self.disabled {
            return;
        }
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn take_trimmed(&mut self) -> String {
        let value = self.value.trim().to_string();
        self.value.clear();
        self.cursor = 0;
        value
    }
}

#[derive(Debug, Clone, Default)]
pub struct SendButton {
    disabled: bool,
}

impl SendButton {
    pub const LABEL: &'static str = "Send";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

pub struct ChatUi {
    chat_box: Option<ChatBox>,
    input: Option<InputField>,
    send_button: Option<SendButton>,
    render_mode: RenderMode,
}

impl ChatUi {
    pub fn new(
        chat_box: Option<ChatBox>,
        input: Option<InputField>,
        send_button: Option<SendButton>,
    ) -> Self {
        Self {
            chat_box,
            input,
            send_button,
            render_mode: RenderMode::default(),
        }
    }

    /// A surface with all three elements present
    pub fn complete() -> Self {
        Self::new(
            Some(ChatBox::new()),
            Some(InputField::new()),
            Some(SendButton::new()),
        )
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn chat_box(&self) -> Option<&ChatBox> {
        self.chat_box.as_ref()
    }

    pub fn chat_box_mut(&mut self) -> Option<&mut ChatBox> {
        self.chat_box.as_mut()
    }

    pub fn input(&self) -> Option<&InputField> {
        self.input.as_ref()
    }

    pub fn input_mut(&mut self) -> Option<&mut InputField> {
        self.input.as_mut()
    }

    pub fn send_button(&self) -> Option<&SendButton> {
        self.send_button.as_ref()
    }

    pub fn append_message(&mut self, text: &str, sender: Sender, is_loading: bool) {
        let message = if is_loading {
            Message::loading(sender)
        } else {
            Message::new(text, sender)
        };
        let bubble = Bubble::from_message(&message, self.render_mode);

        if let Some(chat_box) = self.chat_box.as_mut() {
            if bubble.is_loading() {
                // Keep the placeholder unique
                chat_box.remove_by_id(LOADING_ID);
            }
            chat_box.push(bubble);
            chat_box.scroll_to_bottom();
        }
    }

    pub fn remove_loading(&mut self) {
        if let Some(chat_box) = self.chat_box.as_mut() {
            chat_box.remove_by_id(LOADING_ID);
        }
    }

    pub fn clear_messages(&mut self) {
        if let Some(chat_box) = self.chat_box.as_mut() {
            chat_box.clear();
        }
    }

    pub fn has_loading(&self) -> bool {
        self.chat_box
            .as_ref()
            .is_some_and(|b| b.bubbles().iter().any(Bubble::is_loading))
    }

    pub fn scroll_to_bottom(&mut self) {
        if let Some(chat_box) = self.chat_box.as_mut() {
            chat_box.scroll_to_bottom();
        }
    }

    /// Disable or enable the input field and send button together.
    pub fn toggle_input(&mut self, disabled: bool) {
        if let (Some(input), Some(button)) = (self.input.as_mut(), self.send_button.as_mut()) {
            input.disabled = disabled;
            button.disabled = disabled;
            // A disabled field cannot hold focus; enabling hands it back
            input.focused = !disabled;
        }
    }

    pub fn input_disabled(&self) -> bool {
        self.input.as_ref().is_some_and(InputField::is_disabled)
    }

    /// Read the trimmed input value and clear the field.
    pub fn get_input(&mut self) -> String {
        match self.input.as_mut() {
            Some(input) => input.take_trimmed(),
            None => String::new(),
        }
    }

    /// Whether a control is present and enabled to fire `trigger`
    pub fn accepts(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Click => self.send_button.as_ref().is_some_and(|b| !b.is_disabled()),
            Trigger::Enter => self.input.as_ref().is_some_and(|i| !i.is_disabled()),
        }
    }
}
