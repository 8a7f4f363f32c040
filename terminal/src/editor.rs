//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::escape::{EscapeAction, is_terminator, parse_cursor_report};
use crate::{EditorEvent, HistoryProvider, TerminalSize, echo};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default gap after which a partial escape sequence is abandoned
pub const DEFAULT_ESCAPE_TIMEOUT: Duration = Duration::from_millis(100);

/// Longest escape sequence accumulated before it is abandoned
pub const MAX_ESCAPE_LENGTH: usize = 32;

const CTRL_A: char = '\x01';
const CTRL_C: char = '\x03';
const BACKSPACE: char = '\x08';
const DELETE: char = '\x7f';
const ESCAPE: char = '\x1b';

#[derive(Clone, Debug, PartialEq, Eq)]
enum EditorState {
    Normal,
    ReadingEscape { sequence: String },
}

///
/// Character-at-a-time line editor.
///
/// The client's local echo is off, so every keystroke lands here and the
/// editor writes the visual feedback into an echo buffer supplied by the
/// caller. Completed lines and control keys come back as [`EditorEvent`]s.
///
/// The cursor always satisfies `0 <= cursor <= line length`.
///
/// # Example
///
/// ```
/// use teleconsole_terminal::{EditorEvent, LineEditor, NoHistory};
/// use std::time::Instant;
///
/// let mut editor = LineEditor::new();
/// let mut echo = String::new();
/// let events = editor.process("ls\r", Instant::now(), &NoHistory, &mut echo);
/// assert_eq!(events, vec![EditorEvent::LineCompleted { line: "ls".to_string() }]);
/// ```
#[derive(Clone, Debug)]
pub struct LineEditor {
    line: Vec<char>,
    cursor: usize,
    insert_mode: bool,
    state: EditorState,
    last_input: Option<Instant>,
    history_index: Option<usize>,
    size: TerminalSize,
    terminal_type: String,
    terminal_type_ex: String,
    escape_timeout: Duration,
    after_carriage_return: bool,
}

impl Default for LineEditor {
    fn default() -> Self {
        LineEditor::new()
    }
}

impl LineEditor {
    /// Create an empty editor in insert mode with an 80x24 geometry
    pub fn new() -> Self {
        LineEditor {
            line: Vec::new(),
            cursor: 0,
            insert_mode: true,
            state: EditorState::Normal,
            last_input: None,
            history_index: None,
            size: TerminalSize::default(),
            terminal_type: String::new(),
            terminal_type_ex: String::new(),
            escape_timeout: DEFAULT_ESCAPE_TIMEOUT,
            after_carriage_return: false,
        }
    }

    /// Set the escape staleness window
    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    /// Current line content
    pub fn line(&self) -> String {
        self.line.iter().collect()
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn is_reading_escape(&self) -> bool {
        matches!(self.state, EditorState::ReadingEscape { .. })
    }

    /// History position; `None` is the rest position before the newest entry
    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    pub fn size(&self) -> TerminalSize {
        self.size
    }

    /// Update the geometry from an out-of-band report such as NAWS
    pub fn set_size(&mut self, size: TerminalSize) {
        self.size = size;
    }

    /// Body of the last `?...c` device attributes report
    pub fn terminal_type(&self) -> &str {
        &self.terminal_type
    }

    /// Body of the last `>...c` extended device attributes report
    pub fn extended_terminal_type(&self) -> &str {
        &self.terminal_type_ex
    }

    /// Time of the most recent input character
    pub fn last_input(&self) -> Option<Instant> {
        self.last_input
    }

    /// Feed every character of `input`, collecting events.
    ///
    /// A stale partial escape sequence is expired before each character.
    pub fn process(
        &mut self,
        input: &str,
        now: Instant,
        history: &dyn HistoryProvider,
        echo: &mut String,
    ) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        for ch in input.chars() {
            events.extend(self.expire(now));
            events.extend(self.process_char(ch, now, history, echo));
        }
        events
    }

    /// Abandon a partial escape sequence once the gap since the previous
    /// character exceeds the escape timeout.
    pub fn expire(&mut self, now: Instant) -> Option<EditorEvent> {
        if !self.is_reading_escape() {
            return None;
        }
        let last = self.last_input?;
        if now.saturating_duration_since(last) <= self.escape_timeout {
            return None;
        }
        debug!("Abandoning stale escape sequence");
        Some(self.abandon_escape())
    }

    /// Consume one character.
    ///
    /// Staleness is not checked here; [`LineEditor::process`] and the poll
    /// loop call [`LineEditor::expire`] first.
    pub fn process_char(
        &mut self,
        ch: char,
        now: Instant,
        history: &dyn HistoryProvider,
        echo: &mut String,
    ) -> Option<EditorEvent> {
        self.last_input = Some(now);
        let after_carriage_return = std::mem::take(&mut self.after_carriage_return);

        if let EditorState::ReadingEscape { sequence } = &mut self.state {
            sequence.push(ch);
            if is_terminator(ch) {
                let body: String = sequence.chars().skip(2).collect();
                self.state = EditorState::Normal;
                trace!(body = %body.escape_debug(), "Escape sequence complete");
                return self.dispatch(&body, history, echo);
            }
            if sequence.chars().count() >= MAX_ESCAPE_LENGTH {
                warn!("Escape sequence exceeded {} characters", MAX_ESCAPE_LENGTH);
                return Some(self.abandon_escape());
            }
            return None;
        }

        match ch {
            ESCAPE => {
                self.state = EditorState::ReadingEscape {
                    sequence: ch.to_string(),
                };
                None
            }
            CTRL_C => Some(EditorEvent::Interrupt),
            CTRL_A => Some(EditorEvent::Exit),
            BACKSPACE | DELETE => {
                self.backspace(echo);
                None
            }
            '\n' if after_carriage_return => None,
            '\r' | '\n' => {
                self.after_carriage_return = ch == '\r';
                Some(self.submit(echo))
            }
            ch if ch.is_control() => None,
            ch => {
                self.insert(ch, echo);
                None
            }
        }
    }

    /// Replace the line with `text`, redrawing it in place.
    ///
    /// The cursor keeps its position, clamped to the new length, so repeated
    /// history recall keeps searching with the same prefix.
    pub fn replace_line(&mut self, text: &str, echo: &mut String) {
        echo::cursor_left(echo, self.cursor);
        echo.push_str(echo::ERASE_TO_END_OF_LINE);
        echo.push_str(text);
        self.line = text.chars().collect();
        self.cursor = self.cursor.min(self.line.len());
        echo::cursor_left(echo, self.line.len() - self.cursor);
    }

    fn abandon_escape(&mut self) -> EditorEvent {
        self.state = EditorState::Normal;
        EditorEvent::UnhandledEscape {
            line: self.line(),
            cursor: self.cursor,
        }
    }

    fn submit(&mut self, echo: &mut String) -> EditorEvent {
        echo.push_str(echo::NEWLINE);
        let line = self.line();
        self.line.clear();
        self.cursor = 0;
        self.history_index = None;
        EditorEvent::LineCompleted { line }
    }

    fn insert(&mut self, ch: char, echo: &mut String) {
        if self.insert_mode {
            self.line.insert(self.cursor, ch);
            echo.push_str(echo::INSERT_CHARACTER);
        } else if self.cursor < self.line.len() {
            self.line[self.cursor] = ch;
        } else {
            self.line.push(ch);
        }
        echo.push(ch);
        self.cursor += 1;
    }

    fn backspace(&mut self, echo: &mut String) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.line.remove(self.cursor);
        echo::backspace(echo, &self.line[self.cursor..]);
    }

    fn dispatch(
        &mut self,
        body: &str,
        history: &dyn HistoryProvider,
        echo: &mut String,
    ) -> Option<EditorEvent> {
        match EscapeAction::classify(body) {
            EscapeAction::HistoryOlder => self.recall(true, history, echo),
            EscapeAction::HistoryNewer => self.recall(false, history, echo),
            EscapeAction::CursorRight => {
                if self.cursor < self.line.len() {
                    self.cursor += 1;
                    echo.push_str(echo::CURSOR_RIGHT);
                }
            }
            EscapeAction::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    echo.push_str(echo::CURSOR_LEFT);
                }
            }
            EscapeAction::DeleteForward => {
                if self.cursor < self.line.len() {
                    self.line.remove(self.cursor);
                    echo.push_str(echo::DELETE_CHARACTER);
                }
            }
            EscapeAction::ToggleInsert => self.insert_mode = !self.insert_mode,
            EscapeAction::Home => {
                echo::cursor_left(echo, self.cursor);
                self.cursor = 0;
            }
            EscapeAction::End => {
                echo::cursor_right(echo, self.line.len() - self.cursor);
                self.cursor = self.line.len();
            }
            EscapeAction::WordLeft => {
                let start = self.cursor;
                while self.cursor > 0 && self.line[self.cursor - 1].is_whitespace() {
                    self.cursor -= 1;
                }
                while self.cursor > 0 && !self.line[self.cursor - 1].is_whitespace() {
                    self.cursor -= 1;
                }
                echo::cursor_left(echo, start - self.cursor);
            }
            EscapeAction::WordRight => {
                let start = self.cursor;
                while self.cursor < self.line.len() && !self.line[self.cursor].is_whitespace() {
                    self.cursor += 1;
                }
                while self.cursor < self.line.len() && self.line[self.cursor].is_whitespace() {
                    self.cursor += 1;
                }
                echo::cursor_right(echo, self.cursor - start);
            }
            EscapeAction::CursorReport(params) => match parse_cursor_report(&params) {
                Ok(size) => {
                    debug!(%size, "Terminal geometry reported");
                    self.size = size;
                    return Some(EditorEvent::SizeChanged { size });
                }
                Err(error) => warn!("Ignoring terminal size report: {}", error),
            },
            EscapeAction::ExtendedAttributes(attributes) => {
                self.terminal_type_ex = attributes;
                return Some(EditorEvent::Attributes {
                    sequence: body.to_string(),
                });
            }
            EscapeAction::DeviceAttributes(attributes) => {
                self.terminal_type = attributes;
                return Some(EditorEvent::Attributes {
                    sequence: body.to_string(),
                });
            }
            EscapeAction::Ignore => trace!(body = %body.escape_debug(), "Ignoring escape sequence"),
        }
        None
    }

    /// Up (`older`) or Down history recall. Down is refused at or before the
    /// newest entry; a miss leaves the index where it was.
    fn recall(&mut self, older: bool, history: &dyn HistoryProvider, echo: &mut String) {
        let next = match (older, self.history_index) {
            (true, None) => 0,
            (true, Some(index)) => index + 1,
            (false, Some(index)) if index >= 1 => index - 1,
            (false, _) => return,
        };
        let prefix: String = self.line[..self.cursor].iter().collect();
        if let Some(entry) = history.find(&prefix, next) {
            self.history_index = Some(next);
            self.replace_line(&entry, echo);
        }
    }
}
