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

//! Escape sequence classification.
//!
//! Bodies are the accumulated sequence minus its two byte introducer, so the
//! Up arrow `ESC [ A` arrives here as `"A"` and Delete `ESC [ 3 ~` as `"3~"`.

use crate::{TerminalError, TerminalResult, TerminalSize};

/// Final bytes that complete an escape sequence
pub const TERMINATORS: &[char] = &['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', '~', 'R', 'n', 'c'];

/// Check if `ch` completes an escape sequence
pub fn is_terminator(ch: char) -> bool {
    TERMINATORS.contains(&ch)
}

/// Editor action selected by an escape body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EscapeAction {
    /// Up arrow
    HistoryOlder,
    /// Down arrow
    HistoryNewer,
    /// Right arrow
    CursorRight,
    /// Left arrow
    CursorLeft,
    /// Delete key
    DeleteForward,
    /// Insert key
    ToggleInsert,
    /// Home key
    Home,
    /// End key
    End,
    /// Ctrl-Left
    WordLeft,
    /// Ctrl-Right
    WordRight,
    /// Cursor position report, `rows;cols` without the `R`
    CursorReport(String),
    /// `>...c`, body without the marker and terminator
    ExtendedAttributes(String),
    /// `?...c`, body without the marker and terminator
    DeviceAttributes(String),
    /// Anything else
    Ignore,
}

impl EscapeAction {
    /// Select the action for `body`.
    ///
    /// Keyed on the final byte first and the exact body second, so the result
    /// never depends on match arm order.
    pub fn classify(body: &str) -> EscapeAction {
        let Some(terminator) = body.chars().last() else {
            return EscapeAction::Ignore;
        };
        let params = &body[..body.len() - terminator.len_utf8()];
        match terminator {
            'A' | 'B' | 'C' | 'D' | 'F' | 'H' => match (terminator, params) {
                ('A', "") => EscapeAction::HistoryOlder,
                ('B', "") => EscapeAction::HistoryNewer,
                ('C', "") => EscapeAction::CursorRight,
                ('D', "") => EscapeAction::CursorLeft,
                ('C', "1;5") => EscapeAction::WordRight,
                ('D', "1;5") => EscapeAction::WordLeft,
                ('H', "") => EscapeAction::Home,
                ('F', "") => EscapeAction::End,
                _ => EscapeAction::Ignore,
            },
            '~' => match params {
                "1" => EscapeAction::Home,
                "2" => EscapeAction::ToggleInsert,
                "3" => EscapeAction::DeleteForward,
                "4" => EscapeAction::End,
                _ => EscapeAction::Ignore,
            },
            'R' => EscapeAction::CursorReport(params.to_string()),
            'c' => {
                if let Some(attributes) = params.strip_prefix('>') {
                    EscapeAction::ExtendedAttributes(attributes.to_string())
                } else if let Some(attributes) = params.strip_prefix('?') {
                    EscapeAction::DeviceAttributes(attributes.to_string())
                } else {
                    EscapeAction::Ignore
                }
            }
            _ => EscapeAction::Ignore,
        }
    }
}

/// Parse a cursor position report body `rows;cols`.
pub fn parse_cursor_report(params: &str) -> TerminalResult<TerminalSize> {
    let malformed = || TerminalError::MalformedReport(params.to_string());
    let (rows, cols) = params.split_once(';').ok_or_else(malformed)?;
    let rows = rows.trim().parse::<usize>().map_err(|_| malformed())?;
    let cols = cols.trim().parse::<usize>().map_err(|_| malformed())?;
    Ok(TerminalSize::new(cols, rows))
}
