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

//! Escape sequences echoed back to the client while editing.

use std::fmt::Write;

/// Newline sent when a line is submitted
pub const NEWLINE: &str = "\r\n";
/// Shift the rest of the line right by one cell
pub const INSERT_CHARACTER: &str = "\x1b[@";
/// Delete the cell under the cursor, shifting the rest left
pub const DELETE_CHARACTER: &str = "\x1b[1P";
/// Clear from the cursor to the end of the line
pub const ERASE_TO_END_OF_LINE: &str = "\x1b[K";
/// One cell right
pub const CURSOR_RIGHT: &str = "\x1b[C";
/// One cell left
pub const CURSOR_LEFT: &str = "\x1b[D";

/// Move the cursor `count` cells left; nothing for zero.
pub fn cursor_left(out: &mut String, count: usize) {
    if count > 0 {
        let _ = write!(out, "\x1b[{count}D");
    }
}

/// Move the cursor `count` cells right; nothing for zero.
pub fn cursor_right(out: &mut String, count: usize) {
    if count > 0 {
        let _ = write!(out, "\x1b[{count}C");
    }
}

/// Erase the character before the cursor and redraw `tail`.
///
/// The cursor is stepped back, the tail rewritten over the gap with one blank
/// to clear the last cell, then returned with backspaces.
pub fn backspace(out: &mut String, tail: &[char]) {
    out.push_str("\x08 \x08");
    out.extend(tail.iter());
    out.push(' ');
    out.extend(std::iter::repeat_n('\x08', tail.len() + 1));
}

/// Administrative notice drawn on the top line without disturbing the cursor.
///
/// Saves the cursor, homes, prints `message` in bold yellow, resets attributes
/// and restores the cursor.
pub fn overlay(message: &str) -> String {
    format!("\x1b7\x1b[s\x1b[H\x1b[33;1m{message}\x1b[0m\x1b[u\x1b8")
}
