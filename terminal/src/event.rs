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

use crate::types::TerminalSize;
use enum_kinds::EnumKind;

/// Events the line editor hands to the shell.
#[derive(Clone, Debug, PartialEq, Eq, EnumKind)]
#[enum_kind(EditorEventKind)]
pub enum EditorEvent {
    /// Enter pressed
    LineCompleted { line: String },
    /// Ctrl-C
    Interrupt,
    /// Ctrl-A, end of session
    Exit,
    /// Cursor position report updated the geometry
    SizeChanged { size: TerminalSize },
    /// Device attributes report, body as received
    Attributes { sequence: String },
    /// Escape sequence abandoned as stale or over long
    UnhandledEscape { line: String, cursor: usize },
}

impl EditorEvent {
    /// Check if the event ends the current command
    pub fn is_control(&self) -> bool {
        matches!(self, EditorEvent::Interrupt | EditorEvent::Exit)
    }
}
