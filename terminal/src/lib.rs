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

//! # Teleconsole Terminal
//!
//! Server-side line editing for a telnet client whose local echo has been
//! switched off. [`LineEditor`] consumes decoded characters one at a time,
//! maintains the line and cursor, decodes the escape sequences sent by
//! cursor and editing keys, and produces the echo that keeps the client's
//! screen in step.

pub mod echo;
mod editor;
mod escape;
mod event;
mod history;
mod result;
mod types;

pub use self::editor::{DEFAULT_ESCAPE_TIMEOUT, LineEditor, MAX_ESCAPE_LENGTH};
pub use self::escape::{EscapeAction, TERMINATORS, is_terminator, parse_cursor_report};
pub use self::event::{EditorEvent, EditorEventKind};
pub use self::history::{HistoryProvider, MemoryHistory, NoHistory};
pub use self::result::{TerminalError, TerminalResult};
pub use self::types::TerminalSize;
