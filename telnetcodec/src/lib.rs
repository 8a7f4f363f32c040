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

//! # Teleconsole Telnet Protocol Support
//!
//! The console speaks just enough telnet to take over a client's terminal:
//!
//! - **Negotiation**: [`negotiate`] plays a fixed [`NegotiationScript`] of
//!   option bursts (RFC 854 `DO`/`WILL`/`SB`), draining but never parsing the
//!   replies, then sends the password prompt.
//! - **Input filtering**: [`TelnetInputCodec`] strips telnet commands that
//!   arrive after the handshake and reports NAWS window sizes, so only user
//!   keystrokes reach the authentication gate and the line editor.
//!
//! Option negotiation is deliberately one-shot; the server never answers
//! `DO`/`WILL` sent by the client after the handshake.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::len_without_is_empty
)]

mod codec;
pub mod consts;
mod event;
pub mod naws;
mod negotiation;
mod options;
mod result;

pub use self::codec::{FilteredInput, TelnetInputCodec};
pub use self::event::TelnetEvent;
pub use self::negotiation::{
    DEFAULT_PROMPT, DEFAULT_REPLY_TIMEOUT, DEFAULT_STEP_DELAY, DRAIN_CHUNK, NegotiationScript,
    NegotiationStep, negotiate,
};
pub use self::options::TelnetOption;
pub use self::result::{CodecError, CodecResult, NegotiationError, NegotiationResult};
