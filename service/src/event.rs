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

use crate::ConnectionId;
use enum_kinds::EnumKind;
use std::net::SocketAddr;
use teleconsole_terminal::EditorEvent;

/// Events returned by [`crate::TelnetConsole::poll`].
#[derive(Clone, Debug, PartialEq, Eq, EnumKind)]
#[enum_kind(ConsoleEventKind)]
pub enum ConsoleEvent {
    /// A client finished the handshake and was shown the password prompt
    Connected {
        connection: ConnectionId,
        peer_addr: SocketAddr,
    },
    /// A client entered the right password
    Authenticated { connection: ConnectionId },
    /// A client entered a wrong password and is being disconnected
    AuthenticationFailed { connection: ConnectionId },
    /// A client left or was torn down
    Disconnected { connection: ConnectionId },
    /// Line editor output produced by `connection`'s keystrokes
    Input {
        connection: ConnectionId,
        event: EditorEvent,
    },
}

impl ConsoleEvent {
    /// Connection the event concerns
    pub fn connection(&self) -> ConnectionId {
        match self {
            ConsoleEvent::Connected { connection, .. }
            | ConsoleEvent::Authenticated { connection }
            | ConsoleEvent::AuthenticationFailed { connection }
            | ConsoleEvent::Disconnected { connection }
            | ConsoleEvent::Input { connection, .. } => *connection,
        }
    }
}
