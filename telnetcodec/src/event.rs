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

use super::TelnetOption;
use crate::naws::WindowSize;
use bytes::Bytes;

///
/// `TelnetEvent` is one decoded unit of post-handshake client input.
///
/// Everything except [`TelnetEvent::Data`] is protocol traffic that must not
/// reach the authentication gate or the line editor.
///
#[derive(Clone, Debug, PartialEq)]
pub enum TelnetEvent {
    /// Telnet Data Byte
    Data(u8),
    /// Two byte command such as `IAC NOP` or `IAC IP`
    Command(u8),
    /// Peer asks us to enable an option
    Do(TelnetOption),
    /// Peer asks us to disable an option
    Dont(TelnetOption),
    /// Peer offers to enable an option
    Will(TelnetOption),
    /// Peer refuses an option
    Wont(TelnetOption),
    /// Parsed NAWS report
    WindowSize(WindowSize),
    /// Any other subnegotiation payload
    Subnegotiate(TelnetOption, Bytes),
}
