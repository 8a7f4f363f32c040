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

use crate::naws::WindowSize;
use crate::{CodecError, TelnetEvent, TelnetOption, consts};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{trace, warn};

/// Longest subnegotiation payload kept before the sequence is abandoned
const MAX_SUBNEGOTIATION: usize = 256;

///
/// Stateful filter that separates client data from telnet commands.
///
/// Negotiation replies can straggle in after the handshake has finished, so
/// every chunk read from a connection passes through this decoder. Commands
/// are consumed (`IAC IAC` is unescaped to a literal `0xFF`) and state is kept
/// across chunk boundaries, so a command split over two reads is still removed.
///
/// # Example
///
/// ```
/// use teleconsole_telnetcodec::{TelnetInputCodec, consts};
///
/// let mut codec = TelnetInputCodec::new();
/// let filtered = codec.filter(&[b'h', consts::IAC, consts::WILL, 24, b'i']);
/// assert_eq!(filtered.data, b"hi");
/// assert_eq!(filtered.events.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TelnetInputCodec {
    decoder_state: DecoderState,
    decoder_buffer: BytesMut,
}

/// Output of [`TelnetInputCodec::filter`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredInput {
    /// Client data with all telnet commands removed
    pub data: Vec<u8>,
    /// Commands seen in the chunk, in arrival order
    pub events: Vec<TelnetEvent>,
}

impl FilteredInput {
    /// Window size from the last NAWS report in this chunk, if any
    pub fn window_size(&self) -> Option<WindowSize> {
        self.events.iter().rev().find_map(|event| match event {
            TelnetEvent::WindowSize(size) => Some(*size),
            _ => None,
        })
    }
}

impl TelnetInputCodec {
    /// Create a decoder in the normal data state
    pub fn new() -> TelnetInputCodec {
        TelnetInputCodec::default()
    }

    /// Check if the decoder is partway through a command
    pub fn is_mid_command(&self) -> bool {
        !matches!(self.decoder_state, DecoderState::NormalData)
    }

    /// Split one received chunk into data bytes and telnet events.
    pub fn filter(&mut self, chunk: &[u8]) -> FilteredInput {
        let mut src = BytesMut::from(chunk);
        let mut filtered = FilteredInput::default();
        // Decoding never fails; errors are reported as warnings and skipped.
        while let Ok(Some(event)) = self.decode(&mut src) {
            match event {
                TelnetEvent::Data(byte) => filtered.data.push(byte),
                event => filtered.events.push(event),
            }
        }
        filtered
    }

    fn complete_subnegotiation(&mut self, option: u8) -> TelnetEvent {
        let option = TelnetOption::from_u8(option);
        let payload = self.decoder_buffer.split().freeze();
        match option {
            TelnetOption::NAWS => match WindowSize::decode(&payload) {
                Ok(size) => TelnetEvent::WindowSize(size),
                Err(error) => {
                    warn!("Discarding NAWS report: {}", error);
                    TelnetEvent::Subnegotiate(option, payload)
                }
            },
            _ => TelnetEvent::Subnegotiate(option, payload),
        }
    }
}

impl Decoder for TelnetInputCodec {
    type Item = TelnetEvent;
    type Error = CodecError;

    /// Decode one event from `src`, returning `Ok(None)` once the buffer is exhausted.
    ///
    /// Option commands are reported but never answered; the server's position
    /// on every option is fixed by the handshake.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetEvent>, Self::Error> {
        while src.remaining() > 0 {
            let byte = src.get_u8();
            match (self.decoder_state, byte) {
                (DecoderState::NormalData, consts::IAC) => {
                    self.decoder_state = DecoderState::InterpretAsCommand;
                }
                (DecoderState::NormalData, _) => {
                    return Ok(Some(TelnetEvent::Data(byte)));
                }
                (DecoderState::InterpretAsCommand, consts::IAC) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Data(consts::IAC)));
                }
                (DecoderState::InterpretAsCommand, consts::DO) => {
                    self.decoder_state = DecoderState::Negotiate(consts::DO);
                }
                (DecoderState::InterpretAsCommand, consts::DONT) => {
                    self.decoder_state = DecoderState::Negotiate(consts::DONT);
                }
                (DecoderState::InterpretAsCommand, consts::WILL) => {
                    self.decoder_state = DecoderState::Negotiate(consts::WILL);
                }
                (DecoderState::InterpretAsCommand, consts::WONT) => {
                    self.decoder_state = DecoderState::Negotiate(consts::WONT);
                }
                (DecoderState::InterpretAsCommand, consts::SB) => {
                    self.decoder_state = DecoderState::Subnegotiate;
                }
                (DecoderState::InterpretAsCommand, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    trace!("Received command {:#X}", byte);
                    return Ok(Some(TelnetEvent::Command(byte)));
                }
                (DecoderState::Negotiate(verb), _) => {
                    self.decoder_state = DecoderState::NormalData;
                    let option = TelnetOption::from_u8(byte);
                    trace!("Received negotiation {:#X} {}", verb, option);
                    let event = match verb {
                        consts::DO => TelnetEvent::Do(option),
                        consts::DONT => TelnetEvent::Dont(option),
                        consts::WILL => TelnetEvent::Will(option),
                        _ => TelnetEvent::Wont(option),
                    };
                    return Ok(Some(event));
                }
                (DecoderState::Subnegotiate, _) => {
                    self.decoder_buffer.clear();
                    self.decoder_state = DecoderState::SubnegotiateArgument(byte);
                }
                (DecoderState::SubnegotiateArgument(option), consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateArgumentIAC(option);
                }
                (DecoderState::SubnegotiateArgument(option), _) => {
                    if self.decoder_buffer.len() >= MAX_SUBNEGOTIATION {
                        warn!(
                            "Subnegotiation for option {:#X} exceeded {} bytes. Discarding",
                            option, MAX_SUBNEGOTIATION
                        );
                        self.decoder_buffer.clear();
                        self.decoder_state = DecoderState::SubnegotiateDiscard;
                        continue;
                    }
                    self.decoder_buffer.put_u8(byte);
                }
                (DecoderState::SubnegotiateDiscard, consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateDiscardIAC;
                }
                (DecoderState::SubnegotiateDiscard, _) => {}
                (DecoderState::SubnegotiateDiscardIAC, consts::SE) => {
                    self.decoder_state = DecoderState::NormalData;
                }
                (DecoderState::SubnegotiateDiscardIAC, _) => {
                    self.decoder_state = DecoderState::SubnegotiateDiscard;
                }
                (DecoderState::SubnegotiateArgumentIAC(option), consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateArgument(option);
                    self.decoder_buffer.put_u8(consts::IAC);
                }
                (DecoderState::SubnegotiateArgumentIAC(option), consts::SE) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(self.complete_subnegotiation(option)));
                }
                (DecoderState::SubnegotiateArgumentIAC(_), _) => {
                    self.decoder_state = DecoderState::NormalData;
                    self.decoder_buffer.clear();
                    warn!(
                        "Received Unknown or invalid Command during Subnegotiation {:#X}. Aborting",
                        byte
                    );
                }
            }
        }
        Ok(None)
    }
}

/// Decoder position within the telnet command grammar.
#[derive(Clone, Copy, Debug, Default)]
enum DecoderState {
    /// Normal Data
    #[default]
    NormalData,
    /// Received IAC, Next byte is Command
    InterpretAsCommand,
    /// Received DO, DONT, WILL or WONT, Next byte is the option
    Negotiate(u8),
    /// Received Subnegotiate Command, Next Byte is the option
    Subnegotiate,
    /// Received Subnegotiate Option, Next Bytes are arguments
    SubnegotiateArgument(u8),
    /// Received IAC during Subnegotiation, Next Byte is command
    SubnegotiateArgumentIAC(u8),
    /// Subnegotiation too long, skipping until IAC SE
    SubnegotiateDiscard,
    /// Received IAC while skipping, Next Byte may end the subnegotiation
    SubnegotiateDiscardIAC,
}

#[cfg(test)]
mod tests {
    use super::*;
    use consts::{DO, IAC, NOP, SB, SE, WILL, WONT, option};
    use tracing_test::traced_test;

    #[test]
    fn plain_data_passes_through() {
        let mut codec = TelnetInputCodec::new();
        let filtered = codec.filter(b"hello\r");
        assert_eq!(filtered.data, b"hello\r");
        assert!(filtered.events.is_empty());
    }

    #[test]
    fn iac_iac_is_literal() {
        let mut codec = TelnetInputCodec::new();
        let filtered = codec.filter(&[b'a', IAC, IAC, b'b']);
        assert_eq!(filtered.data, vec![b'a', 0xFF, b'b']);
    }

    #[test]
    fn negotiation_is_removed() {
        let mut codec = TelnetInputCodec::new();
        let filtered = codec.filter(&[IAC, WILL, option::TTYPE, b'x', IAC, WONT, option::ECHO]);
        assert_eq!(filtered.data, b"x");
        assert_eq!(
            filtered.events,
            vec![
                TelnetEvent::Will(TelnetOption::TTYPE),
                TelnetEvent::Wont(TelnetOption::Echo)
            ]
        );
    }

    #[test]
    fn two_byte_command() {
        let mut codec = TelnetInputCodec::new();
        let filtered = codec.filter(&[IAC, NOP, b'z']);
        assert_eq!(filtered.data, b"z");
        assert_eq!(filtered.events, vec![TelnetEvent::Command(NOP)]);
    }

    #[test]
    fn naws_report_is_parsed() {
        let mut codec = TelnetInputCodec::new();
        let filtered = codec.filter(&[IAC, SB, option::NAWS, 0, 120, 0, 40, IAC, SE]);
        assert!(filtered.data.is_empty());
        assert_eq!(filtered.window_size(), Some(WindowSize::new(120, 40)));
    }

    #[test]
    fn naws_with_escaped_iac() {
        let mut codec = TelnetInputCodec::new();
        let filtered = codec.filter(&[IAC, SB, option::NAWS, 0, IAC, IAC, 0, 24, IAC, SE]);
        assert_eq!(filtered.window_size(), Some(WindowSize::new(255, 24)));
    }

    #[test]
    #[traced_test]
    fn short_naws_report_is_discarded() {
        let mut codec = TelnetInputCodec::new();
        let filtered = codec.filter(&[IAC, SB, option::NAWS, 0, 80, IAC, SE]);
        assert_eq!(filtered.window_size(), None);
        assert_eq!(filtered.events.len(), 1);
        assert!(logs_contain("Discarding NAWS report"));
    }

    #[test]
    fn command_split_across_chunks() {
        let mut codec = TelnetInputCodec::new();
        let first = codec.filter(&[b'a', IAC]);
        assert_eq!(first.data, b"a");
        assert!(codec.is_mid_command());
        let second = codec.filter(&[DO, option::NAWS, b'b']);
        assert_eq!(second.data, b"b");
        assert_eq!(second.events, vec![TelnetEvent::Do(TelnetOption::NAWS)]);
        assert!(!codec.is_mid_command());
    }

    #[test]
    fn terminal_type_reply_is_opaque() {
        let mut codec = TelnetInputCodec::new();
        let mut chunk = vec![IAC, SB, option::TTYPE, consts::subneg::IS];
        chunk.extend_from_slice(b"XTERM");
        chunk.extend_from_slice(&[IAC, SE]);
        let filtered = codec.filter(&chunk);
        assert!(filtered.data.is_empty());
        match &filtered.events[..] {
            [TelnetEvent::Subnegotiate(TelnetOption::TTYPE, payload)] => {
                assert_eq!(&payload[..], b"\0XTERM");
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    #[traced_test]
    fn oversized_subnegotiation_is_swallowed() {
        let mut codec = TelnetInputCodec::new();
        let mut chunk = vec![IAC, SB, option::NEW_ENVIRON, consts::subneg::IS];
        chunk.extend(std::iter::repeat_n(b'V', 300));
        chunk.extend_from_slice(&[IAC, IAC, b'V', IAC, SE, b'o', b'k']);
        let filtered = codec.filter(&chunk);
        assert_eq!(filtered.data, b"ok");
        assert!(filtered.events.is_empty());
        assert!(!codec.is_mid_command());
        assert!(logs_contain("exceeded 256 bytes"));
    }

    #[test]
    fn oversized_subnegotiation_split_across_chunks() {
        let mut codec = TelnetInputCodec::new();
        let mut first = vec![IAC, SB, option::TTYPE, consts::subneg::IS];
        first.extend(std::iter::repeat_n(b'X', 400));
        first.push(IAC);
        assert!(codec.filter(&first).data.is_empty());
        assert!(codec.is_mid_command());
        let second = codec.filter(&[SE, b'p', b'a', b's', b's', b'\r']);
        assert_eq!(second.data, b"pass\r");
    }

    #[test]
    fn invalid_subnegotiation_terminator_aborts() {
        let mut codec = TelnetInputCodec::new();
        let filtered = codec.filter(&[IAC, SB, option::NAWS, 0, IAC, b'q', b'r']);
        assert_eq!(filtered.data, b"r");
        assert!(filtered.events.is_empty());
    }
}
