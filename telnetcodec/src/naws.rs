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

//! Negotiate About Window Size
//!

use crate::{CodecError, CodecResult, TelnetOption};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Window dimensions carried by a NAWS subnegotiation.
///
/// Encoded as four bytes in big-endian order: columns then rows.
///
/// # Example
/// ```
/// use teleconsole_telnetcodec::naws::WindowSize;
///
/// let size = WindowSize::decode(&[0, 132, 0, 43]).unwrap();
/// assert_eq!(size, WindowSize::new(132, 43));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    /// The number of columns (characters) in the terminal window
    pub cols: u16,
    /// The number of rows (lines) in the terminal window
    pub rows: u16,
}

impl WindowSize {
    /// Creates a new `WindowSize`
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// Parse a NAWS payload (without the `IAC SB NAWS` framing).
    pub fn decode(mut payload: &[u8]) -> CodecResult<WindowSize> {
        if payload.len() != 4 {
            return Err(CodecError::SubnegotiationError {
                option: TelnetOption::NAWS,
                reason: format!("expected 4 bytes, found {}", payload.len()),
            });
        }
        let cols = payload.read_u16::<BigEndian>()?;
        let rows = payload.read_u16::<BigEndian>()?;
        Ok(WindowSize { cols, rows })
    }

    /// Writes the payload to `writer`, returning the number of bytes written.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(WindowSize::decode(&[0, 80, 0, 24]).unwrap(), WindowSize::new(80, 24));
        assert_eq!(
            WindowSize::decode(&[0x01, 0x00, 0x00, 0xFF]).unwrap(),
            WindowSize::new(256, 255)
        );
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(WindowSize::decode(&[0, 80, 0]).is_err());
        assert!(WindowSize::decode(&[0, 80, 0, 24, 0]).is_err());
    }

    #[test]
    fn test_write() {
        let mut buffer = Vec::new();
        assert_eq!(WindowSize::new(100, 30).write(&mut buffer).unwrap(), 4);
        assert_eq!(buffer, vec![0, 100, 0, 30]);
    }
}
