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

use crate::TelnetOption;

/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Result Type for the negotiation handshake
pub type NegotiationResult<T> = Result<T, NegotiationError>;

/// Errors raised while decoding client input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    #[error("I/O error during {operation}: {kind:?}")]
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// Subnegotiation payload could not be parsed.
    #[error("Subnegotiation error for {option}: {reason}")]
    SubnegotiationError {
        /// The telnet option being subnegotiated
        option: TelnetOption,
        /// Specific reason for the failure
        reason: String,
    },
}

impl From<std::io::Error> for CodecError {
    fn from(error: std::io::Error) -> Self {
        CodecError::IOError {
            kind: error.kind(),
            operation: error.to_string(),
        }
    }
}

/// Errors that abort the option negotiation handshake.
///
/// Any of these tears the connection down.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    /// Socket failure while sending a burst or draining a reply
    #[error("I/O error during negotiation: {0}")]
    Io(#[from] std::io::Error),

    /// The client did not answer a burst within the reply window
    #[error("No negotiation reply to step {step} within the reply window")]
    Timeout {
        /// Zero based index of the burst that went unanswered
        step: usize,
    },

    /// The client closed the connection mid handshake
    #[error("Connection closed during negotiation")]
    Closed,
}

impl NegotiationError {
    /// Check if the error was a reply timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, NegotiationError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_from_io() {
        let error: CodecError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(matches!(
            error,
            CodecError::IOError {
                kind: std::io::ErrorKind::BrokenPipe,
                ..
            }
        ));
    }

    #[test]
    fn test_negotiation_error_display() {
        assert_eq!(
            NegotiationError::Timeout { step: 1 }.to_string(),
            "No negotiation reply to step 1 within the reply window"
        );
        assert!(NegotiationError::Timeout { step: 2 }.is_timeout());
        assert!(!NegotiationError::Closed.is_timeout());
    }

    #[test]
    fn test_subnegotiation_error_display() {
        let error = CodecError::SubnegotiationError {
            option: TelnetOption::NAWS,
            reason: "short".to_string(),
        };
        assert_eq!(error.to_string(), "Subnegotiation error for NAWS: short");
    }
}
