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

//! Fixed option negotiation handshake.
//!
//! The server asks the client to hand over echo and editing: it requests
//! terminal identification, then announces `WILL ECHO` / `WILL SGA` so every
//! keystroke arrives immediately. Replies are drained but never parsed.

use crate::consts::{DO, IAC, SB, SE, WILL, option, subneg};
use crate::{NegotiationError, NegotiationResult};
use bytes::Bytes;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, trace};

/// Default pause after every burst
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(100);

/// Default wait for a reply to a draining burst
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default prompt sent once negotiation is complete
pub const DEFAULT_PROMPT: &[u8] = b"Password: ";

/// Largest reply drained per burst
pub const DRAIN_CHUNK: usize = 1024;

/// One burst of the handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegotiationStep {
    /// Bytes written to the client
    pub bytes: Bytes,
    /// Whether to wait for and discard a reply after the delay
    pub await_reply: bool,
}

impl NegotiationStep {
    /// Create a step
    pub fn new(bytes: impl Into<Bytes>, await_reply: bool) -> Self {
        NegotiationStep {
            bytes: bytes.into(),
            await_reply,
        }
    }
}

/// Ordered negotiation bursts followed by a prompt.
///
/// # Example
///
/// ```
/// use teleconsole_telnetcodec::NegotiationScript;
/// use std::time::Duration;
///
/// let script = NegotiationScript::default()
///     .with_prompt("Passphrase: ")
///     .with_reply_timeout(Duration::from_secs(2));
/// assert_eq!(script.steps().len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct NegotiationScript {
    steps: Vec<NegotiationStep>,
    prompt: Bytes,
    step_delay: Duration,
    reply_timeout: Duration,
}

impl Default for NegotiationScript {
    #[rustfmt::skip]
    fn default() -> Self {
        NegotiationScript {
            steps: vec![
                NegotiationStep::new(
                    vec![
                        IAC, DO, option::TTYPE,
                        IAC, DO, option::TSPEED,
                        IAC, DO, option::XDISPLOC,
                        IAC, DO, option::NEW_ENVIRON,
                    ],
                    false,
                ),
                NegotiationStep::new(
                    vec![
                        IAC, SB, option::TSPEED, subneg::SEND, IAC, SE,
                        IAC, SB, option::NEW_ENVIRON, subneg::SEND, IAC, SE,
                        IAC, SB, option::TTYPE, subneg::SEND, IAC, SE,
                    ],
                    true,
                ),
                NegotiationStep::new(
                    vec![
                        IAC, WILL, option::SGA,
                        IAC, DO, option::ECHO,
                        IAC, DO, option::NAWS,
                        IAC, WILL, option::STATUS,
                        IAC, DO, option::TM,
                        IAC, WILL, option::ECHO,
                    ],
                    true,
                ),
            ],
            prompt: Bytes::from_static(DEFAULT_PROMPT),
            step_delay: DEFAULT_STEP_DELAY,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }
}

impl NegotiationScript {
    /// Create a script with no bursts, an empty prompt and default timings
    pub fn empty() -> Self {
        NegotiationScript {
            steps: Vec::new(),
            prompt: Bytes::new(),
            ..NegotiationScript::default()
        }
    }

    /// Append a burst
    pub fn with_step(mut self, step: NegotiationStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Replace the prompt
    pub fn with_prompt(mut self, prompt: impl Into<Bytes>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the pause following every burst and the prompt
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Set how long a draining burst waits for a reply
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// The bursts, in send order
    pub fn steps(&self) -> &[NegotiationStep] {
        &self.steps
    }

    /// The prompt written after the last burst
    pub fn prompt(&self) -> &[u8] {
        &self.prompt
    }

    /// Pause following every write
    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Reply window for draining bursts
    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    /// Upper bound on how long [`negotiate`] can take
    pub fn worst_case_duration(&self) -> Duration {
        let draining = self.steps.iter().filter(|step| step.await_reply).count() as u32;
        let writes = self.steps.len() as u32 + 1;
        self.step_delay * writes + self.reply_timeout * draining
    }
}

/// Run the handshake on `stream`.
///
/// Every burst is written and followed by the step delay. Draining bursts
/// then wait up to the reply timeout for one read of at most 1024 bytes, which
/// is thrown away. Finally the prompt is written.
///
/// # Errors
///
/// [`NegotiationError::Timeout`] when a draining burst gets no reply,
/// [`NegotiationError::Closed`] when the client hangs up, and
/// [`NegotiationError::Io`] for socket failures.
#[instrument(level = "debug", skip_all)]
pub async fn negotiate<S>(stream: &mut S, script: &NegotiationScript) -> NegotiationResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut discard = [0u8; DRAIN_CHUNK];
    for (step, burst) in script.steps.iter().enumerate() {
        stream.write_all(&burst.bytes).await?;
        stream.flush().await?;
        tokio::time::sleep(script.step_delay).await;
        if !burst.await_reply {
            continue;
        }
        match tokio::time::timeout(script.reply_timeout, stream.read(&mut discard)).await {
            Ok(Ok(0)) => return Err(NegotiationError::Closed),
            Ok(Ok(count)) => trace!(step, count, "Drained negotiation reply"),
            Ok(Err(error)) => return Err(error.into()),
            Err(_) => return Err(NegotiationError::Timeout { step }),
        }
    }
    if !script.prompt.is_empty() {
        stream.write_all(&script.prompt).await?;
        stream.flush().await?;
        tokio::time::sleep(script.step_delay).await;
    }
    debug!("Negotiation complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bursts() {
        let script = NegotiationScript::default();
        let steps = script.steps();
        assert_eq!(
            &steps[0].bytes[..],
            &[0xFF, 0xFD, 0x18, 0xFF, 0xFD, 0x20, 0xFF, 0xFD, 0x23, 0xFF, 0xFD, 0x27]
        );
        assert!(!steps[0].await_reply);
        assert_eq!(
            &steps[1].bytes[..],
            &[
                0xFF, 0xFA, 0x20, 0x01, 0xFF, 0xF0, 0xFF, 0xFA, 0x27, 0x01, 0xFF, 0xF0, 0xFF,
                0xFA, 0x18, 0x01, 0xFF, 0xF0
            ]
        );
        assert!(steps[1].await_reply);
        assert_eq!(
            &steps[2].bytes[..],
            &[
                0xFF, 0xFB, 0x03, 0xFF, 0xFD, 0x01, 0xFF, 0xFD, 0x1F, 0xFF, 0xFB, 0x05, 0xFF,
                0xFD, 0x06, 0xFF, 0xFB, 0x01
            ]
        );
        assert!(steps[2].await_reply);
        assert_eq!(script.prompt(), b"Password: ");
    }

    #[test]
    fn test_worst_case_duration() {
        let script = NegotiationScript::default();
        assert_eq!(
            script.worst_case_duration(),
            Duration::from_millis(400) + Duration::from_secs(10)
        );
    }

    #[test]
    fn test_empty_script() {
        let script = NegotiationScript::empty().with_step(NegotiationStep::new(vec![1u8], false));
        assert_eq!(script.steps().len(), 1);
        assert!(script.prompt().is_empty());
    }
}
