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

//! Password gate for unauthenticated connections

use crate::Result;
use teleconsole_credential::{Credential, CredentialError};
use tracing::trace;

/// Default size of the password attempt buffer
pub const DEFAULT_ATTEMPT_LIMIT: usize = 64;

/// Reply sent to a client whose password was rejected
pub const REJECTION: &[u8] = b"wrong.\r\n";

/// What a chunk of password input led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// No terminator yet; keep collecting
    Pending,
    /// The password matched
    Accepted,
    /// The password did not match or could not be checked
    Rejected(CredentialError),
}

/// Checks typed passwords against the stored credential.
///
/// Input accumulates until it ends in a carriage return (`CR` or `CR LF`) or
/// the attempt buffer fills up; the terminating character is stripped and the
/// rest verified. Either way the attempt buffer is emptied.
///
/// # Example
///
/// ```
/// use teleconsole_service::{AuthOutcome, AuthenticationGate};
///
/// let gate = AuthenticationGate::new(teleconsole_credential::create("pass"));
/// let mut attempt = String::new();
/// assert_eq!(gate.offer(&mut attempt, "pa"), AuthOutcome::Pending);
/// assert_eq!(gate.offer(&mut attempt, "ss\r"), AuthOutcome::Accepted);
/// assert!(attempt.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    credential: String,
    attempt_limit: usize,
}

impl AuthenticationGate {
    /// Create a gate for a stored `$5$<salt>$<digest>$` credential
    pub fn new(credential: impl Into<String>) -> Self {
        AuthenticationGate {
            credential: credential.into(),
            attempt_limit: DEFAULT_ATTEMPT_LIMIT,
        }
    }

    /// Set the attempt buffer size
    pub fn with_attempt_limit(mut self, limit: usize) -> Self {
        self.attempt_limit = limit;
        self
    }

    pub fn attempt_limit(&self) -> usize {
        self.attempt_limit
    }

    /// Replace the stored credential, rejecting strings that do not parse
    pub fn set_credential(&mut self, credential: &str) -> Result<()> {
        credential.parse::<Credential>()?;
        self.credential = credential.to_string();
        Ok(())
    }

    /// Append `input` to `attempt` and verify once it is complete.
    pub fn offer(&self, attempt: &mut String, input: &str) -> AuthOutcome {
        attempt.push_str(input);
        let candidate = if let Some(candidate) = attempt
            .strip_suffix("\r\n")
            .or_else(|| attempt.strip_suffix('\r'))
        {
            candidate.to_string()
        } else if attempt.len() >= self.attempt_limit {
            trace!(length = attempt.len(), "Password attempt buffer full");
            let mut candidate = attempt.clone();
            candidate.pop();
            candidate
        } else {
            return AuthOutcome::Pending;
        };
        attempt.clear();

        match teleconsole_credential::verify(&candidate, &self.credential) {
            Ok(()) => AuthOutcome::Accepted,
            Err(err) => AuthOutcome::Rejected(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASS_CREDENTIAL: &str = "$5$bl0zjwUtt8T2WLJBH5Vadl/Ix6X+cFdJr5td4a0B+n0=$1txXuyLLzAvAMM/jYSlpRScy3nSwvTQ05Mv7At5LiSs=$";

    #[test]
    fn test_accepts_on_carriage_return() {
        let gate = AuthenticationGate::new(PASS_CREDENTIAL);
        let mut attempt = String::new();
        assert_eq!(gate.offer(&mut attempt, "pass"), AuthOutcome::Pending);
        assert_eq!(attempt, "pass");
        assert_eq!(gate.offer(&mut attempt, "\r"), AuthOutcome::Accepted);
        assert!(attempt.is_empty());
    }

    #[test]
    fn test_crlf_terminator() {
        let gate = AuthenticationGate::new(PASS_CREDENTIAL);
        let mut attempt = String::new();
        assert_eq!(gate.offer(&mut attempt, "pass\r\n"), AuthOutcome::Accepted);
    }

    #[test]
    fn test_rejects_wrong_password() {
        let gate = AuthenticationGate::new(PASS_CREDENTIAL);
        let mut attempt = String::new();
        assert_eq!(
            gate.offer(&mut attempt, "nope\r"),
            AuthOutcome::Rejected(CredentialError::Mismatch)
        );
        assert!(attempt.is_empty());
    }

    #[test]
    fn test_overflow_triggers_verification() {
        let gate = AuthenticationGate::new(PASS_CREDENTIAL);
        let mut attempt = String::new();
        assert_eq!(gate.offer(&mut attempt, &"x".repeat(63)), AuthOutcome::Pending);
        assert_eq!(
            gate.offer(&mut attempt, "y"),
            AuthOutcome::Rejected(CredentialError::Mismatch)
        );
        assert!(attempt.is_empty());
    }

    #[test]
    fn test_overflow_strips_last_character() {
        let credential = teleconsole_credential::create("abc");
        let gate = AuthenticationGate::new(credential).with_attempt_limit(4);
        let mut attempt = String::new();
        assert_eq!(gate.offer(&mut attempt, "abcd"), AuthOutcome::Accepted);
    }

    #[test]
    fn test_unsupported_algorithm_rejects() {
        let foreign = PASS_CREDENTIAL.replacen("$5$", "$1$", 1);
        let gate = AuthenticationGate::new(foreign);
        let mut attempt = String::new();
        assert_eq!(
            gate.offer(&mut attempt, "pass\r"),
            AuthOutcome::Rejected(CredentialError::UnsupportedAlgorithm("1".to_string()))
        );
    }

    #[test]
    fn test_set_credential() {
        let mut gate = AuthenticationGate::new(PASS_CREDENTIAL);
        assert!(gate.set_credential("not a credential").is_err());
        gate.set_credential(&teleconsole_credential::create("other"))
            .unwrap();
        let mut attempt = String::new();
        assert_eq!(gate.offer(&mut attempt, "other\r"), AuthOutcome::Accepted);
    }
}
