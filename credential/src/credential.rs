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

use crate::{CredentialError, CredentialResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Algorithm id for salted SHA-256
pub const SHA256_ALGORITHM: &str = "5";

/// Number of random bytes in a freshly generated salt
pub const SALT_LENGTH: usize = 32;

/// A stored password credential of the form `$<id>$<salt>$<digest>$`.
///
/// The salt and digest are standard padded base64. The digest is SHA-256 over
/// the salt *text* followed by the password bytes.
///
/// # Example
///
/// ```
/// use teleconsole_credential::Credential;
///
/// let credential = Credential::create("hunter2");
/// assert!(credential.matches("hunter2"));
/// assert!(!credential.matches("hunter3"));
///
/// let reparsed: Credential = credential.to_string().parse().unwrap();
/// assert_eq!(reparsed, credential);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    algorithm: String,
    salt: String,
    digest: String,
}

impl Credential {
    /// Create a credential for `plaintext` with a random 32 byte salt.
    pub fn create(plaintext: &str) -> Credential {
        let mut salt = [0u8; SALT_LENGTH];
        rand::rng().fill(&mut salt);
        Credential::create_with_salt(plaintext, &salt)
    }

    /// Create a credential for `plaintext` using the supplied raw salt bytes.
    pub fn create_with_salt(plaintext: &str, salt: &[u8]) -> Credential {
        let salt = STANDARD.encode(salt);
        let digest = salted_digest(&salt, plaintext);
        Credential {
            algorithm: SHA256_ALGORITHM.to_string(),
            salt,
            digest,
        }
    }

    /// Algorithm id field
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Base64 salt field
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Base64 digest field
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Check `candidate` against this credential.
    ///
    /// # Errors
    ///
    /// [`CredentialError::UnsupportedAlgorithm`] when the algorithm id is not `5`,
    /// [`CredentialError::Mismatch`] when the digests differ.
    pub fn verify(&self, candidate: &str) -> CredentialResult<()> {
        if self.algorithm != SHA256_ALGORITHM {
            return Err(CredentialError::UnsupportedAlgorithm(self.algorithm.clone()));
        }
        let computed = salted_digest(&self.salt, candidate);
        if constant_time_eq(computed.as_bytes(), self.digest.as_bytes()) {
            Ok(())
        } else {
            trace!("credential digest mismatch");
            Err(CredentialError::Mismatch)
        }
    }

    /// Boolean form of [`Credential::verify`]
    pub fn matches(&self, candidate: &str) -> bool {
        self.verify(candidate).is_ok()
    }
}

impl FromStr for Credential {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('$').collect();
        match fields.as_slice() {
            ["", algorithm, salt, digest, ""] if !algorithm.is_empty() && !digest.is_empty() => {
                Ok(Credential {
                    algorithm: algorithm.to_string(),
                    salt: salt.to_string(),
                    digest: digest.to_string(),
                })
            }
            _ => Err(CredentialError::Malformed(format!(
                "expected $<id>$<salt>$<digest>$, found {} fields",
                fields.len()
            ))),
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}${}${}$", self.algorithm, self.salt, self.digest)
    }
}

/// Verify `candidate` against the stored credential string.
///
/// Parses `stored`, rejects any algorithm other than salted SHA-256 and
/// compares the base64 digest.
pub fn verify(candidate: &str, stored: &str) -> CredentialResult<()> {
    stored.parse::<Credential>()?.verify(candidate)
}

/// Produce a new stored credential string for `plaintext`.
pub fn create(plaintext: &str) -> String {
    Credential::create(plaintext).to_string()
}

fn salted_digest(salt: &str, plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(plaintext.as_bytes());
    STANDARD.encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
