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

//! Error types and result aliases for credential operations

/// Result type for credential operations
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Errors produced while parsing or verifying a credential
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The stored credential is not of the form `$<id>$<salt>$<digest>$`
    #[error("Malformed credential: {0}")]
    Malformed(String),

    /// The algorithm id is not one this crate implements
    #[error("Unsupported credential algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The candidate password does not produce the stored digest
    #[error("Credential mismatch")]
    Mismatch,
}

impl CredentialError {
    /// Check if the error was caused by the stored credential rather than the candidate
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CredentialError::Malformed(_) | CredentialError::UnsupportedAlgorithm(_)
        )
    }
}
