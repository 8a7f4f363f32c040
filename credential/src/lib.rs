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

//! # Teleconsole Credentials
//!
//! Salted SHA-256 password credentials stored as `$5$<salt>$<digest>$`, where
//! salt and digest are standard base64. Verification is the only operation on
//! the authentication path; [`create`] is an administrative helper.
//!
//! ```
//! use teleconsole_credential::{create, verify};
//!
//! let stored = create("secret");
//! assert!(verify("secret", &stored).is_ok());
//! assert!(verify("guess", &stored).is_err());
//! ```

#![warn(missing_docs, rust_2018_idioms)]

mod credential;
mod result;

pub use self::credential::{Credential, SALT_LENGTH, SHA256_ALGORITHM, create, verify};
pub use self::result::{CredentialError, CredentialResult};
