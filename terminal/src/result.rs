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

/// Result type for the terminal
pub type TerminalResult<T> = Result<T, TerminalError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalError {
    /// Cursor position report whose body is not `rows;cols`
    MalformedReport(String),
}

impl std::fmt::Display for TerminalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalError::MalformedReport(body) => {
                write!(f, "Malformed cursor position report {:?}", body)
            }
        }
    }
}

impl std::error::Error for TerminalError {}
