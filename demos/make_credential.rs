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

//! Credential Generator Example
//!
//! Prints a stored credential for the password given on the command line.
//!
//! ```bash
//! cargo run --example make_credential -- secret
//! ```

fn main() {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("usage: make_credential <password>");
        std::process::exit(2);
    };
    println!("{}", teleconsole_credential::create(&password));
}
