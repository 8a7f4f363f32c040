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

//! Console Server Example
//!
//! Runs a password protected telnet console that:
//! - Listens on port 2323
//! - Echoes every completed line to all logged in clients
//! - Keeps a shared command history for the arrow keys
//! - Disconnects a client that presses Ctrl-A
//!
//! ## Usage
//!
//! ```bash
//! TELECONSOLE_CREDENTIAL=$(cargo run -q --example make_credential -- secret) \
//!     cargo run --example console_server
//! ```
//!
//! Connect with a telnet client and enter the password:
//! ```bash
//! telnet localhost 2323
//! ```
//!
//! Without `TELECONSOLE_CREDENTIAL` the password is `console`.

use teleconsole_service::{ConsoleEvent, ServerConfig, TelnetConsole};
use teleconsole_terminal::{EditorEvent, MemoryHistory};
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "> ";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let credential = std::env::var("TELECONSOLE_CREDENTIAL")
        .unwrap_or_else(|_| teleconsole_credential::create("console"));
    let config = ServerConfig::new("127.0.0.1:2323".parse()?, credential)
        .with_device_name("teleconsole-demo")
        .with_max_connections(4);

    let mut console = TelnetConsole::bind(config).await?;
    let mut history = MemoryHistory::with_capacity(32);

    println!("Console listening on {}", console.snapshot());
    println!("Press Ctrl+C to stop the server\n");

    loop {
        let events = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            events = console.poll(&history) => events?,
        };

        for event in events {
            match event {
                ConsoleEvent::Authenticated { .. } => {
                    console.write(PROMPT);
                }
                ConsoleEvent::Input { connection, event } => match event {
                    EditorEvent::LineCompleted { line } => {
                        if !line.is_empty() {
                            console.write(&format!("{connection}: {line}\n"));
                            history.push(line);
                        }
                        console.write(PROMPT);
                    }
                    EditorEvent::Interrupt => {
                        console.write("^C\n");
                        console.write(PROMPT);
                    }
                    EditorEvent::Exit => {
                        console.disconnect(connection)?;
                    }
                    EditorEvent::SizeChanged { size } => {
                        console.notice(&format!("{connection} resized to {size}"));
                    }
                    _ => {}
                },
                ConsoleEvent::Disconnected { connection } => {
                    println!("{connection} left");
                }
                _ => {}
            }
        }
    }

    println!("\nShutting down console...");
    console.flush().await;
    console.shutdown();
    Ok(())
}
