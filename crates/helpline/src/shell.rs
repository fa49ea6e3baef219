// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `shell` subcommand: a line-oriented chat REPL driving the
//! streaming pipeline, for local testing without the HTTP gateway.

use std::io::Write as _;

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use helpline_config::HelplineConfig;
use helpline_core::{HelplineError, TurnEvent};

use crate::app::App;

pub async fn run(config: HelplineConfig) -> Result<(), HelplineError> {
    let app = App::build(&config).await?;
    let session_id = uuid::Uuid::new_v4().to_string();

    println!("helpline shell -- session {session_id}");
    println!("type a message, /history to inspect the window, /quit to exit");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    print_prompt();
    while let Ok(Some(line)) = lines.next_line().await {
        let input = line.trim();
        match input {
            "" => {}
            "/quit" | "/exit" => break,
            "/history" => {
                for message in app.orchestrator.history(&session_id).await {
                    println!("[{}] {}", message.role, message.content);
                }
            }
            _ => {
                match app
                    .orchestrator
                    .stream_turn(Some(session_id.clone()), input, None)
                    .await
                {
                    Ok(mut stream) => {
                        while let Some(event) = stream.next().await {
                            match event {
                                TurnEvent::Delta { text } => {
                                    print!("{text}");
                                    let _ = std::io::stdout().flush();
                                }
                                TurnEvent::Completed { result } => {
                                    println!();
                                    println!(
                                        "-- intent={} confidence={:.2} latency={}ms",
                                        result.intent, result.intent_confidence, result.latency_ms
                                    );
                                }
                                TurnEvent::Error { message } => {
                                    println!();
                                    println!("!! turn failed: {message}");
                                }
                            }
                        }
                    }
                    Err(e) => println!("!! turn failed: {e}"),
                }
            }
        }
        print_prompt();
    }

    app.orchestrator.end_conversation(&session_id).await?;
    app.shutdown().await?;
    Ok(())
}

fn print_prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
