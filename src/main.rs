//! FitBuddy - Terminal Chat Entry Point
//!
//! Minimal interactive loop for exercising the orchestration engine
//! without an HTTP transport in front of it.

use anyhow::Result;
use fitbuddy::api::ChatRequest;
use fitbuddy::config::Config;
use fitbuddy::orchestrator::Orchestrator;
use futures_util::StreamExt;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load()?;
    let orchestrator = Orchestrator::new(&config)?;

    let health = orchestrator.health().await;
    println!(
        "FitBuddy ready (provider: {}, model: {}, reachable: {})",
        health.llm_provider, health.model, health.provider_reachable
    );
    println!("Commands: /health /stats /clear /quit. Anything else is chatted.\n");

    let user_id = std::env::var("FITBUDDY_USER").unwrap_or_else(|_| "local".to_string());
    let stdin = io::stdin();

    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/health" => {
                let health = orchestrator.health().await;
                println!("{}", serde_json::to_string_pretty(&health)?);
            }
            "/stats" => {
                let stats = orchestrator.memory().stats(&user_id, "default").await;
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            "/clear" => {
                let cleared = orchestrator.memory().clear(&user_id, "default").await;
                println!("memory {}", if cleared { "cleared" } else { "was empty" });
            }
            message => {
                let request = ChatRequest::new(user_id.clone(), message);
                let mut stream = match orchestrator.process_stream(&request).await {
                    Ok(stream) => Box::pin(stream),
                    Err(e) => {
                        eprintln!("error: {}", e);
                        continue;
                    }
                };

                print!("fitbuddy> ");
                while let Some(frame) = stream.next().await {
                    if let Some(content) = frame.content() {
                        print!("{}", content);
                        io::stdout().flush()?;
                    }
                }
                println!("\n");
            }
        }
    }

    Ok(())
}
