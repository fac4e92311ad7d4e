// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Send pingbacks for a published page.
//!
//! With `--target`, pings that one target. Otherwise fetches the source page
//! and pings every link found in it.

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pingback::{config::Config, HttpClient, PingSender, ReqwestClient};

#[derive(Parser, Debug)]
#[command(name = "pingback-send", about = "Notify linked pages about a published page")]
struct Args {
    /// URI of the published page
    #[arg(short, long)]
    source: String,

    /// Ping only this target instead of every link on the page
    #[arg(short, long)]
    target: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(timeout_ms) = args.timeout_ms {
        config.transport.fetch_timeout_ms = timeout_ms;
    }
    let sender = PingSender::new(ReqwestClient::new(&config.transport)?);

    let results = match args.target {
        Some(target) => {
            let result = sender.ping(&args.source, &target);
            vec![(target, result)]
        }
        None => {
            let html = sender
                .client()
                .fetch_full(&args.source)
                .with_context(|| format!("fetching {}", args.source))?;
            sender.ping_all(&args.source, &html)
        }
    };

    let mut failures = 0;
    for (target, result) in &results {
        match result {
            Ok(message) => println!("ok\t{target}\t{message}"),
            Err(fault) => {
                failures += 1;
                println!("fault {}\t{target}\t{}", fault.code.code(), fault.message);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} pingbacks failed", failures, results.len());
    }
    Ok(())
}
