//! attest-node: claim/dispute node driven by newline-delimited JSON
//!
//! Each stdin line is one envelope:
//! `{"kind":"advance","sender":"0x..","timestamp":N,"payload":{..}}` or
//! `{"kind":"inspect","payload":{..}}`. Every report is written to stdout
//! as one line; logs go to stderr.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use attest_runtime::{init_tracing, Envelope, Node, NodeConfig, ReportSink};
use clap::Parser;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "attest-node")]
#[command(about = "Data completeness claims with dispute resolution")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "attest-node.toml")]
    config: String,

    /// Claim timeout in seconds (overrides config file)
    #[arg(long, env = "ATTEST_CLAIM_TIMEOUT")]
    claim_timeout: Option<u64>,

    /// Dispute timeout in seconds (overrides config file)
    #[arg(long, env = "ATTEST_DISPUTE_TIMEOUT")]
    dispute_timeout: Option<u64>,
}

/// Writes each report as one stdout line
struct LineSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> ReportSink for LineSink<W> {
    fn report(&mut self, message: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", message).and_then(|_| self.out.flush()) {
            self.error = Some(e);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = NodeConfig::load(Path::new(&cli.config))
        .with_context(|| format!("loading {}", cli.config))?;
    if let Some(secs) = cli.claim_timeout {
        config.claim_timeout_secs = secs;
    }
    if let Some(secs) = cli.dispute_timeout {
        config.dispute_timeout_secs = secs;
    }

    init_tracing(config.log_json, &config.log_filter)
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    info!(
        claim_timeout = config.claim_timeout_secs,
        dispute_timeout = config.dispute_timeout_secs,
        "starting attest-node"
    );

    let mut node = Node::new(&config);
    let mut sink = LineSink {
        out: io::stdout().lock(),
        error: None,
    };

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Envelope>(&line) {
            Ok(envelope) => {
                // Rejections are already reported
                let _ = node.handle(&envelope, &mut sink);
            }
            Err(e) => sink.report(&format!("Unrecognized input: {}", e)),
        }
        if let Some(e) = sink.error.take() {
            return Err(e).context("writing report");
        }
    }

    debug!(stats = ?node.stats(), "stdin closed");
    Ok(())
}
