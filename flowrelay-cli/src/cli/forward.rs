//! Forward command: stream JSONL events through the throttled notifier

use crate::cli::load_options;
use crate::event_reader::parse_event_line;
use anyhow::{Context, Result};
use flowrelay_core::models::{LogLevel, NotifierOptions};
use flowrelay_core::outcome::{ChannelSink, DeliveryOutcome};
use flowrelay_core::services::logging;
use flowrelay_core::ThrottledNotifier;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Forward command configuration
pub struct ForwardConfig {
    pub config_path: Option<PathBuf>,
    pub input_file: Option<PathBuf>,
    pub interval: Option<u64>,
    pub nick: Option<String>,
    pub log_level: Option<LogLevel>,
}

/// Counters reported once the input is exhausted
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ForwardSummary {
    pub accepted: usize,
    pub throttled: usize,
    pub skipped: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Execute the forward command
pub async fn execute_forward(config: ForwardConfig) -> Result<ForwardSummary> {
    let (_, mut options) = load_options(config.config_path)?;
    if let Some(interval) = config.interval {
        options.interval = Some(interval);
    }
    if let Some(nick) = config.nick {
        options.nick = Some(nick);
    }
    let level = config.log_level.unwrap_or(options.log_level);
    let _ = logging::init_logging(level);

    let mut stdout = tokio::io::stdout();
    let summary = if let Some(input_file) = config.input_file {
        let file = tokio::fs::File::open(&input_file)
            .await
            .with_context(|| format!("Failed to open file: {:?}", input_file))?;
        forward_events(&options, BufReader::new(file), &mut stdout).await?
    } else {
        forward_events(&options, BufReader::new(tokio::io::stdin()), &mut stdout).await?
    };

    tracing::info!(
        accepted = summary.accepted,
        throttled = summary.throttled,
        skipped = summary.skipped,
        delivered = summary.delivered,
        failed = summary.failed,
        "forward finished"
    );
    Ok(summary)
}

/// Drive the notifier with every event read from `reader`, writing one JSON
/// line per delivered event to `output` as soon as its outcome arrives.
/// Returns once the input is closed and every accepted event has produced
/// its outcome.
pub async fn forward_events<R, W>(
    options: &NotifierOptions,
    reader: R,
    output: &mut W,
) -> Result<ForwardSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (sink, mut outcomes) = ChannelSink::new();
    let notifier = ThrottledNotifier::from_options(options, Arc::new(sink))
        .context("Failed to create notifier")?;

    let mut summary = ForwardSummary::default();
    let mut in_flight = FuturesUnordered::new();
    let mut lines = reader.lines();
    let mut input_open = true;

    loop {
        if !input_open && in_flight.is_empty() {
            // every task has emitted before finishing
            while let Ok(outcome) = outcomes.try_recv() {
                write_outcome(outcome, output, &mut summary).await?;
            }
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("Failed to read input")? {
                    Some(line) => match parse_event_line(&line) {
                        Ok(Some(event)) => match notifier.accept(event) {
                            Some(handle) => {
                                summary.accepted += 1;
                                in_flight.push(handle);
                            }
                            None => summary.throttled += 1,
                        },
                        Ok(None) => {}
                        Err(e) => {
                            // Malformed line - log warning and continue
                            tracing::warn!(error = %e, line = %line, "skipping malformed event line");
                            summary.skipped += 1;
                        }
                    },
                    None => input_open = false,
                }
            }
            Some(outcome) = outcomes.recv() => {
                write_outcome(outcome, output, &mut summary).await?;
            }
            Some(result) = in_flight.next(), if !in_flight.is_empty() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "delivery task failed");
                }
            }
        }
    }

    output.flush().await.context("Failed to flush output")?;
    Ok(summary)
}

async fn write_outcome<W: AsyncWrite + Unpin>(
    outcome: DeliveryOutcome,
    output: &mut W,
    summary: &mut ForwardSummary,
) -> Result<()> {
    match outcome {
        DeliveryOutcome::Delivered(event) => {
            summary.delivered += 1;
            let mut line = serde_json::to_string(&event).context("Failed to encode event")?;
            line.push('\n');
            output
                .write_all(line.as_bytes())
                .await
                .context("Failed to write output")?;
            output.flush().await.context("Failed to flush output")?;
        }
        DeliveryOutcome::Failed(e) => {
            summary.failed += 1;
            tracing::error!(error = %e, "event delivery failed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{DuplexStream, Lines};
    use tokio::task::JoinHandle;
    use tokio::time::timeout;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn options(server: &MockServer, interval: Option<u64>) -> NotifierOptions {
        NotifierOptions {
            token: Some("T".to_string()),
            nick: Some("bot".to_string()),
            interval,
            api_base: Some(server.uri()),
            ..NotifierOptions::default()
        }
    }

    #[tokio::test]
    async fn test_forward_writes_delivered_events() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1/messages/chat/T"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let input = "{\"msg\":\"hi\"}\n\n# comment\n{broken\n{\"msg\":\"bye\",\"tags\":[\"ops\"]}\n";
        let mut output = Vec::new();
        let summary = forward_events(&options(&server, None), input.as_bytes(), &mut output).await?;

        assert_eq!(
            summary,
            ForwardSummary {
                accepted: 2,
                throttled: 0,
                skipped: 1,
                delivered: 2,
                failed: 0,
            }
        );
        let text = String::from_utf8(output)?;
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.get("time").is_some()));
        Ok(())
    }

    /// Runs `forward_events` over duplex pipes so the test controls when
    /// input arrives and can read output while the input stays open.
    fn spawn_forward(
        options: NotifierOptions,
    ) -> (
        DuplexStream,
        Lines<BufReader<DuplexStream>>,
        JoinHandle<Result<ForwardSummary>>,
    ) {
        let (input_tx, input_rx) = tokio::io::duplex(4096);
        let (output_tx, output_rx) = tokio::io::duplex(4096);
        let task = tokio::spawn(async move {
            let mut output = output_tx;
            forward_events(&options, BufReader::new(input_rx), &mut output).await
        });
        (input_tx, BufReader::new(output_rx).lines(), task)
    }

    #[tokio::test]
    async fn test_forward_echoes_while_input_stays_open() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (mut input, mut output, task) = spawn_forward(options(&server, None));
        input.write_all(b"{\"msg\":\"hi\"}\n").await?;

        let line = timeout(Duration::from_secs(5), output.next_line())
            .await
            .context("delivered event was not echoed while input is open")??
            .context("output closed early")?;
        let echoed: serde_json::Value = serde_json::from_str(&line)?;
        assert_eq!(echoed["msg"], "hi");
        assert!(echoed.get("time").is_some());

        drop(input);
        let summary = task.await??;
        assert_eq!(summary.delivered, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_forward_throttles_after_first_delivery() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (mut input, mut output, task) = spawn_forward(options(&server, Some(60_000)));
        input.write_all(b"{\"n\":1}\n").await?;
        // the echo is written after the throttle has committed
        timeout(Duration::from_secs(5), output.next_line())
            .await
            .context("first delivery was not echoed")??;

        input.write_all(b"{\"n\":2}\n{\"n\":3}\n").await?;
        drop(input);

        let summary = task.await??;
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.throttled, 2);
        assert_eq!(summary.delivered, 1);
        assert!(output.next_line().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_forward_counts_failures() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let mut output = Vec::new();
        let summary =
            forward_events(&options(&server, None), "{\"a\":1}\n".as_bytes(), &mut output).await?;
        assert_eq!(summary.failed, 1);
        assert!(output.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_forward_rejects_bad_config() {
        let options = NotifierOptions::default();
        let mut output = Vec::new();
        let result = forward_events(&options, "".as_bytes(), &mut output).await;
        assert!(result.is_err());
    }
}
