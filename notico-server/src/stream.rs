//! `notico stream`: relay events from an RTM connection.

use crate::shutdown::shutdown_signal;
use crate::state::{slack_client, slack_publisher};
use notico_core::config::SlackConfig;
use notico_core::processors::{Dispatcher, RelayExit, StreamRelay};
use notico_core::session::SessionState;
use tokio::sync::watch;

/// Run the stream relay until a shutdown signal or a credential failure.
pub async fn run_stream(slack: SlackConfig) -> anyhow::Result<()> {
    let session = match &slack.team_domain {
        Some(domain) => SessionState::with_team_domain(domain.clone()),
        None => SessionState::new(),
    };
    let dispatcher = Dispatcher::new(slack.notify_channel.clone(), session);
    let relay = StreamRelay::new(slack_client(&slack), dispatcher, slack_publisher(&slack));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut relay_task = tokio::spawn(relay.run(shutdown_rx));

    let exit = tokio::select! {
        exit = &mut relay_task => exit?,
        () = shutdown_signal() => {
            let _ = shutdown_tx.send(true);
            relay_task.await?
        }
    };

    match exit {
        RelayExit::Shutdown => {
            tracing::info!("Stream relay stopped");
            Ok(())
        }
        RelayExit::InvalidCredentials => {
            anyhow::bail!("Slack rejected the token; check SLACK_TOKEN")
        }
    }
}
