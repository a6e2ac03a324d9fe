//! Toggle command for the on-page timer widget.

use std::io::Write;

use anyhow::{Result, bail};
use wt_core::{Clock, Request};
use wt_store::Store;
use wt_tracker::Coordinator;

/// Persists the widget visibility flag read by pages when they load.
pub async fn run<W, S, C>(
    writer: &mut W,
    coordinator: &mut Coordinator<S, C>,
    enabled: bool,
) -> Result<()>
where
    W: Write,
    S: Store,
    C: Clock,
{
    let response = coordinator
        .handle_request(Request::ToggleTimer { enabled })
        .await;
    if !response.is_success() {
        bail!("failed to save timer visibility");
    }
    let word = if enabled { "shown" } else { "hidden" };
    writeln!(writer, "Timer widget will be {word} on new pages.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use wt_core::{SystemClock, TrackerConfig};
    use wt_store::MemoryStore;

    #[tokio::test]
    async fn test_toggle_off_then_on() {
        let mut coordinator =
            Coordinator::new(MemoryStore::new(), SystemClock, TrackerConfig::default());
        assert!(coordinator.timer_enabled().await);

        let mut output = Vec::new();
        run(&mut output, &mut coordinator, false).await.unwrap();
        assert!(!coordinator.timer_enabled().await);

        run(&mut output, &mut coordinator, true).await.unwrap();
        assert!(coordinator.timer_enabled().await);

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Timer widget will be hidden on new pages.\nTimer widget will be shown on new pages.\n"
        );
    }

    #[tokio::test]
    async fn test_toggle_fails_when_store_unavailable() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let mut coordinator = Coordinator::new(store, SystemClock, TrackerConfig::default());

        let mut output = Vec::new();
        assert!(run(&mut output, &mut coordinator, false).await.is_err());
    }
}
