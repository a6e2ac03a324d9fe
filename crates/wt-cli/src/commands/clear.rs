//! Clear command.

use std::io::Write;

use anyhow::{Result, bail};
use wt_core::{Clock, Request};
use wt_store::Store;
use wt_tracker::Coordinator;

/// Deletes every stored total, day bucket and the widget flag.
pub async fn run<W, S, C>(writer: &mut W, coordinator: &mut Coordinator<S, C>) -> Result<()>
where
    W: Write,
    S: Store,
    C: Clock,
{
    if !coordinator.handle_request(Request::ClearData).await.is_success() {
        bail!("failed to clear tracking data");
    }
    writeln!(writer, "Cleared all tracking data.")?;
    Ok(())
}
