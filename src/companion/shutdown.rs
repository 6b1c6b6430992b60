use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancelation` on Ctrl-C. Also returns when something else cancels it first, so the
/// companion can stop without a signal.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                cancelation.cancel();
            }
            Err(e) => {
                error!("Failed to listen for Ctrl-C {e:?}");
                cancelation.cancelled().await;
            }
        },
        _ = cancelation.cancelled() => (),
    };
}
