use std::time::Duration;

use anyhow::Result;
use codepal::{cli::run_cli, utils::runtime::multi_thread_runtime};
use tracing::error;

fn main() -> Result<()> {
    let runtime = multi_thread_runtime()?;
    let result = runtime.block_on(run_cli());
    // A pending stdin read would otherwise keep the process alive after Ctrl-C.
    runtime.shutdown_timeout(Duration::from_millis(250));

    result.inspect_err(|e| {
        error!("Error running cli {e:?}");
    })
}
