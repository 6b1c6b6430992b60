use anyhow::Result;

/// Runtime for the cli. The terminal activity watcher reads stdin on a blocking thread, so the
/// caller should shut the runtime down with a timeout instead of dropping it.
pub fn multi_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
