//! `netutils offset <url> --total-length N` – negotiate a resume offset.

use anyhow::{Context, Result};
use netutils_core::config::NetutilsConfig;
use netutils_core::http::CurlTransport;
use netutils_core::resume::ResumeMethod;

pub async fn run_offset(
    cfg: &NetutilsConfig,
    url: String,
    total_length: u64,
    method: ResumeMethod,
) -> Result<()> {
    let transport = CurlTransport::new(cfg.http_or_default());
    let offset = tokio::task::spawn_blocking(move || {
        method
            .strategy()
            .resume_offset(&transport, &url, total_length)
            .with_context(|| format!("{} on {}", method, url))
    })
    .await
    .context("offset task panicked")??;
    println!("{}", offset);
    Ok(())
}
