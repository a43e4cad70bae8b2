//! Pushing a development build to a running browser
//!
//! Extension auto-installers listen for a POST of the XPI on a local port.

use crate::models::BuildConfig;
use anyhow::{Context, Result};

/// Build `config` in memory and POST the archive to `http://host:port/`.
pub async fn auto_install(config: BuildConfig, host: &str, port: u16) -> Result<()> {
    let (_, data) = crate::build_to_vec(config)?;
    let url = format!("http://{}:{}/", host, port);

    let response = reqwest::Client::new()
        .post(&url)
        .body(data)
        .send()
        .await
        .with_context(|| format!("Failed to send build to {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("{} rejected the build: {}", url, response.status());
    }
    Ok(())
}
