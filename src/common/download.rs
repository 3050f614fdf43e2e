use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{blocking::Client, redirect::Policy};

/// Fetch the full body of `url` into memory with a single blocking GET.
pub(crate) fn download_bytes(url: &str) -> Result<Vec<u8>> {
    let client = Client::builder()
        .user_agent(concat!("evdensity/", env!("CARGO_PKG_VERSION")))
        .redirect(Policy::limited(10))
        .timeout(Duration::from_secs(120))
        .build()?;

    let resp = client.get(url).send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} returned error status"))?;

    let body = resp.bytes()
        .with_context(|| format!("read body of {url}"))?;

    Ok(body.to_vec())
}
