use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

const USER_AGENT: &str = "Mozilla/5.0";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetch the listing page. Any failure (connect, timeout, non-2xx) is an
/// error here; the caller decides that it means "nothing to process this
/// run" rather than a crash.
pub async fn fetch_page(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    info!("Fetching {}", url);
    let body = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .context(format!("Request to {} failed", url))?
        .text()
        .await
        .context("Failed to read response body")?;

    Ok(body)
}
