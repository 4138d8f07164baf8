use std::time::Duration;

use reqwest::Client;

use crate::prelude::*;

/// Build a default client.
///
/// The quote page is picky about clients without a browser-ish user agent.
pub fn try_new() -> Result<Client> {
    Ok(Client::builder()
        .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
        .timeout(Duration::from_secs(10))
        .build()?)
}
