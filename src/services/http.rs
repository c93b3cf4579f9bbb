use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

const USER_AGENT: &str = concat!("route-me/", env!("CARGO_PKG_VERSION"));

pub(crate) fn client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Send once, check the status, decode the JSON body.
pub(crate) fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T> {
    let resp = request.send()?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        log::warn!("{service} returned {status}: {}", truncate(&body, 200));
        return Err(Error::Status {
            service,
            status: status.as_u16(),
        });
    }
    let text = resp.text()?;
    log::trace!("{service} response: {}", truncate(&text, 2000));
    Ok(serde_json::from_str(&text)?)
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
