use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::TextGenerator;
use super::http::{client, send_json};
use crate::{Error, Result};

const API_BASE: &str = "https://api.cloudflare.com/client/v4/accounts";

/// Text generation on Cloudflare Workers AI.
pub struct WorkersAi {
    client: Client,
    account_id: String,
    api_token: String,
    model: String,
}

impl WorkersAi {
    pub fn new(
        account_id: impl Into<String>,
        api_token: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: client()?,
            account_id: account_id.into(),
            api_token: api_token.into(),
            model: model.into(),
        })
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    success: bool,
    result: Option<RunResult>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

impl TextGenerator for WorkersAi {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{API_BASE}/{}/ai/run/{}", self.account_id, self.model);
        log::debug!("running {} with a {} char prompt", self.model, prompt.len());
        let request = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(&RunRequest { prompt });
        let resp: RunResponse = send_json("text generation", request)?;
        response_text(resp)
    }
}

fn response_text(resp: RunResponse) -> Result<String> {
    if !resp.success {
        let messages: Vec<String> = resp.errors.into_iter().map(|e| e.message).collect();
        return Err(Error::other(format!(
            "text generation failed: {}",
            messages.join("; ")
        )));
    }
    resp.result
        .and_then(|r| r.response)
        .ok_or_else(|| Error::other("text generation returned no response"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_the_response_text() {
        let resp: RunResponse = serde_json::from_value(json!({
            "result": { "response": "Eiffel Tower, Louvre" },
            "success": true,
            "errors": [],
            "messages": []
        }))
        .unwrap();
        assert_eq!(response_text(resp).unwrap(), "Eiffel Tower, Louvre");
    }

    #[test]
    fn unsuccessful_runs_report_api_errors() {
        let resp: RunResponse = serde_json::from_value(json!({
            "result": null,
            "success": false,
            "errors": [{ "code": 7009, "message": "Upstream service unavailable" }]
        }))
        .unwrap();
        let err = response_text(resp).unwrap_err();
        assert!(err.to_string().contains("Upstream service unavailable"));
    }
}
