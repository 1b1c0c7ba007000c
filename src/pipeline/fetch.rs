//! Page fetch: one bounded GET against a guard-approved URL.
//!
//! The request is raced against a timer with `tokio::time::timeout`; whichever
//! finishes first decides the outcome. The bound covers connect, headers and
//! body, so a server that trickles bytes cannot hold the request open.
//!
//! Failures are reported as [`IngestError`] and never abort the request;
//! the caller degrades to notes-only processing.

use crate::config::ServiceConfig;
use crate::error::IngestError;
use crate::guard::{self, GuardPolicy};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// `Accept` header a desktop browser sends for a navigation.
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Fetch the HTML body of `url`.
///
/// `url` must come from [`crate::guard::validate_url`].
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &Url,
    config: &ServiceConfig,
) -> Result<String, IngestError> {
    let secs = config.fetch_timeout_secs;
    info!("Fetching page: {}", url);

    match tokio::time::timeout(Duration::from_secs(secs), fetch_inner(client, url, config)).await {
        Ok(result) => result,
        Err(_) => Err(IngestError::Timeout { secs }),
    }
}

async fn fetch_inner(
    client: &reqwest::Client,
    url: &Url,
    config: &ServiceConfig,
) -> Result<String, IngestError> {
    let response = client
        .get(url.clone())
        .header(USER_AGENT, config.user_agent.as_str())
        .header(ACCEPT, BROWSER_ACCEPT)
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| IngestError::Network {
            detail: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::HttpStatus {
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| IngestError::Network {
        detail: e.to_string(),
    })?;
    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// Build the shared outbound client.
///
/// Every redirect target goes back through the guard. A public page that
/// redirects to an internal address is not followed; the 3xx response is
/// returned as-is and surfaces as [`IngestError::HttpStatus`].
pub fn build_client(policy: &GuardPolicy) -> Result<reqwest::Client, reqwest::Error> {
    let policy = policy.clone();
    let redirect = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.stop();
        }
        match guard::validate_url(attempt.url().as_str(), &policy) {
            Ok(_) => attempt.follow(),
            Err(_) => {
                warn!("Refusing redirect to {}", attempt.url());
                attempt.stop()
            }
        }
    });
    reqwest::Client::builder().redirect(redirect).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secs: u64) -> ServiceConfig {
        ServiceConfig::builder()
            .api_key("k")
            .fetch_timeout_secs(secs)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn sends_browser_identity() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/post")
            .match_header("user-agent", mockito::Matcher::Regex("Chrome/".into()))
            .match_header("accept", mockito::Matcher::Regex("text/html".into()))
            .with_status(200)
            .with_body("<html><body>ok</body></html>")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/post", server.url())).unwrap();
        let client = build_client(&GuardPolicy::default()).unwrap();
        let body = fetch_page(&client, &url, &config(8)).await.unwrap();
        assert!(body.contains("ok"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/blocked")
            .with_status(403)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/blocked", server.url())).unwrap();
        let client = build_client(&GuardPolicy::default()).unwrap();
        let err = fetch_page(&client, &url, &config(8)).await.unwrap_err();
        assert_eq!(err, IngestError::HttpStatus { status: 403 });
    }

    #[tokio::test]
    async fn redirect_to_internal_host_is_not_followed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/moved")
            .with_status(302)
            .with_header("location", "http://169.254.169.254/latest/meta-data/")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/moved", server.url())).unwrap();
        let client = build_client(&GuardPolicy::default()).unwrap();
        let err = fetch_page(&client, &url, &config(8)).await.unwrap_err();
        assert_eq!(err, IngestError::HttpStatus { status: 302 });
    }

    #[tokio::test]
    async fn silent_server_hits_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });

        let url = Url::parse(&format!("http://{addr}/slow")).unwrap();
        let client = build_client(&GuardPolicy::default()).unwrap();
        let err = fetch_page(&client, &url, &config(1)).await.unwrap_err();
        assert_eq!(err, IngestError::Timeout { secs: 1 });
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        // Port 9 (discard) is closed on test machines.
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let client = build_client(&GuardPolicy::default()).unwrap();
        let err = fetch_page(&client, &url, &config(8)).await.unwrap_err();
        assert!(
            matches!(err, IngestError::Network { .. } | IngestError::Timeout { .. }),
            "got {err:?}"
        );
    }
}
