use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

static DEFAULT_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.5"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/json,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );

    reqwest::Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(20))
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap()
});

async fn send(url: &Url, request: RequestBuilder, referer: Option<&str>) -> Result<Response> {
    let request = match referer {
        Some(referer) => request.header(REFERER, referer),
        None => request,
    };

    log::debug!("Requesting {}", url);

    let response = request.send().await.map_err(|source| Error::Request {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(response)
}

/// Fetches `url` and decodes the body as JSON.
pub async fn get_json<T: DeserializeOwned>(url: &Url, referer: Option<&str>) -> Result<T> {
    send(url, DEFAULT_CLIENT.get(url.clone()), referer)
        .await?
        .json::<T>()
        .await
        .map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
}

/// Fetches `url` and returns the body as text.
pub async fn get_text(url: &Url, referer: Option<&str>) -> Result<String> {
    send(url, DEFAULT_CLIENT.get(url.clone()), referer)
        .await?
        .text()
        .await
        .map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
}

/// Posts `form` url-encoded to `url` and returns the body as text.
pub async fn post_form(url: &Url, form: &[(&str, &str)], referer: Option<&str>) -> Result<String> {
    send(url, DEFAULT_CLIENT.post(url.clone()).form(form), referer)
        .await?
        .text()
        .await
        .map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
}
