//! HTTP utilities shared by the source clients

use std::time::Duration;

use rand::Rng;
use rand_distr::Normal;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, USER_AGENT},
    Client, Response,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{error::LakeError, Result};

/// Browser user agent; KTC serves a bot wall to the reqwest default.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the shared client used by every job.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("ffl-lake/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Headers that make a scrape look like an ordinary page load.
pub fn browser_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    h.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    h
}

/// `Authorization` header with the value passed through verbatim.
pub fn auth_header_map(value: &str) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    h.insert(AUTHORIZATION, HeaderValue::from_str(value)?);
    Ok(h)
}

/// Turn a non-2xx response into [`LakeError::Status`] carrying the body.
pub async fn ensure_success(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LakeError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// GET a URL and decode the JSON body.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
    headers: Option<HeaderMap>,
) -> Result<T> {
    debug!(url, ?query, "GET");
    let mut request = client.get(url).query(query);
    if let Some(h) = headers {
        request = request.headers(h);
    }
    let response = ensure_success(url, request.send().await?).await?;
    Ok(response.json::<T>().await?)
}

pub async fn get_text(client: &Client, url: &str, headers: Option<HeaderMap>) -> Result<String> {
    debug!(url, "GET text");
    let mut request = client.get(url);
    if let Some(h) = headers {
        request = request.headers(h);
    }
    let response = ensure_success(url, request.send().await?).await?;
    Ok(response.text().await?)
}

pub async fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    debug!(url, "GET bytes");
    let response = ensure_success(url, client.get(url).send().await?).await?;
    Ok(response.bytes().await?.to_vec())
}

/// Sleep schedule between requests to the same host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacer {
    None,
    Fixed(Duration),
    /// Uniformly random between the bounds.
    Uniform { min: Duration, max: Duration },
    /// Normally distributed, clamped below at `floor`.
    Normal {
        mean_secs: f64,
        std_secs: f64,
        floor: Duration,
    },
}

impl Pacer {
    pub fn delay(&self) -> Duration {
        match *self {
            Pacer::None => Duration::ZERO,
            Pacer::Fixed(d) => d,
            Pacer::Uniform { min, max } if max > min => {
                rand::thread_rng().gen_range(min..=max)
            }
            Pacer::Uniform { min, .. } => min,
            Pacer::Normal {
                mean_secs,
                std_secs,
                floor,
            } => normal_delay(mean_secs, std_secs).max(floor),
        }
    }

    pub async fn pause(&self) {
        let delay = self.delay();
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "pacing");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Sample a normal distribution; negative results clamp to zero.
///
/// A non-finite deviation falls back to the mean.
pub fn normal_delay(mean_secs: f64, std_secs: f64) -> Duration {
    let secs = match Normal::new(mean_secs, std_secs) {
        Ok(normal) => rand::thread_rng().sample(normal),
        Err(_) => mean_secs,
    };
    if secs.is_finite() {
        Duration::from_secs_f64(secs.max(0.0))
    } else {
        Duration::ZERO
    }
}
