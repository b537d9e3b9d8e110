// src/core/net.rs
//
// Signed HTTPS GET with a shared adaptive throttle.
// One client per run; cheap to share across worker threads by reference.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::config::Credentials;
use crate::config::consts::{PAUSE_CEILING_MS, PAUSE_FLOOR_MS};
use url::Url;

use crate::core::oauth::OAuthSigner;
use crate::error::FetchError;

const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Pause before every request. Grows on rate limiting, decays on success.
#[derive(Debug)]
pub struct Throttle {
    pause: Mutex<Duration>,
    floor: Duration,
    ceiling: Duration,
}

impl Throttle {
    pub fn new(initial: Duration) -> Self {
        Self {
            pause: Mutex::new(initial),
            floor: initial.min(Duration::from_millis(PAUSE_FLOOR_MS)),
            ceiling: Duration::from_millis(PAUSE_CEILING_MS),
        }
    }

    pub fn current(&self) -> Duration {
        self.pause.lock().map(|p| *p).unwrap_or(self.ceiling)
    }

    /// Sleep the current pause while holding the lock, so request starts
    /// are spaced across all workers.
    pub fn wait(&self) {
        if let Ok(guard) = self.pause.lock() {
            if !guard.is_zero() {
                thread::sleep(*guard);
            }
        }
    }

    pub fn on_success(&self) {
        if let Ok(mut p) = self.pause.lock() {
            *p = p.mul_f64(0.95).max(self.floor);
        }
    }

    pub fn on_rate_limit(&self) {
        if let Ok(mut p) = self.pause.lock() {
            *p = (*p * 2).max(self.floor).min(self.ceiling);
            log::debug!("Rate limited; request pause now {:?}", *p);
        }
    }
}

pub struct HttpClient {
    agent: ureq::Agent,
    signer: OAuthSigner,
    user_agent: String,
    throttle: Throttle,
}

impl HttpClient {
    pub fn new(creds: Credentials, user_agent: &str, timeout: Duration, pause: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            signer: OAuthSigner::new(creds),
            user_agent: s!(user_agent),
            throttle: Throttle::new(pause),
        }
    }

    /// GET `base_url?params` and return the body of a 2xx response.
    pub fn get(&self, base_url: &str, params: &[(String, String)]) -> Result<String, FetchError> {
        self.throttle.wait();

        let url = request_url(base_url, params)?;
        let auth = self.signer.authorization("GET", base_url, params);

        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .header("Authorization", auth.as_str())
            .header("Accept", "application/json")
            .call()
            .map_err(classify)?;

        let status = response.status().as_u16();
        if status == 429 {
            self.throttle.on_rate_limit();
            return Err(FetchError::RateLimited);
        }
        if !(200..300).contains(&status) {
            return Err(FetchError::Status(status));
        }
        self.throttle.on_success();

        response
            .into_body()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(classify)
    }
}

/// `base_url` with `params` appended as a form-encoded query.
pub fn request_url(base_url: &str, params: &[(String, String)]) -> Result<Url, FetchError> {
    let invalid = |e: url::ParseError| FetchError::InvalidUrl(format!("{base_url}: {e}"));
    if params.is_empty() {
        // parse_with_params would leave a bare '?'
        return Url::parse(base_url).map_err(invalid);
    }
    let pairs = params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    Url::parse_with_params(base_url, pairs).map_err(invalid)
}

fn classify(err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Timeout(_) => FetchError::Timeout,
        ureq::Error::StatusCode(429) => FetchError::RateLimited,
        ureq::Error::StatusCode(code) => FetchError::Status(code),
        other => FetchError::Transport(other.to_string()),
    }
}
