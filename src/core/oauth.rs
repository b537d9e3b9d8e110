// src/core/oauth.rs
//
// OAuth 1.0a request signing (HMAC-SHA1, Authorization header form).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;
use time::OffsetDateTime;

use crate::config::Credentials;
use crate::core::sanitize::percent_encode;

type HmacSha1 = Hmac<Sha1>;

#[derive(Clone, Debug)]
pub struct OAuthSigner {
    creds: Credentials,
}

impl OAuthSigner {
    pub fn new(creds: Credentials) -> Self {
        Self { creds }
    }

    /// `Authorization` header value for a request with a fresh nonce and timestamp.
    /// `params` are the query (and form) parameters, unencoded.
    pub fn authorization(&self, method: &str, base_url: &str, params: &[(String, String)]) -> String {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        self.authorization_with(method, base_url, params, &nonce, &timestamp)
    }

    pub fn authorization_with(
        &self,
        method: &str,
        base_url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let oauth = self.oauth_params(nonce, timestamp);
        let signature = self.signature(method, base_url, params, &oauth);

        let mut fields: Vec<(String, String)> = oauth;
        fields.push((s!("oauth_signature"), signature));
        fields.sort();

        let joined = fields
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {joined}")
    }

    fn oauth_params(&self, nonce: &str, timestamp: &str) -> Vec<(String, String)> {
        vec![
            (s!("oauth_consumer_key"), self.creds.consumer_key.clone()),
            (s!("oauth_nonce"), s!(nonce)),
            (s!("oauth_signature_method"), s!("HMAC-SHA1")),
            (s!("oauth_timestamp"), s!(timestamp)),
            (s!("oauth_token"), self.creds.access_token.clone()),
            (s!("oauth_version"), s!("1.0")),
        ]
    }

    fn signature(
        &self,
        method: &str,
        base_url: &str,
        params: &[(String, String)],
        oauth: &[(String, String)],
    ) -> String {
        let base = signature_base_string(method, base_url, params.iter().chain(oauth.iter()));
        let key = format!(
            "{}&{}",
            percent_encode(&self.creds.consumer_secret),
            percent_encode(&self.creds.access_secret)
        );
        // HMAC accepts keys of any length
        let mut mac = match HmacSha1::new_from_slice(key.as_bytes()) {
            Ok(m) => m,
            Err(_) => return s!(),
        };
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// METHOD&enc(url)&enc(sorted, encoded k=v pairs joined by '&').
pub fn signature_base_string<'a, I>(method: &str, base_url: &str, params: I) -> String
where
    I: IntoIterator<Item = &'a (String, String)>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url),
        percent_encode(&normalized)
    )
}
