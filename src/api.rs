// API client module: a small blocking HTTP client for the QuickPin API.
// It knows two endpoints: the authentication endpoint that trades an
// email/password pair for a token, and the profile endpoint that accepts
// batches of profiles to import.

use std::fmt;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{QpiError, Result};

pub const AUTH_PATH: &str = "/api/authentication/";
pub const PROFILE_PATH: &str = "/api/profile/";

/// Header QuickPin reads the session token from.
pub const AUTH_HEADER: &str = "x-auth";

/// Blocking client bound to one QuickPin instance. The token is absent
/// until either `set_token` or `authenticate` succeeds.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<HeaderValue>,
}

/// Social site a profile lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Twitter,
    Instagram,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Twitter => f.write_str("twitter"),
            Site::Instagram => f.write_str("instagram"),
        }
    }
}

/// One profile to import. Exactly one of `username` / `upstream_id` is set;
/// use the constructors rather than building the struct by hand.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,
    pub site: Site,
}

impl Profile {
    pub fn with_username(username: impl Into<String>, site: Site) -> Self {
        Profile {
            username: Some(username.into()),
            upstream_id: None,
            site,
        }
    }

    pub fn with_upstream_id(upstream_id: impl Into<String>, site: Site) -> Self {
        Profile {
            username: None,
            upstream_id: Some(upstream_id.into()),
            site,
        }
    }

    /// Whichever identifier this profile carries, for log lines.
    pub fn identifier(&self) -> &str {
        self.username
            .as_deref()
            .or(self.upstream_id.as_deref())
            .unwrap_or_default()
    }
}

/// Login payload. QuickPin calls the username field `email`.
#[derive(Serialize, Debug)]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
}

/// Body of a profile submission.
#[derive(Serialize, Debug)]
pub struct SubmitRequest<'a> {
    pub profiles: &'a [Profile],
    pub stub: bool,
}

impl ApiClient {
    /// Build a client for `base_url`. Trailing slashes are dropped so the
    /// endpoint paths can be appended as-is. `insecure` turns off TLS
    /// certificate verification for self-signed deployments.
    pub fn new(base_url: &str, insecure: bool) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store a token for subsequent authenticated requests.
    pub fn set_token(&mut self, token: &str) -> Result<()> {
        let mut value = HeaderValue::from_str(token)?;
        value.set_sensitive(true);
        self.token = Some(value);
        Ok(())
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            headers.insert(HeaderName::from_static(AUTH_HEADER), token.clone());
        }
        headers
    }

    /// Exchange a username/password pair for a token and keep it.
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, AUTH_PATH);
        info!(%url, %username, "authenticating");
        let res = self
            .client
            .post(&url)
            .json(&AuthRequest {
                email: username,
                password,
            })
            .send()?;
        let res = check_status(res, |status, body| QpiError::AuthenticationRejected {
            status,
            body,
        })?;
        let resp: AuthResponse = res.json()?;
        self.set_token(&resp.token)?;
        debug!("authenticated");
        Ok(())
    }

    /// POST one batch of profiles and return the response body. A 401 or
    /// 403 comes back as `Unauthorized`, anything else non-2xx as
    /// `SubmissionRejected`.
    pub fn submit_profiles(&self, profiles: &[Profile], stub: bool) -> Result<String> {
        let url = format!("{}{}", self.base_url, PROFILE_PATH);
        let res = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .json(&SubmitRequest { profiles, stub })
            .send()?;
        let res = check_status(res, |status, body| match status {
            401 | 403 => QpiError::Unauthorized { status, body },
            _ => QpiError::SubmissionRejected { status, body },
        })?;
        Ok(res.text()?)
    }
}

/// Turn a non-2xx response into the error built by `reject`, carrying the
/// status code and whatever body the server sent.
fn check_status(res: Response, reject: impl FnOnce(u16, String) -> QpiError) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    Err(reject(status.as_u16(), body))
}
