// Credential resolution. clap has already merged each flag with its
// environment variable; what is still missing here gets prompted for.
// A token short-circuits username/password.

use std::fmt;

use tracing::debug;

use crate::error::{QpiError, Result};

pub const ENV_URL: &str = "QUICKPIN_URL";
pub const ENV_TOKEN: &str = "QUICKPIN_TOKEN";
pub const ENV_USER: &str = "QUICKPIN_USER";
pub const ENV_PASSWORD: &str = "QUICKPIN_PASSWORD";

/// Values from the command line or its environment fallback. All optional.
#[derive(Debug, Default, Clone)]
pub struct CredentialArgs {
    pub url: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Source of interactive answers. `field` is the flag name, `env` the
/// variable that would have supplied it; both end up in error messages.
pub trait Prompter {
    fn input(&mut self, field: &'static str, env: &'static str) -> Result<String>;
    fn password(&mut self, field: &'static str, env: &'static str) -> Result<String>;
}

#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    Login { username: String, password: String },
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Token(_) => f.write_str("Token(***)"),
            Auth::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub auth: Auth,
}

/// Resolve the URL and one form of authentication. `prompter` is only
/// consulted for values `args` does not carry.
pub fn resolve<P>(args: &CredentialArgs, prompter: &mut P) -> Result<Credentials>
where
    P: Prompter + ?Sized,
{
    let url = match present(args.url.as_deref()) {
        Some(url) => url,
        None => require_trimmed(prompter.input("url", ENV_URL)?, "url", ENV_URL)?,
    };

    if let Some(token) = present(args.token.as_deref()) {
        debug!("using token authentication");
        return Ok(Credentials {
            url,
            auth: Auth::Token(token),
        });
    }

    let username = match present(args.username.as_deref()) {
        Some(username) => username,
        None => require_trimmed(prompter.input("username", ENV_USER)?, "username", ENV_USER)?,
    };
    let password = match present(args.password.as_deref()) {
        Some(password) => password,
        None => {
            // Sent exactly as typed; spaces can be part of a password.
            let password = prompter.password("password", ENV_PASSWORD)?;
            if password.is_empty() {
                return Err(QpiError::MissingValue {
                    field: "password",
                    env: ENV_PASSWORD,
                });
            }
            password
        }
    };

    debug!(%username, "using username/password authentication");
    Ok(Credentials {
        url,
        auth: Auth::Login { username, password },
    })
}

// An empty flag or variable counts as "not given".
fn present(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn require_trimmed(value: String, field: &'static str, env: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(QpiError::MissingValue { field, env });
    }
    Ok(value.to_string())
}
