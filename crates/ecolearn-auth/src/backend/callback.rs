//! Magic-link callback parsing.
//!
//! A confirmed link lands on the sign-in route either with a
//! `token_hash` query parameter (server-verified flow) or with the
//! session tokens in the URL fragment (implicit flow). Error redirects
//! carry `error`/`error_description` in either place.

use std::collections::HashMap;

use reqwest::Url;

use crate::error::BackendError;

/// Link type used when the callback does not name one.
const DEFAULT_LINK_TYPE: &str = "magiclink";

/// Credential carried by a magic-link callback URL.
#[derive(Clone, PartialEq, Eq)]
pub enum LinkCallback {
    /// One-time token to verify with the backend.
    TokenHash {
        /// The token from the link.
        token_hash: String,
        /// OTP type, usually `magiclink`.
        link_type: String,
    },
    /// Session tokens already issued by the backend.
    Tokens {
        /// Bearer token.
        access_token: String,
        /// Refresh token, when present.
        refresh_token: Option<String>,
        /// Access token lifetime in seconds.
        expires_in: Option<i64>,
    },
}

impl std::fmt::Debug for LinkCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenHash { link_type, .. } => f
                .debug_struct("TokenHash")
                .field("link_type", link_type)
                .finish_non_exhaustive(),
            Self::Tokens { expires_in, .. } => f
                .debug_struct("Tokens")
                .field("expires_in", expires_in)
                .finish_non_exhaustive(),
        }
    }
}

impl LinkCallback {
    /// Parse an absolute callback URL, or a path such as
    /// `/auth?token_hash=...`.
    pub fn parse(url: &str) -> Result<Self, BackendError> {
        let parsed = parse_url(url.trim())?;
        let mut params: HashMap<String, String> = parsed.query_pairs().into_owned().collect();

        if let Some(fragment) = parsed.fragment().filter(|f| !f.is_empty()) {
            let mut holder = parsed.clone();
            holder.set_fragment(None);
            holder.set_query(Some(fragment));
            params.extend(holder.query_pairs().into_owned());
        }

        if let Some(error) = params
            .get("error_description")
            .or_else(|| params.get("error"))
        {
            return Err(BackendError::InvalidLink(error.clone()));
        }

        if let Some(token_hash) = params.remove("token_hash").filter(|t| !t.is_empty()) {
            return Ok(Self::TokenHash {
                token_hash,
                link_type: params
                    .remove("type")
                    .unwrap_or_else(|| DEFAULT_LINK_TYPE.to_string()),
            });
        }

        if let Some(access_token) = params.remove("access_token").filter(|t| !t.is_empty()) {
            return Ok(Self::Tokens {
                access_token,
                refresh_token: params.remove("refresh_token").filter(|t| !t.is_empty()),
                expires_in: params.get("expires_in").and_then(|v| v.parse().ok()),
            });
        }

        Err(BackendError::InvalidLink(
            "link carries neither token_hash nor access_token".to_string(),
        ))
    }
}

fn parse_url(url: &str) -> Result<Url, BackendError> {
    Url::parse(url)
        .or_else(|_| Url::parse("http://localhost").and_then(|base| base.join(url)))
        .map_err(|e| BackendError::InvalidLink(e.to_string()))
}
