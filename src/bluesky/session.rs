//! Session creation against `com.atproto.server.createSession`.

use super::types::{CreateSessionRequest, CreateSessionResponse};
use super::{read_failure, xrpc_url};
use crate::error::SyncError;
use crate::models::Credential;
use crate::utils::normalize_handle;
use tracing::{error, info, instrument};
use url::Url;

/// Exchanges an identifier and app password for a [`Credential`].
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    service: Url,
}

impl SessionClient {
    pub fn new(http: reqwest::Client, service: Url) -> Self {
        Self { http, service }
    }

    /// Create a session for `identifier`.
    ///
    /// A leading `@` on the identifier is stripped. Both inputs must be
    /// non-empty; a rejected login surfaces as [`SyncError::Auth`] carrying the
    /// service's error code and message.
    #[instrument(level = "info", skip(self, secret))]
    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Credential, SyncError> {
        let identifier = normalize_handle(identifier);
        if identifier.is_empty() {
            return Err(SyncError::Config("identifier must not be empty".into()));
        }
        if secret.is_empty() {
            return Err(SyncError::Config("app password must not be empty".into()));
        }

        let url = xrpc_url(&self.service, "com.atproto.server.createSession")?;
        let resp = self
            .http
            .post(url)
            .json(&CreateSessionRequest {
                identifier,
                password: secret,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let failure = read_failure(resp).await;
            error!(
                status = failure.status,
                code = %failure.code,
                message = %failure.message,
                "Session creation rejected"
            );
            return Err(SyncError::Auth {
                code: failure.code,
                message: failure.message,
            });
        }

        let session: CreateSessionResponse = resp.json().await?;
        info!(handle = %session.handle, did = %session.did, "Authenticated");
        Ok(Credential {
            access_jwt: session.access_jwt,
            handle: session.handle,
            did: session.did,
        })
    }
}
