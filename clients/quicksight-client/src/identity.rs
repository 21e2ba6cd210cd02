// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the caller-identity service

use crate::Error;
use async_trait::async_trait;
use serde::Deserialize;
use slog::debug;
use slog::o;
use slog::Logger;

/// The one operation of the identity service
#[async_trait]
pub trait IdentityApi {
    /// Returns the account id of the calling principal.
    async fn caller_account_id(&self) -> Result<String, Error>;
}

/// A `Client` to the caller-identity API
#[derive(Clone, Debug)]
pub struct IdentityClient {
    baseurl: String,
    client: reqwest::Client,
    log: Logger,
}

impl IdentityClient {
    /// Construct a new client of the identity service at `baseurl`.
    pub fn new(baseurl: &str, log: &Logger) -> IdentityClient {
        let log = log.new(o!(
            "component" => "identity-client",
            "baseurl" => baseurl.to_string(),
        ));
        IdentityClient {
            baseurl: baseurl.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            log,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallerIdentity {
    #[serde(rename = "Account")]
    account: String,
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn caller_account_id(&self) -> Result<String, Error> {
        const OP: &str = "GetCallerIdentity";
        let url = format!("{}/caller-identity", self.baseurl);
        debug!(self.log, "fetching caller identity"; "url" => &url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport(OP, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { op: OP, status: status.as_u16() });
        }
        let identity: CallerIdentity = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(OP, e.to_string()))?;
        Ok(identity.account)
    }
}
