// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the analytics service

use crate::types::DescribeParams;
use crate::types::GrantParams;
use crate::types::ListParams;
use crate::types::PermissionsEnvelope;
use crate::types::Record;
use crate::types::ResourcePermission;
use crate::types::UpdateEnvelope;
use crate::types::UpdatePermissionsRequest;
use crate::Error;
use async_trait::async_trait;
use regrant_common::capability::DescribeOp;
use regrant_common::capability::GrantOp;
use regrant_common::capability::ListOp;
use regrant_common::capability::Param;
use slog::debug;
use slog::o;
use slog::trace;
use slog::Logger;

/// The operations of the analytics service consumed by this tool
///
/// One method per verb of the capability registry; the registry entry
/// supplies the typed operation to invoke.
#[async_trait]
pub trait AnalyticsApi {
    /// List the records of one resource type.
    async fn list(
        &self,
        op: ListOp,
        params: &ListParams,
    ) -> Result<Vec<Record>, Error>;

    /// Read the permission blocks on one resource.
    async fn describe_permissions(
        &self,
        op: DescribeOp,
        params: &DescribeParams,
    ) -> Result<Vec<ResourcePermission>, Error>;

    /// Apply a list of grants to one resource, returning the status the
    /// service reported.  A non-success status is a value here, not an
    /// error; only transport-level problems fail the call.
    async fn update_permissions(
        &self,
        op: GrantOp,
        params: &GrantParams,
    ) -> Result<u16, Error>;
}

/// A `Client` to the analytics service API
#[derive(Clone, Debug)]
pub struct Client {
    baseurl: String,
    client: reqwest::Client,
    log: Logger,
}

impl Client {
    /// Construct a new client of the analytics service at `baseurl`.
    pub fn new(baseurl: &str, log: &Logger) -> Client {
        let log = log.new(o!(
            "component" => "quicksight-client",
            "baseurl" => baseurl.to_string(),
        ));
        Client {
            baseurl: baseurl.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            log,
        }
    }

    fn list_url(
        &self,
        op: ListOp,
        params: &ListParams,
    ) -> Result<String, Error> {
        let account_id = params.account_id.as_deref().ok_or(
            Error::MissingParam { op: op.name(), param: Param::AccountId },
        )?;
        let url = match op {
            ListOp::Users => {
                let namespace = params.namespace.as_deref().ok_or(
                    Error::MissingParam {
                        op: op.name(),
                        param: Param::Namespace,
                    },
                )?;
                format!(
                    "{}/accounts/{}/namespaces/{}/users",
                    self.baseurl, account_id, namespace
                )
            }
            ListOp::DataSets => {
                format!("{}/accounts/{}/data-sets", self.baseurl, account_id)
            }
            ListOp::DataSources => {
                format!("{}/accounts/{}/data-sources", self.baseurl, account_id)
            }
        };
        Ok(url)
    }

    fn permissions_url(
        &self,
        collection: &str,
        account_id: &str,
        resource_id: &str,
    ) -> String {
        format!(
            "{}/accounts/{}/{}/{}/permissions",
            self.baseurl, account_id, collection, resource_id
        )
    }
}

fn describe_collection(op: DescribeOp) -> &'static str {
    match op {
        DescribeOp::DataSetPermissions => "data-sets",
        DescribeOp::DataSourcePermissions => "data-sources",
    }
}

fn grant_collection(op: GrantOp) -> &'static str {
    match op {
        GrantOp::DataSetPermissions => "data-sets",
        GrantOp::DataSourcePermissions => "data-sources",
    }
}

#[async_trait]
impl AnalyticsApi for Client {
    async fn list(
        &self,
        op: ListOp,
        params: &ListParams,
    ) -> Result<Vec<Record>, Error> {
        let url = self.list_url(op, params)?;
        debug!(self.log, "listing records"; "op" => op.name(), "url" => &url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport(op.name(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                op: op.name(),
                status: status.as_u16(),
            });
        }
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(op.name(), e.to_string()))?;

        // Records live under the operation's response key.  A response
        // without that key is an empty listing, not an error.
        let records = match body.get(op.response_key()) {
            None => Vec::new(),
            Some(value) => serde_json::from_value(value.clone()).map_err(
                |e| {
                    Error::invalid_response(
                        op.name(),
                        format!("field \"{}\": {}", op.response_key(), e),
                    )
                },
            )?,
        };
        trace!(
            self.log, "listed records";
            "op" => op.name(),
            "count" => records.len(),
        );
        Ok(records)
    }

    async fn describe_permissions(
        &self,
        op: DescribeOp,
        params: &DescribeParams,
    ) -> Result<Vec<ResourcePermission>, Error> {
        let url = self.permissions_url(
            describe_collection(op),
            &params.account_id,
            &params.resource_id,
        );
        debug!(
            self.log, "describing permissions";
            "op" => op.name(),
            "url" => &url,
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport(op.name(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                op: op.name(),
                status: status.as_u16(),
            });
        }
        let envelope: PermissionsEnvelope = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(op.name(), e.to_string()))?;
        Ok(envelope.permissions)
    }

    async fn update_permissions(
        &self,
        op: GrantOp,
        params: &GrantParams,
    ) -> Result<u16, Error> {
        let url = self.permissions_url(
            grant_collection(op),
            &params.account_id,
            &params.resource_id,
        );
        debug!(
            self.log, "updating permissions";
            "op" => op.name(),
            "url" => &url,
            "ngrants" => params.grants.len(),
        );
        let body =
            UpdatePermissionsRequest { grant_permissions: &params.grants };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::transport(op.name(), e))?;
        let http_status = response.status().as_u16();
        let status = match response.json::<UpdateEnvelope>().await {
            Ok(envelope) => envelope.status.unwrap_or(http_status),
            Err(_) => http_status,
        };
        trace!(
            self.log, "updated permissions";
            "op" => op.name(),
            "status" => status,
        );
        Ok(status)
    }
}
