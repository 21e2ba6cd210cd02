// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canned API implementations shared by the unit tests.

use async_trait::async_trait;
use quicksight_client::types::DescribeParams;
use quicksight_client::types::GrantParams;
use quicksight_client::types::ListParams;
use quicksight_client::types::Record;
use quicksight_client::types::ResourcePermission;
use quicksight_client::AnalyticsApi;
use quicksight_client::Error;
use quicksight_client::IdentityApi;
use regrant_common::capability::DescribeOp;
use regrant_common::capability::GrantOp;
use regrant_common::capability::ListOp;
use slog::o;
use slog::Logger;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

pub fn test_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

/// Builds a `Record` from a JSON object literal.
pub fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => Record(map),
        _ => panic!("record fixtures must be JSON objects"),
    }
}

/// Builds one permission block.
pub fn permission(principal: &str, actions: &[&str]) -> ResourcePermission {
    ResourcePermission {
        principal: principal.to_string(),
        actions: actions.iter().map(|a| a.to_string()).collect(),
    }
}

/// An `AnalyticsApi` built from canned data.
///
/// Listing returns the records configured for the requested operation,
/// describing returns the permission blocks keyed by resource id, and
/// updates are recorded and answered with `grant_status`.  The failure
/// knobs simulate a service that errors on listing, errors when asked to
/// describe one particular resource, or declines grants to one particular
/// principal.
pub struct FakeAnalytics {
    pub records: Vec<(ListOp, Record)>,
    pub permissions: Vec<(String, Vec<ResourcePermission>)>,
    pub grant_status: u16,
    pub fail_list: bool,
    pub fail_describe_for: Option<String>,
    pub reject_grantee: Option<String>,
    pub list_calls: Mutex<Vec<(ListOp, ListParams)>>,
    pub grant_calls: Mutex<Vec<(GrantOp, GrantParams)>>,
}

impl FakeAnalytics {
    pub fn new() -> FakeAnalytics {
        FakeAnalytics {
            records: Vec::new(),
            permissions: Vec::new(),
            grant_status: 200,
            fail_list: false,
            fail_describe_for: None,
            reject_grantee: None,
            list_calls: Mutex::new(Vec::new()),
            grant_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(records: Vec<(ListOp, Record)>) -> FakeAnalytics {
        FakeAnalytics { records, ..FakeAnalytics::new() }
    }
}

#[async_trait]
impl AnalyticsApi for FakeAnalytics {
    async fn list(
        &self,
        op: ListOp,
        params: &ListParams,
    ) -> Result<Vec<Record>, Error> {
        self.list_calls.lock().unwrap().push((op, params.clone()));
        if self.fail_list {
            return Err(Error::Status { op: op.name(), status: 500 });
        }
        Ok(self
            .records
            .iter()
            .filter(|(record_op, _)| *record_op == op)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn describe_permissions(
        &self,
        op: DescribeOp,
        params: &DescribeParams,
    ) -> Result<Vec<ResourcePermission>, Error> {
        if self.fail_describe_for.as_deref()
            == Some(params.resource_id.as_str())
        {
            return Err(Error::Status { op: op.name(), status: 500 });
        }
        Ok(self
            .permissions
            .iter()
            .find(|(resource_id, _)| *resource_id == params.resource_id)
            .map(|(_, blocks)| blocks.clone())
            .unwrap_or_default())
    }

    async fn update_permissions(
        &self,
        op: GrantOp,
        params: &GrantParams,
    ) -> Result<u16, Error> {
        self.grant_calls.lock().unwrap().push((op, params.clone()));
        if let Some(principal) = &self.reject_grantee {
            if params.grants.iter().any(|g| g.principal == *principal) {
                return Ok(403);
            }
        }
        Ok(self.grant_status)
    }
}

/// An `IdentityApi` answering with a fixed account id, counting calls.
pub struct FakeIdentity {
    pub account_id: String,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn new(account_id: &str) -> FakeIdentity {
        FakeIdentity {
            account_id: account_id.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn caller_account_id(&self) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Status {
                op: "GetCallerIdentity",
                status: 401,
            });
        }
        Ok(self.account_id.clone())
    }
}
