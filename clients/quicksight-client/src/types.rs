// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request parameters and response types for the analytics API

use serde::Deserialize;
use serde::Serialize;

/// One record from a listing, kept as loosely structured JSON
///
/// Each listable resource type returns its own summary shape.  Consumers
/// only need the identifier plus whatever attributes an operator chooses
/// to match on, so records stay schemaless and are queried by field name.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(pub serde_json::Map<String, serde_json::Value>);

impl Record {
    /// The record's resource identifier, if it carries one
    pub fn arn(&self) -> Option<&str> {
        self.attr_str("Arn")
    }

    /// A string-valued attribute; anything non-string is `None`
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.as_str())
    }
}

/// One permission block: the actions a principal holds on a resource
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResourcePermission {
    #[serde(rename = "Principal")]
    pub principal: String,
    #[serde(rename = "Actions")]
    pub actions: Vec<String>,
}

/// Parameters for listing operations
///
/// All fields are optional: callers fill exactly the parameters the
/// capability entry accepts, and each operation checks for the ones it
/// cannot do without.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    pub account_id: Option<String>,
    pub namespace: Option<String>,
}

/// Parameters for reading the permission blocks on one resource
#[derive(Clone, Debug)]
pub struct DescribeParams {
    pub account_id: String,
    pub resource_id: String,
}

/// Parameters for granting permissions on one resource
#[derive(Clone, Debug)]
pub struct GrantParams {
    pub account_id: String,
    pub resource_id: String,
    pub grants: Vec<ResourcePermission>,
}

/// Response body of the describe-permissions operations
#[derive(Debug, Deserialize)]
pub(crate) struct PermissionsEnvelope {
    #[serde(rename = "Permissions", default)]
    pub permissions: Vec<ResourcePermission>,
}

/// Request body of the update-permissions operations
#[derive(Debug, Serialize)]
pub(crate) struct UpdatePermissionsRequest<'a> {
    #[serde(rename = "GrantPermissions")]
    pub grant_permissions: &'a [ResourcePermission],
}

/// Response body of the update-permissions operations
///
/// The service reports the outcome in the body's `Status` field; when it
/// is absent the HTTP status stands in.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateEnvelope {
    #[serde(rename = "Status")]
    pub status: Option<u16>,
}
