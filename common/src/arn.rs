// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The structured identifier naming cloud resources and principals

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// A parsed resource identifier (ARN)
///
/// An `Arn` names one resource or principal within a service:
/// `arn:aws:<service>:<region>:<account>:<resource-type>/<resource-id>`.
/// The partition is always "aws".  Values are immutable once parsed;
/// `Display` reproduces the canonical form above, and parsing that form
/// yields an equal value.
///
/// Validation is shape-only.  The region (or any other field) may be
/// empty, and the resource id may itself contain "/" (as user ARNs do,
/// where the id is "namespace/user-name").
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Arn {
    service: String,
    region: String,
    account_id: String,
    resource_type: String,
    resource_id: String,
}

impl Arn {
    pub fn partition(&self) -> &'static str {
        "aws"
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }
}

/// Parsing is the only way to construct an `Arn`.  The string must have at
/// least six colon-separated fields: "arn", "aws", service, region,
/// account id, and a resource descriptor.  The descriptor is either a
/// single "type/id" field (split on the first "/") or exactly two fields
/// (type, id).  In the two-field form the type may not contain "/", since
/// the canonical serialization of such a value would parse back
/// differently.
impl FromStr for Arn {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = value.split(':').collect();
        if fields.len() < 6 {
            return Err(Error::malformed_arn(
                value,
                "expected at least six colon-separated fields",
            ));
        }
        if fields[0] != "arn" {
            return Err(Error::malformed_arn(
                value,
                "identifier does not begin with \"arn\"",
            ));
        }
        if fields[1] != "aws" {
            return Err(Error::malformed_arn(
                value,
                "partition must be \"aws\"",
            ));
        }

        let (resource_type, resource_id) = match &fields[5..] {
            [descriptor] => descriptor.split_once('/').ok_or_else(|| {
                Error::malformed_arn(
                    value,
                    "resource descriptor has no \"/\" between type and id",
                )
            })?,
            [resource_type, resource_id] => {
                if resource_type.contains('/') {
                    return Err(Error::malformed_arn(
                        value,
                        "resource type may not contain \"/\"",
                    ));
                }
                (*resource_type, *resource_id)
            }
            _ => {
                return Err(Error::malformed_arn(
                    value,
                    "resource descriptor must be one \"type/id\" field or \
                     exactly two colon-separated fields",
                ));
            }
        };

        Ok(Arn {
            service: fields[2].to_owned(),
            region: fields[3].to_owned(),
            account_id: fields[4].to_owned(),
            resource_type: resource_type.to_owned(),
            resource_id: resource_id.to_owned(),
        })
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:aws:{}:{}:{}:{}/{}",
            self.service,
            self.region,
            self.account_id,
            self.resource_type,
            self.resource_id
        )
    }
}
