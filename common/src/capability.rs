// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The service capability registry
//!
//! The registry maps an abstract (service, verb, resource type) triple to
//! the concrete contract for calling the remote service: which typed
//! operation to invoke, which parameters that operation accepts, and (for
//! listings) the response field holding the records.  The table is data,
//! not logic.  Supporting a new resource type means adding a row here;
//! the resolver and propagator consult the registry and never hard-code
//! operations themselves.
//!
//! The set of remote operations is closed: each verb has an enum of the
//! operations the client implements, and a registry row selects one.  An
//! unknown (service, resource type) pair is the only capability failure
//! left at runtime.  `CapabilityRegistry::validate` runs at process start
//! so that an incoherent table fails the whole program rather than one
//! call deep into a run.

use anyhow::bail;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

/// The abstract operations performed against a service
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Verb {
    List,
    DescribePermissions,
    GrantPermissions,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verb::List => "list",
            Verb::DescribePermissions => "describe-permissions",
            Verb::GrantPermissions => "grant-permissions",
        };
        write!(f, "{}", label)
    }
}

/// Remote listing operations, one per listable resource type
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ListOp {
    Users,
    DataSets,
    DataSources,
}

impl ListOp {
    /// The remote service's name for this operation
    pub fn name(&self) -> &'static str {
        match self {
            ListOp::Users => "ListUsers",
            ListOp::DataSets => "ListDataSets",
            ListOp::DataSources => "ListDataSources",
        }
    }

    /// Field of the response body under which records are returned
    pub fn response_key(&self) -> &'static str {
        match self {
            ListOp::Users => "UserList",
            ListOp::DataSets => "DataSetSummaries",
            ListOp::DataSources => "DataSources",
        }
    }
}

/// Remote operations reading the permission blocks on one resource
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DescribeOp {
    DataSetPermissions,
    DataSourcePermissions,
}

impl DescribeOp {
    pub fn name(&self) -> &'static str {
        match self {
            DescribeOp::DataSetPermissions => "DescribeDataSetPermissions",
            DescribeOp::DataSourcePermissions => {
                "DescribeDataSourcePermissions"
            }
        }
    }
}

/// Remote operations granting permissions on one resource
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GrantOp {
    DataSetPermissions,
    DataSourcePermissions,
}

impl GrantOp {
    pub fn name(&self) -> &'static str {
        match self {
            GrantOp::DataSetPermissions => "UpdateDataSetPermissions",
            GrantOp::DataSourcePermissions => "UpdateDataSourcePermissions",
        }
    }
}

/// Parameters a remote operation may accept
///
/// Callers build their request from the entry's accepted set and must
/// drop anything the entry does not list rather than send it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Param {
    AccountId,
    Namespace,
    ResourceId,
    Grants,
}

/// The remote call contract for one (service, verb, resource type)
#[derive(Clone, Debug)]
pub struct CapabilityEntry<Op> {
    pub operation: Op,
    pub accepted_params: Vec<Param>,
}

impl<Op> CapabilityEntry<Op> {
    pub fn accepts(&self, param: Param) -> bool {
        self.accepted_params.contains(&param)
    }
}

pub type ListCapability = CapabilityEntry<ListOp>;
pub type DescribeCapability = CapabilityEntry<DescribeOp>;
pub type GrantCapability = CapabilityEntry<GrantOp>;

/// Everything registered for one (service, resource type)
#[derive(Clone, Debug)]
pub struct ResourceCapabilities {
    pub service: String,
    pub resource_type: String,
    /// whether identifiers of this type can be the target of a grant
    pub grantee_kind: bool,
    pub list: Option<ListCapability>,
    pub describe_permissions: Option<DescribeCapability>,
    pub grant_permissions: Option<GrantCapability>,
}

/// Static table of supported capabilities, loaded once and never mutated
#[derive(Clone, Debug)]
pub struct CapabilityRegistry {
    rows: Vec<ResourceCapabilities>,
}

static BUILTIN: LazyLock<CapabilityRegistry> = LazyLock::new(|| {
    CapabilityRegistry::new(vec![
        ResourceCapabilities {
            service: String::from("quicksight"),
            resource_type: String::from("user"),
            grantee_kind: true,
            list: Some(CapabilityEntry {
                operation: ListOp::Users,
                accepted_params: vec![Param::AccountId, Param::Namespace],
            }),
            describe_permissions: None,
            grant_permissions: None,
        },
        ResourceCapabilities {
            service: String::from("quicksight"),
            resource_type: String::from("dataset"),
            grantee_kind: false,
            list: Some(CapabilityEntry {
                operation: ListOp::DataSets,
                accepted_params: vec![Param::AccountId],
            }),
            describe_permissions: Some(CapabilityEntry {
                operation: DescribeOp::DataSetPermissions,
                accepted_params: vec![Param::AccountId, Param::ResourceId],
            }),
            grant_permissions: Some(CapabilityEntry {
                operation: GrantOp::DataSetPermissions,
                accepted_params: vec![
                    Param::AccountId,
                    Param::ResourceId,
                    Param::Grants,
                ],
            }),
        },
        ResourceCapabilities {
            service: String::from("quicksight"),
            resource_type: String::from("datasource"),
            grantee_kind: false,
            list: Some(CapabilityEntry {
                operation: ListOp::DataSources,
                accepted_params: vec![Param::AccountId],
            }),
            describe_permissions: Some(CapabilityEntry {
                operation: DescribeOp::DataSourcePermissions,
                accepted_params: vec![Param::AccountId, Param::ResourceId],
            }),
            grant_permissions: Some(CapabilityEntry {
                operation: GrantOp::DataSourcePermissions,
                accepted_params: vec![
                    Param::AccountId,
                    Param::ResourceId,
                    Param::Grants,
                ],
            }),
        },
    ])
});

impl CapabilityRegistry {
    pub fn new(rows: Vec<ResourceCapabilities>) -> CapabilityRegistry {
        CapabilityRegistry { rows }
    }

    /// Returns the built-in table of supported services
    pub fn builtin() -> &'static CapabilityRegistry {
        &BUILTIN
    }

    fn row(
        &self,
        service: &str,
        resource_type: &str,
    ) -> Option<&ResourceCapabilities> {
        self.rows.iter().find(|row| {
            row.service == service && row.resource_type == resource_type
        })
    }

    pub fn list_capability(
        &self,
        service: &str,
        resource_type: &str,
    ) -> Option<&ListCapability> {
        self.row(service, resource_type)?.list.as_ref()
    }

    pub fn describe_capability(
        &self,
        service: &str,
        resource_type: &str,
    ) -> Option<&DescribeCapability> {
        self.row(service, resource_type)?.describe_permissions.as_ref()
    }

    pub fn grant_capability(
        &self,
        service: &str,
        resource_type: &str,
    ) -> Option<&GrantCapability> {
        self.row(service, resource_type)?.grant_permissions.as_ref()
    }

    /// Whether identifiers of this type can be the target of a grant
    pub fn is_grantee_kind(&self, service: &str, resource_type: &str) -> bool {
        self.row(service, resource_type).is_some_and(|row| row.grantee_kind)
    }

    /// Whether permissions on this type can be both read and granted
    pub fn is_grantable(&self, service: &str, resource_type: &str) -> bool {
        self.row(service, resource_type).is_some_and(|row| {
            row.describe_permissions.is_some()
                && row.grant_permissions.is_some()
        })
    }

    /// Checks the whole table for coherence.  Run once at process start;
    /// a table that fails here would otherwise surface as a confusing
    /// capability error in the middle of a run.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut seen = BTreeSet::new();
        for row in &self.rows {
            let label = format!("{}:{}", row.service, row.resource_type);
            if !seen.insert((row.service.clone(), row.resource_type.clone()))
            {
                bail!("duplicate capability row for \"{}\"", label);
            }

            if row.grantee_kind && row.list.is_none() {
                bail!(
                    "grantee kind \"{}\" must support {}",
                    label,
                    Verb::List
                );
            }

            match (&row.describe_permissions, &row.grant_permissions) {
                (None, None) => (),
                (Some(_), None) | (None, Some(_)) => {
                    bail!(
                        "\"{}\" must support both {} and {} or neither",
                        label,
                        Verb::DescribePermissions,
                        Verb::GrantPermissions
                    );
                }
                (Some(describe), Some(grant)) => {
                    if row.list.is_none() {
                        bail!(
                            "grantable \"{}\" must support {}",
                            label,
                            Verb::List
                        );
                    }
                    if !describe.accepts(Param::ResourceId) {
                        bail!(
                            "{} for \"{}\" must accept a resource id",
                            Verb::DescribePermissions,
                            label
                        );
                    }
                    if !grant.accepts(Param::ResourceId)
                        || !grant.accepts(Param::Grants)
                    {
                        bail!(
                            "{} for \"{}\" must accept a resource id and \
                             a grant list",
                            Verb::GrantPermissions,
                            label
                        );
                    }
                }
            }

            if let Some(list) = &row.list {
                if list.accepts(Param::ResourceId)
                    || list.accepts(Param::Grants)
                {
                    bail!(
                        "{} for \"{}\" accepts per-resource parameters",
                        Verb::List,
                        label
                    );
                }
            }
        }
        Ok(())
    }
}
