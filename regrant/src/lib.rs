// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Propagate resource permissions to newly-provisioned grantees.
//!
//! The pieces here are assembled by the `regrant` binary: search criteria
//! from the command line are resolved to concrete identifiers, a permission
//! set is chosen for each resource, and that set is granted to each grantee
//! in turn.

use regrant_common::Arn;

pub mod exec;
pub mod propagate;
pub mod resolve;
pub mod search;

#[cfg(test)]
pub(crate) mod testutil;

/// Errors produced while resolving searches and propagating permissions
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A failure originating in the shared identifier or capability layer
    #[error(transparent)]
    Common(#[from] regrant_common::Error),

    /// A remote call failed outright (transport, status, or decoding)
    #[error(transparent)]
    Api(#[from] quicksight_client::Error),

    /// Search tokens on the command line could not be understood
    #[error("invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("no resource matches search {criteria:?}")]
    NoMatch { criteria: String },

    #[error(
        "search {criteria:?} matches {count} resources, \
         expected exactly one"
    )]
    AmbiguousMatch { criteria: String, count: usize },

    #[error(
        "unsupported resource type \"{resource_type}\" in service \
         \"{service}\""
    )]
    UnsupportedResourceType { service: String, resource_type: String },

    #[error(
        "service \"{service}\" does not support searching for resources \
         of type \"{resource_type}\""
    )]
    UnsupportedSearch { service: String, resource_type: String },

    /// The service returned a matching record that carries no identifier
    #[error("record matching {criteria:?} has no \"Arn\" attribute")]
    MissingRecordArn { criteria: String },

    /// Argument processing produced no resources and no grantees at all
    #[error("nothing to do: no resources and no grantees were specified")]
    NothingToDo,

    /// The service declined a grant without failing the call
    #[error("grant to {grantee} on {resource} rejected with status {status}")]
    GrantRejected { resource: Arn, grantee: Arn, status: u16 },
}
