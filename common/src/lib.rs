// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Types shared by the regrant CLI and its API clients
//!
//! This crate holds the pieces of the system that have no dependencies of
//! their own: the ARN identifier model, the service capability registry
//! describing which remote operations exist for which resource types, and
//! the logging and command-line plumbing used by the binaries.

pub mod arn;
pub mod capability;
pub mod cmd;
pub mod logging;

pub use arn::Arn;
pub use capability::CapabilityRegistry;

use capability::Verb;

/// Errors produced by the identifier model and the capability registry
///
/// These are the failure modes every consumer shares: a string that does
/// not name a resource, and a (service, verb, resource type) combination
/// the registry has no contract for.  Everything further downstream (no
/// match, ambiguity, remote failures) lives with the code that can give it
/// context.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The raw string does not have the shape of an ARN.
    #[error("malformed identifier {input:?}: {reason}")]
    MalformedArn { input: String, reason: String },

    /// The registry has no entry for this (service, verb, resource type).
    #[error(
        "unsupported capability: {verb} for \
         \"{service}\" resource type \"{resource_type}\""
    )]
    UnsupportedCapability {
        service: String,
        verb: Verb,
        resource_type: String,
    },
}

impl Error {
    pub fn malformed_arn(input: &str, reason: &str) -> Error {
        Error::MalformedArn {
            input: input.to_owned(),
            reason: reason.to_owned(),
        }
    }

    pub fn unsupported_capability(
        service: &str,
        verb: Verb,
        resource_type: &str,
    ) -> Error {
        Error::UnsupportedCapability {
            service: service.to_owned(),
            verb,
            resource_type: resource_type.to_owned(),
        }
    }
}
