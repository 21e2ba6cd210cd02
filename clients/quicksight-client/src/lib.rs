// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the analytics service API and the caller-identity API
//!
//! The remote service is consumed through two narrow traits:
//! [`AnalyticsApi`] for the listing / describe-permissions /
//! update-permissions operations named by the capability registry, and
//! [`IdentityApi`] for the single caller-identity lookup.  The resolver
//! and propagator are written against the traits, so tests substitute
//! in-process fakes without any HTTP involved.

use regrant_common::capability::Param;

mod client;
mod identity;
pub mod types;

pub use client::AnalyticsApi;
pub use client::Client;
pub use identity::IdentityApi;
pub use identity::IdentityClient;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or the response never arrived.
    #[error("transport error calling {op}: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered with a failure status.
    #[error("{op} failed with status {status}")]
    Status { op: &'static str, status: u16 },

    /// The response arrived but was not in the expected shape.
    #[error("invalid response from {op}: {message}")]
    InvalidResponse { op: &'static str, message: String },

    /// A parameter the operation requires was not supplied.
    #[error("{op} requires the {param:?} parameter")]
    MissingParam { op: &'static str, param: Param },
}

impl Error {
    fn transport(op: &'static str, source: reqwest::Error) -> Error {
        Error::Transport { op, source }
    }

    fn invalid_response(op: &'static str, message: String) -> Error {
        Error::InvalidResponse { op, message }
    }
}
