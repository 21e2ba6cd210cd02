// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection and propagation of permission sets.

use crate::Error;
use quicksight_client::types::DescribeParams;
use quicksight_client::types::GrantParams;
use quicksight_client::types::ResourcePermission;
use quicksight_client::AnalyticsApi;
use regrant_common::capability::Verb;
use regrant_common::Arn;
use regrant_common::CapabilityRegistry;
use slog::debug;
use slog::info;
use slog::o;
use slog::warn;
use slog::Logger;

/// Reads permission sets off source resources and grants them to new
/// principals.
pub struct Propagator<'a, A> {
    api: &'a A,
    registry: &'a CapabilityRegistry,
    log: Logger,
}

impl<'a, A: AnalyticsApi> Propagator<'a, A> {
    pub fn new(
        api: &'a A,
        registry: &'a CapabilityRegistry,
        log: &Logger,
    ) -> Propagator<'a, A> {
        Propagator {
            api,
            registry,
            log: log.new(o!("component" => "propagator")),
        }
    }

    /// Picks the action list to propagate from `resource`.
    ///
    /// Among the permission blocks on the resource this is the one with
    /// the most actions, first seen winning ties.  That is a heuristic:
    /// the broadest existing grant stands in for what a new principal
    /// should get.  A resource with no permission blocks yields an empty
    /// list, which is not an error; the resource may simply not have been
    /// shared yet.
    pub async fn best_permission_set(
        &self,
        resource: &Arn,
    ) -> Result<Vec<String>, Error> {
        let capability = self
            .registry
            .describe_capability(resource.service(), resource.resource_type())
            .ok_or_else(|| {
                regrant_common::Error::unsupported_capability(
                    resource.service(),
                    Verb::DescribePermissions,
                    resource.resource_type(),
                )
            })?;
        let params = DescribeParams {
            account_id: resource.account_id().to_string(),
            resource_id: resource.resource_id().to_string(),
        };
        let blocks = self
            .api
            .describe_permissions(capability.operation, &params)
            .await?;

        let mut best: Option<&ResourcePermission> = None;
        for block in &blocks {
            let better = match best {
                None => true,
                Some(current) => block.actions.len() > current.actions.len(),
            };
            if better {
                best = Some(block);
            }
        }
        match best {
            Some(block) => {
                debug!(
                    self.log, "picked permission set";
                    "resource" => resource.to_string(),
                    "principal" => &block.principal,
                    "actions" => block.actions.len(),
                );
                Ok(block.actions.clone())
            }
            None => {
                debug!(
                    self.log, "resource has no permission blocks";
                    "resource" => resource.to_string(),
                );
                Ok(Vec::new())
            }
        }
    }

    /// Grants `actions` on `resource` to `grantee`, returning the status
    /// the service reported.
    ///
    /// A non-success status comes back as a value so a caller working
    /// through many pairs can report it and keep going.
    pub async fn grant(
        &self,
        resource: &Arn,
        actions: &[String],
        grantee: &Arn,
    ) -> Result<u16, Error> {
        let capability = self
            .registry
            .grant_capability(resource.service(), resource.resource_type())
            .ok_or_else(|| {
                regrant_common::Error::unsupported_capability(
                    resource.service(),
                    Verb::GrantPermissions,
                    resource.resource_type(),
                )
            })?;
        let params = GrantParams {
            account_id: resource.account_id().to_string(),
            resource_id: resource.resource_id().to_string(),
            grants: vec![ResourcePermission {
                principal: grantee.to_string(),
                actions: actions.to_vec(),
            }],
        };
        let status = self
            .api
            .update_permissions(capability.operation, &params)
            .await?;
        if (200..300).contains(&status) {
            info!(
                self.log, "granted permissions";
                "resource" => resource.to_string(),
                "grantee" => grantee.to_string(),
                "status" => status,
            );
        } else {
            warn!(
                self.log, "grant not accepted";
                "resource" => resource.to_string(),
                "grantee" => grantee.to_string(),
                "status" => status,
            );
        }
        Ok(status)
    }
}
