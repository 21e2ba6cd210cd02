// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolution of search criteria to concrete resource identifiers.

use crate::search::SearchCriteria;
use crate::Error;
use quicksight_client::types::ListParams;
use quicksight_client::AnalyticsApi;
use regrant_common::capability::Param;
use regrant_common::Arn;
use regrant_common::CapabilityRegistry;
use slog::debug;
use slog::o;
use slog::warn;
use slog::Logger;

/// Account scope applied to every search in one run
#[derive(Clone, Debug)]
pub struct AccountContext {
    pub account_id: String,
    pub namespace: String,
}

/// Resolves search criteria through the listing capabilities of the
/// registry.
pub struct Resolver<'a, A> {
    api: &'a A,
    registry: &'a CapabilityRegistry,
    log: Logger,
}

impl<'a, A: AnalyticsApi> Resolver<'a, A> {
    pub fn new(
        api: &'a A,
        registry: &'a CapabilityRegistry,
        log: &Logger,
    ) -> Resolver<'a, A> {
        Resolver {
            api,
            registry,
            log: log.new(o!("component" => "resolver")),
        }
    }

    /// Resolves `criteria` to the identifier of the one matching record.
    ///
    /// Succeeds only when exactly one record of the listed collection
    /// carries every attribute of the criteria.  Types that cannot play a
    /// part in a grant are rejected before any remote call.
    pub async fn resolve(
        &self,
        criteria: &SearchCriteria,
        context: &AccountContext,
    ) -> Result<Arn, Error> {
        let service = criteria.service();
        let resource_type = criteria.resource_type();
        let capability = self
            .registry
            .list_capability(service, resource_type)
            .ok_or_else(|| Error::UnsupportedSearch {
                service: service.to_string(),
                resource_type: resource_type.to_string(),
            })?;
        if !self.registry.is_grantee_kind(service, resource_type)
            && !self.registry.is_grantable(service, resource_type)
        {
            return Err(Error::UnsupportedResourceType {
                service: service.to_string(),
                resource_type: resource_type.to_string(),
            });
        }

        // Fill exactly the parameters this listing accepts.  Sending a
        // parameter the operation does not know would fail the call.
        let mut params = ListParams::default();
        if capability.accepts(Param::AccountId) {
            params.account_id = Some(context.account_id.clone());
        }
        if capability.accepts(Param::Namespace) {
            params.namespace = Some(context.namespace.clone());
        }

        debug!(
            self.log, "resolving search";
            "criteria" => criteria.to_string(),
            "op" => capability.operation.name(),
        );
        let records = self.api.list(capability.operation, &params).await?;
        let matches = records
            .iter()
            .filter(|record| criteria.matches(record))
            .collect::<Vec<_>>();

        match matches.as_slice() {
            [] => Err(Error::NoMatch { criteria: criteria.to_string() }),
            [record] => {
                let raw = record.arn().ok_or_else(|| {
                    Error::MissingRecordArn { criteria: criteria.to_string() }
                })?;
                let arn = raw.parse::<Arn>()?;
                debug!(
                    self.log, "resolved search";
                    "criteria" => criteria.to_string(),
                    "arn" => arn.to_string(),
                );
                Ok(arn)
            }
            many => {
                // Surface every candidate before failing so an operator
                // can tighten the criteria.
                for record in many {
                    warn!(
                        self.log, "ambiguous search candidate";
                        "criteria" => criteria.to_string(),
                        "arn" => record.arn().unwrap_or("(none)"),
                    );
                }
                Err(Error::AmbiguousMatch {
                    criteria: criteria.to_string(),
                    count: many.len(),
                })
            }
        }
    }
}
