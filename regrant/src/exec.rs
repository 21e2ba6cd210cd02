// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The propagation run: parse, resolve, then grant over every pair.

use crate::propagate::Propagator;
use crate::resolve::AccountContext;
use crate::resolve::Resolver;
use crate::search::SearchCriteria;
use crate::Error;
use futures::stream;
use futures::StreamExt;
use quicksight_client::AnalyticsApi;
use quicksight_client::IdentityApi;
use regrant_common::Arn;
use regrant_common::CapabilityRegistry;
use slog::debug;
use slog::warn;
use slog::Logger;
use std::num::NonZeroUsize;

/// Everything one run works from, as collected on the command line
#[derive(Clone, Debug)]
pub struct ExecInput {
    /// resource identifiers given directly
    pub resources: Vec<String>,
    /// grantee identifiers given directly
    pub grantees: Vec<String>,
    /// the raw `KEY=VALUE` tokens of each `--search` occurrence
    pub searches: Vec<Vec<String>>,
    /// namespace passed to listings that accept one
    pub namespace: String,
    /// upper bound on in-flight grant calls for one resource
    pub jobs: NonZeroUsize,
}

/// The fate of one (resource, grantee) pair
#[derive(Debug)]
pub struct GrantOutcome {
    pub resource: Arn,
    pub grantee: Arn,
    /// the accepted status, or why the grant did not take
    pub result: Result<u16, Error>,
}

impl GrantOutcome {
    pub fn accepted(&self) -> bool {
        self.result.is_ok()
    }
}

/// What happened across the whole run
#[derive(Debug)]
pub struct ExecSummary {
    /// one outcome per attempted (resource, grantee) pair, in resource
    /// then grantee order
    pub outcomes: Vec<GrantOutcome>,
    /// resources dropped before any grant because their permission set
    /// could not be read
    pub skipped_resources: Vec<(Arn, Error)>,
}

impl ExecSummary {
    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.accepted()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.accepted() + self.skipped_resources.len()
    }
}

/// Runs one propagation end to end.
///
/// Identifiers and search tokens are parsed up front and any parse failure
/// is fatal.  Searches resolve through `Resolver`, with the caller's
/// account id fetched once, only when at least one search exists.  A run
/// with no resources and no grantees at all fails with `NothingToDo`;
/// otherwise every (resource, grantee) pair is attempted.  A resource
/// whose permission set cannot be read is reported and skipped; a grant
/// the service declines is reported and does not stop the rest.
///
/// Grants to the grantees of one resource may run concurrently, bounded
/// by `input.jobs`.  The permission set of a resource is always settled
/// before its first grant starts, and outcomes come back in a stable
/// order regardless of the bound.
pub async fn execute<A, I>(
    api: &A,
    identity: &I,
    registry: &CapabilityRegistry,
    input: &ExecInput,
    log: &Logger,
) -> Result<ExecSummary, Error>
where
    A: AnalyticsApi,
    I: IdentityApi,
{
    let mut resources = input
        .resources
        .iter()
        .map(|raw| raw.parse::<Arn>())
        .collect::<Result<Vec<_>, regrant_common::Error>>()?;
    let mut grantees = input
        .grantees
        .iter()
        .map(|raw| raw.parse::<Arn>())
        .collect::<Result<Vec<_>, regrant_common::Error>>()?;
    let searches = input
        .searches
        .iter()
        .map(|tokens| SearchCriteria::from_tokens(tokens))
        .collect::<Result<Vec<_>, Error>>()?;

    if !searches.is_empty() {
        let account_id = identity.caller_account_id().await?;
        let context = AccountContext {
            account_id,
            namespace: input.namespace.clone(),
        };
        let resolver = Resolver::new(api, registry, log);
        for criteria in &searches {
            let arn = resolver.resolve(criteria, &context).await?;
            if criteria.is_grantee_search(registry) {
                grantees.push(arn);
            } else {
                resources.push(arn);
            }
        }
    }

    if resources.is_empty() && grantees.is_empty() {
        return Err(Error::NothingToDo);
    }
    debug!(
        log, "starting grants";
        "resources" => resources.len(),
        "grantees" => grantees.len(),
        "jobs" => input.jobs.get(),
    );

    let propagator = Propagator::new(api, registry, log);
    let mut outcomes = Vec::new();
    let mut skipped_resources = Vec::new();
    for resource in &resources {
        let actions = match propagator.best_permission_set(resource).await {
            Ok(actions) => actions,
            Err(error) => {
                warn!(
                    log, "skipping resource";
                    "resource" => resource.to_string(),
                    "error" => ?error,
                );
                skipped_resources.push((resource.clone(), error));
                continue;
            }
        };

        // The permission set is settled; grants for this resource can now
        // go out, several at a time when requested.
        let actions = &actions;
        let propagator = &propagator;
        let batch = stream::iter(grantees.iter())
            .map(|grantee| async move {
                let result =
                    match propagator.grant(resource, actions, grantee).await {
                        Ok(status) if (200..300).contains(&status) => {
                            Ok(status)
                        }
                        Ok(status) => Err(Error::GrantRejected {
                            resource: resource.clone(),
                            grantee: grantee.clone(),
                            status,
                        }),
                        Err(error) => Err(error),
                    };
                GrantOutcome {
                    resource: resource.clone(),
                    grantee: grantee.clone(),
                    result,
                }
            })
            .buffered(input.jobs.get())
            .collect::<Vec<_>>()
            .await;
        outcomes.extend(batch);
    }

    Ok(ExecSummary { outcomes, skipped_resources })
}
