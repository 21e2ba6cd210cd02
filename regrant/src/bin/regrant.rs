// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line tool to propagate resource permissions to new grantees.

use anyhow::Context;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Args;
use clap::Command;
use clap::FromArgMatches;
use clap::Parser;
use quicksight_client::Client;
use quicksight_client::IdentityClient;
use regrant::exec;
use regrant::exec::ExecInput;
use regrant::Error;
use regrant_common::cmd::fatal;
use regrant_common::cmd::CmdError;
use regrant_common::logging::ConfigLogging;
use regrant_common::logging::ConfigLoggingIfExists;
use regrant_common::logging::ConfigLoggingLevel;
use regrant_common::CapabilityRegistry;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Grant the permissions already held on resources to new grantees.
#[derive(Debug, Parser)]
#[command(name = "regrant", about = "See README.adoc for more information")]
struct Regrant {
    /// identifiers of resources whose permissions are propagated
    #[arg(long, value_name = "ARN", num_args = 1..)]
    resources: Vec<String>,

    /// identifiers of grantees that receive the permissions
    #[arg(long, value_name = "ARN", num_args = 1..)]
    grantees: Vec<String>,

    #[command(flatten)]
    search: SearchArgs,

    /// base URL of the analytics service
    #[arg(
        long,
        env = "REGRANT_API_URL",
        default_value = "https://quicksight.us-east-1.amazonaws.com"
    )]
    api_url: String,

    /// base URL of the caller-identity service
    #[arg(
        long,
        env = "REGRANT_IDENTITY_URL",
        default_value = "https://sts.amazonaws.com"
    )]
    identity_url: String,

    /// namespace passed to listings that accept one
    #[arg(long, default_value = "default")]
    namespace: String,

    /// how many grant calls may be in flight for one resource
    #[arg(long, default_value = "1", value_name = "N")]
    jobs: NonZeroUsize,

    /// minimum severity to log
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    log_level: ConfigLoggingLevel,

    /// log to this file (appending if it exists) instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// The `--search` argument, assembled by hand.  Each occurrence takes
/// several KEY=VALUE tokens and the occurrences must stay separate,
/// which a derived `Vec` field would flatten away.
#[derive(Debug)]
struct SearchArgs {
    /// the raw tokens of each `--search` occurrence
    occurrences: Vec<Vec<String>>,
}

impl FromArgMatches for SearchArgs {
    fn from_arg_matches(
        matches: &ArgMatches,
    ) -> Result<SearchArgs, clap::Error> {
        let occurrences = match matches.get_occurrences::<String>("search") {
            Some(occurrences) => occurrences
                .map(|tokens| tokens.cloned().collect())
                .collect(),
            None => Vec::new(),
        };
        Ok(SearchArgs { occurrences })
    }

    fn update_from_arg_matches(
        &mut self,
        matches: &ArgMatches,
    ) -> Result<(), clap::Error> {
        *self = SearchArgs::from_arg_matches(matches)?;
        Ok(())
    }
}

impl Args for SearchArgs {
    fn augment_args(command: Command) -> Command {
        command.arg(
            Arg::new("search")
                .long("search")
                .value_name("KEY=VALUE")
                .num_args(1..)
                .action(ArgAction::Append)
                .help(
                    "locate one resource or grantee by attribute \
                     equality; each occurrence takes KEY=VALUE tokens \
                     and must include \"service=\" and \"type=\" plus \
                     at least one attribute",
                ),
        )
    }

    fn augment_args_for_update(command: Command) -> Command {
        SearchArgs::augment_args(command)
    }
}

#[tokio::main]
async fn main() {
    if let Err(cmd_error) = do_run().await {
        fatal(cmd_error);
    }
}

async fn do_run() -> Result<(), CmdError> {
    let args = Regrant::parse();

    let registry = CapabilityRegistry::builtin();
    registry.validate().map_err(CmdError::Failure)?;

    let config = match &args.log_file {
        Some(path) => ConfigLogging::File {
            level: args.log_level,
            path: path.clone(),
            if_exists: ConfigLoggingIfExists::Append,
        },
        None => ConfigLogging::StderrTerminal { level: args.log_level },
    };
    let log = config
        .to_logger("regrant")
        .context("initializing logger")
        .map_err(CmdError::Failure)?;

    let api = Client::new(&args.api_url, &log);
    let identity = IdentityClient::new(&args.identity_url, &log);
    let input = ExecInput {
        resources: args.resources,
        grantees: args.grantees,
        searches: args.search.occurrences,
        namespace: args.namespace,
        jobs: args.jobs,
    };

    let summary = exec::execute(&api, &identity, registry, &input, &log)
        .await
        .map_err(|error| match error {
            Error::InvalidCriteria(_) => CmdError::Usage(error.to_string()),
            _ => CmdError::Failure(anyhow::Error::new(error)),
        })?;

    // Grant failures were already counted into the summary; they land on
    // stderr without changing the exit status, so a long run is never
    // stopped short by one declined pair.
    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(_) => {
                println!(
                    "{}: granted to {}",
                    outcome.resource, outcome.grantee
                );
            }
            Err(error @ Error::GrantRejected { .. }) => {
                eprintln!("error: {}", error);
            }
            Err(error) => {
                eprintln!(
                    "error: grant to {} on {} failed: {}",
                    outcome.grantee, outcome.resource, error
                );
            }
        }
    }
    for (resource, error) in &summary.skipped_resources {
        eprintln!("error: skipped {}: {}", resource, error);
    }
    println!(
        "{} grants applied, {} failures",
        summary.accepted(),
        summary.failed()
    );
    Ok(())
}
