// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facilities used by the command-line tools

/// Represents a fatal error in a command-line program
#[derive(Debug)]
pub enum CmdError {
    /// incorrect command-line arguments
    Usage(String),
    /// all other errors
    Failure(anyhow::Error),
}

/// Exits the current process on a fatal error
///
/// Usage errors exit with status 2, everything else with status 1.  The
/// message is prefixed with the program's name.
pub fn fatal(cmd_error: CmdError) -> ! {
    let arg0 =
        std::env::args().next().unwrap_or_else(|| String::from("command"));
    let arg0 = arg0.rsplit('/').next().unwrap_or(&arg0);
    let (exit_code, message) = match cmd_error {
        CmdError::Usage(m) => (2, m),
        CmdError::Failure(e) => (1, format!("{:#}", e)),
    };
    eprintln!("{}: {}", arg0, message);
    std::process::exit(exit_code);
}
