//! Invocation of external clipboard tools.

use crate::{Error, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Returns true if `program` is on `PATH`.
#[must_use]
pub fn is_available(program: &str) -> bool {
    which::which(program).is_ok()
}

fn describe(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

/// Runs `program` and returns its stdout.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the program cannot be spawned or
/// exits non-zero.
pub fn run_output(program: &str, args: &[&str]) -> Result<Vec<u8>> {
    let command = describe(program, args);
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| Error::failed(&command, e))?;

    if !output.status.success() {
        return Err(Error::failed(&command, output.status));
    }
    Ok(output.stdout)
}

/// Runs `program` and returns its stdout as UTF-8 text.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the program fails or its output is
/// not valid UTF-8.
pub fn run_text(program: &str, args: &[&str]) -> Result<String> {
    let bytes = run_output(program, args)?;
    String::from_utf8(bytes).map_err(|e| Error::failed(&describe(program, args), e))
}

/// Runs `program` with `input` on its stdin and waits for it to exit.
///
/// Clipboard owners (`wl-copy`, `xclip -i`) fork a server process and return;
/// their output streams are discarded so the forked child cannot hold our
/// pipes open.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the program cannot be spawned,
/// rejects the input, or exits non-zero.
pub fn run_with_input(program: &str, args: &[&str], input: &[u8]) -> Result<()> {
    let command = describe(program, args);
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::failed(&command, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input)
            .map_err(|e| Error::failed(&command, e))?;
    }

    let status = child.wait().map_err(|e| Error::failed(&command, e))?;
    if !status.success() {
        return Err(Error::failed(&command, status));
    }
    Ok(())
}
