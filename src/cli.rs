//! Headless commands: validate or submit a JSON file of form values.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::submit::{Ack, Submitter};
use crate::wizard::{FormValues, ValidationFailure, WizardSession};

/// Read a JSON object of field values
pub fn read_values(file: &Path) -> Result<FormValues> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON object of field values", file.display()))
}

/// Fresh session holding the file's values
pub fn load_session(file: &Path) -> Result<WizardSession> {
    let mut session = WizardSession::default();
    session
        .load(read_values(file)?)
        .with_context(|| format!("Invalid values in {}", file.display()))?;
    Ok(session)
}

fn write_failures(
    out: &mut impl Write,
    session: &WizardSession,
    failure: &ValidationFailure,
) -> Result<()> {
    let schema = session.wizard().schema();
    for error in &failure.failures {
        let step = schema.step_of(&error.field).unwrap_or(0);
        writeln!(out, "  step {} {}: {}", step, error.field, error.message)?;
    }
    Ok(())
}

/// Validate every step. Errors are listed on `out` and the command fails.
pub fn run_check(file: &Path, out: &mut impl Write) -> Result<()> {
    let session = load_session(file)?;

    match session.wizard().validate_all(session.state().clone()) {
        Ok(_) => {
            writeln!(out, "All {} steps valid", session.wizard().step_count())?;
            Ok(())
        }
        Err(failure) => {
            writeln!(out, "Validation failed:")?;
            write_failures(out, &session, &failure)?;
            bail!("{} field(s) failed validation", failure.failures.len())
        }
    }
}

/// Advance through the steps in order, stopping at the first invalid one
pub fn walk_to_final_step(session: &mut WizardSession, out: &mut impl Write) -> Result<()> {
    while !session.wizard().is_final_step(session.state()) {
        if let Err(failure) = session.advance() {
            writeln!(out, "Step {} is invalid:", session.step())?;
            write_failures(out, session, &failure)?;
            bail!("Cannot submit an invalid form");
        }
    }
    Ok(())
}

/// Walk the file's values through the wizard and submit them
pub async fn run_submit(
    file: &Path,
    submitter: &dyn Submitter,
    out: &mut impl Write,
) -> Result<Ack> {
    let mut session = load_session(file)?;
    walk_to_final_step(&mut session, out)?;

    match session.submit(submitter).await {
        Ok(ack) => {
            writeln!(out, "{}", ack.message)?;
            Ok(ack)
        }
        Err(e) => {
            if let Some(banner) = session.banner() {
                writeln!(out, "{}", banner.text())?;
            }
            Err(e).context("Submission failed")
        }
    }
}
