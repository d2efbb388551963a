//! User confirmation.
//!
//! Destructive tasks take a [`Confirm`] so they can be driven by the terminal
//! prompt, by `--yes`, or by a test double.

use anyhow::Result;

/// Asks the user to confirm an action.
pub trait Confirm {
    /// `true` if the user confirmed
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Interactive terminal prompt, defaulting to "no".
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}

/// Always confirms (`--yes`).
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        log::info!("{prompt} yes (--yes)");
        Ok(true)
    }
}

/// Always declines.
#[cfg(test)]
pub struct AutoDecline;

#[cfg(test)]
impl Confirm for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Pick the confirmation source for a task.
pub fn confirmer(assume_yes: bool) -> Box<dyn Confirm> {
    if assume_yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalConfirm)
    }
}
