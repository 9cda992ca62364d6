use std::fmt::Display;

use anyhow::{anyhow, Context, Error};

/// What to do when the service refuses to store a test or a group policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorRecoveryPolicy {
    /// Log the reason and continue with the next item. Used for batch imports.
    Skip,
    /// Ask the operator whether to retry, skip the item or terminate the upload.
    RetryThenAsk,
    /// Stop the upload at the first failure.
    Abort,
}

/// The answer of the operator to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryChoice {
    /// Try again the same request.
    Retry,
    /// Give up on this item and continue with the next one.
    Skip,
    /// Stop everything, re-raising the failure.
    Terminate,
}

/// Asks the operator how to recover from a failure.
pub trait RecoveryPrompt {
    /// Show the reason of the failure and wait for a choice.
    fn ask(&mut self, reason: &str) -> Result<RecoveryChoice, Error>;
}

/// Line-mode prompt on the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl RecoveryChoice {
    /// Parse the answer typed by the operator: `r`, `s` or `t`, in any case.
    pub fn from_answer(answer: &str) -> Option<RecoveryChoice> {
        match answer.trim().to_lowercase().as_str() {
            "r" => Some(RecoveryChoice::Retry),
            "s" => Some(RecoveryChoice::Skip),
            "t" => Some(RecoveryChoice::Terminate),
            _ => None,
        }
    }
}

impl RecoveryPrompt for ConsolePrompt {
    fn ask(&mut self, reason: &str) -> Result<RecoveryChoice, Error> {
        let answer: String = dialoguer::Input::new()
            .with_prompt(format!("{} Retry, Skip or Terminate (r/s/t)", reason))
            .validate_with(|answer: &String| -> Result<(), &str> {
                match RecoveryChoice::from_answer(answer) {
                    Some(_) => Ok(()),
                    None => Err("Please answer r, s or t"),
                }
            })
            .interact_text()
            .context("Failed to read the answer of the operator")?;
        RecoveryChoice::from_answer(&answer).ok_or_else(|| anyhow!("Invalid answer {:?}", answer))
    }
}

/// Keep going when a side upload (a statement, a solution, a file) fails: the failure is logged
/// with its reason and `None` is returned.
pub fn skip_on_error<T, E: Display>(what: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: API Error: {:#}", what, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_answer() {
        assert_eq!(RecoveryChoice::from_answer("r"), Some(RecoveryChoice::Retry));
        assert_eq!(RecoveryChoice::from_answer(" S\n"), Some(RecoveryChoice::Skip));
        assert_eq!(RecoveryChoice::from_answer("T"), Some(RecoveryChoice::Terminate));
        assert_eq!(RecoveryChoice::from_answer("retry"), None);
        assert_eq!(RecoveryChoice::from_answer(""), None);
    }

    #[test]
    fn test_skip_on_error() {
        assert_eq!(skip_on_error("ok", Ok::<_, String>(3)), Some(3));
        assert_eq!(skip_on_error("ko", Err::<u32, _>("boom")), None);
    }
}
