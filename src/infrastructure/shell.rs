//! `bash -n -c` dry-run wrapper implementing [`ShellValidator`] (C5, §6).
//! New code in the teacher's subprocess-wrapping idiom; no teacher file
//! wraps `bash` directly, so this follows the `tokio::process::Command`
//! usage seen throughout `application/*` and `services/git_stats.rs`.

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::error::SemanticError;
use crate::domain::ports::ShellValidator;

/// Syntax-checks shell commands via `bash -n -c`, never executing them.
pub struct BashDryRunValidator;

#[async_trait]
impl ShellValidator for BashDryRunValidator {
    async fn check_syntax(&self, command: &str) -> Result<(), SemanticError> {
        let output = Command::new("bash")
            .arg("-n")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|_| SemanticError::ShellUnavailable)?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let first_line = stderr.lines().next().unwrap_or("unknown shell syntax error");
        Err(SemanticError::InvalidShellSyntax(first_line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn valid_command_passes() {
        let validator = BashDryRunValidator;
        let result = validator.check_syntax("echo hello").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unbalanced_quote_is_invalid() {
        let validator = BashDryRunValidator;
        let result = validator.check_syntax("echo \"unterminated").await;
        assert!(matches!(result, Err(SemanticError::InvalidShellSyntax(_))));
    }

    #[tokio::test]
    async fn unbalanced_paren_is_invalid() {
        let validator = BashDryRunValidator;
        let result = validator.check_syntax("if [ -f x ]; then echo hi").await;
        assert!(matches!(result, Err(SemanticError::InvalidShellSyntax(_))));
    }
}
