//! Interactive registry password entry.

use dialoguer::Password;
use regdef_core::{PasswordPrompt, RegdefError, RegdefResult};

/// Reads the password from the terminal without echo.
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn prompt_password(&self, username: &str, registry: &str) -> RegdefResult<String> {
        Password::new()
            .with_prompt(format!(
                "Password for user {username} on container registry '{registry}'"
            ))
            .interact()
            .map_err(|e| RegdefError::CredentialPrompt {
                message: e.to_string(),
            })
    }
}
