use crate::cli::actions::{Action, session, verify};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Session(args) => session::execute(args).await,
        Action::Verify(args) => verify::execute(args).await,
    }
}
