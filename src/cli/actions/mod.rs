pub mod session;
pub mod verify;

// Internal "interpreter" for `Action`, kept apart so this module stays small.
mod run;

#[derive(Debug)]
pub enum Action {
    Session(session::Args),
    Verify(verify::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
