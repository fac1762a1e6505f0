use anyhow::Result;

use crate::envelope::OperationId;

pub struct NewIdCommand;

impl NewIdCommand {
    /// Prints a bare id so the output can be captured by scripts.
    pub fn execute(&self) -> Result<()> {
        println!("{}", OperationId::generate());
        Ok(())
    }
}
