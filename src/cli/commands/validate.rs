use anyhow::Result;

use crate::envelope::OperationId;

pub struct ValidateCommand {
    candidate: String,
}

impl ValidateCommand {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
        }
    }

    /// Prints the verdict; an invalid id is returned as an error so the
    /// process exits non-zero.
    pub fn execute(&self) -> Result<()> {
        match OperationId::parse(&self.candidate) {
            Ok(id) => {
                println!("✅ Valid operation ID: {id}");
                Ok(())
            }
            Err(e) => {
                println!("❌ {e}");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_id_accepted() {
        assert!(ValidateCommand::new("echo-1699999999-abc0123456789def")
            .execute()
            .is_ok());
    }

    #[test]
    fn test_invalid_id_rejected() {
        let err = ValidateCommand::new("echo-123-xyz").execute().unwrap_err();
        assert!(err.to_string().contains("echo-123-xyz"));
    }
}
