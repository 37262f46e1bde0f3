use anyhow::{anyhow, Result};

/// Signing secrets must be set and long enough to be worth signing with.
pub fn validate_secret(name: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{name} must be set"));
    }
    if trimmed.len() < 16 {
        return Err(anyhow!("{name} must be at least 16 characters"));
    }
    Ok(())
}
