use anyhow::{anyhow, Result};
use std::path::Path;
use uuid::Uuid;

/// Validation utilities for user-supplied request parameters
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a calendar display name
    pub fn validate_calendar_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Calendar name cannot be empty"));
        }

        if name.chars().count() > 100 {
            return Err(anyhow!("Calendar name too long (max 100 characters)"));
        }

        if name.chars().any(char::is_control) {
            return Err(anyhow!("Calendar name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate an IANA timezone name
    pub fn validate_timezone(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Timezone cannot be empty"));
        }

        name.trim()
            .parse::<chrono_tz::Tz>()
            .map(|_| ())
            .map_err(|_| anyhow!("Unknown timezone: {name}"))
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(anyhow!("Email cannot be empty"));
        }

        if email.len() > 254 {
            return Err(anyhow!("Email too long (max 254 characters)"));
        }

        let Some((local_part, domain_part)) = email.split_once('@') else {
            return Err(anyhow!("Email must contain @ symbol"));
        };

        if domain_part.contains('@') {
            return Err(anyhow!("Email must have exactly one @ symbol"));
        }

        if local_part.is_empty() || local_part.len() > 64 {
            return Err(anyhow!("Email local part invalid"));
        }

        if domain_part.is_empty() || !domain_part.contains('.') {
            return Err(anyhow!("Email domain invalid"));
        }

        Ok(())
    }

    /// Validate an output file path
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.is_empty() {
            return Err(anyhow!("File path cannot be empty"));
        }

        // Reject traversal
        if path_str.contains("..") || path_str.contains('~') {
            return Err(anyhow!(
                "File path contains potentially dangerous characters"
            ));
        }

        if path_str.len() > 4096 {
            return Err(anyhow!("File path too long (max 4096 characters)"));
        }

        Ok(())
    }

    /// Validate a stored-schedule job id
    pub fn validate_job_id(job_id: &str) -> Result<()> {
        Uuid::parse_str(job_id.trim())
            .map(|_| ())
            .map_err(|_| anyhow!("Invalid job id: {job_id}"))
    }

    /// Strip control characters and surrounding whitespace
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control())
            .collect::<String>()
            .trim()
            .to_string()
    }
}
