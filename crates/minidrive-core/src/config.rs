//! Configuration module
//!
//! Configuration is read from the environment (after loading `.env` via dotenvy).

use std::env;

const DATABASE_URL: &str = "sqlite://minidrive.sqlite3";
const DB_BUSY_TIMEOUT_SECS: u64 = 5;
const MAX_FILE_SIZE_MB: u64 = 100;
const ARCHIVE_NAME: &str = "minidrive_files.zip";

/// MiniDrive configuration
#[derive(Clone, Debug)]
pub struct DriveConfig {
    pub database_url: String,
    pub db_busy_timeout_seconds: u64,
    pub max_file_size_bytes: u64,
    pub archive_name: String,
    pub environment: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            database_url: DATABASE_URL.to_string(),
            db_busy_timeout_seconds: DB_BUSY_TIMEOUT_SECS,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            archive_name: ARCHIVE_NAME.to_string(),
            environment: "development".to_string(),
        }
    }
}

impl DriveConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_file_size_mb = env_number("MINIDRIVE_MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB)?;

        let config = DriveConfig {
            database_url: env::var("MINIDRIVE_DATABASE_URL")
                .unwrap_or_else(|_| DATABASE_URL.to_string()),
            db_busy_timeout_seconds: env_number(
                "MINIDRIVE_DB_BUSY_TIMEOUT_SECONDS",
                DB_BUSY_TIMEOUT_SECS,
            )?,
            max_file_size_bytes: megabytes_to_bytes(max_file_size_mb)?,
            archive_name: env::var("MINIDRIVE_ARCHIVE_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| ARCHIVE_NAME.to_string()),
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "MINIDRIVE_DATABASE_URL must be a valid SQLite connection string"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MINIDRIVE_MAX_FILE_SIZE_MB must be greater than zero"
            ));
        }

        if !self.archive_name.to_lowercase().ends_with(".zip") {
            return Err(anyhow::anyhow!(
                "MINIDRIVE_ARCHIVE_NAME must end with .zip"
            ));
        }

        Ok(())
    }
}

/// Unset falls back to `default`; a set but unparsable value is an error.
fn env_number(var: &str, default: u64) -> Result<u64, anyhow::Error> {
    match env::var(var) {
        Ok(value) => parse_number(var, &value),
        Err(_) => Ok(default),
    }
}

fn parse_number(var: &str, value: &str) -> Result<u64, anyhow::Error> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("{} must be a valid number", var))
}

fn megabytes_to_bytes(megabytes: u64) -> Result<u64, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MINIDRIVE_MAX_FILE_SIZE_MB is too large"))
}
