//! CLI subcommands.

pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Read the database URL from `BOZOR_DATABASE_URL`, falling back to
/// `DATABASE_URL`. Loads `.env` first.
///
/// # Errors
///
/// Returns the name of the primary variable if neither is set.
pub fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    std::env::var("BOZOR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "BOZOR_DATABASE_URL")
}
