//! Environment loading
//!
//! `.env` in the current directory is read before argument parsing so
//! `PORT`, `DATABASE_URL` and `SECRET` there feed clap's `env` fallbacks.
//! Variables already set in the process environment win.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Load `./.env` if present. Returns the file that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            // Tracing is not up yet; report on stderr
            eprintln!("warning: failed to parse .env: {}", e);
            None
        }
    }
}

/// Log where configuration came from (call after tracing is initialized).
pub fn report_dotenv(loaded: Option<&Path>) {
    match loaded {
        Some(path) => tracing::info!("Loaded configuration from {}", path.display()),
        None => debug!("No .env file found, using environment variables only"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_does_not_panic_without_subscriber() {
        report_dotenv(None);
        report_dotenv(Some(Path::new(".env")));
    }
}
