//! Global initialization utilities for the application

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the application environment
///
/// Loads environment variables from a `.env` file if one exists in the
/// current directory or any parent. Safe to call multiple times - will only
/// run once.
pub fn initialize_environment() {
    INIT.call_once(|| {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_environment_is_idempotent() {
        initialize_environment();
        initialize_environment();
        assert!(INIT.is_completed());
    }
}
