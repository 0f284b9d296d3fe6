//! Secrets configuration loaded from environment variables only.
//!
//! Sensitive values like API keys are never read from the settings file.

use std::env;

/// Secrets loaded exclusively from environment variables.
///
/// Whether a given secret is required depends on the configured provider;
/// that cross-check happens in `Config::load`.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// Also loads a .env file if present (development convenience);
    /// production should rely on actual environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env_inner()
    }

    /// Load from the environment without touching .env files.
    pub(crate) fn from_env_inner() -> Self {
        Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that modify environment variables must not run concurrently.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_secrets_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { env::set_var("OPENAI_API_KEY", "sk-test") }

        let secrets = Secrets::from_env_inner();
        assert_eq!(secrets.openai_api_key, Some("sk-test".to_string()));

        unsafe { env::remove_var("OPENAI_API_KEY") }
    }

    #[test]
    fn test_secrets_missing_is_none() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { env::remove_var("OPENAI_API_KEY") }

        let secrets = Secrets::from_env_inner();
        assert!(secrets.openai_api_key.is_none());
    }

    #[test]
    fn test_secrets_empty_value_is_none() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { env::set_var("OPENAI_API_KEY", "") }

        let secrets = Secrets::from_env_inner();
        assert!(secrets.openai_api_key.is_none());

        unsafe { env::remove_var("OPENAI_API_KEY") }
    }
}
