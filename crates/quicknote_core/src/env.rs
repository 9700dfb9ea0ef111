//! Process-global environment mutation helpers.
//!
//! Configuration is read from the process environment, so tests that exercise
//! [`crate::config::EditorConfig::from_env`] must serialize their mutations.

use std::ffi::OsString;
use std::sync::{Mutex, OnceLock};

/// Return the global lock used to serialize environment mutations in tests.
///
/// # Returns
/// A process-wide mutex for synchronizing environment mutation.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_env_var(key: &str, value: Option<&OsString>) {
    // SAFETY: callers hold `env_lock` when test threads may run in parallel.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Restores an environment variable to its previous state on drop.
pub struct EnvGuard {
    key: String,
    previous: Option<OsString>,
}

impl EnvGuard {
    fn swap(key: &str, value: Option<OsString>) -> Self {
        let previous = std::env::var_os(key);
        write_env_var(key, value.as_ref());
        Self {
            key: key.to_string(),
            previous,
        }
    }

    /// Set `key=value` until the guard is dropped.
    ///
    /// # Arguments
    /// - `key`: Environment variable name.
    /// - `value`: Value to assign for the lifetime of this guard.
    pub fn set(key: &str, value: &str) -> Self {
        Self::swap(key, Some(OsString::from(value)))
    }

    /// Unset `key` until the guard is dropped.
    pub fn remove(key: &str) -> Self {
        Self::swap(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_env_var(self.key.as_str(), self.previous.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::{env_lock, EnvGuard};

    #[test]
    fn nested_guards_unwind_in_order() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "QUICKNOTE_TEST_ENV_GUARD_NESTED";
        let _outer = EnvGuard::set(key, "outer");
        {
            let _inner = EnvGuard::set(key, "inner");
            assert_eq!(std::env::var(key).ok().as_deref(), Some("inner"));
            {
                let _cleared = EnvGuard::remove(key);
                assert!(std::env::var(key).is_err());
            }
            assert_eq!(std::env::var(key).ok().as_deref(), Some("inner"));
        }
        assert_eq!(std::env::var(key).ok().as_deref(), Some("outer"));
    }

    #[test]
    fn guard_on_missing_key_leaves_it_missing() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "QUICKNOTE_TEST_ENV_GUARD_MISSING";
        {
            let _set = EnvGuard::set(key, "temporary");
        }
        assert!(std::env::var(key).is_err());
    }
}
