//! Session configuration parsing and validation.
//!
//! Centralises the environment-driven session settings so release builds
//! fail fast on missing or unsafe toggles while debug builds fall back to
//! workable defaults.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and warn about missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Session settings derived from configuration toggles.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Configured `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file exists but is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie setting in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
}

/// Build session settings from an environment lookup and build mode.
///
/// The lookup is injected so tests can drive the parser without touching
/// process-wide environment variables.
pub fn session_settings<E>(env: E, mode: BuildMode) -> Result<SessionSettings, SessionConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let cookie_secure = cookie_secure_from(&env, mode)?;
    let same_site = same_site_from(&env, mode, cookie_secure)?;
    let key = session_key_from(&env, mode)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Build session settings from the process environment.
pub fn session_settings_from_env(mode: BuildMode) -> Result<SessionSettings, SessionConfigError> {
    session_settings(|name| std::env::var(name).ok(), mode)
}

fn cookie_secure_from<E>(env: &E, mode: BuildMode) -> Result<bool, SessionConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    match env(COOKIE_SECURE_ENV) {
        Some(value) => match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => {
                if mode.is_debug() {
                    warn!(value = %value, "invalid SESSION_COOKIE_SECURE; defaulting to secure");
                    Ok(true)
                } else {
                    Err(SessionConfigError::InvalidEnv {
                        name: COOKIE_SECURE_ENV,
                        value,
                        expected: BOOL_EXPECTED,
                    })
                }
            }
        },
        None => {
            if mode.is_debug() {
                warn!("SESSION_COOKIE_SECURE not set; defaulting to secure");
                Ok(true)
            } else {
                Err(SessionConfigError::MissingEnv {
                    name: COOKIE_SECURE_ENV,
                })
            }
        }
    }
}

fn same_site_from<E>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let value = match env(SAMESITE_ENV) {
        Some(value) => value,
        None => {
            if mode.is_debug() {
                warn!("SESSION_SAMESITE not set; using default");
                return Ok(default_same_site);
            }
            return Err(SessionConfigError::MissingEnv { name: SAMESITE_ENV });
        }
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => {
            if !cookie_secure {
                if mode.is_debug() {
                    warn!("SESSION_SAMESITE=None with an insecure cookie; browsers may reject it");
                } else {
                    return Err(SessionConfigError::InsecureSameSiteNone);
                }
            }
            Ok(SameSite::None)
        }
        _ => {
            if mode.is_debug() {
                warn!(value = %value, "invalid SESSION_SAMESITE, using default");
                Ok(default_same_site)
            } else {
                Err(SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                })
            }
        }
    }
}

fn session_key_from<E>(env: &E, mode: BuildMode) -> Result<Key, SessionConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let key_path = env(KEY_FILE_ENV).unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_string());
    let path = PathBuf::from(key_path);

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) => {
            if mode.is_debug() {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn expect_error(
        result: Result<SessionSettings, SessionConfigError>,
        label: &str,
    ) -> SessionConfigError {
        match result {
            Ok(_) => panic!("expected {label} error"),
            Err(err) => err,
        }
    }

    #[rstest]
    fn debug_builds_default_to_secure_lax_and_an_ephemeral_key() {
        let settings = session_settings(env_of(&[]), BuildMode::Debug).expect("settings");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    fn release_builds_require_every_toggle() {
        let err = expect_error(session_settings(env_of(&[]), BuildMode::Release), "missing env");
        assert!(matches!(err, SessionConfigError::MissingEnv { .. }));
    }

    #[rstest]
    fn samesite_none_needs_a_secure_cookie_in_release() {
        let env = env_of(&[
            ("SESSION_COOKIE_SECURE", "0"),
            ("SESSION_SAMESITE", "None"),
        ]);
        let err = expect_error(session_settings(env, BuildMode::Release), "insecure none");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn a_short_key_file_fails_release_validation() {
        let key_path = std::env::temp_dir().join("shop_session_key_short");
        std::fs::write(&key_path, b"short").expect("write key");
        let path = key_path.to_str().expect("utf8 path").to_owned();
        let env = env_of(&[
            ("SESSION_COOKIE_SECURE", "1"),
            ("SESSION_SAMESITE", "Strict"),
            ("SESSION_KEY_FILE", &path),
        ]);

        let err = expect_error(session_settings(env, BuildMode::Release), "short key");
        assert!(matches!(err, SessionConfigError::KeyTooShort { .. }));
        std::fs::remove_file(&key_path).expect("cleanup");
    }

    #[rstest]
    fn a_long_enough_key_file_passes_release_validation() {
        let key_path = std::env::temp_dir().join("shop_session_key_long");
        std::fs::write(&key_path, vec![b'k'; 64]).expect("write key");
        let path = key_path.to_str().expect("utf8 path").to_owned();
        let env = env_of(&[
            ("SESSION_COOKIE_SECURE", "1"),
            ("SESSION_SAMESITE", "Strict"),
            ("SESSION_KEY_FILE", &path),
        ]);

        let settings = session_settings(env, BuildMode::Release).expect("settings");
        assert_eq!(settings.same_site, SameSite::Strict);
        std::fs::remove_file(&key_path).expect("cleanup");
    }
}
