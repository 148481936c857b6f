//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, HookError, HostError, JsonError, ScriptError};

/// Every error condition a Colloquy operation can surface.
///
/// # Examples
///
/// ```
/// use colloquy_error::{ColloquyError, ScriptError, ScriptErrorKind};
///
/// let script_err = ScriptError::new(ScriptErrorKind::UnknownThread("faq".to_string()));
/// let err: ColloquyError = script_err.into();
/// assert!(format!("{}", err).contains("faq"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ColloquyErrorKind {
    /// Scripting mistake detected while building or running a script
    #[from(ScriptError)]
    Script(ScriptError),
    /// A developer-registered hook or branch handler failed
    #[from(HookError)]
    Hook(HookError),
    /// The host turn-delivery framework rejected a request
    #[from(HostError)]
    Host(HostError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
}

/// Colloquy error with kind discrimination.
///
/// # Examples
///
/// ```
/// use colloquy_error::{ColloquyResult, ConfigError};
///
/// fn might_fail() -> ColloquyResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Colloquy Error: {}", _0)]
pub struct ColloquyError(Box<ColloquyErrorKind>);

impl ColloquyError {
    /// Create a new error from a kind.
    pub fn new(kind: ColloquyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ColloquyErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ColloquyErrorKind
impl<T> From<T> for ColloquyError
where
    T: Into<ColloquyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Colloquy operations.
pub type ColloquyResult<T> = std::result::Result<T, ColloquyError>;
