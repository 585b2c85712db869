//! Error types for advisory-rail with contextual messages and exit codes
//!
//! Every remote failure is classified by the service that produced it so the
//! top-level command can tell a build-system outage from an advisory service
//! permission problem. Errors propagate unmodified up to `main`, which is the
//! only place that prints them.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for advisory-rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// Remote or system error (network, authentication, I/O)
  System = 2,
  /// At least one build could not be attached
  PartialFailure = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// The remote collaborator an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
  BuildSystem,
  Advisory,
}

impl fmt::Display for Service {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Service::BuildSystem => write!(f, "build system"),
      Service::Advisory => write!(f, "advisory service"),
    }
  }
}

/// Main error type for advisory-rail
#[derive(Debug)]
pub enum RailError {
  /// Configuration errors
  Config(ConfigError),

  /// Build system or advisory service errors
  Remote(RemoteError),

  /// Some builds were attached, some were not
  AttachmentPartialFailure { advisory: u64, attached: usize, failed: usize },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },

  /// Any other error plus a line saying where it happened
  Contextual { context: String, source: Box<RailError> },
}

impl RailError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// The category (and so the exit code and help) of the wrapped error is kept.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RailError::Message { message, context, help } => RailError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RailError::Contextual { context, source } => RailError::Contextual {
        context: format!("{}\n{}", ctx_str, context),
        source,
      },
      other => RailError::Contextual {
        context: ctx_str,
        source: Box::new(other),
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RailError::Config(_) => ExitCode::User,
      RailError::Remote(_) => ExitCode::System,
      RailError::AttachmentPartialFailure { .. } => ExitCode::PartialFailure,
      RailError::Io(_) => ExitCode::System,
      RailError::Message { .. } => ExitCode::User,
      RailError::Contextual { source, .. } => source.exit_code(),
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RailError::Config(e) => e.help_message(),
      RailError::Remote(e) => e.help_message(),
      RailError::AttachmentPartialFailure { .. } => {
        Some("Fix the failed builds listed above and re-run with the same --attach target.".to_string())
      }
      RailError::Message { help, .. } => help.clone(),
      RailError::Contextual { source, .. } => source.help_message(),
      _ => None,
    }
  }

  /// Whether a retry of the same request could succeed
  pub fn is_retryable(&self) -> bool {
    match self {
      RailError::Remote(e) => e.is_retryable(),
      RailError::Contextual { source, .. } => source.is_retryable(),
      _ => false,
    }
  }
}

impl fmt::Display for RailError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RailError::Config(e) => write!(f, "{}", e),
      RailError::Remote(e) => write!(f, "{}", e),
      RailError::AttachmentPartialFailure {
        advisory,
        attached,
        failed,
      } => write!(
        f,
        "{} build(s) failed to attach to advisory {} ({} attached)",
        failed, advisory, attached
      ),
      RailError::Io(e) => write!(f, "I/O error: {}", e),
      RailError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
      RailError::Contextual { context, source } => write!(f, "{}\n{}", source, context),
    }
  }
}

impl std::error::Error for RailError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RailError::Io(e) => Some(e),
      RailError::Contextual { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for RailError {
  fn from(err: io::Error) -> Self {
    RailError::Io(err)
  }
}

impl From<String> for RailError {
  fn from(msg: String) -> Self {
    RailError::message(msg)
  }
}

impl From<&str> for RailError {
  fn from(msg: &str) -> Self {
    RailError::message(msg)
  }
}

impl From<RemoteError> for RailError {
  fn from(err: RemoteError) -> Self {
    RailError::Remote(err)
  }
}

impl From<ConfigError> for RailError {
  fn from(err: ConfigError) -> Self {
    RailError::Config(err)
  }
}

impl From<toml_edit::de::Error> for RailError {
  fn from(err: toml_edit::de::Error) -> Self {
    RailError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for RailError {
  fn from(err: serde_json::Error) -> Self {
    RailError::message(format!("JSON error: {}", err))
  }
}

impl From<regex::Error> for RailError {
  fn from(err: regex::Error) -> Self {
    RailError::message(format!("Regex error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// advisory-rail.toml not found
  NotFound { searched_from: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Field present but unusable
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Create advisory-rail.toml with [group] and [services] sections, or pass --config <PATH>.".to_string())
      }
      ConfigError::MissingField { field } => Some(format!("Add `{}` to advisory-rail.toml.", field)),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { searched_from } => {
        write!(
          f,
          "No advisory-rail configuration found.\nExpected file: {}/advisory-rail.toml",
          searched_from.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid value for {}: {}", field, reason)
      }
    }
  }
}

/// Errors reported by (or while talking to) a remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
  /// 401: credentials missing or rejected
  Authentication { service: Service },

  /// 403: authenticated, but not allowed to do this
  Authorization { service: Service, detail: String },

  /// 404 for a specific resource (build, advisory, tag)
  NotFound { service: Service, resource: String },

  /// Transport failure or an unexpected response
  Unavailable {
    service: Service,
    status: Option<u16>,
    reason: String,
  },
}

impl RemoteError {
  /// Service the error originated from
  pub fn service(&self) -> Service {
    match self {
      RemoteError::Authentication { service }
      | RemoteError::Authorization { service, .. }
      | RemoteError::NotFound { service, .. }
      | RemoteError::Unavailable { service, .. } => *service,
    }
  }

  /// Transport errors and 5xx responses may succeed on retry; nothing else does
  pub fn is_retryable(&self) -> bool {
    match self {
      RemoteError::Unavailable { status, .. } => status.is_none_or(|code| code >= 500),
      _ => false,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      RemoteError::Authentication { .. } => Some(
        "The service did not accept your credentials. Export a valid token in the variable named by \
         services.token_env (default ADVISORY_RAIL_TOKEN)."
          .to_string(),
      ),
      RemoteError::Authorization { .. } => {
        Some("You are authenticated but lack permission for this action. Ask the advisory owners for access.".to_string())
      }
      RemoteError::NotFound { .. } => None,
      RemoteError::Unavailable { status: None, .. } => {
        Some("Check the service URLs in advisory-rail.toml and your network connection.".to_string())
      }
      RemoteError::Unavailable { .. } => None,
    }
  }
}

impl fmt::Display for RemoteError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemoteError::Authentication { service } => {
        write!(f, "401 - not authenticated with the {}", service)
      }
      RemoteError::Authorization { service, detail } => {
        write!(f, "403 - not authorized by the {}: {}", service, detail)
      }
      RemoteError::NotFound { service, resource } => {
        write!(f, "Not found in the {}: {}", service, resource)
      }
      RemoteError::Unavailable {
        service,
        status: Some(code),
        reason,
      } => write!(f, "Unexpected response from the {} ({}): {}", service, code, reason),
      RemoteError::Unavailable {
        service,
        status: None,
        reason,
      } => write!(f, "Could not reach the {}: {}", service, reason),
    }
  }
}

/// Result type alias for advisory-rail
pub type RailResult<T> = Result<T, RailError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RailError>,
{
  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RailError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
