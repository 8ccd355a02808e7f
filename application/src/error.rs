//! [`Error`]-related definitions.

use std::{fmt, num::TryFromIntError};

use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::infra::{automation, database};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let mut ext = juniper::Object::with_capacity(1);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        drop(
            ext.add_field(
                "backtrace",
                juniper::Value::list(
                    self.backtrace
                        .iter()
                        .flat_map(|trace| trace.iter())
                        .map(|frame| juniper::Value::scalar(frame.to_string()))
                        .collect(),
                ),
            ),
        );
        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    ///
    /// Unexpected errors are logged and hidden behind a generic message.
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error().unwrap_or_else(|| {
            tracing::error!("unexpected error: {self}");
            Error::internal(&"Internal server error")
        })
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        if cfg!(debug_assertions) {
            error.backtrace = Some(self.trace().clone());
        }
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        if self.is_permission_denied() {
            Some(DbError::PermissionDenied.into())
        } else if self.is_foreign_key_violation(None) {
            Some(DbError::InUse.into())
        } else {
            None
        }
    }
}

impl AsError for automation::Error {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum AutomationError {
                #[code = "AUTOMATION_NOT_CONFIGURED"]
                #[status = SERVICE_UNAVAILABLE]
                #[message = "Automation platform is not configured"]
                NotConfigured,

                #[code = "AUTOMATION_TIMEOUT"]
                #[status = GATEWAY_TIMEOUT]
                #[message = "Automation platform didn't answer in time"]
                Timeout,

                #[code = "AUTOMATION_FAILED"]
                #[status = BAD_GATEWAY]
                #[message = "Automation platform failed"]
                Failed,
            }
        }

        Some(
            match self {
                Self::NotConfigured(_) => AutomationError::NotConfigured,
                Self::Timeout(_) => AutomationError::Timeout,
                Self::Status { .. } | Self::Transport(_) => {
                    AutomationError::Failed
                }
            }
            .into(),
        )
    }
}

impl AsError for TryFromIntError {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

define_error! {
    enum DbError {
        #[code = "PERMISSION_DENIED"]
        #[status = FORBIDDEN]
        #[message = "Database refused the operation, check the row-level \
                     security policies of the connecting role"]
        PermissionDenied,

        #[code = "IN_USE"]
        #[status = CONFLICT]
        #[message = "Entity is referenced by other entities"]
        InUse,
    }
}

#[cfg(test)]
mod spec {
    use super::{AsError as _, DbError, Error};

    #[test]
    fn db_errors_have_codes() {
        let err = Error::from(DbError::InUse);
        assert_eq!(err.code, "IN_USE");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);

        let err = Error::from(DbError::PermissionDenied);
        assert_eq!(err.code, "PERMISSION_DENIED");
        assert!(err.message.contains("row-level security"));
    }

    #[test]
    fn hides_unexpected_errors() {
        let overflow = u8::try_from(300_i32).unwrap_err();
        let err = overflow.as_error();
        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn displays_code_and_message() {
        let err = Error::internal(&"boom");
        assert_eq!(err.to_string(), "[INTERNAL_SERVER_ERROR]: boom");
    }
}
