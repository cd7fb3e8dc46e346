//! Exit codes for the `guesser` CLI.
//!
//! Exit codes communicate operation outcome without requiring output
//! parsing.
//!
//! Exit code ranges:
//! - 0: success
//! - 10: invalid argument (CLI flags, training/query input out of alphabet,
//!   non-positive gram size, threshold misconfiguration)
//! - 11: I/O error reading training data or writing output
//! - 20: internal/sanity error (a sanity check failed or a bug was hit)

/// Exit codes for `guesser` invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Ok = 0,

    /// Invalid CLI arguments or model input.
    ArgsError = 10,

    /// I/O error reading training data or writing output.
    IoError = 11,

    /// Internal error: a sanity check failed or a bug was hit.
    InternalError = 20,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Ok)
    }

    pub fn is_user_error(self) -> bool {
        matches!(self, ExitCode::ArgsError)
    }

    pub fn is_internal_error(self) -> bool {
        matches!(self, ExitCode::InternalError)
    }

    pub fn is_error(self) -> bool {
        !self.is_success()
    }

    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::IoError => "ERR_IO",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

impl From<&pg_common::Error> for ExitCode {
    fn from(err: &pg_common::Error) -> Self {
        match err.category() {
            pg_common::ErrorCategory::InvalidArgument => ExitCode::ArgsError,
            pg_common::ErrorCategory::Sanity => ExitCode::InternalError,
            pg_common::ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_zero() {
        assert_eq!(ExitCode::Ok.as_i32(), 0);
        assert!(ExitCode::Ok.is_success());
        assert!(!ExitCode::Ok.is_error());
    }

    #[test]
    fn args_error_is_ten() {
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert!(ExitCode::ArgsError.is_user_error());
    }

    #[test]
    fn io_error_is_eleven() {
        assert_eq!(ExitCode::IoError.as_i32(), 11);
    }

    #[test]
    fn internal_error_is_twenty() {
        assert_eq!(ExitCode::InternalError.as_i32(), 20);
        assert!(ExitCode::InternalError.is_internal_error());
    }

    #[test]
    fn error_category_maps_to_exit_code() {
        let err = pg_common::Error::NonPositiveGramSize { value: 0 };
        assert_eq!(ExitCode::from(&err), ExitCode::ArgsError);
    }
}
