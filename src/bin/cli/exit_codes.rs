//! Exit codes for the CLI tool.

use splashpatch::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Operation completed with warnings
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive missing, unreadable, or not matching the configuration
pub const BAD_ARCHIVE: i32 = 3;
/// Configuration or cache layout mismatch
pub const CONFIG_ERROR: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadArchive,
    ConfigError,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::ConfigError => CONFIG_ERROR,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }

    /// Combines the outcome of two sequential steps.
    ///
    /// A failure of the later step wins; otherwise the earlier outcome stands.
    pub fn then(self, later: ExitCode) -> ExitCode {
        if later == Self::Success { self } else { later }
    }
}

/// Converts a splashpatch error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::ArchiveNotFound { .. } | Error::ArchiveCorrupt { .. } => ExitCode::BadArchive,
        Error::EntryMissing { .. } => ExitCode::BadArchive,
        Error::UnknownImageFormat { .. } => ExitCode::BadArchive,
        Error::BackupIo { .. } | Error::Deletion { .. } => ExitCode::IoError,
        Error::CacheBaseNotFound { .. } | Error::NoMatchingCacheDir { .. } => {
            ExitCode::ConfigError
        }
        Error::Config(_) | Error::UnknownTarget { .. } => ExitCode::ConfigError,
        Error::Image { .. } | Error::InvalidDimensions { .. } => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
