//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | Success                                               |
//! | 1    | General error (unspecified)                           |
//! | 2    | CLI usage error (bad args)                            |
//! | 3    | A source file could not be parsed                     |
//! | 4    | No source files found                                 |
//! | 5    | Invalid config (parse, validation, unknown indicator) |
//! | 6    | Empty entity selection (nothing to show)              |
//! | 7    | File could not be read or written                     |

use gapview_io::IoError;
use gapview_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments.
pub const EXIT_USAGE: u8 = 2;

/// A source file is not a valid entity × period table.
pub const EXIT_MALFORMED_SOURCE: u8 = 3;

/// Data directory holds no indicator files.
pub const EXIT_NO_SOURCES: u8 = 4;

/// Config could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// `view` was asked to show zero entities.
pub const EXIT_EMPTY_SELECTION: u8 = 6;

/// Filesystem error.
pub const EXIT_IO: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MalformedSource { .. } => EXIT_MALFORMED_SOURCE,
        ReconError::NoSources => EXIT_NO_SOURCES,
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::UnknownIndicator(_) => EXIT_INVALID_CONFIG,
    }
}

/// Map an I/O layer error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Io { .. } => EXIT_IO,
        IoError::DuplicateIndicator { .. } => EXIT_MALFORMED_SOURCE,
        IoError::Recon(e) => recon_exit_code(e),
        IoError::Cache(_) => EXIT_ERROR,
    }
}
