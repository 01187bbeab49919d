//! Error types and handling for the injector
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostic codes and help text.
//!
//! Only fatal conditions live here. Recoverable conditions (an unreadable fragment, a
//! missing anchor) are logged where they happen and surface in the run report instead.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for injector operations
#[derive(Error, Diagnostic, Debug)]
pub enum InjectorError {
    // Acquisition errors
    #[error("Could not locate a 7-Zip executable (tried: {tried})")]
    #[diagnostic(
        code(steamodded::tool::not_found),
        help("Install 7-Zip, or pass its location with --seven-zip / STEAMODDED_7Z")
    )]
    ToolNotFound { tried: String },

    // Archive errors
    #[error("Archive not found: {path}")]
    #[diagnostic(
        code(steamodded::archive::not_found),
        help("Pass the game executable (Balatro.exe) or the macOS app bundle (Balatro.app)")
    )]
    ArchiveNotFound { path: String },

    #[error("'{member}' not found in archive {archive}")]
    #[diagnostic(
        code(steamodded::archive::missing_member),
        help("The file does not look like a packaged Balatro game; nothing was modified")
    )]
    MissingMember { member: String, archive: String },

    #[error("Failed to extract {archive}: {reason}")]
    #[diagnostic(code(steamodded::archive::extract_failed))]
    ExtractFailed { archive: String, reason: String },

    #[error("Failed to update {archive}: {reason}")]
    #[diagnostic(
        code(steamodded::archive::update_failed),
        help("The archive may be partially updated; restore it from a backup or verify game files")
    )]
    UpdateFailed { archive: String, reason: String },

    #[error("{archive} already contains the mod loader")]
    #[diagnostic(
        code(steamodded::archive::already_patched),
        help(
            "Verify the game files to restore a clean executable, or pass --force to inject again"
        )
    )]
    AlreadyPatched { archive: String },

    // Script errors
    #[error("Failed to read script: {path}: {reason}")]
    #[diagnostic(code(steamodded::script::read_failed))]
    ScriptReadFailed { path: String, reason: String },

    #[error("Failed to write script: {path}: {reason}")]
    #[diagnostic(code(steamodded::script::write_failed))]
    ScriptWriteFailed { path: String, reason: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(steamodded::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(steamodded::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(steamodded::config::invalid))]
    ConfigInvalid { message: String },

    // CLI errors
    #[error("Unknown shell: {shell}")]
    #[diagnostic(
        code(steamodded::cli::unknown_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnknownShell { shell: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(steamodded::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for InjectorError {
    fn from(err: std::io::Error) -> Self {
        InjectorError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for InjectorError {
    fn from(err: serde_yaml::Error) -> Self {
        InjectorError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, InjectorError>;
