//! Default values for Hancock configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Language Defaults
// ============================================================================

/// Language used when a file's extension maps to no registered language.
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Project-local configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "hancock.toml";

/// Subdirectory of the user config dir holding `config.toml`.
pub const USER_CONFIG_DIR: &str = "hancock";

/// User configuration file name.
pub const USER_CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Scan Defaults
// ============================================================================

/// Maximum size of a single file to scrape (1 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Directories never descended into while scanning.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Dependencies
    "node_modules",
    "bower_components",
    "vendor",
    // Build outputs
    "target",
    "build",
    "dist",
    "out",
    // IDE/Editor
    ".idea",
    ".vscode",
    // Other common excludes
    "coverage",
    ".next",
    ".cache",
];

/// Honor `.gitignore` files while scanning.
pub const DEFAULT_FOLLOW_GITIGNORE: bool = true;

// ============================================================================
// Output Defaults
// ============================================================================

/// Pretty-print output by default.
pub const DEFAULT_PRETTY_OUTPUT: bool = true;
