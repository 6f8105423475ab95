//! Error types for the scenario harness

/// Errors raised while preparing the suite or running scenario commands
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Build failed with status {status}: {stderr}")]
    BuildFailed { status: i32, stderr: String },

    #[error("Failed to stage binary: {0}")]
    StageFailed(String),

    #[error("Invalid search path: {0}")]
    SearchPath(String),

    #[error("Failed to start fixture server: {0}")]
    FixtureStartFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Failed to launch {program}: {source}")]
    CommandLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command line is empty")]
    EmptyCommand,

    #[error("No command runner bound to the scenario")]
    RunnerNotBound,
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
