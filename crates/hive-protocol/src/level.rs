use serde::{Deserialize, Serialize};

/// Severity tag attached to a log entry.
///
/// The set is open-ended on the wire: producers are free to invent new
/// tags, and an unrecognized tag must never be a parse failure. The
/// canonical tags get their own arms; everything else lands in
/// `Other` with the original string preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
    Critical,
    /// Any tag this consumer does not recognize. Rendered with the
    /// default treatment.
    Other(String),
}

impl From<String> for Level {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Level::Info,
            "SUCCESS" => Level::Success,
            "WARNING" => Level::Warning,
            "ERROR" => Level::Error,
            "CRITICAL" => Level::Critical,
            _ => Level::Other(s),
        }
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.to_string()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Other(s) => s.as_str(),
        };
        write!(f, "{s}")
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Info
    }
}
