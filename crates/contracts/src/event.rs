//! Log event model shared by every sink and subscriber.
//!
//! A `LogEvent` is built once at the write call and then cloned into buffers
//! and subscriber invocations. Nothing downstream mutates it except to attach
//! the frame stamp when the event is buffered.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    /// Map the `is_error` flag used by the sink interface
    pub fn from_is_error(is_error: bool) -> Self {
        if is_error {
            Self::Error
        } else {
            Self::Info
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Category of a structured error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    #[default]
    Error,
    Warning,
    Script,
    Shader,
}

impl ErrorType {
    /// Label used by the default textual rendering
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Script => "SCRIPT ERROR",
            Self::Shader => "SHADER ERROR",
        }
    }

    /// Short machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Script => "script",
            Self::Shader => "shader",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error report
///
/// Built with [`ErrorRecord::new`] and the chained setters, or through the
/// `log_error!` macro which fills in the source location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Function (or module path) that raised the error
    pub function: String,
    /// Source file
    pub file: String,
    /// Source line
    pub line: u32,
    /// Failing code fragment or condition
    pub code: String,
    /// Human readable explanation, may be empty
    pub rationale: String,
    /// Whether an attached editor should surface this error
    pub editor_notify: bool,
    /// Error category
    pub error_type: ErrorType,
}

impl ErrorRecord {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
            ..Self::default()
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn editor_notify(mut self, notify: bool) -> Self {
        self.editor_notify = notify;
        self
    }

    pub fn error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    /// Rationale when present, otherwise the code fragment
    pub fn details(&self) -> &str {
        if self.rationale.is_empty() {
            &self.code
        } else {
            &self.rationale
        }
    }

    /// Headline of the default rendering, newline terminated
    pub fn headline(&self) -> String {
        if self.editor_notify {
            format!("{}: {}\n", self.error_type.label(), self.details())
        } else {
            format!("USER {}: {}\n", self.error_type.label(), self.details())
        }
    }

    /// Location line of the default rendering, newline terminated
    pub fn location(&self) -> String {
        format!("   at: {} ({}:{})\n", self.function, self.file, self.line)
    }
}

/// A single captured log event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Message text; for structured errors this is the code fragment
    pub text: String,
    pub severity: Severity,
    /// Present only for structured errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
    /// Frame counter at buffering time; `None` for immediate delivery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,
}

impl LogEvent {
    /// Plain message event
    pub fn message(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            text: text.into(),
            severity: Severity::from_is_error(is_error),
            error: None,
            frame: None,
        }
    }

    /// Structured error event
    pub fn error(record: ErrorRecord) -> Self {
        Self {
            text: record.code.clone(),
            severity: Severity::Error,
            error: Some(record),
            frame: None,
        }
    }

    /// Copy of this event stamped with a frame counter
    pub fn stamped(&self, frame: u64) -> Self {
        Self {
            frame: Some(frame),
            ..self.clone()
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    /// Category name: `info` for plain messages, the error type otherwise
    pub fn kind(&self) -> &'static str {
        match (&self.error, self.severity) {
            (Some(record), _) => record.error_type.as_str(),
            (None, Severity::Error) => "error",
            (None, Severity::Info) => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_prefers_rationale() {
        let record = ErrorRecord::new("load", "res.rs", 12)
            .code("file.is_some()")
            .rationale("missing resource");
        assert_eq!(record.headline(), "USER ERROR: missing resource\n");
        assert_eq!(record.location(), "   at: load (res.rs:12)\n");
    }

    #[test]
    fn test_headline_falls_back_to_code() {
        let record = ErrorRecord::new("compile", "shader.rs", 3)
            .code("uniform mismatch")
            .editor_notify(true)
            .error_type(ErrorType::Shader);
        assert_eq!(record.headline(), "SHADER ERROR: uniform mismatch\n");
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(LogEvent::message("a", false).kind(), "info");
        assert_eq!(LogEvent::message("a", true).kind(), "error");

        let warning = ErrorRecord::new("f", "x.rs", 1).error_type(ErrorType::Warning);
        let event = LogEvent::error(warning);
        assert_eq!(event.kind(), "warning");
        assert!(event.is_error());
    }

    #[test]
    fn test_stamped_keeps_payload() {
        let event = LogEvent::message("tick", false);
        let stamped = event.stamped(7);
        assert_eq!(stamped.frame, Some(7));
        assert_eq!(stamped.text, "tick");
        assert_eq!(event.frame, None);
    }

    #[test]
    fn test_event_json_shape() {
        let event = LogEvent::message("hello", false);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["severity"], "info");
        assert!(json.get("error").is_none());
        assert!(json.get("frame").is_none());
    }
}
