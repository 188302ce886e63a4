use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content value that stands for "reply in progress".
pub const TYPING_SENTINEL: &str = "...";

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::User => "👤",
            Self::Assistant => "🤖",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered chat message. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
    timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Local wall-clock time in `3:07 PM` form.
    pub fn display_time(&self) -> String {
        self.timestamp.format("%-I:%M %p").to_string()
    }
}
