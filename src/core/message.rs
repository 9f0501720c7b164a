#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptRole {
    User,
    Model,
    System,
}

/// Transient marker for an entry that is still being written.
///
/// Every entry ends up `Final` once its writer is done with it. At most one
/// entry in a transcript carries any other status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    #[default]
    Final,
    Enhancing,
    Generating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEntry {
    pub role: TranscriptRole,
    pub content: String,
    pub status: EntryStatus,
}

impl TranscriptRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TranscriptRole::User => "user",
            TranscriptRole::Model => "model",
            TranscriptRole::System => "system",
        }
    }

    /// Role name on the wire. System entries are app notes and never leave
    /// the process.
    pub fn to_api_role(self) -> Option<&'static str> {
        match self {
            TranscriptRole::System => None,
            role => Some(role.as_str()),
        }
    }

    pub fn is_model(self) -> bool {
        self == TranscriptRole::Model
    }
}

impl EntryStatus {
    pub fn is_final(self) -> bool {
        self == EntryStatus::Final
    }
}

impl TurnEntry {
    pub fn new(role: TranscriptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            status: EntryStatus::Final,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TranscriptRole::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(TranscriptRole::Model, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TranscriptRole::System, content)
    }

    /// Empty model entry that receives streamed deltas.
    pub fn generating() -> Self {
        Self {
            role: TranscriptRole::Model,
            content: String::new(),
            status: EntryStatus::Generating,
        }
    }

    /// System note shown while a prompt is being enhanced.
    pub fn enhancing(content: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::System,
            content: content.into(),
            status: EntryStatus::Enhancing,
        }
    }

    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }

    pub fn is_enhancing(&self) -> bool {
        self.status == EntryStatus::Enhancing
    }

    pub fn is_generating(&self) -> bool {
        self.status == EntryStatus::Generating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_role_has_no_api_role() {
        assert_eq!(TranscriptRole::System.to_api_role(), None);
        assert_eq!(TranscriptRole::Model.to_api_role(), Some("model"));
        assert_eq!(TranscriptRole::User.to_api_role(), Some("user"));
    }

    #[test]
    fn constructors_set_status() {
        assert!(TurnEntry::user("hi").is_final());
        assert!(TurnEntry::generating().is_generating());
        assert!(TurnEntry::enhancing("Enhancing prompt...").is_enhancing());
        assert!(TurnEntry::generating().role.is_model());
    }
}
