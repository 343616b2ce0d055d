//! User access levels gating directory mutations.
//!
//! # Responsibility
//! - Define the ordered access scale and the editor threshold.
//! - Parse session-supplied level strings into typed values.
//!
//! # Invariants
//! - Level ordering is total: `Visitor < Member < Editor < Admin`.
//! - Every mutation entry point re-checks the threshold even when the
//!   rendering surface already withheld the affordance.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ordered access level associated with the current caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserLevel {
    Visitor,
    Member,
    Editor,
    Admin,
}

/// Minimum level required to create or delete units.
pub const EDITOR_THRESHOLD: UserLevel = UserLevel::Editor;

impl UserLevel {
    /// Stable string id used in session/config wiring.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visitor => USER_LEVEL_VISITOR,
            Self::Member => USER_LEVEL_MEMBER,
            Self::Editor => USER_LEVEL_EDITOR,
            Self::Admin => USER_LEVEL_ADMIN,
        }
    }

    /// Returns whether this level may be offered mutation affordances.
    ///
    /// The hierarchy editor performs the same check at operation entry; the
    /// rendering surface is an external collaborator and cannot be trusted
    /// to enforce policy alone.
    pub fn can_edit(self) -> bool {
        self >= EDITOR_THRESHOLD
    }
}

/// Session string value for visitor level.
pub const USER_LEVEL_VISITOR: &str = "visitor";
/// Session string value for member level.
pub const USER_LEVEL_MEMBER: &str = "member";
/// Session string value for editor level.
pub const USER_LEVEL_EDITOR: &str = "editor";
/// Session string value for admin level.
pub const USER_LEVEL_ADMIN: &str = "admin";

const SUPPORTED_USER_LEVEL_STRINGS: &[&str] = &[
    USER_LEVEL_VISITOR,
    USER_LEVEL_MEMBER,
    USER_LEVEL_EDITOR,
    USER_LEVEL_ADMIN,
];

/// Returns supported user level declaration strings.
pub fn supported_user_level_strings() -> &'static [&'static str] {
    SUPPORTED_USER_LEVEL_STRINGS
}

/// Parses one user level from a session string value.
pub fn parse_user_level(value: &str) -> Result<UserLevel, UserLevelError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(UserLevelError::EmptyLevel);
    }

    match normalized {
        USER_LEVEL_VISITOR => Ok(UserLevel::Visitor),
        USER_LEVEL_MEMBER => Ok(UserLevel::Member),
        USER_LEVEL_EDITOR => Ok(UserLevel::Editor),
        USER_LEVEL_ADMIN => Ok(UserLevel::Admin),
        other => Err(UserLevelError::UnsupportedLevel(other.to_string())),
    }
}

/// User level parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLevelError {
    EmptyLevel,
    UnsupportedLevel(String),
}

impl Display for UserLevelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLevel => write!(f, "user level value must not be empty"),
            Self::UnsupportedLevel(value) => {
                write!(f, "user level is unsupported: {value}")
            }
        }
    }
}

impl Error for UserLevelError {}

#[cfg(test)]
mod tests {
    use super::{
        parse_user_level, supported_user_level_strings, UserLevel, UserLevelError, EDITOR_THRESHOLD,
    };

    #[test]
    fn parses_all_supported_levels() {
        assert_eq!(
            parse_user_level("visitor").expect("visitor parse"),
            UserLevel::Visitor
        );
        assert_eq!(
            parse_user_level("member").expect("member parse"),
            UserLevel::Member
        );
        assert_eq!(
            parse_user_level("editor").expect("editor parse"),
            UserLevel::Editor
        );
        assert_eq!(
            parse_user_level("admin").expect("admin parse"),
            UserLevel::Admin
        );
    }

    #[test]
    fn rejects_empty_and_unsupported_levels() {
        let err = parse_user_level("   ").expect_err("empty level must fail");
        assert_eq!(err, UserLevelError::EmptyLevel);

        let err = parse_user_level("owner").expect_err("unsupported level must fail");
        assert_eq!(err, UserLevelError::UnsupportedLevel("owner".to_string()));
    }

    #[test]
    fn ordering_places_threshold_between_member_and_admin() {
        assert!(UserLevel::Visitor < UserLevel::Member);
        assert!(UserLevel::Member < EDITOR_THRESHOLD);
        assert!(EDITOR_THRESHOLD < UserLevel::Admin);
    }

    #[test]
    fn can_edit_matches_threshold() {
        assert!(!UserLevel::Visitor.can_edit());
        assert!(!UserLevel::Member.can_edit());
        assert!(UserLevel::Editor.can_edit());
        assert!(UserLevel::Admin.can_edit());
    }

    #[test]
    fn exposes_supported_level_strings() {
        let values = supported_user_level_strings();
        assert_eq!(values.len(), 4);
        assert!(values.contains(&"editor"));
    }
}
