//! Shared string constants.

/// Role assigned to callers that do not present one.
pub const USER: &str = "user";
/// Role allowed to modify feature definitions.
pub const ADMIN: &str = "admin";

pub const DEVELOPMENT: &str = "development";
pub const TEST: &str = "test";
pub const STAGING: &str = "staging";
pub const PRODUCTION: &str = "production";

/// Header carrying the authenticated user's stable identifier.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

pub const SYSTEM_TAG: &str = "System";
pub const FLAGS_TAG: &str = "Feature Flags";

// Built-in flags
pub const NEW_SEARCH_EXPERIENCE: &str = "newSearchExperience";
pub const SCHOOL_SUBSCRIPTIONS: &str = "schoolSubscriptions";
pub const TEACHER_PROFILES: &str = "teacherProfiles";
