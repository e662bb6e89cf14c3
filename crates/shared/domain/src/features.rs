use crate::constants::{
    DEVELOPMENT, NEW_SEARCH_EXPERIENCE, PRODUCTION, SCHOOL_SUBSCRIPTIONS, STAGING, TEACHER_PROFILES,
    TEST,
};
use bitflags::bitflags;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of a feature flag (e.g. `newSearchExperience`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureKey(String);

impl FeatureKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FeatureKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FeatureKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for FeatureKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

bitflags! {
    /// Deployment environments a feature may be restricted to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct EnvironmentSet: u8 {
        const DEVELOPMENT = 1 << 0;
        const TEST = 1 << 1;
        const STAGING = 1 << 2;
        const PRODUCTION = 1 << 3;

        const ALL = Self::DEVELOPMENT.bits()
            | Self::TEST.bits()
            | Self::STAGING.bits()
            | Self::PRODUCTION.bits();
    }
}

impl EnvironmentSet {
    /// Lowercase names of the environments in this set, in declaration order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        [
            (Self::DEVELOPMENT, DEVELOPMENT),
            (Self::TEST, TEST),
            (Self::STAGING, STAGING),
            (Self::PRODUCTION, PRODUCTION),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
    }
}

impl From<&str> for EnvironmentSet {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            DEVELOPMENT | "dev" => Self::DEVELOPMENT,
            TEST => Self::TEST,
            STAGING => Self::STAGING,
            PRODUCTION | "prod" => Self::PRODUCTION,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

// Serialized as a list of names so config files read like `["development", "staging"]`.
impl Serialize for EnvironmentSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names: Vec<&str> = self.names().collect();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for EnvironmentSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EnvironmentsVisitor;

        impl<'de> Visitor<'de> for EnvironmentsVisitor {
            type Value = EnvironmentSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of environment names")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut set = EnvironmentSet::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let parsed = EnvironmentSet::from(name.as_str());
                    if parsed.is_empty() {
                        return Err(serde::de::Error::custom(format!(
                            "unknown environment '{name}'"
                        )));
                    }
                    set |= parsed;
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(EnvironmentsVisitor)
    }
}

/// One togglable feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureDefinition {
    pub key: FeatureKey,
    #[serde(alias = "name", alias = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Master switch. When `false` the feature is off for everyone.
    #[serde(default, alias = "isEnabled")]
    pub enabled: bool,
    /// Share of the bucket space (0..=100) that receives the feature when enabled.
    #[serde(default, alias = "rolloutPercentage")]
    pub rollout_percentage: u8,
    /// Empty means every role.
    #[serde(default, alias = "allowedRoles")]
    pub allowed_roles: Vec<String>,
    /// Empty means every environment.
    #[serde(default = "EnvironmentSet::empty")]
    pub environments: EnvironmentSet,
}

impl FeatureDefinition {
    /// A disabled definition with no targeting.
    pub fn new(key: impl Into<FeatureKey>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            description: String::new(),
            enabled: false,
            rollout_percentage: 0,
            allowed_roles: Vec::new(),
            environments: EnvironmentSet::empty(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub const fn rollout(mut self, percentage: u8) -> Self {
        self.rollout_percentage = percentage;
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn environments(mut self, environments: EnvironmentSet) -> Self {
        self.environments = environments;
        self
    }
}

/// Partial update applied by administrators. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureUpdate {
    #[serde(alias = "name", alias = "displayName")]
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "isEnabled")]
    pub enabled: Option<bool>,
    #[serde(alias = "rolloutPercentage")]
    pub rollout_percentage: Option<u8>,
    #[serde(alias = "allowedRoles")]
    pub allowed_roles: Option<Vec<String>>,
    pub environments: Option<EnvironmentSet>,
}

impl FeatureUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Descriptive block shipped alongside a registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryMetadata {
    pub version: String,
    pub last_updated: Option<String>,
    pub environment: String,
}

impl Default for RegistryMetadata {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_owned(),
            last_updated: None,
            environment: DEVELOPMENT.to_owned(),
        }
    }
}

/// The flags every deployment starts with: all registered, none enabled.
#[must_use]
pub fn default_definitions() -> Vec<FeatureDefinition> {
    vec![
        FeatureDefinition::new(NEW_SEARCH_EXPERIENCE, "New Search Experience")
            .description("Enables a new, more interactive search interface."),
        FeatureDefinition::new(SCHOOL_SUBSCRIPTIONS, "School Subscriptions")
            .description("Allows schools to subscribe to premium features."),
        FeatureDefinition::new(TEACHER_PROFILES, "Teacher Profiles")
            .description("Enables public profiles for teachers."),
    ]
}
