//! Error types for parsing names and validating bind configuration.

use thiserror::Error;

use crate::control::ControlProperty;
use crate::descriptor::GroupCategory;

/// Errors raised when parsing control names and data paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The string is not a `pose.bones["bone"]["prop"]` data path.
    #[error("malformed data path: {0}")]
    Malformed(String),

    /// The string names no known control.
    #[error("unknown control property: {0}")]
    UnknownControl(String),
}

/// Errors that can occur when loading or validating a [`BindConfig`].
///
/// [`BindConfig`]: crate::config::BindConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration JSON could not be parsed.
    #[error("failed to parse bind config: {0}")]
    Parse(#[from] serde_json::Error),

    /// No group is enabled.
    #[error("bind config enables no groups")]
    NoGroups,

    /// A group that cannot be bound was listed.
    #[error("group '{0}' cannot be bound")]
    InvalidGroup(GroupCategory),

    /// A group was listed twice.
    #[error("group '{0}' is listed more than once")]
    DuplicateGroup(GroupCategory),

    /// A name override refers to a bone outside the standard catalog.
    #[error("name override for unknown standard bone '{0}'")]
    UnknownStandardBone(String),

    /// A name override maps a standard bone to an empty bone name.
    #[error("name override for '{0}' has an empty target bone")]
    EmptyOverrideTarget(String),

    /// An initial control value lies outside 0..1.
    #[error("initial value {value} for '{control}' is outside 0..1")]
    ValueOutOfRange {
        control: ControlProperty,
        value: f64,
    },
}
