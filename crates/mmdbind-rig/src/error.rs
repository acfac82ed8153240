//! Error types for the binding engine.

use mmdbind_spec::ConfigError;
use thiserror::Error;

/// Result type for bind operations.
pub type BindResult<T> = Result<T, BindError>;

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Invalid arguments to the geometry helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The plane tag is not one of `XY`, `XZ`, `YZ`.
    #[error("unknown plane, expected: XY, XZ, YZ, not '{0}'")]
    InvalidPlane(String),
}

/// Malformed drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Only `+var`, `1-var` and products of those are supported.
    #[error("unsupported driver expression '{0}'")]
    UnsupportedExpression(String),

    /// The expression reads a variable the driver does not declare.
    #[error("driver expression reads undeclared variable '{0}'")]
    UnknownVariable(String),

    /// Two variables share a name.
    #[error("driver variable '{0}' is declared twice")]
    DuplicateVariable(String),
}

/// Failures reported by the host armature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// No bone with this name exists.
    #[error("bone '{0}' not found")]
    UnknownBone(String),

    /// No custom property with this name exists on the bone.
    #[error("property '{prop}' not found on bone '{bone}'")]
    UnknownProperty { bone: String, prop: String },

    /// No constraint with this name exists on the bone.
    #[error("constraint '{name}' not found on bone '{bone}'")]
    UnknownConstraint { bone: String, name: String },

    /// A constraint field assignment was rejected.
    #[error("cannot assign '{field}' on {kind} constraint: {reason}")]
    InvalidField {
        kind: String,
        field: String,
        reason: String,
    },

    /// Re-parenting would create a cycle.
    #[error("cannot parent '{bone}' to '{parent}': would create a cycle")]
    ParentCycle { bone: String, parent: String },

    /// A property value is not a finite number.
    #[error("invalid value {value} for property '{prop}' on bone '{bone}'")]
    InvalidValue {
        bone: String,
        prop: String,
        value: f64,
    },
}

/// Errors that abort a bind pass.
#[derive(Debug, Error)]
pub enum BindError {
    /// The host armature rejected an operation.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// A driver could not be built.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// A geometry helper received an invalid argument.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// The bind configuration is invalid.
    #[error("invalid bind config: {0}")]
    Config(#[from] ConfigError),
}
