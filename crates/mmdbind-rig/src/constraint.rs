//! Bone constraint records.
//!
//! A [`Constraint`] mirrors the subset of a host constraint the engine
//! authors: its kind, its target, its evaluation spaces, its influence and a
//! sparse map of kind-specific parameters. Field assignments are validated
//! against the kind, so an illegal assignment fails where the host would
//! reject it.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::driver::Driver;
use crate::error::{HostError, HostResult};

// =============================================================================
// Kinds and Spaces
// =============================================================================

/// Constraint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    CopyTransforms,
    CopyRotation,
    CopyLocation,
    CopyScale,
    Ik,
    LimitRotation,
}

impl ConstraintKind {
    /// Returns the host identifier of this kind.
    pub fn blender_name(&self) -> &'static str {
        match self {
            ConstraintKind::CopyTransforms => "COPY_TRANSFORMS",
            ConstraintKind::CopyRotation => "COPY_ROTATION",
            ConstraintKind::CopyLocation => "COPY_LOCATION",
            ConstraintKind::CopyScale => "COPY_SCALE",
            ConstraintKind::Ik => "IK",
            ConstraintKind::LimitRotation => "LIMIT_ROTATION",
        }
    }

    /// Returns true if constraints of this kind take a target.
    pub fn has_target(&self) -> bool {
        !matches!(self, ConstraintKind::LimitRotation)
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.blender_name())
    }
}

/// Coordinate space a constraint reads its target in, or applies to its owner in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Space {
    #[default]
    World,
    Pose,
    LocalWithParent,
    Local,
}

impl Space {
    /// Returns the host identifier of this space.
    pub fn as_str(&self) -> &'static str {
        match self {
            Space::World => "WORLD",
            Space::Pose => "POSE",
            Space::LocalWithParent => "LOCAL_WITH_PARENT",
            Space::Local => "LOCAL",
        }
    }

    /// Parses a host space identifier.
    pub fn from_name(name: &str) -> Option<Space> {
        match name {
            "WORLD" => Some(Space::World),
            "POSE" => Some(Space::Pose),
            "LOCAL_WITH_PARENT" => Some(Space::LocalWithParent),
            "LOCAL" => Some(Space::Local),
            _ => None,
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Parameter Values
// =============================================================================

/// Value of a named constraint field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "'{}'", v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Space> for ParamValue {
    fn from(value: Space) -> Self {
        ParamValue::Text(value.as_str().to_string())
    }
}

/// Ordered list of named field assignments.
///
/// ```
/// use mmdbind_rig::constraint::ConstraintParams;
///
/// let params = ConstraintParams::new().with("mix_mode", "ADD").with("use_y", false);
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintParams(Vec<(String, ParamValue)>);

impl ConstraintParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an assignment.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    /// Iterates over assignments in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Field Schema
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum FieldType {
    Bool,
    Int { min: i64 },
    Float { min: f64, max: f64 },
    Text,
    Choice(&'static [&'static str]),
}

const AXIS_FLAGS: &[&str] = &[
    "use_x", "use_y", "use_z", "invert_x", "invert_y", "invert_z",
];

const LIMIT_FLAGS: &[&str] = &["use_limit_x", "use_limit_y", "use_limit_z"];

const LIMIT_ANGLES: &[&str] = &["min_x", "max_x", "min_y", "max_y", "min_z", "max_z"];

fn field_type(kind: ConstraintKind, field: &str) -> Option<FieldType> {
    use ConstraintKind::*;

    let unbounded = FieldType::Float {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };
    let unit = FieldType::Float { min: 0.0, max: 1.0 };

    match (kind, field) {
        (CopyTransforms, "mix_mode") => Some(FieldType::Choice(&[
            "REPLACE",
            "BEFORE_FULL",
            "BEFORE",
            "BEFORE_SPLIT",
            "AFTER_FULL",
            "AFTER",
            "AFTER_SPLIT",
        ])),
        (CopyTransforms, "remove_target_shear") => Some(FieldType::Bool),
        (CopyTransforms | CopyLocation, "head_tail") => Some(unit),

        (CopyRotation, "mix_mode") => Some(FieldType::Choice(&[
            "REPLACE", "ADD", "BEFORE", "AFTER", "OFFSET",
        ])),
        (CopyRotation, "euler_order") => Some(FieldType::Choice(&[
            "AUTO", "XYZ", "XZY", "YXZ", "YZX", "ZXY", "ZYX",
        ])),
        (CopyRotation | CopyLocation, f) if AXIS_FLAGS.contains(&f) => Some(FieldType::Bool),
        (CopyLocation, "use_offset") => Some(FieldType::Bool),

        (CopyScale, "use_x" | "use_y" | "use_z" | "use_offset" | "use_add") => {
            Some(FieldType::Bool)
        }
        (CopyScale, "use_make_uniform") => Some(FieldType::Bool),
        (CopyScale, "power") => Some(unbounded),

        (Ik, "chain_count") => Some(FieldType::Int { min: 0 }),
        (Ik, "iterations") => Some(FieldType::Int { min: 0 }),
        (Ik, "pole_target" | "pole_subtarget") => Some(FieldType::Text),
        (Ik, "pole_angle") => Some(unbounded),
        (Ik, "weight") => Some(FieldType::Float { min: 0.01, max: 1.0 }),
        (Ik, "use_tail" | "use_stretch" | "use_rotation") => Some(FieldType::Bool),

        (LimitRotation, f) if LIMIT_FLAGS.contains(&f) => Some(FieldType::Bool),
        (LimitRotation, f) if LIMIT_ANGLES.contains(&f) => Some(unbounded),
        (LimitRotation, "use_transform_limit") => Some(FieldType::Bool),

        _ => None,
    }
}

// =============================================================================
// Constraint
// =============================================================================

/// One constraint on a pose bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtarget: Option<String>,
    #[serde(default)]
    pub target_space: Space,
    #[serde(default)]
    pub owner_space: Space,
    pub influence: f64,
    #[serde(default)]
    pub mute: bool,
    /// Kind-specific fields that were assigned explicitly.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
    /// Drivers keyed by the field they drive.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub drivers: BTreeMap<String, Driver>,
}

impl Constraint {
    /// Creates a constraint with host defaults: world spaces, full influence.
    pub fn new(name: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            name: name.into(),
            kind,
            target: None,
            subtarget: None,
            target_space: Space::World,
            owner_space: Space::World,
            influence: 1.0,
            mute: false,
            params: BTreeMap::new(),
            drivers: BTreeMap::new(),
        }
    }

    fn invalid(&self, field: &str, reason: impl Into<String>) -> HostError {
        HostError::InvalidField {
            kind: self.kind.blender_name().to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn expect_text(&self, field: &str, value: ParamValue) -> HostResult<String> {
        match value {
            ParamValue::Text(text) => Ok(text),
            other => Err(self.invalid(field, format!("expected string, got {}", other.type_name()))),
        }
    }

    fn expect_space(&self, field: &str, value: ParamValue) -> HostResult<Space> {
        let text = self.expect_text(field, value)?;
        Space::from_name(&text).ok_or_else(|| self.invalid(field, format!("unknown space '{}'", text)))
    }

    /// Assigns a named field.
    ///
    /// Common fields (`target`, `subtarget`, `target_space`, `owner_space`,
    /// `influence`, `mute`) are accepted on every kind; anything else must
    /// be a field of this kind with a value of the right type and range.
    pub fn set_field(&mut self, field: &str, value: impl Into<ParamValue>) -> HostResult<()> {
        let value = value.into();
        match field {
            "name" => Err(self.invalid(field, "names are assigned by the host")),
            "target" | "subtarget" if !self.kind.has_target() => {
                Err(self.invalid(field, "constraint kind takes no target"))
            }
            "target" => {
                self.target = Some(self.expect_text(field, value)?);
                Ok(())
            }
            "subtarget" => {
                self.subtarget = Some(self.expect_text(field, value)?);
                Ok(())
            }
            "target_space" => {
                self.target_space = self.expect_space(field, value)?;
                Ok(())
            }
            "owner_space" => {
                self.owner_space = self.expect_space(field, value)?;
                Ok(())
            }
            "influence" => {
                let influence = value
                    .as_f64()
                    .ok_or_else(|| self.invalid(field, "expected float"))?;
                if !(0.0..=1.0).contains(&influence) {
                    return Err(self.invalid(field, format!("{} is outside 0..1", influence)));
                }
                self.influence = influence;
                Ok(())
            }
            "mute" => match value {
                ParamValue::Bool(mute) => {
                    self.mute = mute;
                    Ok(())
                }
                other => Err(self.invalid(field, format!("expected bool, got {}", other.type_name()))),
            },
            _ => {
                let ty = field_type(self.kind, field)
                    .ok_or_else(|| self.invalid(field, "no such field"))?;
                let value = self.check_value(field, ty, value)?;
                self.params.insert(field.to_string(), value);
                Ok(())
            }
        }
    }

    fn check_value(&self, field: &str, ty: FieldType, value: ParamValue) -> HostResult<ParamValue> {
        match (ty, value) {
            (FieldType::Bool, value @ ParamValue::Bool(_)) => Ok(value),
            (FieldType::Int { min }, ParamValue::Int(v)) => {
                if v < min {
                    Err(self.invalid(field, format!("{} is below {}", v, min)))
                } else {
                    Ok(ParamValue::Int(v))
                }
            }
            (FieldType::Float { min, max }, value @ (ParamValue::Float(_) | ParamValue::Int(_))) => {
                let v = value.as_f64().unwrap_or_default();
                if v < min || v > max {
                    Err(self.invalid(field, format!("{} is outside {}..{}", v, min, max)))
                } else {
                    Ok(ParamValue::Float(v))
                }
            }
            (FieldType::Text, value @ ParamValue::Text(_)) => Ok(value),
            (FieldType::Choice(choices), ParamValue::Text(v)) => {
                if choices.contains(&v.as_str()) {
                    Ok(ParamValue::Text(v))
                } else {
                    Err(self.invalid(field, format!("'{}' is not one of {}", v, choices.join(", "))))
                }
            }
            (_, other) => Err(self.invalid(field, format!("unexpected {} value", other.type_name()))),
        }
    }

    /// Reads a named field. Kind-specific fields that were never assigned
    /// read as `None`.
    pub fn field(&self, field: &str) -> Option<ParamValue> {
        match field {
            "name" => Some(ParamValue::from(self.name.as_str())),
            "target" => self.target.as_deref().map(ParamValue::from),
            "subtarget" => self.subtarget.as_deref().map(ParamValue::from),
            "target_space" => Some(self.target_space.into()),
            "owner_space" => Some(self.owner_space.into()),
            "influence" => Some(ParamValue::Float(self.influence)),
            "mute" => Some(ParamValue::Bool(self.mute)),
            _ => self.params.get(field).cloned(),
        }
    }

    fn is_drivable(&self, field: &str) -> bool {
        field == "influence"
            || matches!(field_type(self.kind, field), Some(FieldType::Float { .. }))
    }

    /// Attaches a driver to a float field, replacing any driver already on it.
    pub fn driver_add(&mut self, field: &str, driver: Driver) -> HostResult<&mut Driver> {
        if !self.is_drivable(field) {
            return Err(self.invalid(field, "field cannot be driven"));
        }
        match self.drivers.entry(field.to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(driver);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(slot.insert(driver)),
        }
    }

    /// Detaches the driver of a field. Returns true if one was removed.
    pub fn driver_remove(&mut self, field: &str) -> bool {
        self.drivers.remove(field).is_some()
    }

    /// Driver of a field, if any.
    pub fn driver(&self, field: &str) -> Option<&Driver> {
        self.drivers.get(field)
    }

    /// Writes a driver result into its field. Influence is clamped to 0..1.
    pub(crate) fn apply_driven_value(&mut self, field: &str, value: f64) {
        if field == "influence" {
            self.influence = value.clamp(0.0, 1.0);
        } else if let Some(FieldType::Float { min, max }) = field_type(self.kind, field) {
            self.params
                .insert(field.to_string(), ParamValue::Float(value.clamp(min, max)));
        }
    }
}
