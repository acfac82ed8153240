//! User-facing scalar controls and where their values live.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::Side;
use crate::error::ParseError;

// =============================================================================
// Control Properties
// =============================================================================

/// A scalar control exposed on a bound rig.
///
/// Values are floats in `0.0..=1.0`. Parent and pole-parent switches are
/// discrete in practice but stored as floats like every other control.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ControlProperty {
    /// Releases every bind constraint (0 = bound).
    BindEnable,
    /// Releases the eye-aim constraints (0 = eyes follow the eye controls).
    EyeTracking,
    /// Releases the left leg D-bone follow.
    LegLFeature,
    /// Releases the right leg D-bone follow.
    LegRFeature,
    /// Releases the left toe follow.
    ToeLFeature,
    /// Releases the right toe follow.
    ToeRFeature,
    /// Neck follows the torso.
    TorsoNeckFollow,
    /// Head follows the torso.
    TorsoHeadFollow,
    ArmLIkFk,
    ArmRIkFk,
    ArmLIkStretch,
    ArmRIkStretch,
    ArmLIkParent,
    ArmRIkParent,
    ArmLPoleVector,
    ArmRPoleVector,
    LegLIkFk,
    LegRIkFk,
    LegLIkStretch,
    LegRIkStretch,
    LegLIkParent,
    LegRIkParent,
    LegLPoleVector,
    LegRPoleVector,
    LegLPoleParent,
    LegRPoleParent,
}

impl ControlProperty {
    /// Every control, in registry order.
    pub const ALL: [ControlProperty; 26] = [
        ControlProperty::BindEnable,
        ControlProperty::EyeTracking,
        ControlProperty::LegLFeature,
        ControlProperty::LegRFeature,
        ControlProperty::ToeLFeature,
        ControlProperty::ToeRFeature,
        ControlProperty::TorsoNeckFollow,
        ControlProperty::TorsoHeadFollow,
        ControlProperty::ArmLIkFk,
        ControlProperty::ArmRIkFk,
        ControlProperty::ArmLIkStretch,
        ControlProperty::ArmRIkStretch,
        ControlProperty::ArmLIkParent,
        ControlProperty::ArmRIkParent,
        ControlProperty::ArmLPoleVector,
        ControlProperty::ArmRPoleVector,
        ControlProperty::LegLIkFk,
        ControlProperty::LegRIkFk,
        ControlProperty::LegLIkStretch,
        ControlProperty::LegRIkStretch,
        ControlProperty::LegLIkParent,
        ControlProperty::LegRIkParent,
        ControlProperty::LegLPoleVector,
        ControlProperty::LegRPoleVector,
        ControlProperty::LegLPoleParent,
        ControlProperty::LegRPoleParent,
    ];

    /// Controls whose backing properties the binder creates itself.
    /// The rest belong to the control rig.
    pub const ENGINE_OWNED: [ControlProperty; 6] = [
        ControlProperty::BindEnable,
        ControlProperty::EyeTracking,
        ControlProperty::LegLFeature,
        ControlProperty::LegRFeature,
        ControlProperty::ToeLFeature,
        ControlProperty::ToeRFeature,
    ];

    /// Returns the control identifier, also used as accessor name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlProperty::BindEnable => "bind_enable",
            ControlProperty::EyeTracking => "eye_tracking",
            ControlProperty::LegLFeature => "leg_l_feature",
            ControlProperty::LegRFeature => "leg_r_feature",
            ControlProperty::ToeLFeature => "toe_l_feature",
            ControlProperty::ToeRFeature => "toe_r_feature",
            ControlProperty::TorsoNeckFollow => "torso_neck_follow",
            ControlProperty::TorsoHeadFollow => "torso_head_follow",
            ControlProperty::ArmLIkFk => "arm_l_ik_fk",
            ControlProperty::ArmRIkFk => "arm_r_ik_fk",
            ControlProperty::ArmLIkStretch => "arm_l_ik_stretch",
            ControlProperty::ArmRIkStretch => "arm_r_ik_stretch",
            ControlProperty::ArmLIkParent => "arm_l_ik_parent",
            ControlProperty::ArmRIkParent => "arm_r_ik_parent",
            ControlProperty::ArmLPoleVector => "arm_l_pole_vector",
            ControlProperty::ArmRPoleVector => "arm_r_pole_vector",
            ControlProperty::LegLIkFk => "leg_l_ik_fk",
            ControlProperty::LegRIkFk => "leg_r_ik_fk",
            ControlProperty::LegLIkStretch => "leg_l_ik_stretch",
            ControlProperty::LegRIkStretch => "leg_r_ik_stretch",
            ControlProperty::LegLIkParent => "leg_l_ik_parent",
            ControlProperty::LegRIkParent => "leg_r_ik_parent",
            ControlProperty::LegLPoleVector => "leg_l_pole_vector",
            ControlProperty::LegRPoleVector => "leg_r_pole_vector",
            ControlProperty::LegLPoleParent => "leg_l_pole_parent",
            ControlProperty::LegRPoleParent => "leg_r_pole_parent",
        }
    }

    /// Returns the body side this control belongs to, if any.
    pub fn side(&self) -> Option<Side> {
        let name = self.as_str();
        if name.contains("_l_") {
            Some(Side::Left)
        } else if name.contains("_r_") {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Returns the same control for the opposite side.
    pub fn mirrored(&self) -> ControlProperty {
        let name = self.as_str();
        let mirrored = if name.contains("_l_") {
            name.replacen("_l_", "_r_", 1)
        } else if name.contains("_r_") {
            name.replacen("_r_", "_l_", 1)
        } else {
            return *self;
        };
        // Every sided control has a counterpart in `ALL`.
        mirrored.parse().unwrap_or(*self)
    }

    /// Returns true if the binder creates the backing property itself.
    pub fn is_engine_owned(&self) -> bool {
        Self::ENGINE_OWNED.contains(self)
    }

    /// Property settings used when the binder creates the backing property.
    pub fn property_spec(&self) -> PropertySpec {
        let description = match self {
            ControlProperty::BindEnable => "Release the standard skeleton from the control rig",
            ControlProperty::EyeTracking => "Release the eyes from the eye controls",
            ControlProperty::LegLFeature | ControlProperty::LegRFeature => {
                "Release the leg deform bones from the leg controls"
            }
            ControlProperty::ToeLFeature | ControlProperty::ToeRFeature => {
                "Release the toe bones from the toe controls"
            }
            _ => self.as_str(),
        };
        PropertySpec::factor().with_description(description)
    }
}

impl std::fmt::Display for ControlProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlProperty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseError::UnknownControl(s.to_string()))
    }
}

// =============================================================================
// Property Settings
// =============================================================================

/// UI subtype of a custom scalar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertySubtype {
    /// Unitless 0..1 factor.
    Factor,
    /// Percentage.
    Percentage,
    /// Angle in radians.
    Angle,
    /// Distance in scene units.
    Distance,
}

/// Settings of a custom scalar property on a bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpec {
    /// Initial value.
    #[serde(default)]
    pub default: f64,
    /// Hard minimum.
    #[serde(default)]
    pub min: f64,
    /// Hard maximum.
    #[serde(default = "default_max")]
    pub max: f64,
    /// Soft (UI) minimum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_min: Option<f64>,
    /// Soft (UI) maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_max: Option<f64>,
    /// Tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether library overrides may change the value.
    #[serde(default = "default_true")]
    pub overridable: bool,
    /// UI subtype.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<PropertySubtype>,
}

fn default_max() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for PropertySpec {
    fn default() -> Self {
        Self {
            default: 0.0,
            min: 0.0,
            max: 1.0,
            soft_min: None,
            soft_max: None,
            description: None,
            overridable: true,
            subtype: None,
        }
    }
}

impl PropertySpec {
    /// A 0..1 factor starting at 0.
    pub fn factor() -> Self {
        Self {
            subtype: Some(PropertySubtype::Factor),
            ..Self::default()
        }
    }

    /// Sets the initial value.
    pub fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }

    /// Sets the hard range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Sets the soft range.
    pub fn with_soft_range(mut self, soft_min: f64, soft_max: f64) -> Self {
        self.soft_min = Some(soft_min);
        self.soft_max = Some(soft_max);
        self
    }

    /// Sets the tooltip.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the UI subtype.
    pub fn with_subtype(mut self, subtype: PropertySubtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Sets whether library overrides may change the value.
    pub fn with_overridable(mut self, overridable: bool) -> Self {
        self.overridable = overridable;
        self
    }

    /// Clamps a value into the hard range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min.min(self.max), self.max.max(self.min))
    }
}

// =============================================================================
// Data Paths
// =============================================================================

/// Storage location of a control value: a custom property on a pose bone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataPath {
    /// Pose bone owning the property.
    pub bone_name: String,
    /// Custom property name.
    pub prop_name: String,
}

const DATA_PATH_PATTERN: &str = r#"^(?:pose\.bones)?\["([^"]+)"\]\["([^"]+)"\]$"#;

static DATA_PATH_REGEX: OnceLock<Regex> = OnceLock::new();

fn data_path_regex() -> &'static Regex {
    DATA_PATH_REGEX.get_or_init(|| Regex::new(DATA_PATH_PATTERN).expect("invalid regex pattern"))
}

impl DataPath {
    /// Creates a data path.
    pub fn new(bone_name: impl Into<String>, prop_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            prop_name: prop_name.into(),
        }
    }

    /// `["bone"]`
    pub fn bone_data_path(&self) -> String {
        format!("[\"{}\"]", self.bone_name)
    }

    /// `["prop"]`
    pub fn prop_data_path(&self) -> String {
        format!("[\"{}\"]", self.prop_name)
    }

    /// `["bone"]["prop"]`
    pub fn data_path(&self) -> String {
        format!("{}{}", self.bone_data_path(), self.prop_data_path())
    }

    /// Path relative to the armature object: `pose.bones["bone"]["prop"]`.
    pub fn pose_data_path(&self) -> String {
        format!("pose.bones{}", self.data_path())
    }
}

impl std::fmt::Display for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pose_data_path())
    }
}

impl FromStr for DataPath {
    type Err = ParseError;

    /// Parses either `pose.bones["bone"]["prop"]` or `["bone"]["prop"]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = data_path_regex()
            .captures(s)
            .ok_or_else(|| ParseError::Malformed(s.to_string()))?;
        Ok(DataPath::new(&caps[1], &caps[2]))
    }
}

// =============================================================================
// Control Registry
// =============================================================================

/// Resolved storage locations of the controls a rig supports.
///
/// A control missing from the registry is a feature the rig does not have;
/// callers skip it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ControlRegistry {
    datapaths: BTreeMap<ControlProperty, DataPath>,
}

impl ControlRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `(control, bone, property)` rows.
    pub fn from_table(table: &[(ControlProperty, &str, &str)]) -> Self {
        let datapaths = table
            .iter()
            .map(|(control, bone, prop)| (*control, DataPath::new(*bone, *prop)))
            .collect();
        Self { datapaths }
    }

    /// Adds or replaces a control.
    pub fn insert(&mut self, control: ControlProperty, datapath: DataPath) {
        self.datapaths.insert(control, datapath);
    }

    /// Drops a control.
    pub fn remove(&mut self, control: ControlProperty) -> Option<DataPath> {
        self.datapaths.remove(&control)
    }

    /// Keeps only the controls for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(ControlProperty, &DataPath) -> bool) {
        self.datapaths.retain(|control, path| keep(*control, path));
    }

    /// Returns the storage location of a control, or `None` when unsupported.
    pub fn resolve(&self, control: ControlProperty) -> Option<&DataPath> {
        self.datapaths.get(&control)
    }

    /// Returns true if the control is supported.
    pub fn supports(&self, control: ControlProperty) -> bool {
        self.datapaths.contains_key(&control)
    }

    /// Iterates over supported controls.
    pub fn iter(&self) -> impl Iterator<Item = (ControlProperty, &DataPath)> {
        self.datapaths.iter().map(|(c, p)| (*c, p))
    }

    /// Number of supported controls.
    pub fn len(&self) -> usize {
        self.datapaths.len()
    }

    /// Returns true if no control is supported.
    pub fn is_empty(&self) -> bool {
        self.datapaths.is_empty()
    }
}
