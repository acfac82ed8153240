//! Bind descriptor types.
//!
//! A rig variant describes, for every catalog entry, which control-rig bones
//! stand in for the standard bone and how the standard bone should follow
//! them. The descriptor tables themselves live with the rig variants.

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, Side};
use crate::control::ControlProperty;

// =============================================================================
// Group Categories
// =============================================================================

/// Independent binding region of the skeleton.
///
/// Descriptors of different groups never reference each other's control
/// bones, so each group can be bound (and rebound) on its own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GroupCategory {
    /// Not part of any binding pass.
    #[default]
    None,
    /// Eyes and face controls.
    Face,
    /// Root, center, spine, neck and head.
    Torso,
    /// Left arm including the hand.
    ArmL,
    /// Right arm including the hand.
    ArmR,
    /// Left leg including the foot.
    LegL,
    /// Right leg including the foot.
    LegR,
}

impl GroupCategory {
    /// Groups that take part in a bind pass, in binding order.
    pub const BINDABLE: [GroupCategory; 6] = [
        GroupCategory::Torso,
        GroupCategory::ArmL,
        GroupCategory::ArmR,
        GroupCategory::LegL,
        GroupCategory::LegR,
        GroupCategory::Face,
    ];

    /// Returns the group identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupCategory::None => "none",
            GroupCategory::Face => "face",
            GroupCategory::Torso => "torso",
            GroupCategory::ArmL => "arm_l",
            GroupCategory::ArmR => "arm_r",
            GroupCategory::LegL => "leg_l",
            GroupCategory::LegR => "leg_r",
        }
    }

    /// Returns the body side of a limb group.
    pub fn side(&self) -> Option<Side> {
        match self {
            GroupCategory::ArmL | GroupCategory::LegL => Some(Side::Left),
            GroupCategory::ArmR | GroupCategory::LegR => Some(Side::Right),
            _ => None,
        }
    }

    /// Returns the group on the opposite side (center groups map to themselves).
    pub fn mirrored(&self) -> GroupCategory {
        match self {
            GroupCategory::ArmL => GroupCategory::ArmR,
            GroupCategory::ArmR => GroupCategory::ArmL,
            GroupCategory::LegL => GroupCategory::LegR,
            GroupCategory::LegR => GroupCategory::LegL,
            other => *other,
        }
    }

    /// Returns true for arm and leg groups.
    pub fn is_limb(&self) -> bool {
        self.side().is_some()
    }

    /// IK/FK blend control of a limb group.
    pub fn ik_fk_control(&self) -> Option<ControlProperty> {
        match self {
            GroupCategory::ArmL => Some(ControlProperty::ArmLIkFk),
            GroupCategory::ArmR => Some(ControlProperty::ArmRIkFk),
            GroupCategory::LegL => Some(ControlProperty::LegLIkFk),
            GroupCategory::LegR => Some(ControlProperty::LegRIkFk),
            _ => None,
        }
    }

    /// Toe-follow control of a leg group.
    pub fn toe_control(&self) -> Option<ControlProperty> {
        match self {
            GroupCategory::LegL => Some(ControlProperty::ToeLFeature),
            GroupCategory::LegR => Some(ControlProperty::ToeRFeature),
            _ => None,
        }
    }

    /// Leg-feature (D bone) control of a leg group.
    pub fn leg_feature_control(&self) -> Option<ControlProperty> {
        match self {
            GroupCategory::LegL => Some(ControlProperty::LegLFeature),
            GroupCategory::LegR => Some(ControlProperty::LegRFeature),
            _ => None,
        }
    }
}

impl std::fmt::Display for GroupCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Bind Strategies
// =============================================================================

/// How a standard bone follows its control-rig counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindStrategy {
    /// No constraint is authored.
    #[default]
    None,
    /// Copy the full pose; limb chains blend between IK and FK sources.
    CopyPose,
    /// Copy the transform relative to the parent.
    CopyParentOffset,
    /// Copy the local transform.
    CopyLocal,
    /// Copy location and rotation separately, ignoring spine length.
    CopySpineBlend,
    /// Toe follow, gated by the toe feature control.
    CopyToe,
    /// Eye aim, authored once per face group.
    CopyEyeAim,
    /// World-space copy of the root.
    CopyRoot,
    /// Leg deform (D bone) follow, gated by the leg feature control.
    CopyLegDDeform,
}

impl BindStrategy {
    /// Returns true if this strategy authors constraints.
    pub fn authors_constraints(&self) -> bool {
        !matches!(self, BindStrategy::None)
    }
}

// =============================================================================
// Bind Descriptors
// =============================================================================

/// Binding rule of one standard bone for one rig variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BindDescriptor {
    /// The standard bone being bound.
    pub entry: CatalogEntry,
    /// Control bone that takes over the standard name (the animator's handle).
    pub control_bone_name: Option<&'static str>,
    /// Rig-generated bone whose pose the standard bone follows.
    pub generated_bone_name: Option<&'static str>,
    /// Binding region.
    pub group: GroupCategory,
    /// Binding strategy.
    pub strategy: BindStrategy,
}

impl BindDescriptor {
    /// Creates a descriptor.
    pub const fn new(
        entry: CatalogEntry,
        control_bone_name: Option<&'static str>,
        generated_bone_name: Option<&'static str>,
        group: GroupCategory,
        strategy: BindStrategy,
    ) -> Self {
        Self {
            entry,
            control_bone_name,
            generated_bone_name,
            group,
            strategy,
        }
    }

    /// Standard bone name of this descriptor.
    pub fn standard_name(&self) -> &'static str {
        self.entry.standard_name
    }

    /// Bone the standard bone copies from: the generated bone when present,
    /// the control bone otherwise.
    pub fn source_bone_name(&self) -> Option<&'static str> {
        self.generated_bone_name.or(self.control_bone_name)
    }

    /// Control-rig bones referenced by this descriptor.
    pub fn referenced_bones(&self) -> impl Iterator<Item = &'static str> {
        self.control_bone_name
            .into_iter()
            .chain(self.generated_bone_name)
    }
}

/// Returns the descriptors of one group, in table order.
pub fn descriptors_in_group(
    descriptors: &[BindDescriptor],
    group: GroupCategory,
) -> impl Iterator<Item = &BindDescriptor> {
    descriptors.iter().filter(move |d| d.group == group)
}

/// Looks up the descriptor of a standard bone.
pub fn find_descriptor<'a>(
    descriptors: &'a [BindDescriptor],
    standard_name: &str,
) -> Option<&'a BindDescriptor> {
    descriptors
        .iter()
        .find(|d| d.entry.standard_name == standard_name)
}
