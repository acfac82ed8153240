//! Host armature interface.
//!
//! The engine never owns the scene. Every operation takes an explicit handle
//! to an [`ArmatureHost`]: one armature object carrying both the standard
//! skeleton and the control rig, its bone graph, per-bone constraint stacks
//! and scalar custom properties.

use glam::Vec3;
use mmdbind_spec::{DataPath, PropertySpec};
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::HostResult;

/// Rest geometry and parent of one bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditBone {
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
    /// Roll around the bone axis, in radians.
    #[serde(default)]
    pub roll: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl EditBone {
    /// Creates an unparented bone.
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3) -> Self {
        Self {
            name: name.into(),
            head,
            tail,
            roll: 0.0,
            parent: None,
        }
    }

    /// Head to tail vector.
    pub fn vector(&self) -> Vec3 {
        self.tail - self.head
    }

    pub fn length(&self) -> f32 {
        self.vector().length()
    }
}

/// Armature object the engine binds.
///
/// Lookups of unknown bones return empty results; mutations of unknown bones
/// fail with [`HostError::UnknownBone`](crate::error::HostError::UnknownBone).
pub trait ArmatureHost {
    /// Name of the armature object, used as driver and constraint target.
    fn object_name(&self) -> &str;

    /// Names of all bones.
    fn bone_names(&self) -> Vec<String>;

    fn bone(&self, name: &str) -> Option<&EditBone>;

    fn bone_mut(&mut self, name: &str) -> Option<&mut EditBone>;

    fn has_bone(&self, name: &str) -> bool {
        self.bone(name).is_some()
    }

    /// Returns the named bone, creating an unparented one if missing.
    fn get_or_create_bone(&mut self, name: &str) -> &mut EditBone;

    /// Re-parents a bone. Fails on unknown bones and on cycles.
    fn set_parent(&mut self, bone: &str, parent: Option<&str>) -> HostResult<()>;

    /// Direct children of a bone.
    fn children(&self, bone: &str) -> Vec<String>;

    /// Constraint stack of a bone, in evaluation order.
    fn constraints(&self, bone: &str) -> &[Constraint];

    /// Mutable constraint stack of a bone; `None` for unknown bones.
    fn constraints_mut(&mut self, bone: &str) -> Option<&mut [Constraint]>;

    /// Appends a constraint to a bone's stack and returns it. The host may
    /// rename it to keep names unique on the bone.
    fn append_constraint(&mut self, bone: &str, constraint: Constraint) -> HostResult<&mut Constraint>;

    /// Removes a constraint by name.
    fn remove_constraint(&mut self, bone: &str, name: &str) -> HostResult<Constraint>;

    /// Creates a custom property. An existing property keeps its value
    /// (clamped into the new range) and takes the new settings.
    fn create_property(&mut self, bone: &str, name: &str, spec: &PropertySpec) -> HostResult<()>;

    fn property(&self, bone: &str, name: &str) -> Option<f64>;

    fn property_spec(&self, bone: &str, name: &str) -> Option<&PropertySpec>;

    /// Writes a custom property and re-evaluates dependent drivers.
    fn set_property(&mut self, bone: &str, name: &str, value: f64) -> HostResult<()>;

    /// Reads the property a data path points at.
    fn read_data_path(&self, path: &DataPath) -> Option<f64> {
        self.property(&path.bone_name, &path.prop_name)
    }

    /// MMD standard name tagged on a bone.
    fn standard_name(&self, bone: &str) -> Option<&str>;

    fn set_standard_name(&mut self, bone: &str, standard_name: Option<&str>) -> HostResult<()>;

    /// Re-evaluates every driver. Hosts that evaluate drivers lazily may
    /// leave this empty.
    fn refresh_drivers(&mut self) {}
}
