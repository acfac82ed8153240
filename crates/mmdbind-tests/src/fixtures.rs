//! Test fixture utilities for creating synthetic armatures.

use std::collections::BTreeSet;

use glam::Vec3;
use mmdbind_rig::{ArmatureHost, MemoryArmature, RichArmature};
use mmdbind_spec::CATALOG;

/// Object name of every fixture armature.
pub const OBJECT_NAME: &str = "Armature";

const BONE_LENGTH: f32 = 0.1;

/// Builder for an armature carrying both the standard skeleton and the
/// control rig of one variant.
///
/// By default every standard bone, every bone the variant's descriptors
/// reference, the face bones, the native control properties (all `0.0`)
/// and the property storage bone are present.
pub struct RigFixture<R> {
    rig: R,
    face: bool,
    helper_controls: bool,
    missing: BTreeSet<String>,
    values: Vec<(String, String, f64)>,
}

impl<R: RichArmature> RigFixture<R> {
    /// Create a complete fixture for a rig variant.
    pub fn new(rig: R) -> Self {
        Self {
            rig,
            face: true,
            helper_controls: true,
            missing: BTreeSet::new(),
            values: Vec::new(),
        }
    }

    /// Include the face bones.
    pub fn with_face(mut self) -> Self {
        self.face = true;
        self
    }

    /// Leave out the face bones, even where descriptors reference them.
    pub fn without_face(mut self) -> Self {
        self.face = false;
        self
    }

    /// Leave out the controls control setup creates (center, groove and the
    /// eye controls), so the bind pass has to create them.
    pub fn without_helper_controls(mut self) -> Self {
        self.helper_controls = false;
        self
    }

    /// Leave out one bone.
    pub fn without_bone(mut self, name: &str) -> Self {
        self.missing.insert(name.to_string());
        self
    }

    /// Set a native control property to a value other than `0.0`.
    pub fn with_value(mut self, bone: &str, prop: &str, value: f64) -> Self {
        self.values.push((bone.to_string(), prop.to_string(), value));
        self
    }

    fn skipped_bones(&self) -> BTreeSet<&'static str> {
        let mut skipped = BTreeSet::new();
        if !self.face {
            skipped.extend(self.rig.face_bones().iter().copied());
        }
        if !self.helper_controls {
            if let Some(torso) = self.rig.torso_controls() {
                skipped.extend([torso.center, torso.groove]);
            }
            if let Some(eyes) = self.rig.eye_controls() {
                skipped.extend([eyes.left, eyes.right, eyes.both]);
            }
        }
        skipped
    }

    /// Build the armature.
    pub fn build(&self) -> MemoryArmature {
        let skipped = self.skipped_bones();
        let present = |name: &str| !skipped.contains(name) && !self.missing.contains(name);
        let root = self
            .rig
            .torso_controls()
            .map(|torso| torso.root)
            .filter(|root| present(*root));

        let mut armature = MemoryArmature::new(OBJECT_NAME);
        if let Some(root) = root {
            armature.add_bone(root, Vec3::ZERO, Vec3::Y * BONE_LENGTH, None);
        }

        for (index, entry) in CATALOG.iter().enumerate() {
            let head = Vec3::new(0.0, 0.0, index as f32 * BONE_LENGTH);
            let tail = head + Vec3::Z * BONE_LENGTH;
            if present(entry.standard_name) {
                armature.add_bone(entry.standard_name, head, tail, None);
            }
        }

        for (index, descriptor) in self.rig.descriptors().iter().enumerate() {
            let head = Vec3::new(1.0, 0.0, index as f32 * BONE_LENGTH);
            let tail = head + Vec3::Z * BONE_LENGTH;
            for bone in descriptor.referenced_bones() {
                if present(bone) && Some(bone) != root && !armature.has_bone(bone) {
                    armature.add_bone(bone, head, tail, root);
                }
            }
        }

        for &bone in self.rig.face_bones() {
            if present(bone) && !armature.has_bone(bone) {
                armature.add_bone(bone, Vec3::new(2.0, 0.0, 1.5), Vec3::new(2.0, 0.0, 1.6), root);
            }
        }

        let storage = self.rig.prop_storage_bone();
        if present(storage) && !armature.has_bone(storage) {
            armature.add_bone(storage, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.2, 1.0), root);
        }

        for &(_, bone, prop) in self.rig.control_table() {
            if present(bone) {
                armature = armature.with_property(bone, prop, 0.0);
            }
        }
        for (bone, prop, value) in &self.values {
            armature = armature.with_property(bone, prop, *value);
        }
        armature
    }
}
