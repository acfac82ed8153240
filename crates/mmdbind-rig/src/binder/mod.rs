//! Rich armature binder.
//!
//! A [`RichArmature`] describes one control-rig variant: which control-rig
//! bones stand in for each standard bone, where the rig keeps its switches,
//! and which bones make up its face. [`Binder`] runs the bind pass over any
//! variant:
//!
//! 1. create missing helper controls (center, groove, eye controls)
//! 2. move the standard names onto the control bones
//! 3. create the engine-owned switch properties
//! 4. per group, remove engine constraints and author new ones
//!
//! Rebinding is idempotent: every group starts by removing what the previous
//! pass authored.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use mmdbind_spec::catalog::{self, CatalogEntry};
use mmdbind_spec::descriptor::{descriptors_in_group, find_descriptor};
use mmdbind_spec::{
    BindConfig, BindDescriptor, BindStrategy, ControlProperty, ControlRegistry, DataPath,
    GroupCategory,
};

use crate::constraint::{ConstraintParams, Space};
use crate::error::{BindResult, HostResult};
use crate::geometry::{fit_bone_rotation, insert_bone, midpoint};
use crate::host::ArmatureHost;
use crate::pose_util::{self, BindTarget, InfluenceSource};
use crate::report::{BindReport, BindState, SkipReason, SkippedBinding};

macro_rules! bind {
    ($entry:ident, $control:expr, $generated:expr, $group:ident, $strategy:ident) => {
        mmdbind_spec::BindDescriptor::new(
            mmdbind_spec::catalog::$entry,
            $control,
            $generated,
            mmdbind_spec::GroupCategory::$group,
            mmdbind_spec::BindStrategy::$strategy,
        )
    };
}

mod accessors;
mod autorig;
mod rigify;


pub use autorig::AutoRigPro;
pub use rigify::Rigify;

/// Name of the custom property backing an engine-owned control.
pub fn engine_prop_name(control: ControlProperty) -> Option<&'static str> {
    match control {
        ControlProperty::BindEnable => Some("mmdbind_bind"),
        ControlProperty::EyeTracking => Some("mmdbind_eye"),
        ControlProperty::LegLFeature => Some("mmdbind_leg_l"),
        ControlProperty::LegRFeature => Some("mmdbind_leg_r"),
        ControlProperty::ToeLFeature => Some("mmdbind_toe_l"),
        ControlProperty::ToeRFeature => Some("mmdbind_toe_r"),
        _ => None,
    }
}

// =============================================================================
// Rig Variants
// =============================================================================

/// Control bones that drive the eyes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeControls {
    pub left: &'static str,
    pub right: &'static str,
    /// Shared control both eyes follow additively.
    pub both: &'static str,
}

/// Root of the control rig and the center/groove controls under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TorsoControls {
    pub root: &'static str,
    pub center: &'static str,
    pub groove: &'static str,
}

/// A control-rig variant the standard skeleton can be bound to.
pub trait RichArmature {
    /// Short identifier of the variant.
    fn variant_name(&self) -> &'static str;

    /// One descriptor per catalog entry.
    fn descriptors(&self) -> &'static [BindDescriptor];

    /// Native controls as `(control, bone, property)` rows.
    fn control_table(&self) -> &'static [(ControlProperty, &'static str, &'static str)];

    /// Bone that stores the engine-owned properties.
    fn prop_storage_bone(&self) -> &'static str;

    /// Bones that must all exist for the rig to count as having a face.
    fn face_bones(&self) -> &'static [&'static str];

    fn has_face_bones(&self, host: &dyn ArmatureHost) -> bool {
        self.face_bones().iter().all(|bone| host.has_bone(bone))
    }

    /// Control bone standing in for a standard bone.
    fn control_bone(&self, entry: &CatalogEntry) -> Option<&'static str> {
        find_descriptor(self.descriptors(), entry.standard_name).and_then(|d| d.control_bone_name)
    }

    fn eye_controls(&self) -> Option<EyeControls> {
        Some(EyeControls {
            left: self.control_bone(&catalog::EYE_L)?,
            right: self.control_bone(&catalog::EYE_R)?,
            both: self.control_bone(&catalog::EYES)?,
        })
    }

    fn torso_controls(&self) -> Option<TorsoControls> {
        Some(TorsoControls {
            root: self.control_bone(&catalog::ROOT_PARENT)?,
            center: self.control_bone(&catalog::CENTER)?,
            groove: self.control_bone(&catalog::GROOVE)?,
        })
    }
}

/// Result of [`Binder::assign_standard_bone_names`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameAssignment {
    /// Number of standard names written.
    pub assigned: usize,
    /// Overrides whose target bone does not exist.
    pub skipped: Vec<SkippedBinding>,
}

// =============================================================================
// Binder
// =============================================================================

/// Binds the standard skeleton of an armature to one rig variant.
#[derive(Debug, Clone, Default)]
pub struct Binder<R> {
    rig: R,
}

impl<R: RichArmature> Binder<R> {
    pub fn new(rig: R) -> Self {
        Self { rig }
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    /// Controls this armature supports.
    ///
    /// Native controls come from the variant's table, engine-owned controls
    /// live on the storage bone. Eye tracking is dropped when the armature
    /// has no face bones, and any control whose owner bone is missing is
    /// dropped too.
    pub fn registry(&self, host: &dyn ArmatureHost) -> ControlRegistry {
        let mut registry = ControlRegistry::from_table(self.rig.control_table());
        let storage = self.rig.prop_storage_bone();
        for control in ControlProperty::ENGINE_OWNED {
            if let Some(prop) = engine_prop_name(control) {
                registry.insert(control, DataPath::new(storage, prop));
            }
        }
        if !self.rig.has_face_bones(host) {
            registry.remove(ControlProperty::EyeTracking);
        }
        registry.retain(|_, path| host.has_bone(&path.bone_name));
        registry
    }

    /// Storage location of a control, or `None` when unsupported.
    pub fn resolve(&self, host: &dyn ArmatureHost, control: ControlProperty) -> Option<DataPath> {
        self.registry(host).resolve(control).cloned()
    }

    /// Current value of a control.
    pub fn get(&self, host: &dyn ArmatureHost, control: ControlProperty) -> Option<f64> {
        let path = self.resolve(host, control)?;
        host.read_data_path(&path)
    }

    /// Writes a control. Unsupported controls are ignored.
    pub fn set(
        &self,
        host: &mut dyn ArmatureHost,
        control: ControlProperty,
        value: f64,
    ) -> HostResult<()> {
        match self.resolve(&*host, control) {
            Some(path) => host.set_property(&path.bone_name, &path.prop_name, value),
            None => {
                debug!(
                    "{} rig has no '{}' control; write ignored",
                    self.rig.variant_name(),
                    control
                );
                Ok(())
            }
        }
    }

    /// Standard bones and eye controls that may carry engine constraints.
    fn managed_bones(&self) -> Vec<&'static str> {
        let mut bones: Vec<&'static str> = self
            .rig
            .descriptors()
            .iter()
            .filter(|d| d.strategy.authors_constraints())
            .map(|d| d.standard_name())
            .collect();
        if let Some(eyes) = self.rig.eye_controls() {
            bones.extend([eyes.left, eyes.right]);
        }
        bones
    }

    /// Whether a previous pass left engine constraints on the armature.
    pub fn bind_state(&self, host: &dyn ArmatureHost) -> BindState {
        let bound = self.managed_bones().iter().any(|bone| {
            host.constraints(bone)
                .iter()
                .any(pose_util::is_engine_constraint)
        });
        if bound {
            BindState::Bound
        } else {
            BindState::Uninitialized
        }
    }

    // =========================================================================
    // Names and Properties
    // =========================================================================

    /// Moves the standard names onto the control bones.
    ///
    /// Every managed name is first cleared from whichever bone carries it,
    /// then written to its control bone; `overrides` replace the variant's
    /// mapping. Names whose bone is missing are not assigned anywhere.
    pub fn assign_standard_bone_names(
        &self,
        host: &mut dyn ArmatureHost,
        overrides: &BTreeMap<String, String>,
    ) -> HostResult<NameAssignment> {
        let mut mapping: BTreeMap<&str, &str> = self
            .rig
            .descriptors()
            .iter()
            .filter_map(|d| d.control_bone_name.map(|bone| (d.standard_name(), bone)))
            .collect();
        for (standard_name, bone) in overrides {
            mapping.insert(standard_name.as_str(), bone.as_str());
        }

        for bone in host.bone_names() {
            let managed = host
                .standard_name(&bone)
                .is_some_and(|name| mapping.contains_key(name));
            if managed {
                host.set_standard_name(&bone, None)?;
            }
        }

        let mut result = NameAssignment::default();
        for (standard_name, bone) in &mapping {
            if !host.has_bone(bone) {
                if overrides.get(*standard_name).map(String::as_str) == Some(*bone) {
                    warn!(
                        "name override '{}' -> '{}' targets a missing bone; skipped",
                        standard_name, bone
                    );
                    result.skipped.push(SkippedBinding {
                        standard_name: standard_name.to_string(),
                        reason: SkipReason::OverrideTargetMissing(bone.to_string()),
                    });
                } else {
                    debug!("no bone '{}' to carry '{}'", bone, standard_name);
                }
                continue;
            }
            host.set_standard_name(bone, Some(*standard_name))?;
            result.assigned += 1;
        }
        Ok(result)
    }

    /// Creates the engine-owned switch properties on `owner_bone`. Controls
    /// the armature cannot resolve are skipped; existing values are kept.
    pub fn create_props(
        &self,
        host: &mut dyn ArmatureHost,
        owner_bone: &str,
    ) -> HostResult<Vec<ControlProperty>> {
        let registry = self.registry(&*host);
        let mut created = Vec::new();
        for control in ControlProperty::ENGINE_OWNED {
            let Some(path) = registry.resolve(control) else {
                debug!("'{}' not supported; property not created", control);
                continue;
            };
            pose_util::add_prop(host, owner_bone, &path.prop_name, &control.property_spec())?;
            created.push(control);
        }
        Ok(created)
    }

    // =========================================================================
    // Control Setup
    // =========================================================================

    /// Creates the eye controls when missing: one per eye on top of the
    /// standard eye, and a shared control between them oriented like the
    /// standard both-eyes bone. Returns the names of created bones.
    pub fn setup_eye_controls(&self, host: &mut dyn ArmatureHost) -> HostResult<Vec<String>> {
        let mut created = Vec::new();
        let Some(eyes) = self.rig.eye_controls() else {
            return Ok(created);
        };
        let head = self
            .rig
            .control_bone(&catalog::HEAD)
            .filter(|bone| host.has_bone(bone));

        for (entry, control) in [(catalog::EYE_L, eyes.left), (catalog::EYE_R, eyes.right)] {
            if host.has_bone(control) {
                continue;
            }
            let Some(reference) = host.bone(entry.standard_name).cloned() else {
                debug!(
                    "cannot place '{}': standard bone '{}' missing",
                    control, entry.standard_name
                );
                continue;
            };
            let bone = host.get_or_create_bone(control);
            bone.head = reference.head;
            bone.tail = reference.tail;
            bone.roll = reference.roll;
            host.set_parent(control, head)?;
            created.push(control.to_string());
        }

        if !host.has_bone(eyes.both) {
            let left = host.bone(eyes.left).cloned();
            let right = host.bone(eyes.right).cloned();
            if let (Some(left), Some(right)) = (left, right) {
                let bone = host.get_or_create_bone(eyes.both);
                bone.head = midpoint(left.head, right.head);
                bone.tail = midpoint(left.tail, right.tail);
                if host.has_bone(catalog::EYES.standard_name) {
                    fit_bone_rotation(host, eyes.both, catalog::EYES.standard_name)?;
                }
                host.set_parent(eyes.both, head)?;
                created.push(eyes.both.to_string());
            }
        }
        Ok(created)
    }

    /// Creates the center and groove controls when missing, spliced in under
    /// the rig root and the center respectively. Returns the names of
    /// created bones.
    pub fn setup_torso_controls(&self, host: &mut dyn ArmatureHost) -> HostResult<Vec<String>> {
        let mut created = Vec::new();
        let Some(torso) = self.rig.torso_controls() else {
            return Ok(created);
        };

        let steps = [
            (catalog::CENTER, torso.center, torso.root),
            (catalog::GROOVE, torso.groove, torso.center),
        ];
        for (entry, control, parent) in steps {
            if host.has_bone(control) {
                continue;
            }
            // Place on the standard bone, or on the parent when there is none.
            let Some(reference) = host
                .bone(entry.standard_name)
                .or_else(|| host.bone(parent))
                .cloned()
            else {
                debug!("cannot place '{}': no '{}' bone", control, parent);
                continue;
            };
            if !host.has_bone(parent) {
                continue;
            }
            let bone = host.get_or_create_bone(control);
            bone.head = reference.head;
            bone.tail = reference.tail;
            bone.roll = reference.roll;
            insert_bone(host, control, parent)?;
            created.push(control.to_string());
        }
        Ok(created)
    }

    // =========================================================================
    // Constraints
    // =========================================================================

    /// Binds the eyes: each standard eye copies the local rotation of its
    /// eye control, and each eye control adds the rotation of the shared
    /// control. All four are released by eye tracking.
    ///
    /// Returns the number of constraints authored; skips are recorded in
    /// `report`.
    pub fn add_eye_constraints(
        &self,
        host: &mut dyn ArmatureHost,
        report: &mut BindReport,
    ) -> BindResult<usize> {
        let registry = self.registry(&*host);
        let Some(eye_path) = registry.resolve(ControlProperty::EyeTracking) else {
            report.skip(
                catalog::EYES.standard_name,
                SkipReason::UnsupportedControl(ControlProperty::EyeTracking),
            );
            return Ok(0);
        };
        let Some(eyes) = self.rig.eye_controls() else {
            for entry in [catalog::EYES, catalog::EYE_L, catalog::EYE_R] {
                if self.rig.control_bone(&entry).is_none() {
                    report.skip(entry.standard_name, SkipReason::NoControlBone);
                }
            }
            return Ok(0);
        };

        let pairs = [
            (catalog::EYE_L.standard_name, eyes.left),
            (catalog::EYE_R.standard_name, eyes.right),
        ];
        let mut ready = true;
        for (standard_name, control) in pairs {
            if !host.has_bone(standard_name) {
                report.skip(standard_name, SkipReason::MissingStandardBone);
                ready = false;
            }
            if !host.has_bone(control) {
                report.skip(standard_name, SkipReason::MissingControlBone(control.to_string()));
                ready = false;
            }
        }
        if !host.has_bone(eyes.both) {
            report.skip(
                catalog::EYES.standard_name,
                SkipReason::MissingControlBone(eyes.both.to_string()),
            );
            ready = false;
        }
        if !ready {
            return Ok(0);
        }

        let object = host.object_name().to_string();
        let release = Some(InfluenceSource::inverted(eye_path));
        let none = ConstraintParams::new();
        for (standard_name, control) in pairs {
            let target = BindTarget::new(&object, control, Space::Local);
            pose_util::add_copy_rotation(host, standard_name, &target, release, &none)?;
        }
        let additive = ConstraintParams::new().with("mix_mode", "ADD");
        for control in [eyes.left, eyes.right] {
            let target = BindTarget::new(&object, eyes.both, Space::Local);
            pose_util::add_copy_rotation(host, control, &target, release, &additive)?;
        }
        Ok(4)
    }

    fn bind_descriptor(
        &self,
        host: &mut dyn ArmatureHost,
        descriptor: &BindDescriptor,
        registry: &ControlRegistry,
        report: &mut BindReport,
    ) -> BindResult<usize> {
        let standard_name = descriptor.standard_name();
        // Eye aims are authored per group by `add_eye_constraints`.
        if matches!(descriptor.strategy, BindStrategy::None | BindStrategy::CopyEyeAim) {
            return Ok(0);
        }
        if !host.has_bone(standard_name) {
            report.skip(standard_name, SkipReason::MissingStandardBone);
            return Ok(0);
        }
        if let Some(missing) = descriptor.referenced_bones().find(|bone| !host.has_bone(bone)) {
            report.skip(standard_name, SkipReason::MissingControlBone(missing.to_string()));
            return Ok(0);
        }
        let Some(source) = descriptor.source_bone_name() else {
            debug!("'{}' has no control-rig counterpart", standard_name);
            return Ok(0);
        };

        let object = host.object_name().to_string();
        let group = descriptor.group;
        let none = ConstraintParams::new();
        let bind_path = registry.resolve(ControlProperty::BindEnable);
        let release = bind_path.map(InfluenceSource::inverted);
        let copy = |space| BindTarget::new(&object, source, space);

        match descriptor.strategy {
            BindStrategy::None | BindStrategy::CopyEyeAim => Ok(0),
            BindStrategy::CopyPose => {
                let ik_fk = group.ik_fk_control().and_then(|c| registry.resolve(c));
                match (descriptor.control_bone_name, descriptor.generated_bone_name, ik_fk) {
                    (Some(fk), Some(ik), Some(ik_fk)) if group.is_limb() && fk != ik => {
                        let ik_target = BindTarget::new(&object, ik, Space::Pose);
                        let fk_target = BindTarget::new(&object, fk, Space::Local);
                        let mut ik_source = InfluenceSource::inverted(ik_fk);
                        let mut fk_source = InfluenceSource::direct(ik_fk);
                        if let Some(bind) = bind_path {
                            ik_source = ik_source.released_by(bind);
                            fk_source = fk_source.released_by(bind);
                        }
                        pose_util::add_copy_transforms(
                            host,
                            standard_name,
                            &ik_target,
                            Some(ik_source),
                            &none,
                        )?;
                        pose_util::add_copy_rotation(
                            host,
                            standard_name,
                            &fk_target,
                            Some(fk_source),
                            &none,
                        )?;
                        Ok(2)
                    }
                    _ => {
                        pose_util::add_copy_transforms(
                            host,
                            standard_name,
                            &copy(Space::Pose),
                            release,
                            &none,
                        )?;
                        Ok(1)
                    }
                }
            }
            BindStrategy::CopyParentOffset => {
                let target = copy(Space::LocalWithParent);
                pose_util::add_copy_transforms(host, standard_name, &target, release, &none)?;
                Ok(1)
            }
            BindStrategy::CopyLocal => {
                let target = copy(Space::Local);
                pose_util::add_copy_transforms(host, standard_name, &target, release, &none)?;
                Ok(1)
            }
            BindStrategy::CopyRoot => {
                let target = copy(Space::World);
                pose_util::add_copy_transforms(host, standard_name, &target, release, &none)?;
                Ok(1)
            }
            BindStrategy::CopySpineBlend => {
                let target = copy(Space::Pose);
                pose_util::add_copy_location(host, standard_name, &target, release, &none)?;
                pose_util::add_copy_rotation(host, standard_name, &target, release, &none)?;
                Ok(2)
            }
            BindStrategy::CopyToe | BindStrategy::CopyLegDDeform => {
                let control = if descriptor.strategy == BindStrategy::CopyToe {
                    group.toe_control()
                } else {
                    group.leg_feature_control()
                };
                let Some(control) = control else {
                    debug!("'{}' is not in a leg group", standard_name);
                    return Ok(0);
                };
                let Some(path) = registry.resolve(control) else {
                    report.skip(standard_name, SkipReason::UnsupportedControl(control));
                    return Ok(0);
                };
                let target = copy(Space::Local);
                pose_util::add_copy_rotation(
                    host,
                    standard_name,
                    &target,
                    Some(InfluenceSource::inverted(path)),
                    &none,
                )?;
                Ok(1)
            }
        }
    }

    fn bind_group(
        &self,
        host: &mut dyn ArmatureHost,
        group: GroupCategory,
        registry: &ControlRegistry,
        report: &mut BindReport,
    ) -> BindResult<usize> {
        let descriptors: Vec<&BindDescriptor> =
            descriptors_in_group(self.rig.descriptors(), group).collect();

        let mut bones: Vec<&str> = descriptors.iter().map(|d| d.standard_name()).collect();
        if group == GroupCategory::Face {
            if let Some(eyes) = self.rig.eye_controls() {
                bones.extend([eyes.left, eyes.right]);
            }
        }
        report.constraints_removed += pose_util::remove_constraints(host, &bones)?;

        let mut authored = 0;
        if group == GroupCategory::Face {
            if self.rig.has_face_bones(&*host) {
                authored += self.add_eye_constraints(host, report)?;
            } else {
                for descriptor in descriptors
                    .iter()
                    .filter(|d| d.strategy == BindStrategy::CopyEyeAim)
                {
                    report.skip(descriptor.standard_name(), SkipReason::NoFaceBones);
                }
            }
        }
        for descriptor in &descriptors {
            authored += self.bind_descriptor(host, descriptor, registry, report)?;
        }
        report.authored(group, authored);
        debug!("group '{}': {} constraints authored", group, authored);
        Ok(authored)
    }

    /// Runs a full bind pass.
    pub fn bind(&self, host: &mut dyn ArmatureHost, config: &BindConfig) -> BindResult<BindReport> {
        config.validate()?;
        let state_before = self.bind_state(&*host);
        let mut report = BindReport::new(self.rig.variant_name(), state_before);
        info!(
            "binding '{}' to {} rig ({:?})",
            host.object_name(),
            self.rig.variant_name(),
            state_before
        );

        if config.setup_controls {
            report.controls_created.extend(self.setup_torso_controls(host)?);
            if config.binds_group(GroupCategory::Face) && self.rig.has_face_bones(&*host) {
                report.controls_created.extend(self.setup_eye_controls(host)?);
            }
        }

        if config.assign_names {
            let names = self.assign_standard_bone_names(host, &config.bone_name_overrides)?;
            report.names_assigned = names.assigned;
            report.skipped.extend(names.skipped);
        }

        if config.create_props {
            report.props_created = self.create_props(host, self.rig.prop_storage_bone())?;
        }

        let registry = self.registry(&*host);
        for (control, value) in &config.initial_values {
            let readable = registry
                .resolve(*control)
                .is_some_and(|path| host.read_data_path(path).is_some());
            if readable {
                self.set(host, *control, *value)?;
            } else {
                report.skip(control.as_str(), SkipReason::UnsupportedControl(*control));
            }
        }

        for group in &config.groups {
            self.bind_group(host, *group, &registry, &mut report)?;
        }
        host.refresh_drivers();

        info!(
            "bound '{}': {} constraints authored, {} removed, {} skipped",
            host.object_name(),
            report.total_authored(),
            report.constraints_removed,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Removes every engine constraint the binder may have authored.
    /// Returns the number removed.
    pub fn unbind(&self, host: &mut dyn ArmatureHost) -> HostResult<usize> {
        let removed = pose_util::remove_constraints(host, self.managed_bones())?;
        host.refresh_drivers();
        info!("unbound '{}': {} constraints removed", host.object_name(), removed);
        Ok(removed)
    }
}
