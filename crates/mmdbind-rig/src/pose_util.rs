//! Constraint authoring layer.
//!
//! Low-level helpers that create constraints, wire their influence to custom
//! properties through drivers, and clean up what the engine authored. Every
//! constraint created here carries the [`ENGINE_PREFIX`], which is how
//! [`remove_constraints`] tells engine constraints apart from hand-made ones.

use mmdbind_spec::{DataPath, PropertySpec};

use crate::constraint::{Constraint, ConstraintKind, ConstraintParams, Space};
use crate::driver::{Driver, DriverExpression, DriverVariable};
use crate::error::{BindResult, HostError, HostResult};
use crate::host::ArmatureHost;

/// Prefix of every constraint name the engine authors.
pub const ENGINE_PREFIX: &str = "mmdbind_";

/// Driver variable name used by influence drivers.
pub const INFLUENCE_VARIABLE: &str = "mmdbind_influence";

/// Driver variable name of the release gate on gated influence drivers.
pub const RELEASE_VARIABLE: &str = "mmdbind_release";

const INFLUENCE_FIELD: &str = "influence";

/// Bone a constraint copies from, and the spaces it is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindTarget<'a> {
    /// Armature object owning the subtarget bone.
    pub object: &'a str,
    /// Bone copied from.
    pub subtarget: &'a str,
    pub target_space: Space,
    pub owner_space: Space,
}

impl<'a> BindTarget<'a> {
    /// Target evaluated in the same space on both sides.
    pub fn new(object: &'a str, subtarget: &'a str, space: Space) -> Self {
        Self {
            object,
            subtarget,
            target_space: space,
            owner_space: space,
        }
    }

    pub fn with_owner_space(mut self, owner_space: Space) -> Self {
        self.owner_space = owner_space;
        self
    }
}

/// Custom property that drives a constraint's influence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfluenceSource<'a> {
    pub data_path: &'a DataPath,
    /// Drive with `1-value` instead of `+value`.
    pub invert: bool,
    /// Property that scales the influence down to zero as it goes to one.
    pub release: Option<&'a DataPath>,
}

impl<'a> InfluenceSource<'a> {
    pub fn direct(data_path: &'a DataPath) -> Self {
        Self {
            data_path,
            invert: false,
            release: None,
        }
    }

    pub fn inverted(data_path: &'a DataPath) -> Self {
        Self {
            data_path,
            invert: true,
            release: None,
        }
    }

    /// Also releases the constraint when `release` is 1.0.
    pub fn released_by(mut self, release: &'a DataPath) -> Self {
        self.release = Some(release);
        self
    }
}

// =============================================================================
// Drivers and Properties
// =============================================================================

/// Attaches a driver to `field`, replacing any driver already there.
pub fn add_driver<'c>(
    constraint: &'c mut Constraint,
    field: &str,
    variables: Vec<DriverVariable>,
    expression: DriverExpression,
) -> BindResult<&'c mut Driver> {
    let driver = Driver::new(variables, expression)?;
    Ok(constraint.driver_add(field, driver)?)
}

/// Drives the constraint influence by a custom property of `target_object`.
pub fn add_influence_driver<'c>(
    constraint: &'c mut Constraint,
    target_object: &str,
    data_path: &DataPath,
    invert: bool,
) -> BindResult<&'c mut Driver> {
    let variable = DriverVariable::new(INFLUENCE_VARIABLE, target_object, data_path.clone());
    add_driver(
        constraint,
        INFLUENCE_FIELD,
        vec![variable],
        DriverExpression::over(INFLUENCE_VARIABLE, invert),
    )
}

/// Drives the constraint influence by `data_path`, scaled by `1-release`.
/// Renders as `(1-mmdbind_release)*mmdbind_influence` or
/// `(1-mmdbind_release)*(1-mmdbind_influence)`.
pub fn add_gated_influence_driver<'c>(
    constraint: &'c mut Constraint,
    target_object: &str,
    release: &DataPath,
    data_path: &DataPath,
    invert: bool,
) -> BindResult<&'c mut Driver> {
    let variables = vec![
        DriverVariable::new(RELEASE_VARIABLE, target_object, release.clone()),
        DriverVariable::new(INFLUENCE_VARIABLE, target_object, data_path.clone()),
    ];
    let expression =
        DriverExpression::gated(RELEASE_VARIABLE, DriverExpression::over(INFLUENCE_VARIABLE, invert));
    add_driver(constraint, INFLUENCE_FIELD, variables, expression)
}

/// Removes the influence driver, then adds a new one.
pub fn update_influence_driver<'c>(
    constraint: &'c mut Constraint,
    target_object: &str,
    data_path: &DataPath,
    invert: bool,
) -> BindResult<&'c mut Driver> {
    constraint.driver_remove(INFLUENCE_FIELD);
    add_influence_driver(constraint, target_object, data_path, invert)
}

/// Creates a custom scalar property on a pose bone.
pub fn add_prop<H>(host: &mut H, bone: &str, name: &str, spec: &PropertySpec) -> HostResult<()>
where
    H: ArmatureHost + ?Sized,
{
    host.create_property(bone, name, spec)
}

// =============================================================================
// Constraints
// =============================================================================

/// Appends a constraint of `kind` to `bone`, assigning `params` in order.
///
/// Illegal assignments fail before anything is appended.
pub fn add_constraint<'h, H>(
    host: &'h mut H,
    bone: &str,
    kind: ConstraintKind,
    name: &str,
    params: &ConstraintParams,
) -> HostResult<&'h mut Constraint>
where
    H: ArmatureHost + ?Sized,
{
    if !host.has_bone(bone) {
        return Err(HostError::UnknownBone(bone.to_string()));
    }
    let mut constraint = Constraint::new(name, kind);
    for (field, value) in params.iter() {
        constraint.set_field(field, value.clone())?;
    }
    host.append_constraint(bone, constraint)
}

/// Constraints of `kind` on `bone`, in stack order.
///
/// The view borrows the host, so the stack cannot change while it is
/// iterated; it can be cloned to iterate again.
pub fn list_constraints<'h, H>(
    host: &'h H,
    bone: &str,
    kind: ConstraintKind,
) -> impl Iterator<Item = &'h Constraint> + Clone + 'h
where
    H: ArmatureHost + ?Sized,
{
    host.constraints(bone)
        .iter()
        .filter(move |c| c.kind == kind)
}

/// Assigns `params` on every constraint of `kind` on `bone`. Returns the
/// number of constraints edited; zero when none match.
///
/// Every assignment is checked against `kind` first, so an illegal one
/// leaves the whole stack unchanged.
pub fn edit_constraints<H>(
    host: &mut H,
    bone: &str,
    kind: ConstraintKind,
    params: &ConstraintParams,
) -> HostResult<usize>
where
    H: ArmatureHost + ?Sized,
{
    let mut scratch = Constraint::new(ENGINE_PREFIX, kind);
    for (field, value) in params.iter() {
        scratch.set_field(field, value.clone())?;
    }

    let Some(constraints) = host.constraints_mut(bone) else {
        return Ok(0);
    };
    let mut edited = 0;
    for constraint in constraints.iter_mut().filter(|c| c.kind == kind) {
        for (field, value) in params.iter() {
            constraint.set_field(field, value.clone())?;
        }
        edited += 1;
    }
    Ok(edited)
}

fn add_targeted<'h, H>(
    host: &'h mut H,
    bone: &str,
    kind: ConstraintKind,
    name: &str,
    target: &BindTarget<'_>,
    influence: Option<InfluenceSource<'_>>,
    extra: &ConstraintParams,
) -> BindResult<&'h mut Constraint>
where
    H: ArmatureHost + ?Sized,
{
    let mut params = ConstraintParams::new()
        .with("target", target.object)
        .with("subtarget", target.subtarget)
        .with("target_space", target.target_space)
        .with("owner_space", target.owner_space);
    for (field, value) in extra.iter() {
        params = params.with(field, value.clone());
    }

    let constraint = add_constraint(host, bone, kind, name, &params)?;
    match influence {
        Some(InfluenceSource {
            data_path,
            invert,
            release: Some(release),
        }) => {
            add_gated_influence_driver(constraint, target.object, release, data_path, invert)?;
        }
        Some(source) => {
            add_influence_driver(constraint, target.object, source.data_path, source.invert)?;
        }
        None => {}
    }
    Ok(constraint)
}

/// Adds `mmdbind_copy_transforms`.
pub fn add_copy_transforms<'h, H>(
    host: &'h mut H,
    bone: &str,
    target: &BindTarget<'_>,
    influence: Option<InfluenceSource<'_>>,
    extra: &ConstraintParams,
) -> BindResult<&'h mut Constraint>
where
    H: ArmatureHost + ?Sized,
{
    let name = format!("{}copy_transforms", ENGINE_PREFIX);
    add_targeted(host, bone, ConstraintKind::CopyTransforms, &name, target, influence, extra)
}

/// Adds `mmdbind_copy_rotation`.
pub fn add_copy_rotation<'h, H>(
    host: &'h mut H,
    bone: &str,
    target: &BindTarget<'_>,
    influence: Option<InfluenceSource<'_>>,
    extra: &ConstraintParams,
) -> BindResult<&'h mut Constraint>
where
    H: ArmatureHost + ?Sized,
{
    let name = format!("{}copy_rotation", ENGINE_PREFIX);
    add_targeted(host, bone, ConstraintKind::CopyRotation, &name, target, influence, extra)
}

/// Adds `mmdbind_copy_location`.
pub fn add_copy_location<'h, H>(
    host: &'h mut H,
    bone: &str,
    target: &BindTarget<'_>,
    influence: Option<InfluenceSource<'_>>,
    extra: &ConstraintParams,
) -> BindResult<&'h mut Constraint>
where
    H: ArmatureHost + ?Sized,
{
    let name = format!("{}copy_location", ENGINE_PREFIX);
    add_targeted(host, bone, ConstraintKind::CopyLocation, &name, target, influence, extra)
}

/// Adds `mmdbind_copy_scale`.
pub fn add_copy_scale<'h, H>(
    host: &'h mut H,
    bone: &str,
    target: &BindTarget<'_>,
    influence: Option<InfluenceSource<'_>>,
    extra: &ConstraintParams,
) -> BindResult<&'h mut Constraint>
where
    H: ArmatureHost + ?Sized,
{
    let name = format!("{}copy_scale", ENGINE_PREFIX);
    add_targeted(host, bone, ConstraintKind::CopyScale, &name, target, influence, extra)
}

/// Adds `mmdbind_ik` with the given chain length and solver iterations.
#[allow(clippy::too_many_arguments)]
pub fn add_ik<'h, H>(
    host: &'h mut H,
    bone: &str,
    target: &BindTarget<'_>,
    chain_count: u32,
    iterations: u32,
    influence: Option<InfluenceSource<'_>>,
    extra: &ConstraintParams,
) -> BindResult<&'h mut Constraint>
where
    H: ArmatureHost + ?Sized,
{
    let name = format!("{}ik", ENGINE_PREFIX);
    let mut params = ConstraintParams::new()
        .with("chain_count", i64::from(chain_count))
        .with("iterations", i64::from(iterations));
    for (field, value) in extra.iter() {
        params = params.with(field, value.clone());
    }
    add_targeted(host, bone, ConstraintKind::Ik, &name, target, influence, &params)
}

// =============================================================================
// Removal
// =============================================================================

/// Returns true if the engine authored this constraint.
pub fn is_engine_constraint(constraint: &Constraint) -> bool {
    constraint.name.starts_with(ENGINE_PREFIX)
}

/// Removes every engine-authored constraint from `bones`. Hand-made
/// constraints stay; unknown bones are skipped. Returns the number removed.
pub fn remove_constraints<H, I, S>(host: &mut H, bones: I) -> HostResult<usize>
where
    H: ArmatureHost + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut removed = 0;
    for bone in bones {
        let bone = bone.as_ref();
        if !host.has_bone(bone) {
            log::debug!("no bone '{}' to clean up", bone);
            continue;
        }
        let names: Vec<String> = host
            .constraints(bone)
            .iter()
            .filter(|c| is_engine_constraint(c))
            .map(|c| c.name.clone())
            .collect();
        for name in names {
            host.remove_constraint(bone, &name)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ParamValue;
    use crate::memory::MemoryArmature;
    use glam::Vec3;
    use pretty_assertions::assert_eq;

    fn armature() -> MemoryArmature {
        MemoryArmature::new("Armature")
            .with_bone("hand", Vec3::ZERO, Vec3::X, None)
            .with_bone("hand_ik", Vec3::ZERO, Vec3::X, None)
            .with_bone("hand_fk", Vec3::ZERO, Vec3::X, None)
            .with_property("props", "ik_fk", 0.0)
    }

    fn ik_fk() -> DataPath {
        DataPath::new("props", "ik_fk")
    }

    #[test]
    fn test_add_constraint_applies_params() {
        let mut arm = armature();
        let params = ConstraintParams::new()
            .with("subtarget", "hand_ik")
            .with("mix_mode", "ADD");
        let c = add_constraint(&mut arm, "hand", ConstraintKind::CopyRotation, "c", &params)
            .unwrap();
        assert_eq!(c.subtarget.as_deref(), Some("hand_ik"));
        assert_eq!(c.field("mix_mode"), Some(ParamValue::from("ADD")));
    }

    #[test]
    fn test_add_constraint_rejects_illegal_field() {
        let mut arm = armature();
        let params = ConstraintParams::new().with("chain_count", 2);
        let err =
            add_constraint(&mut arm, "hand", ConstraintKind::CopyRotation, "c", &params).unwrap_err();
        assert!(matches!(err, HostError::InvalidField { .. }));
        assert!(arm.constraints("hand").is_empty());

        let err = add_constraint(
            &mut arm,
            "missing",
            ConstraintKind::CopyRotation,
            "c",
            &ConstraintParams::new(),
        )
        .unwrap_err();
        assert!(matches!(err, HostError::UnknownBone(_)));
    }

    #[test]
    fn test_influence_driver_replaced_not_duplicated() {
        let mut arm = armature();
        let target = BindTarget::new("Armature", "hand_ik", Space::Pose);
        let c = add_copy_transforms(&mut arm, "hand", &target, None, &ConstraintParams::new())
            .unwrap();
        add_influence_driver(c, "Armature", &ik_fk(), false).unwrap();
        add_influence_driver(c, "Armature", &ik_fk(), true).unwrap();
        assert_eq!(c.drivers.len(), 1);
        assert_eq!(
            c.driver("influence").map(|d| d.expression.to_string()),
            Some("1-mmdbind_influence".to_string())
        );

        update_influence_driver(c, "Armature", &ik_fk(), false).unwrap();
        assert_eq!(c.drivers.len(), 1);
        assert!(!c.driver("influence").unwrap().expression.is_inverted());
    }

    #[test]
    fn test_add_ik_sets_chain() {
        let mut arm = armature();
        let target = BindTarget::new("Armature", "hand_ik", Space::World);
        let c = add_ik(&mut arm, "hand", &target, 2, 200, None, &ConstraintParams::new()).unwrap();
        assert_eq!(c.name, "mmdbind_ik");
        assert_eq!(c.field("chain_count"), Some(ParamValue::Int(2)));
        assert_eq!(c.field("iterations"), Some(ParamValue::Int(200)));
    }

    #[test]
    fn test_copy_helpers_wire_influence() {
        let mut arm = armature();
        let path = ik_fk();
        let ik = BindTarget::new("Armature", "hand_ik", Space::Pose);
        let fk = BindTarget::new("Armature", "hand_fk", Space::Local);
        add_copy_transforms(
            &mut arm,
            "hand",
            &ik,
            Some(InfluenceSource::inverted(&path)),
            &ConstraintParams::new(),
        )
        .unwrap();
        add_copy_rotation(
            &mut arm,
            "hand",
            &fk,
            Some(InfluenceSource::direct(&path)),
            &ConstraintParams::new(),
        )
        .unwrap();

        arm.set_property("props", "ik_fk", 1.0).unwrap();
        let influences: Vec<f64> = arm.constraints("hand").iter().map(|c| c.influence).collect();
        assert_eq!(influences, vec![0.0, 1.0]);
    }

    #[test]
    fn test_list_and_edit_constraints() {
        let mut arm = armature();
        let target = BindTarget::new("Armature", "hand_ik", Space::Local);
        let none = ConstraintParams::new();
        add_copy_rotation(&mut arm, "hand", &target, None, &none).unwrap();
        add_copy_location(&mut arm, "hand", &target, None, &none).unwrap();
        add_copy_rotation(&mut arm, "hand", &target, None, &none).unwrap();

        let view = list_constraints(&arm, "hand", ConstraintKind::CopyRotation);
        assert_eq!(view.clone().count(), 2);
        let names: Vec<_> = view.map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["mmdbind_copy_rotation", "mmdbind_copy_rotation.001"]);

        let edited = edit_constraints(
            &mut arm,
            "hand",
            ConstraintKind::CopyRotation,
            &ConstraintParams::new().with("mix_mode", "ADD"),
        )
        .unwrap();
        assert_eq!(edited, 2);
        assert_eq!(
            edit_constraints(&mut arm, "hand", ConstraintKind::Ik, &none).unwrap(),
            0
        );
        assert_eq!(
            edit_constraints(&mut arm, "missing", ConstraintKind::Ik, &none).unwrap(),
            0
        );
    }

    #[test]
    fn test_edit_constraints_is_all_or_nothing() {
        let mut arm = armature();
        let target = BindTarget::new("Armature", "hand_ik", Space::Local);
        let none = ConstraintParams::new();
        add_copy_rotation(&mut arm, "hand", &target, None, &none).unwrap();
        add_copy_rotation(&mut arm, "hand", &target, None, &none).unwrap();
        let before = arm.constraints("hand").to_vec();

        let params = ConstraintParams::new()
            .with("mix_mode", "ADD")
            .with("influence", 0.5)
            .with("chain_count", 2);
        let err = edit_constraints(&mut arm, "hand", ConstraintKind::CopyRotation, &params)
            .unwrap_err();
        assert!(matches!(err, HostError::InvalidField { .. }));
        assert_eq!(arm.constraints("hand"), before.as_slice());
    }

    #[test]
    fn test_gated_influence_driver_multiplies_release_and_switch() {
        let mut arm = armature().with_property("props", "bind", 0.0);
        let path = ik_fk();
        let bind = DataPath::new("props", "bind");
        let ik = BindTarget::new("Armature", "hand_ik", Space::Pose);
        let fk = BindTarget::new("Armature", "hand_fk", Space::Local);
        let none = ConstraintParams::new();
        add_copy_transforms(
            &mut arm,
            "hand",
            &ik,
            Some(InfluenceSource::inverted(&path).released_by(&bind)),
            &none,
        )
        .unwrap();
        add_copy_rotation(
            &mut arm,
            "hand",
            &fk,
            Some(InfluenceSource::direct(&path).released_by(&bind)),
            &none,
        )
        .unwrap();

        let expressions: Vec<String> = arm
            .constraints("hand")
            .iter()
            .filter_map(|c| c.driver("influence"))
            .map(|d| d.expression.to_string())
            .collect();
        assert_eq!(
            expressions,
            vec![
                "(1-mmdbind_release)*(1-mmdbind_influence)".to_string(),
                "(1-mmdbind_release)*mmdbind_influence".to_string(),
            ]
        );

        let influences = |arm: &MemoryArmature| -> Vec<f64> {
            arm.constraints("hand").iter().map(|c| c.influence).collect()
        };
        arm.set_property("props", "ik_fk", 0.25).unwrap();
        assert_eq!(influences(&arm), vec![0.75, 0.25]);
        arm.set_property("props", "bind", 1.0).unwrap();
        assert_eq!(influences(&arm), vec![0.0, 0.0]);
        arm.set_property("props", "bind", 0.5).unwrap();
        assert_eq!(influences(&arm), vec![0.375, 0.125]);
    }

    #[test]
    fn test_remove_constraints_only_removes_engine_constraints() {
        let mut arm = armature();
        let target = BindTarget::new("Armature", "hand_ik", Space::Local);
        add_copy_rotation(&mut arm, "hand", &target, None, &ConstraintParams::new()).unwrap();
        add_constraint(
            &mut arm,
            "hand",
            ConstraintKind::LimitRotation,
            "Limit Rotation",
            &ConstraintParams::new(),
        )
        .unwrap();

        let removed = remove_constraints(&mut arm, ["hand", "hand_ik", "missing"]).unwrap();
        assert_eq!(removed, 1);
        let names: Vec<_> = arm.constraints("hand").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Limit Rotation"]);

        assert_eq!(remove_constraints(&mut arm, ["hand"]).unwrap(), 0);
    }

    #[test]
    fn test_add_prop() {
        let mut arm = armature();
        add_prop(&mut arm, "hand", "stretch", &PropertySpec::factor().with_default(1.0)).unwrap();
        assert_eq!(arm.property("hand", "stretch"), Some(1.0));
        assert!(add_prop(&mut arm, "missing", "x", &PropertySpec::factor()).is_err());
    }
}
