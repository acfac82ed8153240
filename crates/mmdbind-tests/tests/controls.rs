//! Control reads, writes and the influences they drive.

use mmdbind_rig::pose_util::{
    self, BindTarget, InfluenceSource, INFLUENCE_VARIABLE, RELEASE_VARIABLE,
};
use mmdbind_rig::{
    ArmatureHost, AutoRigPro, Binder, Constraint, ConstraintParams, DriverExpression,
    MemoryArmature, Rigify, Space,
};
use mmdbind_spec::{BindConfig, ControlProperty, DataPath, GroupCategory};
use mmdbind_tests::fixtures::{RigFixture, OBJECT_NAME};
use pretty_assertions::assert_eq;

fn engine_constraints<'a>(armature: &'a MemoryArmature, bone: &str) -> Vec<&'a Constraint> {
    armature
        .constraints(bone)
        .iter()
        .filter(|c| pose_util::is_engine_constraint(c))
        .collect()
}

fn influences(armature: &MemoryArmature, bone: &str) -> Vec<f64> {
    engine_constraints(armature, bone)
        .iter()
        .map(|c| c.influence)
        .collect()
}

fn bound<R: mmdbind_rig::RichArmature + Copy>(rig: R, fixture: RigFixture<R>) -> (Binder<R>, MemoryArmature) {
    let binder = Binder::new(rig);
    let mut armature = fixture.build();
    binder.bind(&mut armature, &BindConfig::new()).unwrap();
    (binder, armature)
}

// ============================================================================
// IK/FK Blending
// ============================================================================

#[test]
fn test_ik_fk_read_back_drives_influences() {
    let (binder, mut armature) = bound(
        Rigify,
        RigFixture::new(Rigify).with_value("thigh_parent.L", "IK_FK", 1.0),
    );

    assert_eq!(binder.leg_l_ik_fk(&armature), Some(1.0));
    // IK copy first, FK copy second; 1.0 selects FK.
    assert_eq!(influences(&armature, "左足"), vec![0.0, 1.0]);
    assert_eq!(influences(&armature, "右足"), vec![1.0, 0.0]);

    binder.set_leg_l_ik_fk(&mut armature, 0.0).unwrap();
    assert_eq!(binder.leg_l_ik_fk(&armature), Some(0.0));
    assert_eq!(influences(&armature, "左足"), vec![1.0, 0.0]);

    binder.set_leg_l_ik_fk(&mut armature, 0.25).unwrap();
    assert_eq!(influences(&armature, "左ひざ"), vec![0.75, 0.25]);
}

#[test]
fn test_limb_drivers_read_the_ik_fk_property() {
    let (_, armature) = bound(AutoRigPro, RigFixture::new(AutoRigPro));

    let stack = engine_constraints(&armature, "右手首");
    assert_eq!(stack.len(), 2);
    let ik = &stack[0].drivers["influence"];
    assert_eq!(
        ik.expression,
        DriverExpression::gated(
            RELEASE_VARIABLE,
            DriverExpression::Inverted(INFLUENCE_VARIABLE.to_string())
        )
    );
    assert_eq!(
        ik.expression.to_string(),
        format!("(1-{})*(1-{})", RELEASE_VARIABLE, INFLUENCE_VARIABLE)
    );
    let input = ik.input().unwrap();
    assert_eq!(input.target, OBJECT_NAME);
    assert_eq!(input.data_path, DataPath::new("c_hand_ik.r", "ik_fk_switch"));
    let release = ik.variable(RELEASE_VARIABLE).unwrap();
    assert_eq!(release.data_path, DataPath::new("c_traj", "mmdbind_bind"));

    let fk = &stack[1].drivers["influence"];
    assert_eq!(
        fk.expression.to_string(),
        format!("(1-{})*{}", RELEASE_VARIABLE, INFLUENCE_VARIABLE)
    );
    assert_eq!(stack[1].subtarget.as_deref(), Some("c_hand_fk.r"));
}

// ============================================================================
// Engine-Owned Controls
// ============================================================================

#[test]
fn test_bind_enable_releases_every_bind_constraint() {
    let (binder, mut armature) = bound(
        Rigify,
        RigFixture::new(Rigify).with_value("upper_arm_parent.R", "IK_FK", 1.0),
    );
    assert_eq!(binder.bind_enable(&armature), Some(0.0));
    assert_eq!(influences(&armature, "センター"), vec![1.0]);
    assert_eq!(influences(&armature, "上半身"), vec![1.0, 1.0]);
    assert_eq!(influences(&armature, "左腕"), vec![1.0, 0.0]);
    assert_eq!(influences(&armature, "右ひじ"), vec![0.0, 1.0]);

    binder.set_bind_enable(&mut armature, 1.0).unwrap();
    for bone in ["センター", "上半身", "左人指１", "左腕", "左ひじ", "右ひじ", "左足", "右ひざ"] {
        let released = influences(&armature, bone);
        assert!(!released.is_empty(), "{}", bone);
        assert!(released.iter().all(|&i| i == 0.0), "{}: {:?}", bone, released);
    }

    // Releasing again restores the IK/FK blend.
    binder.set_bind_enable(&mut armature, 0.0).unwrap();
    assert_eq!(influences(&armature, "左腕"), vec![1.0, 0.0]);
    assert_eq!(influences(&armature, "右ひじ"), vec![0.0, 1.0]);
}

#[test]
fn test_toe_and_leg_features_release_their_bones() {
    let (binder, mut armature) = bound(AutoRigPro, RigFixture::new(AutoRigPro));
    assert_eq!(influences(&armature, "左つま先"), vec![1.0]);
    assert_eq!(influences(&armature, "左足D"), vec![1.0]);

    binder.set_toe_l_feature(&mut armature, 1.0).unwrap();
    assert_eq!(influences(&armature, "左つま先"), vec![0.0]);
    assert_eq!(influences(&armature, "左足先EX"), vec![0.0]);
    assert_eq!(influences(&armature, "右つま先"), vec![1.0]);
    assert_eq!(influences(&armature, "左足D"), vec![1.0]);

    binder.set_leg_l_feature(&mut armature, 1.0).unwrap();
    assert_eq!(influences(&armature, "左足D"), vec![0.0]);
    assert_eq!(influences(&armature, "左足首D"), vec![0.0]);
    assert_eq!(influences(&armature, "右足D"), vec![1.0]);
}

#[test]
fn test_eye_tracking_unsupported_without_face_bones() {
    let (binder, mut armature) = bound(Rigify, RigFixture::new(Rigify).without_face());
    assert_eq!(binder.resolve(&armature, ControlProperty::EyeTracking), None);
    assert_eq!(binder.eye_tracking(&armature), None);

    // Writes to unsupported controls are ignored.
    binder.set_eye_tracking(&mut armature, 1.0).unwrap();
    assert_eq!(armature.property("torso", "mmdbind_eye"), None);
}

#[test]
fn test_eye_tracking_releases_eye_constraints() {
    let (binder, mut armature) = bound(Rigify, RigFixture::new(Rigify));
    assert_eq!(
        binder.resolve(&armature, ControlProperty::EyeTracking),
        Some(DataPath::new("torso", "mmdbind_eye"))
    );
    for bone in ["左目", "右目", "eye_fk.L", "eye_fk.R"] {
        assert_eq!(influences(&armature, bone), vec![1.0], "{}", bone);
    }

    binder.set_eye_tracking(&mut armature, 1.0).unwrap();
    for bone in ["左目", "右目", "eye_fk.L", "eye_fk.R"] {
        assert_eq!(influences(&armature, bone), vec![0.0], "{}", bone);
    }
}

#[test]
fn test_created_props_keep_existing_values() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).build();
    binder.bind(&mut armature, &BindConfig::new()).unwrap();
    binder.set_toe_r_feature(&mut armature, 0.5).unwrap();

    binder.bind(&mut armature, &BindConfig::new()).unwrap();
    assert_eq!(binder.toe_r_feature(&armature), Some(0.5));
    assert_eq!(influences(&armature, "右つま先"), vec![0.5]);
}

// ============================================================================
// Registry Coverage
// ============================================================================

#[test]
fn test_every_supported_control_is_readable() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).build();
    binder.bind(&mut armature, &BindConfig::new()).unwrap();

    let registry = binder.registry(&armature);
    assert_eq!(registry.len(), ControlProperty::ALL.len());
    for (control, path) in registry.iter() {
        assert_eq!(armature.read_data_path(path), Some(0.0), "{}", control);
        assert_eq!(binder.get(&armature, control), Some(0.0), "{}", control);
    }
}

#[test]
fn test_auto_rig_pro_lacks_some_controls() {
    let binder = Binder::new(AutoRigPro);
    let armature = RigFixture::new(AutoRigPro).build();
    for control in [
        ControlProperty::TorsoNeckFollow,
        ControlProperty::ArmLIkParent,
        ControlProperty::LegRPoleVector,
    ] {
        assert_eq!(binder.get(&armature, control), None, "{}", control);
    }
    assert_eq!(binder.torso_head_follow(&armature), Some(0.0));
    assert_eq!(
        binder.resolve(&armature, ControlProperty::ArmLPoleVector),
        Some(DataPath::new("c_arms_pole.l", "pole_parent"))
    );
}

#[test]
fn test_initial_values_are_applied() {
    let binder = Binder::new(AutoRigPro);
    let mut armature = RigFixture::new(AutoRigPro).build();
    let config = BindConfig::new()
        .with_groups([GroupCategory::ArmL, GroupCategory::ArmR])
        .with_initial_value(ControlProperty::ArmRIkFk, 1.0)
        .with_initial_value(ControlProperty::ArmLIkParent, 1.0);

    let report = binder.bind(&mut armature, &config).unwrap();
    assert_eq!(binder.arm_r_ik_fk(&armature), Some(1.0));
    assert_eq!(influences(&armature, "右ひじ"), vec![0.0, 1.0]);
    assert_eq!(report.skips_for("arm_l_ik_parent").count(), 1);
}

// ============================================================================
// Driver Authoring
// ============================================================================

#[test]
fn test_influence_driver_is_never_duplicated() {
    let mut armature = MemoryArmature::new(OBJECT_NAME)
        .with_bone("左腕", glam::Vec3::ZERO, glam::Vec3::X, None)
        .with_bone("upper_arm_fk.L", glam::Vec3::ZERO, glam::Vec3::X, None)
        .with_property("torso", "mmdbind_bind", 0.0);
    let path = DataPath::new("torso", "mmdbind_bind");
    let target = BindTarget::new(OBJECT_NAME, "upper_arm_fk.L", Space::Local);

    let constraint = pose_util::add_copy_rotation(
        &mut armature,
        "左腕",
        &target,
        Some(InfluenceSource::inverted(&path)),
        &ConstraintParams::new(),
    )
    .unwrap();
    pose_util::add_influence_driver(constraint, OBJECT_NAME, &path, true).unwrap();
    assert_eq!(constraint.drivers.len(), 1);

    pose_util::update_influence_driver(constraint, OBJECT_NAME, &path, false).unwrap();
    assert_eq!(constraint.drivers.len(), 1);
    assert!(!constraint.drivers["influence"].expression.is_inverted());

    armature.set_property("torso", "mmdbind_bind", 0.75).unwrap();
    assert_eq!(influences(&armature, "左腕"), vec![0.75]);
}
