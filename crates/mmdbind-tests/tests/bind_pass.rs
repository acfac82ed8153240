//! End-to-end bind passes over complete and partial armatures.

use mmdbind_rig::{
    constraint_graph_fingerprint, pose_util, ArmatureHost, AutoRigPro, BindReport, BindState, Binder,
    Constraint, ConstraintKind, MemoryArmature, RichArmature, Rigify, SkipReason, Space,
};
use mmdbind_spec::{BindConfig, GroupCategory};
use mmdbind_tests::fixtures::{RigFixture, OBJECT_NAME};
use pretty_assertions::assert_eq;

fn engine_constraints<'a>(armature: &'a MemoryArmature, bone: &str) -> Vec<&'a Constraint> {
    armature
        .constraints(bone)
        .iter()
        .filter(|c| pose_util::is_engine_constraint(c))
        .collect()
}

// ============================================================================
// Complete Armatures
// ============================================================================

#[test]
fn test_full_rigify_bind() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).build();

    let report = binder.bind(&mut armature, &BindConfig::new()).unwrap();
    assert_eq!(report.variant, "rigify");
    assert_eq!(report.state_before, BindState::Uninitialized);
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    assert!(report.controls_created.is_empty());

    let authored = |group: GroupCategory| report.constraints_authored[&group];
    assert_eq!(authored(GroupCategory::Torso), 13);
    assert_eq!(authored(GroupCategory::Face), 4);
    assert_eq!(authored(GroupCategory::ArmL), 24);
    assert_eq!(authored(GroupCategory::ArmR), 24);
    assert_eq!(authored(GroupCategory::LegL), 12);
    assert_eq!(authored(GroupCategory::LegR), 12);
    assert_eq!(report.total_authored(), 89);

    // Engine-owned controls, eye tracking included.
    assert_eq!(report.props_created.len(), 6);
    assert_eq!(armature.property("torso", "mmdbind_eye"), Some(0.0));
}

#[test]
fn test_full_auto_rig_pro_bind() {
    let binder = Binder::new(AutoRigPro);
    let mut armature = RigFixture::new(AutoRigPro).build();

    let report = binder.bind(&mut armature, &BindConfig::new()).unwrap();
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    assert_eq!(report.constraints_authored[&GroupCategory::ArmL], 27);
    assert_eq!(report.total_authored(), 95);
    assert_eq!(armature.property("c_traj", "mmdbind_bind"), Some(0.0));
    assert_eq!(armature.standard_name("c_arm_fk.l"), Some("左腕"));
}

#[test]
fn test_every_bound_constraint_targets_the_armature() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).build();
    binder.bind(&mut armature, &BindConfig::new()).unwrap();

    for bone in armature.bone_names() {
        for constraint in engine_constraints(&armature, &bone) {
            assert_eq!(constraint.target.as_deref(), Some(OBJECT_NAME));
            let subtarget = constraint.subtarget.as_deref().unwrap_or_default();
            assert!(armature.has_bone(subtarget), "{} -> {}", bone, subtarget);
            assert_ne!(subtarget, bone);
            assert_eq!(constraint.drivers.len(), 1, "{}", constraint.name);
        }
    }
}

#[test]
fn test_strategy_spaces() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).build();
    binder.bind(&mut armature, &BindConfig::new()).unwrap();

    let root = engine_constraints(&armature, "全ての親");
    assert_eq!(root.len(), 1);
    assert_eq!(root[0].kind, ConstraintKind::CopyTransforms);
    assert_eq!(root[0].target_space, Space::World);

    let groove = engine_constraints(&armature, "グルーブ");
    assert_eq!(groove[0].target_space, Space::LocalWithParent);

    let spine: Vec<ConstraintKind> = engine_constraints(&armature, "上半身")
        .iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(spine, vec![ConstraintKind::CopyLocation, ConstraintKind::CopyRotation]);

    let finger = engine_constraints(&armature, "左人指２");
    assert_eq!(finger[0].subtarget.as_deref(), Some("ORG-f_index.02.L"));
    assert_eq!(finger[0].target_space, Space::Local);

    let toe = engine_constraints(&armature, "右つま先");
    assert_eq!(toe[0].kind, ConstraintKind::CopyRotation);
    assert_eq!(toe[0].subtarget.as_deref(), Some("ORG-toe.R"));

    // Unbound bones stay untouched.
    assert!(engine_constraints(&armature, "腰").is_empty());
    assert!(engine_constraints(&armature, "左人指０").is_empty());
}

// ============================================================================
// Rebinding and Unbinding
// ============================================================================

#[test]
fn test_rebind_leaves_identical_constraint_graph() {
    for (variant, rebound) in [("rigify", rebind(Rigify)), ("auto_rig_pro", rebind(AutoRigPro))] {
        let Rebind {
            first,
            second,
            before,
            after,
        } = rebound;
        assert_eq!(before, after, "{}", variant);
        assert_eq!(second.state_before, BindState::Bound);
        assert_eq!(second.constraints_removed, first.total_authored());
        assert_eq!(second.total_authored(), first.total_authored());
    }
}

struct Rebind {
    first: BindReport,
    second: BindReport,
    before: String,
    after: String,
}

fn rebind<R: RichArmature + Copy>(rig: R) -> Rebind {
    let binder = Binder::new(rig);
    let mut armature = RigFixture::new(rig).build();
    let config = BindConfig::new();
    let first = binder.bind(&mut armature, &config).unwrap();
    let before = constraint_graph_fingerprint(&armature).unwrap();
    let second = binder.bind(&mut armature, &config).unwrap();
    let after = constraint_graph_fingerprint(&armature).unwrap();
    Rebind {
        first,
        second,
        before,
        after,
    }
}

#[test]
fn test_rebinding_one_group_leaves_others_alone() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).build();
    binder.bind(&mut armature, &BindConfig::new()).unwrap();
    let before = constraint_graph_fingerprint(&armature).unwrap();

    let config = BindConfig::new().with_groups([GroupCategory::LegR]);
    let report = binder.bind(&mut armature, &config).unwrap();
    assert_eq!(report.constraints_removed, 12);
    assert_eq!(report.total_authored(), 12);
    assert_eq!(constraint_graph_fingerprint(&armature).unwrap(), before);
}

#[test]
fn test_bind_state_transitions() {
    let binder = Binder::new(AutoRigPro);
    let mut armature = RigFixture::new(AutoRigPro).build();
    assert_eq!(binder.bind_state(&armature), BindState::Uninitialized);

    let report = binder.bind(&mut armature, &BindConfig::new()).unwrap();
    assert_eq!(binder.bind_state(&armature), BindState::Bound);

    let removed = binder.unbind(&mut armature).unwrap();
    assert_eq!(removed, report.total_authored());
    assert_eq!(binder.bind_state(&armature), BindState::Uninitialized);
    assert_eq!(binder.unbind(&mut armature).unwrap(), 0);
}

#[test]
fn test_hand_made_constraints_survive() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).build();
    armature
        .append_constraint("左ひざ", Constraint::new("Limit Rotation", ConstraintKind::LimitRotation))
        .unwrap();
    // No engine prefix: left alone.
    armature
        .append_constraint("左ひざ", Constraint::new("mmd_bind_helper", ConstraintKind::CopyScale))
        .unwrap();

    binder.bind(&mut armature, &BindConfig::new()).unwrap();
    binder.unbind(&mut armature).unwrap();

    let names: Vec<&str> = armature
        .constraints("左ひざ")
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Limit Rotation", "mmd_bind_helper"]);
}

// ============================================================================
// Partial Armatures
// ============================================================================

#[test]
fn test_missing_standard_bone_is_skipped() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).without_bone("左ひじ").build();

    let report = binder.bind(&mut armature, &BindConfig::new()).unwrap();
    assert_eq!(
        report.skips_for("左ひじ").collect::<Vec<_>>(),
        vec![&SkipReason::MissingStandardBone]
    );
    assert_eq!(report.constraints_authored[&GroupCategory::ArmL], 22);
    assert_eq!(report.constraints_authored[&GroupCategory::ArmR], 24);
}

#[test]
fn test_missing_control_bone_is_skipped() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).without_bone("MCH-thigh_ik.L").build();

    let report = binder.bind(&mut armature, &BindConfig::new()).unwrap();
    assert_eq!(
        report.skips_for("左足").collect::<Vec<_>>(),
        vec![&SkipReason::MissingControlBone("MCH-thigh_ik.L".to_string())]
    );
    assert!(engine_constraints(&armature, "左足").is_empty());
    assert_eq!(report.constraints_authored[&GroupCategory::LegL], 10);
}

#[test]
fn test_missing_face_skips_eyes() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).without_face().build();

    let report = binder.bind(&mut armature, &BindConfig::new()).unwrap();
    assert_eq!(report.constraints_authored[&GroupCategory::Face], 0);
    for name in ["両目", "左目", "右目"] {
        assert_eq!(
            report.skips_for(name).collect::<Vec<_>>(),
            vec![&SkipReason::NoFaceBones]
        );
    }
    assert!(!report.props_created.contains(&mmdbind_spec::ControlProperty::EyeTracking));
    assert!(engine_constraints(&armature, "eye_fk.L").is_empty());
}

#[test]
fn test_helper_controls_are_created() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).without_helper_controls().build();

    let report = binder.bind(&mut armature, &BindConfig::new()).unwrap();
    assert_eq!(
        report.controls_created,
        vec!["center", "groove", "eye_fk.L", "eye_fk.R", "eyes_fk"]
    );
    assert_eq!(report.total_authored(), 89);
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    assert_eq!(armature.bone("groove").and_then(|b| b.parent.as_deref()), Some("center"));
    assert_eq!(armature.bone("center").and_then(|b| b.parent.as_deref()), Some("root"));
    assert_eq!(armature.bone("torso").and_then(|b| b.parent.as_deref()), Some("groove"));
    assert_eq!(armature.standard_name("center"), Some("センター"));

    // Setup is skipped when disabled.
    let mut bare = RigFixture::new(Rigify).without_helper_controls().build();
    let config = BindConfig::new().with_setup_controls(false);
    let report = binder.bind(&mut bare, &config).unwrap();
    assert!(report.controls_created.is_empty());
    assert_eq!(
        report.skips_for("センター").collect::<Vec<_>>(),
        vec![&SkipReason::MissingControlBone("center".to_string())]
    );
}

#[test]
fn test_name_override_to_missing_bone() {
    let binder = Binder::new(AutoRigPro);
    let mut armature = RigFixture::new(AutoRigPro).build();
    let config = BindConfig::new()
        .with_override("左手首", "c_hand_custom.l")
        .with_override("右手首", "c_hand_ik.r");

    let report = binder.bind(&mut armature, &config).unwrap();
    assert_eq!(
        report.skips_for("左手首").collect::<Vec<_>>(),
        vec![&SkipReason::OverrideTargetMissing("c_hand_custom.l".to_string())]
    );
    assert_eq!(armature.standard_name("c_hand_fk.l"), None);
    assert_eq!(armature.standard_name("c_hand_ik.r"), Some("右手首"));
    assert_eq!(armature.standard_name("c_hand_fk.r"), None);
    // Overrides only rename; constraints still follow the descriptors.
    assert_eq!(engine_constraints(&armature, "左手首").len(), 2);
}

#[test]
fn test_report_serializes() {
    let binder = Binder::new(Rigify);
    let mut armature = RigFixture::new(Rigify).without_face().build();
    let report = binder.bind(&mut armature, &BindConfig::new()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["variant"], "rigify");
    assert_eq!(json["state_before"], "uninitialized");
    assert_eq!(json["constraints_authored"]["arm_l"], 24);
    assert_eq!(json["skipped"][0]["reason"]["kind"], "no_face_bones");
}
