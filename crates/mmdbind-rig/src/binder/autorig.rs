//! Auto-Rig-Pro-style control rig.
//!
//! Controls carry a `c_` prefix and lowercase side markers (`c_arm_fk.l`),
//! center bones end in `.x`, and IK/FK switches live on the IK end
//! effectors. Finger bases (`c_index1_base.l`) are bound, the wrist twist
//! is not: the rig has no separate forearm twist control.

use mmdbind_spec::{BindDescriptor, ControlProperty};

use super::RichArmature;

/// Auto-Rig-Pro-style rig variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoRigPro;

static DESCRIPTORS: &[BindDescriptor] = &[
    bind!(ROOT_PARENT, Some("c_traj"), None, Torso, CopyRoot),
    bind!(CENTER, Some("c_pos"), None, Torso, CopyParentOffset),
    bind!(GROOVE, Some("c_root_master.x"), None, Torso, CopyParentOffset),
    bind!(WAIST, None, None, Torso, None),
    bind!(UPPER_BODY, Some("c_spine_01.x"), Some("spine_01.x"), Torso, CopySpineBlend),
    bind!(UPPER_BODY_1, Some("c_spine_02.x"), Some("spine_02.x"), Torso, CopySpineBlend),
    bind!(UPPER_BODY_2, Some("c_spine_03.x"), Some("spine_03.x"), Torso, CopySpineBlend),
    bind!(NECK, Some("c_neck.x"), Some("neck.x"), Torso, CopyPose),
    bind!(HEAD, Some("c_head.x"), Some("head.x"), Torso, CopyPose),
    bind!(EYES, Some("c_eye_target.x"), None, Face, CopyEyeAim),
    bind!(EYE_L, Some("c_eye.l"), None, Face, CopyEyeAim),
    bind!(EYE_R, Some("c_eye.r"), None, Face, CopyEyeAim),
    bind!(SHOULDER_L, Some("c_shoulder.l"), Some("shoulder.l"), ArmL, CopyParentOffset),
    bind!(ARM_L, Some("c_arm_fk.l"), Some("arm_ik.l"), ArmL, CopyPose),
    bind!(ARM_TWIST_L, Some("c_arm_twist_offset.l"), None, ArmL, CopyLocal),
    bind!(ELBOW_L, Some("c_forearm_fk.l"), Some("forearm_ik.l"), ArmL, CopyPose),
    bind!(WRIST_TWIST_L, None, None, ArmL, None),
    bind!(WRIST_L, Some("c_hand_fk.l"), Some("c_hand_ik.l"), ArmL, CopyPose),
    bind!(THUMB_0_L, Some("c_thumb1.l"), Some("thumb1.l"), ArmL, CopyLocal),
    bind!(THUMB_1_L, Some("c_thumb2.l"), Some("thumb2.l"), ArmL, CopyLocal),
    bind!(THUMB_2_L, Some("c_thumb3.l"), Some("thumb3.l"), ArmL, CopyLocal),
    bind!(INDEX_0_L, Some("c_index1_base.l"), Some("index1_base.l"), ArmL, CopyLocal),
    bind!(INDEX_1_L, Some("c_index1.l"), Some("index1.l"), ArmL, CopyLocal),
    bind!(INDEX_2_L, Some("c_index2.l"), Some("index2.l"), ArmL, CopyLocal),
    bind!(INDEX_3_L, Some("c_index3.l"), Some("index3.l"), ArmL, CopyLocal),
    bind!(MIDDLE_0_L, Some("c_middle1_base.l"), Some("middle1_base.l"), ArmL, CopyLocal),
    bind!(MIDDLE_1_L, Some("c_middle1.l"), Some("middle1.l"), ArmL, CopyLocal),
    bind!(MIDDLE_2_L, Some("c_middle2.l"), Some("middle2.l"), ArmL, CopyLocal),
    bind!(MIDDLE_3_L, Some("c_middle3.l"), Some("middle3.l"), ArmL, CopyLocal),
    bind!(RING_0_L, Some("c_ring1_base.l"), Some("ring1_base.l"), ArmL, CopyLocal),
    bind!(RING_1_L, Some("c_ring1.l"), Some("ring1.l"), ArmL, CopyLocal),
    bind!(RING_2_L, Some("c_ring2.l"), Some("ring2.l"), ArmL, CopyLocal),
    bind!(RING_3_L, Some("c_ring3.l"), Some("ring3.l"), ArmL, CopyLocal),
    bind!(LITTLE_0_L, Some("c_pinky1_base.l"), Some("pinky1_base.l"), ArmL, CopyLocal),
    bind!(LITTLE_1_L, Some("c_pinky1.l"), Some("pinky1.l"), ArmL, CopyLocal),
    bind!(LITTLE_2_L, Some("c_pinky2.l"), Some("pinky2.l"), ArmL, CopyLocal),
    bind!(LITTLE_3_L, Some("c_pinky3.l"), Some("pinky3.l"), ArmL, CopyLocal),
    bind!(SHOULDER_R, Some("c_shoulder.r"), Some("shoulder.r"), ArmR, CopyParentOffset),
    bind!(ARM_R, Some("c_arm_fk.r"), Some("arm_ik.r"), ArmR, CopyPose),
    bind!(ARM_TWIST_R, Some("c_arm_twist_offset.r"), None, ArmR, CopyLocal),
    bind!(ELBOW_R, Some("c_forearm_fk.r"), Some("forearm_ik.r"), ArmR, CopyPose),
    bind!(WRIST_TWIST_R, None, None, ArmR, None),
    bind!(WRIST_R, Some("c_hand_fk.r"), Some("c_hand_ik.r"), ArmR, CopyPose),
    bind!(THUMB_0_R, Some("c_thumb1.r"), Some("thumb1.r"), ArmR, CopyLocal),
    bind!(THUMB_1_R, Some("c_thumb2.r"), Some("thumb2.r"), ArmR, CopyLocal),
    bind!(THUMB_2_R, Some("c_thumb3.r"), Some("thumb3.r"), ArmR, CopyLocal),
    bind!(INDEX_0_R, Some("c_index1_base.r"), Some("index1_base.r"), ArmR, CopyLocal),
    bind!(INDEX_1_R, Some("c_index1.r"), Some("index1.r"), ArmR, CopyLocal),
    bind!(INDEX_2_R, Some("c_index2.r"), Some("index2.r"), ArmR, CopyLocal),
    bind!(INDEX_3_R, Some("c_index3.r"), Some("index3.r"), ArmR, CopyLocal),
    bind!(MIDDLE_0_R, Some("c_middle1_base.r"), Some("middle1_base.r"), ArmR, CopyLocal),
    bind!(MIDDLE_1_R, Some("c_middle1.r"), Some("middle1.r"), ArmR, CopyLocal),
    bind!(MIDDLE_2_R, Some("c_middle2.r"), Some("middle2.r"), ArmR, CopyLocal),
    bind!(MIDDLE_3_R, Some("c_middle3.r"), Some("middle3.r"), ArmR, CopyLocal),
    bind!(RING_0_R, Some("c_ring1_base.r"), Some("ring1_base.r"), ArmR, CopyLocal),
    bind!(RING_1_R, Some("c_ring1.r"), Some("ring1.r"), ArmR, CopyLocal),
    bind!(RING_2_R, Some("c_ring2.r"), Some("ring2.r"), ArmR, CopyLocal),
    bind!(RING_3_R, Some("c_ring3.r"), Some("ring3.r"), ArmR, CopyLocal),
    bind!(LITTLE_0_R, Some("c_pinky1_base.r"), Some("pinky1_base.r"), ArmR, CopyLocal),
    bind!(LITTLE_1_R, Some("c_pinky1.r"), Some("pinky1.r"), ArmR, CopyLocal),
    bind!(LITTLE_2_R, Some("c_pinky2.r"), Some("pinky2.r"), ArmR, CopyLocal),
    bind!(LITTLE_3_R, Some("c_pinky3.r"), Some("pinky3.r"), ArmR, CopyLocal),
    bind!(LOWER_BODY, Some("c_root.x"), Some("root.x"), Torso, CopySpineBlend),
    bind!(LEG_L, Some("c_thigh_fk.l"), Some("thigh_ik.l"), LegL, CopyPose),
    bind!(KNEE_L, Some("c_leg_fk.l"), Some("leg_ik.l"), LegL, CopyPose),
    bind!(ANKLE_L, Some("c_foot_fk.l"), Some("foot_ik.l"), LegL, CopyPose),
    bind!(LEG_IK_L, Some("c_foot_ik.l"), None, LegL, CopyParentOffset),
    bind!(TOE_EX_L, Some("c_toes_fk.l"), Some("toes_ref.l"), LegL, CopyToe),
    bind!(LEG_D_L, None, Some("thigh_ref.l"), LegL, CopyLegDDeform),
    bind!(KNEE_D_L, None, Some("leg_ref.l"), LegL, CopyLegDDeform),
    bind!(ANKLE_D_L, None, Some("foot_ref.l"), LegL, CopyLegDDeform),
    bind!(LEG_R, Some("c_thigh_fk.r"), Some("thigh_ik.r"), LegR, CopyPose),
    bind!(KNEE_R, Some("c_leg_fk.r"), Some("leg_ik.r"), LegR, CopyPose),
    bind!(ANKLE_R, Some("c_foot_fk.r"), Some("foot_ik.r"), LegR, CopyPose),
    bind!(LEG_IK_R, Some("c_foot_ik.r"), None, LegR, CopyParentOffset),
    bind!(TOE_EX_R, Some("c_toes_fk.r"), Some("toes_ref.r"), LegR, CopyToe),
    bind!(LEG_D_R, None, Some("thigh_ref.r"), LegR, CopyLegDDeform),
    bind!(KNEE_D_R, None, Some("leg_ref.r"), LegR, CopyLegDDeform),
    bind!(ANKLE_D_R, None, Some("foot_ref.r"), LegR, CopyLegDDeform),
    bind!(TOE_IK_L, None, None, LegL, None),
    bind!(TOE_IK_R, None, None, LegR, None),
    bind!(TOE_L, None, Some("toes_ref.l"), LegL, CopyToe),
    bind!(TOE_R, None, Some("toes_ref.r"), LegR, CopyToe),
    bind!(SHOULDER_C_L, None, None, ArmL, None),
    bind!(SHOULDER_P_L, None, None, ArmL, None),
    bind!(SHOULDER_C_R, None, None, ArmR, None),
    bind!(SHOULDER_P_R, None, None, ArmR, None),
    bind!(DUMMY_L, None, None, ArmL, None),
    bind!(DUMMY_R, None, None, ArmR, None),
    bind!(LEG_IK_PARENT_L, None, None, LegL, None),
    bind!(LEG_IK_PARENT_R, None, None, LegR, None),
];

static CONTROLS: &[(ControlProperty, &str, &str)] = &[
    (ControlProperty::TorsoHeadFollow, "c_head.x", "head_free"),
    (ControlProperty::ArmLIkFk, "c_hand_ik.l", "ik_fk_switch"),
    (ControlProperty::ArmRIkFk, "c_hand_ik.r", "ik_fk_switch"),
    (ControlProperty::ArmLIkStretch, "c_hand_ik.l", "auto_stretch"),
    (ControlProperty::ArmRIkStretch, "c_hand_ik.r", "auto_stretch"),
    (ControlProperty::ArmLPoleVector, "c_arms_pole.l", "pole_parent"),
    (ControlProperty::ArmRPoleVector, "c_arms_pole.r", "pole_parent"),
    (ControlProperty::LegLIkFk, "c_foot_ik.l", "ik_fk_switch"),
    (ControlProperty::LegRIkFk, "c_foot_ik.r", "ik_fk_switch"),
    (ControlProperty::LegLIkStretch, "c_foot_ik.l", "auto_stretch"),
    (ControlProperty::LegRIkStretch, "c_foot_ik.r", "auto_stretch"),
    (ControlProperty::LegLPoleParent, "c_leg_pole.l", "pole_parent"),
    (ControlProperty::LegRPoleParent, "c_leg_pole.r", "pole_parent"),
];

impl RichArmature for AutoRigPro {
    fn variant_name(&self) -> &'static str {
        "auto_rig_pro"
    }

    fn descriptors(&self) -> &'static [BindDescriptor] {
        DESCRIPTORS
    }

    fn control_table(&self) -> &'static [(ControlProperty, &'static str, &'static str)] {
        CONTROLS
    }

    fn prop_storage_bone(&self) -> &'static str {
        "c_traj"
    }

    fn face_bones(&self) -> &'static [&'static str] {
        &["head.x", "c_eye.l", "c_eye.r", "c_eye_target.x"]
    }
}
