//! Rigify-style control rig.
//!
//! Controls follow Rigify's naming: FK controls (`upper_arm_fk.L`), IK
//! mechanism bones (`MCH-upper_arm_ik.L`), original deform copies
//! (`ORG-spine.001`) and limb parent bones carrying the IK/FK switches.
//! Center, groove and the eye controls are not part of a stock Rigify rig;
//! the binder creates them during control setup.

use mmdbind_spec::{BindDescriptor, ControlProperty};

use super::RichArmature;

/// Rigify-style rig variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rigify;

static DESCRIPTORS: &[BindDescriptor] = &[
    bind!(ROOT_PARENT, Some("root"), None, Torso, CopyRoot),
    bind!(CENTER, Some("center"), None, Torso, CopyParentOffset),
    bind!(GROOVE, Some("groove"), None, Torso, CopyParentOffset),
    bind!(WAIST, None, None, Torso, None),
    bind!(UPPER_BODY, Some("spine_fk.001"), Some("ORG-spine.001"), Torso, CopySpineBlend),
    bind!(UPPER_BODY_1, Some("spine_fk.002"), Some("ORG-spine.002"), Torso, CopySpineBlend),
    bind!(UPPER_BODY_2, Some("spine_fk.003"), Some("ORG-spine.003"), Torso, CopySpineBlend),
    bind!(NECK, Some("neck"), Some("ORG-spine.004"), Torso, CopyPose),
    bind!(HEAD, Some("head"), Some("ORG-spine.006"), Torso, CopyPose),
    bind!(EYES, Some("eyes_fk"), None, Face, CopyEyeAim),
    bind!(EYE_L, Some("eye_fk.L"), None, Face, CopyEyeAim),
    bind!(EYE_R, Some("eye_fk.R"), None, Face, CopyEyeAim),
    bind!(SHOULDER_L, Some("shoulder.L"), Some("ORG-shoulder.L"), ArmL, CopyParentOffset),
    bind!(ARM_L, Some("upper_arm_fk.L"), Some("MCH-upper_arm_ik.L"), ArmL, CopyPose),
    bind!(ARM_TWIST_L, Some("upper_arm_tweak.L.001"), None, ArmL, CopyLocal),
    bind!(ELBOW_L, Some("forearm_fk.L"), Some("MCH-forearm_ik.L"), ArmL, CopyPose),
    bind!(WRIST_TWIST_L, Some("forearm_tweak.L.001"), None, ArmL, CopyLocal),
    bind!(WRIST_L, Some("hand_fk.L"), Some("hand_ik.L"), ArmL, CopyPose),
    bind!(THUMB_0_L, Some("thumb.01.L"), Some("ORG-thumb.01.L"), ArmL, CopyLocal),
    bind!(THUMB_1_L, Some("thumb.02.L"), Some("ORG-thumb.02.L"), ArmL, CopyLocal),
    bind!(THUMB_2_L, Some("thumb.03.L"), Some("ORG-thumb.03.L"), ArmL, CopyLocal),
    bind!(INDEX_0_L, None, None, ArmL, None),
    bind!(INDEX_1_L, Some("f_index.01.L"), Some("ORG-f_index.01.L"), ArmL, CopyLocal),
    bind!(INDEX_2_L, Some("f_index.02.L"), Some("ORG-f_index.02.L"), ArmL, CopyLocal),
    bind!(INDEX_3_L, Some("f_index.03.L"), Some("ORG-f_index.03.L"), ArmL, CopyLocal),
    bind!(MIDDLE_0_L, None, None, ArmL, None),
    bind!(MIDDLE_1_L, Some("f_middle.01.L"), Some("ORG-f_middle.01.L"), ArmL, CopyLocal),
    bind!(MIDDLE_2_L, Some("f_middle.02.L"), Some("ORG-f_middle.02.L"), ArmL, CopyLocal),
    bind!(MIDDLE_3_L, Some("f_middle.03.L"), Some("ORG-f_middle.03.L"), ArmL, CopyLocal),
    bind!(RING_0_L, None, None, ArmL, None),
    bind!(RING_1_L, Some("f_ring.01.L"), Some("ORG-f_ring.01.L"), ArmL, CopyLocal),
    bind!(RING_2_L, Some("f_ring.02.L"), Some("ORG-f_ring.02.L"), ArmL, CopyLocal),
    bind!(RING_3_L, Some("f_ring.03.L"), Some("ORG-f_ring.03.L"), ArmL, CopyLocal),
    bind!(LITTLE_0_L, None, None, ArmL, None),
    bind!(LITTLE_1_L, Some("f_pinky.01.L"), Some("ORG-f_pinky.01.L"), ArmL, CopyLocal),
    bind!(LITTLE_2_L, Some("f_pinky.02.L"), Some("ORG-f_pinky.02.L"), ArmL, CopyLocal),
    bind!(LITTLE_3_L, Some("f_pinky.03.L"), Some("ORG-f_pinky.03.L"), ArmL, CopyLocal),
    bind!(SHOULDER_R, Some("shoulder.R"), Some("ORG-shoulder.R"), ArmR, CopyParentOffset),
    bind!(ARM_R, Some("upper_arm_fk.R"), Some("MCH-upper_arm_ik.R"), ArmR, CopyPose),
    bind!(ARM_TWIST_R, Some("upper_arm_tweak.R.001"), None, ArmR, CopyLocal),
    bind!(ELBOW_R, Some("forearm_fk.R"), Some("MCH-forearm_ik.R"), ArmR, CopyPose),
    bind!(WRIST_TWIST_R, Some("forearm_tweak.R.001"), None, ArmR, CopyLocal),
    bind!(WRIST_R, Some("hand_fk.R"), Some("hand_ik.R"), ArmR, CopyPose),
    bind!(THUMB_0_R, Some("thumb.01.R"), Some("ORG-thumb.01.R"), ArmR, CopyLocal),
    bind!(THUMB_1_R, Some("thumb.02.R"), Some("ORG-thumb.02.R"), ArmR, CopyLocal),
    bind!(THUMB_2_R, Some("thumb.03.R"), Some("ORG-thumb.03.R"), ArmR, CopyLocal),
    bind!(INDEX_0_R, None, None, ArmR, None),
    bind!(INDEX_1_R, Some("f_index.01.R"), Some("ORG-f_index.01.R"), ArmR, CopyLocal),
    bind!(INDEX_2_R, Some("f_index.02.R"), Some("ORG-f_index.02.R"), ArmR, CopyLocal),
    bind!(INDEX_3_R, Some("f_index.03.R"), Some("ORG-f_index.03.R"), ArmR, CopyLocal),
    bind!(MIDDLE_0_R, None, None, ArmR, None),
    bind!(MIDDLE_1_R, Some("f_middle.01.R"), Some("ORG-f_middle.01.R"), ArmR, CopyLocal),
    bind!(MIDDLE_2_R, Some("f_middle.02.R"), Some("ORG-f_middle.02.R"), ArmR, CopyLocal),
    bind!(MIDDLE_3_R, Some("f_middle.03.R"), Some("ORG-f_middle.03.R"), ArmR, CopyLocal),
    bind!(RING_0_R, None, None, ArmR, None),
    bind!(RING_1_R, Some("f_ring.01.R"), Some("ORG-f_ring.01.R"), ArmR, CopyLocal),
    bind!(RING_2_R, Some("f_ring.02.R"), Some("ORG-f_ring.02.R"), ArmR, CopyLocal),
    bind!(RING_3_R, Some("f_ring.03.R"), Some("ORG-f_ring.03.R"), ArmR, CopyLocal),
    bind!(LITTLE_0_R, None, None, ArmR, None),
    bind!(LITTLE_1_R, Some("f_pinky.01.R"), Some("ORG-f_pinky.01.R"), ArmR, CopyLocal),
    bind!(LITTLE_2_R, Some("f_pinky.02.R"), Some("ORG-f_pinky.02.R"), ArmR, CopyLocal),
    bind!(LITTLE_3_R, Some("f_pinky.03.R"), Some("ORG-f_pinky.03.R"), ArmR, CopyLocal),
    bind!(LOWER_BODY, Some("spine_fk"), Some("ORG-spine"), Torso, CopySpineBlend),
    bind!(LEG_L, Some("thigh_fk.L"), Some("MCH-thigh_ik.L"), LegL, CopyPose),
    bind!(KNEE_L, Some("shin_fk.L"), Some("MCH-shin_ik.L"), LegL, CopyPose),
    bind!(ANKLE_L, Some("foot_fk.L"), Some("MCH-foot_ik.L"), LegL, CopyPose),
    bind!(LEG_IK_L, Some("foot_ik.L"), None, LegL, CopyParentOffset),
    bind!(TOE_EX_L, Some("toe.L"), Some("ORG-toe.L"), LegL, CopyToe),
    bind!(LEG_D_L, None, Some("ORG-thigh.L"), LegL, CopyLegDDeform),
    bind!(KNEE_D_L, None, Some("ORG-shin.L"), LegL, CopyLegDDeform),
    bind!(ANKLE_D_L, None, Some("ORG-foot.L"), LegL, CopyLegDDeform),
    bind!(LEG_R, Some("thigh_fk.R"), Some("MCH-thigh_ik.R"), LegR, CopyPose),
    bind!(KNEE_R, Some("shin_fk.R"), Some("MCH-shin_ik.R"), LegR, CopyPose),
    bind!(ANKLE_R, Some("foot_fk.R"), Some("MCH-foot_ik.R"), LegR, CopyPose),
    bind!(LEG_IK_R, Some("foot_ik.R"), None, LegR, CopyParentOffset),
    bind!(TOE_EX_R, Some("toe.R"), Some("ORG-toe.R"), LegR, CopyToe),
    bind!(LEG_D_R, None, Some("ORG-thigh.R"), LegR, CopyLegDDeform),
    bind!(KNEE_D_R, None, Some("ORG-shin.R"), LegR, CopyLegDDeform),
    bind!(ANKLE_D_R, None, Some("ORG-foot.R"), LegR, CopyLegDDeform),
    bind!(TOE_IK_L, None, None, LegL, None),
    bind!(TOE_IK_R, None, None, LegR, None),
    bind!(TOE_L, None, Some("ORG-toe.L"), LegL, CopyToe),
    bind!(TOE_R, None, Some("ORG-toe.R"), LegR, CopyToe),
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
    (ControlProperty::TorsoNeckFollow, "torso", "neck_follow"),
    (ControlProperty::TorsoHeadFollow, "torso", "head_follow"),
    (ControlProperty::ArmLIkFk, "upper_arm_parent.L", "IK_FK"),
    (ControlProperty::ArmRIkFk, "upper_arm_parent.R", "IK_FK"),
    (ControlProperty::ArmLIkStretch, "upper_arm_parent.L", "IK_Stretch"),
    (ControlProperty::ArmRIkStretch, "upper_arm_parent.R", "IK_Stretch"),
    (ControlProperty::ArmLIkParent, "upper_arm_parent.L", "IK_parent"),
    (ControlProperty::ArmRIkParent, "upper_arm_parent.R", "IK_parent"),
    (ControlProperty::ArmLPoleVector, "upper_arm_parent.L", "pole_vector"),
    (ControlProperty::ArmRPoleVector, "upper_arm_parent.R", "pole_vector"),
    (ControlProperty::LegLIkFk, "thigh_parent.L", "IK_FK"),
    (ControlProperty::LegRIkFk, "thigh_parent.R", "IK_FK"),
    (ControlProperty::LegLIkStretch, "thigh_parent.L", "IK_Stretch"),
    (ControlProperty::LegRIkStretch, "thigh_parent.R", "IK_Stretch"),
    (ControlProperty::LegLIkParent, "thigh_parent.L", "IK_parent"),
    (ControlProperty::LegRIkParent, "thigh_parent.R", "IK_parent"),
    (ControlProperty::LegLPoleVector, "thigh_parent.L", "pole_vector"),
    (ControlProperty::LegRPoleVector, "thigh_parent.R", "pole_vector"),
    (ControlProperty::LegLPoleParent, "thigh_parent.L", "pole_parent"),
    (ControlProperty::LegRPoleParent, "thigh_parent.R", "pole_parent"),
];

impl RichArmature for Rigify {
    fn variant_name(&self) -> &'static str {
        "rigify"
    }

    fn descriptors(&self) -> &'static [BindDescriptor] {
        DESCRIPTORS
    }

    fn control_table(&self) -> &'static [(ControlProperty, &'static str, &'static str)] {
        CONTROLS
    }

    fn prop_storage_bone(&self) -> &'static str {
        "torso"
    }

    fn face_bones(&self) -> &'static [&'static str] {
        &["ORG-face", "ORG-eye.L", "ORG-eye.R"]
    }
}
