//! Named getters and setters for every control.
//!
//! Getters return `None` when the rig does not support the control; setters
//! ignore writes to unsupported controls.

use mmdbind_spec::ControlProperty;

use super::{Binder, RichArmature};
use crate::error::HostResult;
use crate::host::ArmatureHost;

macro_rules! control_accessors {
    ($($control:ident => $get:ident, $set:ident;)*) => {
        impl<R: RichArmature> Binder<R> {
            $(
                #[doc = concat!("Current `", stringify!($get), "` value.")]
                pub fn $get(&self, host: &dyn ArmatureHost) -> Option<f64> {
                    self.get(host, ControlProperty::$control)
                }

                #[doc = concat!("Writes `", stringify!($get), "`.")]
                pub fn $set(&self, host: &mut dyn ArmatureHost, value: f64) -> HostResult<()> {
                    self.set(host, ControlProperty::$control, value)
                }
            )*
        }
    };
}

control_accessors! {
    BindEnable => bind_enable, set_bind_enable;
    EyeTracking => eye_tracking, set_eye_tracking;
    LegLFeature => leg_l_feature, set_leg_l_feature;
    LegRFeature => leg_r_feature, set_leg_r_feature;
    ToeLFeature => toe_l_feature, set_toe_l_feature;
    ToeRFeature => toe_r_feature, set_toe_r_feature;
    TorsoNeckFollow => torso_neck_follow, set_torso_neck_follow;
    TorsoHeadFollow => torso_head_follow, set_torso_head_follow;
    ArmLIkFk => arm_l_ik_fk, set_arm_l_ik_fk;
    ArmRIkFk => arm_r_ik_fk, set_arm_r_ik_fk;
    ArmLIkStretch => arm_l_ik_stretch, set_arm_l_ik_stretch;
    ArmRIkStretch => arm_r_ik_stretch, set_arm_r_ik_stretch;
    ArmLIkParent => arm_l_ik_parent, set_arm_l_ik_parent;
    ArmRIkParent => arm_r_ik_parent, set_arm_r_ik_parent;
    ArmLPoleVector => arm_l_pole_vector, set_arm_l_pole_vector;
    ArmRPoleVector => arm_r_pole_vector, set_arm_r_pole_vector;
    LegLIkFk => leg_l_ik_fk, set_leg_l_ik_fk;
    LegRIkFk => leg_r_ik_fk, set_leg_r_ik_fk;
    LegLIkStretch => leg_l_ik_stretch, set_leg_l_ik_stretch;
    LegRIkStretch => leg_r_ik_stretch, set_leg_r_ik_stretch;
    LegLIkParent => leg_l_ik_parent, set_leg_l_ik_parent;
    LegRIkParent => leg_r_ik_parent, set_leg_r_ik_parent;
    LegLPoleVector => leg_l_pole_vector, set_leg_l_pole_vector;
    LegRPoleVector => leg_r_pole_vector, set_leg_r_pole_vector;
    LegLPoleParent => leg_l_pole_parent, set_leg_l_pole_parent;
    LegRPoleParent => leg_r_pole_parent, set_leg_r_pole_parent;
}
