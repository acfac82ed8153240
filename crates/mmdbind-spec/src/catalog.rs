//! Catalog of the MMD standard skeleton.
//!
//! Every bone a standard MMD model may carry is listed once, with the role it
//! plays in the standard hierarchy. The table is static and immutable; lookups
//! that miss simply mean "not applicable".

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

// =============================================================================
// Bone Roles
// =============================================================================

/// Semantic role of a standard bone.
///
/// The roles follow the bone classes of the standard MMD bone-insertion tools,
/// which is why each carries the label those tools display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoneRole {
    /// Ordinary bone of the standard skeleton.
    Standard,
    /// Master parent of the whole model.
    RootParent,
    /// Upper-arm twist helper.
    UpperArmTwist,
    /// Wrist twist helper.
    WristTwist,
    /// First inserted upper-body segment.
    UpperBodySegment1,
    /// Second inserted upper-body segment.
    UpperBodySegment2,
    /// Groove bone under the center bone.
    Groove,
    /// Waist bone driving both upper and lower body.
    TorsoRoot,
    /// Parent of a leg IK target.
    LegIkRootParent,
    /// Operation center bone.
    MasterControl,
    /// Toe-tip and leg-deform helpers.
    ToeTipHelper,
    /// Accessory anchor held in the hand.
    HandAccessoryAnchor,
    /// Shoulder cancel helper pair.
    ShoulderCancelHelper,
    /// Root segment of the thumb.
    ThumbRoot,
    /// Any other, model specific bone.
    OtherFingerSegment,
}

impl BoneRole {
    /// Returns the label MMD tooling shows for this role.
    pub fn mmd_label(&self) -> &'static str {
        match self {
            BoneRole::Standard => "標準",
            BoneRole::RootParent => "全ての親",
            BoneRole::UpperArmTwist => "腕捩",
            BoneRole::WristTwist => "手捩",
            BoneRole::UpperBodySegment1 => "上半身1",
            BoneRole::UpperBodySegment2 => "上半身２",
            BoneRole::Groove => "グルーブ",
            BoneRole::TorsoRoot => "腰",
            BoneRole::LegIkRootParent => "足IK親",
            BoneRole::MasterControl => "操作中心",
            BoneRole::ToeTipHelper => "足先EX",
            BoneRole::HandAccessoryAnchor => "手持ちアクセサリ用ダミー",
            BoneRole::ShoulderCancelHelper => "肩キャンセル",
            BoneRole::ThumbRoot => "親指０",
            BoneRole::OtherFingerSegment => "その他・独自",
        }
    }
}

// =============================================================================
// Sides
// =============================================================================

/// Body side of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Side {
    /// Character's left.
    #[serde(rename = "L")]
    Left,
    /// Character's right.
    #[serde(rename = "R")]
    Right,
}

impl Side {
    /// Returns the single-letter marker (`L` or `R`).
    pub fn letter(&self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }

    /// Returns the opposite side.
    pub fn mirrored(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Returns the side of a standard bone name (`左…` / `右…`).
    pub fn of_standard_name(name: &str) -> Option<Side> {
        if name.starts_with('左') {
            Some(Side::Left)
        } else if name.starts_with('右') {
            Some(Side::Right)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.letter())
    }
}

// =============================================================================
// Catalog Entries
// =============================================================================

/// One bone of the standard skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CatalogEntry {
    /// Semantic role.
    pub role: BoneRole,
    /// Standard (Japanese) bone name, unique across the catalog.
    pub standard_name: &'static str,
}

impl CatalogEntry {
    /// Creates a catalog entry.
    pub const fn new(role: BoneRole, standard_name: &'static str) -> Self {
        Self {
            role,
            standard_name,
        }
    }

    /// Returns the body side of this bone, if any.
    pub fn side(&self) -> Option<Side> {
        Side::of_standard_name(self.standard_name)
    }
}

macro_rules! catalog {
    ($($ident:ident = ($role:ident, $name:literal);)*) => {
        $(
            #[doc = concat!("`", $name, "`")]
            pub const $ident: CatalogEntry = CatalogEntry::new(BoneRole::$role, $name);
        )*

        /// Every standard bone, in catalog order.
        pub static CATALOG: &[CatalogEntry] = &[$($ident),*];
    };
}

catalog! {
    ROOT_PARENT = (RootParent, "全ての親");
    CENTER = (Standard, "センター");
    GROOVE = (Groove, "グルーブ");
    WAIST = (TorsoRoot, "腰");
    UPPER_BODY = (Standard, "上半身");
    UPPER_BODY_1 = (UpperBodySegment1, "上半身1");
    UPPER_BODY_2 = (UpperBodySegment2, "上半身2");
    NECK = (Standard, "首");
    HEAD = (Standard, "頭");

    EYES = (Standard, "両目");
    EYE_L = (Standard, "左目");
    EYE_R = (Standard, "右目");

    SHOULDER_L = (Standard, "左肩");
    ARM_L = (Standard, "左腕");
    ARM_TWIST_L = (UpperArmTwist, "左腕捩");
    ELBOW_L = (Standard, "左ひじ");
    WRIST_TWIST_L = (WristTwist, "左手捩");
    WRIST_L = (Standard, "左手首");
    THUMB_0_L = (ThumbRoot, "左親指０");
    THUMB_1_L = (Standard, "左親指１");
    THUMB_2_L = (Standard, "左親指２");
    INDEX_0_L = (OtherFingerSegment, "左人指０");
    INDEX_1_L = (Standard, "左人指１");
    INDEX_2_L = (Standard, "左人指２");
    INDEX_3_L = (Standard, "左人指３");
    MIDDLE_0_L = (OtherFingerSegment, "左中指０");
    MIDDLE_1_L = (Standard, "左中指１");
    MIDDLE_2_L = (Standard, "左中指２");
    MIDDLE_3_L = (Standard, "左中指３");
    RING_0_L = (OtherFingerSegment, "左薬指０");
    RING_1_L = (Standard, "左薬指１");
    RING_2_L = (Standard, "左薬指２");
    RING_3_L = (Standard, "左薬指３");
    LITTLE_0_L = (OtherFingerSegment, "左小指０");
    LITTLE_1_L = (Standard, "左小指１");
    LITTLE_2_L = (Standard, "左小指２");
    LITTLE_3_L = (Standard, "左小指３");

    SHOULDER_R = (Standard, "右肩");
    ARM_R = (Standard, "右腕");
    ARM_TWIST_R = (UpperArmTwist, "右腕捩");
    ELBOW_R = (Standard, "右ひじ");
    WRIST_TWIST_R = (WristTwist, "右手捩");
    WRIST_R = (Standard, "右手首");
    THUMB_0_R = (ThumbRoot, "右親指０");
    THUMB_1_R = (Standard, "右親指１");
    THUMB_2_R = (Standard, "右親指２");
    INDEX_0_R = (OtherFingerSegment, "右人指０");
    INDEX_1_R = (Standard, "右人指１");
    INDEX_2_R = (Standard, "右人指２");
    INDEX_3_R = (Standard, "右人指３");
    MIDDLE_0_R = (OtherFingerSegment, "右中指０");
    MIDDLE_1_R = (Standard, "右中指１");
    MIDDLE_2_R = (Standard, "右中指２");
    MIDDLE_3_R = (Standard, "右中指３");
    RING_0_R = (OtherFingerSegment, "右薬指０");
    RING_1_R = (Standard, "右薬指１");
    RING_2_R = (Standard, "右薬指２");
    RING_3_R = (Standard, "右薬指３");
    LITTLE_0_R = (OtherFingerSegment, "右小指０");
    LITTLE_1_R = (Standard, "右小指１");
    LITTLE_2_R = (Standard, "右小指２");
    LITTLE_3_R = (Standard, "右小指３");

    LOWER_BODY = (Standard, "下半身");

    LEG_L = (Standard, "左足");
    KNEE_L = (Standard, "左ひざ");
    ANKLE_L = (Standard, "左足首");
    LEG_IK_L = (Standard, "左足ＩＫ");
    TOE_EX_L = (ToeTipHelper, "左足先EX");
    LEG_D_L = (ToeTipHelper, "左足D");
    KNEE_D_L = (ToeTipHelper, "左ひざD");
    ANKLE_D_L = (ToeTipHelper, "左足首D");

    LEG_R = (Standard, "右足");
    KNEE_R = (Standard, "右ひざ");
    ANKLE_R = (Standard, "右足首");
    LEG_IK_R = (Standard, "右足ＩＫ");
    TOE_EX_R = (ToeTipHelper, "右足先EX");
    LEG_D_R = (ToeTipHelper, "右足D");
    KNEE_D_R = (ToeTipHelper, "右ひざD");
    ANKLE_D_R = (ToeTipHelper, "右足首D");

    TOE_IK_L = (Standard, "左つま先ＩＫ");
    TOE_IK_R = (Standard, "右つま先ＩＫ");
    TOE_L = (Standard, "左つま先");
    TOE_R = (Standard, "右つま先");

    SHOULDER_C_L = (ShoulderCancelHelper, "左肩C");
    SHOULDER_P_L = (ShoulderCancelHelper, "左肩P");
    SHOULDER_C_R = (ShoulderCancelHelper, "右肩C");
    SHOULDER_P_R = (ShoulderCancelHelper, "右肩P");
    DUMMY_L = (HandAccessoryAnchor, "左ダミー");
    DUMMY_R = (HandAccessoryAnchor, "右ダミー");
    LEG_IK_PARENT_L = (LegIkRootParent, "左足IK親");
    LEG_IK_PARENT_R = (LegIkRootParent, "右足IK親");
}

/// Looks up a catalog entry by its standard name.
pub fn find_entry(standard_name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.standard_name == standard_name)
}

/// Returns whether `standard_name` is managed by the catalog.
pub fn is_standard_name(standard_name: &str) -> bool {
    find_entry(standard_name).is_some()
}

// =============================================================================
// Name Mirroring
// =============================================================================

/// Trailing side marker of a control bone name, with an optional numeric
/// duplicate suffix (`hand.L`, `upper_arm_tweak.L.001`, `c_eye.l`).
const SIDE_MARKER_PATTERN: &str = r"^(.*[._])([LlRr])(\.\d{3})?$";

static SIDE_MARKER_REGEX: OnceLock<Regex> = OnceLock::new();

fn side_marker_regex() -> &'static Regex {
    SIDE_MARKER_REGEX.get_or_init(|| Regex::new(SIDE_MARKER_PATTERN).expect("invalid regex pattern"))
}

/// Returns the name of the mirrored counterpart of a bone.
///
/// Standard names swap their `左`/`右` prefix; control-rig names swap their
/// trailing `L`/`R` marker, preserving its case. Names without any side
/// marker are returned unchanged.
pub fn mirror_name(name: &str) -> String {
    if let Some(rest) = name.strip_prefix('左') {
        return format!("右{}", rest);
    }
    if let Some(rest) = name.strip_prefix('右') {
        return format!("左{}", rest);
    }

    match side_marker_regex().captures(name) {
        Some(caps) => {
            let mirrored = match &caps[2] {
                "L" => "R",
                "R" => "L",
                "l" => "r",
                _ => "l",
            };
            format!(
                "{}{}{}",
                &caps[1],
                mirrored,
                caps.get(3).map_or("", |m| m.as_str())
            )
        }
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_names_are_unique() {
        let mut seen = HashSet::new();
        for entry in CATALOG {
            assert!(
                seen.insert(entry.standard_name),
                "duplicate standard name {}",
                entry.standard_name
            );
        }
        assert_eq!(CATALOG.len(), 91);
    }

    #[test]
    fn test_left_entries_have_mirrored_right_entries() {
        for entry in CATALOG.iter().filter(|e| e.side() == Some(Side::Left)) {
            let mirrored = mirror_name(entry.standard_name);
            let right = find_entry(&mirrored)
                .unwrap_or_else(|| panic!("missing mirror of {}", entry.standard_name));
            assert_eq!(right.role, entry.role);
            assert_eq!(right.side(), Some(Side::Right));
        }
        let lefts = CATALOG.iter().filter(|e| e.side() == Some(Side::Left)).count();
        let rights = CATALOG.iter().filter(|e| e.side() == Some(Side::Right)).count();
        assert_eq!(lefts, rights);
    }

    #[test]
    fn test_mirror_name_control_bones() {
        assert_eq!(mirror_name("hand_ik.L"), "hand_ik.R");
        assert_eq!(mirror_name("upper_arm_tweak.L.001"), "upper_arm_tweak.R.001");
        assert_eq!(mirror_name("c_eye.l"), "c_eye.r");
        assert_eq!(mirror_name("foot_R"), "foot_L");
        assert_eq!(mirror_name("c_root_master.x"), "c_root_master.x");
        assert_eq!(mirror_name("torso"), "torso");
    }

    #[test]
    fn test_mirror_name_standard_bones() {
        assert_eq!(mirror_name("左ひじ"), "右ひじ");
        assert_eq!(mirror_name("右足IK親"), "左足IK親");
        assert_eq!(mirror_name("センター"), "センター");
    }

    #[test]
    fn test_find_entry() {
        assert_eq!(find_entry("グルーブ").map(|e| e.role), Some(BoneRole::Groove));
        assert_eq!(find_entry("左親指０").map(|e| e.role), Some(BoneRole::ThumbRoot));
        assert!(find_entry("not-a-bone").is_none());
        assert!(is_standard_name("両目"));
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(BoneRole::RootParent.mmd_label(), "全ての親");
        assert_eq!(BoneRole::ShoulderCancelHelper.mmd_label(), "肩キャンセル");
    }
}
