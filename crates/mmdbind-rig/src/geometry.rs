//! Geometry helpers for placing control bones.

use std::str::FromStr;
use std::sync::OnceLock;

use glam::Vec3;
use mmdbind_spec::Side;
use regex::Regex;

use crate::error::{GeometryError, HostError, HostResult};
use crate::host::{ArmatureHost, EditBone};

/// Point halfway between `left` and `right`.
pub fn midpoint(left: Vec3, right: Vec3) -> Vec3 {
    (left + right) / 2.0
}

/// Point halfway along a bone.
pub fn bone_center(bone: &EditBone) -> Vec3 {
    midpoint(bone.head, bone.tail)
}

/// Point at `factor` of the way from head to tail. Factors outside 0..1
/// extrapolate along the bone axis.
pub fn bone_point_at(bone: &EditBone, factor: f32) -> Vec3 {
    bone.head + bone.vector() * factor
}

// =============================================================================
// Planes
// =============================================================================

/// Axis-aligned plane an angle is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// Angle of the projection of `vector` onto this plane, measured from the
    /// first axis towards the second, in radians.
    pub fn angle_of(&self, vector: Vec3) -> f32 {
        match self {
            Plane::XY => vector.y.atan2(vector.x),
            Plane::XZ => vector.z.atan2(vector.x),
            Plane::YZ => vector.z.atan2(vector.y),
        }
    }
}

impl FromStr for Plane {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "XY" => Ok(Plane::XY),
            "XZ" => Ok(Plane::XZ),
            "YZ" => Ok(Plane::YZ),
            other => Err(GeometryError::InvalidPlane(other.to_string())),
        }
    }
}

/// Angle of `vector` in the plane named by `plane` (`XY`, `XZ` or `YZ`).
///
/// ```
/// use glam::Vec3;
/// use mmdbind_rig::geometry::angle_in_plane;
///
/// let angle = angle_in_plane(Vec3::new(1.0, 0.0, 1.0), "XZ").unwrap();
/// assert!((angle - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
/// assert!(angle_in_plane(Vec3::X, "ZZ").is_err());
/// ```
pub fn angle_in_plane(vector: Vec3, plane: &str) -> Result<f32, GeometryError> {
    Ok(plane.parse::<Plane>()?.angle_of(vector))
}

// =============================================================================
// Side Suffixes
// =============================================================================

const SIDE_SUFFIX_PATTERN: &str = r"[_.]([lLrR])$";

static SIDE_SUFFIX_REGEX: OnceLock<Regex> = OnceLock::new();

fn side_suffix_regex() -> &'static Regex {
    SIDE_SUFFIX_REGEX.get_or_init(|| Regex::new(SIDE_SUFFIX_PATTERN).expect("invalid regex pattern"))
}

/// Side encoded by a trailing `_L`, `.l`, `_R`, `.r` style suffix.
pub fn side_suffix(bone_name: &str) -> Option<Side> {
    let caps = side_suffix_regex().captures(bone_name)?;
    match &caps[1] {
        "l" | "L" => Some(Side::Left),
        _ => Some(Side::Right),
    }
}

// =============================================================================
// Bone Editing
// =============================================================================

/// Rotates `target` to the orientation of `reference`, keeping the target's
/// head and length. A zero-length reference leaves the target unchanged.
pub fn fit_bone_rotation<H>(host: &mut H, target: &str, reference: &str) -> HostResult<()>
where
    H: ArmatureHost + ?Sized,
{
    let reference = host
        .bone(reference)
        .ok_or_else(|| HostError::UnknownBone(reference.to_string()))?;
    let direction = reference.vector().normalize_or_zero();
    let roll = reference.roll;
    if direction == Vec3::ZERO {
        return Ok(());
    }

    let bone = host
        .bone_mut(target)
        .ok_or_else(|| HostError::UnknownBone(target.to_string()))?;
    let length = bone.length();
    bone.tail = bone.head + direction * length;
    bone.roll = roll;
    Ok(())
}

/// Splices `bone` between `parent` and the parent's current children.
pub fn insert_bone<H>(host: &mut H, bone: &str, parent: &str) -> HostResult<()>
where
    H: ArmatureHost + ?Sized,
{
    if !host.has_bone(bone) {
        return Err(HostError::UnknownBone(bone.to_string()));
    }
    let children: Vec<String> = host
        .children(parent)
        .into_iter()
        .filter(|child| child != bone)
        .collect();
    host.set_parent(bone, Some(parent))?;
    for child in children {
        host.set_parent(&child, Some(bone))?;
    }
    Ok(())
}
