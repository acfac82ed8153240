//! MMD Bind Rig Engine
//!
//! This crate binds the MMD standard skeleton of an armature to a control
//! rig. Standard bones receive constraints that copy their control-rig
//! counterparts, and every constraint's influence is driven by a scalar
//! control so the animator can blend IK/FK or release the binding entirely.
//!
//! # Overview
//!
//! - **Host**: [`ArmatureHost`] abstracts the armature being edited;
//!   [`MemoryArmature`] is an in-memory implementation
//! - **Constraints and drivers**: typed constraint stacks with validated
//!   field assignment and single-variable influence drivers
//! - **Authoring**: [`pose_util`] creates engine constraints (all prefixed
//!   `mmdbind_`) and removes them again without touching hand-made ones
//! - **Binder**: [`Binder`] runs a bind pass for one [`RichArmature`]
//!   variant ([`Rigify`] or [`AutoRigPro`])
//! - **Fingerprints**: [`hash`] snapshots and hashes the constraint graph
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use mmdbind_rig::{Binder, BindState, MemoryArmature, Rigify};
//! use mmdbind_spec::{BindConfig, GroupCategory};
//!
//! let mut armature = MemoryArmature::new("Armature")
//!     .with_bone("torso", Vec3::ZERO, Vec3::Z, None)
//!     .with_bone("左腕", Vec3::ZERO, Vec3::X, None)
//!     .with_bone("upper_arm_fk.L", Vec3::ZERO, Vec3::X, None)
//!     .with_bone("MCH-upper_arm_ik.L", Vec3::ZERO, Vec3::X, None)
//!     .with_property("upper_arm_parent.L", "IK_FK", 1.0);
//!
//! let binder = Binder::new(Rigify);
//! let config = BindConfig::new().with_groups([GroupCategory::ArmL]);
//! let report = binder.bind(&mut armature, &config).unwrap();
//!
//! assert_eq!(report.total_authored(), 2);
//! assert_eq!(binder.bind_state(&armature), BindState::Bound);
//! assert_eq!(binder.arm_l_ik_fk(&armature), Some(1.0));
//! ```
//!
//! # Modules
//!
//! - [`binder`]: rig variants and the bind pass
//! - [`constraint`]: constraint types and field validation
//! - [`driver`]: influence drivers
//! - [`error`]: error types
//! - [`geometry`]: bone geometry helpers
//! - [`hash`]: constraint-graph fingerprints
//! - [`host`]: the armature host trait
//! - [`memory`]: in-memory armature
//! - [`pose_util`]: constraint authoring helpers
//! - [`report`]: bind pass reports

pub mod binder;
pub mod constraint;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod hash;
pub mod host;
pub mod memory;
pub mod pose_util;
pub mod report;

// Re-export commonly used types at the crate root
pub use binder::{AutoRigPro, Binder, EyeControls, NameAssignment, RichArmature, Rigify, TorsoControls};
pub use constraint::{Constraint, ConstraintKind, ConstraintParams, ParamValue, Space};
pub use driver::{Driver, DriverExpression, DriverVariable};
pub use error::{BindError, BindResult, DriverError, GeometryError, HostError, HostResult};
pub use hash::{constraint_graph_fingerprint, constraint_graph_snapshot};
pub use host::{ArmatureHost, EditBone};
pub use memory::{CustomProperty, MemoryArmature};
pub use report::{BindReport, BindState, SkipReason, SkippedBinding};
