//! MMD Bind End-to-End Test Infrastructure
//!
//! This crate exercises full bind passes against in-memory armatures:
//!
//! - **Bind passes**: every group of both rig variants, rebinding, unbinding
//! - **Controls**: reading and writing controls through the binder and
//!   checking the influences the drivers push into constraints
//! - **Symmetry**: left/right consistency of the catalog and variant tables
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mmdbind-tests
//! ```
//!
//! Fixtures are built from the variant tables themselves, so a complete
//! armature always matches what the binder expects:
//!
//! ```
//! use mmdbind_rig::{ArmatureHost, Rigify};
//! use mmdbind_tests::fixtures::RigFixture;
//!
//! let armature = RigFixture::new(Rigify).with_face().build();
//! assert!(armature.has_bone("左腕"));
//! assert!(armature.has_bone("MCH-upper_arm_ik.L"));
//! assert_eq!(armature.property("upper_arm_parent.L", "IK_FK"), Some(0.0));
//! ```

pub mod fixtures;
