//! MMD Bind Spec Library
//!
//! This crate holds the static data the binding engine works from:
//!
//! - **Catalog**: every bone of the MMD standard skeleton and its role
//! - **Descriptors**: the types rig variants use to map standard bones onto
//!   control-rig bones, grouped into independent binding regions
//! - **Controls**: the user-facing scalar controls and the data paths that
//!   store their values
//! - **Config**: options of a bind pass
//!
//! Nothing here touches an armature; see `mmdbind-rig` for the engine.
//!
//! # Example
//!
//! ```
//! use mmdbind_spec::catalog::{find_entry, mirror_name, BoneRole};
//! use mmdbind_spec::{BindConfig, ControlProperty, GroupCategory};
//!
//! let groove = find_entry("グルーブ").unwrap();
//! assert_eq!(groove.role, BoneRole::Groove);
//! assert_eq!(mirror_name("左ひじ"), "右ひじ");
//!
//! let config = BindConfig::new()
//!     .with_groups([GroupCategory::Torso, GroupCategory::ArmL])
//!     .with_initial_value(ControlProperty::ArmLIkFk, 1.0);
//! assert!(config.validate().is_ok());
//! ```

pub mod catalog;
pub mod config;
pub mod control;
pub mod descriptor;
pub mod error;

pub use catalog::{BoneRole, CatalogEntry, Side, CATALOG};
pub use config::BindConfig;
pub use control::{ControlProperty, ControlRegistry, DataPath, PropertySpec, PropertySubtype};
pub use descriptor::{BindDescriptor, BindStrategy, GroupCategory};
pub use error::{ConfigError, ParseError};
