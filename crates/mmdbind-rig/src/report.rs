//! Bind pass reports.

use std::collections::BTreeMap;
use std::fmt;

use mmdbind_spec::{ControlProperty, GroupCategory};
use serde::Serialize;

/// Observable binding state of an armature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindState {
    /// No engine constraint on any standard bone.
    Uninitialized,
    /// At least one standard bone carries engine constraints.
    Bound,
}

/// Why a binding was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The standard bone is not in the armature.
    MissingStandardBone,
    /// A control-rig bone named by the descriptor is not in the armature.
    MissingControlBone(String),
    /// The rig variant maps no control bone to the standard bone.
    NoControlBone,
    /// The rig variant cannot resolve a control the binding needs.
    UnsupportedControl(ControlProperty),
    /// Eye bindings need face bones the armature does not have.
    NoFaceBones,
    /// A name override points at a bone that does not exist.
    OverrideTargetMissing(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingStandardBone => write!(f, "standard bone not found"),
            SkipReason::MissingControlBone(bone) => write!(f, "control bone '{}' not found", bone),
            SkipReason::NoControlBone => write!(f, "rig maps no control bone"),
            SkipReason::UnsupportedControl(control) => {
                write!(f, "control '{}' not supported by the rig", control)
            }
            SkipReason::NoFaceBones => write!(f, "rig has no face bones"),
            SkipReason::OverrideTargetMissing(bone) => {
                write!(f, "override target '{}' not found", bone)
            }
        }
    }
}

/// One skipped binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBinding {
    pub standard_name: String,
    pub reason: SkipReason,
}

/// Outcome of a bind pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindReport {
    /// Rig variant that was bound.
    pub variant: String,
    pub state_before: BindState,
    /// Constraints authored, per group.
    pub constraints_authored: BTreeMap<GroupCategory, usize>,
    /// Engine constraints removed before authoring.
    pub constraints_removed: usize,
    /// Control properties created or refreshed.
    pub props_created: Vec<ControlProperty>,
    /// Standard names assigned to control bones.
    pub names_assigned: usize,
    /// Helper control bones created by control setup.
    pub controls_created: Vec<String>,
    pub skipped: Vec<SkippedBinding>,
}

impl BindReport {
    /// Creates an empty report.
    pub fn new(variant: &str, state_before: BindState) -> Self {
        Self {
            variant: variant.to_string(),
            state_before,
            constraints_authored: BTreeMap::new(),
            constraints_removed: 0,
            props_created: Vec::new(),
            names_assigned: 0,
            controls_created: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn skip(&mut self, standard_name: &str, reason: SkipReason) {
        log::debug!("skipping '{}': {}", standard_name, reason);
        self.skipped.push(SkippedBinding {
            standard_name: standard_name.to_string(),
            reason,
        });
    }

    pub(crate) fn authored(&mut self, group: GroupCategory, count: usize) {
        *self.constraints_authored.entry(group).or_default() += count;
    }

    /// Total number of constraints authored.
    pub fn total_authored(&self) -> usize {
        self.constraints_authored.values().sum()
    }

    /// Skips recorded for a standard bone.
    pub fn skips_for<'a>(&'a self, standard_name: &'a str) -> impl Iterator<Item = &'a SkipReason> {
        self.skipped
            .iter()
            .filter(move |s| s.standard_name == standard_name)
            .map(|s| &s.reason)
    }

    /// Serializes the report as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
