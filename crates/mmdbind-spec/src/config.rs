//! Bind pass configuration.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::control::ControlProperty;
use crate::descriptor::GroupCategory;
use crate::error::ConfigError;

/// Options of one bind pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindConfig {
    /// Groups to bind, in order.
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupCategory>,
    /// Standard name to control bone overrides, applied after the descriptor
    /// mapping when assigning standard names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bone_name_overrides: BTreeMap<String, String>,
    /// Whether to create the engine-owned control properties.
    #[serde(default = "default_true")]
    pub create_props: bool,
    /// Whether to synchronise standard names onto control bones.
    #[serde(default = "default_true")]
    pub assign_names: bool,
    /// Whether to create missing helper controls (eye controls, center and
    /// groove) before binding.
    #[serde(default = "default_true")]
    pub setup_controls: bool,
    /// Control values written after property creation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub initial_values: BTreeMap<ControlProperty, f64>,
}

fn default_groups() -> Vec<GroupCategory> {
    GroupCategory::BINDABLE.to_vec()
}

fn default_true() -> bool {
    true
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            groups: default_groups(),
            bone_name_overrides: BTreeMap::new(),
            create_props: true,
            assign_names: true,
            setup_controls: true,
            initial_values: BTreeMap::new(),
        }
    }
}

impl BindConfig {
    /// Creates the default configuration (every group, every step).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BindConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Restricts the pass to the given groups.
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupCategory>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }

    /// Adds a standard name override.
    pub fn with_override(
        mut self,
        standard_name: impl Into<String>,
        bone_name: impl Into<String>,
    ) -> Self {
        self.bone_name_overrides
            .insert(standard_name.into(), bone_name.into());
        self
    }

    /// Sets an initial control value.
    pub fn with_initial_value(mut self, control: ControlProperty, value: f64) -> Self {
        self.initial_values.insert(control, value);
        self
    }

    /// Enables or disables property creation.
    pub fn with_create_props(mut self, create_props: bool) -> Self {
        self.create_props = create_props;
        self
    }

    /// Enables or disables standard name assignment.
    pub fn with_assign_names(mut self, assign_names: bool) -> Self {
        self.assign_names = assign_names;
        self
    }

    /// Enables or disables helper control setup.
    pub fn with_setup_controls(mut self, setup_controls: bool) -> Self {
        self.setup_controls = setup_controls;
        self
    }

    /// Returns true if the group is part of this pass.
    pub fn binds_group(&self, group: GroupCategory) -> bool {
        self.groups.contains(&group)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.groups.is_empty() {
            return Err(ConfigError::NoGroups);
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if *group == GroupCategory::None {
                return Err(ConfigError::InvalidGroup(*group));
            }
            if !seen.insert(*group) {
                return Err(ConfigError::DuplicateGroup(*group));
            }
        }

        for (standard_name, bone_name) in &self.bone_name_overrides {
            if !catalog::is_standard_name(standard_name) {
                return Err(ConfigError::UnknownStandardBone(standard_name.clone()));
            }
            if bone_name.is_empty() {
                return Err(ConfigError::EmptyOverrideTarget(standard_name.clone()));
            }
        }

        for (control, value) in &self.initial_values {
            if !(0.0..=1.0).contains(value) {
                return Err(ConfigError::ValueOutOfRange {
                    control: *control,
                    value: *value,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = BindConfig::default();
        assert_eq!(config.groups, GroupCategory::BINDABLE.to_vec());
        assert!(config.create_props);
        assert!(config.assign_names);
        assert!(config.setup_controls);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_empty_json() {
        let config = BindConfig::from_json("{}").unwrap();
        assert_eq!(config, BindConfig::default());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "groups": ["torso", "arm_l"],
            "bone_name_overrides": {"左目": "eye_custom.L"},
            "create_props": false,
            "initial_values": {"arm_l_ik_fk": 1.0}
        }"#;
        let config = BindConfig::from_json(json).unwrap();
        assert_eq!(
            config.groups,
            vec![GroupCategory::Torso, GroupCategory::ArmL]
        );
        assert_eq!(
            config.bone_name_overrides.get("左目").map(String::as_str),
            Some("eye_custom.L")
        );
        assert!(!config.create_props);
        assert_eq!(
            config.initial_values.get(&ControlProperty::ArmLIkFk),
            Some(&1.0)
        );
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let err = BindConfig::from_json(r#"{"group": ["torso"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_validation_errors() {
        let empty = BindConfig::new().with_groups(Vec::new());
        assert!(matches!(empty.validate(), Err(ConfigError::NoGroups)));

        let none = BindConfig::new().with_groups([GroupCategory::None]);
        assert!(matches!(
            none.validate(),
            Err(ConfigError::InvalidGroup(GroupCategory::None))
        ));

        let dup = BindConfig::new().with_groups([GroupCategory::Face, GroupCategory::Face]);
        assert!(matches!(
            dup.validate(),
            Err(ConfigError::DuplicateGroup(GroupCategory::Face))
        ));

        let unknown = BindConfig::new().with_override("not-a-bone", "x");
        assert!(matches!(
            unknown.validate(),
            Err(ConfigError::UnknownStandardBone(_))
        ));

        let empty_target = BindConfig::new().with_override("頭", "");
        assert!(matches!(
            empty_target.validate(),
            Err(ConfigError::EmptyOverrideTarget(_))
        ));

        let out_of_range = BindConfig::new().with_initial_value(ControlProperty::BindEnable, 1.5);
        assert!(matches!(
            out_of_range.validate(),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_binds_group() {
        let config = BindConfig::new().with_groups([GroupCategory::LegL]);
        assert!(config.binds_group(GroupCategory::LegL));
        assert!(!config.binds_group(GroupCategory::LegR));
    }
}
