//! In-memory armature.
//!
//! [`MemoryArmature`] implements [`ArmatureHost`] without a scene: it keeps
//! bones, constraint stacks and custom properties in ordered maps, renames
//! duplicate constraints the way the host does (`name.001`), and pushes
//! driver results into constraint fields whenever a property changes.

use std::collections::BTreeMap;

use glam::Vec3;
use mmdbind_spec::PropertySpec;
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::{HostError, HostResult};
use crate::host::{ArmatureHost, EditBone};

/// Custom property value and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomProperty {
    pub value: f64,
    pub spec: PropertySpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BoneSlot {
    bone: EditBone,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<Constraint>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, CustomProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    standard_name: Option<String>,
}

impl BoneSlot {
    fn new(bone: EditBone) -> Self {
        Self {
            bone,
            constraints: Vec::new(),
            properties: BTreeMap::new(),
            standard_name: None,
        }
    }
}

/// Armature held entirely in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryArmature {
    name: String,
    bones: BTreeMap<String, BoneSlot>,
}

impl MemoryArmature {
    /// Creates an empty armature object.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: BTreeMap::new(),
        }
    }

    /// Adds (or replaces the geometry of) a bone. Parent links are stored as
    /// given; use [`ArmatureHost::set_parent`] for checked re-parenting.
    pub fn add_bone(&mut self, name: &str, head: Vec3, tail: Vec3, parent: Option<&str>) {
        let slot = self
            .bones
            .entry(name.to_string())
            .or_insert_with(|| BoneSlot::new(EditBone::new(name, head, tail)));
        slot.bone.head = head;
        slot.bone.tail = tail;
        slot.bone.parent = parent.map(str::to_string);
    }

    /// Builder form of [`add_bone`](Self::add_bone).
    pub fn with_bone(mut self, name: &str, head: Vec3, tail: Vec3, parent: Option<&str>) -> Self {
        self.add_bone(name, head, tail, parent);
        self
    }

    /// Builder adding a 0..1 custom property with the given value. The bone
    /// is created when missing.
    pub fn with_property(mut self, bone: &str, name: &str, value: f64) -> Self {
        let slot = self
            .bones
            .entry(bone.to_string())
            .or_insert_with(|| BoneSlot::new(EditBone::new(bone, Vec3::ZERO, Vec3::Z)));
        let spec = PropertySpec::factor();
        slot.properties.insert(
            name.to_string(),
            CustomProperty {
                value: spec.clamp(value),
                spec,
            },
        );
        self
    }

    /// Number of bones.
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Custom properties of a bone.
    pub fn properties(&self, bone: &str) -> impl Iterator<Item = (&str, &CustomProperty)> {
        self.bones
            .get(bone)
            .into_iter()
            .flat_map(|slot| slot.properties.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Serializes the whole armature.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn slot_mut(&mut self, bone: &str) -> HostResult<&mut BoneSlot> {
        self.bones
            .get_mut(bone)
            .ok_or_else(|| HostError::UnknownBone(bone.to_string()))
    }

    fn is_ancestor(&self, ancestor: &str, bone: &str) -> bool {
        let mut current = Some(bone);
        let mut steps = 0;
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            // Guard against cycles in links added with add_bone.
            steps += 1;
            if steps > self.bones.len() {
                return false;
            }
            current = self
                .bones
                .get(name)
                .and_then(|slot| slot.bone.parent.as_deref());
        }
        false
    }
}

fn unique_constraint_name(existing: &[Constraint], name: &str) -> String {
    let taken = |candidate: &str| existing.iter().any(|c| c.name == candidate);
    if !taken(name) {
        return name.to_string();
    }
    let mut index = 1;
    loop {
        let candidate = format!("{}.{:03}", name, index);
        if !taken(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

impl ArmatureHost for MemoryArmature {
    fn object_name(&self) -> &str {
        &self.name
    }

    fn bone_names(&self) -> Vec<String> {
        self.bones.keys().cloned().collect()
    }

    fn bone(&self, name: &str) -> Option<&EditBone> {
        self.bones.get(name).map(|slot| &slot.bone)
    }

    fn bone_mut(&mut self, name: &str) -> Option<&mut EditBone> {
        self.bones.get_mut(name).map(|slot| &mut slot.bone)
    }

    fn get_or_create_bone(&mut self, name: &str) -> &mut EditBone {
        &mut self
            .bones
            .entry(name.to_string())
            .or_insert_with(|| BoneSlot::new(EditBone::new(name, Vec3::ZERO, Vec3::Z)))
            .bone
    }

    fn set_parent(&mut self, bone: &str, parent: Option<&str>) -> HostResult<()> {
        if let Some(parent) = parent {
            if !self.bones.contains_key(parent) {
                return Err(HostError::UnknownBone(parent.to_string()));
            }
            if self.is_ancestor(bone, parent) {
                return Err(HostError::ParentCycle {
                    bone: bone.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
        self.slot_mut(bone)?.bone.parent = parent.map(str::to_string);
        Ok(())
    }

    fn children(&self, bone: &str) -> Vec<String> {
        self.bones
            .values()
            .filter(|slot| slot.bone.parent.as_deref() == Some(bone))
            .map(|slot| slot.bone.name.clone())
            .collect()
    }

    fn constraints(&self, bone: &str) -> &[Constraint] {
        self.bones
            .get(bone)
            .map(|slot| slot.constraints.as_slice())
            .unwrap_or_default()
    }

    fn constraints_mut(&mut self, bone: &str) -> Option<&mut [Constraint]> {
        self.bones
            .get_mut(bone)
            .map(|slot| slot.constraints.as_mut_slice())
    }

    fn append_constraint(
        &mut self,
        bone: &str,
        mut constraint: Constraint,
    ) -> HostResult<&mut Constraint> {
        let slot = self.slot_mut(bone)?;
        constraint.name = unique_constraint_name(&slot.constraints, &constraint.name);
        slot.constraints.push(constraint);
        let index = slot.constraints.len() - 1;
        Ok(&mut slot.constraints[index])
    }

    fn remove_constraint(&mut self, bone: &str, name: &str) -> HostResult<Constraint> {
        let slot = self.slot_mut(bone)?;
        let index = slot
            .constraints
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| HostError::UnknownConstraint {
                bone: bone.to_string(),
                name: name.to_string(),
            })?;
        Ok(slot.constraints.remove(index))
    }

    fn create_property(&mut self, bone: &str, name: &str, spec: &PropertySpec) -> HostResult<()> {
        let slot = self.slot_mut(bone)?;
        let value = match slot.properties.get(name) {
            Some(existing) => spec.clamp(existing.value),
            None => spec.clamp(spec.default),
        };
        slot.properties.insert(
            name.to_string(),
            CustomProperty {
                value,
                spec: spec.clone(),
            },
        );
        Ok(())
    }

    fn property(&self, bone: &str, name: &str) -> Option<f64> {
        self.bones
            .get(bone)
            .and_then(|slot| slot.properties.get(name))
            .map(|prop| prop.value)
    }

    fn property_spec(&self, bone: &str, name: &str) -> Option<&PropertySpec> {
        self.bones
            .get(bone)
            .and_then(|slot| slot.properties.get(name))
            .map(|prop| &prop.spec)
    }

    fn set_property(&mut self, bone: &str, name: &str, value: f64) -> HostResult<()> {
        if !value.is_finite() {
            return Err(HostError::InvalidValue {
                bone: bone.to_string(),
                prop: name.to_string(),
                value,
            });
        }
        let slot = self.slot_mut(bone)?;
        let prop = slot
            .properties
            .get_mut(name)
            .ok_or_else(|| HostError::UnknownProperty {
                bone: bone.to_string(),
                prop: name.to_string(),
            })?;
        prop.value = prop.spec.clamp(value);
        self.refresh_drivers();
        Ok(())
    }

    fn standard_name(&self, bone: &str) -> Option<&str> {
        self.bones
            .get(bone)
            .and_then(|slot| slot.standard_name.as_deref())
    }

    fn set_standard_name(&mut self, bone: &str, standard_name: Option<&str>) -> HostResult<()> {
        self.slot_mut(bone)?.standard_name = standard_name.map(str::to_string);
        Ok(())
    }

    fn refresh_drivers(&mut self) {
        let values: BTreeMap<(String, String), f64> = self
            .bones
            .iter()
            .flat_map(|(bone, slot)| {
                slot.properties
                    .iter()
                    .map(move |(prop, p)| ((bone.clone(), prop.clone()), p.value))
            })
            .collect();

        let object = self.name.clone();
        for slot in self.bones.values_mut() {
            for constraint in &mut slot.constraints {
                let results: Vec<(String, f64)> = constraint
                    .drivers
                    .iter()
                    .filter_map(|(field, driver)| {
                        driver
                            .evaluate(|variable| {
                                if variable.target != object {
                                    return None;
                                }
                                let key = (
                                    variable.data_path.bone_name.clone(),
                                    variable.data_path.prop_name.clone(),
                                );
                                values.get(&key).copied()
                            })
                            .map(|value| (field.clone(), value))
                    })
                    .collect();
                for (field, value) in results {
                    constraint.apply_driven_value(&field, value);
                }
            }
        }
    }
}
