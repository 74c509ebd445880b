//! Material quality store - the grade of each processed material.

use std::collections::BTreeMap;

use hamlet_logic::quality::QualityProvider;
use hamlet_logic::resource::ResourceId;
use serde::{Deserialize, Serialize};

/// Current quality per material; materials never graded report the default
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterialQualities {
    grades: BTreeMap<ResourceId, u32>,
    default_quality: u32,
}

impl MaterialQualities {
    pub fn new(default_quality: u32) -> Self {
        Self {
            grades: BTreeMap::new(),
            default_quality,
        }
    }

    pub fn default_quality(&self) -> u32 {
        self.default_quality
    }

    /// Graded materials in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, u32)> + '_ {
        self.grades.iter().map(|(&id, &q)| (id, q))
    }
}

impl QualityProvider for MaterialQualities {
    fn material_quality(&self, id: ResourceId) -> u32 {
        self.grades.get(&id).copied().unwrap_or(self.default_quality)
    }

    fn set_material_quality(&mut self, id: ResourceId, value: u32) {
        self.grades.insert(id, value);
    }
}
