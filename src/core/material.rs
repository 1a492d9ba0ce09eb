use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Index of a material inside a [`MaterialTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub usize);

/// Physical material of a solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub name: String,
    /// Density in kg/m³, used when mass is derived from the mesh volume.
    pub density: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            density: 1000.0,
            restitution: 0.0,
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>, density: f32, restitution: f32) -> Self {
        Self {
            name: name.into(),
            density,
            restitution,
        }
    }

    pub fn steel() -> Self {
        Self::new("steel", 7810.0, 0.4)
    }

    pub fn aluminium() -> Self {
        Self::new("aluminium", 2700.0, 0.5)
    }

    pub fn rubber() -> Self {
        Self::new("rubber", 1340.0, 0.8)
    }

    pub fn neutral() -> Self {
        Self::new("neutral", 1000.0, 0.0)
    }
}

/// Static and dynamic friction coefficients of a material pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionPair {
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

impl FrictionPair {
    pub fn new(static_friction: f32, dynamic_friction: f32) -> Self {
        Self {
            static_friction,
            dynamic_friction,
        }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Default for FrictionPair {
    fn default() -> Self {
        Self::new(0.5, 0.3)
    }
}

/// Registry of materials and their pairwise friction coefficients.
///
/// Pair lookup is symmetric; pairs that were never configured fall back to
/// `default_pair`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialTable {
    materials: Vec<Material>,
    #[serde(with = "pair_entries")]
    pairs: HashMap<(MaterialId, MaterialId), FrictionPair>,
    pub default_pair: FrictionPair,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material, replacing an existing one with the same name.
    pub fn add(&mut self, material: Material) -> MaterialId {
        if let Some(id) = self.find(&material.name) {
            self.materials[id.0] = material;
            return id;
        }
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn find(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|material| material.name == name)
            .map(MaterialId)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn set_friction(&mut self, a: MaterialId, b: MaterialId, pair: FrictionPair) {
        self.pairs.insert(Self::key(a, b), pair);
    }

    pub fn friction(&self, a: MaterialId, b: MaterialId) -> FrictionPair {
        self.pairs
            .get(&Self::key(a, b))
            .copied()
            .unwrap_or(self.default_pair)
    }

    /// Restitution of a contact between two materials: the product of both coefficients.
    pub fn restitution(&self, a: MaterialId, b: MaterialId) -> f32 {
        let ra = self.get(a).map(|m| m.restitution).unwrap_or(0.0);
        let rb = self.get(b).map(|m| m.restitution).unwrap_or(0.0);
        ra * rb
    }

    fn key(a: MaterialId, b: MaterialId) -> (MaterialId, MaterialId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Tuple keys are not valid JSON object keys, so pairs serialize as a list.
mod pair_entries {
    use super::{FrictionPair, MaterialId};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    #[derive(Serialize, Deserialize)]
    struct Entry {
        a: MaterialId,
        b: MaterialId,
        #[serde(flatten)]
        pair: FrictionPair,
    }

    pub fn serialize<S: Serializer>(
        pairs: &HashMap<(MaterialId, MaterialId), FrictionPair>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<Entry> = pairs
            .iter()
            .map(|(&(a, b), &pair)| Entry { a, b, pair })
            .collect();
        entries.sort_by_key(|entry| (entry.a, entry.b));
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<(MaterialId, MaterialId), FrictionPair>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let key = if entry.a <= entry.b {
                    (entry.a, entry.b)
                } else {
                    (entry.b, entry.a)
                };
                (key, entry.pair)
            })
            .collect())
    }
}
