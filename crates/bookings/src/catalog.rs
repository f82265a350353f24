//! Material catalog lookup used to enrich aggregated lines.
//!
//! The catalog only supplies display attributes. It never decides which lines
//! appear and its current price never feeds reported cost.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use solarops_core::MaterialId;

/// Static attributes of a catalog material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub description: String,
    #[serde(default)]
    pub unit: String,
    /// Pack size, e.g. 50 clamps per box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_unit: Option<f64>,
    /// Today's list price. Not used for project cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
}

/// Lookup of materials by id.
pub trait MaterialCatalog {
    fn get(&self, id: &MaterialId) -> Option<&Material>;
}

impl MaterialCatalog for HashMap<MaterialId, Material> {
    fn get(&self, id: &MaterialId) -> Option<&Material> {
        HashMap::get(self, id)
    }
}

impl MaterialCatalog for [Material] {
    fn get(&self, id: &MaterialId) -> Option<&Material> {
        self.iter().find(|m| &m.id == id)
    }
}

impl MaterialCatalog for Vec<Material> {
    fn get(&self, id: &MaterialId) -> Option<&Material> {
        MaterialCatalog::get(self.as_slice(), id)
    }
}

impl<C: MaterialCatalog + ?Sized> MaterialCatalog for &C {
    fn get(&self, id: &MaterialId) -> Option<&Material> {
        (**self).get(id)
    }
}

/// HashMap-backed catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    materials: HashMap<MaterialId, Material>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list; later duplicates of an id replace earlier ones.
    pub fn from_materials(materials: impl IntoIterator<Item = Material>) -> Self {
        Self {
            materials: materials.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn insert(&mut self, material: Material) {
        self.materials.insert(material.id.clone(), material);
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialCatalog for InMemoryCatalog {
    fn get(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }
}

/// Display attributes joined onto an aggregated line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDetails {
    pub description: String,
    pub unit: String,
    pub items_per_unit: Option<f64>,
}

impl MaterialDetails {
    /// Stand-in for a material id the catalog does not know.
    pub fn placeholder(id: &MaterialId) -> Self {
        Self {
            description: id.as_str().to_string(),
            unit: String::new(),
            items_per_unit: None,
        }
    }

    pub fn lookup<C: MaterialCatalog + ?Sized>(catalog: &C, id: &MaterialId) -> Self {
        match catalog.get(id) {
            Some(m) => Self::from(m),
            None => {
                tracing::debug!(material_id = %id, "material missing from catalog; using placeholder");
                Self::placeholder(id)
            }
        }
    }
}

impl From<&Material> for MaterialDetails {
    fn from(m: &Material) -> Self {
        Self {
            description: m.description.clone(),
            unit: m.unit.clone(),
            items_per_unit: m.items_per_unit,
        }
    }
}
