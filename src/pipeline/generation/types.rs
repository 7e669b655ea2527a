use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::SectionKind;
use super::GenerationError;

/// The structured document handed to the template renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSpecification {
    pub template_slug: String,
    #[serde(default)]
    pub brand: Brand,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub palette: Vec<PaletteEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaletteEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: String,
    pub kind: SectionKind,
    /// Open-shaped; expected fields depend on `kind`.
    #[serde(default)]
    pub props: Map<String, Value>,
}

/// Text-generation backend abstraction (allows mocking).
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one system + user instruction pair and return the raw text answer.
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError>;

    fn model_name(&self) -> &str;
}
