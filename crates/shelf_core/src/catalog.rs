use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use shared::{domain::ToolEntry, error::CatalogError};

/// The static list of tool cards a page is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tools: Vec<ToolEntry>,
}

impl Catalog {
    pub fn from_toml(raw: &str, origin: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(raw).map_err(|err| CatalogError::Parse {
            path: origin.to_string(),
            message: err.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw, &path.display().to_string())
    }

    fn validate(&self) -> Result<(), CatalogError> {
        match self
            .tools
            .iter()
            .position(|tool| tool.name.trim().is_empty())
        {
            Some(index) => Err(CatalogError::EmptyName { index }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
