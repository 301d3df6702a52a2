//! Module registry: the `luadts.toml` manifest listing every module to build.
//!
//! ```toml
//! out_dir = "types"
//!
//! [[module]]
//! name = "physics"
//! source = "lua/physics.lua"
//! main_export = "physics"
//! filter_classes = ["physics*", "Body"]
//! declare_global_var = true
//! patch = "all"
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use crate::config::ModuleConfig;
use crate::error::RegistryError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Registry {
    /// Where `<name>.d.ts` files are written.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleConfig>,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("types")
}

impl Registry {
    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml(&text, base).map_err(|err| match err {
            RegistryError::Parse { source, .. } => RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse manifest text, resolving relative paths against `base`.
    pub fn from_toml(text: &str, base: &Path) -> Result<Self, RegistryError> {
        let mut registry: Registry =
            toml::from_str(text).map_err(|source| RegistryError::Parse {
                path: base.to_path_buf(),
                source,
            })?;

        let mut seen = HashSet::new();
        for module in &registry.modules {
            if !seen.insert(module.name.as_str()) {
                return Err(RegistryError::DuplicateModule(module.name.clone()));
            }
        }

        registry.out_dir = base.join(&registry.out_dir);
        for module in &mut registry.modules {
            module.source = base.join(&module.source);
        }
        Ok(registry)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Output path for one module's declarations.
    pub fn output_path(&self, module: &ModuleConfig, extension: &str) -> PathBuf {
        self.out_dir.join(format!("{}.{}", module.name, extension))
    }
}
