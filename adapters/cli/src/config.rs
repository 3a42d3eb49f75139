//! Optional TOML files that replace the built-in session settings and tables.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use survival_core::{Catalog, WorldConfig};

const DEFAULT_SEED: u64 = 0x5eed_cafe;

/// Contents of the session configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SessionFile {
    /// Seed for enemy placement.
    pub(crate) seed: u64,
    /// Playfield and map count.
    pub(crate) world: WorldConfig,
}

impl Default for SessionFile {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            world: WorldConfig::default(),
        }
    }
}

impl SessionFile {
    /// Parses a session file from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse session configuration toml")
    }

    /// Reads the file at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session configuration {}", path.display()))?;
        Self::parse(&contents)
    }
}

/// Reads a replacement catalog, or the standard one when no path is given.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::standard());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse catalog toml")
}
