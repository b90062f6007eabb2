// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Per-user preferences that survive restarts.
//!
//! Preferences are a flat map of string keys to string values, stored as a
//! TOML table in the platform config directory. `ViewPreferences` is the
//! typed view of the keys the renderer cares about; values that fail to
//! parse fall back to their defaults.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FILE_NAME: &str = "preferences.toml";

/// Preference keys
pub mod keys {
    pub const ZOOM: &str = "zoom";
    pub const PAN_X: &str = "pan_x";
    pub const PAN_Y: &str = "pan_y";
    pub const SHOW_NODES: &str = "show_nodes";
    pub const SHOW_WAYS: &str = "show_ways";
    pub const SHOW_RELATIONS: &str = "show_relations";
    pub const REGION: &str = "region";
}

/// String key-value store backed by a TOML file
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    /// `None` keeps everything in memory
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// Preferences that are never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from the platform config directory, or fall back to memory
    pub fn in_config_dir() -> Self {
        match ProjectDirs::from("org", "osm-canvas", "osm-canvas") {
            Some(dirs) => Self::load(dirs.config_dir().join(FILE_NAME)),
            None => {
                tracing::warn!("No config directory available, preferences will not persist");
                Self::in_memory()
            }
        }
    }

    /// Load from `path`. A missing or unreadable file yields empty
    /// preferences that will be written back to `path`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed preferences at {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read preferences at {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            values,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Parse a value, warning and returning `None` if it is malformed
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring malformed preference {}={:?}", key, raw);
                None
            }
        }
    }

    /// Write all values to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let contents =
            toml::to_string(&self.values).context("Failed to serialize preferences")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write preferences to {:?}", path))?;
        Ok(())
    }
}

/// Restorable view state
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPreferences {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub show_nodes: bool,
    pub show_ways: bool,
    pub show_relations: bool,
    /// Last requested region (`min_lon,min_lat,max_lon,max_lat`)
    pub region: Option<String>,
}

impl Default for ViewPreferences {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            show_nodes: true,
            show_ways: true,
            show_relations: true,
            region: None,
        }
    }
}

impl ViewPreferences {
    pub fn read(prefs: &Preferences) -> Self {
        let defaults = Self::default();
        Self {
            zoom: prefs
                .parse::<f64>(keys::ZOOM)
                .filter(|zoom| zoom.is_finite() && *zoom > 0.0)
                .unwrap_or(defaults.zoom),
            pan_x: prefs
                .parse::<f64>(keys::PAN_X)
                .filter(|pan| pan.is_finite())
                .unwrap_or(defaults.pan_x),
            pan_y: prefs
                .parse::<f64>(keys::PAN_Y)
                .filter(|pan| pan.is_finite())
                .unwrap_or(defaults.pan_y),
            show_nodes: prefs.parse(keys::SHOW_NODES).unwrap_or(defaults.show_nodes),
            show_ways: prefs.parse(keys::SHOW_WAYS).unwrap_or(defaults.show_ways),
            show_relations: prefs
                .parse(keys::SHOW_RELATIONS)
                .unwrap_or(defaults.show_relations),
            region: prefs.get(keys::REGION).map(str::to_string),
        }
    }

    pub fn write(&self, prefs: &mut Preferences) {
        prefs.set(keys::ZOOM, self.zoom);
        prefs.set(keys::PAN_X, self.pan_x);
        prefs.set(keys::PAN_Y, self.pan_y);
        prefs.set(keys::SHOW_NODES, self.show_nodes);
        prefs.set(keys::SHOW_WAYS, self.show_ways);
        prefs.set(keys::SHOW_RELATIONS, self.show_relations);
        match &self.region {
            Some(region) => prefs.set(keys::REGION, region),
            None => prefs.remove(keys::REGION),
        }
    }
}
