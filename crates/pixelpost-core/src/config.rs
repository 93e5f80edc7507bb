//! Destination registry and configuration loading

use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Credentials for one Conversions API destination.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Destination {
    /// Pixel id the events are ingested under.
    pub pixel_id: String,
    /// Secret access token authenticating the pixel.
    pub access_token: String,
}

impl Destination {
    /// Creates a destination from a pixel id and its access token.
    pub fn new(pixel_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            pixel_id: pixel_id.into(),
            access_token: access_token.into(),
        }
    }
}

// The access token is a secret; keep it out of debug/log output.
impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("pixel_id", &self.pixel_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Ordered registry of named destinations.
///
/// Built once at startup and read-only afterwards; safe to share across
/// tasks. Insertion order is significant: when no default name is set,
/// resolution without a name falls back to the first-inserted entry.
#[derive(Debug, Clone)]
pub struct PixelRegistry {
    entries: Vec<(String, Destination)>,
    default_name: Option<String>,
}

impl PixelRegistry {
    /// Creates a registry holding a single destination.
    pub fn new(name: impl Into<String>, destination: Destination) -> Self {
        Self {
            entries: vec![(name.into(), destination)],
            default_name: None,
        }
    }

    /// Adds a destination, builder-style.
    pub fn with_destination(
        mut self,
        name: impl Into<String>,
        destination: Destination,
    ) -> Self {
        self.insert(name, destination);
        self
    }

    /// Adds a destination. An existing entry of the same name is replaced in
    /// place, keeping its position in the resolution order.
    pub fn insert(&mut self, name: impl Into<String>, destination: Destination) {
        let name = name.into();
        if let Some(pos) = self.entries.iter().position(|(n, _)| *n == name) {
            self.entries[pos].1 = destination;
        } else {
            self.entries.push((name, destination));
        }
    }

    /// Designates the fallback destination for calls that name none.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigurationNotFound` if no destination is registered
    /// under `name`.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.entries.iter().any(|(n, _)| n == name) {
            return Err(Error::configuration_not_found(name));
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    /// The designated default destination name, if one was set.
    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Resolves a destination.
    ///
    /// With a name, looks it up directly. Without one, uses the default name
    /// if set, else the first-inserted entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigurationNotFound` identifying the requested name
    /// when it is absent (or the registry is empty).
    pub fn resolve(&self, name: Option<&str>) -> Result<&Destination> {
        match name {
            Some(name) => self
                .entries
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, d)| d)
                .ok_or_else(|| Error::configuration_not_found(name)),
            None => {
                let fallback = self.default_name.as_deref();
                let entry = match fallback {
                    Some(default) => self.entries.iter().find(|(n, _)| n == default),
                    None => self.entries.first(),
                };
                entry
                    .map(|(_, d)| d)
                    .ok_or_else(|| Error::configuration_not_found(fallback.unwrap_or("<default>")))
            }
        }
    }

    /// Destination names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of registered destinations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no destination is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a single-destination registry from `PIXELPOST_PIXEL_ID` and
    /// `PIXELPOST_ACCESS_TOKEN`, registered under the name `default`.
    pub fn from_env() -> Result<Self> {
        let pixel_id = env::var("PIXELPOST_PIXEL_ID").map_err(|_| {
            Error::invalid_configuration("PIXELPOST_PIXEL_ID is not set")
        })?;
        let access_token = env::var("PIXELPOST_ACCESS_TOKEN").map_err(|_| {
            Error::invalid_configuration("PIXELPOST_ACCESS_TOKEN is not set")
        })?;
        Ok(Self::new("default", Destination::new(pixel_id, access_token)))
    }
}

/// On-disk registry shape:
///
/// ```toml
/// default = "main"
///
/// [destinations.main]
/// pixel_id = "123456789"
/// access_token = "secret"
/// ```
#[derive(Deserialize)]
struct RegistryFile {
    default: Option<String>,
    destinations: toml::Table,
}

/// Load the destination registry with precedence:
/// 1. Environment variables (highest priority)
/// 2. Project config (./pixelpost.toml)
/// 3. User config (~/.pixelpost/config.toml)
///
/// Environment credentials add (or replace) the `default` destination and
/// make it the default, on top of whatever a config file declared.
pub fn load_registry() -> Result<PixelRegistry> {
    let mut registry: Option<PixelRegistry> = None;

    if let Some(home_dir) = dirs::home_dir() {
        let user_config = home_dir.join(".pixelpost/config.toml");
        if user_config.exists() {
            registry = Some(load_registry_file(&user_config)?);
        }
    }

    let project_config = Path::new("pixelpost.toml");
    if project_config.exists() {
        registry = Some(load_registry_file(project_config)?);
    }

    if let (Ok(pixel_id), Ok(access_token)) = (
        env::var("PIXELPOST_PIXEL_ID"),
        env::var("PIXELPOST_ACCESS_TOKEN"),
    ) {
        let destination = Destination::new(pixel_id, access_token);
        let mut reg = match registry.take() {
            Some(mut reg) => {
                reg.insert("default", destination);
                reg
            }
            None => PixelRegistry::new("default", destination),
        };
        reg.set_default("default")?;
        registry = Some(reg);
    }

    registry.ok_or_else(|| {
        Error::invalid_configuration(
            "no destinations configured; set PIXELPOST_PIXEL_ID and \
             PIXELPOST_ACCESS_TOKEN or create pixelpost.toml",
        )
    })
}

/// Load a registry from a TOML file, preserving declaration order.
fn load_registry_file(path: &Path) -> Result<PixelRegistry> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::invalid_configuration(format!("failed to read {}: {}", path.display(), e))
    })?;
    let file: RegistryFile = toml::from_str(&content).map_err(|e| {
        Error::invalid_configuration(format!("failed to parse {}: {}", path.display(), e))
    })?;

    let mut destinations = file.destinations.into_iter();
    let (first_name, first_value) = destinations.next().ok_or_else(|| {
        Error::invalid_configuration(format!("{} declares no destinations", path.display()))
    })?;

    let mut registry = PixelRegistry::new(first_name.clone(), parse_destination(path, &first_name, first_value)?);
    for (name, value) in destinations {
        let destination = parse_destination(path, &name, value)?;
        registry.insert(name, destination);
    }

    if let Some(default) = file.default {
        registry.set_default(&default)?;
    }

    Ok(registry)
}

fn parse_destination(path: &Path, name: &str, value: toml::Value) -> Result<Destination> {
    value.try_into().map_err(|e| {
        Error::invalid_configuration(format!(
            "invalid destination `{}` in {}: {}",
            name,
            path.display(),
            e
        ))
    })
}
