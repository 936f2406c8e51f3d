// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Extractor configuration: named signature/phenotype groups plus the
//! widths of the shared trunk, main latent space, and decoder. Group maps
//! keep insertion order; that order is the canonical concatenation order of
//! the latent spaces and must not drift between calls.

use crate::error::{GroupKind, OmicsError, OmicsResult};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Latent and output widths of one signature or phenotype group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub latent_dim: usize,
    pub output_dim: usize,
}

impl GroupSpec {
    pub fn new(latent_dim: usize, output_dim: usize) -> Self {
        Self {
            latent_dim,
            output_dim,
        }
    }
}

/// Ordered name → [`GroupSpec`] collection. Iteration follows insertion
/// order; the key set is fixed once the owning config is handed to the
/// extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupConfig {
    entries: Vec<(String, GroupSpec)>,
}

impl GroupConfig {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a group. Returns `false` when the name is already taken and
    /// leaves the collection unchanged.
    pub fn insert(&mut self, name: impl Into<String>, spec: GroupSpec) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, spec));
        true
    }

    /// Looks a group up by name.
    pub fn get(&self, name: &str) -> Option<&GroupSpec> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, spec)| spec)
    }

    /// Returns `true` when a group with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    /// Group names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, spec)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no groups are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the latent widths across every group.
    pub fn total_latent_dim(&self) -> usize {
        self.entries.iter().map(|(_, spec)| spec.latent_dim).sum()
    }
}

impl Serialize for GroupConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, spec) in &self.entries {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GroupConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupConfigVisitor;

        impl<'de> Visitor<'de> for GroupConfigVisitor {
            type Value = GroupConfig;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a map of group name to {latent_dim, output_dim}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut config = GroupConfig::new();
                while let Some((name, spec)) = access.next_entry::<String, GroupSpec>()? {
                    if !config.insert(name.clone(), spec) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate group `{name}`"
                        )));
                    }
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(GroupConfigVisitor)
    }
}

fn default_encoder_neurons() -> usize {
    50
}

fn default_decoder_neurons() -> usize {
    50
}

fn default_main_latent_dim() -> usize {
    2
}

fn default_seed() -> u64 {
    42
}

/// Full description of an extractor instance. Construction of the model is
/// deterministic given one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Number of genes per expression vector.
    pub input_dim: usize,
    /// Width of the shared trunk representation.
    #[serde(default = "default_encoder_neurons")]
    pub encoder_neurons: usize,
    /// Hidden width of the reconstruction decoder.
    #[serde(default = "default_decoder_neurons")]
    pub decoder_neurons: usize,
    /// Width of the main (unsupervised) latent space.
    #[serde(default = "default_main_latent_dim")]
    pub main_latent_dim: usize,
    /// Signature groups, each with a latent subspace and a regressor head.
    #[serde(default)]
    pub signatures: GroupConfig,
    /// Phenotype groups, each with a latent subspace and a classifier head.
    #[serde(default)]
    pub phenotypes: GroupConfig,
    /// Seed for weight initialisation.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Emit a structure dump through `tracing` once assembly finishes.
    #[serde(default)]
    pub verbose: bool,
}

impl ExtractorConfig {
    /// Starts a config with default widths and no auxiliary groups.
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            encoder_neurons: default_encoder_neurons(),
            decoder_neurons: default_decoder_neurons(),
            main_latent_dim: default_main_latent_dim(),
            signatures: GroupConfig::new(),
            phenotypes: GroupConfig::new(),
            seed: default_seed(),
            verbose: false,
        }
    }

    /// Adds a signature group.
    pub fn with_signature(
        mut self,
        name: impl Into<String>,
        latent_dim: usize,
        output_dim: usize,
    ) -> OmicsResult<Self> {
        let name = name.into();
        if !self
            .signatures
            .insert(name.clone(), GroupSpec::new(latent_dim, output_dim))
        {
            return Err(OmicsError::DuplicateGroup {
                kind: GroupKind::Signature,
                name,
            });
        }
        Ok(self)
    }

    /// Adds a phenotype group.
    pub fn with_phenotype(
        mut self,
        name: impl Into<String>,
        latent_dim: usize,
        output_dim: usize,
    ) -> OmicsResult<Self> {
        let name = name.into();
        if !self
            .phenotypes
            .insert(name.clone(), GroupSpec::new(latent_dim, output_dim))
        {
            return Err(OmicsError::DuplicateGroup {
                kind: GroupKind::Phenotype,
                name,
            });
        }
        Ok(self)
    }

    /// Combined width of every latent space: main plus all signature and
    /// phenotype subspaces. The decoder input is fixed to this value.
    pub fn total_latent_dim(&self) -> usize {
        self.main_latent_dim + self.signatures.total_latent_dim() + self.phenotypes.total_latent_dim()
    }

    /// Fails fast on any zero width.
    pub fn validate(&self) -> OmicsResult<()> {
        fn positive(field: impl Into<String>, value: usize) -> OmicsResult<()> {
            if value == 0 {
                return Err(OmicsError::InvalidDimension {
                    field: field.into(),
                });
            }
            Ok(())
        }

        positive("input_dim", self.input_dim)?;
        positive("encoder_neurons", self.encoder_neurons)?;
        positive("decoder_neurons", self.decoder_neurons)?;
        positive("main_latent_dim", self.main_latent_dim)?;
        for (name, spec) in self.signatures.iter() {
            positive(format!("signatures.{name}.latent_dim"), spec.latent_dim)?;
            positive(format!("signatures.{name}.output_dim"), spec.output_dim)?;
        }
        for (name, spec) in self.phenotypes.iter() {
            positive(format!("phenotypes.{name}.latent_dim"), spec.latent_dim)?;
            positive(format!("phenotypes.{name}.output_dim"), spec.output_dim)?;
        }
        Ok(())
    }

    /// Reads a config from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> OmicsResult<Self> {
        let file = File::open(path.as_ref()).map_err(|err| OmicsError::ConfigIo {
            message: err.to_string(),
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|err| OmicsError::ConfigParse {
            message: err.to_string(),
        })
    }

    /// Writes the config to a JSON file.
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> OmicsResult<()> {
        let file = File::create(path.as_ref()).map_err(|err| OmicsError::ConfigIo {
            message: err.to_string(),
        })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|err| OmicsError::ConfigParse {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_config_preserves_insertion_order() {
        let mut groups = GroupConfig::new();
        assert!(groups.insert("zeta", GroupSpec::new(2, 3)));
        assert!(groups.insert("alpha", GroupSpec::new(1, 4)));
        assert!(groups.insert("mid", GroupSpec::new(3, 1)));
        let names: Vec<&str> = groups.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(groups.total_latent_dim(), 6);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut groups = GroupConfig::new();
        assert!(groups.insert("sig1", GroupSpec::new(1, 1)));
        assert!(!groups.insert("sig1", GroupSpec::new(2, 2)));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get("sig1"), Some(&GroupSpec::new(1, 1)));

        let config = ExtractorConfig::new(10)
            .with_signature("sig1", 1, 3)
            .unwrap();
        assert!(matches!(
            config.with_signature("sig1", 2, 2),
            Err(OmicsError::DuplicateGroup { .. })
        ));
    }

    #[test]
    fn json_round_trip_keeps_group_order() {
        let config = ExtractorConfig::new(10)
            .with_signature("zeta", 1, 3)
            .unwrap()
            .with_signature("alpha", 2, 2)
            .unwrap()
            .with_phenotype("stage", 1, 4)
            .unwrap();
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: ExtractorConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, config);
        let names: Vec<&str> = decoded.signatures.names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn duplicate_keys_in_json_fail_to_parse() {
        let raw = r#"{
            "input_dim": 10,
            "signatures": {
                "sig1": {"latent_dim": 1, "output_dim": 3},
                "sig1": {"latent_dim": 2, "output_dim": 2}
            }
        }"#;
        assert!(serde_json::from_str::<ExtractorConfig>(raw).is_err());
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let decoded: ExtractorConfig = serde_json::from_str(r#"{"input_dim": 7}"#).unwrap();
        assert_eq!(decoded.encoder_neurons, 50);
        assert_eq!(decoded.decoder_neurons, 50);
        assert_eq!(decoded.main_latent_dim, 2);
        assert_eq!(decoded.seed, 42);
        assert!(decoded.signatures.is_empty());
        assert!(!decoded.verbose);
    }

    #[test]
    fn zero_widths_fail_validation() {
        let mut config = ExtractorConfig::new(10);
        config.main_latent_dim = 0;
        assert!(matches!(
            config.validate(),
            Err(OmicsError::InvalidDimension { field }) if field == "main_latent_dim"
        ));

        let config = ExtractorConfig::new(10).with_signature("sig1", 0, 3).unwrap();
        assert!(matches!(
            config.validate(),
            Err(OmicsError::InvalidDimension { field }) if field == "signatures.sig1.latent_dim"
        ));
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractor.json");
        let config = ExtractorConfig::new(12)
            .with_signature("sig1", 1, 3)
            .unwrap();
        config.to_path(&path).unwrap();
        let loaded = ExtractorConfig::from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
