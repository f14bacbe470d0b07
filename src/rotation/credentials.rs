//! Credential Pairs
//!
//! Two secrets per provider family, read once at start-up.

use crate::rotation::store::SLOTS;
use std::collections::HashMap;

/// Two credentials for one provider family
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialPair {
    keys: [Option<String>; SLOTS],
}

impl CredentialPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::from_options(Some(first.into()), Some(second.into()))
    }

    /// Build from possibly-unset slots; empty strings count as unset
    pub fn from_options(first: Option<String>, second: Option<String>) -> Self {
        let clean = |k: Option<String>| k.filter(|v| !v.trim().is_empty());
        Self {
            keys: [clean(first), clean(second)],
        }
    }

    /// Read `{FAMILY}_API_KEY_1` and `{FAMILY}_API_KEY_2`
    pub fn from_env(family: &str) -> Self {
        let prefix = family.to_uppercase();
        Self::from_options(
            std::env::var(format!("{}_API_KEY_1", prefix)).ok(),
            std::env::var(format!("{}_API_KEY_2", prefix)).ok(),
        )
    }

    /// Credential for a rotation index (reduced modulo 2)
    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys[index % SLOTS].as_deref()
    }

    pub fn configured_slots(&self) -> usize {
        self.keys.iter().filter(|k| k.is_some()).count()
    }
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("CredentialPair")
            .field("first", &mask(&self.keys[0]))
            .field("second", &mask(&self.keys[1]))
            .finish()
    }
}

/// Credential pairs keyed by family name (case-insensitive)
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pairs: HashMap<String, CredentialPair>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a pair from the environment for every family given
    pub fn from_env<'a>(families: impl IntoIterator<Item = &'a str>) -> Self {
        let mut creds = Self::new();
        for family in families {
            creds.insert(family, CredentialPair::from_env(family));
        }
        creds
    }

    pub fn insert(&mut self, family: &str, pair: CredentialPair) {
        self.pairs.insert(family.to_lowercase(), pair);
    }

    pub fn with(mut self, family: &str, pair: CredentialPair) -> Self {
        self.insert(family, pair);
        self
    }

    pub fn pair(&self, family: &str) -> Option<&CredentialPair> {
        self.pairs.get(&family.to_lowercase())
    }

    /// Resolve a family's credential for a rotation index
    pub fn resolve(&self, family: &str, index: usize) -> Option<&str> {
        self.pair(family).and_then(|p| p.get(index))
    }
}
