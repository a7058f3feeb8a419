use std::{
    collections::{HashMap, hash_map::Entry},
    path::{Path, PathBuf},
};

use crate::{PricingErr, PricingNet, Result, Variant, loader};

/// Loads each variant's model on first use and keeps it for every later request.
///
/// Cached nets are only handed out by shared reference, so they stay exactly as loaded.
#[derive(Debug, Default)]
pub struct ModelSet {
    paths: HashMap<Variant, PathBuf>,
    loaded: HashMap<Variant, PricingNet>,
}

impl ModelSet {
    /// Creates a new `ModelSet`.
    ///
    /// # Arguments
    /// * `paths` - The parameter file of each variant that may be requested.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = (Variant, P)>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(|(v, p)| (v, p.into())).collect(),
            loaded: HashMap::new(),
        }
    }

    pub fn path(&self, variant: Variant) -> Option<&Path> {
        self.paths.get(&variant).map(PathBuf::as_path)
    }

    pub fn is_loaded(&self, variant: Variant) -> bool {
        self.loaded.contains_key(&variant)
    }

    /// Returns the variant's net, loading it first if this is the first request for it.
    ///
    /// A failed load caches nothing, so the next call tries the file again.
    pub fn get(&mut self, variant: Variant) -> Result<&PricingNet> {
        match self.loaded.entry(variant) {
            Entry::Occupied(e) => Ok(&*e.into_mut()),
            Entry::Vacant(e) => {
                let path = self
                    .paths
                    .get(&variant)
                    .ok_or(PricingErr::NoModelPath(variant))?;

                let net = loader::load(variant, path)?;
                Ok(&*e.insert(net))
            }
        }
    }
}
