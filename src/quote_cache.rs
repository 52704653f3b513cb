use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{catalog::Crop, price_feed::PriceQuote};

/// In-memory store of the most recent `PriceQuote` per crop.
///
/// Keyed by `Crop`, so it never holds more entries than the catalog has.
/// Cloning shares the same store; writes are last-write-wins.
#[derive(Clone, Default)]
pub struct QuoteCache {
    inner: Arc<RwLock<BTreeMap<Crop, PriceQuote>>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the cached quote for `quote.crop`, returning the previous one.
    pub fn update(&self, quote: PriceQuote) -> Option<PriceQuote> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(quote.crop, quote)
    }

    /// Return a snapshot of all cached quotes in catalog order.
    pub fn all(&self) -> Vec<PriceQuote> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Return the latest quote for `crop`, if present.
    pub fn get(&self, crop: Crop) -> Option<PriceQuote> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&crop)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
