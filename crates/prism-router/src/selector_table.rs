//! Selector-to-facet routing table with a reverse introspection index.
//!
//! The table keeps two views of the same routing relation:
//! - forward: selector → facet address (the dispatch path);
//! - reverse: facet address → ordered selector list (introspection).
//!
//! Invariants, maintained by every primitive:
//! - forward and reverse views are always mutually consistent;
//! - a selector absent from the forward map appears in no reverse list;
//! - reverse lists contain no duplicates.
//!
//! The primitives here are deliberately unchecked against upgrade policy:
//! batch semantics (Add/Replace/Remove validation, atomicity) live in the
//! upgrade path, which is the table's only mutator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::selector::Selector;

/// One facet and the selectors currently routed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetInfo {
    pub facet: Address,
    pub selectors: Vec<Selector>,
}

/// The routing table.
///
/// `BTreeMap`-backed so iteration, introspection, and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorTable {
    forward: BTreeMap<Selector, Address>,
    reverse: BTreeMap<Address, Vec<Selector>>,
}

impl SelectorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Facet currently mapped for `selector`, if any.
    pub fn resolve(&self, selector: &Selector) -> Option<Address> {
        self.forward.get(selector).copied()
    }

    /// Map `selector` to `facet`, overwriting any previous mapping and
    /// keeping both views consistent.
    pub fn register(&mut self, selector: Selector, facet: Address) {
        if let Some(previous) = self.forward.insert(selector, facet) {
            if previous == facet {
                return;
            }
            self.remove_from_reverse(&previous, &selector);
        }
        let list = self.reverse.entry(facet).or_default();
        if !list.contains(&selector) {
            list.push(selector);
        }
    }

    /// Remove `selector` from both views. A no-op for unmapped selectors.
    pub fn unregister(&mut self, selector: &Selector) {
        if let Some(facet) = self.forward.remove(selector) {
            self.remove_from_reverse(&facet, selector);
        }
    }

    fn remove_from_reverse(&mut self, facet: &Address, selector: &Selector) {
        if let Some(list) = self.reverse.get_mut(facet) {
            list.retain(|s| s != selector);
            if list.is_empty() {
                self.reverse.remove(facet);
            }
        }
    }

    /// Selectors routed to `facet`, in registration order.
    pub fn selectors_of(&self, facet: &Address) -> &[Selector] {
        self.reverse.get(facet).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All facets with their selector lists.
    pub fn facets(&self) -> Vec<FacetInfo> {
        self.reverse
            .iter()
            .map(|(facet, selectors)| FacetInfo {
                facet: *facet,
                selectors: selectors.clone(),
            })
            .collect()
    }

    /// All facet addresses with at least one routed selector.
    pub fn facet_addresses(&self) -> Vec<Address> {
        self.reverse.keys().copied().collect()
    }

    /// Number of routed selectors.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Check mutual consistency of the forward and reverse views.
    ///
    /// True iff every reverse entry resolves forward to its facet, every
    /// forward entry appears exactly once in its facet's reverse list, and
    /// no reverse list is empty.
    pub fn is_consistent(&self) -> bool {
        for (facet, selectors) in &self.reverse {
            if selectors.is_empty() {
                return false;
            }
            for selector in selectors {
                if self.forward.get(selector) != Some(facet) {
                    return false;
                }
            }
            let mut sorted = selectors.clone();
            sorted.sort();
            sorted.dedup();
            if sorted.len() != selectors.len() {
                return false;
            }
        }
        for (selector, facet) in &self.forward {
            match self.reverse.get(facet) {
                Some(list) if list.contains(selector) => {}
                _ => return false,
            }
        }
        true
    }
}
