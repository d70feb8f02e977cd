//! Batched routing-table upgrades (the cut operation).
//!
//! A cut is an ordered batch of entries, each adding, replacing, or
//! removing a set of selectors. Entries are validated and applied in
//! order; later entries may touch selectors affected by earlier entries in
//! the same batch. The whole batch is one atomic unit together with the
//! optional initializer call — the router's commit boundary guarantees
//! that a failure at any step leaves the live state untouched.
//!
//! [`apply_batch`] mutates the table it is given in place. Callers pass a
//! scratch copy and own the commit-or-discard decision; on error the
//! scratch is partially mutated and must be discarded.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::selector::Selector;
use crate::selector_table::SelectorTable;

// ---------------------------------------------------------------------------
// Cut batch types
// ---------------------------------------------------------------------------

/// What a cut entry does to its selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutAction {
    Add,
    Replace,
    Remove,
}

impl fmt::Display for CutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Replace => f.write_str("replace"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

/// One line of an upgrade batch.
///
/// For `Add` and `Replace` the facet is the new routing target and must be
/// non-zero. For `Remove` the facet must be the zero sentinel — removal is
/// determined purely by selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutEntry {
    pub facet: Address,
    pub action: CutAction,
    pub selectors: Vec<Selector>,
}

/// One-shot initializer riding with a cut: `calldata` is delegate-executed
/// against `target`'s code in the router's own storage context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitCall {
    pub target: Address,
    pub calldata: Vec<u8>,
}

/// Per-entry summary recorded in the applied-cut artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutEntrySummary {
    pub facet: Address,
    pub action: CutAction,
    pub selector_count: usize,
}

/// Artifact describing a committed cut, for audit and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutApplied {
    pub entries: Vec<CutEntrySummary>,
    pub init_target: Option<Address>,
}

// ---------------------------------------------------------------------------
// UpgradeError
// ---------------------------------------------------------------------------

/// Errors from cut validation and application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeError {
    NotOwner {
        caller: Address,
        owner: Address,
    },
    EmptyBatch,
    EmptySelectorSet {
        entry_index: usize,
    },
    DuplicateSelectorInEntry {
        entry_index: usize,
        selector: Selector,
    },
    ZeroFacetAddress {
        entry_index: usize,
        action: CutAction,
    },
    SelectorAlreadyRegistered {
        selector: Selector,
        existing: Address,
    },
    SelectorNotRegistered {
        selector: Selector,
    },
    ReplaceWithSameFacet {
        selector: Selector,
        facet: Address,
    },
    RemoveTargetsFacet {
        entry_index: usize,
        facet: Address,
    },
    InitializationFailed {
        target: Address,
        reason: String,
    },
}

impl fmt::Display for UpgradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOwner { caller, owner } => {
                write!(f, "caller {caller} is not the owner {owner}")
            }
            Self::EmptyBatch => write!(f, "cut batch has no entries"),
            Self::EmptySelectorSet { entry_index } => {
                write!(f, "entry {entry_index} has an empty selector set")
            }
            Self::DuplicateSelectorInEntry {
                entry_index,
                selector,
            } => write!(
                f,
                "entry {entry_index} lists selector {selector} more than once"
            ),
            Self::ZeroFacetAddress {
                entry_index,
                action,
            } => write!(
                f,
                "entry {entry_index}: {action} must not target the zero address"
            ),
            Self::SelectorAlreadyRegistered { selector, existing } => {
                write!(f, "selector {selector} already routes to {existing}")
            }
            Self::SelectorNotRegistered { selector } => {
                write!(f, "selector {selector} is not registered")
            }
            Self::ReplaceWithSameFacet { selector, facet } => {
                write!(f, "selector {selector} already routes to {facet}")
            }
            Self::RemoveTargetsFacet { entry_index, facet } => write!(
                f,
                "entry {entry_index}: remove must target the zero address, got {facet}"
            ),
            Self::InitializationFailed { target, reason } => {
                write!(f, "initializer {target} failed: {reason}")
            }
        }
    }
}

impl std::error::Error for UpgradeError {}

// ---------------------------------------------------------------------------
// Batch application
// ---------------------------------------------------------------------------

/// Validate and apply a cut batch to `table`, entry by entry, in order.
///
/// Mutates `table` in place; the caller supplies a scratch copy and
/// discards it on error. Returns the per-entry summaries for the
/// applied-cut artifact.
pub fn apply_batch(
    table: &mut SelectorTable,
    batch: &[CutEntry],
) -> Result<Vec<CutEntrySummary>, UpgradeError> {
    if batch.is_empty() {
        return Err(UpgradeError::EmptyBatch);
    }

    let mut summaries = Vec::with_capacity(batch.len());
    for (entry_index, entry) in batch.iter().enumerate() {
        if entry.selectors.is_empty() {
            return Err(UpgradeError::EmptySelectorSet { entry_index });
        }
        let mut seen = BTreeSet::new();
        for selector in &entry.selectors {
            if !seen.insert(*selector) {
                return Err(UpgradeError::DuplicateSelectorInEntry {
                    entry_index,
                    selector: *selector,
                });
            }
        }

        match entry.action {
            CutAction::Add => {
                if entry.facet.is_zero() {
                    return Err(UpgradeError::ZeroFacetAddress {
                        entry_index,
                        action: entry.action,
                    });
                }
                for selector in &entry.selectors {
                    if let Some(existing) = table.resolve(selector) {
                        return Err(UpgradeError::SelectorAlreadyRegistered {
                            selector: *selector,
                            existing,
                        });
                    }
                    table.register(*selector, entry.facet);
                }
            }
            CutAction::Replace => {
                if entry.facet.is_zero() {
                    return Err(UpgradeError::ZeroFacetAddress {
                        entry_index,
                        action: entry.action,
                    });
                }
                for selector in &entry.selectors {
                    match table.resolve(selector) {
                        None => {
                            return Err(UpgradeError::SelectorNotRegistered {
                                selector: *selector,
                            });
                        }
                        Some(current) if current == entry.facet => {
                            return Err(UpgradeError::ReplaceWithSameFacet {
                                selector: *selector,
                                facet: entry.facet,
                            });
                        }
                        Some(_) => table.register(*selector, entry.facet),
                    }
                }
            }
            CutAction::Remove => {
                if !entry.facet.is_zero() {
                    return Err(UpgradeError::RemoveTargetsFacet {
                        entry_index,
                        facet: entry.facet,
                    });
                }
                for selector in &entry.selectors {
                    if table.resolve(selector).is_none() {
                        return Err(UpgradeError::SelectorNotRegistered {
                            selector: *selector,
                        });
                    }
                    table.unregister(selector);
                }
            }
        }

        summaries.push(CutEntrySummary {
            facet: entry.facet,
            action: entry.action,
            selector_count: entry.selectors.len(),
        });
    }

    Ok(summaries)
}
