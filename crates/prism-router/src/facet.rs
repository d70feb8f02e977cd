//! The delegated-execution seam between the router and facet code.
//!
//! Facets are opaque units of logic addressed by [`Address`]. The router
//! never inspects them; it forwards a [`CallContext`] and lets the facet
//! read and write the router-owned [`FacetStore`] — the shared storage
//! context that makes delegation delegation rather than a plain call.
//!
//! [`CodeStore`] maps addresses to installed code. It sits beside the
//! persistent state, not inside it: code is immutable once installed and
//! is not part of the durable record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Execution context forwarded to facet code.
///
/// `caller` is the external caller's identity, preserved across the
/// delegation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    pub value: u128,
    pub calldata: Vec<u8>,
}

/// A facet-signalled failure. Aborts and unwinds the whole invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetRevert {
    pub reason: String,
}

impl FacetRevert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FacetRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "facet reverted: {}", self.reason)
    }
}

impl std::error::Error for FacetRevert {}

/// The router-owned open keyspace facet code mutates under delegation.
///
/// The core's own records (routing table, owner, proposals, audit log) are
/// not in this keyspace and are mutated only through the core's typed
/// operations.
pub type FacetStore = BTreeMap<String, serde_json::Value>;

/// Executable logic installed at an address.
///
/// Implementations return raw bytes on success or a [`FacetRevert`]; the
/// router treats both as opaque and propagates them verbatim.
pub trait FacetCode {
    fn invoke(&self, ctx: &CallContext, store: &mut FacetStore) -> Result<Vec<u8>, FacetRevert>;
}

/// Installed code, keyed by address.
#[derive(Default)]
pub struct CodeStore {
    code: BTreeMap<Address, Box<dyn FacetCode>>,
}

impl CodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install code at `address`, replacing anything already there.
    pub fn install(&mut self, address: Address, code: Box<dyn FacetCode>) {
        self.code.insert(address, code);
    }

    pub fn code_at(&self, address: &Address) -> Option<&dyn FacetCode> {
        self.code.get(address).map(|code| &**code)
    }

    pub fn has_code(&self, address: &Address) -> bool {
        self.code.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl fmt::Debug for CodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeStore")
            .field("addresses", &self.code.keys().collect::<Vec<_>>())
            .finish()
    }
}
