#![forbid(unsafe_code)]

//! Routing-and-governance core for a modular, upgradeable dispatcher.
//!
//! Three pieces, each with hard invariants:
//! - a selector → facet routing table mutated only by atomic batched cuts
//!   (add/replace/remove), optionally paired with a one-shot initializer
//!   that commits or rolls back with the batch;
//! - a single-owner guard gating every table mutation;
//! - an independent N-of-M multisig collecting confirmations before an
//!   arbitrary encoded call may execute, with replay protection.
//!
//! Facet logic itself is opaque to the core: facets are addressed units of
//! code behind the [`facet::FacetCode`] seam, delegate-executed in the
//! router's own storage context. Every mutating entry point is atomic —
//! it commits in full or leaves no observable trace, including an
//! append-only audit log that records exactly the committed operations.

pub mod access_guard;
pub mod address;
pub mod audit;
pub mod error_code;
pub mod facet;
pub mod multisig;
pub mod router;
pub mod selector;
pub mod selector_table;
pub mod upgrade;

pub use access_guard::{AccessError, AccessGuard, OwnershipTransferred};
pub use address::Address;
pub use facet::{CallContext, CodeStore, FacetCode, FacetRevert, FacetStore};
pub use multisig::{ExecutionReceipt, MultiSigError, MultiSigModule, Proposal, ProposalExecutor};
pub use router::{DispatchError, Router, RouterState};
pub use selector::Selector;
pub use selector_table::{FacetInfo, SelectorTable};
pub use upgrade::{CutAction, CutApplied, CutEntry, InitCall, UpgradeError};
