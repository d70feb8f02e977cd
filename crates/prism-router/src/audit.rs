//! Append-only audit log of committed operations.
//!
//! Records are appended inside the invocation that produced them, so a
//! rolled-back invocation leaves no trace — the log describes exactly the
//! operations that actually took effect, in commit order. Ordering is a
//! monotonic sequence number, not wall-clock time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::upgrade::CutEntrySummary;

/// One committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditRecord {
    OwnershipTransferred {
        previous: Address,
        new_owner: Address,
    },
    CutApplied {
        entries: Vec<CutEntrySummary>,
        init_target: Option<Address>,
    },
    MultiSigInitialized {
        owner_count: usize,
        required: usize,
    },
    ProposalSubmitted {
        id: u64,
        submitter: Address,
        target: Address,
    },
    ProposalConfirmed {
        id: u64,
        owner: Address,
    },
    ProposalRevoked {
        id: u64,
        owner: Address,
    },
    ProposalExecuted {
        id: u64,
        executor: Address,
        call_succeeded: bool,
    },
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnershipTransferred { previous, new_owner } => {
                write!(f, "ownership_transferred {previous} -> {new_owner}")
            }
            Self::CutApplied {
                entries,
                init_target,
            } => match init_target {
                Some(target) => {
                    write!(f, "cut_applied {} entries, init {target}", entries.len())
                }
                None => write!(f, "cut_applied {} entries", entries.len()),
            },
            Self::MultiSigInitialized {
                owner_count,
                required,
            } => write!(f, "multisig_initialized {required}-of-{owner_count}"),
            Self::ProposalSubmitted { id, submitter, .. } => {
                write!(f, "proposal_submitted {id} by {submitter}")
            }
            Self::ProposalConfirmed { id, owner } => {
                write!(f, "proposal_confirmed {id} by {owner}")
            }
            Self::ProposalRevoked { id, owner } => {
                write!(f, "proposal_revoked {id} by {owner}")
            }
            Self::ProposalExecuted {
                id,
                executor,
                call_succeeded,
            } => write!(
                f,
                "proposal_executed {id} by {executor} ({})",
                if *call_succeeded { "call ok" } else { "call failed" }
            ),
        }
    }
}

/// A record with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub seq: u64,
    pub record: AuditRecord,
}

/// The log itself. Append-only; entries are never rewritten or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its sequence number.
    pub fn append(&mut self, record: AuditRecord) -> u64 {
        let seq = self.entries.len() as u64;
        self.entries.push(AuditEntry { seq, record });
        seq
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
