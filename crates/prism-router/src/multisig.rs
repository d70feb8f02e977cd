//! N-of-M approval workflow for privileged operations.
//!
//! An owner set and confirmation threshold are fixed at initialization.
//! Any owner may submit a proposal (an arbitrary encoded call); owners
//! confirm or revoke while the proposal is open; once the confirmation
//! count reaches the threshold any owner may execute it. Execution
//! consumes the proposal exactly once — the executed flag is set whether
//! or not the underlying call succeeds, so a failed call cannot be
//! replayed. Proposals are never deleted; the full sequence is retained as
//! an audit trail.
//!
//! The module is independent of the router's single-owner guard and of the
//! routing table. The outbound call goes through the [`ProposalExecutor`]
//! seam so the module can be exercised standalone with a mock.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::facet::FacetRevert;

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// A pending privileged action awaiting confirmations.
///
/// Ids are assigned monotonically from 0 and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub target: Address,
    pub value: u128,
    pub calldata: Vec<u8>,
    pub executed: bool,
    pub confirmations: BTreeSet<Address>,
}

/// Outcome of executing a proposal.
///
/// `call_succeeded` reports the underlying call; the proposal is consumed
/// either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub id: u64,
    pub executor: Address,
    pub call_succeeded: bool,
    pub return_data: Vec<u8>,
    pub revert_reason: Option<String>,
}

/// Seam through which an approved proposal's call is performed.
pub trait ProposalExecutor {
    fn call(
        &mut self,
        target: &Address,
        value: u128,
        calldata: &[u8],
    ) -> Result<Vec<u8>, FacetRevert>;
}

// ---------------------------------------------------------------------------
// MultiSigError
// ---------------------------------------------------------------------------

/// Errors from multisig initialization and the proposal lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiSigError {
    NotInitialized,
    AlreadyInitialized,
    NoOwners,
    ZeroOwnerAddress,
    DuplicateOwner { owner: Address },
    InvalidRequirement { required: usize, owner_count: usize },
    NotOwner { caller: Address },
    UnknownProposal { id: u64 },
    AlreadyExecuted { id: u64 },
    AlreadyConfirmed { id: u64, owner: Address },
    NotYetConfirmed { id: u64, owner: Address },
    InsufficientConfirmations { id: u64, have: usize, required: usize },
}

impl fmt::Display for MultiSigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "multisig is not initialized"),
            Self::AlreadyInitialized => write!(f, "multisig is already initialized"),
            Self::NoOwners => write!(f, "owner set must not be empty"),
            Self::ZeroOwnerAddress => write!(f, "owner must not be the zero address"),
            Self::DuplicateOwner { owner } => write!(f, "duplicate owner {owner}"),
            Self::InvalidRequirement {
                required,
                owner_count,
            } => write!(
                f,
                "required confirmations {required} out of range for {owner_count} owners"
            ),
            Self::NotOwner { caller } => write!(f, "caller {caller} is not a multisig owner"),
            Self::UnknownProposal { id } => write!(f, "unknown proposal {id}"),
            Self::AlreadyExecuted { id } => write!(f, "proposal {id} already executed"),
            Self::AlreadyConfirmed { id, owner } => {
                write!(f, "owner {owner} already confirmed proposal {id}")
            }
            Self::NotYetConfirmed { id, owner } => {
                write!(f, "owner {owner} has not confirmed proposal {id}")
            }
            Self::InsufficientConfirmations { id, have, required } => write!(
                f,
                "proposal {id} has {have}/{required} required confirmations"
            ),
        }
    }
}

impl std::error::Error for MultiSigError {}

// ---------------------------------------------------------------------------
// MultiSigModule
// ---------------------------------------------------------------------------

/// Owner set, threshold, and the append-only proposal log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigModule {
    owners: Vec<Address>,
    required: usize,
    proposals: Vec<Proposal>,
}

impl MultiSigModule {
    /// Create the module with a fixed owner set and threshold.
    ///
    /// Owners must be non-empty, non-zero, and distinct;
    /// `1 <= required <= owners.len()`.
    pub fn new(owners: Vec<Address>, required: usize) -> Result<Self, MultiSigError> {
        if owners.is_empty() {
            return Err(MultiSigError::NoOwners);
        }
        let mut seen = BTreeSet::new();
        for owner in &owners {
            if owner.is_zero() {
                return Err(MultiSigError::ZeroOwnerAddress);
            }
            if !seen.insert(*owner) {
                return Err(MultiSigError::DuplicateOwner { owner: *owner });
            }
        }
        if required == 0 || required > owners.len() {
            return Err(MultiSigError::InvalidRequirement {
                required,
                owner_count: owners.len(),
            });
        }
        Ok(Self {
            owners,
            required,
            proposals: Vec::new(),
        })
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn is_owner(&self, identity: &Address) -> bool {
        self.owners.contains(identity)
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn proposal(&self, id: u64) -> Result<&Proposal, MultiSigError> {
        self.proposals
            .get(id as usize)
            .ok_or(MultiSigError::UnknownProposal { id })
    }

    pub fn is_confirmed(&self, id: u64, owner: &Address) -> Result<bool, MultiSigError> {
        Ok(self.proposal(id)?.confirmations.contains(owner))
    }

    pub fn confirmation_count(&self, id: u64) -> Result<usize, MultiSigError> {
        Ok(self.proposal(id)?.confirmations.len())
    }

    fn require_owner(&self, caller: &Address) -> Result<(), MultiSigError> {
        if !self.is_owner(caller) {
            return Err(MultiSigError::NotOwner { caller: *caller });
        }
        Ok(())
    }

    fn open_proposal_mut(&mut self, id: u64) -> Result<&mut Proposal, MultiSigError> {
        let proposal = self
            .proposals
            .get_mut(id as usize)
            .ok_or(MultiSigError::UnknownProposal { id })?;
        if proposal.executed {
            return Err(MultiSigError::AlreadyExecuted { id });
        }
        Ok(proposal)
    }

    /// Create a new open proposal with zero confirmations.
    ///
    /// The submitter does not auto-confirm; confirmation is always an
    /// explicit act.
    pub fn submit(
        &mut self,
        caller: &Address,
        target: Address,
        value: u128,
        calldata: Vec<u8>,
    ) -> Result<u64, MultiSigError> {
        self.require_owner(caller)?;
        let id = self.proposals.len() as u64;
        self.proposals.push(Proposal {
            id,
            target,
            value,
            calldata,
            executed: false,
            confirmations: BTreeSet::new(),
        });
        Ok(id)
    }

    /// Add the caller's confirmation to an open proposal.
    pub fn confirm(&mut self, caller: &Address, id: u64) -> Result<(), MultiSigError> {
        self.require_owner(caller)?;
        let proposal = self.open_proposal_mut(id)?;
        if !proposal.confirmations.insert(*caller) {
            return Err(MultiSigError::AlreadyConfirmed { id, owner: *caller });
        }
        Ok(())
    }

    /// Withdraw the caller's confirmation from an open proposal.
    pub fn revoke(&mut self, caller: &Address, id: u64) -> Result<(), MultiSigError> {
        self.require_owner(caller)?;
        let proposal = self.open_proposal_mut(id)?;
        if !proposal.confirmations.remove(caller) {
            return Err(MultiSigError::NotYetConfirmed { id, owner: *caller });
        }
        Ok(())
    }

    /// Execute an open proposal once it has reached the threshold.
    ///
    /// The proposal is marked executed before the outcome is inspected:
    /// success and failure of the underlying call both consume it.
    pub fn execute(
        &mut self,
        caller: &Address,
        id: u64,
        executor: &mut dyn ProposalExecutor,
    ) -> Result<ExecutionReceipt, MultiSigError> {
        self.require_owner(caller)?;
        let required = self.required;
        let (target, value, calldata) = {
            let proposal = self.open_proposal_mut(id)?;
            if proposal.confirmations.len() < required {
                return Err(MultiSigError::InsufficientConfirmations {
                    id,
                    have: proposal.confirmations.len(),
                    required,
                });
            }
            proposal.executed = true;
            (
                proposal.target,
                proposal.value,
                proposal.calldata.clone(),
            )
        };

        let receipt = match executor.call(&target, value, &calldata) {
            Ok(return_data) => ExecutionReceipt {
                id,
                executor: *caller,
                call_succeeded: true,
                return_data,
                revert_reason: None,
            },
            Err(revert) => ExecutionReceipt {
                id,
                executor: *caller,
                call_succeeded: false,
                return_data: Vec::new(),
                revert_reason: Some(revert.reason),
            },
        };
        Ok(receipt)
    }
}
