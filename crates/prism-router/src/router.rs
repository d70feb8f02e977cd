//! The router: single authoritative state store plus the invocation
//! boundary every external call crosses.
//!
//! All durable records live in [`RouterState`] (routing table, owner
//! guard, multisig, facet store, audit log), threaded explicitly through
//! every operation. Mutating entry points follow one discipline: apply the
//! operation to a scratch copy and commit only on success, so any failure
//! — validation, a facet revert, a failed initializer — leaves the live
//! state untouched, nested effects included.
//!
//! Installed facet code ([`CodeStore`]) sits beside the state: code is
//! immutable once installed and is not part of the durable record.
//!
//! Administrative operations (cut application, ownership transfer, loupe
//! reads, the multisig surface) are fixed typed entry points; every other
//! inbound call goes through [`Router::dispatch`] and the routing table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::access_guard::{AccessError, AccessGuard, OwnershipTransferred};
use crate::address::Address;
use crate::audit::{AuditLog, AuditRecord};
use crate::facet::{CallContext, CodeStore, FacetCode, FacetRevert, FacetStore};
use crate::multisig::{ExecutionReceipt, MultiSigError, MultiSigModule, Proposal, ProposalExecutor};
use crate::selector::{Selector, SELECTOR_LEN};
use crate::selector_table::{FacetInfo, SelectorTable};
use crate::upgrade::{apply_batch, CutApplied, CutEntry, InitCall, UpgradeError};

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

/// Errors from the steady-state dispatch path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchError {
    UnknownSelector {
        selector: Selector,
    },
    CalldataTooShort {
        len: usize,
    },
    FacetReverted {
        facet: Address,
        selector: Selector,
        reason: String,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSelector { selector } => {
                write!(f, "no facet registered for selector {selector}")
            }
            Self::CalldataTooShort { len } => write!(
                f,
                "calldata must carry at least a {SELECTOR_LEN}-byte selector, got {len} bytes"
            ),
            Self::FacetReverted {
                facet,
                selector,
                reason,
            } => write!(f, "facet {facet} reverted on {selector}: {reason}"),
        }
    }
}

impl std::error::Error for DispatchError {}

// ---------------------------------------------------------------------------
// RouterState
// ---------------------------------------------------------------------------

/// The durable record the core maintains across invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterState {
    address: Address,
    table: SelectorTable,
    guard: AccessGuard,
    multisig: Option<MultiSigModule>,
    facet_store: FacetStore,
    audit: AuditLog,
}

impl RouterState {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn table(&self) -> &SelectorTable {
        &self.table
    }

    pub fn owner(&self) -> Address {
        self.guard.owner()
    }

    pub fn multisig(&self) -> Option<&MultiSigModule> {
        self.multisig.as_ref()
    }

    pub fn facet_store(&self) -> &FacetStore {
        &self.facet_store
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// State store plus installed code.
#[derive(Debug)]
pub struct Router {
    state: RouterState,
    code: CodeStore,
}

/// Runs an approved proposal's call against installed code.
///
/// A target with no installed code succeeds with empty return data,
/// mirroring a plain external call to a codeless address.
struct CodeCallExecutor<'a> {
    code: &'a CodeStore,
    store: &'a mut FacetStore,
    caller: Address,
}

impl ProposalExecutor for CodeCallExecutor<'_> {
    fn call(
        &mut self,
        target: &Address,
        value: u128,
        calldata: &[u8],
    ) -> Result<Vec<u8>, FacetRevert> {
        match self.code.code_at(target) {
            None => Ok(Vec::new()),
            Some(code) => {
                let ctx = CallContext {
                    caller: self.caller,
                    value,
                    calldata: calldata.to_vec(),
                };
                code.invoke(&ctx, self.store)
            }
        }
    }
}

impl Router {
    /// Create a router at `address` with an initial owner.
    pub fn new(address: Address, owner: Address) -> Result<Self, AccessError> {
        Ok(Self {
            state: RouterState {
                address,
                table: SelectorTable::new(),
                guard: AccessGuard::new(owner)?,
                multisig: None,
                facet_store: FacetStore::new(),
                audit: AuditLog::new(),
            },
            code: CodeStore::new(),
        })
    }

    /// Install facet code at an address (the deployment seam; routing to it
    /// still requires a cut).
    pub fn install_code(&mut self, address: Address, code: Box<dyn FacetCode>) {
        self.code.install(address, code);
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn owner(&self) -> Address {
        self.state.guard.owner()
    }

    pub fn audit(&self) -> &AuditLog {
        &self.state.audit
    }

    // -- Loupe: read-only introspection of the routing table --

    pub fn facets(&self) -> Vec<FacetInfo> {
        self.state.table.facets()
    }

    pub fn facet_addresses(&self) -> Vec<Address> {
        self.state.table.facet_addresses()
    }

    pub fn facet_selectors(&self, facet: &Address) -> Vec<Selector> {
        self.state.table.selectors_of(facet).to_vec()
    }

    pub fn facet_address(&self, selector: &Selector) -> Option<Address> {
        self.state.table.resolve(selector)
    }

    // -- Ownership --

    /// Hand ownership to `new_owner`. Owner-only.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<OwnershipTransferred, AccessError> {
        let event = self.state.guard.transfer_ownership(&caller, new_owner)?;
        self.state.audit.append(AuditRecord::OwnershipTransferred {
            previous: event.previous,
            new_owner: event.new_owner,
        });
        Ok(event)
    }

    // -- Upgrade --

    /// Apply a cut batch, optionally followed by a one-shot initializer
    /// delegate-executed in the router's storage context. Owner-only.
    ///
    /// The batch and the initializer are one atomic unit: any failure
    /// leaves the live state exactly as it was.
    pub fn apply_cut(
        &mut self,
        caller: Address,
        batch: &[CutEntry],
        init: Option<InitCall>,
    ) -> Result<CutApplied, UpgradeError> {
        let owner = self.state.guard.owner();
        if caller != owner {
            return Err(UpgradeError::NotOwner { caller, owner });
        }

        let mut scratch = self.state.clone();
        let entries = apply_batch(&mut scratch.table, batch)?;

        if let Some(init) = &init {
            let code = self.code.code_at(&init.target).ok_or_else(|| {
                UpgradeError::InitializationFailed {
                    target: init.target,
                    reason: "no code installed at initializer target".to_string(),
                }
            })?;
            let ctx = CallContext {
                caller,
                value: 0,
                calldata: init.calldata.clone(),
            };
            code.invoke(&ctx, &mut scratch.facet_store).map_err(|revert| {
                UpgradeError::InitializationFailed {
                    target: init.target,
                    reason: revert.reason,
                }
            })?;
        }

        let applied = CutApplied {
            entries,
            init_target: init.map(|i| i.target),
        };
        scratch.audit.append(AuditRecord::CutApplied {
            entries: applied.entries.clone(),
            init_target: applied.init_target,
        });
        debug_assert!(scratch.table.is_consistent());
        self.state = scratch;
        Ok(applied)
    }

    // -- Dispatch --

    /// Resolve `selector` and delegate-execute the facet's code in the
    /// router's storage context. Facet-made changes commit only if the
    /// facet returns success.
    pub fn dispatch(
        &mut self,
        selector: Selector,
        ctx: CallContext,
    ) -> Result<Vec<u8>, DispatchError> {
        let facet = self
            .state
            .table
            .resolve(&selector)
            .ok_or(DispatchError::UnknownSelector { selector })?;
        let code =
            self.code
                .code_at(&facet)
                .ok_or_else(|| DispatchError::FacetReverted {
                    facet,
                    selector,
                    reason: "no code installed at facet address".to_string(),
                })?;

        let mut scratch_store = self.state.facet_store.clone();
        match code.invoke(&ctx, &mut scratch_store) {
            Ok(return_data) => {
                self.state.facet_store = scratch_store;
                Ok(return_data)
            }
            Err(revert) => Err(DispatchError::FacetReverted {
                facet,
                selector,
                reason: revert.reason,
            }),
        }
    }

    /// The fallback entry path: extract the leading 4-byte selector from
    /// raw calldata and dispatch.
    pub fn call(
        &mut self,
        caller: Address,
        value: u128,
        calldata: Vec<u8>,
    ) -> Result<Vec<u8>, DispatchError> {
        if calldata.len() < SELECTOR_LEN {
            return Err(DispatchError::CalldataTooShort {
                len: calldata.len(),
            });
        }
        let mut bytes = [0u8; SELECTOR_LEN];
        bytes.copy_from_slice(&calldata[..SELECTOR_LEN]);
        let selector = Selector::from_bytes(bytes);
        self.dispatch(
            selector,
            CallContext {
                caller,
                value,
                calldata,
            },
        )
    }

    // -- MultiSig surface --

    /// Initialize the multisig owner set and threshold. Once-only.
    pub fn init_multisig(
        &mut self,
        owners: Vec<Address>,
        required: usize,
    ) -> Result<(), MultiSigError> {
        if self.state.multisig.is_some() {
            return Err(MultiSigError::AlreadyInitialized);
        }
        let module = MultiSigModule::new(owners, required)?;
        self.state.audit.append(AuditRecord::MultiSigInitialized {
            owner_count: module.owners().len(),
            required: module.required(),
        });
        self.state.multisig = Some(module);
        Ok(())
    }

    pub fn multisig(&self) -> Result<&MultiSigModule, MultiSigError> {
        self.state.multisig.as_ref().ok_or(MultiSigError::NotInitialized)
    }

    fn multisig_mut(&mut self) -> Result<&mut MultiSigModule, MultiSigError> {
        self.state.multisig.as_mut().ok_or(MultiSigError::NotInitialized)
    }

    pub fn submit_proposal(
        &mut self,
        caller: Address,
        target: Address,
        value: u128,
        calldata: Vec<u8>,
    ) -> Result<u64, MultiSigError> {
        let id = self
            .multisig_mut()?
            .submit(&caller, target, value, calldata)?;
        self.state.audit.append(AuditRecord::ProposalSubmitted {
            id,
            submitter: caller,
            target,
        });
        Ok(id)
    }

    pub fn confirm_proposal(&mut self, caller: Address, id: u64) -> Result<(), MultiSigError> {
        self.multisig_mut()?.confirm(&caller, id)?;
        self.state
            .audit
            .append(AuditRecord::ProposalConfirmed { id, owner: caller });
        Ok(())
    }

    pub fn revoke_confirmation(&mut self, caller: Address, id: u64) -> Result<(), MultiSigError> {
        self.multisig_mut()?.revoke(&caller, id)?;
        self.state
            .audit
            .append(AuditRecord::ProposalRevoked { id, owner: caller });
        Ok(())
    }

    /// Execute an approved proposal. The proposal's call runs against
    /// installed code with the router as caller; its storage effects
    /// commit only if the call succeeds, while the executed flag is
    /// consumed either way.
    pub fn execute_proposal(
        &mut self,
        caller: Address,
        id: u64,
    ) -> Result<ExecutionReceipt, MultiSigError> {
        let RouterState {
            address,
            multisig,
            facet_store,
            audit,
            ..
        } = &mut self.state;
        let module = multisig.as_mut().ok_or(MultiSigError::NotInitialized)?;

        let mut scratch_store = facet_store.clone();
        let mut executor = CodeCallExecutor {
            code: &self.code,
            store: &mut scratch_store,
            caller: *address,
        };
        let receipt = module.execute(&caller, id, &mut executor)?;
        if receipt.call_succeeded {
            *facet_store = scratch_store;
        }
        audit.append(AuditRecord::ProposalExecuted {
            id,
            executor: caller,
            call_succeeded: receipt.call_succeeded,
        });
        Ok(receipt)
    }

    pub fn proposal(&self, id: u64) -> Result<&Proposal, MultiSigError> {
        self.multisig()?.proposal(id)
    }
}
