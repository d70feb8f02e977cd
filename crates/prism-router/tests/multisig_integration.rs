#![forbid(unsafe_code)]

//! Integration tests for the multisig approval workflow.
//!
//! Exercises the public API from outside the crate, covering:
//! - Router-level initialization (once-only, validated owner set)
//! - The full proposal lifecycle: submit, confirm, revoke, execute
//! - Threshold enforcement and replay protection
//! - Proposal calls against installed code, success and failure
//! - The read surface (owners, requirement, proposals, confirmations)
//! - Audit trail of committed multisig operations
//! - Serde round-trips and deterministic replay

use prism_router::audit::AuditRecord;
use prism_router::facet::{CallContext, FacetCode, FacetRevert, FacetStore};
use prism_router::{Address, MultiSigError, MultiSigModule, Router};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn addr(seed: u8) -> Address {
    Address::from_bytes([seed; 20])
}

const ROUTER: u8 = 0xD0;
const A: u8 = 0x0A;
const B: u8 = 0x0B;
const C: u8 = 0x0C;
const TARGET: u8 = 0xE1;

/// Router with a 2-of-3 multisig over owners A, B, C.
fn governed_router() -> Router {
    let mut router = Router::new(addr(ROUTER), addr(A)).unwrap();
    router
        .init_multisig(vec![addr(A), addr(B), addr(C)], 2)
        .unwrap();
    router
}

/// Appends the calldata it receives to a list in the shared store; reverts
/// when the calldata is the single byte 0xFF.
struct RecordingTarget;

impl FacetCode for RecordingTarget {
    fn invoke(&self, ctx: &CallContext, store: &mut FacetStore) -> Result<Vec<u8>, FacetRevert> {
        if ctx.calldata == [0xFF] {
            return Err(FacetRevert::new("poison calldata"));
        }
        let mut seen = store
            .get("target.calls")
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();
        seen.push(serde_json::Value::String(format!(
            "{}:{}",
            ctx.caller,
            ctx.calldata.len()
        )));
        store.insert("target.calls".to_string(), serde_json::Value::Array(seen));
        Ok(b"done".to_vec())
    }
}

// =========================================================================
// Section 1: Initialization
// =========================================================================

#[test]
fn init_validates_owner_set_through_router() {
    let mut router = Router::new(addr(ROUTER), addr(A)).unwrap();
    assert!(matches!(
        router.init_multisig(vec![], 1).unwrap_err(),
        MultiSigError::NoOwners
    ));
    assert!(matches!(
        router.init_multisig(vec![addr(A), addr(A)], 1).unwrap_err(),
        MultiSigError::DuplicateOwner { .. }
    ));
    assert!(matches!(
        router.init_multisig(vec![addr(A)], 2).unwrap_err(),
        MultiSigError::InvalidRequirement {
            required: 2,
            owner_count: 1
        }
    ));
    // A failed init leaves the module uninitialized.
    assert!(matches!(
        router.multisig(),
        Err(MultiSigError::NotInitialized)
    ));
}

#[test]
fn init_is_once_only() {
    let mut router = governed_router();
    let err = router.init_multisig(vec![addr(B)], 1).unwrap_err();
    assert!(matches!(err, MultiSigError::AlreadyInitialized));
}

#[test]
fn read_surface_after_init() {
    let router = governed_router();
    let module = router.multisig().unwrap();
    assert_eq!(module.owners(), &[addr(A), addr(B), addr(C)]);
    assert_eq!(module.required(), 2);
    assert_eq!(module.proposal_count(), 0);
    assert!(module.is_owner(&addr(B)));
    assert!(!module.is_owner(&addr(0x77)));
}

// =========================================================================
// Section 2: The 2-of-3 lifecycle scenario
// =========================================================================

#[test]
fn two_of_three_lifecycle() {
    let mut router = governed_router();

    // A submits; the proposal gets id 0 and no confirmations.
    let id = router
        .submit_proposal(addr(A), addr(TARGET), 0, b"payload".to_vec())
        .unwrap();
    assert_eq!(id, 0);
    let module = router.multisig().unwrap();
    assert_eq!(module.confirmation_count(id).unwrap(), 0);
    assert!(!module.is_confirmed(id, &addr(A)).unwrap());

    // B confirms, then A confirms: confirming set {A, B}.
    router.confirm_proposal(addr(B), id).unwrap();
    router.confirm_proposal(addr(A), id).unwrap();
    let module = router.multisig().unwrap();
    assert_eq!(module.confirmation_count(id).unwrap(), 2);

    // C executes at threshold.
    let receipt = router.execute_proposal(addr(C), id).unwrap();
    assert!(receipt.call_succeeded);
    assert_eq!(receipt.executor, addr(C));
    assert!(router.proposal(id).unwrap().executed);

    // A second execution by any owner fails.
    for owner in [A, B, C] {
        let err = router.execute_proposal(addr(owner), id).unwrap_err();
        assert!(matches!(err, MultiSigError::AlreadyExecuted { id: 0 }));
    }
}

#[test]
fn execute_below_threshold_rejected() {
    let mut router = governed_router();
    let id = router
        .submit_proposal(addr(A), addr(TARGET), 0, vec![])
        .unwrap();
    router.confirm_proposal(addr(B), id).unwrap();
    let err = router.execute_proposal(addr(C), id).unwrap_err();
    assert!(matches!(
        err,
        MultiSigError::InsufficientConfirmations {
            id: 0,
            have: 1,
            required: 2
        }
    ));
    assert!(!router.proposal(id).unwrap().executed);
}

#[test]
fn revoke_drops_below_threshold() {
    let mut router = governed_router();
    let id = router
        .submit_proposal(addr(A), addr(TARGET), 0, vec![])
        .unwrap();
    router.confirm_proposal(addr(A), id).unwrap();
    router.confirm_proposal(addr(B), id).unwrap();
    router.revoke_confirmation(addr(B), id).unwrap();
    let err = router.execute_proposal(addr(A), id).unwrap_err();
    assert!(matches!(
        err,
        MultiSigError::InsufficientConfirmations { have: 1, .. }
    ));
}

#[test]
fn non_owner_excluded_from_every_operation() {
    let mut router = governed_router();
    let outsider = addr(0x77);
    let id = router
        .submit_proposal(addr(A), addr(TARGET), 0, vec![])
        .unwrap();
    assert!(matches!(
        router.submit_proposal(outsider, addr(TARGET), 0, vec![]),
        Err(MultiSigError::NotOwner { .. })
    ));
    assert!(matches!(
        router.confirm_proposal(outsider, id),
        Err(MultiSigError::NotOwner { .. })
    ));
    assert!(matches!(
        router.revoke_confirmation(outsider, id),
        Err(MultiSigError::NotOwner { .. })
    ));
    assert!(matches!(
        router.execute_proposal(outsider, id),
        Err(MultiSigError::NotOwner { .. })
    ));
}

#[test]
fn ids_are_monotonic_across_proposals() {
    let mut router = governed_router();
    for expected in 0..4u64 {
        let id = router
            .submit_proposal(addr(A), addr(TARGET), 0, vec![expected as u8])
            .unwrap();
        assert_eq!(id, expected);
    }
    assert_eq!(router.multisig().unwrap().proposal_count(), 4);
}

// =========================================================================
// Section 3: Proposal calls against installed code
// =========================================================================

#[test]
fn executed_call_reaches_target_with_router_as_caller() {
    let mut router = governed_router();
    router.install_code(addr(TARGET), Box::new(RecordingTarget));
    let id = router
        .submit_proposal(addr(A), addr(TARGET), 0, b"abc".to_vec())
        .unwrap();
    router.confirm_proposal(addr(A), id).unwrap();
    router.confirm_proposal(addr(B), id).unwrap();
    let receipt = router.execute_proposal(addr(C), id).unwrap();
    assert!(receipt.call_succeeded);
    assert_eq!(receipt.return_data, b"done".to_vec());
    let calls = router
        .state()
        .facet_store()
        .get("target.calls")
        .and_then(|v| v.as_array().cloned())
        .unwrap();
    assert_eq!(calls.len(), 1);
    // The call carried the router's identity, not the executor's.
    assert_eq!(
        calls[0].as_str().unwrap(),
        format!("{}:3", addr(ROUTER))
    );
}

#[test]
fn reverting_call_consumes_proposal_and_rolls_back_store() {
    let mut router = governed_router();
    router.install_code(addr(TARGET), Box::new(RecordingTarget));
    let id = router
        .submit_proposal(addr(A), addr(TARGET), 0, vec![0xFF])
        .unwrap();
    router.confirm_proposal(addr(A), id).unwrap();
    router.confirm_proposal(addr(B), id).unwrap();
    let receipt = router.execute_proposal(addr(A), id).unwrap();
    assert!(!receipt.call_succeeded);
    assert_eq!(receipt.revert_reason.as_deref(), Some("poison calldata"));
    assert!(router.state().facet_store().get("target.calls").is_none());
    // Consumed despite the failure.
    assert!(matches!(
        router.execute_proposal(addr(A), id).unwrap_err(),
        MultiSigError::AlreadyExecuted { id: 0 }
    ));
}

#[test]
fn call_to_codeless_target_succeeds_trivially() {
    let mut router = governed_router();
    let id = router
        .submit_proposal(addr(A), addr(0xEE), 7, vec![1, 2, 3])
        .unwrap();
    router.confirm_proposal(addr(A), id).unwrap();
    router.confirm_proposal(addr(C), id).unwrap();
    let receipt = router.execute_proposal(addr(B), id).unwrap();
    assert!(receipt.call_succeeded);
    assert!(receipt.return_data.is_empty());
}

// =========================================================================
// Section 4: Audit trail
// =========================================================================

#[test]
fn audit_records_lifecycle_in_order() {
    let mut router = governed_router();
    let id = router
        .submit_proposal(addr(A), addr(TARGET), 0, vec![])
        .unwrap();
    router.confirm_proposal(addr(B), id).unwrap();
    router.confirm_proposal(addr(A), id).unwrap();
    router.revoke_confirmation(addr(A), id).unwrap();
    router.confirm_proposal(addr(C), id).unwrap();
    router.execute_proposal(addr(B), id).unwrap();

    let kinds: Vec<&AuditRecord> = router
        .audit()
        .entries()
        .iter()
        .map(|e| &e.record)
        .collect();
    assert!(matches!(kinds[0], AuditRecord::MultiSigInitialized { .. }));
    assert!(matches!(kinds[1], AuditRecord::ProposalSubmitted { .. }));
    assert!(matches!(kinds[2], AuditRecord::ProposalConfirmed { .. }));
    assert!(matches!(kinds[3], AuditRecord::ProposalConfirmed { .. }));
    assert!(matches!(kinds[4], AuditRecord::ProposalRevoked { .. }));
    assert!(matches!(kinds[5], AuditRecord::ProposalConfirmed { .. }));
    assert!(matches!(
        kinds[6],
        AuditRecord::ProposalExecuted {
            call_succeeded: true,
            ..
        }
    ));
}

#[test]
fn failed_operations_leave_no_audit_records() {
    let mut router = governed_router();
    let baseline = router.audit().len();
    let _ = router.submit_proposal(addr(0x77), addr(TARGET), 0, vec![]);
    let _ = router.confirm_proposal(addr(A), 5);
    assert_eq!(router.audit().len(), baseline);
}

// =========================================================================
// Section 5: Standalone module usage
// =========================================================================

#[test]
fn module_usable_without_router() {
    struct NoopExecutor;
    impl prism_router::multisig::ProposalExecutor for NoopExecutor {
        fn call(
            &mut self,
            _target: &Address,
            _value: u128,
            _calldata: &[u8],
        ) -> Result<Vec<u8>, FacetRevert> {
            Ok(vec![])
        }
    }

    let mut module = MultiSigModule::new(vec![addr(A), addr(B)], 2).unwrap();
    let id = module.submit(&addr(A), addr(TARGET), 0, vec![]).unwrap();
    module.confirm(&addr(A), id).unwrap();
    module.confirm(&addr(B), id).unwrap();
    let receipt = module.execute(&addr(A), id, &mut NoopExecutor).unwrap();
    assert!(receipt.call_succeeded);
}

// =========================================================================
// Section 6: Serde and deterministic replay
// =========================================================================

#[test]
fn proposal_state_serde_round_trip() {
    let mut router = governed_router();
    let id = router
        .submit_proposal(addr(A), addr(TARGET), 3, vec![1, 2])
        .unwrap();
    router.confirm_proposal(addr(B), id).unwrap();
    let module = router.multisig().unwrap();
    let json = serde_json::to_string(module).expect("serialize");
    let restored: MultiSigModule = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(*module, restored);
    assert!(restored.is_confirmed(id, &addr(B)).unwrap());
}

#[test]
fn deterministic_replay_same_lifecycle_same_state() {
    let run = || {
        let mut router = governed_router();
        router.install_code(addr(TARGET), Box::new(RecordingTarget));
        let id = router
            .submit_proposal(addr(A), addr(TARGET), 0, b"x".to_vec())
            .unwrap();
        router.confirm_proposal(addr(A), id).unwrap();
        router.confirm_proposal(addr(C), id).unwrap();
        router.execute_proposal(addr(B), id).unwrap();
        serde_json::to_string(router.state()).unwrap()
    };
    assert_eq!(run(), run());
}
