//! Stable numeric error-code registry.
//!
//! Every failure kind the core can surface has a permanent `u16` code in a
//! subsystem range. Codes are append-only: once assigned they are never
//! reused and may only be marked deprecated. Tooling keys diagnostics and
//! dashboards off these codes, so renaming a Rust variant must not change
//! its number.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::access_guard::AccessError;
use crate::address::AddressParseError;
use crate::multisig::MultiSigError;
use crate::router::DispatchError;
use crate::selector::SelectorParseError;
use crate::upgrade::UpgradeError;

pub const ERROR_CODE_REGISTRY_VERSION: u32 = 1;
pub const ERROR_CODE_COMPATIBILITY_POLICY: &str =
    "append-only: assigned codes are permanent, never reused, and may only be marked deprecated";

/// Subsystem ranges for code assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSubsystem {
    IdentityEncoding,
    Dispatch,
    Upgrade,
    Ownership,
    MultiSig,
}

impl ErrorSubsystem {
    pub const fn range(self) -> (u16, u16) {
        match self {
            Self::IdentityEncoding => (1, 999),
            Self::Dispatch => (1000, 1999),
            Self::Upgrade => (2000, 2999),
            Self::Ownership => (3000, 3999),
            Self::MultiSig => (4000, 4999),
        }
    }

    pub const fn includes(self, numeric: u16) -> bool {
        let (start, end) = self.range();
        numeric >= start && numeric <= end
    }
}

/// Permanent numeric codes, one per failure kind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrismErrorCode {
    AddressParse = 1,
    SelectorParse = 2,

    UnknownSelector = 1000,
    CalldataTooShort = 1001,
    FacetReverted = 1002,

    EmptyBatch = 2000,
    EmptySelectorSet = 2001,
    DuplicateSelectorInEntry = 2002,
    ZeroFacetAddress = 2003,
    SelectorAlreadyRegistered = 2004,
    SelectorNotRegistered = 2005,
    ReplaceWithSameFacet = 2006,
    RemoveTargetsFacet = 2007,
    InitializationFailed = 2008,

    NotOwner = 3000,
    ZeroOwnerAddress = 3001,

    MultiSigNotInitialized = 4000,
    MultiSigAlreadyInitialized = 4001,
    MultiSigNoOwners = 4002,
    MultiSigZeroOwner = 4003,
    MultiSigDuplicateOwner = 4004,
    MultiSigInvalidRequirement = 4005,
    MultiSigNotOwner = 4006,
    UnknownProposal = 4007,
    ProposalAlreadyExecuted = 4008,
    ProposalAlreadyConfirmed = 4009,
    ProposalNotYetConfirmed = 4010,
    InsufficientConfirmations = 4011,
}

pub const ALL_ERROR_CODES: &[PrismErrorCode] = &[
    PrismErrorCode::AddressParse,
    PrismErrorCode::SelectorParse,
    PrismErrorCode::UnknownSelector,
    PrismErrorCode::CalldataTooShort,
    PrismErrorCode::FacetReverted,
    PrismErrorCode::EmptyBatch,
    PrismErrorCode::EmptySelectorSet,
    PrismErrorCode::DuplicateSelectorInEntry,
    PrismErrorCode::ZeroFacetAddress,
    PrismErrorCode::SelectorAlreadyRegistered,
    PrismErrorCode::SelectorNotRegistered,
    PrismErrorCode::ReplaceWithSameFacet,
    PrismErrorCode::RemoveTargetsFacet,
    PrismErrorCode::InitializationFailed,
    PrismErrorCode::NotOwner,
    PrismErrorCode::ZeroOwnerAddress,
    PrismErrorCode::MultiSigNotInitialized,
    PrismErrorCode::MultiSigAlreadyInitialized,
    PrismErrorCode::MultiSigNoOwners,
    PrismErrorCode::MultiSigZeroOwner,
    PrismErrorCode::MultiSigDuplicateOwner,
    PrismErrorCode::MultiSigInvalidRequirement,
    PrismErrorCode::MultiSigNotOwner,
    PrismErrorCode::UnknownProposal,
    PrismErrorCode::ProposalAlreadyExecuted,
    PrismErrorCode::ProposalAlreadyConfirmed,
    PrismErrorCode::ProposalNotYetConfirmed,
    PrismErrorCode::InsufficientConfirmations,
];

impl PrismErrorCode {
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    pub const fn subsystem(self) -> ErrorSubsystem {
        match self {
            Self::AddressParse | Self::SelectorParse => ErrorSubsystem::IdentityEncoding,
            Self::UnknownSelector | Self::CalldataTooShort | Self::FacetReverted => {
                ErrorSubsystem::Dispatch
            }
            Self::EmptyBatch
            | Self::EmptySelectorSet
            | Self::DuplicateSelectorInEntry
            | Self::ZeroFacetAddress
            | Self::SelectorAlreadyRegistered
            | Self::SelectorNotRegistered
            | Self::ReplaceWithSameFacet
            | Self::RemoveTargetsFacet
            | Self::InitializationFailed => ErrorSubsystem::Upgrade,
            Self::NotOwner | Self::ZeroOwnerAddress => ErrorSubsystem::Ownership,
            Self::MultiSigNotInitialized
            | Self::MultiSigAlreadyInitialized
            | Self::MultiSigNoOwners
            | Self::MultiSigZeroOwner
            | Self::MultiSigDuplicateOwner
            | Self::MultiSigInvalidRequirement
            | Self::MultiSigNotOwner
            | Self::UnknownProposal
            | Self::ProposalAlreadyExecuted
            | Self::ProposalAlreadyConfirmed
            | Self::ProposalNotYetConfirmed
            | Self::InsufficientConfirmations => ErrorSubsystem::MultiSig,
        }
    }
}

impl fmt::Display for PrismErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PR-{:04}", self.as_u16())
    }
}

impl From<&AddressParseError> for PrismErrorCode {
    fn from(_: &AddressParseError) -> Self {
        Self::AddressParse
    }
}

impl From<&SelectorParseError> for PrismErrorCode {
    fn from(_: &SelectorParseError) -> Self {
        Self::SelectorParse
    }
}

impl From<&AccessError> for PrismErrorCode {
    fn from(err: &AccessError) -> Self {
        match err {
            AccessError::NotOwner { .. } => Self::NotOwner,
            AccessError::ZeroOwnerAddress => Self::ZeroOwnerAddress,
        }
    }
}

impl From<&UpgradeError> for PrismErrorCode {
    fn from(err: &UpgradeError) -> Self {
        match err {
            UpgradeError::NotOwner { .. } => Self::NotOwner,
            UpgradeError::EmptyBatch => Self::EmptyBatch,
            UpgradeError::EmptySelectorSet { .. } => Self::EmptySelectorSet,
            UpgradeError::DuplicateSelectorInEntry { .. } => Self::DuplicateSelectorInEntry,
            UpgradeError::ZeroFacetAddress { .. } => Self::ZeroFacetAddress,
            UpgradeError::SelectorAlreadyRegistered { .. } => Self::SelectorAlreadyRegistered,
            UpgradeError::SelectorNotRegistered { .. } => Self::SelectorNotRegistered,
            UpgradeError::ReplaceWithSameFacet { .. } => Self::ReplaceWithSameFacet,
            UpgradeError::RemoveTargetsFacet { .. } => Self::RemoveTargetsFacet,
            UpgradeError::InitializationFailed { .. } => Self::InitializationFailed,
        }
    }
}

impl From<&DispatchError> for PrismErrorCode {
    fn from(err: &DispatchError) -> Self {
        match err {
            DispatchError::UnknownSelector { .. } => Self::UnknownSelector,
            DispatchError::CalldataTooShort { .. } => Self::CalldataTooShort,
            DispatchError::FacetReverted { .. } => Self::FacetReverted,
        }
    }
}

impl From<&MultiSigError> for PrismErrorCode {
    fn from(err: &MultiSigError) -> Self {
        match err {
            MultiSigError::NotInitialized => Self::MultiSigNotInitialized,
            MultiSigError::AlreadyInitialized => Self::MultiSigAlreadyInitialized,
            MultiSigError::NoOwners => Self::MultiSigNoOwners,
            MultiSigError::ZeroOwnerAddress => Self::MultiSigZeroOwner,
            MultiSigError::DuplicateOwner { .. } => Self::MultiSigDuplicateOwner,
            MultiSigError::InvalidRequirement { .. } => Self::MultiSigInvalidRequirement,
            MultiSigError::NotOwner { .. } => Self::MultiSigNotOwner,
            MultiSigError::UnknownProposal { .. } => Self::UnknownProposal,
            MultiSigError::AlreadyExecuted { .. } => Self::ProposalAlreadyExecuted,
            MultiSigError::AlreadyConfirmed { .. } => Self::ProposalAlreadyConfirmed,
            MultiSigError::NotYetConfirmed { .. } => Self::ProposalNotYetConfirmed,
            MultiSigError::InsufficientConfirmations { .. } => Self::InsufficientConfirmations,
        }
    }
}
