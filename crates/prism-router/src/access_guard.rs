//! Single-owner authorization primitive.
//!
//! Holds the one identity allowed to mutate the routing table and to hand
//! ownership on. The owner is never the zero sentinel after construction.
//! Transferring to the already-current owner succeeds and leaves the owner
//! unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Observation emitted when ownership changes hands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous: Address,
    pub new_owner: Address,
}

/// Errors from owner checks and transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessError {
    NotOwner { caller: Address, owner: Address },
    ZeroOwnerAddress,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOwner { caller, owner } => {
                write!(f, "caller {caller} is not the owner {owner}")
            }
            Self::ZeroOwnerAddress => write!(f, "owner must not be the zero address"),
        }
    }
}

impl std::error::Error for AccessError {}

/// The authorization record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGuard {
    owner: Address,
}

impl AccessGuard {
    pub fn new(owner: Address) -> Result<Self, AccessError> {
        if owner.is_zero() {
            return Err(AccessError::ZeroOwnerAddress);
        }
        Ok(Self { owner })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Fail unless `caller` is the current owner.
    pub fn require_owner(&self, caller: &Address) -> Result<(), AccessError> {
        if *caller != self.owner {
            return Err(AccessError::NotOwner {
                caller: *caller,
                owner: self.owner,
            });
        }
        Ok(())
    }

    /// Replace the owner. Only the current owner may transfer, and never to
    /// the zero sentinel.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<OwnershipTransferred, AccessError> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(AccessError::ZeroOwnerAddress);
        }
        let previous = self.owner;
        self.owner = new_owner;
        Ok(OwnershipTransferred {
            previous,
            new_owner,
        })
    }
}
