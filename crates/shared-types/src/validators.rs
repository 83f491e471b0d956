//! Validator set domain entities.
//!
//! The set is stake-ordered and frozen for the lifetime of an epoch:
//! indices handed out by [`ValidatorSet::get_idx`] stay valid until the
//! whole set is replaced by the next epoch's set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Compact validator identifier, assigned at epoch start.
pub type ValidatorId = u32;

/// Stake weight of a single validator.
pub type Weight = u64;

/// Stable index into the epoch's validator set.
pub type ValidatorIdx = u32;

/// Individual validator information.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ValidatorInfo {
    /// Validator identifier
    pub id: ValidatorId,
    /// Stake weight (non-negative, fixed within the epoch)
    pub weight: Weight,
}

/// Validator set with stake information, frozen per epoch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorSet {
    epoch: u64,
    validators: Vec<ValidatorInfo>,
    total_weight: Weight,
    /// IDs ordered by descending stake (ties broken by ascending ID)
    sorted_ids: Vec<ValidatorId>,
    /// Quick lookup by validator ID
    #[serde(skip)]
    lookup: HashMap<ValidatorId, usize>,
}

impl ValidatorSet {
    /// Create a new validator set for an epoch.
    pub fn new(epoch: u64, validators: Vec<ValidatorInfo>) -> Self {
        let total_weight = validators.iter().map(|v| v.weight).sum();
        let lookup = validators
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id, i))
            .collect();
        let mut sorted_ids: Vec<ValidatorId> = validators.iter().map(|v| v.id).collect();
        let by_id: HashMap<ValidatorId, Weight> =
            validators.iter().map(|v| (v.id, v.weight)).collect();
        sorted_ids.sort_by(|a, b| by_id[b].cmp(&by_id[a]).then(a.cmp(b)));
        Self {
            epoch,
            validators,
            total_weight,
            sorted_ids,
            lookup,
        }
    }

    /// Epoch this set belongs to.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Get the number of validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Check if a validator is in the set.
    pub fn contains(&self, id: ValidatorId) -> bool {
        self.lookup.contains_key(&id)
    }

    /// Stake weight of a validator, 0 if unknown.
    pub fn get(&self, id: ValidatorId) -> Weight {
        self.lookup
            .get(&id)
            .map(|&i| self.validators[i].weight)
            .unwrap_or(0)
    }

    /// Stable index of a validator within this epoch.
    pub fn get_idx(&self, id: ValidatorId) -> Option<ValidatorIdx> {
        self.lookup.get(&id).map(|&i| i as ValidatorIdx)
    }

    /// Stake weight by stable index.
    ///
    /// Returns 0 for an out-of-range index rather than panicking; the
    /// admission path treats an unknown validator as weightless.
    pub fn get_weight_by_idx(&self, idx: ValidatorIdx) -> Weight {
        self.validators
            .get(idx as usize)
            .map(|v| v.weight)
            .unwrap_or(0)
    }

    /// Total stake of the set.
    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    /// IDs ordered by descending stake.
    pub fn sorted_ids(&self) -> &[ValidatorId] {
        &self.sorted_ids
    }

    /// Iterate over all validators in index order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidatorInfo> {
        self.validators.iter()
    }

    /// Rebuild the lookup table (after deserialization).
    pub fn rebuild_lookup(&mut self) {
        self.lookup = self
            .validators
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id, i))
            .collect();
    }
}
