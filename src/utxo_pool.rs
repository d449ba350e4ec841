use crate::{TransactionOutput, UtxoId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A pool of confirmed and unspent transaction outputs, indexed by the
/// transaction that produced them and their index within that transaction.
///
/// Cloning the pool produces a fully independent copy; the validator relies on
/// this to take ownership of a snapshot without aliasing caller state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtxoPool {
    utxos: HashMap<UtxoId, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo_id: &UtxoId) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    /// The output identified by `utxo_id`, or `None` if it does not exist or
    /// has already been spent.
    pub fn output(&self, utxo_id: &UtxoId) -> Option<&TransactionOutput> {
        self.utxos.get(utxo_id)
    }

    /// Adds the output to the pool, overwriting any previous mapping for the
    /// same id.
    pub fn insert(&mut self, utxo_id: UtxoId, output: TransactionOutput) {
        self.utxos.insert(utxo_id, output);
    }

    /// Removes the output from the pool, returning it if it was present.
    pub fn remove(&mut self, utxo_id: &UtxoId) -> Option<TransactionOutput> {
        self.utxos.remove(utxo_id)
    }

    pub fn utxo_ids(&self) -> impl Iterator<Item = &UtxoId> {
        self.utxos.keys()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}
