use crate::{Coin, OutputIndex, Transaction, UtxoId, UtxoPool};
use log::debug;
use std::collections::HashSet;
use thiserror::Error;

/// Why a candidate transaction was rejected. Rejected candidates are simply
/// excluded from the accepted set; this taxonomy exists for callers and logs
/// that want to know the first check that failed.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RejectReason {
    #[error("input {input_index} references an unknown or spent output: {utxo_id}")]
    MissingUtxo { input_index: usize, utxo_id: UtxoId },
    #[error("input {input_index} carries an invalid signature")]
    BadSignature { input_index: usize },
    #[error("input {input_index} claims {utxo_id} which is already claimed by an earlier input")]
    DuplicateClaim { input_index: usize, utxo_id: UtxoId },
    #[error("output {output_index} has a negative value: {amount}")]
    NegativeOutput { output_index: usize, amount: Coin },
    #[error("value sum overflows the coin domain")]
    ValueOverflow,
    #[error("outputs ({output_total}) exceed inputs ({input_total})")]
    InsufficientInput {
        input_total: Coin,
        output_total: Coin,
    },
}

/// The public ledger authority for one validation epoch at a time.
///
/// Owns a deep copy of the UTXO pool it was constructed with, judges candidate
/// transactions against it and commits the effects of accepted ones. The caller's
/// original pool is never aliased or mutated.
pub struct TxHandler {
    utxo_pool: UtxoPool,
}

impl TxHandler {
    /// Creates a ledger whose current unspent output set is a copy of `utxo_pool`.
    pub fn new(utxo_pool: &UtxoPool) -> Self {
        Self {
            utxo_pool: utxo_pool.clone(),
        }
    }

    /// Read-only view of the current pool.
    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    /// True iff the transaction is acceptable against the current pool.
    pub fn is_valid(&self, transaction: &Transaction) -> bool {
        self.check_transaction(transaction).is_ok()
    }

    /// Runs the validity checks in order, stopping at the first failure:
    /// every input references an output present in the pool, every input's
    /// signature verifies against the referenced output's recipient key, no
    /// output is claimed twice, no output value is negative, and the inputs
    /// cover the outputs (any excess is an implicit fee). Read-only on the pool.
    pub fn check_transaction(&self, transaction: &Transaction) -> Result<(), RejectReason> {
        let mut claimed: HashSet<UtxoId> = HashSet::new();
        let mut input_total = Coin::zero();

        for (input_index, input) in transaction.inputs().iter().enumerate() {
            let utxo_id = *input.utxo_id();
            let referenced_output = match self.utxo_pool.output(&utxo_id) {
                Some(output) => output,
                None => {
                    return Err(RejectReason::MissingUtxo {
                        input_index,
                        utxo_id,
                    })
                }
            };

            let payload = transaction.signing_payload(input_index);
            if !referenced_output
                .recipient()
                .verify(&payload, input.signature())
            {
                return Err(RejectReason::BadSignature { input_index });
            }

            if !claimed.insert(utxo_id) {
                return Err(RejectReason::DuplicateClaim {
                    input_index,
                    utxo_id,
                });
            }

            input_total = input_total
                .checked_add(referenced_output.amount())
                .ok_or(RejectReason::ValueOverflow)?;
        }

        let mut output_total = Coin::zero();
        for (output_index, output) in transaction.outputs().iter().enumerate() {
            if output.amount().is_negative() {
                return Err(RejectReason::NegativeOutput {
                    output_index,
                    amount: output.amount(),
                });
            }
            output_total = output_total
                .checked_add(output.amount())
                .ok_or(RejectReason::ValueOverflow)?;
        }

        if input_total < output_total {
            return Err(RejectReason::InsufficientInput {
                input_total,
                output_total,
            });
        }
        Ok(())
    }

    /// Handles one epoch: checks each candidate in the supplied order against
    /// the current pool state, commits the effects of every accepted transaction
    /// immediately, and returns the accepted subset in decision order.
    ///
    /// Because the pool mutates as the epoch progresses, a candidate may spend
    /// an output created by an earlier accepted candidate of the same epoch.
    /// Order sensitivity is a documented property: the reverse order would
    /// reject the dependent transaction.
    pub fn handle_epoch(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        let mut accepted = Vec::new();
        for transaction in candidates {
            match self.check_transaction(transaction) {
                Ok(()) => {
                    self.commit(transaction);
                    accepted.push(transaction.clone());
                }
                Err(reason) => {
                    debug!("Rejecting transaction {}: {}", transaction.id(), reason);
                }
            }
        }
        accepted
    }

    // Applies an accepted transaction: consumed outputs leave the pool, newly
    // produced outputs enter it keyed by this transaction's id and position.
    fn commit(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.utxo_pool.remove(input.utxo_id());
        }
        for (output_index, output) in transaction.outputs().iter().enumerate() {
            let utxo_id = UtxoId::new(
                *transaction.id(),
                OutputIndex::new(output_index as u32),
            );
            self.utxo_pool.insert(utxo_id, output.clone());
        }
    }
}
