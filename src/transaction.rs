use crate::{Coin, Keypair, PublicKey, Sha256, Signature};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output. The first output has index 0.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// Identifies one unspent transaction output: the transaction that produced it
/// and the position of the output within that transaction.
/// Equality and hashing are structural over both fields.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct UtxoId {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl UtxoId {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }
}

impl Display for UtxoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// A reference to the UTXO being spent, together with the owner's signature
/// over this transaction's signing payload for the input's position.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    utxo_id: UtxoId,
    signature: Signature,
}

impl TransactionInput {
    pub fn new(utxo_id: UtxoId, signature: Signature) -> Self {
        Self { utxo_id, signature }
    }

    pub fn utxo_id(&self) -> &UtxoId {
        &self.utxo_id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// A newly created output: an amount locked to the recipient's public key.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Coin,
    recipient: PublicKey,
}

impl TransactionOutput {
    pub fn new(amount: Coin, recipient: PublicKey) -> Self {
        Self { amount, recipient }
    }

    pub fn amount(&self) -> Coin {
        self.amount
    }

    pub fn recipient(&self) -> &PublicKey {
        &self.recipient
    }
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.recipient)
    }
}

/// An immutable transfer of coins: a list of inputs spending existing outputs
/// and a list of newly created outputs. The id is a content hash computed once,
/// when all fields are finalized.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let id = Self::hash_transaction_data(&inputs, &outputs);
        Self {
            id,
            inputs,
            outputs,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    /// The message that the owner of the output referenced by the input at
    /// `input_index` must sign. It covers every referenced outpoint and every
    /// output, so altering any of them invalidates all previously produced
    /// signatures. Deterministic: same content and same index yield the same
    /// bytes.
    pub fn signing_payload(&self, input_index: usize) -> Vec<u8> {
        signing_payload(
            self.inputs.iter().map(TransactionInput::utxo_id),
            &self.outputs,
            input_index,
        )
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> TransactionId {
        let data = bincode::serialize(&(inputs, outputs))
            .expect("transaction data serialization never fails");
        TransactionId::new(Sha256::double_digest(&data))
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Accumulates input references and outputs for a transaction that has not been
/// signed yet. The signing payload is available before any signature exists, so
/// owners can sign it, and `build` assembles the final immutable transaction.
pub struct TransactionBuilder {
    input_utxo_ids: Vec<UtxoId>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self {
            input_utxo_ids: vec![],
            outputs: vec![],
        }
    }

    pub fn add_input(mut self, utxo_id: UtxoId) -> Self {
        self.input_utxo_ids.push(utxo_id);
        self
    }

    pub fn add_output(mut self, output: TransactionOutput) -> Self {
        self.outputs.push(output);
        self
    }

    /// The message to sign for the input at `input_index`. Byte-for-byte equal
    /// to `Transaction::signing_payload` of the built transaction.
    pub fn signing_payload(&self, input_index: usize) -> Vec<u8> {
        signing_payload(self.input_utxo_ids.iter(), &self.outputs, input_index)
    }

    /// Finalizes the transaction with one externally produced signature per input,
    /// in input order.
    pub fn build(self, signatures: Vec<Signature>) -> Result<Transaction, String> {
        if signatures.len() != self.input_utxo_ids.len() {
            return Err(format!(
                "Expected {} signatures but got: {}",
                self.input_utxo_ids.len(),
                signatures.len()
            ));
        }
        let inputs = self
            .input_utxo_ids
            .into_iter()
            .zip(signatures.into_iter())
            .map(|(utxo_id, signature)| TransactionInput::new(utxo_id, signature))
            .collect();
        Ok(Transaction::new(inputs, self.outputs))
    }

    /// Signs each input's payload with the matching keypair, in input order.
    pub fn sign(self, signers: &[&Keypair]) -> Result<Transaction, String> {
        if signers.len() != self.input_utxo_ids.len() {
            return Err(format!(
                "Expected {} signers but got: {}",
                self.input_utxo_ids.len(),
                signers.len()
            ));
        }
        let signatures = signers
            .iter()
            .enumerate()
            .map(|(index, keypair)| keypair.sign(&self.signing_payload(index)))
            .collect();
        self.build(signatures)
    }
}

// Fixed-width concatenation of every referenced outpoint, every output and the
// input's ordinal position.
fn signing_payload<'a>(
    input_utxo_ids: impl Iterator<Item = &'a UtxoId>,
    outputs: &[TransactionOutput],
    input_index: usize,
) -> Vec<u8> {
    let mut data = Vec::new();
    for utxo_id in input_utxo_ids {
        data.extend_from_slice(utxo_id.transaction_id().as_slice());
        data.extend_from_slice(&utxo_id.output_index().raw().to_le_bytes());
    }
    for output in outputs {
        data.extend_from_slice(&output.amount().raw().to_le_bytes());
        data.extend_from_slice(output.recipient().as_slice());
    }
    data.extend_from_slice(&(input_index as u64).to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keypair;

    fn utxo_id(seed: u8, index: u32) -> UtxoId {
        UtxoId::new(
            TransactionId::new(Sha256::from_raw([seed; 32])),
            OutputIndex::new(index),
        )
    }

    #[test]
    fn builder_payload_matches_built_transaction_payload() {
        let recipient = Keypair::generate();
        let signer = Keypair::generate();
        let builder = TransactionBuilder::new()
            .add_input(utxo_id(1, 0))
            .add_output(TransactionOutput::new(
                Coin::new(25),
                recipient.public_key(),
            ));
        let expected_payload = builder.signing_payload(0);
        let transaction = builder.sign(&[&signer]).unwrap();
        assert_eq!(transaction.signing_payload(0), expected_payload);
    }

    #[test]
    fn payload_differs_per_input_position() {
        let recipient = Keypair::generate();
        let builder = TransactionBuilder::new()
            .add_input(utxo_id(1, 0))
            .add_input(utxo_id(2, 1))
            .add_output(TransactionOutput::new(
                Coin::new(25),
                recipient.public_key(),
            ));
        assert_ne!(builder.signing_payload(0), builder.signing_payload(1));
    }

    #[test]
    fn payload_changes_when_any_output_changes() {
        let recipient = Keypair::generate();
        let base = TransactionBuilder::new()
            .add_input(utxo_id(1, 0))
            .add_output(TransactionOutput::new(
                Coin::new(25),
                recipient.public_key(),
            ));
        let payload = base.signing_payload(0);
        let altered = TransactionBuilder::new()
            .add_input(utxo_id(1, 0))
            .add_output(TransactionOutput::new(
                Coin::new(26),
                recipient.public_key(),
            ));
        assert_ne!(altered.signing_payload(0), payload);
    }

    #[test]
    fn transaction_id_depends_on_content() {
        let signer = Keypair::generate();
        let recipient = Keypair::generate();
        let make = |amount: i64| {
            TransactionBuilder::new()
                .add_input(utxo_id(1, 0))
                .add_output(TransactionOutput::new(
                    Coin::new(amount),
                    recipient.public_key(),
                ))
                .sign(&[&signer])
                .unwrap()
        };
        assert_ne!(make(25).id(), make(26).id());
    }

    #[test]
    fn build_rejects_signature_count_mismatch() {
        let recipient = Keypair::generate();
        let builder = TransactionBuilder::new()
            .add_input(utxo_id(1, 0))
            .add_output(TransactionOutput::new(
                Coin::new(25),
                recipient.public_key(),
            ));
        assert!(builder.build(vec![]).is_err());
    }
}
