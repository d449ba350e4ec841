use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use scroogecoin_lib::{
    Coin, Keypair, OutputIndex, Sha256, Transaction, TransactionBuilder, TransactionId,
    TransactionOutput, TxHandler, UtxoId, UtxoPool,
};

const CHAIN_LENGTH: usize = 100;

// A chain of transfers where each transaction spends the output minted by the
// previous one, so every candidate in the epoch is accepted.
fn chained_transfers(owner: &Keypair, pool: &mut UtxoPool) -> Vec<Transaction> {
    let genesis = UtxoId::new(
        TransactionId::new(Sha256::from_raw([1; 32])),
        OutputIndex::new(0),
    );
    pool.insert(
        genesis,
        TransactionOutput::new(Coin::new(1000), owner.public_key()),
    );

    let mut transactions = Vec::with_capacity(CHAIN_LENGTH);
    let mut spend = genesis;
    for _ in 0..CHAIN_LENGTH {
        let transaction = TransactionBuilder::new()
            .add_input(spend)
            .add_output(TransactionOutput::new(Coin::new(1000), owner.public_key()))
            .sign(&[owner])
            .unwrap();
        spend = UtxoId::new(*transaction.id(), OutputIndex::new(0));
        transactions.push(transaction);
    }
    transactions
}

fn handle_epoch_benchmark(c: &mut Criterion) {
    let owner = Keypair::generate();
    let mut pool = UtxoPool::new();
    let transactions = chained_transfers(&owner, &mut pool);

    let mut group = c.benchmark_group("Epoch processing");
    group.throughput(Throughput::Elements(CHAIN_LENGTH as u64));
    group.bench_function("handle_epoch with 100 chained transfers", |b| {
        b.iter(|| {
            let mut handler = TxHandler::new(&pool);
            let accepted = handler.handle_epoch(black_box(&transactions));
            assert_eq!(accepted.len(), CHAIN_LENGTH);
            black_box(accepted);
        })
    });
    group.finish();
}

criterion_group!(benches, handle_epoch_benchmark);

criterion_main!(benches);
