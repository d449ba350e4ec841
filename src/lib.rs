pub mod coin;
pub mod hash;
pub mod keys;
pub mod transaction;
pub mod tx_handler;
pub mod utxo_pool;

pub use self::{coin::*, hash::*, keys::*, transaction::*, tx_handler::*, utxo_pool::*};
