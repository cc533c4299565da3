//! Buy/sell transfer history

use tracing::instrument;

use super::paginate;
use crate::error::RestResult;
use crate::rpc::CoinbaseRpc;
use crate::types::Transfer;

/// Transfer endpoints
pub struct TransferEndpoints<'a> {
    rpc: &'a CoinbaseRpc,
}

impl<'a> TransferEndpoints<'a> {
    pub fn new(rpc: &'a CoinbaseRpc) -> Self {
        Self { rpc }
    }

    /// List up to `count` most recent transfers
    #[instrument(skip(self))]
    pub fn list(&self, count: usize) -> RestResult<Vec<Transfer>> {
        paginate(self.rpc, "/transfers", "transfers", "transfer", count)
    }
}
