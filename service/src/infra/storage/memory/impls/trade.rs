//! [`Trade`] operations.

use common::operations::{Insert, Update};
use tracerr::Traced;

use crate::{
    domain::{code::Code, trade, Trade},
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
};

use super::{impl_allocate, impl_select};

impl_allocate!(Trade, trade::Id, "trades");

impl common::Handler<Insert<Trade>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(trade): Insert<Trade>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.trades.contains_key(&trade.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "trades_pkey",
                    });
                }
                if state.trades.values().any(|t| t.code == trade.code) {
                    return Err(Error::UniqueViolation {
                        constraint: "trades_code_key",
                    });
                }
                let _ = state.trades.insert(trade.id, trade);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<Trade>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(trade): Update<Trade>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.trades.contains_key(&trade.id) {
                    return Err(Error::RowMissing { table: "trades" });
                }
                let _ = state.trades.insert(trade.id, trade);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<Trade>, by: trade::Id, |state, id| {
    state.trades.get(&id).cloned()
});

impl_select!(Option<Trade>, by: Code, |state, code| {
    state.trades.values().find(|t| t.code == code).cloned()
});
