//! In-memory operation implementations, one module per aggregate.

mod advertiser;
mod agent;
mod bookmark;
mod customer;
mod listing;
mod location;
mod meeting;
mod notification;
mod report;
mod review;
mod task;
mod trade;

/// Implements a `Select` operation identically for both the
/// [`NonTx`](super::NonTx) and [`Tx`](super::Tx) clients.
macro_rules! impl_select {
    ($what:ty, by: $by:ty, |$state:ident, $by_val:ident| $body:expr) => {
        impl
            ::common::Handler<
                ::common::operations::Select<
                    ::common::operations::By<$what, $by>,
                >,
            >
            for $crate::infra::storage::Memory<
                $crate::infra::storage::memory::NonTx,
            >
        {
            type Ok = $what;
            type Err = ::tracerr::Traced<$crate::infra::storage::Error>;

            async fn execute(
                &self,
                op: ::common::operations::Select<
                    ::common::operations::By<$what, $by>,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                let $by_val = op.0.into_inner();
                Ok(self.client().read(move |$state| $body).await)
            }
        }

        impl
            ::common::Handler<
                ::common::operations::Select<
                    ::common::operations::By<$what, $by>,
                >,
            >
            for $crate::infra::storage::Memory<
                $crate::infra::storage::memory::Tx,
            >
        {
            type Ok = $what;
            type Err = ::tracerr::Traced<$crate::infra::storage::Error>;

            async fn execute(
                &self,
                op: ::common::operations::Select<
                    ::common::operations::By<$what, $by>,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                let $by_val = op.0.into_inner();
                Ok(self.client().read(move |$state| $body).await)
            }
        }
    };
}

/// Implements an `Allocate` operation on the [`Tx`](super::Tx) client.
macro_rules! impl_allocate {
    ($what:ty, $id:ty, $table:literal) => {
        impl ::common::Handler<::common::operations::Allocate<$what>>
            for $crate::infra::storage::Memory<
                $crate::infra::storage::memory::Tx,
            >
        {
            type Ok = $id;
            type Err = ::tracerr::Traced<$crate::infra::storage::Error>;

            async fn execute(
                &self,
                _: ::common::operations::Allocate<$what>,
            ) -> Result<Self::Ok, Self::Err> {
                Ok(<$id>::from(
                    self.client().mutate(|state| state.next_id($table)),
                ))
            }
        }
    };
}

pub(super) use {impl_allocate, impl_select};

/// Paginates the provided sorted identifiers according to the arguments.
pub(super) fn paginate<C>(
    mut ids: Vec<C>,
    args: &common::pagination::Arguments<C>,
) -> common::pagination::Connection<C, C>
where
    C: Copy + Ord,
{
    use common::pagination::Kind;

    ids.sort_unstable();
    let cursor = args.cursor().copied();
    let limit = args.limit();

    let window: Vec<C> = match args.kind() {
        Kind::Forward => ids
            .into_iter()
            .filter(|id| cursor.map_or(true, |c| *id > c))
            .collect(),
        Kind::ForwardIncluding => ids
            .into_iter()
            .filter(|id| cursor.map_or(true, |c| *id >= c))
            .collect(),
        Kind::Backward => {
            let mut picked: Vec<C> = ids
                .into_iter()
                .filter(|id| cursor.map_or(true, |c| *id < c))
                .collect();
            picked.reverse();
            picked
        }
        Kind::BackwardIncluding => {
            let mut picked: Vec<C> = ids
                .into_iter()
                .filter(|id| cursor.map_or(true, |c| *id <= c))
                .collect();
            picked.reverse();
            picked
        }
    };

    let has_more = window.len() > limit;
    let edges = window.into_iter().take(limit).map(|id| (id, id));
    common::pagination::Connection::new(args, edges, has_more)
}
