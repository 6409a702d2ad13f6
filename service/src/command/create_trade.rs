//! [`Command`] for recording a new [`Trade`].

use common::{
    calendar,
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent,
        code::Code,
        deal, meeting,
        permission::{self, Action, EntityKind},
        trade,
        validation::{Invalid, Invalids},
        Agent, Meeting, Trade,
    },
    infra::{storage, Storage},
    Service,
};

use super::{mint_free_code, Command};

/// [`Command`] for recording a new [`Trade`] out of a closed session.
#[derive(Clone, Debug)]
pub struct CreateTrade {
    /// ID of the [`Agent`] recording the trade.
    pub initiator_id: agent::Id,

    /// [`Code`] of the parent session.
    pub session_code: Code,

    /// Business-calendar day the deal was closed on.
    pub date: calendar::Date,

    /// Monetary figures of the deal.
    pub figures: trade::Figures,

    /// Contract owner name.
    pub owner: trade::PartyName,

    /// Contract counterparty name.
    pub counterparty: trade::PartyName,
}

impl<Db> Command<CreateTrade> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Meeting>, (meeting::Class, Code)>>,
            Ok = Option<Meeting>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<Trade>,
            Ok = trade::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Trade>, Code>>,
            Ok = Option<Trade>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Trade>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Trade;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateTrade) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateTrade {
            initiator_id,
            session_code,
            date,
            figures,
            owner,
            counterparty,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;

        if !permission::authorize(
            Some(initiator.role),
            EntityKind::Trade,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let mut invalids = Invalids::new();

        let session = self
            .database()
            .execute(Select(By::<Option<Meeting>, _>::new((
                meeting::Class::Session,
                session_code.clone(),
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        match session {
            None => invalids.push(Invalid::new(
                "session_code",
                "session does not exist",
            )),
            Some(session) => {
                let figures_kind = match figures {
                    trade::Figures::Sale { .. } => deal::Kind::Sale,
                    trade::Figures::Rent { .. } => deal::Kind::Rent,
                };
                if figures_kind != session.kind() {
                    invalids.push(Invalid::new(
                        "figures",
                        "figures do not match the session's deal side",
                    ));
                }
            }
        }

        invalids
            .into_result()
            .map_err(E::Validation)
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let code = mint_free_code::<Trade, _>(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let id = tx
            .execute(Allocate::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = Trade {
            id,
            code,
            session_code,
            agent_id: initiator.id,
            date,
            figures,
            followup: None,
            followup_captured: false,
            owner,
            counterparty,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(created.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(created)
    }
}

/// Error of [`CreateTrade`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Probing free codes exhausted the 6-digit space.
    #[display("no free 6-digit code found")]
    CodeSpaceExhausted,

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// The permission matrix denied the action.
    #[display("`{role}` role may not record trades")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// Field-level validation failed.
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] Invalids),
}
