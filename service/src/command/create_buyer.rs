//! [`Command`] for registering a new [`Buyer`].

use std::collections::BTreeSet;

use common::{
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent, approval,
        code::Code,
        customer::{self, buyer},
        listing, location,
        permission::{self, Action, EntityKind},
        phone::Phone,
        review,
        validation::{Invalid, Invalids},
        Agent, Buyer, ReviewTask,
    },
    infra::{storage, Storage},
    Service,
};

use super::{mint_free_code, spawn_review, Command};

/// [`Command`] for registering a new [`Buyer`].
#[derive(Clone, Debug)]
pub struct CreateBuyer {
    /// ID of the [`Agent`] registering the buyer.
    pub initiator_id: agent::Id,

    /// Name of the new [`Buyer`].
    pub name: customer::Name,

    /// Unique [`Phone`] of the new [`Buyer`].
    pub phone: Phone,

    /// Description of the new [`Buyer`], if any.
    pub description: Option<customer::Description>,

    /// Announced budget.
    pub announced_budget: buyer::Budget,

    /// Highest budget the buyer could stretch to.
    pub max_budget: buyer::Budget,

    /// How the buyer funds the purchase.
    pub funding: buyer::Funding,

    /// Fewest rooms accepted.
    pub min_rooms: listing::Rooms,

    /// Most rooms cared for.
    pub max_rooms: listing::Rooms,

    /// Smallest area accepted.
    pub min_area: listing::Area,

    /// Largest area cared for.
    pub max_area: listing::Area,

    /// Lowest building age accepted.
    pub min_age: listing::Age,

    /// Highest building age accepted.
    pub max_age: listing::Age,

    /// Feature filters.
    pub features: listing::Features,

    /// Home location of the buyer.
    pub home: location::Path,

    /// Sub-districts the buyer is interested in.
    pub interested_sub_districts: BTreeSet<location::sub_district::Id>,
}

impl<Db> Command<CreateBuyer> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<location::Path>, location::Path>>,
            Ok = Option<location::Path>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<
                By<Option<location::SubDistrict>, location::sub_district::Id>,
            >,
            Ok = Option<location::SubDistrict>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Buyer>, Phone>>,
            Ok = Option<Buyer>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<Buyer>,
            Ok = buyer::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Buyer>, Code>>,
            Ok = Option<Buyer>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Buyer>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<ReviewTask>, Code>>,
            Ok = Option<ReviewTask>,
            Err = Traced<storage::Error>,
        > + Storage<
            Allocate<ReviewTask>,
            Ok = review::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<ReviewTask>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Buyer;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBuyer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBuyer {
            initiator_id,
            name,
            phone,
            description,
            announced_budget,
            max_budget,
            funding,
            min_rooms,
            max_rooms,
            min_area,
            max_area,
            min_age,
            max_age,
            features,
            home,
            interested_sub_districts,
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
            EntityKind::Buyer,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let mut invalids = Invalids::new();

        // A customer-side agent only serves customers interested in its
        // own sub-district.
        if initiator.role != agent::Role::Manager
            && !interested_sub_districts.contains(&initiator.sub_district)
        {
            invalids.push(Invalid::new(
                "interested_sub_districts",
                "agent's sub-district is not among the customer's \
                 interested sub-districts",
            ));
        }

        if interested_sub_districts.is_empty() {
            invalids.push(Invalid::new(
                "interested_sub_districts",
                "at least one interested sub-district is required",
            ));
        }
        for sub_district in &interested_sub_districts {
            let known = self
                .database()
                .execute(Select(By::<Option<location::SubDistrict>, _>::new(
                    *sub_district,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if known.is_none() {
                invalids.push(Invalid::new(
                    "interested_sub_districts",
                    format!("sub-district {sub_district} does not exist"),
                ));
            }
        }

        let resolved = self
            .database()
            .execute(Select(By::<Option<location::Path>, _>::new(home)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if resolved.is_none() {
            invalids.push(Invalid::new(
                "home",
                "location levels do not form a known hierarchy path",
            ));
        }

        if announced_budget > max_budget {
            invalids.push(Invalid::new(
                "max_budget",
                "announced budget exceeds the maximum budget",
            ));
        }
        if min_rooms > max_rooms {
            invalids.push(Invalid::new("min_rooms", "rooms range inverted"));
        }
        if min_area > max_area {
            invalids.push(Invalid::new("min_area", "area range inverted"));
        }
        if min_age > max_age {
            invalids.push(Invalid::new("min_age", "age range inverted"));
        }

        let occupied = self
            .database()
            .execute(Select(By::<Option<Buyer>, _>::new(phone.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            invalids.push(Invalid::new("phone", "phone is occupied"));
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

        let code = mint_free_code::<Buyer, _>(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let id = tx
            .execute(Allocate::<Buyer>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = Buyer {
            id,
            code,
            agent_id: initiator.id,
            name,
            phone,
            description,
            announced_budget,
            max_budget,
            funding,
            min_rooms,
            max_rooms,
            min_area,
            max_area,
            min_age,
            max_age,
            features,
            home,
            interested_sub_districts,
            status: approval::Status::Pending,
            delete_requested: false,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(created.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        spawn_review(
            &tx,
            review::Kind::NewBuyer,
            review::Subject::Buyer(created.id),
        )
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?
        .ok_or(E::CodeSpaceExhausted)
        .map_err(tracerr::wrap!())
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(created)
    }
}

/// Error of [`CreateBuyer`] [`Command`] execution.
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
    #[display("`{role}` role may not create buyers")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// Field-level validation failed.
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] Invalids),
}
