//! [`Command`] for registering a new [`Renter`].

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
        customer::{self, renter},
        listing::{self, rent},
        location,
        permission::{self, Action, EntityKind},
        phone::Phone,
        review,
        validation::{Invalid, Invalids},
        Agent, Renter, ReviewTask,
    },
    infra::{storage, Storage},
    Service,
};

use super::{mint_free_code, spawn_review, Command};

/// [`Command`] for registering a new [`Renter`].
#[derive(Clone, Debug)]
pub struct CreateRenter {
    /// ID of the [`Agent`] registering the renter.
    pub initiator_id: agent::Id,

    /// Name of the new [`Renter`].
    pub name: customer::Name,

    /// Unique [`Phone`] of the new [`Renter`].
    pub phone: Phone,

    /// Description of the new [`Renter`], if any.
    pub description: Option<customer::Description>,

    /// Announced deposit.
    pub announced_deposit: rent::Deposit,

    /// Highest deposit the renter could stretch to.
    pub max_deposit: rent::Deposit,

    /// Announced monthly rent.
    pub announced_rent: rent::Rent,

    /// Highest monthly rent the renter could stretch to.
    pub max_rent: rent::Rent,

    /// Indicator whether the renter accepts deposit/rent conversion.
    pub convertible: bool,

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

    /// Home location of the renter.
    pub home: location::Path,

    /// Sub-districts the renter is interested in.
    pub interested_sub_districts: BTreeSet<location::sub_district::Id>,
}

impl<Db> Command<CreateRenter> for Service<Db>
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
            Select<By<Option<Renter>, Phone>>,
            Ok = Option<Renter>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<Renter>,
            Ok = renter::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Renter>, Code>>,
            Ok = Option<Renter>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Renter>, Err = Traced<storage::Error>>
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
    type Ok = Renter;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateRenter,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRenter {
            initiator_id,
            name,
            phone,
            description,
            announced_deposit,
            max_deposit,
            announced_rent,
            max_rent,
            convertible,
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
            EntityKind::Renter,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let mut invalids = Invalids::new();

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

        if announced_deposit > max_deposit {
            invalids.push(Invalid::new(
                "max_deposit",
                "announced deposit exceeds the maximum deposit",
            ));
        }
        if announced_rent > max_rent {
            invalids.push(Invalid::new(
                "max_rent",
                "announced rent exceeds the maximum rent",
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
            .execute(Select(By::<Option<Renter>, _>::new(phone.clone())))
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

        let code = mint_free_code::<Renter, _>(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let id = tx
            .execute(Allocate::<Renter>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = Renter {
            id,
            code,
            agent_id: initiator.id,
            name,
            phone,
            description,
            announced_deposit,
            max_deposit,
            announced_rent,
            max_rent,
            convertible,
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
            review::Kind::NewRenter,
            review::Subject::Renter(created.id),
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

/// Error of [`CreateRenter`] [`Command`] execution.
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
    #[display("`{role}` role may not create renters")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// Field-level validation failed.
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] Invalids),
}
