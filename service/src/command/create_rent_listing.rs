//! [`Command`] for filing a new [`RentListing`].

use common::{
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        advertiser, agent, approval,
        code::{Code, UrlId},
        listing::{self, rent},
        location,
        permission::{self, Action, EntityKind},
        review,
        validation::{Invalid, Invalids},
        Advertiser, Agent, RentListing, ReviewTask,
    },
    infra::{storage, Storage},
    Service,
};

use super::{mint_free_code, mint_free_url_id, spawn_review, Command};

/// [`Command`] for filing a new [`RentListing`].
#[derive(Clone, Debug)]
pub struct CreateRentListing {
    /// ID of the [`Agent`] filing the listing.
    pub initiator_id: agent::Id,

    /// [`location::Path`] of the new listing.
    pub location: location::Path,

    /// Street address of the new listing.
    pub address: listing::Address,

    /// Announced deposit.
    pub announced_deposit: rent::Deposit,

    /// Lowest deposit the advertiser would settle for.
    pub floor_deposit: rent::Deposit,

    /// Announced monthly rent.
    pub announced_rent: rent::Rent,

    /// Lowest monthly rent the advertiser would settle for.
    pub floor_rent: rent::Rent,

    /// Indicator whether deposit and rent are convertible into each other.
    pub convertible: bool,

    /// Number of rooms.
    pub rooms: listing::Rooms,

    /// Area of the apartment.
    pub area: listing::Area,

    /// Age of the building.
    pub age: listing::Age,

    /// Boolean features of the apartment.
    pub features: listing::Features,

    /// Gallery images.
    pub images: listing::Images,

    /// Presentation video, if any.
    pub video: Option<listing::MediaPath>,

    /// Title of the new listing.
    pub title: listing::Title,

    /// Description of the new listing, if any.
    pub description: Option<listing::Description>,

    /// Source the listing was obtained from, if known.
    pub source: Option<listing::Source>,

    /// ID of the [`Advertiser`] owning the apartment.
    pub advertiser_id: advertiser::Id,
}

impl<Db> Command<CreateRentListing> for Service<Db>
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
            Select<By<Option<Advertiser>, advertiser::Id>>,
            Ok = Option<Advertiser>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<RentListing>,
            Ok = rent::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<RentListing>, Code>>,
            Ok = Option<RentListing>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<RentListing>, UrlId>>,
            Ok = Option<RentListing>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<RentListing>, Err = Traced<storage::Error>>
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
    type Ok = RentListing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateRentListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRentListing {
            initiator_id,
            location,
            address,
            announced_deposit,
            floor_deposit,
            announced_rent,
            floor_rent,
            convertible,
            rooms,
            area,
            age,
            features,
            images,
            video,
            title,
            description,
            source,
            advertiser_id,
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
            EntityKind::RentListing,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let mut invalids = Invalids::new();

        if initiator.role != agent::Role::Manager
            && initiator.sub_district != location.sub_district
        {
            invalids.push(Invalid::new(
                "sub_district",
                "agent is not permitted to create a listing in this \
                 sub-district",
            ));
        }

        let resolved = self
            .database()
            .execute(Select(By::<Option<location::Path>, _>::new(location)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if resolved.is_none() {
            invalids.push(Invalid::new(
                "location",
                "location levels do not form a known hierarchy path",
            ));
        }

        if floor_deposit > announced_deposit {
            invalids.push(Invalid::new(
                "floor_deposit",
                "floor deposit exceeds the announced deposit",
            ));
        }
        if floor_rent > announced_rent {
            invalids.push(Invalid::new(
                "floor_rent",
                "floor rent exceeds the announced rent",
            ));
        }

        let advertiser = self
            .database()
            .execute(Select(By::<Option<Advertiser>, _>::new(advertiser_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if advertiser.is_none() {
            invalids.push(Invalid::new(
                "advertiser",
                "advertiser does not exist",
            ));
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

        let code = mint_free_code::<RentListing, _>(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let url_id = mint_free_url_id::<RentListing, _>(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let id = tx
            .execute(Allocate::<RentListing>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = RentListing {
            id,
            code,
            url_id,
            location,
            address,
            announced_deposit,
            floor_deposit,
            announced_rent,
            floor_rent,
            convertible,
            rooms,
            area,
            age,
            features,
            images,
            video,
            title,
            description,
            source,
            advertiser_id,
            agent_id: initiator.id,
            status: approval::Status::Pending,
            delete_requested: false,
            created_at: DateTime::now().coerce(),
            accepted_at: None,
            expires_at: None,
        };

        tx.execute(Insert(created.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        spawn_review(
            &tx,
            review::Kind::NewRentListing,
            review::Subject::RentListing(created.id),
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

/// Error of [`CreateRentListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Probing free codes exhausted the 6-digit or URL identifier space.
    #[display("no free identifier found")]
    CodeSpaceExhausted,

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// The permission matrix denied the action.
    #[display("`{role}` role may not create rent listings")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// Field-level validation failed.
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] Invalids),
}
