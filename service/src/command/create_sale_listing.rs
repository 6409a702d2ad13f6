//! [`Command`] for filing a new [`SaleListing`].

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
        listing::{self, sale},
        location,
        permission::{self, Action, EntityKind},
        review,
        validation::{Invalid, Invalids},
        Advertiser, Agent, ReviewTask, SaleListing,
    },
    infra::{storage, Storage},
    Service,
};

use super::{mint_free_code, mint_free_url_id, spawn_review, Command};

/// [`Command`] for filing a new [`SaleListing`].
#[derive(Clone, Debug)]
pub struct CreateSaleListing {
    /// ID of the [`Agent`] filing the listing.
    pub initiator_id: agent::Id,

    /// [`location::Path`] of the new listing.
    pub location: location::Path,

    /// Street address of the new listing.
    pub address: listing::Address,

    /// Announced price.
    pub announced_price: sale::Price,

    /// Lowest price the advertiser would settle for.
    pub floor_price: sale::Price,

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

impl<Db> Command<CreateSaleListing> for Service<Db>
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
            Allocate<SaleListing>,
            Ok = sale::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<SaleListing>, Code>>,
            Ok = Option<SaleListing>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<SaleListing>, UrlId>>,
            Ok = Option<SaleListing>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<SaleListing>, Err = Traced<storage::Error>>
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
    type Ok = SaleListing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateSaleListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateSaleListing {
            initiator_id,
            location,
            address,
            announced_price,
            floor_price,
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
            EntityKind::SaleListing,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let mut invalids = Invalids::new();

        // Territorial authorization: non-managers only file inside their
        // own sub-district.
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

        if floor_price > announced_price {
            invalids.push(Invalid::new(
                "floor_price",
                "floor price exceeds the announced price",
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

        let code = mint_free_code::<SaleListing, _>(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let url_id = mint_free_url_id::<SaleListing, _>(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let id = tx
            .execute(Allocate::<SaleListing>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = SaleListing {
            id,
            code,
            url_id,
            location,
            address,
            announced_price,
            floor_price,
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
            review::Kind::NewSaleListing,
            review::Subject::SaleListing(created.id),
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

/// Error of [`CreateSaleListing`] [`Command`] execution.
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
    #[display("`{role}` role may not create sale listings")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// Field-level validation failed.
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] Invalids),
}
