//! [`Command`] for extending the location hierarchy.

use common::{
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent, location,
        permission::{self, Action, EntityKind},
        Agent,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for extending the location hierarchy by one node.
#[derive(Clone, Debug)]
pub struct CreateLocation {
    /// ID of the [`Agent`] performing the extension.
    pub initiator_id: agent::Id,

    /// The node to add.
    pub node: NewNode,
}

/// A new node of the location hierarchy.
#[derive(Clone, Debug)]
pub enum NewNode {
    /// A new province.
    Province {
        /// Name of the province.
        name: location::Name,
    },

    /// A new city inside a province.
    City {
        /// Parent province.
        province_id: location::province::Id,

        /// Name of the city.
        name: location::Name,
    },

    /// A new district inside a city.
    District {
        /// Parent city.
        city_id: location::city::Id,

        /// Name of the district.
        name: location::Name,
    },

    /// A new sub-district inside a district.
    SubDistrict {
        /// Parent district.
        district_id: location::district::Id,

        /// Name of the sub-district.
        name: location::Name,
    },
}

/// Created node of the location hierarchy.
#[derive(Clone, Debug, From)]
pub enum Node {
    #[doc(hidden)]
    Province(location::Province),
    #[doc(hidden)]
    City(location::City),
    #[doc(hidden)]
    District(location::District),
    #[doc(hidden)]
    SubDistrict(location::SubDistrict),
}

impl<Db> Command<CreateLocation> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<location::Province>, location::province::Id>>,
            Ok = Option<location::Province>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<location::City>, location::city::Id>>,
            Ok = Option<location::City>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<location::District>, location::district::Id>>,
            Ok = Option<location::District>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<location::Province>,
            Ok = location::province::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Allocate<location::City>,
            Ok = location::city::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Allocate<location::District>,
            Ok = location::district::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Allocate<location::SubDistrict>,
            Ok = location::sub_district::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<location::Province>, Err = Traced<storage::Error>>
        + Storage<Insert<location::City>, Err = Traced<storage::Error>>
        + Storage<Insert<location::District>, Err = Traced<storage::Error>>
        + Storage<Insert<location::SubDistrict>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Node;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateLocation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateLocation { initiator_id, node } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;

        if !permission::authorize(
            Some(initiator.role),
            EntityKind::Location,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        // The parent level must exist before the child is attached.
        match &node {
            NewNode::Province { .. } => {}
            NewNode::City { province_id, .. } => {
                self.database()
                    .execute(Select(
                        By::<Option<location::Province>, _>::new(*province_id),
                    ))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ParentNotExists)
                    .map_err(tracerr::wrap!())
                    .map(drop)?;
            }
            NewNode::District { city_id, .. } => {
                self.database()
                    .execute(Select(By::<Option<location::City>, _>::new(
                        *city_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ParentNotExists)
                    .map_err(tracerr::wrap!())
                    .map(drop)?;
            }
            NewNode::SubDistrict { district_id, .. } => {
                self.database()
                    .execute(Select(
                        By::<Option<location::District>, _>::new(*district_id),
                    ))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ParentNotExists)
                    .map_err(tracerr::wrap!())
                    .map(drop)?;
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created_at: location::CreationDateTime = DateTime::now().coerce();
        let created = match node {
            NewNode::Province { name } => {
                let id = tx
                    .execute(Allocate::<location::Province>::new())
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let province = location::Province {
                    id,
                    name,
                    created_at,
                };
                tx.execute(Insert(province.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                Node::Province(province)
            }
            NewNode::City { province_id, name } => {
                let id = tx
                    .execute(Allocate::<location::City>::new())
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let city = location::City {
                    id,
                    province_id,
                    name,
                    created_at,
                };
                tx.execute(Insert(city.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                Node::City(city)
            }
            NewNode::District { city_id, name } => {
                let id = tx
                    .execute(Allocate::<location::District>::new())
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let district = location::District {
                    id,
                    city_id,
                    name,
                    created_at,
                };
                tx.execute(Insert(district.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                Node::District(district)
            }
            NewNode::SubDistrict { district_id, name } => {
                let id = tx
                    .execute(Allocate::<location::SubDistrict>::new())
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let sub_district = location::SubDistrict {
                    id,
                    district_id,
                    name,
                    created_at,
                };
                tx.execute(Insert(sub_district.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                Node::SubDistrict(sub_district)
            }
        };

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(created)
    }
}

/// Error of [`CreateLocation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// The permission matrix denied the action.
    #[display("`{role}` role may not extend locations")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// Parent node of the new node does not exist.
    #[display("parent location node does not exist")]
    ParentNotExists,
}
