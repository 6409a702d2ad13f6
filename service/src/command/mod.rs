//! [`Command`] definition.

pub mod capture_followup;
pub mod complete_meeting;
pub mod create_advertiser;
pub mod create_agent;
pub mod create_buyer;
pub mod create_location;
pub mod create_rent_listing;
pub mod create_renter;
pub mod create_sale_listing;
pub mod create_task;
pub mod create_trade;
pub mod deliver_task;
pub mod purge_entity;
pub mod request_deletion;
pub mod review_daily_report;
pub mod schedule_meeting;
pub mod send_interaction;
pub mod submit_daily_report;
pub mod submit_verdict;
pub mod toggle_bookmark;
pub mod view_interaction;
pub mod view_notification;

use common::{
    operations::{Allocate, By, Insert, Select},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{
        code::{Code, UrlId},
        meeting, review, ReviewTask,
    },
    infra::{storage, Storage},
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    capture_followup::CaptureFollowup, complete_meeting::CompleteMeeting,
    create_advertiser::CreateAdvertiser, create_agent::CreateAgent,
    create_buyer::CreateBuyer, create_location::CreateLocation,
    create_rent_listing::CreateRentListing, create_renter::CreateRenter,
    create_sale_listing::CreateSaleListing, create_task::CreateTask,
    create_trade::CreateTrade, deliver_task::DeliverTask,
    purge_entity::PurgeEntity, request_deletion::RequestDeletion,
    review_daily_report::ReviewDailyReport,
    schedule_meeting::ScheduleMeeting, send_interaction::SendInteraction,
    submit_daily_report::SubmitDailyReport, submit_verdict::SubmitVerdict,
    toggle_bookmark::ToggleBookmark, view_interaction::ViewInteraction,
    view_notification::ViewNotification,
};

/// Number of fresh codes probed before giving up on a kind's 6-digit
/// space.
pub(crate) const CODE_MINT_ATTEMPTS: usize = 3;

/// Mints a [`Code`] that is free in the `W` table, probing through the
/// provided client.
///
/// [`None`] means every probed code was taken.
///
/// # Errors
///
/// Propagates storage errors of the probes.
pub(crate) async fn mint_free_code<W, Db>(
    db: &Db,
) -> Result<Option<Code>, Traced<storage::Error>>
where
    Db: Storage<
        Select<By<Option<W>, Code>>,
        Ok = Option<W>,
        Err = Traced<storage::Error>,
    >,
{
    for _ in 0..CODE_MINT_ATTEMPTS {
        let code = Code::mint();
        let taken = db
            .execute(Select(By::<Option<W>, _>::new(code.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        if taken.is_none() {
            return Ok(Some(code));
        }
    }
    Ok(None)
}

/// Mints an [`UrlId`] that is free in the `W` table, probing through the
/// provided client.
///
/// [`None`] means every probed identifier was taken.
///
/// # Errors
///
/// Propagates storage errors of the probes.
pub(crate) async fn mint_free_url_id<W, Db>(
    db: &Db,
) -> Result<Option<UrlId>, Traced<storage::Error>>
where
    Db: Storage<
        Select<By<Option<W>, UrlId>>,
        Ok = Option<W>,
        Err = Traced<storage::Error>,
    >,
{
    for _ in 0..CODE_MINT_ATTEMPTS {
        let url_id = UrlId::mint();
        let taken = db
            .execute(Select(By::<Option<W>, _>::new(url_id.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        if taken.is_none() {
            return Ok(Some(url_id));
        }
    }
    Ok(None)
}

/// Mints a [`Code`] that is free among meetings of the provided class.
///
/// [`None`] means every probed code was taken.
///
/// # Errors
///
/// Propagates storage errors of the probes.
pub(crate) async fn mint_free_meeting_code<Db>(
    db: &Db,
    class: meeting::Class,
) -> Result<Option<Code>, Traced<storage::Error>>
where
    Db: Storage<
        Select<By<Option<meeting::Meeting>, (meeting::Class, Code)>>,
        Ok = Option<meeting::Meeting>,
        Err = Traced<storage::Error>,
    >,
{
    for _ in 0..CODE_MINT_ATTEMPTS {
        let code = Code::mint();
        let taken = db
            .execute(Select(By::<Option<meeting::Meeting>, _>::new((
                class,
                code.clone(),
            ))))
            .await
            .map_err(tracerr::wrap!())?;
        if taken.is_none() {
            return Ok(Some(code));
        }
    }
    Ok(None)
}

/// Spawns the open [`ReviewTask`] paired with a freshly created or
/// advanced entity, inside the caller's transaction.
///
/// [`None`] means the review code space probing was exhausted.
///
/// # Errors
///
/// Propagates storage errors.
pub(crate) async fn spawn_review<Db>(
    db: &Db,
    kind: review::Kind,
    subject: review::Subject,
) -> Result<Option<ReviewTask>, Traced<storage::Error>>
where
    Db: Storage<
            Select<By<Option<ReviewTask>, Code>>,
            Ok = Option<ReviewTask>,
            Err = Traced<storage::Error>,
        > + Storage<
            Allocate<ReviewTask>,
            Ok = review::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<ReviewTask>, Err = Traced<storage::Error>>,
{
    let Some(code) = mint_free_code::<ReviewTask, _>(db).await? else {
        return Ok(None);
    };
    let id = db
        .execute(Allocate::new())
        .await
        .map_err(tracerr::wrap!())?;

    let review = ReviewTask {
        id,
        code,
        kind,
        condition: review::Condition::Open,
        subject,
        created_at: DateTime::now().coerce(),
    };
    db.execute(Insert(review.clone()))
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

    Ok(Some(review))
}
