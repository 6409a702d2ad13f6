//! Domain definitions.

pub mod advertiser;
pub mod agent;
pub mod approval;
pub mod bookmark;
pub mod code;
pub mod customer;
pub mod deal;
pub mod listing;
pub mod location;
pub mod matching;
pub mod meeting;
pub mod national_id;
pub mod notification;
pub mod permission;
pub mod phone;
pub mod report;
pub mod review;
pub mod task;
pub mod trade;
pub mod transition;
pub mod validation;

pub use self::{
    advertiser::Advertiser,
    agent::Agent,
    bookmark::Bookmark,
    code::{Code, UrlId},
    customer::{Buyer, Customer, Renter},
    listing::{Listing, RentListing, SaleListing},
    meeting::Meeting,
    national_id::NationalId,
    notification::{Interaction, Notification},
    phone::Phone,
    report::DailyReport,
    review::ReviewTask,
    task::Task,
    trade::Trade,
};
