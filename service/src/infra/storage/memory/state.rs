//! Shared relational [`State`] of the in-memory storage.

use std::collections::BTreeMap;

use crate::domain::{
    advertiser, agent, bookmark, customer, listing, location, meeting,
    notification, report, review, task, trade, Advertiser, Agent, Bookmark,
    Buyer, DailyReport, Interaction, Meeting, Notification, RentListing,
    Renter, ReviewTask, SaleListing, Task, Trade,
};

/// Relational state of the in-memory storage.
#[derive(Clone, Debug, Default)]
pub(super) struct State {
    /// Monotonic per-table identifier sequences.
    sequences: BTreeMap<&'static str, i64>,

    /// Provinces table.
    pub(super) provinces: BTreeMap<location::province::Id, location::Province>,

    /// Cities table.
    pub(super) cities: BTreeMap<location::city::Id, location::City>,

    /// Districts table.
    pub(super) districts: BTreeMap<location::district::Id, location::District>,

    /// Sub-districts table.
    pub(super) sub_districts:
        BTreeMap<location::sub_district::Id, location::SubDistrict>,

    /// Agents table.
    pub(super) agents: BTreeMap<agent::Id, Agent>,

    /// Advertisers table.
    pub(super) advertisers: BTreeMap<advertiser::Id, Advertiser>,

    /// Sale listings table.
    pub(super) sale_listings: BTreeMap<listing::sale::Id, SaleListing>,

    /// Rent listings table.
    pub(super) rent_listings: BTreeMap<listing::rent::Id, RentListing>,

    /// Buyers table.
    pub(super) buyers: BTreeMap<customer::buyer::Id, Buyer>,

    /// Renters table.
    pub(super) renters: BTreeMap<customer::renter::Id, Renter>,

    /// Meetings (visits and sessions) table.
    pub(super) meetings: BTreeMap<meeting::Id, Meeting>,

    /// Trades table.
    pub(super) trades: BTreeMap<trade::Id, Trade>,

    /// Tasks table.
    pub(super) tasks: BTreeMap<task::Id, Task>,

    /// Review tasks table.
    pub(super) reviews: BTreeMap<review::Id, ReviewTask>,

    /// Bookmarks table.
    pub(super) bookmarks: BTreeMap<bookmark::Id, Bookmark>,

    /// Notifications table.
    pub(super) notifications: BTreeMap<notification::Id, Notification>,

    /// Interactions table.
    pub(super) interactions:
        BTreeMap<notification::InteractionId, Interaction>,

    /// Daily reports table.
    pub(super) daily_reports: BTreeMap<report::Id, DailyReport>,
}

impl State {
    /// Allocates the next identifier of the provided table.
    pub(super) fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }
}
