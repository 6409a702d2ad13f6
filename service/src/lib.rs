//! Service contains the business logic of the application.
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
#[cfg(test)]
mod spec;

use std::{path::PathBuf, time::Duration};

use crate::{domain::national_id, infra::cache};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of items per page in administrative listings.
    pub items_per_page: usize,

    /// Root directory the uploaded media files live under.
    pub media_root: PathBuf,

    /// Base URL used to build links pointing back at the site.
    pub site_base_url: String,

    /// Window a listing stays current after its first acceptance.
    pub listing_expiry: Duration,

    /// Check-digit algorithm used for national id validation.
    pub national_id_algorithm: national_id::Algorithm,

    /// Time-to-live of cached unread counters.
    pub unread_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            items_per_page: 25,
            media_root: PathBuf::from("media"),
            site_base_url: "http://localhost".into(),
            listing_expiry: Duration::from_secs(60 * 24 * 60 * 60),
            national_id_algorithm: national_id::Algorithm::Standard,
            unread_cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// Storage of this [`Service`].
    database: Db,

    /// Cached unread counters of this [`Service`].
    unread: cache::UnreadCounters,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db) -> Self {
        let unread = cache::UnreadCounters::new(config.unread_cache_ttl);
        Self {
            config,
            database,
            unread,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the storage of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns the unread counter cache of this [`Service`].
    #[must_use]
    pub fn unread(&self) -> &cache::UnreadCounters {
        &self.unread
    }
}
