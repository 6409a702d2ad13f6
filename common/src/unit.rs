//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing an entity acceptance.
#[derive(Clone, Copy, Debug)]
pub struct Acceptance;

/// Marker type describing an entity expiry.
#[derive(Clone, Copy, Debug)]
pub struct Expiry;

/// Marker type describing an entity delivery.
#[derive(Clone, Copy, Debug)]
pub struct Delivery;

/// Marker type describing an entity viewing.
#[derive(Clone, Copy, Debug)]
pub struct Viewing;
