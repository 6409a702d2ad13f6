//! Suggestion matching rules.
//!
//! Pure predicates pairing listings with compatible customers, plus the
//! scoring used to sort suggestion feeds. Eligibility (approval status,
//! delete-request hiding) is part of the rules; territorial filtering and
//! expiry depend on the caller and are applied by the suggestion queries.

use common::{Money, Percent};
use rust_decimal::Decimal;

use crate::domain::{
    approval,
    customer::{Buyer, Renter},
    listing::{RentListing, SaleListing},
    location,
};

/// Collapses a rental `(deposit, rent)` pair into one equivalent figure.
///
/// The business treats one unit of monthly rent as worth `100/3` units of
/// deposit.
#[must_use]
pub fn total_equivalent(deposit: Money, rent: Money) -> Decimal {
    deposit.amount() + Decimal::from(100) * rent.amount() / Decimal::from(3)
}

/// The ±10% band applied to monetary announcements.
fn ten_percent() -> Percent {
    Percent::new(Decimal::TEN).expect("valid percent")
}

/// The ±20% band applied to equivalents and areas.
fn twenty_percent() -> Percent {
    Percent::new(Decimal::from(20)).expect("valid percent")
}

/// Indicates whether `value` lies strictly inside the `pct` window around
/// `base`.
fn inside_window(value: Decimal, base: Decimal, pct: Percent) -> bool {
    pct.below(base) < value && value < pct.above(base)
}

/// Indicates whether a customer record participates in matching at all.
fn eligible(status: approval::Status, delete_requested: bool) -> bool {
    status == approval::Status::Accepted && !delete_requested
}

/// Indicates whether the given [`Buyer`] is suggested for the given
/// [`SaleListing`].
#[must_use]
pub fn buyer_matches_sale(listing: &SaleListing, buyer: &Buyer) -> bool {
    if !eligible(buyer.status, buyer.delete_requested) {
        return false;
    }

    let price = listing.announced_price.get().amount();
    let budget = buyer.announced_budget.get().amount();
    if !inside_window(budget, price, ten_percent()) {
        return false;
    }

    area_window_from_listing(
        listing.area.get(),
        buyer.min_area.get(),
        buyer.max_area.get(),
    )
}

/// Indicates whether the given [`SaleListing`] is suggested for the given
/// [`Buyer`] (the dual predicate).
#[must_use]
pub fn sale_matches_buyer(buyer: &Buyer, listing: &SaleListing) -> bool {
    if !eligible(listing.status, listing.delete_requested) {
        return false;
    }

    let price = listing.announced_price.get().amount();
    let budget = buyer.announced_budget.get().amount();
    if !inside_window(price, budget, ten_percent()) {
        return false;
    }

    area_window_from_customer(
        listing.area.get(),
        buyer.min_area.get(),
        buyer.max_area.get(),
    )
}

/// Indicates whether the given [`Renter`] is suggested for the given
/// [`RentListing`].
///
/// The candidate set is the union of the non-convertible branch (both
/// deposit and rent inside the ±20% windows) and the convertible branch
/// (both sides convertible, total equivalents inside the ±20% window).
#[must_use]
pub fn renter_matches_rent(listing: &RentListing, renter: &Renter) -> bool {
    if !eligible(renter.status, renter.delete_requested) {
        return false;
    }

    if !area_window_from_listing(
        listing.area.get(),
        renter.min_area.get(),
        renter.max_area.get(),
    ) {
        return false;
    }

    if listing.convertible && renter.convertible {
        let l = total_equivalent(
            listing.announced_deposit.get(),
            listing.announced_rent.get(),
        );
        let r = total_equivalent(
            renter.announced_deposit.get(),
            renter.announced_rent.get(),
        );
        inside_window(r, l, twenty_percent())
    } else {
        inside_window(
            renter.announced_deposit.get().amount(),
            listing.announced_deposit.get().amount(),
            twenty_percent(),
        ) && inside_window(
            renter.announced_rent.get().amount(),
            listing.announced_rent.get().amount(),
            twenty_percent(),
        )
    }
}

/// Indicates whether the given [`RentListing`] is suggested for the given
/// [`Renter`] (the dual predicate).
#[must_use]
pub fn rent_matches_renter(renter: &Renter, listing: &RentListing) -> bool {
    if !eligible(listing.status, listing.delete_requested) {
        return false;
    }

    if !area_window_from_customer(
        listing.area.get(),
        renter.min_area.get(),
        renter.max_area.get(),
    ) {
        return false;
    }

    if listing.convertible && renter.convertible {
        let l = total_equivalent(
            listing.announced_deposit.get(),
            listing.announced_rent.get(),
        );
        let r = total_equivalent(
            renter.announced_deposit.get(),
            renter.announced_rent.get(),
        );
        inside_window(l, r, twenty_percent())
    } else {
        inside_window(
            listing.announced_deposit.get().amount(),
            renter.announced_deposit.get().amount(),
            twenty_percent(),
        ) && inside_window(
            listing.announced_rent.get().amount(),
            renter.announced_rent.get().amount(),
            twenty_percent(),
        )
    }
}

/// Area window checked from the listing side: the customer's bounds must
/// sit inside the ±20% band around the listing's area.
fn area_window_from_listing(area: u32, min: u32, max: u32) -> bool {
    let area = Decimal::from(area);
    let band = twenty_percent();
    band.below(area) < Decimal::from(min) && Decimal::from(max) < band.above(area)
}

/// Area window checked from the customer side: the listing's area must sit
/// inside the band spanned by the customer's widened bounds.
fn area_window_from_customer(area: u32, min: u32, max: u32) -> bool {
    let area = Decimal::from(area);
    let band = twenty_percent();
    band.below(Decimal::from(min)) < area && area < band.above(Decimal::from(max))
}

/// Suggestion score, `0..=100`.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Score(u8);

impl Score {
    /// Feed cut-off: candidates scoring below this are dropped.
    pub const CUTOFF: u8 = 40;

    /// Returns the raw value of this [`Score`].
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Indicates whether this [`Score`] passes the feed cut-off.
    #[must_use]
    pub const fn is_suggestible(self) -> bool {
        self.0 >= Self::CUTOFF
    }
}

/// Scores the given [`Buyer`] against the given [`SaleListing`].
#[must_use]
pub fn score_sale(listing: &SaleListing, buyer: &Buyer) -> Score {
    let price = proximity_points(
        buyer.announced_budget.get().amount(),
        listing.announced_price.get().amount(),
        [40, 30, 20, 10],
    );
    let area = area_points(
        listing.area.get(),
        buyer.min_area.get(),
        buyer.max_area.get(),
    );
    let location = location_points(listing.location, buyer.home);
    Score(price + area + location)
}

/// Scores the given [`Renter`] against the given [`RentListing`].
///
/// The price weight is split evenly across deposit and rent.
#[must_use]
pub fn score_rent(listing: &RentListing, renter: &Renter) -> Score {
    let deposit = proximity_points(
        renter.announced_deposit.get().amount(),
        listing.announced_deposit.get().amount(),
        [20, 15, 10, 5],
    );
    let rent = proximity_points(
        renter.announced_rent.get().amount(),
        listing.announced_rent.get().amount(),
        [20, 15, 10, 5],
    );
    let area = area_points(
        listing.area.get(),
        renter.min_area.get(),
        renter.max_area.get(),
    );
    let location = location_points(listing.location, renter.home);
    Score(deposit + rent + area + location)
}

/// Points for monetary proximity: full at ≤5% difference, partial at ≤10%
/// and ≤15%, minimum beyond.
fn proximity_points(
    value: Decimal,
    base: Decimal,
    bands: [u8; 4],
) -> u8 {
    let [full, close, near, far] = bands;
    if base.is_zero() {
        return if value.is_zero() { full } else { far };
    }

    let diff = (value - base).abs() / base;
    if diff <= Decimal::new(5, 2) {
        full
    } else if diff <= Decimal::new(10, 2) {
        close
    } else if diff <= Decimal::new(15, 2) {
        near
    } else {
        far
    }
}

/// Points for the area window: full inside the customer's bounds, partial
/// inside the ±20% widened bounds, minimum outside.
fn area_points(area: u32, min: u32, max: u32) -> u8 {
    if (min..=max).contains(&area) {
        30
    } else {
        let area = Decimal::from(area);
        let band = twenty_percent();
        let widened = band.below(Decimal::from(min)) <= area
            && area <= band.above(Decimal::from(max));
        if widened {
            20
        } else {
            10
        }
    }
}

/// Points for territorial proximity.
fn location_points(listing: location::Path, home: location::Path) -> u8 {
    if listing.sub_district == home.sub_district {
        30
    } else if listing.district == home.district {
        15
    } else {
        0
    }
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeSet;

    use common::{DateTime, Money};
    use rust_decimal::Decimal;

    use super::{
        buyer_matches_sale, renter_matches_rent, rent_matches_renter,
        sale_matches_buyer, score_rent, score_sale, total_equivalent, Score,
    };
    use crate::domain::{
        advertiser, agent, approval,
        code::{Code, UrlId},
        customer::{buyer, buyer::Budget, renter, Buyer, Renter},
        listing::{
            rent::{Deposit, Rent},
            sale::Price,
            Address, Age, Area, Features, Images, RentListing, Rooms,
            SaleListing, Title,
        },
        location,
    };

    fn path(sub_district: i64) -> location::Path {
        location::Path {
            province: location::province::Id::from(1),
            city: location::city::Id::from(1),
            district: location::district::Id::from(1),
            sub_district: location::sub_district::Id::from(sub_district),
        }
    }

    fn millions(m: i64) -> Money {
        Money::from_toomans(m * 1_000_000)
    }

    fn sale_listing(price_millions: i64, area: u32) -> SaleListing {
        SaleListing {
            id: super::super::listing::sale::Id::from(1),
            code: Code::new("100001").unwrap(),
            url_id: UrlId::new("A1b2C3d4E5f6G7h8I9j0").unwrap(),
            location: path(1),
            address: Address::new("street 1").unwrap(),
            announced_price: Price::new(millions(price_millions)).unwrap(),
            floor_price: Price::new(millions(price_millions)).unwrap(),
            rooms: Rooms::new(2).unwrap(),
            area: Area::new(area).unwrap(),
            age: Age::new(5).unwrap(),
            features: Features::default(),
            images: Images::default(),
            video: None,
            title: Title::new("t").unwrap(),
            description: None,
            source: None,
            advertiser_id: advertiser::Id::from(1),
            agent_id: agent::Id::from(1),
            status: approval::Status::Accepted,
            delete_requested: false,
            created_at: DateTime::UNIX_EPOCH.coerce(),
            accepted_at: None,
            expires_at: None,
        }
    }

    fn buyer_record(
        budget_millions: i64,
        min_area: u32,
        max_area: u32,
    ) -> Buyer {
        Buyer {
            id: buyer::Id::from(1),
            code: Code::new("200001").unwrap(),
            agent_id: agent::Id::from(1),
            name: super::super::customer::Name::new("\u{0639}\u{0644}\u{06CC}")
                .unwrap(),
            phone: super::super::phone::Phone::new("09123456789").unwrap(),
            description: None,
            announced_budget: Budget::new(millions(budget_millions)).unwrap(),
            max_budget: Budget::new(millions(budget_millions)).unwrap(),
            funding: buyer::Funding::Cash,
            min_rooms: Rooms::new(1).unwrap(),
            max_rooms: Rooms::new(3).unwrap(),
            min_area: Area::new(min_area).unwrap(),
            max_area: Area::new(max_area).unwrap(),
            min_age: Age::new(0).unwrap(),
            max_age: Age::new(30).unwrap(),
            features: Features::default(),
            home: path(1),
            interested_sub_districts: BTreeSet::from([
                location::sub_district::Id::from(1),
            ]),
            status: approval::Status::Accepted,
            delete_requested: false,
            created_at: DateTime::UNIX_EPOCH.coerce(),
        }
    }

    fn rent_listing(
        deposit_millions: i64,
        rent_millions: i64,
        convertible: bool,
        area: u32,
    ) -> RentListing {
        RentListing {
            id: super::super::listing::rent::Id::from(1),
            code: Code::new("300001").unwrap(),
            url_id: UrlId::new("Z1b2C3d4E5f6G7h8I9j0").unwrap(),
            location: path(1),
            address: Address::new("street 2").unwrap(),
            announced_deposit: Deposit::new(millions(deposit_millions))
                .unwrap(),
            floor_deposit: Deposit::new(millions(deposit_millions)).unwrap(),
            announced_rent: Rent::new(millions(rent_millions)).unwrap(),
            floor_rent: Rent::new(millions(rent_millions)).unwrap(),
            convertible,
            rooms: Rooms::new(2).unwrap(),
            area: Area::new(area).unwrap(),
            age: Age::new(5).unwrap(),
            features: Features::default(),
            images: Images::default(),
            video: None,
            title: Title::new("t").unwrap(),
            description: None,
            source: None,
            advertiser_id: advertiser::Id::from(1),
            agent_id: agent::Id::from(1),
            status: approval::Status::Accepted,
            delete_requested: false,
            created_at: DateTime::UNIX_EPOCH.coerce(),
            accepted_at: None,
            expires_at: None,
        }
    }

    fn renter_record(
        deposit_millions: i64,
        rent_millions: i64,
        convertible: bool,
        min_area: u32,
        max_area: u32,
    ) -> Renter {
        Renter {
            id: renter::Id::from(1),
            code: Code::new("400001").unwrap(),
            agent_id: agent::Id::from(1),
            name: super::super::customer::Name::new("\u{0639}\u{0644}\u{06CC}")
                .unwrap(),
            phone: super::super::phone::Phone::new("09123456780").unwrap(),
            description: None,
            announced_deposit: Deposit::new(millions(deposit_millions))
                .unwrap(),
            max_deposit: Deposit::new(millions(deposit_millions)).unwrap(),
            announced_rent: Rent::new(millions(rent_millions)).unwrap(),
            max_rent: Rent::new(millions(rent_millions)).unwrap(),
            convertible,
            min_rooms: Rooms::new(1).unwrap(),
            max_rooms: Rooms::new(3).unwrap(),
            min_area: Area::new(min_area).unwrap(),
            max_area: Area::new(max_area).unwrap(),
            min_age: Age::new(0).unwrap(),
            max_age: Age::new(30).unwrap(),
            features: Features::default(),
            home: path(1),
            interested_sub_districts: BTreeSet::from([
                location::sub_district::Id::from(1),
            ]),
            status: approval::Status::Accepted,
            delete_requested: false,
            created_at: DateTime::UNIX_EPOCH.coerce(),
        }
    }

    #[test]
    fn total_equivalent_formula() {
        // 200 deposit + 100·30/3 rent = 1200.
        assert_eq!(
            total_equivalent(Money::from_toomans(200), Money::from_toomans(30)),
            Decimal::from(1200),
        );
    }

    #[test]
    fn buyer_price_window_is_ten_percent() {
        let listing = sale_listing(2_000, 80);

        // Buyer bounds inside the listing's widened area band.
        assert!(buyer_matches_sale(&listing, &buyer_record(2_000, 70, 90)));
        assert!(buyer_matches_sale(&listing, &buyer_record(2_100, 70, 90)));
        assert!(!buyer_matches_sale(&listing, &buyer_record(2_200, 70, 90)));
        assert!(!buyer_matches_sale(&listing, &buyer_record(1_800, 70, 90)));
    }

    #[test]
    fn buyer_area_window_brackets_the_listing() {
        let listing = sale_listing(2_000, 80);

        // 0.8·80 = 64 < min and max < 1.2·80 = 96.
        assert!(buyer_matches_sale(&listing, &buyer_record(2_000, 65, 95)));
        assert!(!buyer_matches_sale(&listing, &buyer_record(2_000, 60, 95)));
        assert!(!buyer_matches_sale(&listing, &buyer_record(2_000, 65, 100)));
    }

    #[test]
    fn ineligible_buyers_never_match() {
        let listing = sale_listing(2_000, 80);

        let mut pending = buyer_record(2_000, 70, 90);
        pending.status = approval::Status::Pending;
        assert!(!buyer_matches_sale(&listing, &pending));

        let mut flagged = buyer_record(2_000, 70, 90);
        flagged.delete_requested = true;
        assert!(!buyer_matches_sale(&listing, &flagged));
    }

    #[test]
    fn dual_predicates_agree_on_round_figures() {
        let listing = sale_listing(2_000, 80);
        let buyer = buyer_record(2_000, 70, 90);

        assert!(buyer_matches_sale(&listing, &buyer));
        assert!(sale_matches_buyer(&buyer, &listing));
    }

    #[test]
    fn convertible_branch_uses_total_equivalents() {
        // totalEq(L) = 200 + 100·30/3 = 1200;
        // totalEq(R) = 500 + 100·20/3 ≈ 1166.67; ratio ≈ 0.972.
        let listing = rent_listing(200, 30, true, 80);
        let renter = renter_record(500, 20, true, 70, 90);

        assert!(renter_matches_rent(&listing, &renter));
    }

    #[test]
    fn convertible_ratio_monotonicity() {
        let listing = rent_listing(200, 30, true, 80);

        // Anything keeping the equivalent inside (0.8, 1.2)·1200 matches.
        for (deposit, rent) in [(961, 0), (1_000, 4), (200, 30), (1_439, 0)] {
            let renter = renter_record(deposit, rent, true, 70, 90);
            assert!(
                renter_matches_rent(&listing, &renter),
                "equivalent of ({deposit}, {rent}) must stay matched",
            );
        }

        // On or past the edges the match disappears.
        for (deposit, rent) in [(960, 0), (1_440, 0)] {
            let renter = renter_record(deposit, rent, true, 70, 90);
            assert!(!renter_matches_rent(&listing, &renter));
        }
    }

    #[test]
    fn non_convertible_branch_windows_each_figure() {
        let listing = rent_listing(200, 30, false, 80);

        assert!(renter_matches_rent(
            &listing,
            &renter_record(210, 28, false, 70, 90),
        ));
        // Deposit window broken.
        assert!(!renter_matches_rent(
            &listing,
            &renter_record(250, 30, false, 70, 90),
        ));
        // Rent window broken.
        assert!(!renter_matches_rent(
            &listing,
            &renter_record(200, 40, false, 70, 90),
        ));
        // A convertible renter against a non-convertible listing still goes
        // through the per-figure windows.
        assert!(renter_matches_rent(
            &listing,
            &renter_record(210, 28, true, 70, 90),
        ));
    }

    #[test]
    fn rent_dual_predicate_mirrors() {
        let listing = rent_listing(200, 30, true, 80);
        let renter = renter_record(200, 30, true, 70, 90);

        assert!(renter_matches_rent(&listing, &renter));
        assert!(rent_matches_renter(&renter, &listing));
    }

    #[test]
    fn sale_score_bands() {
        let listing = sale_listing(2_000, 80);

        // Exact budget, area inside bounds, same sub-district.
        let exact = buyer_record(2_000, 70, 90);
        assert_eq!(score_sale(&listing, &exact).get(), 100);

        // ~7.5% off → 30 price points.
        let close = buyer_record(2_150, 70, 90);
        assert_eq!(score_sale(&listing, &close).get(), 90);

        // Different district → no location points.
        let mut far = buyer_record(2_000, 70, 90);
        far.home = location::Path {
            province: location::province::Id::from(1),
            city: location::city::Id::from(1),
            district: location::district::Id::from(2),
            sub_district: location::sub_district::Id::from(9),
        };
        assert_eq!(score_sale(&listing, &far).get(), 70);
    }

    #[test]
    fn rent_score_splits_price_weight() {
        let listing = rent_listing(200, 30, true, 80);
        let renter = renter_record(200, 30, true, 70, 90);

        // 20 + 20 + 30 + 30.
        assert_eq!(score_rent(&listing, &renter).get(), 100);
    }

    #[test]
    fn cutoff_drops_poor_candidates() {
        assert!(Score(40).is_suggestible());
        assert!(!Score(39).is_suggestible());
    }
}
