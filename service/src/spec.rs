//! Engine-level behavior tests against the in-memory storage.

use std::{collections::BTreeSet, time::Duration};

use common::{
    calendar,
    operations::{Allocate, By, Commit, Insert, Select, Transact},
    DateTime, Handler as _, Money,
};

use crate::{
    command::{
        create_location::{NewNode, Node},
        submit_verdict, CompleteMeeting, CreateAdvertiser, CreateAgent,
        CreateBuyer, CreateLocation, CreateRentListing, CreateRenter,
        CreateSaleListing, CreateTask, DeliverTask, RequestDeletion,
        ScheduleMeeting, SendInteraction, SubmitDailyReport, SubmitVerdict,
        ToggleBookmark, ViewInteraction, ViewNotification,
    },
    domain::{
        advertiser, agent, approval, bookmark,
        customer::{self, buyer},
        listing::{
            self,
            rent::{Deposit, Rent},
            sale::Price,
        },
        location, meeting, notification, report, review, task, transition,
        Advertiser, Agent, Buyer, Meeting, Notification, RentListing, Renter,
        ReviewTask, SaleListing, Task,
    },
    query::{
        report::{MonthActivity, Performance},
        suggestions::{SuggestBuyers, SuggestRenters, SuggestSaleListings},
        UnreadCount,
    },
    read, Config, Service,
};

use crate::infra::Memory;

/// Sixty days, the listing expiry window of the default [`Config`].
const SIXTY_DAYS: Duration = Duration::from_secs(60 * 24 * 60 * 60);

/// A fully seeded service: one manager, three sided agents, a location
/// hierarchy with three sub-districts, and one advertiser.
struct Fixture {
    svc: Service<Memory>,
    manager: agent::Id,
    file_agent: agent::Id,
    customer_agent: agent::Id,
    dual_agent: agent::Id,
    path1: location::Path,
    path2: location::Path,
    sub1: location::sub_district::Id,
    sub2: location::sub_district::Id,
    sub3: location::sub_district::Id,
    advertiser: advertiser::Id,
}

fn persian(text: &str) -> String {
    text.into()
}

fn display_name() -> agent::DisplayName {
    agent::DisplayName::new(persian("\u{0639}\u{0644}\u{06CC}")).unwrap()
}

fn customer_name() -> customer::Name {
    customer::Name::new(persian("\u{0631}\u{0636}\u{0627}")).unwrap()
}

fn millions(m: i64) -> Money {
    Money::from_toomans(m * 1_000_000)
}

async fn fixture() -> Fixture {
    let svc = Service::new(Config::default(), Memory::new());

    // The first manager is seeded straight through the storage; everything
    // else goes through commands.
    let tx = svc.database().execute(Transact).await.unwrap();
    let manager = tx.execute(Allocate::<Agent>::new()).await.unwrap();
    tx.execute(Insert(Agent {
        id: manager,
        username: agent::Username::new("boss").unwrap(),
        display_name: display_name(),
        role: agent::Role::Manager,
        sub_district: location::sub_district::Id::from(1),
        created_at: DateTime::now().coerce(),
        deleted_at: None,
    }))
    .await
    .unwrap();
    tx.execute(Commit).await.unwrap();
    // Release the transaction's global lock before driving commands, each
    // of which opens its own transaction on the same store.
    drop(tx);

    let province = match svc
        .execute(CreateLocation {
            initiator_id: manager,
            node: NewNode::Province {
                name: location::Name::new("Tehran").unwrap(),
            },
        })
        .await
        .unwrap()
    {
        Node::Province(p) => p.id,
        Node::City(_) | Node::District(_) | Node::SubDistrict(_) => {
            unreachable!()
        }
    };
    let city = match svc
        .execute(CreateLocation {
            initiator_id: manager,
            node: NewNode::City {
                province_id: province,
                name: location::Name::new("Tehran City").unwrap(),
            },
        })
        .await
        .unwrap()
    {
        Node::City(c) => c.id,
        Node::Province(_) | Node::District(_) | Node::SubDistrict(_) => {
            unreachable!()
        }
    };
    let district = match svc
        .execute(CreateLocation {
            initiator_id: manager,
            node: NewNode::District {
                city_id: city,
                name: location::Name::new("District 2").unwrap(),
            },
        })
        .await
        .unwrap()
    {
        Node::District(d) => d.id,
        Node::Province(_) | Node::City(_) | Node::SubDistrict(_) => {
            unreachable!()
        }
    };

    let mut subs = Vec::new();
    for name in ["Saadat Abad", "Shahrak Gharb", "Gisha"] {
        let id = match svc
            .execute(CreateLocation {
                initiator_id: manager,
                node: NewNode::SubDistrict {
                    district_id: district,
                    name: location::Name::new(name).unwrap(),
                },
            })
            .await
            .unwrap()
        {
            Node::SubDistrict(s) => s.id,
            Node::Province(_) | Node::City(_) | Node::District(_) => {
                unreachable!()
            }
        };
        subs.push(id);
    }
    let (sub1, sub2, sub3) = (subs[0], subs[1], subs[2]);

    let path = |sub_district| location::Path {
        province,
        city,
        district,
        sub_district,
    };

    let mut agents = Vec::new();
    for (username, role) in [
        ("file.one", agent::Role::FilePerson),
        ("customer.one", agent::Role::CustomerPerson),
        ("dual.one", agent::Role::Dual),
    ] {
        let created = svc
            .execute(CreateAgent {
                initiator_id: manager,
                username: agent::Username::new(username).unwrap(),
                display_name: display_name(),
                role,
                sub_district: sub1,
            })
            .await
            .unwrap();
        agents.push(created.id);
    }

    let advertiser = svc
        .execute(CreateAdvertiser {
            initiator_id: agents[0],
            name: advertiser::Name::new(persian("\u{0633}\u{0639}\u{06CC}\u{062F}"))
                .unwrap(),
            phone: crate::domain::Phone::new("09120000001").unwrap(),
            description: None,
        })
        .await
        .unwrap()
        .id;

    Fixture {
        svc,
        manager,
        file_agent: agents[0],
        customer_agent: agents[1],
        dual_agent: agents[2],
        path1: path(sub1),
        path2: path(sub2),
        sub1,
        sub2,
        sub3,
        advertiser,
    }
}

impl Fixture {
    async fn file_sale_listing(
        &self,
        price_millions: i64,
        area: u32,
    ) -> SaleListing {
        self.svc
            .execute(CreateSaleListing {
                initiator_id: self.file_agent,
                location: self.path1,
                address: listing::Address::new("Valiasr 12").unwrap(),
                announced_price: Price::new(millions(price_millions))
                    .unwrap(),
                floor_price: Price::new(millions(price_millions)).unwrap(),
                rooms: listing::Rooms::new(2).unwrap(),
                area: listing::Area::new(area).unwrap(),
                age: listing::Age::new(5).unwrap(),
                features: listing::Features::default(),
                images: listing::Images::default(),
                video: None,
                title: listing::Title::new("two-bedroom apartment").unwrap(),
                description: None,
                source: Some(listing::Source::Agency),
                advertiser_id: self.advertiser,
            })
            .await
            .unwrap()
    }

    async fn file_rent_listing(
        &self,
        deposit_millions: i64,
        rent_millions: i64,
        convertible: bool,
        area: u32,
    ) -> RentListing {
        self.svc
            .execute(CreateRentListing {
                initiator_id: self.file_agent,
                location: self.path1,
                address: listing::Address::new("Valiasr 14").unwrap(),
                announced_deposit: Deposit::new(millions(deposit_millions))
                    .unwrap(),
                floor_deposit: Deposit::new(millions(deposit_millions))
                    .unwrap(),
                announced_rent: Rent::new(millions(rent_millions)).unwrap(),
                floor_rent: Rent::new(millions(rent_millions)).unwrap(),
                convertible,
                rooms: listing::Rooms::new(2).unwrap(),
                area: listing::Area::new(area).unwrap(),
                age: listing::Age::new(5).unwrap(),
                features: listing::Features::default(),
                images: listing::Images::default(),
                video: None,
                title: listing::Title::new("two-bedroom rental").unwrap(),
                description: None,
                source: Some(listing::Source::Agency),
                advertiser_id: self.advertiser,
            })
            .await
            .unwrap()
    }

    async fn register_buyer(
        &self,
        initiator: agent::Id,
        phone: &str,
        budget_millions: i64,
        min_area: u32,
        max_area: u32,
        interested: BTreeSet<location::sub_district::Id>,
    ) -> Buyer {
        self.svc
            .execute(CreateBuyer {
                initiator_id: initiator,
                name: customer_name(),
                phone: crate::domain::Phone::new(phone).unwrap(),
                description: None,
                announced_budget: buyer::Budget::new(millions(
                    budget_millions,
                ))
                .unwrap(),
                max_budget: buyer::Budget::new(millions(budget_millions))
                    .unwrap(),
                funding: buyer::Funding::Cash,
                min_rooms: listing::Rooms::new(1).unwrap(),
                max_rooms: listing::Rooms::new(3).unwrap(),
                min_area: listing::Area::new(min_area).unwrap(),
                max_area: listing::Area::new(max_area).unwrap(),
                min_age: listing::Age::new(0).unwrap(),
                max_age: listing::Age::new(30).unwrap(),
                features: listing::Features::default(),
                home: self.path1,
                interested_sub_districts: interested,
            })
            .await
            .unwrap()
    }

    async fn register_renter(
        &self,
        phone: &str,
        deposit_millions: i64,
        rent_millions: i64,
        convertible: bool,
    ) -> Renter {
        self.svc
            .execute(CreateRenter {
                initiator_id: self.customer_agent,
                name: customer_name(),
                phone: crate::domain::Phone::new(phone).unwrap(),
                description: None,
                announced_deposit: Deposit::new(millions(deposit_millions))
                    .unwrap(),
                max_deposit: Deposit::new(millions(deposit_millions))
                    .unwrap(),
                announced_rent: Rent::new(millions(rent_millions)).unwrap(),
                max_rent: Rent::new(millions(rent_millions)).unwrap(),
                convertible,
                min_rooms: listing::Rooms::new(1).unwrap(),
                max_rooms: listing::Rooms::new(3).unwrap(),
                min_area: listing::Area::new(70).unwrap(),
                max_area: listing::Area::new(90).unwrap(),
                min_age: listing::Age::new(0).unwrap(),
                max_age: listing::Age::new(30).unwrap(),
                features: listing::Features::default(),
                home: self.path1,
                interested_sub_districts: BTreeSet::from([self.sub1]),
            })
            .await
            .unwrap()
    }

    async fn open_review(&self, subject: review::Subject) -> ReviewTask {
        self.svc
            .database()
            .execute(Select(By::<Option<ReviewTask>, _>::new(subject)))
            .await
            .unwrap()
            .expect("open review task")
    }

    async fn issue_verdict(
        &self,
        subject: review::Subject,
        entity_status: transition::PairStatus,
    ) -> submit_verdict::Output {
        let review = self.open_review(subject).await;
        self.svc
            .execute(SubmitVerdict {
                initiator_id: self.manager,
                review_id: review.id,
                entity_status,
                condition: review::Condition::Closed,
                note: None,
            })
            .await
            .unwrap()
    }

    async fn accept(&self, subject: review::Subject) {
        let _ = self
            .issue_verdict(
                subject,
                transition::PairStatus::Approval(approval::Status::Accepted),
            )
            .await;
    }

    async fn sale_listing(&self, id: listing::sale::Id) -> SaleListing {
        self.svc
            .database()
            .execute(Select(By::<Option<SaleListing>, _>::new(id)))
            .await
            .unwrap()
            .expect("sale listing")
    }
}

#[tokio::test]
async fn acceptance_stamps_expiry_and_fans_out() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    assert_eq!(filed.status, approval::Status::Pending);
    assert!(filed.expires_at.is_none());

    // Warm the other agents' counters so the fan-out has something to
    // drop.
    f.svc.unread().put(f.customer_agent, 7).await;
    f.svc.unread().put(f.dual_agent, 7).await;

    f.accept(review::Subject::SaleListing(filed.id)).await;

    let accepted = f.sale_listing(filed.id).await;
    assert_eq!(accepted.status, approval::Status::Accepted);
    let accepted_at = accepted.accepted_at.expect("acceptance stamp");
    let expires_at = accepted.expires_at.expect("expiry stamp");
    assert_eq!(
        expires_at.coerce::<()>() - accepted_at.coerce(),
        SIXTY_DAYS,
    );

    let fanned = f
        .svc
        .database()
        .execute(Select(By::<Option<Notification>, _>::new(
            notification::Id::from(1),
        )))
        .await
        .unwrap()
        .expect("acceptance notification");
    assert_eq!(fanned.kind, notification::Kind::ListingAccepted);
    assert_eq!(
        fanned.subject,
        notification::Subject::SaleListing(filed.id),
    );
    assert_eq!(fanned.creator, f.file_agent);
    assert_eq!(
        fanned.recipients,
        BTreeSet::from([f.manager, f.customer_agent, f.dual_agent]),
    );

    // Producing the notification dropped the cached counters.
    assert!(!f.svc.unread().contains(f.customer_agent).await);
    assert!(!f.svc.unread().contains(f.dual_agent).await);

    let unread = f
        .svc
        .execute(UnreadCount {
            agent_id: f.customer_agent,
        })
        .await
        .unwrap();
    assert_eq!(unread.get(), 1);

    let creators_unread = f
        .svc
        .execute(UnreadCount {
            agent_id: f.file_agent,
        })
        .await
        .unwrap();
    assert_eq!(creators_unread.get(), 0);
}

#[tokio::test]
async fn rejected_pair_modifies_neither_side() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    let review = f.open_review(review::Subject::SaleListing(filed.id)).await;

    // `(Accepted, Open)` is outside the legal set.
    let err = f
        .svc
        .execute(SubmitVerdict {
            initiator_id: f.manager,
            review_id: review.id,
            entity_status: transition::PairStatus::Approval(
                approval::Status::Accepted,
            ),
            condition: review::Condition::Open,
            note: None,
        })
        .await
        .unwrap_err();
    match err.as_ref() {
        submit_verdict::ExecutionError::PairTransition(pair) => {
            assert_eq!(pair.kind, review::Kind::NewSaleListing);
        }
        other => panic!("unexpected error: {other}"),
    }

    let untouched = f.sale_listing(filed.id).await;
    assert_eq!(untouched.status, approval::Status::Pending);
    let review = f.open_review(review::Subject::SaleListing(filed.id)).await;
    assert_eq!(review.condition, review::Condition::Open);
}

#[tokio::test]
async fn verdicts_are_not_repeatable() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    let review = f.open_review(review::Subject::SaleListing(filed.id)).await;
    f.accept(review::Subject::SaleListing(filed.id)).await;

    let review = f
        .svc
        .database()
        .execute(Select(By::<Option<ReviewTask>, _>::new(review.id)))
        .await
        .unwrap()
        .expect("closed review task");
    assert_eq!(review.condition, review::Condition::Closed);

    let err = f
        .svc
        .execute(SubmitVerdict {
            initiator_id: f.manager,
            review_id: review.id,
            entity_status: transition::PairStatus::Approval(
                approval::Status::Canceled,
            ),
            condition: review::Condition::Closed,
            note: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        submit_verdict::ExecutionError::PairTransition(_),
    ));
}

#[tokio::test]
async fn non_managers_issue_no_verdicts() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    let review = f.open_review(review::Subject::SaleListing(filed.id)).await;

    let err = f
        .svc
        .execute(SubmitVerdict {
            initiator_id: f.file_agent,
            review_id: review.id,
            entity_status: transition::PairStatus::Approval(
                approval::Status::Accepted,
            ),
            condition: review::Condition::Closed,
            note: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        submit_verdict::ExecutionError::Forbidden { .. },
    ));
}

#[tokio::test]
async fn sale_suggestions_pair_both_ways() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    f.accept(review::Subject::SaleListing(filed.id)).await;

    let buyer = f
        .register_buyer(
            f.customer_agent,
            "09120000002",
            2_000,
            70,
            90,
            BTreeSet::from([f.sub1]),
        )
        .await;
    f.accept(review::Subject::Buyer(buyer.id)).await;

    let suggested = f
        .svc
        .execute(SuggestBuyers {
            initiator_id: f.file_agent,
            listing_code: filed.code.clone(),
        })
        .await
        .unwrap();
    assert_eq!(suggested.len(), 1);
    assert_eq!(suggested[0].node.id, buyer.id);
    assert_eq!(suggested[0].score.get(), 100);

    let listings = f
        .svc
        .execute(SuggestSaleListings {
            initiator_id: f.customer_agent,
            buyer_code: buyer.code.clone(),
        })
        .await
        .unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].node.id, filed.id);
}

#[tokio::test]
async fn convertible_rent_figures_collapse_into_one_equivalent() {
    let f = fixture().await;
    let filed = f.file_rent_listing(200, 30, true, 80).await;
    f.accept(review::Subject::RentListing(filed.id)).await;

    // totalEq(L) = 200 + 100·30/3 = 1200 (millions);
    // totalEq(R) = 500 + 100·20/3 ≈ 1166.67 — ratio ≈ 0.972.
    let renter = f.register_renter("09120000003", 500, 20, true).await;
    f.accept(review::Subject::Renter(renter.id)).await;

    let suggested = f
        .svc
        .execute(SuggestRenters {
            initiator_id: f.customer_agent,
            listing_code: filed.code.clone(),
        })
        .await
        .unwrap();
    assert_eq!(suggested.len(), 1);
    assert_eq!(suggested[0].node.id, renter.id);
    assert_eq!(suggested[0].score.get(), 70);
}

#[tokio::test]
async fn listing_outside_own_sub_district_is_rejected() {
    let f = fixture().await;

    let err = f
        .svc
        .execute(CreateSaleListing {
            initiator_id: f.file_agent,
            location: f.path2,
            address: listing::Address::new("Valiasr 12").unwrap(),
            announced_price: Price::new(millions(2_000)).unwrap(),
            floor_price: Price::new(millions(2_000)).unwrap(),
            rooms: listing::Rooms::new(2).unwrap(),
            area: listing::Area::new(80).unwrap(),
            age: listing::Age::new(5).unwrap(),
            features: listing::Features::default(),
            images: listing::Images::default(),
            video: None,
            title: listing::Title::new("misplaced").unwrap(),
            description: None,
            source: None,
            advertiser_id: f.advertiser,
        })
        .await
        .unwrap_err();

    match err.as_ref() {
        crate::command::create_sale_listing::ExecutionError::Validation(
            invalids,
        ) => {
            assert!(invalids.0.iter().any(|i| i.field == "sub_district"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn visit_refs_must_share_a_sub_district() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    f.accept(review::Subject::SaleListing(filed.id)).await;

    // Registered by the manager, since no sided agent of sub-district 1
    // may serve a customer interested elsewhere.
    let buyer = f
        .register_buyer(
            f.manager,
            "09120000004",
            2_000,
            70,
            90,
            BTreeSet::from([f.sub2, f.sub3]),
        )
        .await;
    f.accept(review::Subject::Buyer(buyer.id)).await;

    let err = f
        .svc
        .execute(ScheduleMeeting {
            initiator_id: f.customer_agent,
            class: meeting::Class::Visit,
            date: calendar::Date::today(),
            slot: meeting::Slot::Morning,
            refs: meeting::Refs::Sale {
                listing: filed.code.clone(),
                buyer: buyer.code.clone(),
            },
            description: None,
        })
        .await
        .unwrap_err();

    match err.as_ref() {
        crate::command::schedule_meeting::ExecutionError::Validation(
            invalids,
        ) => {
            let fields: Vec<_> =
                invalids.0.iter().map(|i| i.field).collect();
            assert!(fields.contains(&"listing_code"));
            assert!(fields.contains(&"customer_code"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn visit_walks_its_whole_lifecycle() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    f.accept(review::Subject::SaleListing(filed.id)).await;
    let buyer = f
        .register_buyer(
            f.customer_agent,
            "09120000005",
            2_000,
            70,
            90,
            BTreeSet::from([f.sub1]),
        )
        .await;
    f.accept(review::Subject::Buyer(buyer.id)).await;

    let visit = f
        .svc
        .execute(ScheduleMeeting {
            initiator_id: f.customer_agent,
            class: meeting::Class::Visit,
            date: calendar::Date::today(),
            slot: meeting::Slot::Morning,
            refs: meeting::Refs::Sale {
                listing: filed.code.clone(),
                buyer: buyer.code.clone(),
            },
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(visit.status, meeting::Status::Submitted);

    // Acceptance phase.
    let _ = f
        .issue_verdict(
            review::Subject::Meeting(visit.id),
            transition::PairStatus::Meeting(meeting::Status::Accepted),
        )
        .await;

    // Only the owner records a result.
    let err = f
        .svc
        .execute(CompleteMeeting {
            initiator_id: f.file_agent,
            meeting_id: visit.id,
            result: meeting::ResultText::new("went well").unwrap(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        crate::command::complete_meeting::ExecutionError::NotOwner(_),
    ));

    let done = f
        .svc
        .execute(CompleteMeeting {
            initiator_id: f.customer_agent,
            meeting_id: visit.id,
            result: meeting::ResultText::new("went well").unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(done.status, meeting::Status::Done);

    // Result phase: only `(ResultConfirmed, Closed)` is legal.
    let result_review =
        f.open_review(review::Subject::Meeting(visit.id)).await;
    assert_eq!(result_review.kind, review::Kind::VisitResult);

    let err = f
        .svc
        .execute(SubmitVerdict {
            initiator_id: f.manager,
            review_id: result_review.id,
            entity_status: transition::PairStatus::Meeting(
                meeting::Status::Done,
            ),
            condition: review::Condition::Closed,
            note: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        submit_verdict::ExecutionError::PairTransition(_),
    ));

    let _ = f
        .issue_verdict(
            review::Subject::Meeting(visit.id),
            transition::PairStatus::Meeting(
                meeting::Status::ResultConfirmed,
            ),
        )
        .await;

    let confirmed = f
        .svc
        .database()
        .execute(Select(By::<Option<Meeting>, _>::new(visit.id)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(confirmed.status, meeting::Status::ResultConfirmed);
    assert!(confirmed.result.is_some());
}

#[tokio::test]
async fn task_closure_moves_the_pair_together() {
    let f = fixture().await;

    let assigned = f
        .svc
        .execute(CreateTask {
            initiator_id: f.manager,
            title: task::Title::new("call the advertiser back").unwrap(),
            kind: task::Kind::FileSide,
            assignee_id: f.file_agent,
            deadline: calendar::Date::today(),
            listing: None,
            customer: None,
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(assigned.status, task::Status::Open);

    let delivered = f
        .svc
        .execute(DeliverTask {
            initiator_id: f.file_agent,
            task_id: assigned.id,
            result: meeting::ResultText::new("done and noted").unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(delivered.status, task::Status::Delivered);

    let review = f.open_review(review::Subject::Task(assigned.id)).await;
    assert_eq!(review.kind, review::Kind::TaskDelivery);

    // Closing the review alone is forbidden.
    let err = f
        .svc
        .execute(SubmitVerdict {
            initiator_id: f.manager,
            review_id: review.id,
            entity_status: transition::PairStatus::Task(
                task::Status::Delivered,
            ),
            condition: review::Condition::Closed,
            note: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        submit_verdict::ExecutionError::PairTransition(_),
    ));

    // `(Closed, Closed)` moves both halves atomically.
    let _ = f
        .issue_verdict(
            review::Subject::Task(assigned.id),
            transition::PairStatus::Task(task::Status::Closed),
        )
        .await;

    let closed = f
        .svc
        .database()
        .execute(Select(By::<Option<Task>, _>::new(assigned.id)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closed.status, task::Status::Closed);
}

#[tokio::test]
async fn double_toggle_is_identity_on_storage() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    let target = bookmark::Target::SaleListing(filed.id);

    let first = f
        .svc
        .execute(ToggleBookmark {
            initiator_id: f.file_agent,
            target,
        })
        .await
        .unwrap();
    assert_eq!(first, bookmark::Outcome::Marked);

    let stored = f
        .svc
        .database()
        .execute(Select(By::<Option<crate::domain::Bookmark>, _>::new((
            f.file_agent,
            target,
        ))))
        .await
        .unwrap();
    assert!(stored.is_some());

    let second = f
        .svc
        .execute(ToggleBookmark {
            initiator_id: f.file_agent,
            target,
        })
        .await
        .unwrap();
    assert_eq!(second, bookmark::Outcome::Unmarked);

    let stored = f
        .svc
        .database()
        .execute(Select(By::<Option<crate::domain::Bookmark>, _>::new((
            f.file_agent,
            target,
        ))))
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn codes_stay_unique_per_kind() {
    let f = fixture().await;

    let mut codes = BTreeSet::new();
    let mut url_ids = BTreeSet::new();
    for _ in 0..4 {
        let filed = f.file_sale_listing(2_000, 80).await;
        assert!(codes.insert(filed.code.to_string()));
        assert!(url_ids.insert(filed.url_id.to_string()));
    }
    assert_eq!(codes.len(), 4);
    assert_eq!(url_ids.len(), 4);
}

#[tokio::test]
async fn delete_requests_honor_territory() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    f.accept(review::Subject::SaleListing(filed.id)).await;

    // A file person of another sub-district holds no authority here.
    let outsider = f
        .svc
        .execute(CreateAgent {
            initiator_id: f.manager,
            username: agent::Username::new("file.two").unwrap(),
            display_name: display_name(),
            role: agent::Role::FilePerson,
            sub_district: f.sub2,
        })
        .await
        .unwrap();
    let err = f
        .svc
        .execute(RequestDeletion {
            initiator_id: outsider.id,
            target: crate::command::request_deletion::Target::SaleListing(
                filed.id,
            ),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        crate::command::request_deletion::ExecutionError::Territorial,
    ));

    f.svc
        .execute(RequestDeletion {
            initiator_id: f.file_agent,
            target: crate::command::request_deletion::Target::SaleListing(
                filed.id,
            ),
        })
        .await
        .unwrap();

    let flagged = f.sale_listing(filed.id).await;
    assert!(flagged.delete_requested);

    // Flagged listings disappear from non-manager feeds but stay visible
    // to the manager.
    let err = f
        .svc
        .execute(SuggestBuyers {
            initiator_id: f.file_agent,
            listing_code: filed.code.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        crate::query::suggestions::ExecutionError::ListingNotExists(_),
    ));

    let visible_to_manager = f
        .svc
        .execute(SuggestBuyers {
            initiator_id: f.manager,
            listing_code: filed.code.clone(),
        })
        .await;
    assert!(visible_to_manager.is_ok());
}

#[tokio::test]
async fn one_daily_report_per_day() {
    let f = fixture().await;
    let today = calendar::Date::today();

    let submitted = f
        .svc
        .execute(SubmitDailyReport {
            initiator_id: f.file_agent,
            date: today,
            content: report::Content::new("three viewings, one session")
                .unwrap(),
        })
        .await
        .unwrap();
    assert!(!submitted.closed);

    let err = f
        .svc
        .execute(SubmitDailyReport {
            initiator_id: f.file_agent,
            date: today,
            content: report::Content::new("again").unwrap(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        crate::command::submit_daily_report::ExecutionError::AlreadySubmitted(
            _,
        ),
    ));

    let grid = f
        .svc
        .execute(MonthActivity {
            agent_id: f.file_agent,
            year: today.year(),
            month: today.month(),
        })
        .await
        .unwrap();
    assert_eq!(
        grid.len(),
        usize::from(calendar::days_in_month(today.year(), today.month())),
    );
    for cell in &grid {
        assert_eq!(cell.submitted, cell.date == today);
    }
}

#[tokio::test]
async fn performance_window_counts_and_response_rate() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;

    let before = f
        .svc
        .execute(Performance {
            agent_id: f.file_agent,
            window_days: 7,
        })
        .await
        .unwrap();
    assert_eq!(before.tally.listings_created, 1);
    assert_eq!(before.tally.trades_closed, 0);
    assert_eq!(before.interactions.sent, 0);

    let sent = f
        .svc
        .execute(SendInteraction {
            initiator_id: f.file_agent,
            receiver_id: f.customer_agent,
            notification_id: None,
            targets: vec![notification::Target::SaleListing(filed.id)],
        })
        .await
        .unwrap();
    assert_eq!(sent.items.len(), 1);
    assert_eq!(sent.items[0].price, millions(2_000));

    let mid = f
        .svc
        .execute(Performance {
            agent_id: f.file_agent,
            window_days: 7,
        })
        .await
        .unwrap();
    assert_eq!(mid.interactions.sent, 1);
    assert_eq!(mid.interactions.viewed_or_responded, 0);
    assert_eq!(mid.response_rate, rust_decimal::Decimal::ZERO);

    f.svc
        .execute(ViewInteraction {
            initiator_id: f.customer_agent,
            interaction_id: sent.id,
        })
        .await
        .unwrap();

    let after = f
        .svc
        .execute(Performance {
            agent_id: f.file_agent,
            window_days: 7,
        })
        .await
        .unwrap();
    assert_eq!(after.interactions.viewed_or_responded, 1);
    assert_eq!(after.response_rate, rust_decimal::Decimal::ONE);
}

#[tokio::test]
async fn viewing_a_notification_resets_the_counter() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    f.accept(review::Subject::SaleListing(filed.id)).await;

    let unread = f
        .svc
        .execute(UnreadCount {
            agent_id: f.customer_agent,
        })
        .await
        .unwrap();
    assert_eq!(unread.get(), 1);

    f.svc
        .execute(ViewNotification {
            initiator_id: f.customer_agent,
            notification_id: notification::Id::from(1),
        })
        .await
        .unwrap();

    let unread = f
        .svc
        .execute(UnreadCount {
            agent_id: f.customer_agent,
        })
        .await
        .unwrap();
    assert_eq!(unread.get(), 0);
}

#[tokio::test]
async fn listing_pages_filter_and_paginate() {
    let f = fixture().await;
    for _ in 0..3 {
        let _ = f.file_sale_listing(2_000, 80).await;
    }

    let page = f
        .svc
        .database()
        .execute(Select(By::<read::listing::sale::Page, _>::new(
            common::pagination::Selector {
                arguments: common::pagination::Arguments::Forward {
                    first: 2,
                    after: None,
                    including: false,
                },
                filter: read::listing::sale::Filter {
                    sub_district: Some(f.sub1),
                    status: Some(approval::Status::Pending),
                    include_delete_requested: false,
                },
            },
        )))
        .await
        .unwrap();
    assert_eq!(page.edges.len(), 2);
    assert!(page.has_more);

    let rest = f
        .svc
        .database()
        .execute(Select(By::<read::listing::sale::Page, _>::new(
            common::pagination::Selector {
                arguments: common::pagination::Arguments::Forward {
                    first: 2,
                    after: Some(page.edges[1].cursor),
                    including: false,
                },
                filter: read::listing::sale::Filter::default(),
            },
        )))
        .await
        .unwrap();
    assert_eq!(rest.edges.len(), 1);
    assert!(!rest.has_more);
}

#[tokio::test]
async fn duplicate_customer_phone_is_a_conflict() {
    let f = fixture().await;
    let _ = f
        .register_buyer(
            f.customer_agent,
            "09120000006",
            2_000,
            70,
            90,
            BTreeSet::from([f.sub1]),
        )
        .await;

    let err = f
        .svc
        .execute(CreateBuyer {
            initiator_id: f.customer_agent,
            name: customer_name(),
            phone: crate::domain::Phone::new("09120000006").unwrap(),
            description: None,
            announced_budget: buyer::Budget::new(millions(2_000)).unwrap(),
            max_budget: buyer::Budget::new(millions(2_000)).unwrap(),
            funding: buyer::Funding::Cash,
            min_rooms: listing::Rooms::new(1).unwrap(),
            max_rooms: listing::Rooms::new(3).unwrap(),
            min_area: listing::Area::new(70).unwrap(),
            max_area: listing::Area::new(90).unwrap(),
            min_age: listing::Age::new(0).unwrap(),
            max_age: listing::Age::new(30).unwrap(),
            features: listing::Features::default(),
            home: f.path1,
            interested_sub_districts: BTreeSet::from([f.sub1]),
        })
        .await
        .unwrap_err();

    match err.as_ref() {
        crate::command::create_buyer::ExecutionError::Validation(invalids) => {
            assert!(invalids.0.iter().any(|i| i.field == "phone"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn duplicate_advertiser_phone_is_occupied() {
    let f = fixture().await;

    let err = f
        .svc
        .execute(CreateAdvertiser {
            initiator_id: f.file_agent,
            name: advertiser::Name::new(persian("\u{0633}\u{0639}\u{06CC}\u{062F}"))
                .unwrap(),
            phone: crate::domain::Phone::new("09120000001").unwrap(),
            description: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        crate::command::create_advertiser::ExecutionError::PhoneOccupied(_),
    ));

    let advertiser = f
        .svc
        .database()
        .execute(Select(By::<Option<Advertiser>, _>::new(f.advertiser)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(advertiser.status, approval::Status::Pending);
}

#[tokio::test]
async fn purge_cascades_over_references() {
    let f = fixture().await;
    let filed = f.file_sale_listing(2_000, 80).await;
    let _ = f
        .svc
        .execute(ToggleBookmark {
            initiator_id: f.file_agent,
            target: bookmark::Target::SaleListing(filed.id),
        })
        .await
        .unwrap();

    // Non-managers never hard-delete.
    let err = f
        .svc
        .execute(crate::command::PurgeEntity {
            initiator_id: f.file_agent,
            target: crate::command::request_deletion::Target::SaleListing(
                filed.id,
            ),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        crate::command::purge_entity::ExecutionError::Forbidden { .. },
    ));

    f.svc
        .execute(crate::command::PurgeEntity {
            initiator_id: f.manager,
            target: crate::command::request_deletion::Target::SaleListing(
                filed.id,
            ),
        })
        .await
        .unwrap();

    let gone = f
        .svc
        .database()
        .execute(Select(By::<Option<SaleListing>, _>::new(filed.id)))
        .await
        .unwrap();
    assert!(gone.is_none());

    let bookmark = f
        .svc
        .database()
        .execute(Select(By::<Option<crate::domain::Bookmark>, _>::new((
            f.file_agent,
            bookmark::Target::SaleListing(filed.id),
        ))))
        .await
        .unwrap();
    assert!(bookmark.is_none());

    let review = f
        .svc
        .database()
        .execute(Select(By::<Option<ReviewTask>, _>::new(
            review::Subject::SaleListing(filed.id),
        )))
        .await
        .unwrap();
    assert!(review.is_none());
}

#[tokio::test]
async fn manager_annotates_and_closes_daily_reports() {
    let f = fixture().await;
    let submitted = f
        .svc
        .execute(SubmitDailyReport {
            initiator_id: f.file_agent,
            date: calendar::Date::today(),
            content: report::Content::new("quiet day").unwrap(),
        })
        .await
        .unwrap();

    let reviewed = f
        .svc
        .execute(crate::command::ReviewDailyReport {
            initiator_id: f.manager,
            report_id: submitted.id,
            note: Some(
                meeting::ManagerNote::new("follow the open leads").unwrap(),
            ),
            close: true,
        })
        .await
        .unwrap();
    assert!(reviewed.closed);
    assert!(reviewed.manager_note.is_some());

    let err = f
        .svc
        .execute(crate::command::ReviewDailyReport {
            initiator_id: f.file_agent,
            report_id: submitted.id,
            note: None,
            close: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        crate::command::review_daily_report::ExecutionError::Forbidden { .. },
    ));
}
