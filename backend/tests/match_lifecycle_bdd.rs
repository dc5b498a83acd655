//! Behaviour tests for the match request lifecycle.
//!
//! Scenarios run the lifecycle service over the in-memory match store, so
//! they exercise every guard and cascade without a database. Steps stay
//! synchronous and drive async calls through a runtime owned by the world.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use cats_social::domain::ports::{CreateMatchRequest, MatchCommand, MatchQuery};
use cats_social::domain::{
    AuthenticatedUser, CatId, CatProfile, CatSex, DomainError, IssuerProfile, MatchId,
    MatchLifecycleService, MatchMessage, MatchRequestView, MatchStatus, UserId,
};
use cats_social::outbound::memory::InMemoryMatchStore;
use cats_social::test_support::{StepClock, fixture_timestamp};
use chrono::TimeDelta;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

struct MatchLifecycleWorld {
    runtime: Runtime,
    store: Arc<InMemoryMatchStore>,
    service: MatchLifecycleService<InMemoryMatchStore>,
    owners: RefCell<HashMap<String, AuthenticatedUser>>,
    cats: RefCell<HashMap<String, CatId>>,
    requests: RefCell<HashMap<(String, String), MatchId>>,
    last_result: RefCell<Option<Result<(), DomainError>>>,
    listing: RefCell<Option<Vec<MatchRequestView>>>,
}

impl MatchLifecycleWorld {
    fn new() -> Self {
        let store = Arc::new(InMemoryMatchStore::new());
        let clock = Arc::new(StepClock::stepping(
            fixture_timestamp(),
            TimeDelta::seconds(1),
        ));
        Self {
            runtime: Runtime::new().expect("create runtime"),
            service: MatchLifecycleService::new(Arc::clone(&store), clock),
            store,
            owners: RefCell::new(HashMap::new()),
            cats: RefCell::new(HashMap::new()),
            requests: RefCell::new(HashMap::new()),
            last_result: RefCell::new(None),
            listing: RefCell::new(None),
        }
    }

    fn owner(&self, name: &str) -> AuthenticatedUser {
        if let Some(user) = self.owners.borrow().get(name) {
            return user.clone();
        }
        let id = UserId::random();
        let email = format!("{name}@example.com");
        self.runtime.block_on(self.store.put_user(IssuerProfile {
            id,
            name: name.to_owned(),
            email: email.clone(),
            created_at: fixture_timestamp(),
        }));
        let user = AuthenticatedUser::new(id, email).expect("valid user");
        self.owners
            .borrow_mut()
            .insert(name.to_owned(), user.clone());
        user
    }

    fn cat(&self, name: &str) -> CatId {
        *self
            .cats
            .borrow()
            .get(name)
            .unwrap_or_else(|| panic!("unknown cat {name}"))
    }

    fn request(&self, requester: &str, candidate: &str) -> MatchId {
        *self
            .requests
            .borrow()
            .get(&(requester.to_owned(), candidate.to_owned()))
            .unwrap_or_else(|| panic!("no request from {requester} to {candidate}"))
    }

    fn add_cat(&self, owner: &str, sex: CatSex, name: &str) {
        let owner = self.owner(owner);
        let profile = CatProfile {
            id: CatId::random(),
            name: name.to_owned(),
            race: "Persian".to_owned(),
            sex,
            age_in_month: 24,
            description: format!("{name} naps all afternoon"),
            image_urls: vec![format!("https://img.example.com/{name}.jpg")],
            has_matched: false,
            created_at: fixture_timestamp(),
        };
        self.cats.borrow_mut().insert(name.to_owned(), profile.id);
        self.runtime
            .block_on(self.store.put_cat(*owner.id(), profile));
    }

    fn propose(&self, owner: &str, requester: &str, candidate: &str) -> Result<(), DomainError> {
        let user = self.owner(owner);
        let request = CreateMatchRequest {
            requester_cat: self.cat(requester),
            candidate_cat: self.cat(candidate),
            message: MatchMessage::new("shall we meet for tea?").expect("valid message"),
        };
        let created = self
            .runtime
            .block_on(self.service.create_match(&user, request))?;
        self.requests
            .borrow_mut()
            .insert((requester.to_owned(), candidate.to_owned()), created.id);
        Ok(())
    }

    fn record(&self, result: Result<(), DomainError>) {
        *self.last_result.borrow_mut() = Some(result);
    }

    fn status(&self, requester: &str, candidate: &str) -> Option<MatchStatus> {
        let id = self.request(requester, candidate);
        self.runtime
            .block_on(self.store.match_request(&id))
            .map(|request| request.status)
    }

    fn is_matched(&self, cat: &str) -> bool {
        self.runtime
            .block_on(self.store.cat(&self.cat(cat)))
            .expect("cat exists")
            .has_matched
    }
}

#[fixture]
fn world() -> MatchLifecycleWorld {
    MatchLifecycleWorld::new()
}

#[given("{owner} owns a {sex} cat named {cat}")]
fn owner_owns_a_cat(world: &MatchLifecycleWorld, owner: String, sex: String, cat: String) {
    let sex: CatSex = sex.parse().expect("known sex");
    world.add_cat(&owner, sex, &cat);
}

#[given("{owner} has proposed {requester} to {candidate}")]
fn owner_has_proposed(
    world: &MatchLifecycleWorld,
    owner: String,
    requester: String,
    candidate: String,
) {
    world
        .propose(&owner, &requester, &candidate)
        .expect("proposal accepted");
}

#[given("{owner} has rejected the request from {requester} to {candidate}")]
fn owner_has_rejected(
    world: &MatchLifecycleWorld,
    owner: String,
    requester: String,
    candidate: String,
) {
    let user = world.owner(&owner);
    let id = world.request(&requester, &candidate);
    world
        .runtime
        .block_on(world.service.reject_match(&user, id))
        .expect("rejection accepted");
}

#[when("{owner} proposes {requester} to {candidate}")]
fn owner_proposes(world: &MatchLifecycleWorld, owner: String, requester: String, candidate: String) {
    let result = world.propose(&owner, &requester, &candidate);
    world.record(result);
}

#[when("{owner} approves the request from {requester} to {candidate}")]
fn owner_approves(world: &MatchLifecycleWorld, owner: String, requester: String, candidate: String) {
    let user = world.owner(&owner);
    let id = world.request(&requester, &candidate);
    let result = world
        .runtime
        .block_on(world.service.approve_match(&user, id));
    world.record(result);
}

#[when("{owner} withdraws the request from {requester} to {candidate}")]
fn owner_withdraws(
    world: &MatchLifecycleWorld,
    owner: String,
    requester: String,
    candidate: String,
) {
    let user = world.owner(&owner);
    let id = world.request(&requester, &candidate);
    let result = world
        .runtime
        .block_on(world.service.withdraw_match(&user, id));
    world.record(result);
}

#[when("{owner} lists match requests")]
fn owner_lists(world: &MatchLifecycleWorld, owner: String) {
    let user = world.owner(&owner);
    let views = world
        .runtime
        .block_on(world.service.list_matches_for_user(&user))
        .expect("listing succeeds");
    *world.listing.borrow_mut() = Some(views);
}

#[then("the last operation succeeds")]
fn the_last_operation_succeeds(world: &MatchLifecycleWorld) {
    let last = world.last_result.borrow();
    let result = last.as_ref().expect("an operation ran");
    assert!(result.is_ok(), "unexpected failure: {result:?}");
}

#[then("the last operation fails with {code}")]
fn the_last_operation_fails_with(world: &MatchLifecycleWorld, code: String) {
    let last = world.last_result.borrow();
    let error = last
        .as_ref()
        .expect("an operation ran")
        .as_ref()
        .expect_err("operation should fail");
    let actual = serde_json::to_value(error.code()).expect("code serialises");
    assert_eq!(actual, code.as_str(), "unexpected error: {error:?}");
}

#[then("the request from {requester} to {candidate} is {status}")]
fn the_request_is(world: &MatchLifecycleWorld, requester: String, candidate: String, status: String) {
    let expected: MatchStatus = status.parse().expect("known status");
    assert_eq!(world.status(&requester, &candidate), Some(expected));
}

#[then("the request from {requester} to {candidate} no longer exists")]
fn the_request_no_longer_exists(world: &MatchLifecycleWorld, requester: String, candidate: String) {
    assert_eq!(world.status(&requester, &candidate), None);
}

#[then("{cat} is matched")]
fn cat_is_matched(world: &MatchLifecycleWorld, cat: String) {
    assert!(world.is_matched(&cat), "{cat} should be matched");
}

#[then("{cat} is not matched")]
fn cat_is_not_matched(world: &MatchLifecycleWorld, cat: String) {
    assert!(!world.is_matched(&cat), "{cat} should not be matched");
}

#[then("the listing shows {count} requests")]
fn the_listing_shows(world: &MatchLifecycleWorld, count: usize) {
    let listing = world.listing.borrow();
    assert_eq!(listing.as_ref().expect("listing ran").len(), count);
}

#[then("the newest listed request was issued by {name}")]
fn the_newest_listed_request_was_issued_by(world: &MatchLifecycleWorld, name: String) {
    let listing = world.listing.borrow();
    let newest = listing
        .as_ref()
        .and_then(|views| views.first())
        .expect("listing has entries");
    assert_eq!(newest.issued_by.name, name);
}

#[scenario(path = "tests/features/match_lifecycle.feature")]
fn match_lifecycle_scenarios(world: MatchLifecycleWorld) {
    drop(world);
}
