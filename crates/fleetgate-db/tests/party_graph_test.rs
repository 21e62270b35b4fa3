//! Integration tests for party, organization, person, and consultant
//! repositories using in-memory SurrealDB.

use fleetgate_core::error::FleetgateError;
use fleetgate_core::models::organization::CreateOrganization;
use fleetgate_core::models::party::{PartyKind, PartyStatus};
use fleetgate_core::models::person::CreatePerson;
use fleetgate_core::repository::{
    ConsultantRepository, OrganizationRepository, PartyRepository, PersonRepository,
};
use fleetgate_db::repository::{
    SurrealConsultantRepository, SurrealOrganizationRepository, SurrealPartyRepository,
    SurrealPersonRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();
    db
}

fn create_org_input(name: &str) -> CreateOrganization {
    CreateOrganization {
        name: name.into(),
        dot_number: Some("1234567".into()),
        mc_number: None,
        address: None,
        city: None,
        state: Some("OH".into()),
        zip: None,
        phone: None,
        external_user_id: None,
    }
}

fn create_person_input(org: uuid::Uuid, last_name: &str) -> CreatePerson {
    CreatePerson {
        organization_id: org,
        location_id: None,
        first_name: "Test".into(),
        last_name: last_name.into(),
        email: None,
        phone: None,
        date_of_birth: None,
        license_number: Some("D123456".into()),
        license_state: Some("OH".into()),
        license_expiration: None,
        hire_date: None,
        external_user_id: None,
    }
}

// -----------------------------------------------------------------------
// Organization tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_organization_creates_anchor_party() {
    let db = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let party_repo = SurrealPartyRepository::new(db);

    let org = org_repo.create(create_org_input("ACME Freight")).await.unwrap();
    assert_eq!(org.name, "ACME Freight");
    assert_eq!(org.dot_number.as_deref(), Some("1234567"));

    // The anchor party exists and is classified as an organization.
    let party = party_repo.get_by_id(org.party_id).await.unwrap();
    assert_eq!(party.status, PartyStatus::Active);
    assert_eq!(party.external_user_id, None);

    let kind = party_repo.kind_of(org.party_id).await.unwrap();
    assert_eq!(kind, Some(PartyKind::Organization));
}

#[tokio::test]
async fn claim_binds_anchor_party_once() {
    let db = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let party_repo = SurrealPartyRepository::new(db);

    let org = org_repo.create(create_org_input("Claimable")).await.unwrap();

    org_repo.claim(org.id, "auth0|owner").await.unwrap();

    let party = party_repo.get_by_id(org.party_id).await.unwrap();
    assert_eq!(party.external_user_id.as_deref(), Some("auth0|owner"));

    // Second claim must fail, even by the same principal.
    let second = org_repo.claim(org.id, "auth0|other").await;
    assert!(matches!(
        second,
        Err(FleetgateError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn find_owned_by_principal_resolves_claimed_organization() {
    let db = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db);

    let org = org_repo.create(create_org_input("Owned Co")).await.unwrap();
    org_repo.claim(org.id, "auth0|u1").await.unwrap();

    let owned = org_repo.find_owned_by_principal("auth0|u1").await.unwrap();
    assert_eq!(owned.map(|o| o.id), Some(org.id));

    let none = org_repo.find_owned_by_principal("auth0|stranger").await.unwrap();
    assert!(none.is_none());
}

// -----------------------------------------------------------------------
// Person tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_person_creates_party_and_membership_role() {
    let db = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let person_repo = SurrealPersonRepository::new(db.clone());
    let party_repo = SurrealPartyRepository::new(db);

    let org = org_repo.create(create_org_input("Hauler")).await.unwrap();
    let person = person_repo
        .create(create_person_input(org.id, "Driver"))
        .await
        .unwrap();

    assert_eq!(person.organization_id, org.id);
    assert_eq!(person.last_name, "Driver");

    let kind = party_repo.kind_of(person.party_id).await.unwrap();
    assert_eq!(kind, Some(PartyKind::Person));

    let fetched = person_repo.get_by_id(org.id, person.id).await.unwrap();
    assert_eq!(fetched.id, person.id);

    // Organization-scoped get must not leak across tenants.
    let other_org = org_repo.create(create_org_input("Other")).await.unwrap();
    let cross = person_repo.get_by_id(other_org.id, person.id).await;
    assert!(matches!(cross, Err(FleetgateError::NotFound { .. })));
}

#[tokio::test]
async fn second_person_party_for_same_principal_is_rejected() {
    let db = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let person_repo = SurrealPersonRepository::new(db);

    let org = org_repo.create(create_org_input("Hauler")).await.unwrap();

    let mut first = create_person_input(org.id, "Smith");
    first.external_user_id = Some("auth0|smith".into());
    person_repo.create(first).await.unwrap();

    let mut second = create_person_input(org.id, "Smith Again");
    second.external_user_id = Some("auth0|smith".into());
    let result = person_repo.create(second).await;
    assert!(matches!(
        result,
        Err(FleetgateError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn find_by_principal_returns_every_party_for_subject() {
    let db = setup().await;
    let party_repo = SurrealPartyRepository::new(db.clone());

    // Legacy data contains duplicate parties per subject. The
    // repository can no longer create them, so seed them raw.
    db.query(
        "CREATE party:`11111111-1111-1111-1111-111111111111` SET \
         external_user_id = 'auth0|dup', status = 'Active'; \
         CREATE party:`22222222-2222-2222-2222-222222222222` SET \
         external_user_id = 'auth0|dup', status = 'Active';",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let parties = party_repo.find_by_principal("auth0|dup").await.unwrap();
    assert_eq!(parties.len(), 2);
}

// -----------------------------------------------------------------------
// Consultant tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn consultant_create_and_find_by_principal() {
    let db = setup().await;
    let consultant_repo = SurrealConsultantRepository::new(db);

    let consultant = consultant_repo
        .create(fleetgate_core::models::consultant::CreateConsultant {
            name: "Jo Compliance".into(),
            company: Some("SafetyFirst LLC".into()),
            email: None,
            phone: None,
            external_user_id: "auth0|jo".into(),
        })
        .await
        .unwrap();

    let found = consultant_repo.find_by_principal("auth0|jo").await.unwrap();
    assert_eq!(found.map(|c| c.id), Some(consultant.id));

    // One consultant-party per subject.
    let duplicate = consultant_repo
        .create(fleetgate_core::models::consultant::CreateConsultant {
            name: "Jo Again".into(),
            company: None,
            email: None,
            phone: None,
            external_user_id: "auth0|jo".into(),
        })
        .await;
    assert!(matches!(
        duplicate,
        Err(FleetgateError::AlreadyExists { .. })
    ));
}
