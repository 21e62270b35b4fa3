//! Integration tests for the authorization service against real
//! repositories on in-memory SurrealDB.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fleetgate_authz::{
    AuthzService, IntegrityContext, IntegrityReporter, Operation, PrincipalId, ResourceKind,
    StaticIdentity,
};
use fleetgate_authz::{AccessBasis, Decision, DenyReason};
use fleetgate_core::error::FleetgateError;
use fleetgate_core::models::location::CreateLocation;
use fleetgate_core::models::organization::CreateOrganization;
use fleetgate_core::models::person::CreatePerson;
use fleetgate_core::models::role::{CreateRole, RoleKind};
use fleetgate_core::repository::{
    ConsultantRepository, EquipmentRepository, LocationRepository, OrganizationRepository,
    PersonRepository, RoleRepository,
};
use fleetgate_db::repository::{
    SurrealEquipmentRepository, SurrealLocationRepository, SurrealOrganizationRepository,
    SurrealPartyRepository, SurrealPersonRepository, SurrealRoleRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Reporter that counts calls, for exactly-once assertions.
#[derive(Default)]
struct CountingReporter(AtomicUsize);

impl IntegrityReporter for CountingReporter {
    fn report(&self, _detail: &str, _context: &IntegrityContext) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

type Service = AuthzService<
    SurrealPartyRepository<Db>,
    SurrealRoleRepository<Db>,
    SurrealOrganizationRepository<Db>,
>;

/// Spin up in-memory DB, run migrations, build the service.
async fn setup() -> (Service, Arc<CountingReporter>, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();

    let reporter = Arc::new(CountingReporter::default());
    let service = AuthzService::new(
        SurrealPartyRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        SurrealOrganizationRepository::new(db.clone()),
        reporter.clone(),
    );
    (service, reporter, db)
}

async fn create_org(db: &Surreal<Db>, name: &str) -> fleetgate_core::models::organization::Organization {
    SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: name.into(),
            dot_number: None,
            mc_number: None,
            address: None,
            city: None,
            state: None,
            zip: None,
            phone: None,
            external_user_id: None,
        })
        .await
        .unwrap()
}

/// Seed a bare login party (no kind-defining sub-record).
async fn create_login_party(db: &Surreal<Db>, subject: &str) -> Uuid {
    let party_id = Uuid::new_v4();
    db.query(
        "CREATE type::record('party', $id) SET \
         external_user_id = $subject, status = 'Active'",
    )
    .bind(("id", party_id.to_string()))
    .bind(("subject", subject.to_string()))
    .await
    .unwrap()
    .check()
    .unwrap();
    party_id
}

async fn grant_role(
    db: &Surreal<Db>,
    party_id: Uuid,
    organization_id: Option<Uuid>,
    location_id: Option<Uuid>,
    kind: RoleKind,
) -> fleetgate_core::models::role::Role {
    SurrealRoleRepository::new(db.clone())
        .create(CreateRole {
            party_id,
            organization_id,
            location_id,
            kind,
            status: None,
            start_date: None,
            end_date: None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn master_role_bypasses_organization_scoping() {
    let (service, _, db) = setup().await;
    let org = create_org(&db, "Anywhere Inc").await;

    let party = create_login_party(&db, "auth0|root").await;
    grant_role(&db, party, None, None, RoleKind::Master).await;

    let scope = service
        .resolve_scope(&PrincipalId::new("auth0|root"))
        .await
        .unwrap();
    assert!(scope.is_master);

    // Any operation on any organization, granted or not.
    let decision = service.authorize(
        &scope,
        Operation::delete(ResourceKind::Organization),
        org.id,
        None,
    );
    assert_eq!(decision, Decision::Allowed(AccessBasis::Master));
}

#[tokio::test]
async fn direct_owner_is_master_without_a_role_row() {
    let (service, _, db) = setup().await;
    let org = create_org(&db, "Owned Freight").await;
    SurrealOrganizationRepository::new(db.clone())
        .claim(org.id, "auth0|u1")
        .await
        .unwrap();

    let scope = service
        .resolve_scope(&PrincipalId::new("auth0|u1"))
        .await
        .unwrap();

    assert!(scope.is_master);
    assert_eq!(scope.owned_organization_id, Some(org.id));

    let decision = service.authorize(&scope, Operation::view(ResourceKind::Driver), org.id, None);
    assert!(decision.is_allowed());
}

#[tokio::test]
async fn unknown_principal_resolves_to_empty_scope() {
    let (service, reporter, _db) = setup().await;

    let scope = service
        .resolve_scope(&PrincipalId::new("auth0|newcomer"))
        .await
        .unwrap();

    assert!(!scope.is_master);
    assert!(scope.owned_organization_id.is_none());
    assert!(scope.granted_organization_ids().is_empty());
    assert!(scope.is_empty());
    assert_eq!(reporter.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resolve_is_idempotent_without_writes() {
    let (service, _, db) = setup().await;
    let org = create_org(&db, "Stable Co").await;
    let party = create_login_party(&db, "auth0|steady").await;
    grant_role(&db, party, Some(org.id), None, RoleKind::Organization).await;

    let principal = PrincipalId::new("auth0|steady");
    let first = service.resolve_scope(&principal).await.unwrap();
    let second = service.resolve_scope(&principal).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn deactivating_a_role_removes_the_grant_on_next_resolve() {
    let (service, _, db) = setup().await;
    let org = create_org(&db, "Revoked Co").await;
    let party = create_login_party(&db, "auth0|leaver").await;
    let role = grant_role(&db, party, Some(org.id), None, RoleKind::Organization).await;

    let principal = PrincipalId::new("auth0|leaver");
    let before = service.resolve_scope(&principal).await.unwrap();
    assert!(before.granted_organization_ids().contains(&org.id));

    SurrealRoleRepository::new(db.clone())
        .deactivate(role.id)
        .await
        .unwrap();

    let after = service.resolve_scope(&principal).await.unwrap();
    assert!(!after.granted_organization_ids().contains(&org.id));
    assert!(after.is_empty());
}

#[tokio::test]
async fn duplicate_parties_union_their_roles() {
    let (service, _, db) = setup().await;

    // Two legacy party rows for one subject; only one carries the
    // master grant. Resolution must not drop it.
    let first = create_login_party(&db, "auth0|dup").await;
    let _second = create_login_party(&db, "auth0|dup").await;
    grant_role(&db, first, None, None, RoleKind::Master).await;

    let scope = service
        .resolve_scope(&PrincipalId::new("auth0|dup"))
        .await
        .unwrap();
    assert!(scope.is_master);
}

#[tokio::test]
async fn location_role_is_location_scoped_and_cannot_administer() {
    let (service, _, db) = setup().await;
    let org = create_org(&db, "Terminals Inc").await;

    let location = SurrealLocationRepository::new(db.clone())
        .create(CreateLocation {
            organization_id: org.id,
            name: "Columbus yard".into(),
            address: None,
            city: None,
            state: None,
            zip: None,
        })
        .await
        .unwrap();

    let driver = SurrealPersonRepository::new(db.clone())
        .create(CreatePerson {
            organization_id: org.id,
            location_id: Some(location.id),
            first_name: "Dana".into(),
            last_name: "Driver".into(),
            email: None,
            phone: None,
            date_of_birth: None,
            license_number: None,
            license_state: None,
            license_expiration: None,
            hire_date: None,
            external_user_id: None,
        })
        .await
        .unwrap();

    let party = create_login_party(&db, "auth0|u2").await;
    grant_role(&db, party, Some(org.id), Some(location.id), RoleKind::Location).await;

    let scope = service
        .resolve_scope(&PrincipalId::new("auth0|u2"))
        .await
        .unwrap();

    // Creating a peer location is out of the question.
    let create_location =
        service.authorize(&scope, Operation::create(ResourceKind::Location), org.id, None);
    assert_eq!(
        create_location,
        Decision::Denied(DenyReason::InvalidOperation)
    );

    // Viewing a driver at the granted location is fine.
    let view_local = service.authorize(
        &scope,
        Operation::view(ResourceKind::Driver),
        org.id,
        driver.location_id,
    );
    assert_eq!(
        view_local,
        Decision::Allowed(AccessBasis::Grant(RoleKind::Location))
    );

    // A driver at some other location is not.
    let view_remote = service.authorize(
        &scope,
        Operation::view(ResourceKind::Driver),
        org.id,
        Some(Uuid::new_v4()),
    );
    assert_eq!(view_remote, Decision::Denied(DenyReason::NotInScope));
}

#[tokio::test]
async fn role_to_missing_organization_denies_and_reports_once() {
    let (service, reporter, db) = setup().await;

    let party = create_login_party(&db, "auth0|orphaned").await;
    let ghost_org = Uuid::new_v4();
    grant_role(&db, party, Some(ghost_org), None, RoleKind::Organization).await;

    let scope = service
        .resolve_scope(&PrincipalId::new("auth0|orphaned"))
        .await
        .unwrap();

    // Exactly one report for the one missing organization.
    assert_eq!(reporter.0.load(Ordering::SeqCst), 1);
    assert!(!scope.granted_organization_ids().contains(&ghost_org));

    let decision =
        service.authorize(&scope, Operation::view(ResourceKind::Driver), ghost_org, None);
    assert_eq!(decision, Decision::Denied(DenyReason::IntegrityViolation));

    // The denial also surfaces through check() as an integrity error.
    let err = service
        .check(&scope, Operation::view(ResourceKind::Driver), ghost_org, None)
        .unwrap_err();
    assert!(matches!(err, FleetgateError::Integrity { .. }));
}

#[tokio::test]
async fn resolve_current_requires_a_principal() {
    let (service, _, _db) = setup().await;

    let err = service
        .resolve_current(&StaticIdentity::anonymous())
        .await
        .unwrap_err();
    assert!(matches!(err, FleetgateError::Unauthenticated));

    let authenticated = StaticIdentity::authenticated(PrincipalId::new("auth0|present"));
    let scope = service.resolve_current(&authenticated).await.unwrap();
    assert!(scope.is_empty());
}

#[tokio::test]
async fn cohort_contains_members_but_never_consultants() {
    let (service, _, db) = setup().await;
    let org = create_org(&db, "Cohort Freight").await;

    let driver = SurrealPersonRepository::new(db.clone())
        .create(CreatePerson {
            organization_id: org.id,
            location_id: None,
            first_name: "In".into(),
            last_name: "Cohort".into(),
            email: None,
            phone: None,
            date_of_birth: None,
            license_number: None,
            license_state: None,
            license_expiration: None,
            hire_date: None,
            external_user_id: None,
        })
        .await
        .unwrap();

    let truck = SurrealEquipmentRepository::new(db.clone())
        .create(fleetgate_core::models::equipment::CreateEquipment {
            organization_id: org.id,
            location_id: None,
            unit_number: "T-7".into(),
            vin: None,
            license_plate: None,
            plate_state: None,
            year: None,
            make: None,
            model: None,
        })
        .await
        .unwrap();

    let consultant = fleetgate_db::repository::SurrealConsultantRepository::new(db.clone())
        .create(fleetgate_core::models::consultant::CreateConsultant {
            name: "Jo Compliance".into(),
            company: None,
            email: None,
            phone: None,
            external_user_id: "auth0|jo".into(),
        })
        .await
        .unwrap();
    grant_role(&db, consultant.party_id, Some(org.id), None, RoleKind::Consultant).await;

    let cohort = service.expand_organization(org.id).await.unwrap();

    assert!(cohort.contains(org.party_id));
    assert!(cohort.contains(driver.party_id));
    assert!(cohort.contains(truck.party_id));
    assert!(!cohort.contains(consultant.party_id));
}

#[tokio::test]
async fn empty_organization_expands_to_its_own_party_only() {
    let (service, _, db) = setup().await;
    let org = create_org(&db, "Lonely LLC").await;

    let cohort = service.expand_organization(org.id).await.unwrap();
    assert_eq!(cohort.party_ids.len(), 1);
    assert!(cohort.contains(org.party_id));

    // A nonexistent organization is a NotFound, not an empty cohort.
    let missing = service.expand_organization(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(FleetgateError::NotFound { .. })));
}
