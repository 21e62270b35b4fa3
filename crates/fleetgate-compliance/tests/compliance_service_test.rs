//! Integration tests for CAF generation and organization-scoped
//! listings against in-memory SurrealDB.

use std::sync::Arc;

use fleetgate_authz::{AuthzService, PrincipalId, TracingReporter};
use fleetgate_compliance::{CafService, ComplianceListing};
use fleetgate_core::error::FleetgateError;
use fleetgate_core::models::issue::{CreateIssue, IssueKind, IssuePriority};
use fleetgate_core::models::organization::CreateOrganization;
use fleetgate_core::models::person::CreatePerson;
use fleetgate_core::models::role::{CreateRole, RoleKind};
use fleetgate_core::models::violation::CreateViolation;
use fleetgate_core::repository::{
    IssueRepository, OrganizationRepository, Pagination, PersonRepository, RoleRepository,
    ViolationRepository,
};
use fleetgate_db::repository::{
    SurrealCafRepository, SurrealIssueRepository, SurrealOrganizationRepository,
    SurrealPartyRepository, SurrealPersonRepository, SurrealRoleRepository,
    SurrealViolationRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();
    db
}

fn caf_service(
    db: &Surreal<Db>,
) -> CafService<SurrealIssueRepository<Db>, SurrealViolationRepository<Db>, SurrealCafRepository<Db>>
{
    CafService::new(
        SurrealIssueRepository::new(db.clone()),
        SurrealViolationRepository::new(db.clone()),
        SurrealCafRepository::new(db.clone()),
    )
}

fn authz_service(
    db: &Surreal<Db>,
) -> AuthzService<
    SurrealPartyRepository<Db>,
    SurrealRoleRepository<Db>,
    SurrealOrganizationRepository<Db>,
> {
    AuthzService::new(
        SurrealPartyRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        SurrealOrganizationRepository::new(db.clone()),
        Arc::new(TracingReporter),
    )
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

async fn create_issue(
    db: &Surreal<Db>,
    org: Uuid,
    party: Uuid,
    kind: IssueKind,
) -> fleetgate_core::models::issue::Issue {
    SurrealIssueRepository::new(db.clone())
        .create(CreateIssue {
            party_id: party,
            organization_id: org,
            kind,
            priority: IssuePriority::High,
            title: "cited".into(),
            detail: None,
            occurred_at: None,
        })
        .await
        .unwrap()
}

async fn cite(db: &Surreal<Db>, issue: Uuid, code: &str) -> fleetgate_core::models::violation::Violation {
    SurrealViolationRepository::new(db.clone())
        .create(CreateViolation {
            issue_id: issue,
            code: code.into(),
            description: "cited".into(),
            out_of_service: false,
            severity_weight: Some(4),
            unit: Some(1),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn generates_one_caf_per_regulation_code() {
    let db = setup().await;
    let org = create_org(&db, "Cited Carrier").await;
    let issue = create_issue(&db, org.id, Uuid::new_v4(), IssueKind::RoadsideInspection).await;

    // Three citations across two codes.
    let lamp_a = cite(&db, issue.id, "393.9").await;
    let lamp_b = cite(&db, issue.id, "393.9").await;
    let logs = cite(&db, issue.id, "395.8(e)").await;

    let service = caf_service(&db);
    let generated = service
        .generate_from_inspection_violations(org.id, issue.id)
        .await
        .unwrap();

    assert_eq!(generated.len(), 2);

    let lamp_caf = generated.iter().find(|c| c.code == "393.9").unwrap();
    assert_eq!(lamp_caf.violation_ids.len(), 2);
    assert!(lamp_caf.violation_ids.contains(&lamp_a.id));
    assert!(lamp_caf.violation_ids.contains(&lamp_b.id));

    let logs_caf = generated.iter().find(|c| c.code == "395.8(e)").unwrap();
    assert_eq!(logs_caf.violation_ids, vec![logs.id]);
}

#[tokio::test]
async fn regeneration_skips_covered_violations() {
    let db = setup().await;
    let org = create_org(&db, "Rerun Carrier").await;
    let issue = create_issue(&db, org.id, Uuid::new_v4(), IssueKind::RoadsideInspection).await;
    cite(&db, issue.id, "393.9").await;

    let service = caf_service(&db);
    let first = service
        .generate_from_inspection_violations(org.id, issue.id)
        .await
        .unwrap();
    assert_eq!(first.len(), 1);

    // Nothing new to cover on the second run.
    let second = service
        .generate_from_inspection_violations(org.id, issue.id)
        .await
        .unwrap();
    assert!(second.is_empty());

    // A citation keyed in later gets its own form.
    cite(&db, issue.id, "396.3(a)(1)").await;
    let third = service
        .generate_from_inspection_violations(org.id, issue.id)
        .await
        .unwrap();
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].code, "396.3(a)(1)");
}

#[tokio::test]
async fn generation_rejects_wrong_issue_kind() {
    let db = setup().await;
    let org = create_org(&db, "Mistyped").await;
    let accident = create_issue(&db, org.id, Uuid::new_v4(), IssueKind::Accident).await;

    let service = caf_service(&db);

    let err = service
        .generate_from_inspection_violations(org.id, accident.id)
        .await
        .unwrap_err();
    assert!(matches!(err, FleetgateError::Validation { .. }));

    // The accident entry point accepts it.
    cite(&db, accident.id, "392.2").await;
    let generated = service
        .generate_from_accident_violations(org.id, accident.id)
        .await
        .unwrap();
    assert_eq!(generated.len(), 1);
}

#[tokio::test]
async fn listing_scopes_to_organization_cohort() {
    let db = setup().await;
    let org = create_org(&db, "Listed Carrier").await;
    let other = create_org(&db, "Other Carrier").await;

    let driver = SurrealPersonRepository::new(db.clone())
        .create(CreatePerson {
            organization_id: org.id,
            location_id: None,
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
    let stranger = SurrealPersonRepository::new(db.clone())
        .create(CreatePerson {
            organization_id: other.id,
            location_id: None,
            first_name: "Far".into(),
            last_name: "Away".into(),
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

    create_issue(&db, org.id, driver.party_id, IssueKind::RoadsideInspection).await;
    create_issue(&db, other.id, stranger.party_id, IssueKind::RoadsideInspection).await;

    // An org-kind grant for the caller.
    let caller_party = Uuid::new_v4();
    db.query(
        "CREATE type::record('party', $id) SET \
         external_user_id = 'auth0|staffer', status = 'Active'",
    )
    .bind(("id", caller_party.to_string()))
    .await
    .unwrap()
    .check()
    .unwrap();
    SurrealRoleRepository::new(db.clone())
        .create(CreateRole {
            party_id: caller_party,
            organization_id: Some(org.id),
            location_id: None,
            kind: RoleKind::Organization,
            status: None,
            start_date: None,
            end_date: None,
        })
        .await
        .unwrap();

    let authz = authz_service(&db);
    let scope = authz
        .resolve_scope(&PrincipalId::new("auth0|staffer"))
        .await
        .unwrap();

    let listing = ComplianceListing::new(authz_service(&db), SurrealIssueRepository::new(db.clone()));

    let inspections = listing
        .list_inspections(&scope, org.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(inspections.total, 1);
    assert_eq!(inspections.items[0].party_id, driver.party_id);

    // The caller has no grant on the other organization.
    let denied = listing
        .list_inspections(&scope, other.id, Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(denied, FleetgateError::AccessDenied { .. }));
}
