//! Integration tests for issue, violation, and CAF repositories.

use fleetgate_core::models::issue::{
    CreateIssue, IssueKind, IssuePriority, IssueStatus, RoadsideInspectionDetail,
};
use fleetgate_core::models::organization::CreateOrganization;
use fleetgate_core::models::violation::CreateViolation;
use fleetgate_core::repository::{
    CafRepository, IssueRepository, OrganizationRepository, Pagination, ViolationRepository,
};
use fleetgate_db::repository::{
    SurrealCafRepository, SurrealIssueRepository, SurrealOrganizationRepository,
    SurrealViolationRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();
    db
}

async fn create_org(
    db: &Surreal<surrealdb::engine::local::Db>,
) -> fleetgate_core::models::organization::Organization {
    SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Issues Inc".into(),
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

fn inspection_input(org: Uuid, party: Uuid, title: &str) -> CreateIssue {
    let detail = RoadsideInspectionDetail {
        report_number: "OH123456".into(),
        inspection_date: chrono::NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
        level: 2,
        state: Some("OH".into()),
    };
    CreateIssue {
        party_id: party,
        organization_id: org,
        kind: IssueKind::RoadsideInspection,
        priority: IssuePriority::High,
        title: title.into(),
        detail: Some(serde_json::to_value(detail).unwrap()),
        occurred_at: None,
    }
}

#[tokio::test]
async fn create_issue_round_trips_typed_detail() {
    let db = setup().await;
    let org = create_org(&db).await;
    let issue_repo = SurrealIssueRepository::new(db);

    let party = Uuid::new_v4();
    let issue = issue_repo
        .create(inspection_input(org.id, party, "Level 2 inspection"))
        .await
        .unwrap();

    assert_eq!(issue.kind, IssueKind::RoadsideInspection);
    assert_eq!(issue.status, IssueStatus::Open);

    let detail: RoadsideInspectionDetail = serde_json::from_value(issue.detail).unwrap();
    assert_eq!(detail.report_number, "OH123456");
    assert_eq!(detail.level, 2);
}

#[tokio::test]
async fn set_status_is_organization_scoped() {
    let db = setup().await;
    let org = create_org(&db).await;
    let issue_repo = SurrealIssueRepository::new(db);

    let issue = issue_repo
        .create(inspection_input(org.id, Uuid::new_v4(), "Scoped"))
        .await
        .unwrap();

    let updated = issue_repo
        .set_status(org.id, issue.id, IssueStatus::Closed)
        .await
        .unwrap();
    assert_eq!(updated.status, IssueStatus::Closed);

    let wrong_org = issue_repo
        .set_status(Uuid::new_v4(), issue.id, IssueStatus::Open)
        .await;
    assert!(wrong_org.is_err());
}

#[tokio::test]
async fn list_by_parties_filters_by_cohort_and_kind() {
    let db = setup().await;
    let org = create_org(&db).await;
    let issue_repo = SurrealIssueRepository::new(db);

    let driver = Uuid::new_v4();
    let outsider = Uuid::new_v4();

    issue_repo
        .create(inspection_input(org.id, driver, "In cohort"))
        .await
        .unwrap();
    issue_repo
        .create(CreateIssue {
            party_id: driver,
            organization_id: org.id,
            kind: IssueKind::Accident,
            priority: IssuePriority::Critical,
            title: "Tow-away".into(),
            detail: None,
            occurred_at: None,
        })
        .await
        .unwrap();
    issue_repo
        .create(inspection_input(org.id, outsider, "Not in cohort"))
        .await
        .unwrap();

    let cohort = [driver];

    let all = issue_repo
        .list_by_parties(&cohort, None, Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total, 2);

    let inspections = issue_repo
        .list_by_parties(&cohort, Some(IssueKind::RoadsideInspection), Pagination::default())
        .await
        .unwrap();
    assert_eq!(inspections.total, 1);
    assert_eq!(inspections.items[0].title, "In cohort");

    let empty = issue_repo
        .list_by_parties(&[], None, Pagination::default())
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
    assert!(empty.items.is_empty());
}

#[tokio::test]
async fn violations_attach_to_issue_in_code_order() {
    let db = setup().await;
    let org = create_org(&db).await;
    let issue_repo = SurrealIssueRepository::new(db.clone());
    let violation_repo = SurrealViolationRepository::new(db);

    let issue = issue_repo
        .create(inspection_input(org.id, Uuid::new_v4(), "Cited"))
        .await
        .unwrap();

    for (code, oos) in [("395.8(e)", false), ("393.9", true)] {
        violation_repo
            .create(CreateViolation {
                issue_id: issue.id,
                code: code.into(),
                description: "cited".into(),
                out_of_service: oos,
                severity_weight: Some(4),
                unit: Some(1),
            })
            .await
            .unwrap();
    }

    let violations = violation_repo.list_by_issue(issue.id).await.unwrap();
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].code, "393.9");
    assert!(violations[0].out_of_service);
    assert_eq!(violations[1].code, "395.8(e)");
}

#[tokio::test]
async fn caf_links_violations_and_is_discoverable_by_violation() {
    let db = setup().await;
    let org = create_org(&db).await;
    let issue_repo = SurrealIssueRepository::new(db.clone());
    let violation_repo = SurrealViolationRepository::new(db.clone());
    let caf_repo = SurrealCafRepository::new(db);

    let issue = issue_repo
        .create(inspection_input(org.id, Uuid::new_v4(), "Cited"))
        .await
        .unwrap();
    let violation = violation_repo
        .create(CreateViolation {
            issue_id: issue.id,
            code: "393.9".into(),
            description: "inoperative lamp".into(),
            out_of_service: false,
            severity_weight: Some(6),
            unit: Some(1),
        })
        .await
        .unwrap();

    let caf = caf_repo
        .create(fleetgate_core::models::caf::CreateCaf {
            organization_id: org.id,
            issue_id: issue.id,
            violation_ids: vec![violation.id],
            code: "393.9".into(),
            assigned_party_id: None,
            due_date: None,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(caf.status, fleetgate_core::models::caf::CafStatus::Draft);
    assert_eq!(caf.violation_ids, vec![violation.id]);

    let covering = caf_repo
        .find_covering_violation(violation.id)
        .await
        .unwrap();
    assert_eq!(covering.map(|c| c.id), Some(caf.id));

    let uncovered = caf_repo
        .find_covering_violation(Uuid::new_v4())
        .await
        .unwrap();
    assert!(uncovered.is_none());

    let listed = caf_repo
        .list_by_organization(org.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
}
