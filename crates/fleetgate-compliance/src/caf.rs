//! Corrective action form generation.
//!
//! Roadside inspections and accidents arrive with cited violations; the
//! back office turns those into corrective action forms, one per
//! regulation code. Violations already covered by an existing form are
//! skipped, so generation can be re-run safely after new citations are
//! keyed in.

use std::collections::BTreeMap;

use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::caf::{CorrectiveActionForm, CreateCaf};
use fleetgate_core::models::issue::IssueKind;
use fleetgate_core::models::violation::Violation;
use fleetgate_core::repository::{CafRepository, IssueRepository, ViolationRepository};
use uuid::Uuid;

use crate::error::ComplianceError;

/// Corrective action form service.
pub struct CafService<I, V, C> {
    issues: I,
    violations: V,
    cafs: C,
}

impl<I, V, C> CafService<I, V, C>
where
    I: IssueRepository,
    V: ViolationRepository,
    C: CafRepository,
{
    pub fn new(issues: I, violations: V, cafs: C) -> Self {
        Self {
            issues,
            violations,
            cafs,
        }
    }

    /// Generates forms for a roadside inspection's violations.
    pub async fn generate_from_inspection_violations(
        &self,
        organization_id: Uuid,
        issue_id: Uuid,
    ) -> FleetgateResult<Vec<CorrectiveActionForm>> {
        self.generate(organization_id, issue_id, IssueKind::RoadsideInspection)
            .await
    }

    /// Generates forms for an accident's violations.
    pub async fn generate_from_accident_violations(
        &self,
        organization_id: Uuid,
        issue_id: Uuid,
    ) -> FleetgateResult<Vec<CorrectiveActionForm>> {
        self.generate(organization_id, issue_id, IssueKind::Accident)
            .await
    }

    async fn generate(
        &self,
        organization_id: Uuid,
        issue_id: Uuid,
        expected_kind: IssueKind,
    ) -> FleetgateResult<Vec<CorrectiveActionForm>> {
        // 1. The issue must exist in this organization and be of the
        //    violation-bearing kind the caller asked about.
        let issue = self.issues.get_by_id(organization_id, issue_id).await?;
        if issue.kind != expected_kind {
            return Err(ComplianceError::WrongIssueKind {
                expected: expected_kind,
                actual: issue.kind,
            }
            .into());
        }

        // 2. Group the issue's violations by regulation code.
        let cited = self.violations.list_by_issue(issue_id).await?;
        let mut by_code: BTreeMap<String, Vec<Violation>> = BTreeMap::new();
        for violation in cited {
            by_code.entry(violation.code.clone()).or_default().push(violation);
        }

        // 3. One form per code, from the violations not already covered
        //    by an earlier form.
        let mut generated = Vec::new();
        for (code, group) in by_code {
            let mut uncovered = Vec::new();
            for violation in &group {
                if self
                    .cafs
                    .find_covering_violation(violation.id)
                    .await?
                    .is_none()
                {
                    uncovered.push(violation.id);
                }
            }
            if uncovered.is_empty() {
                continue;
            }

            let caf = self
                .cafs
                .create(CreateCaf {
                    organization_id,
                    issue_id,
                    violation_ids: uncovered,
                    code,
                    assigned_party_id: None,
                    due_date: None,
                    notes: None,
                })
                .await?;
            generated.push(caf);
        }

        Ok(generated)
    }
}
