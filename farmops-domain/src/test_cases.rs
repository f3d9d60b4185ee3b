use farmops_lifecycle::{Lifecycle, Status, TestCaseStatus, Tracked};
use farmops_store::{Outbox, Record, Snapshot};
use farmops_types::{Change, CommandError, CommandResult, EntityId, Services, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A manual test case for equipment or procedures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    pub status: TestCaseStatus,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl TestCase {
    /// A draft test case with zeroed timestamps; `create` stamps them.
    pub fn draft(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            steps: Vec::new(),
            status: TestCaseStatus::Draft,
            created_at: Timestamp::from_millis(0),
            last_updated: Timestamp::from_millis(0),
        }
    }

    pub fn with_steps(mut self, steps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Record for TestCase {
    const KIND: &'static str = "test_case";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Tracked for TestCase {
    type Status = TestCaseStatus;

    fn status(&self) -> TestCaseStatus {
        self.status
    }

    fn set_status(&mut self, status: TestCaseStatus) {
        self.status = status;
    }

    fn set_created(&mut self, at: Timestamp) {
        self.created_at = at;
        self.last_updated = at;
    }

    fn touch(&mut self, at: Timestamp) {
        self.last_updated = at;
    }
}

/// Test-case tracking: draft → active → pass/fail, with reruns.
pub struct TestCases {
    lifecycle: Lifecycle<TestCase>,
}

impl TestCases {
    pub fn new(services: Services) -> Self {
        Self {
            lifecycle: Lifecycle::with_services(services),
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle<TestCase> {
        &self.lifecycle
    }

    pub fn get(&self, id: &str) -> Option<&TestCase> {
        self.lifecycle.get(id)
    }

    pub fn list(&self) -> &[TestCase] {
        self.lifecycle.list()
    }

    pub fn snapshot(&self) -> Snapshot<TestCase> {
        self.lifecycle.snapshot()
    }

    /// Adds a draft test case under a generated id.
    pub fn add_test_case(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        steps: Vec<String>,
    ) -> CommandResult<EntityId> {
        let (title, description) = (title.into(), description.into());
        let (id, _) = self.lifecycle.create_with(|id| TestCase {
            steps,
            ..TestCase::draft(id, title).with_description(description)
        })?;
        Ok(id)
    }

    pub fn create(&mut self, test_case: TestCase) -> CommandResult<Snapshot<TestCase>> {
        self.lifecycle.create(test_case)
    }

    pub fn restore(&mut self, test_case: TestCase) -> CommandResult<Snapshot<TestCase>> {
        self.lifecycle.restore(test_case)
    }

    pub fn update(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<TestCase>> {
        self.lifecycle.update(id, patch)
    }

    pub fn remove(&mut self, id: &str) -> CommandResult<Snapshot<TestCase>> {
        self.lifecycle.remove(id)
    }

    pub fn transition(
        &mut self,
        id: &str,
        target: TestCaseStatus,
    ) -> CommandResult<Snapshot<TestCase>> {
        self.lifecycle.transition(id, target)
    }

    /// Moves a draft into the active set.
    pub fn activate(&mut self, id: &str) -> CommandResult<Snapshot<TestCase>> {
        self.lifecycle
            .transition_with(id, TestCaseStatus::Active, |test_case| {
                require_status(test_case, &[TestCaseStatus::Draft], TestCaseStatus::Active)
            })
    }

    /// Records the outcome of an active run.
    pub fn record_result(&mut self, id: &str, passed: bool) -> CommandResult<Snapshot<TestCase>> {
        let target = if passed {
            TestCaseStatus::Pass
        } else {
            TestCaseStatus::Fail
        };
        self.lifecycle.transition(id, target)
    }

    /// Reopens a finished test case for another run.
    pub fn rerun(&mut self, id: &str) -> CommandResult<Snapshot<TestCase>> {
        self.lifecycle
            .transition_with(id, TestCaseStatus::Active, |test_case| {
                require_status(
                    test_case,
                    &[TestCaseStatus::Pass, TestCaseStatus::Fail],
                    TestCaseStatus::Active,
                )
            })
    }

    pub fn count_by_status(&self) -> BTreeMap<TestCaseStatus, usize> {
        farmops_view::count_by_status(&self.lifecycle.snapshot())
    }

    /// Passed share of finished test cases, `None` while none has finished.
    pub fn pass_rate(&self) -> Option<f64> {
        farmops_view::share_in(
            &self.lifecycle.snapshot(),
            &[TestCaseStatus::Pass],
            &[TestCaseStatus::Pass, TestCaseStatus::Fail],
        )
    }
}

fn require_status(
    test_case: &TestCase,
    allowed: &[TestCaseStatus],
    target: TestCaseStatus,
) -> CommandResult<()> {
    if allowed.contains(&test_case.status) {
        return Ok(());
    }
    Err(CommandError::InvalidTransition {
        id: test_case.id.clone(),
        from: test_case.status.as_str().to_string(),
        to: target.as_str().to_string(),
    })
}

impl Outbox for TestCases {
    fn drain_changes(&mut self) -> Vec<Change> {
        self.lifecycle.drain_changes()
    }

    fn requeue_changes(&mut self, changes: Vec<Change>) {
        self.lifecycle.requeue_changes(changes);
    }

    fn pending_changes(&self) -> usize {
        self.lifecycle.pending_changes()
    }
}
