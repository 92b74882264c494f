//! Worker pipeline tests.
//!
//! Drives the full worker loop against in-memory collaborators and
//! verifies the pipeline's contract: idempotent duplicate handling,
//! the retry ceiling, validation short-circuits, digest wiring, and
//! content-pin caching across retries.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use civicledger::digest;
use civicledger::ledger::{
    AssignComplaintCall, InclusionReceipt, LedgerClient, LedgerError, LedgerResult,
    RegisterComplaintCall, RegisterUserCall, RejectionReason, ResolveComplaintCall,
    UpdateStatusCall,
};
use civicledger::models::{
    ComplaintRecord, Location, Task, TaskOutcome, TaskPayload, TaskStatus, UserRecord,
};
use civicledger::pinner::{ContentPinner, PinError};
use civicledger::queue::{
    PoppedTask, QueueResult, TaskQueue, COMPLAINT_QUEUE, DEAD_LETTER_QUEUE, USER_QUEUE,
};
use civicledger::results::{ResultStore, ResultStoreResult};
use civicledger::worker::{Worker, WorkerConfig};

// ---------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------

#[derive(Default)]
struct MemoryQueue {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
}

#[async_trait]
impl TaskQueue for MemoryQueue {
    async fn push(&self, queue: &str, raw: &str) -> QueueResult<()> {
        self.lists
            .lock()
            .unwrap()
            .entry(queue.to_string())
            .or_default()
            .push_back(raw.to_string());
        Ok(())
    }

    async fn pop_any(
        &self,
        queues: &[&str],
        _timeout: Duration,
    ) -> QueueResult<Option<PoppedTask>> {
        let mut lists = self.lists.lock().unwrap();
        for &queue in queues {
            if let Some(raw) = lists.get_mut(queue).and_then(VecDeque::pop_front) {
                return Ok(Some(PoppedTask {
                    queue: queue.to_string(),
                    raw,
                }));
            }
        }
        Ok(None)
    }
}

#[derive(Default)]
struct RecordingPinner {
    pins: Mutex<Vec<String>>,
}

impl RecordingPinner {
    fn pin_count(&self) -> usize {
        self.pins.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentPinner for RecordingPinner {
    async fn pin(&self, bytes: Vec<u8>, _filename: &str) -> Result<String, PinError> {
        let mut pins = self.pins.lock().unwrap();
        pins.push(String::from_utf8(bytes).unwrap());
        Ok(format!("QmTest{}", pins.len()))
    }
}

#[derive(Default)]
struct MockLedger {
    users: Mutex<HashMap<String, RegisterUserCall>>,
    complaints: Mutex<HashMap<String, RegisterComplaintCall>>,
    status_calls: Mutex<Vec<UpdateStatusCall>>,
    assignments: Mutex<HashMap<String, AssignComplaintCall>>,
    resolutions: Mutex<HashMap<String, ResolveComplaintCall>>,
    call_order: Mutex<Vec<&'static str>>,
    forced_transient_failures: Mutex<usize>,
    attempts: AtomicUsize,
}

impl MockLedger {
    fn failing_times(times: usize) -> Self {
        Self {
            forced_transient_failures: Mutex::new(times),
            ..Self::default()
        }
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn take_forced_failure(&self) -> bool {
        let mut remaining = self.forced_transient_failures.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }

    fn receipt(&self) -> InclusionReceipt {
        InclusionReceipt {
            tx_hash: format!("0x{:04x}", self.attempts()),
            block_number: self.attempts() as u64,
        }
    }

    fn begin_call(&self, kind: &'static str) -> Result<(), LedgerError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.call_order.lock().unwrap().push(kind);
        if self.take_forced_failure() {
            Err(LedgerError::Transient("ledger node unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn register_user(&self, call: &RegisterUserCall) -> LedgerResult {
        self.begin_call("user")?;
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&call.id) {
            return Err(LedgerError::Rejected(RejectionReason::AlreadyExists));
        }
        users.insert(call.id.clone(), call.clone());
        Ok(self.receipt())
    }

    async fn register_complaint(&self, call: &RegisterComplaintCall) -> LedgerResult {
        self.begin_call("complaint")?;
        let mut complaints = self.complaints.lock().unwrap();
        if complaints.contains_key(&call.id) {
            return Err(LedgerError::Rejected(RejectionReason::AlreadyExists));
        }
        complaints.insert(call.id.clone(), call.clone());
        Ok(self.receipt())
    }

    async fn update_status(&self, call: &UpdateStatusCall) -> LedgerResult {
        self.begin_call("status")?;
        if !self.complaints.lock().unwrap().contains_key(&call.complaint_id) {
            return Err(LedgerError::Rejected(RejectionReason::NotFound));
        }
        self.status_calls.lock().unwrap().push(call.clone());
        Ok(self.receipt())
    }

    async fn assign_complaint(&self, call: &AssignComplaintCall) -> LedgerResult {
        self.begin_call("assign")?;
        if !self.complaints.lock().unwrap().contains_key(&call.complaint_id) {
            return Err(LedgerError::Rejected(RejectionReason::NotFound));
        }
        let mut assignments = self.assignments.lock().unwrap();
        if assignments.contains_key(&call.complaint_id) {
            return Err(LedgerError::Rejected(RejectionReason::AlreadyExists));
        }
        assignments.insert(call.complaint_id.clone(), call.clone());
        Ok(self.receipt())
    }

    async fn resolve_complaint(&self, call: &ResolveComplaintCall) -> LedgerResult {
        self.begin_call("resolve")?;
        if !self.complaints.lock().unwrap().contains_key(&call.complaint_id) {
            return Err(LedgerError::Rejected(RejectionReason::NotFound));
        }
        let mut resolutions = self.resolutions.lock().unwrap();
        if resolutions.contains_key(&call.complaint_id) {
            return Err(LedgerError::Rejected(RejectionReason::AlreadyExists));
        }
        resolutions.insert(call.complaint_id.clone(), call.clone());
        Ok(self.receipt())
    }
}

#[derive(Default)]
struct MemoryResults {
    outcomes: Mutex<HashMap<String, TaskOutcome>>,
    content_ids: Mutex<HashMap<String, String>>,
    assigned_ids: Mutex<HashMap<String, String>>,
    records: Mutex<HashMap<String, (String, String)>>,
}

impl MemoryResults {
    fn outcome(&self, task_id: &str) -> Option<TaskOutcome> {
        self.outcomes.lock().unwrap().get(task_id).cloned()
    }
}

#[async_trait]
impl ResultStore for MemoryResults {
    async fn set_result(&self, outcome: &TaskOutcome, _ttl: Duration) -> ResultStoreResult<()> {
        self.outcomes
            .lock()
            .unwrap()
            .insert(outcome.task_id.clone(), outcome.clone());
        Ok(())
    }

    async fn get_result(&self, task_id: &str) -> ResultStoreResult<Option<TaskOutcome>> {
        Ok(self.outcomes.lock().unwrap().get(task_id).cloned())
    }

    async fn cache_content_id(&self, task_id: &str, content_id: &str) -> ResultStoreResult<()> {
        self.content_ids
            .lock()
            .unwrap()
            .insert(task_id.to_string(), content_id.to_string());
        Ok(())
    }

    async fn cached_content_id(&self, task_id: &str) -> ResultStoreResult<Option<String>> {
        Ok(self.content_ids.lock().unwrap().get(task_id).cloned())
    }

    async fn cache_assigned_id(&self, task_id: &str, assigned_id: &str) -> ResultStoreResult<()> {
        self.assigned_ids
            .lock()
            .unwrap()
            .insert(task_id.to_string(), assigned_id.to_string());
        Ok(())
    }

    async fn cached_assigned_id(&self, task_id: &str) -> ResultStoreResult<Option<String>> {
        Ok(self.assigned_ids.lock().unwrap().get(task_id).cloned())
    }

    async fn store_record(
        &self,
        kind: &str,
        record_id: &str,
        json: &str,
        content_id: &str,
    ) -> ResultStoreResult<()> {
        self.records.lock().unwrap().insert(
            format!("{}:{}", kind, record_id),
            (json.to_string(), content_id.to_string()),
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------

struct Harness {
    worker: Worker,
    queue: Arc<MemoryQueue>,
    pinner: Arc<RecordingPinner>,
    ledger: Arc<MockLedger>,
    results: Arc<MemoryResults>,
}

fn harness_with_ledger(ledger: MockLedger) -> Harness {
    let queue = Arc::new(MemoryQueue::default());
    let pinner = Arc::new(RecordingPinner::default());
    let ledger = Arc::new(ledger);
    let results = Arc::new(MemoryResults::default());

    let worker = Worker::new(
        queue.clone(),
        pinner.clone(),
        ledger.clone(),
        results.clone(),
        WorkerConfig {
            poll_interval: Duration::from_millis(10),
            result_ttl: Duration::from_secs(60),
            default_state: "Jharkhand".to_string(),
        },
    );

    Harness {
        worker,
        queue,
        pinner,
        ledger,
        results,
    }
}

fn harness() -> Harness {
    harness_with_ledger(MockLedger::default())
}

impl Harness {
    async fn enqueue(&self, queue: &str, task: &Task) {
        let raw = serde_json::to_string(task).unwrap();
        self.queue.push(queue, &raw).await.unwrap();
    }

    /// Process tasks (including re-enqueued retries) until the queues
    /// drain.
    async fn drain(&self) {
        while self.worker.poll_once().await.unwrap() {}
    }

    /// Register a complaint under a producer-assigned id so lifecycle
    /// tasks have something to write against.
    async fn register_complaint(&self, complaint_id: &str) {
        let mut record = ward5_complaint();
        record.id = Some(complaint_id.to_string());
        let task = complaint_task(&format!("T-SEED-{}", complaint_id), record);
        self.enqueue(COMPLAINT_QUEUE, &task).await;
        self.drain().await;
    }
}

fn ranchi_location() -> Location {
    Location {
        pin: "834001".to_string(),
        district: "Ranchi".to_string(),
        city: "Ranchi".to_string(),
        locality: None,
        municipal: None,
        state: Some("Jharkhand".to_string()),
    }
}

fn ward5_complaint() -> ComplaintRecord {
    ComplaintRecord {
        id: None,
        category_id: Some("C-WATER".to_string()),
        sub_category: "Water Supply".to_string(),
        description: Some("No water supply in Ward 5".to_string()),
        urgency: None,
        attachment_url: None,
        assigned_department: "PHE".to_string(),
        is_public: true,
        location: Some(ranchi_location()),
        user_id: Some("U1".to_string()),
        submission_date: Some(Utc::now()),
    }
}

fn complaint_task(task_id: &str, record: ComplaintRecord) -> Task {
    Task {
        id: task_id.to_string(),
        payload: TaskPayload::ComplaintRegistration(record),
        retry_count: 0,
        created_at: Utc::now(),
    }
}

fn user_task(task_id: &str, record: UserRecord) -> Task {
    Task {
        id: task_id.to_string(),
        payload: TaskPayload::UserRegistration(record),
        retry_count: 0,
        created_at: Utc::now(),
    }
}

fn sample_user(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        email: "citizen@example.com".to_string(),
        phone_number: None,
        name: "Test Citizen".to_string(),
        national_id: None,
        date_of_creation: None,
        location: Location {
            municipal: Some("RMC".to_string()),
            ..ranchi_location()
        },
    }
}

// ---------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_complaint_scenario() {
    let h = harness();
    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-E2E", ward5_complaint()))
        .await;
    h.drain().await;

    // One content pin, one ledger submission.
    assert_eq!(h.pinner.pin_count(), 1);
    let complaints = h.ledger.complaints.lock().unwrap();
    assert_eq!(complaints.len(), 1);

    let call = complaints.values().next().unwrap();
    assert_eq!(
        call.description_digest,
        digest::description_digest("No water supply in Ward 5")
    );
    assert_eq!(call.attachment_digest, digest::ZERO_DIGEST);
    assert_eq!(
        call.location_digest,
        digest::complaint_location_digest(&ranchi_location(), "Jharkhand")
    );
    assert_eq!(call.urgency, 2); // absent urgency defaults to MEDIUM
    assert_eq!(call.user_id, "U1");
    assert_eq!(call.category_id, "C-WATER");
    assert!(call.id.starts_with("COMP-"));

    let outcome = h.results.outcome("T-E2E").unwrap();
    assert_eq!(outcome.status, TaskStatus::Success);
    assert!(!outcome.content_id.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_complaint_id_resolves_as_success() {
    let h = harness();
    let mut record = ward5_complaint();
    record.id = Some("COMP-7".to_string());

    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-A", record.clone()))
        .await;
    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-B", record)).await;
    h.drain().await;

    // Exactly one ledger-visible record, both tasks SUCCESS.
    assert_eq!(h.ledger.complaints.lock().unwrap().len(), 1);
    assert_eq!(h.results.outcome("T-A").unwrap().status, TaskStatus::Success);
    assert_eq!(h.results.outcome("T-B").unwrap().status, TaskStatus::Success);
}

#[tokio::test]
async fn retry_ceiling_records_failure_after_four_attempts() {
    let h = harness_with_ledger(MockLedger::failing_times(usize::MAX));
    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-RETRY", ward5_complaint()))
        .await;
    h.drain().await;

    // Initial attempt + 3 retries.
    assert_eq!(h.ledger.attempts(), 4);

    let outcome = h.results.outcome("T-RETRY").unwrap();
    assert_eq!(outcome.status, TaskStatus::Failed);
    assert!(!outcome.error_message.unwrap().is_empty());

    // The content id was cached on the first attempt; retries reuse it.
    assert_eq!(h.pinner.pin_count(), 1);
}

#[tokio::test]
async fn transient_failure_then_success_pins_once() {
    let h = harness_with_ledger(MockLedger::failing_times(2));
    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-FLAKY", ward5_complaint()))
        .await;
    h.drain().await;

    assert_eq!(h.ledger.attempts(), 3);
    assert_eq!(h.pinner.pin_count(), 1);

    let outcome = h.results.outcome("T-FLAKY").unwrap();
    assert_eq!(outcome.status, TaskStatus::Success);

    // The generated complaint id stayed stable across retries.
    let complaints = h.ledger.complaints.lock().unwrap();
    assert_eq!(complaints.len(), 1);
    let cached = h.results.assigned_ids.lock().unwrap()["T-FLAKY"].clone();
    assert!(complaints.contains_key(&cached));
}

#[tokio::test]
async fn validation_failure_short_circuits() {
    let h = harness();
    let mut record = ward5_complaint();
    record.description = None;

    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-INVALID", record))
        .await;
    h.drain().await;

    let outcome = h.results.outcome("T-INVALID").unwrap();
    assert_eq!(outcome.status, TaskStatus::Failed);
    assert!(outcome.error_message.unwrap().contains("description"));

    // No pin, no ledger submission.
    assert_eq!(h.pinner.pin_count(), 0);
    assert_eq!(h.ledger.attempts(), 0);
}

#[tokio::test]
async fn unrecognized_urgency_downgrades_to_medium() {
    let h = harness();
    let mut record = ward5_complaint();
    record.urgency = Some("urgent".to_string());

    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-URG", record)).await;
    h.drain().await;

    let complaints = h.ledger.complaints.lock().unwrap();
    assert_eq!(complaints.values().next().unwrap().urgency, 2);
}

#[tokio::test]
async fn unknown_category_is_rejected_without_retry() {
    let h = harness();
    let raw = r#"{"id": "T-BAD", "category": "REFUND", "payload": {}}"#;
    h.queue.push(COMPLAINT_QUEUE, raw).await.unwrap();
    h.drain().await;

    let outcome = h.results.outcome("T-BAD").unwrap();
    assert_eq!(outcome.status, TaskStatus::Failed);
    assert!(outcome.error_message.unwrap().contains("malformed"));
    assert_eq!(h.ledger.attempts(), 0);
}

#[tokio::test]
async fn user_registration_commits_digests_not_pii() {
    let h = harness();
    h.enqueue(USER_QUEUE, &user_task("T-USER", sample_user("USR-1")))
        .await;
    h.drain().await;

    let users = h.ledger.users.lock().unwrap();
    let call = &users["USR-1"];
    assert_eq!(call.role, "CITIZEN");
    assert_eq!(call.email_digest, digest::email_digest("citizen@example.com"));
    // Absent national id hashes the sentinel, never an empty string.
    assert_eq!(call.national_id_digest, digest::national_id_digest(None));
    assert_eq!(call.municipal, "RMC");
    // Plaintext PII never reaches the ledger call.
    assert!(!call.email_digest.contains('@'));

    let outcome = h.results.outcome("T-USER").unwrap();
    assert_eq!(outcome.status, TaskStatus::Success);

    // Pinned record carries the fixed role tag.
    let (json, _cid) = h.results.records.lock().unwrap()["user:USR-1"].clone();
    assert!(json.contains(r#""role":"CITIZEN""#));
}

#[tokio::test]
async fn duplicate_user_registration_is_idempotent() {
    let h = harness();
    h.enqueue(USER_QUEUE, &user_task("T-U1", sample_user("USR-2")))
        .await;
    h.enqueue(USER_QUEUE, &user_task("T-U2", sample_user("USR-2")))
        .await;
    h.drain().await;

    assert_eq!(h.ledger.users.lock().unwrap().len(), 1);
    assert_eq!(h.results.outcome("T-U1").unwrap().status, TaskStatus::Success);
    assert_eq!(h.results.outcome("T-U2").unwrap().status, TaskStatus::Success);
}

#[tokio::test]
async fn user_queue_polled_before_complaint_queue() {
    let h = harness();
    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-C", ward5_complaint()))
        .await;
    h.enqueue(USER_QUEUE, &user_task("T-U", sample_user("USR-3")))
        .await;
    h.drain().await;

    let order = h.ledger.call_order.lock().unwrap().clone();
    assert_eq!(order, vec!["user", "complaint"]);
}

#[tokio::test]
async fn status_update_sends_ordinal() {
    let h = harness();
    let mut record = ward5_complaint();
    record.id = Some("COMP-9".to_string());
    h.enqueue(COMPLAINT_QUEUE, &complaint_task("T-REG", record)).await;
    h.drain().await;

    let status_raw = r#"{
        "id": "T-STATUS",
        "category": "STATUS_UPDATE",
        "payload": {"complaintId": "COMP-9", "status": "COMPLETED", "note": "fixed"}
    }"#;
    h.queue
        .push("complaint:status:queue", status_raw)
        .await
        .unwrap();
    h.drain().await;

    let calls = h.ledger.status_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].status, 5);
    assert_eq!(calls[0].note, "fixed");
    assert_eq!(
        h.results.outcome("T-STATUS").unwrap().status,
        TaskStatus::Success
    );
}

#[tokio::test]
async fn unknown_status_fails_validation() {
    let h = harness();
    let raw = r#"{
        "id": "T-BADSTATUS",
        "category": "STATUS_UPDATE",
        "payload": {"complaintId": "COMP-1", "status": "ARCHIVED"}
    }"#;
    h.queue.push("complaint:status:queue", raw).await.unwrap();
    h.drain().await;

    let outcome = h.results.outcome("T-BADSTATUS").unwrap();
    assert_eq!(outcome.status, TaskStatus::Failed);
    assert!(outcome.error_message.unwrap().contains("unknown complaint status"));
    assert_eq!(h.ledger.attempts(), 0);
}

#[tokio::test]
async fn status_update_for_missing_complaint_fails_permanently() {
    let h = harness();
    let raw = r#"{
        "id": "T-NOCOMP",
        "category": "STATUS_UPDATE",
        "payload": {"complaintId": "COMP-MISSING", "status": "FORWARDED"}
    }"#;
    h.queue.push("complaint:status:queue", raw).await.unwrap();
    h.drain().await;

    // NotFound is deterministic; exactly one attempt, no retries.
    assert_eq!(h.ledger.attempts(), 1);
    assert_eq!(
        h.results.outcome("T-NOCOMP").unwrap().status,
        TaskStatus::Failed
    );
}

#[tokio::test]
async fn assignment_commits_department_and_assignee() {
    let h = harness();
    h.register_complaint("COMP-20").await;

    let raw = r#"{
        "id": "T-ASSIGN",
        "category": "ASSIGNMENT",
        "payload": {"complaintId": "COMP-20", "department": "PHE", "assignee": "officer-7"}
    }"#;
    h.queue
        .push("complaint:assignment:queue", raw)
        .await
        .unwrap();
    h.drain().await;

    let assignments = h.ledger.assignments.lock().unwrap();
    assert_eq!(assignments["COMP-20"].department, "PHE");
    assert_eq!(assignments["COMP-20"].assignee, "officer-7");

    // Lifecycle writes pin nothing; only the seed registration did.
    assert_eq!(h.pinner.pin_count(), 1);

    let outcome = h.results.outcome("T-ASSIGN").unwrap();
    assert_eq!(outcome.status, TaskStatus::Success);
    assert!(outcome.content_id.is_none());
}

#[tokio::test]
async fn assignment_for_missing_complaint_fails_permanently() {
    let h = harness();
    let raw = r#"{
        "id": "T-NOASSIGN",
        "category": "ASSIGNMENT",
        "payload": {"complaintId": "COMP-GONE", "department": "PHE", "assignee": "officer-7"}
    }"#;
    h.queue
        .push("complaint:assignment:queue", raw)
        .await
        .unwrap();
    h.drain().await;

    // NotFound is deterministic; exactly one attempt, no retries.
    assert_eq!(h.ledger.attempts(), 1);
    assert_eq!(
        h.results.outcome("T-NOASSIGN").unwrap().status,
        TaskStatus::Failed
    );
}

#[tokio::test]
async fn lifecycle_payloads_missing_fields_fail_validation() {
    let h = harness();
    h.queue
        .push(
            "complaint:assignment:queue",
            r#"{"id": "T-NODEPT", "category": "ASSIGNMENT",
                "payload": {"complaintId": "COMP-1", "assignee": "officer-7"}}"#,
        )
        .await
        .unwrap();
    h.queue
        .push(
            "complaint:assignment:queue",
            r#"{"id": "T-NOWHO", "category": "ASSIGNMENT",
                "payload": {"complaintId": "COMP-1", "department": "PHE"}}"#,
        )
        .await
        .unwrap();
    h.queue
        .push(
            "complaint:resolution:queue",
            r#"{"id": "T-NONOTE", "category": "RESOLUTION",
                "payload": {"complaintId": "COMP-1"}}"#,
        )
        .await
        .unwrap();
    h.drain().await;

    // All three are rejected before any ledger call.
    assert_eq!(h.ledger.attempts(), 0);

    let dept = h.results.outcome("T-NODEPT").unwrap();
    assert_eq!(dept.status, TaskStatus::Failed);
    assert!(dept.error_message.unwrap().contains("department"));

    let who = h.results.outcome("T-NOWHO").unwrap();
    assert_eq!(who.status, TaskStatus::Failed);
    assert!(who.error_message.unwrap().contains("assignee"));

    let note = h.results.outcome("T-NONOTE").unwrap();
    assert_eq!(note.status, TaskStatus::Failed);
    assert!(note.error_message.unwrap().contains("resolutionNote"));
}

#[tokio::test]
async fn resolution_commits_note() {
    let h = harness();
    h.register_complaint("COMP-21").await;

    let raw = r#"{
        "id": "T-RESOLVE",
        "category": "RESOLUTION",
        "payload": {"complaintId": "COMP-21", "resolutionNote": "pipe replaced"}
    }"#;
    h.queue
        .push("complaint:resolution:queue", raw)
        .await
        .unwrap();
    h.drain().await;

    let resolutions = h.ledger.resolutions.lock().unwrap();
    assert_eq!(resolutions["COMP-21"].resolution_note, "pipe replaced");
    assert_eq!(
        h.results.outcome("T-RESOLVE").unwrap().status,
        TaskStatus::Success
    );
}

#[tokio::test]
async fn repeated_resolution_resolves_as_success() {
    let h = harness();
    h.register_complaint("COMP-22").await;

    for task_id in ["T-R1", "T-R2"] {
        let raw = format!(
            r#"{{"id": "{}", "category": "RESOLUTION",
                "payload": {{"complaintId": "COMP-22", "resolutionNote": "done"}}}}"#,
            task_id
        );
        h.queue
            .push("complaint:resolution:queue", &raw)
            .await
            .unwrap();
    }
    h.drain().await;

    // One ledger-visible resolution, both tasks SUCCESS.
    assert_eq!(h.ledger.resolutions.lock().unwrap().len(), 1);
    assert_eq!(h.results.outcome("T-R1").unwrap().status, TaskStatus::Success);
    assert_eq!(h.results.outcome("T-R2").unwrap().status, TaskStatus::Success);
}

#[tokio::test]
async fn malformed_task_without_id_is_dead_lettered() {
    let h = harness();
    let raw = r#"{"category": "REFUND", "payload": {}}"#;
    h.queue.push(COMPLAINT_QUEUE, raw).await.unwrap();
    h.drain().await;

    // No id means no outcome entry; the envelope is parked instead.
    assert!(h.results.outcomes.lock().unwrap().is_empty());
    assert_eq!(h.ledger.attempts(), 0);

    let lists = h.queue.lists.lock().unwrap();
    let dead = &lists[DEAD_LETTER_QUEUE];
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0], raw);
}

#[tokio::test]
async fn shutdown_stops_the_loop() {
    let h = harness();
    assert!(h.worker.is_running());
    h.worker.shutdown();
    assert!(!h.worker.is_running());
}
