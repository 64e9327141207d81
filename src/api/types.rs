//! Shared state for the API layer.

use std::sync::Arc;

use crate::db::Database;
use crate::empathy::ResponseComposer;
use crate::llm::LlmClient;
use crate::monitor::TriageMonitor;
use crate::safety::ValidationWorkflow;
use crate::session::SessionStore;
use crate::triage::MultiIntentOrchestrator;

/// Shared context for all API routes. Everything is Arc'd so the router
/// can be cloned per connection.
#[derive(Clone)]
pub struct ApiContext {
    pub orchestrator: Arc<MultiIntentOrchestrator>,
    pub composer: Arc<ResponseComposer>,
    pub sessions: Arc<SessionStore>,
    pub monitor: Arc<TriageMonitor>,
    pub db: Arc<Database>,
    pub workflow: Arc<ValidationWorkflow>,
    pub llm_configured: bool,
}

impl ApiContext {
    /// Wire the full service graph around one database handle and an
    /// optional LLM client.
    pub fn new(llm: Option<Arc<dyn LlmClient>>, db: Arc<Database>, history_cap: usize) -> Self {
        let monitor = Arc::new(TriageMonitor::new(history_cap));
        Self {
            orchestrator: Arc::new(MultiIntentOrchestrator::new(llm.clone(), monitor.clone())),
            composer: Arc::new(ResponseComposer::new(llm.clone(), monitor.clone())),
            sessions: Arc::new(SessionStore::new()),
            monitor,
            workflow: Arc::new(ValidationWorkflow::new(db.clone())),
            db,
            llm_configured: llm.is_some(),
        }
    }
}
