//! Session controller: the submit, loading and result cycle of one session.
//!
//! Phase transitions:
//! - Idle -> Submitting (prompt submitted)
//! - Submitting -> Submitting (another prompt submitted while one is in flight)
//! - Submitting -> Success (relay answered, reply interpreted)
//! - Submitting -> Failed (relay round trip failed, or empty prompt)
//! - Success -> Idle, Failed -> Idle (immediately, keeping the result)
//!
//! Every submission bumps a generation counter. A response is applied only
//! if its generation is still the latest; older in-flight responses are
//! discarded.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use walrus_core::{Activity, InterpretedResult};

use crate::client::ChatBackend;
use crate::error::SessionError;
use crate::export::{self, Clipboard};
use crate::interpreter::{interpret_completion, relay_failure};

/// Message shown when submit is pressed with nothing to send.
pub const EMPTY_PROMPT_MESSAGE: &str = "Describe the workshop you'd like to build first.";

/// Where a session is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Waiting for the user. Holds the last result, if any.
    Idle,
    /// A request is in flight. The previous result has been cleared.
    Submitting,
    /// The latest request produced activities or a note.
    Success,
    /// The latest request failed and produced a soft-failure result.
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "Idle"),
            SessionPhase::Submitting => write!(f, "Submitting"),
            SessionPhase::Success => write!(f, "Success"),
            SessionPhase::Failed => write!(f, "Failed"),
        }
    }
}

impl SessionPhase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SessionPhase) -> bool {
        matches!(
            (self, target),
            (SessionPhase::Idle, SessionPhase::Submitting)
                | (SessionPhase::Submitting, SessionPhase::Submitting)
                | (SessionPhase::Submitting, SessionPhase::Success)
                | (SessionPhase::Submitting, SessionPhase::Failed)
                | (SessionPhase::Success, SessionPhase::Idle)
                | (SessionPhase::Failed, SessionPhase::Idle)
        )
    }
}

/// What happened to a submission once its round trip finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The result is now the session's visible result.
    Applied(InterpretedResult),
    /// A newer submission started meanwhile; this response was dropped.
    Superseded,
}

#[derive(Debug)]
struct SessionState {
    prompt: String,
    phase: SessionPhase,
    result: Option<InterpretedResult>,
}

impl SessionState {
    fn enter(&mut self, target: SessionPhase) {
        debug_assert!(
            self.phase.can_transition_to(&target),
            "invalid session transition {} -> {}",
            self.phase,
            target
        );
        tracing::debug!("Session phase: {} -> {}", self.phase, target);
        self.phase = target;
    }
}

/// Owns one session's prompt, phase and current result.
pub struct SessionController<B> {
    backend: B,
    state: Mutex<SessionState>,
    generation: AtomicU64,
}

impl<B: ChatBackend> SessionController<B> {
    /// Create an idle session pre-seeded with `default_prompt`.
    pub fn new(backend: B, default_prompt: impl Into<String>) -> Self {
        Self {
            backend,
            state: Mutex::new(SessionState {
                prompt: default_prompt.into(),
                phase: SessionPhase::Idle,
                result: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn prompt(&self) -> String {
        self.lock().prompt.clone()
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.lock().prompt = prompt.into();
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == SessionPhase::Submitting
    }

    /// The visible result, `None` before the first submission and while a
    /// request is in flight.
    pub fn result(&self) -> Option<InterpretedResult> {
        self.lock().result.clone()
    }

    /// Number of submissions made so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Submit the current prompt.
    ///
    /// Clears the previous result immediately, then waits for the relay.
    /// Relay failures become the soft-failure card; they are never returned
    /// as errors.
    pub async fn submit(&self) -> SubmitOutcome {
        let (generation, prompt) = {
            let mut state = self.lock();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.result = None;
            state.enter(SessionPhase::Submitting);

            if state.prompt.trim().is_empty() {
                let result = InterpretedResult::Error {
                    message: EMPTY_PROMPT_MESSAGE.to_string(),
                };
                state.enter(SessionPhase::Failed);
                state.result = Some(result.clone());
                state.enter(SessionPhase::Idle);
                return SubmitOutcome::Applied(result);
            }

            (generation, state.prompt.clone())
        };

        tracing::info!(generation, prompt_len = prompt.len(), "Submitting prompt");

        let (result, outcome_phase) = match self.backend.fetch_chat_response(&prompt).await {
            Ok(envelope) => (interpret_completion(&envelope), SessionPhase::Success),
            Err(e) => {
                tracing::warn!(generation, error = %e, "Error fetching chat response");
                (relay_failure(), SessionPhase::Failed)
            }
        };

        let mut state = self.lock();
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            tracing::debug!(generation, latest, "Discarding stale response");
            return SubmitOutcome::Superseded;
        }

        state.enter(outcome_phase);
        state.result = Some(result.clone());
        state.enter(SessionPhase::Idle);
        SubmitOutcome::Applied(result)
    }

    /// Activity cards of the current result, in display order.
    pub fn activities(&self) -> Vec<Activity> {
        self.lock()
            .result
            .as_ref()
            .map(|r| r.activities().to_vec())
            .unwrap_or_default()
    }

    /// Move the card at `from` to position `to`, shifting the rest.
    pub fn move_activity(&self, from: usize, to: usize) -> Result<(), SessionError> {
        let mut state = self.lock();
        let items = match state.result.as_mut() {
            Some(InterpretedResult::Activities { items }) if !items.is_empty() => items,
            _ => return Err(SessionError::NoActivities),
        };

        let len = items.len();
        if from >= len || to >= len {
            return Err(SessionError::Reorder { from, to, len });
        }

        let activity = items.remove(from);
        items.insert(to, activity);
        Ok(())
    }

    pub fn clipboard_text(&self) -> String {
        export::clipboard_text(&self.activities())
    }

    pub fn csv(&self) -> String {
        export::to_csv(&self.activities())
    }

    /// Copy the activity list to `clipboard` as `title: description` blocks.
    pub fn copy_to_clipboard(&self, clipboard: &dyn Clipboard) -> Result<(), SessionError> {
        let activities = self.activities();
        if activities.is_empty() {
            return Err(SessionError::NoActivities);
        }
        clipboard.set_text(&export::clipboard_text(&activities))?;
        tracing::info!(count = activities.len(), "Activities copied to clipboard");
        Ok(())
    }

    /// Write `workshop_activities.csv` into `dir`.
    pub fn export_csv(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        let activities = self.activities();
        if activities.is_empty() {
            return Err(SessionError::NoActivities);
        }
        export::write_csv(dir, &activities)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Tests
// =============================================================================
