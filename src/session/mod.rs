//! Conversation sessions
//!
//! A [`ChatSession`] holds one conversation's history with the provider.
//! [`SessionManager`] maps conversation ids to sessions and serializes access
//! per conversation: a second request for the same conversation waits until
//! the first one's upstream call has finished, while other conversations
//! proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    provider::{GenerativeProvider, Turn},
};

/// Conversation used when the client does not name one
pub const DEFAULT_CONVERSATION: &str = "default";

/// Longest accepted conversation id, in characters
pub const MAX_CONVERSATION_ID_LEN: usize = 128;

/// Upper bound on the time between idle sweeps
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// One conversation's accumulated context
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: Vec<Turn>,
    last_active: Instant,
}

impl ChatSession {
    pub(crate) fn new() -> Self {
        Self {
            history: Vec::new(),
            last_active: Instant::now(),
        }
    }

    /// Prior turns, oldest first
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    /// Send `prompt` with the session's history and wait at most `deadline`
    ///
    /// The user/model turn pair is recorded only when the provider answers
    /// with non-blank text, so failed, empty or timed-out calls leave the
    /// history as it was.
    pub async fn send_message(
        &mut self,
        provider: &dyn GenerativeProvider,
        prompt: String,
        deadline: Duration,
    ) -> AppResult<Option<String>> {
        self.last_active = Instant::now();

        let mut contents = Vec::with_capacity(self.history.len() + 1);
        contents.extend_from_slice(&self.history);
        contents.push(Turn::user(prompt));

        let reply = tokio::time::timeout(deadline, provider.generate(&contents))
            .await
            .map_err(|_| AppError::UpstreamTimeout(deadline))??;

        self.last_active = Instant::now();

        match reply {
            Some(text) if !text.trim().is_empty() => {
                if let Some(user_turn) = contents.pop() {
                    self.history.push(user_turn);
                }
                self.history.push(Turn::model(text.clone()));
                Ok(Some(text))
            }
            _ => Ok(None),
        }
    }
}

type SessionSlot = Arc<Mutex<ChatSession>>;

/// Registry of live conversations
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionSlot>>,
    provider: Arc<dyn GenerativeProvider>,
    upstream_timeout: Duration,
    session_ttl: Option<Duration>,
    max_conversations: Option<usize>,
    last_sweep: StdMutex<Instant>,
}

impl SessionManager {
    /// Create a new session manager
    ///
    /// # Arguments
    /// * `provider` - Provider every conversation talks to
    /// * `upstream_timeout` - Deadline for a single provider call
    /// * `session_ttl_seconds` - Idle time before a conversation is dropped (0 = never)
    /// * `max_conversations` - Most conversations held at once (0 = unbounded)
    pub fn new(
        provider: Arc<dyn GenerativeProvider>,
        upstream_timeout: Duration,
        session_ttl_seconds: u64,
        max_conversations: usize,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            provider,
            upstream_timeout,
            session_ttl: (session_ttl_seconds > 0).then(|| Duration::from_secs(session_ttl_seconds)),
            max_conversations: (max_conversations > 0).then_some(max_conversations),
            last_sweep: StdMutex::new(Instant::now()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn GenerativeProvider> {
        &self.provider
    }

    /// Submit a prompt to a conversation and return the provider's reply
    ///
    /// A conversation whose only call so far produced nothing is dropped
    /// again instead of lingering empty.
    #[instrument(skip(self, prompt), fields(conversation_id = %conversation_id))]
    pub async fn submit(&self, conversation_id: &str, prompt: String) -> AppResult<Option<String>> {
        let slot = self.get_or_create(conversation_id)?;

        let (result, empty) = {
            let mut session = slot.lock().await;
            debug!(turns = session.history().len(), "Session locked");

            let result = session
                .send_message(self.provider.as_ref(), prompt, self.upstream_timeout)
                .await;
            (result, session.history().is_empty())
        };

        if empty {
            self.discard_empty(conversation_id, slot);
        }
        result
    }

    /// Forget a conversation's history
    ///
    /// Returns false when no such conversation existed. A request still in
    /// flight for it finishes against the detached session.
    pub fn reset(&self, conversation_id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(conversation_id)
            .is_some();

        if removed {
            debug!(conversation_id = %conversation_id, "Session reset");
        }
        removed
    }

    /// Number of conversations currently held
    pub fn active_conversations(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of a conversation's history
    pub async fn history(&self, conversation_id: &str) -> Option<Vec<Turn>> {
        let slot = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(conversation_id)
            .cloned()?;

        let session = slot.lock().await;
        Some(session.history().to_vec())
    }

    fn get_or_create(&self, conversation_id: &str) -> AppResult<SessionSlot> {
        if let Some(slot) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(conversation_id)
        {
            return Ok(slot.clone());
        }

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = sessions.get(conversation_id) {
            return Ok(slot.clone());
        }

        let at_capacity = self
            .max_conversations
            .is_some_and(|max| sessions.len() >= max);
        if at_capacity || self.sweep_due() {
            self.evict_idle(&mut sessions);
        }

        if let Some(max) = self.max_conversations {
            if sessions.len() >= max {
                warn!(
                    conversation_id = %conversation_id,
                    max_conversations = max,
                    "Conversation limit reached"
                );
                return Err(AppError::ConversationLimit);
            }
        }

        debug!(conversation_id = %conversation_id, "Session created");
        let slot = Arc::new(Mutex::new(ChatSession::new()));
        sessions.insert(conversation_id.to_string(), slot.clone());
        Ok(slot)
    }

    fn sweep_due(&self) -> bool {
        let Some(ttl) = self.session_ttl else {
            return false;
        };
        self.last_sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
            >= ttl.min(SWEEP_INTERVAL)
    }

    /// Drop sessions idle past the TTL; sessions in use are kept
    fn evict_idle(&self, sessions: &mut HashMap<String, SessionSlot>) {
        let Some(ttl) = self.session_ttl else {
            return;
        };
        *self
            .last_sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(session) => session.last_active().elapsed() < ttl,
                Err(_) => true,
            }
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted = evicted, "Evicted idle sessions");
        }
    }

    /// Remove `slot` if it is still registered, unused elsewhere and empty
    fn discard_empty(&self, conversation_id: &str, slot: SessionSlot) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let registered = sessions
            .get(conversation_id)
            .is_some_and(|current| Arc::ptr_eq(current, &slot));
        // The map and `slot` itself are the only holders
        if !registered || Arc::strong_count(&slot) > 2 {
            return;
        }

        let empty = slot
            .try_lock()
            .map(|session| session.history().is_empty())
            .unwrap_or(false);
        if empty {
            sessions.remove(conversation_id);
            debug!(conversation_id = %conversation_id, "Discarded empty session");
        }
    }
}
