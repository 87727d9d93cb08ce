use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use nanoid::nanoid;

use crate::config::SessionConfig;
use crate::error::{PaperscoutError, Result};
use crate::models::{ConversationTurn, Recommendation, SessionPhase};

/// One user's interaction state: the FSM phase, the current recommendation
/// and the append-only chat transcript.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub phase: SessionPhase,
    pub recommendation: Option<Recommendation>,
    pub transcript: Vec<ConversationTurn>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: nanoid!(),
            phase: SessionPhase::Browsing,
            recommendation: None,
            transcript: Vec::new(),
            last_active: Utc::now(),
        }
    }
}

/// In-memory session registry enforcing the interaction state machine.
///
/// Transitions outside the declared edges are `Conflict` errors. Idle
/// sessions are dropped by the sweeper loop in `main`, which drives
/// `run_once()` every `interval_secs()`.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    ttl_secs: u64,
    sweep_interval_secs: u64,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl_secs: config.ttl_secs,
            sweep_interval_secs: config.sweep_interval_secs,
        }
    }

    pub fn create(&self) -> Session {
        let session = Session::new();
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    pub fn get(&self, id: &str) -> Result<Session> {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| PaperscoutError::NotFound(format!("Session not found: {id}")))?;
        session.last_active = Utc::now();
        Ok(session.clone())
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PaperscoutError::NotFound(format!("Session not found: {id}")))
    }

    /// Store a fresh recommendation. Legal from `Browsing` (first query) and
    /// from `ShowingRecommendation` (a new query supersedes the old result).
    pub fn set_recommendation(&self, id: &str, recommendation: Recommendation) -> Result<Session> {
        self.with_session(id, |session| {
            match session.phase {
                SessionPhase::Browsing | SessionPhase::ShowingRecommendation => {}
                SessionPhase::Chatting => {
                    return Err(PaperscoutError::Conflict(
                        "Cannot request a new recommendation while chatting; reset the session first"
                            .to_string(),
                    ))
                }
            }

            session.phase = SessionPhase::ShowingRecommendation;
            session.recommendation = Some(recommendation);
            Ok(())
        })
    }

    /// Switch from viewing the recommendation to chatting with the paper.
    pub fn start_chat(&self, id: &str) -> Result<Session> {
        self.with_session(id, |session| {
            if session.phase != SessionPhase::ShowingRecommendation {
                return Err(PaperscoutError::Conflict(format!(
                    "Cannot start a chat from the {} phase",
                    session.phase
                )));
            }

            session.phase = SessionPhase::Chatting;
            Ok(())
        })
    }

    /// Append one completed turn. Legal only while chatting.
    pub fn append_turn(&self, id: &str, turn: ConversationTurn) -> Result<Session> {
        self.with_session(id, |session| {
            if session.phase != SessionPhase::Chatting {
                return Err(PaperscoutError::Conflict(format!(
                    "Cannot chat from the {} phase",
                    session.phase
                )));
            }

            session.transcript.push(turn);
            Ok(())
        })
    }

    fn with_session(
        &self,
        id: &str,
        apply: impl FnOnce(&mut Session) -> Result<()>,
    ) -> Result<Session> {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| PaperscoutError::NotFound(format!("Session not found: {id}")))?;

        apply(session)?;
        session.last_active = Utc::now();
        Ok(session.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn interval_secs(&self) -> u64 {
        self.sweep_interval_secs
    }

    /// Drop sessions idle past the TTL. Returns how many were removed.
    pub fn run_once(&self) -> usize {
        self.sweep_idle(Utc::now())
    }

    fn sweep_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::seconds(self.ttl_secs as i64);
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        let before = sessions.len();
        sessions.retain(|_, session| session.last_active > cutoff);
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::info!(removed, "Swept idle sessions");
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, PaperMetadata, Recommendation};

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig {
            ttl_secs: 3600,
            sweep_interval_secs: 300,
            page_cache_capacity: 8,
        })
    }

    fn recommendation() -> Recommendation {
        let paper = PaperMetadata {
            author: "Smith et al.".to_string(),
            pmid: "31209134".to_string(),
            url: "https://pubmed.ncbi.nlm.nih.gov/31209134/".to_string(),
            title: "Single-cell skin atlas".to_string(),
        };
        Recommendation::new(&paper, Confidence::from_score(0.68), "Summary.".to_string())
    }

    #[test]
    fn new_sessions_start_browsing() {
        let store = store();
        let session = store.create();
        assert_eq!(session.phase, SessionPhase::Browsing);
        assert!(session.recommendation.is_none());
        assert!(session.transcript.is_empty());
    }

    #[test]
    fn recommend_moves_to_showing_recommendation() {
        let store = store();
        let session = store.create();

        let updated = store.set_recommendation(&session.id, recommendation()).unwrap();
        assert_eq!(updated.phase, SessionPhase::ShowingRecommendation);
        assert!(updated.recommendation.is_some());
    }

    #[test]
    fn new_query_supersedes_previous_recommendation() {
        let store = store();
        let session = store.create();

        store.set_recommendation(&session.id, recommendation()).unwrap();
        let updated = store.set_recommendation(&session.id, recommendation()).unwrap();
        assert_eq!(updated.phase, SessionPhase::ShowingRecommendation);
    }

    #[test]
    fn chat_requires_a_recommendation_first() {
        let store = store();
        let session = store.create();

        let err = store.start_chat(&session.id).unwrap_err();
        assert!(matches!(err, PaperscoutError::Conflict(_)));
    }

    #[test]
    fn recommending_while_chatting_is_a_conflict() {
        let store = store();
        let session = store.create();

        store.set_recommendation(&session.id, recommendation()).unwrap();
        store.start_chat(&session.id).unwrap();

        let err = store
            .set_recommendation(&session.id, recommendation())
            .unwrap_err();
        assert!(matches!(err, PaperscoutError::Conflict(_)));
    }

    #[test]
    fn transcript_is_append_only_and_ordered() {
        let store = store();
        let session = store.create();
        store.set_recommendation(&session.id, recommendation()).unwrap();
        store.start_chat(&session.id).unwrap();

        for i in 0..4 {
            store
                .append_turn(
                    &session.id,
                    ConversationTurn::new(format!("q{i}"), format!("a{i}")),
                )
                .unwrap();
        }

        let session = store.get(&session.id).unwrap();
        assert_eq!(session.transcript.len(), 4);
        let questions: Vec<&str> = session
            .transcript
            .iter()
            .map(|t| t.question.as_str())
            .collect();
        assert_eq!(questions, vec!["q0", "q1", "q2", "q3"]);
    }

    #[test]
    fn asking_outside_chat_phase_is_a_conflict() {
        let store = store();
        let session = store.create();

        let err = store
            .append_turn(&session.id, ConversationTurn::new("q", "a"))
            .unwrap_err();
        assert!(matches!(err, PaperscoutError::Conflict(_)));
    }

    #[test]
    fn unknown_session_is_not_found() {
        let store = store();
        assert!(matches!(
            store.get("missing"),
            Err(PaperscoutError::NotFound(_))
        ));
        assert!(matches!(
            store.remove("missing"),
            Err(PaperscoutError::NotFound(_))
        ));
    }

    #[test]
    fn sweep_drops_only_idle_sessions() {
        let store = store();
        let stale = store.create();
        let fresh = store.create();

        // Age the first session past the TTL.
        {
            let mut sessions = store.sessions.lock().unwrap();
            sessions.get_mut(&stale.id).unwrap().last_active =
                Utc::now() - Duration::seconds(7200);
        }

        let removed = store.run_once();
        assert_eq!(removed, 1);
        assert!(store.get(&stale.id).is_err());
        assert!(store.get(&fresh.id).is_ok());
    }
}
