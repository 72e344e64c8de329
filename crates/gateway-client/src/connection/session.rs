//! Session and sequence tracking
//!
//! Survives individual connections so a dropped connection can be resumed.

/// Server-assigned session identity and the last-seen dispatch sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTracker {
    session_id: Option<String>,
    sequence: Option<u64>,
}

impl SessionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Last sequence seen, `None` before the first dispatch of a fresh session
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    /// Record a dispatch sequence. Only moves forward; a regression is ignored.
    pub fn observe(&mut self, seq: Option<u64>) {
        let Some(seq) = seq else { return };
        match self.sequence {
            Some(current) if seq < current => {
                tracing::debug!(seq, current, "Ignoring sequence regression");
            }
            _ => self.sequence = Some(seq),
        }
    }

    /// Ready arrived for a fresh session
    pub fn establish(&mut self, session_id: impl Into<String>) {
        self.session_id = Some(session_id.into());
    }

    /// A Resume handshake is possible
    #[must_use]
    pub fn can_resume(&self) -> bool {
        self.session_id.is_some()
    }

    /// Forget the session; the next handshake is a fresh Identify starting from sequence 0
    pub fn reset(&mut self) {
        if let Some(session_id) = self.session_id.take() {
            tracing::debug!(session_id = %session_id, "Session cleared");
        }
        self.sequence = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_moves_forward_only() {
        let mut session = SessionTracker::new();
        assert_eq!(session.sequence(), None);

        for seq in [5, 7, 9] {
            session.observe(Some(seq));
        }
        assert_eq!(session.sequence(), Some(9));

        session.observe(Some(4));
        session.observe(None);
        assert_eq!(session.sequence(), Some(9));
    }

    #[test]
    fn test_establish_and_reset() {
        let mut session = SessionTracker::new();
        assert!(!session.can_resume());

        session.establish("abc");
        session.observe(Some(3));
        assert!(session.can_resume());
        assert_eq!(session.session_id(), Some("abc"));

        session.reset();
        assert!(!session.can_resume());
        assert_eq!(session.sequence(), None);
    }
}
