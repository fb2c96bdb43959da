//! Fallback chains and their executor.
//!
//! A chain is a finite, ordered sequence of attempts. Each attempt runs the
//! same state machine:
//!
//! ```text
//! Start → Constructing → {ConstructFailed | Sending}
//!       → Sending      → {SendFailed | Classifying}
//!       → Classifying  → {Success | Fallback | TerminalError}
//! ```
//!
//! `Fallback` restarts the machine on the next attempt with nothing carried
//! over. The last attempt is terminal: its failure is what the caller sees,
//! with status 400 for construction failures, 503 for transport failures and
//! the real status for application errors.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::{Attempt, Attempted, Outcome, Transport};

/// An ordered, never empty sequence of attempts.
///
/// Attempts are shared by `Arc`, so one node can be the tail of several
/// chains. A chain only ever grows by appending existing attempts, which
/// rules out cycles.
#[derive(Clone)]
pub struct Chain {
    leading: Vec<Arc<dyn Attempt>>,
    terminal: Arc<dyn Attempt>,
}

impl Chain {
    /// Create a single-attempt chain.
    pub fn new(head: impl Attempt + 'static) -> Self {
        Self::from_shared(Arc::new(head))
    }

    /// Create a single-attempt chain from a shared attempt.
    pub fn from_shared(head: Arc<dyn Attempt>) -> Self {
        Self {
            leading: Vec::new(),
            terminal: head,
        }
    }

    /// Append a fallback attempt.
    pub fn then(self, fallback: impl Attempt + 'static) -> Self {
        self.then_shared(Arc::new(fallback))
    }

    /// Append a shared fallback attempt.
    pub fn then_shared(mut self, fallback: Arc<dyn Attempt>) -> Self {
        let previous = std::mem::replace(&mut self.terminal, fallback);
        self.leading.push(previous);
        self
    }

    /// Append every attempt of `tail`, sharing them with it.
    pub fn fallback_to(mut self, tail: &Chain) -> Self {
        let previous = std::mem::replace(&mut self.terminal, Arc::clone(&tail.terminal));
        self.leading.push(previous);
        self.leading.extend(tail.leading.iter().cloned());
        self
    }

    /// Number of attempts in the chain.
    pub fn len(&self) -> usize {
        self.leading.len() + 1
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// First attempt of the chain.
    pub fn head(&self) -> &Arc<dyn Attempt> {
        self.leading.first().unwrap_or(&self.terminal)
    }

    /// Iterate attempts in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Attempt>> {
        self.leading.iter().chain(std::iter::once(&self.terminal))
    }

    /// Attempt names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|attempt| attempt.name()).collect()
    }

    /// Walk the chain until an attempt settles.
    pub fn execute(&self, transport: &dyn Transport) -> Outcome {
        for (position, attempt) in self.leading.iter().enumerate() {
            match attempt.attempt(transport, false) {
                Attempted::Settled(outcome) => {
                    debug!(node = %outcome.served_by, position, status = outcome.status, "Chain settled");
                    return outcome;
                }
                Attempted::Failed { status, error } => {
                    debug!(
                        node = attempt.name(),
                        position,
                        status,
                        error = %error,
                        "Attempt failed, falling back"
                    );
                }
            }
        }

        let position = self.leading.len();
        let outcome = match self.terminal.attempt(transport, true) {
            Attempted::Settled(outcome) => outcome,
            // custom attempts may still hand back a failure when terminal
            Attempted::Failed { status, error } => {
                Outcome::new(self.terminal.name(), status, Some(error))
            }
        };
        debug!(
            node = %outcome.served_by,
            position,
            status = outcome.status,
            ok = outcome.is_ok(),
            "Chain settled on terminal attempt"
        );
        outcome
    }
}

impl From<crate::AttemptNode> for Chain {
    fn from(node: crate::AttemptNode) -> Self {
        Self::new(node)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Runs chains against one explicitly supplied transport.
#[derive(Clone)]
pub struct ChainExecutor {
    transport: Arc<dyn Transport>,
}

impl ChainExecutor {
    /// Create an executor owning `transport`.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create an executor from a shared transport.
    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Get the transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Execute `chain` and report its final outcome.
    pub fn execute(&self, chain: &Chain) -> Outcome {
        chain.execute(self.transport.as_ref())
    }
}

impl fmt::Debug for ChainExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainExecutor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Basic, BasicError, ScriptedTransport};
    use crate::{AttemptNode, FallbackError, Slot, Transport};

    const MALFORMED: &str = "::not a url::";
    const DOWN: &str = "http://down.test/";
    const MISSING: &str = "http://missing.test/";

    #[derive(Clone, Copy, Debug)]
    enum Failure {
        Construct,
        Transport,
        Status,
    }

    impl Failure {
        fn target(self) -> &'static str {
            match self {
                Failure::Construct => MALFORMED,
                Failure::Transport => DOWN,
                Failure::Status => MISSING,
            }
        }
    }

    fn transport() -> ScriptedTransport {
        let mut transport = ScriptedTransport::new()
            .unreachable(DOWN)
            .respond(MISSING, 404, r#"{"Code":404,"Message":"not found"}"#);
        for position in 0..3 {
            transport = transport.respond(
                &format!("http://up.test/{position}"),
                200,
                &format!(r#"{{"Text":"OK","Detail":"node {position}"}}"#),
            );
        }
        transport
    }

    #[test]
    fn test_first_success_from_any_position_wins() {
        for len in 1..=3 {
            for k in 0..len {
                for failure in [Failure::Construct, Failure::Transport, Failure::Status] {
                    let outputs: Vec<Slot<Basic>> = (0..len).map(|_| Slot::new()).collect();
                    let nodes: Vec<AttemptNode> = (0..len)
                        .map(|position| {
                            let target = if position < k {
                                failure.target().to_string()
                            } else {
                                format!("http://up.test/{position}")
                            };
                            AttemptNode::new(format!("node-{position}"), "GET", target)
                                .with_output(Arc::new(outputs[position].clone()))
                        })
                        .collect();

                    let mut nodes = nodes.into_iter();
                    let mut chain = Chain::new(nodes.next().unwrap());
                    for node in nodes {
                        chain = chain.then(node);
                    }

                    let transport = transport();
                    let outcome = chain.execute(&transport);

                    let context = format!("len={len} k={k} failure={failure:?}");
                    assert_eq!(outcome.status, 200, "{context}");
                    assert_eq!(outcome.error, None, "{context}");
                    assert_eq!(outcome.served_by, format!("node-{k}"), "{context}");
                    for (position, output) in outputs.iter().enumerate() {
                        let detail = output.get().map(|b| b.detail);
                        if position == k {
                            assert_eq!(detail, Some(format!("node {k}")), "{context}");
                        } else {
                            assert_eq!(detail, None, "{context}");
                        }
                    }

                    let expected_calls = match failure {
                        Failure::Construct => 1,
                        Failure::Transport | Failure::Status => k + 1,
                    };
                    assert_eq!(transport.calls(), expected_calls, "{context}");
                }
            }
        }
    }

    #[test]
    fn test_terminal_status_by_failure_kind() {
        let transport = transport();
        let errors: Slot<BasicError> = Slot::new();

        let outcome = Chain::new(AttemptNode::new("a", "GET", DOWN))
            .then(AttemptNode::new("b", "GET", MALFORMED))
            .execute(&transport);
        assert_eq!(outcome.status, 400);
        assert!(outcome.error.unwrap().is_construction());

        let outcome = Chain::new(AttemptNode::new("a", "GET", MALFORMED))
            .then(AttemptNode::new("b", "GET", DOWN))
            .execute(&transport);
        assert_eq!(outcome.status, 503);
        assert!(outcome.error.unwrap().is_transport());

        let outcome = Chain::new(AttemptNode::new("a", "GET", DOWN))
            .then(AttemptNode::new("b", "GET", MISSING).with_error_target(Arc::new(errors.clone())))
            .execute(&transport);
        assert_eq!(outcome.into_parts(), (404, None));
        assert_eq!(errors.get().map(|e| e.code), Some(404));
    }

    #[test]
    fn test_undecodable_error_body_on_terminal_node() {
        let transport = ScriptedTransport::new().respond(MISSING, 500, "Internal Server Error");
        let errors: Slot<BasicError> = Slot::new();

        let outcome = Chain::new(AttemptNode::new("a", "GET", MISSING).with_error_target(Arc::new(errors)))
            .execute(&transport);

        assert_eq!(outcome.status, 500);
        assert!(outcome.error.unwrap().is_decode());
    }

    #[test]
    fn test_fallback_status_propagates_verbatim() {
        let transport = ScriptedTransport::new()
            .respond(MISSING, 404, "{}")
            .respond("http://teapot.test/", 418, r#"{"Code":418,"Message":"short and stout"}"#);
        let errors: Slot<BasicError> = Slot::new();

        let outcome = Chain::new(AttemptNode::new("a", "GET", MISSING))
            .then(AttemptNode::new("b", "GET", "http://teapot.test/").with_error_target(Arc::new(errors.clone())))
            .execute(&transport);

        assert_eq!(outcome.status, 418);
        assert_eq!(outcome.served_by, "b");
        assert_eq!(errors.get().map(|e| e.message), Some("short and stout".into()));
    }

    #[test]
    fn test_shared_tail_and_reexecution() {
        let transport = transport();
        let output: Slot<Basic> = Slot::new();
        let tail = Chain::new(AttemptNode::new("tail", "GET", "http://up.test/2").with_output(Arc::new(output.clone())));

        let first = Chain::new(AttemptNode::new("first", "GET", DOWN)).fallback_to(&tail);
        let second = Chain::new(AttemptNode::new("second", "GET", MISSING))
            .then(AttemptNode::new("third", "GET", MALFORMED))
            .fallback_to(&tail);

        assert_eq!(first.names(), vec!["first", "tail"]);
        assert_eq!(second.names(), vec!["second", "third", "tail"]);
        assert!(Arc::ptr_eq(first.iter().last().unwrap(), second.iter().last().unwrap()));

        for chain in [&first, &second, &first] {
            output.clear();
            let outcome = chain.execute(&transport);
            assert_eq!(outcome.served_by, "tail");
            assert!(output.is_filled());
        }
    }

    struct Canned(Attempted);

    impl Attempt for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn attempt(&self, _transport: &dyn Transport, _terminal: bool) -> Attempted {
            self.0.clone()
        }
    }

    #[test]
    fn test_custom_attempts() {
        let transport = ScriptedTransport::new();
        let chain = Chain::new(Canned(Attempted::Failed {
            status: 503,
            error: FallbackError::Transport("cache miss".into()),
        }))
        .then(Canned(Attempted::Settled(Outcome::new("canned", 204, None))));

        assert_eq!(chain.execute(&transport).status, 204);

        let failing = Chain::new(Canned(Attempted::Failed {
            status: 429,
            error: FallbackError::ApplicationStatus { status: 429 },
        }));
        let outcome = ChainExecutor::new(ScriptedTransport::new()).execute(&failing);
        assert_eq!(outcome.status, 429);
        assert_eq!(outcome.error.and_then(|e| e.status_code()), Some(429));
        assert_eq!(transport.calls(), 0);
    }
}
