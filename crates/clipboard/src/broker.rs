use actions::SurfaceId;
use collections::FxHashMap;

use crate::{ClipboardKind, RequestId, RequestKind};

/// Where a live request stands. Terminal states are not stored: a finished
/// or cancelled request is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Waiting for the host to supply or accept data.
    Requested,
    /// Data arrived and the user is being asked to approve it.
    Confirming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: RequestId,
    pub surface: SurfaceId,
    pub kind: RequestKind,
    pub clipboard: ClipboardKind,
    pub state: RequestState,
    /// Data held while confirming: pasted text, or the OSC 52 write payload.
    pub payload: Option<String>,
}

/// Result of applying a host completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No such request: superseded, already finished, or its surface is gone.
    Stale,
    /// The host had no data or the user declined.
    Cancelled(Request),
    /// Data is available. The request has been removed from the broker.
    Ready {
        request: Request,
        data: String,
        confirmed: bool,
    },
}

/// Outstanding clipboard requests, at most one per (surface, kind).
#[derive(Debug, Default)]
pub struct ClipboardBroker {
    pending: FxHashMap<RequestId, Request>,
    latest: FxHashMap<(SurfaceId, RequestKind), RequestId>,
}

impl ClipboardBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn get(&self, id: RequestId) -> Option<&Request> {
        self.pending.get(&id)
    }

    /// The live request of `kind` for `surface`, if any.
    pub fn outstanding(&self, surface: SurfaceId, kind: RequestKind) -> Option<&Request> {
        self.latest
            .get(&(surface, kind))
            .and_then(|id| self.pending.get(id))
    }

    /// Open a request. A previous request of the same kind for the same
    /// surface is cancelled; its id goes stale.
    pub fn request(
        &mut self,
        surface: SurfaceId,
        kind: RequestKind,
        clipboard: ClipboardKind,
        payload: Option<String>,
    ) -> RequestId {
        let id = RequestId::next();

        if let Some(previous) = self.latest.insert((surface, kind), id) {
            if self.pending.remove(&previous).is_some() {
                tracing::debug!("{:?} superseded by {:?}", previous, id);
            }
        }

        self.pending.insert(
            id,
            Request {
                id,
                surface,
                kind,
                clipboard,
                state: RequestState::Requested,
                payload,
            },
        );
        tracing::debug!("{:?} requested: {:?} on {:?} for {:?}", id, kind, clipboard, surface);
        id
    }

    /// Apply a host completion. `data` of `None` means the host had nothing
    /// or the user refused.
    ///
    /// A write request carries its own payload; the host only approves it,
    /// so `data` is ignored and an unconfirmed completion cancels it.
    pub fn complete(&mut self, id: RequestId, data: Option<String>, confirmed: bool) -> Completion {
        let Some(mut request) = self.take(id) else {
            tracing::debug!("{:?} completed after it went stale; ignoring", id);
            return Completion::Stale;
        };

        let data = match request.kind {
            RequestKind::Osc52Write if confirmed => request.payload.take(),
            RequestKind::Osc52Write => None,
            _ => data,
        };

        match data {
            None => {
                tracing::debug!("{:?} cancelled", id);
                Completion::Cancelled(request)
            }
            Some(data) => {
                tracing::debug!(
                    "{:?} ready ({} bytes, confirmed: {})",
                    id,
                    data.len(),
                    confirmed
                );
                Completion::Ready {
                    request,
                    data,
                    confirmed,
                }
            }
        }
    }

    /// Put a request that just completed back in place, waiting for the
    /// user's confirmation of `payload`. Keeps its id.
    ///
    /// Returns false if a newer request took the slot in the meantime.
    pub fn await_confirmation(&mut self, mut request: Request, payload: String) -> bool {
        let slot = (request.surface, request.kind);
        if let Some(current) = self.latest.get(&slot) {
            if *current != request.id {
                return false;
            }
        }
        request.state = RequestState::Confirming;
        request.payload = Some(payload);
        self.latest.insert(slot, request.id);
        tracing::debug!("{:?} awaiting confirmation", request.id);
        self.pending.insert(request.id, request);
        true
    }

    /// Drop a request without completing it.
    pub fn cancel(&mut self, id: RequestId) -> Option<Request> {
        let request = self.take(id)?;
        tracing::debug!("{:?} cancelled", id);
        Some(request)
    }

    /// Cancel everything a surface had outstanding. Called at teardown.
    pub fn cancel_surface(&mut self, surface: SurfaceId) -> Vec<RequestId> {
        let mut cancelled: Vec<RequestId> = self
            .pending
            .values()
            .filter(|request| request.surface == surface)
            .map(|request| request.id)
            .collect();
        cancelled.sort();
        for id in &cancelled {
            self.take(*id);
        }
        if !cancelled.is_empty() {
            tracing::debug!("Cancelled {} request(s) of {:?}", cancelled.len(), surface);
        }
        cancelled
    }

    fn take(&mut self, id: RequestId) -> Option<Request> {
        let request = self.pending.remove(&id)?;
        let slot = (request.surface, request.kind);
        if self.latest.get(&slot) == Some(&id) {
            self.latest.remove(&slot);
        }
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collections::Arena;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn surfaces(n: usize) -> Vec<SurfaceId> {
        let mut arena = Arena::new();
        (0..n).map(|_| SurfaceId(arena.insert(()))).collect()
    }

    fn paste(broker: &mut ClipboardBroker, surface: SurfaceId) -> RequestId {
        broker.request(surface, RequestKind::Paste, ClipboardKind::Standard, None)
    }

    // === Lifecycle ===

    #[test]
    fn completion_with_data_is_ready_and_removed() {
        let surface = surfaces(1)[0];
        let mut broker = ClipboardBroker::new();
        let id = paste(&mut broker, surface);

        match broker.complete(id, Some("hi".into()), false) {
            Completion::Ready { request, data, confirmed } => {
                assert_eq!(request.id, id);
                assert_eq!(data, "hi");
                assert!(!confirmed);
            }
            other => panic!("expected ready, got {other:?}"),
        }
        assert!(broker.is_empty());
        assert_eq!(broker.complete(id, Some("again".into()), false), Completion::Stale);
    }

    #[test]
    fn completion_without_data_cancels() {
        let surface = surfaces(1)[0];
        let mut broker = ClipboardBroker::new();
        let id = paste(&mut broker, surface);
        assert!(matches!(broker.complete(id, None, false), Completion::Cancelled(_)));
        assert!(broker.is_empty());
    }

    #[test]
    fn confirmation_keeps_the_id() {
        let surface = surfaces(1)[0];
        let mut broker = ClipboardBroker::new();
        let id = paste(&mut broker, surface);

        let Completion::Ready { request, data, .. } = broker.complete(id, Some("rm -rf\n".into()), false) else {
            panic!("expected ready");
        };
        assert!(broker.await_confirmation(request, data));
        let pending = broker.get(id).unwrap();
        assert_eq!(pending.state, RequestState::Confirming);
        assert_eq!(pending.payload.as_deref(), Some("rm -rf\n"));

        assert!(matches!(
            broker.complete(id, Some("rm -rf\n".into()), true),
            Completion::Ready { confirmed: true, .. }
        ));
    }

    #[test]
    fn write_completion_confirms_captured_payload() {
        let surface = surfaces(1)[0];
        let mut broker = ClipboardBroker::new();
        let id = broker.request(
            surface,
            RequestKind::Osc52Write,
            ClipboardKind::Standard,
            Some("payload".into()),
        );
        match broker.complete(id, None, true) {
            Completion::Ready { data, confirmed, .. } => {
                assert_eq!(data, "payload");
                assert!(confirmed);
            }
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[test]
    fn declined_write_is_cancelled() {
        let surface = surfaces(1)[0];
        let mut broker = ClipboardBroker::new();
        let id = broker.request(
            surface,
            RequestKind::Osc52Write,
            ClipboardKind::Standard,
            Some("payload".into()),
        );
        assert!(matches!(
            broker.complete(id, Some("ignored".into()), false),
            Completion::Cancelled(_)
        ));
    }

    // === Supersede ===

    #[test]
    fn new_request_supersedes_same_kind() {
        let surface = surfaces(1)[0];
        let mut broker = ClipboardBroker::new();
        let first = paste(&mut broker, surface);
        let second = paste(&mut broker, surface);

        assert_eq!(broker.len(), 1);
        assert_eq!(broker.complete(first, Some("old".into()), false), Completion::Stale);
        assert!(matches!(
            broker.complete(second, Some("new".into()), false),
            Completion::Ready { .. }
        ));
    }

    #[test]
    fn different_kinds_coexist() {
        let surface = surfaces(1)[0];
        let mut broker = ClipboardBroker::new();
        paste(&mut broker, surface);
        broker.request(surface, RequestKind::Osc52Read, ClipboardKind::Standard, None);
        assert_eq!(broker.len(), 2);
    }

    #[test]
    fn different_surfaces_coexist() {
        let ids = surfaces(2);
        let mut broker = ClipboardBroker::new();
        paste(&mut broker, ids[0]);
        paste(&mut broker, ids[1]);
        assert_eq!(broker.len(), 2);
    }

    #[test]
    fn superseded_request_cannot_reclaim_slot() {
        let surface = surfaces(1)[0];
        let mut broker = ClipboardBroker::new();
        let first = paste(&mut broker, surface);
        let Completion::Ready { request, data, .. } = broker.complete(first, Some("x".into()), false) else {
            panic!("expected ready");
        };
        let second = paste(&mut broker, surface);
        assert!(!broker.await_confirmation(request, data));
        assert_eq!(broker.outstanding(surface, RequestKind::Paste).map(|r| r.id), Some(second));
    }

    // === Teardown ===

    #[test]
    fn teardown_cancels_and_late_completion_is_stale() {
        let ids = surfaces(2);
        let mut broker = ClipboardBroker::new();
        let doomed = paste(&mut broker, ids[0]);
        let survivor = paste(&mut broker, ids[1]);

        assert_eq!(broker.cancel_surface(ids[0]), vec![doomed]);
        assert_eq!(broker.complete(doomed, Some("late".into()), true), Completion::Stale);
        assert!(broker.get(survivor).is_some());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Request(usize),
        Complete(usize),
    }

    fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
        proptest::collection::vec(
            prop_oneof![(0usize..8).prop_map(Op::Request), (0usize..8).prop_map(Op::Complete)],
            1..40,
        )
    }

    proptest! {
        /// Property: among all requests issued for one slot, only the latest
        /// can ever complete, and it completes at most once.
        #[test]
        fn prop_only_latest_request_completes(ops in arb_ops()) {
            let surface = surfaces(1)[0];
            let mut broker = ClipboardBroker::new();
            let mut issued: Vec<RequestId> = Vec::new();
            let mut completed: Vec<RequestId> = Vec::new();

            for op in ops {
                match op {
                    Op::Request(_) => issued.push(paste(&mut broker, surface)),
                    Op::Complete(i) if !issued.is_empty() => {
                        let id = issued[i % issued.len()];
                        if let Completion::Ready { .. } = broker.complete(id, Some("x".into()), true) {
                            prop_assert_eq!(Some(&id), issued.last());
                            prop_assert!(!completed.contains(&id));
                            completed.push(id);
                        }
                    }
                    Op::Complete(_) => {}
                }
                prop_assert!(broker.len() <= 1);
            }
        }
    }
}
