//! Cross-thread delivery into the owning thread.
//!
//! Background threads push messages and call the waker; the host responds
//! to the wakeup by calling [`crate::App::tick`], which drains the queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use actions::SurfaceId;
use clipboard::RequestId;
use parking_lot::Mutex;

use crate::TerminalEvent;

/// Payload-free wakeup for the owning thread.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    ClipboardCompletion {
        /// When set, the completion only applies to a request of this surface.
        surface: Option<SurfaceId>,
        request: RequestId,
        data: Option<String>,
        confirmed: bool,
    },
    Terminal {
        surface: SurfaceId,
        event: TerminalEvent,
    },
}

struct Shared {
    queue: Mutex<VecDeque<Message>>,
    waker: Waker,
}

/// Receiving end, owned by the app.
pub struct Mailbox {
    shared: Arc<Shared>,
}

impl Mailbox {
    pub fn new(waker: Waker) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                waker,
            }),
        }
    }

    pub fn sender(&self) -> MailboxSender {
        MailboxSender {
            shared: self.shared.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything queued so far, in arrival order.
    pub fn drain(&self) -> VecDeque<Message> {
        std::mem::take(&mut *self.shared.queue.lock())
    }
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox").field("len", &self.len()).finish()
    }
}

/// Sending end. Cheap to clone and usable from any thread.
#[derive(Clone)]
pub struct MailboxSender {
    shared: Arc<Shared>,
}

impl MailboxSender {
    pub fn send(&self, message: Message) {
        self.shared.queue.lock().push_back(message);
        (self.shared.waker)();
    }

    pub fn complete_clipboard(&self, request: RequestId, data: Option<String>, confirmed: bool) {
        self.send(Message::ClipboardCompletion {
            surface: None,
            request,
            data,
            confirmed,
        });
    }

    /// Queue a completion that is dropped unless `request` belongs to
    /// `surface`.
    pub fn complete_surface_clipboard(
        &self,
        surface: SurfaceId,
        request: RequestId,
        data: Option<String>,
        confirmed: bool,
    ) {
        self.send(Message::ClipboardCompletion {
            surface: Some(surface),
            request,
            data,
            confirmed,
        });
    }

    pub fn terminal_event(&self, surface: SurfaceId, event: TerminalEvent) {
        self.send(Message::Terminal { surface, event });
    }
}

impl fmt::Debug for MailboxSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxSender").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collections::Arena;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_mailbox() -> (Mailbox, Arc<AtomicUsize>) {
        let wakeups = Arc::new(AtomicUsize::new(0));
        let counter = wakeups.clone();
        let mailbox = Mailbox::new(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        (mailbox, wakeups)
    }

    #[test]
    fn send_wakes_and_drain_preserves_order() {
        let (mailbox, wakeups) = counting_mailbox();
        let mut arena = Arena::new();
        let surface = SurfaceId(arena.insert(()));
        let sender = mailbox.sender();

        sender.terminal_event(surface, TerminalEvent::Bell);
        sender.terminal_event(surface, TerminalEvent::Render);
        assert_eq!(wakeups.load(Ordering::SeqCst), 2);
        assert_eq!(mailbox.len(), 2);

        let drained: Vec<_> = mailbox.drain().into_iter().collect();
        assert_eq!(
            drained,
            vec![
                Message::Terminal { surface, event: TerminalEvent::Bell },
                Message::Terminal { surface, event: TerminalEvent::Render },
            ]
        );
        assert!(mailbox.is_empty());
    }

    #[test]
    fn senders_work_from_other_threads() {
        let (mailbox, wakeups) = counting_mailbox();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sender = mailbox.sender();
                std::thread::spawn(move || {
                    let mut arena = Arena::new();
                    let surface = SurfaceId(arena.insert(()));
                    sender.terminal_event(surface, TerminalEvent::Bell);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(mailbox.drain().len(), 4);
        assert_eq!(wakeups.load(Ordering::SeqCst), 4);
    }
}
