//! Calling into the host.

use std::panic::{self, AssertUnwindSafe};

use actions::{Action, Target};

use crate::Host;

/// Invokes the host listener synchronously. A panic in host code is
/// contained here and reported as "not handled".
#[derive(Clone, Copy)]
pub struct Dispatcher<'a> {
    host: &'a dyn Host,
}

impl<'a> Dispatcher<'a> {
    pub fn new(host: &'a dyn Host) -> Self {
        Self { host }
    }

    pub fn dispatch(&self, target: Target, action: &Action) -> bool {
        tracing::debug!(tag = %action.tag(), %target, "Dispatching action");
        let handled = self.call("action", false, |host| host.action(target, action));
        if !handled {
            tracing::trace!(tag = %action.tag(), "Action not handled by host");
        }
        handled
    }

    /// Run any host callback with the same panic containment.
    pub fn call<R>(&self, what: &str, fallback: R, f: impl FnOnce(&dyn Host) -> R) -> R {
        match panic::catch_unwind(AssertUnwindSafe(|| f(self.host))) {
            Ok(result) => result,
            Err(payload) => {
                let message = util::panic_message(payload.as_ref());
                tracing::error!(callback = what, "Host panicked: {}", message);
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockHost;
    use actions::{ActionTag, SurfaceId};
    use clipboard::{ClipboardContent, ClipboardKind, RequestId, RequestKind};
    use mockall::predicate::eq;
    use tracing_test::traced_test;

    #[test]
    fn returns_host_result() {
        let mut host = MockHost::new();
        host.expect_action()
            .with(eq(Target::App), eq(Action::Quit))
            .times(1)
            .return_const(true);
        host.expect_action()
            .withf(|_, action| action.tag() == ActionTag::NewTab)
            .times(1)
            .return_const(false);

        let dispatcher = Dispatcher::new(&host);
        assert!(dispatcher.dispatch(Target::App, &Action::Quit));
        assert!(!dispatcher.dispatch(Target::App, &Action::NewTab));
    }

    struct PanickingHost;

    impl Host for PanickingHost {
        fn action(&self, _: Target, _: &Action) -> bool {
            panic!("listener exploded")
        }

        fn read_clipboard(&self, _: SurfaceId, _: ClipboardKind, _: RequestId) -> bool {
            panic!("read exploded")
        }

        fn confirm_read_clipboard(&self, _: SurfaceId, _: &str, _: RequestId, _: RequestKind) {}

        fn write_clipboard(
            &self,
            _: SurfaceId,
            _: ClipboardKind,
            _: &[ClipboardContent],
            _: Option<RequestId>,
        ) {
        }

        fn close_surface(&self, _: SurfaceId, _: bool) {}
    }

    #[traced_test]
    #[test]
    fn host_panic_is_not_handled() {
        let host = PanickingHost;
        let dispatcher = Dispatcher::new(&host);
        assert!(!dispatcher.dispatch(Target::App, &Action::RingBell));
        assert!(logs_contain("listener exploded"));
    }

    #[test]
    fn call_falls_back_on_panic() {
        let dispatcher = Dispatcher::new(&PanickingHost);
        let mut arena = collections::Arena::new();
        let surface = SurfaceId(arena.insert(()));
        let started = dispatcher.call("read_clipboard", false, |host| {
            host.read_clipboard(surface, ClipboardKind::Standard, RequestId::from_raw(1).unwrap())
        });
        assert!(!started);
    }
}
