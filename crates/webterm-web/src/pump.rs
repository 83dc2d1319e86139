#![forbid(unsafe_code)]

//! Re-entrancy safe dispatcher for callback-driven hosts.
//!
//! Browser callbacks can fire while the controller is still inside `dispatch`
//! (a socket's `open` handler scheduled from within `Transport::open`, a DOM
//! event raised by a chrome update). Collaborators therefore never call the
//! controller directly: they push into an [`EventPump`], and whoever holds the
//! controller borrow drains the queue before returning.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::{debug, trace};
use webterm_core::{Dispatch, SessionController, SessionEvent, SessionHost};

pub struct EventPump<H: SessionHost> {
    session: RefCell<Option<SessionController<H>>>,
    queue: RefCell<VecDeque<SessionEvent>>,
    shut_down: Cell<bool>,
}

impl<H: SessionHost> Default for EventPump<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: SessionHost> EventPump<H> {
    /// An empty pump. Events queue up until [`EventPump::install`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: RefCell::new(None),
            queue: RefCell::new(VecDeque::new()),
            shut_down: Cell::new(false),
        }
    }

    /// Hand over the controller and drain anything queued meanwhile.
    pub fn install(&self, session: SessionController<H>) {
        if let Ok(mut slot) = self.session.try_borrow_mut() {
            *slot = Some(session);
        } else {
            debug!("install while dispatching; controller discarded");
            return;
        }
        self.drain();
    }

    /// Queue an event and run it now unless a dispatch is already in progress.
    pub fn dispatch(&self, event: SessionEvent) {
        if self.shut_down.get() {
            trace!(kind = event.kind(), "pump shut down; event dropped");
            return;
        }
        self.queue.borrow_mut().push_back(event);
        self.drain();
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.get()
    }

    /// Queued events not yet dispatched.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run `f` against the controller, if installed and not busy.
    pub fn with_session<R>(&self, f: impl FnOnce(&SessionController<H>) -> R) -> Option<R> {
        let slot = self.session.try_borrow().ok()?;
        slot.as_ref().map(f)
    }

    fn drain(&self) {
        let Ok(mut slot) = self.session.try_borrow_mut() else {
            // The outer dispatch picks the event up.
            return;
        };
        let Some(session) = slot.as_mut() else {
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            if session.dispatch(event) == Dispatch::Shutdown {
                self.shut_down.set(true);
                self.queue.borrow_mut().clear();
                break;
            }
        }
    }
}
