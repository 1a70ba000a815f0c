/// Ticket identifying one scheduled redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RedrawTicket(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Scheduled(RedrawTicket),
}

/// Coalescing redraw scheduler.
///
/// At most one redraw is pending at a time. Scheduling while one is pending cancels the older
/// ticket and issues a fresh one, so a burst of triggers between two display ticks produces a
/// single redraw.
#[derive(Debug)]
pub(crate) struct RedrawScheduler {
    state: State,
    next: u64,
    cancelled: u64,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self {
            state: State::Idle,
            next: 0,
            cancelled: 0,
        }
    }
}

impl RedrawScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Request a redraw on the next tick, superseding any pending one.
    pub(crate) fn schedule(&mut self) -> RedrawTicket {
        if let State::Scheduled(old) = self.state {
            self.cancelled += 1;
            tracing::debug!(superseded = old.0, "coalescing pending redraw");
        }
        let ticket = RedrawTicket(self.next);
        self.next += 1;
        self.state = State::Scheduled(ticket);
        ticket
    }

    /// Consume the pending redraw, returning to idle.
    pub(crate) fn take_due(&mut self) -> Option<RedrawTicket> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Scheduled(t) => Some(t),
            State::Idle => None,
        }
    }

    /// Drop the pending redraw without running it.
    pub(crate) fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        if was_pending {
            self.cancelled += 1;
        }
        self.state = State::Idle;
        was_pending
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self.state, State::Scheduled(_))
    }

    /// Redraws superseded or cancelled before they ran.
    pub(crate) fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scheduler.rs"]
mod tests;
