use tokio::task::AbortHandle;

/// The single outstanding deferred trim of a pool.
///
/// Each armed timer gets a fresh ticket. Cancelling aborts the task and
/// forgets the ticket, so a timer task that already woke up before the abort
/// landed still sees it was superseded and bails out.
#[derive(Debug, Default)]
pub(crate) struct TrimTimer {
    next_ticket: u64,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    ticket: u64,
    handle: AbortHandle,
}

impl TrimTimer {
    /// Reserve the ticket for the next timer. Cancels the current one.
    pub(crate) fn reserve(&mut self) -> u64 {
        self.cancel();
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.next_ticket
    }

    /// Record the task armed for `ticket`.
    pub(crate) fn arm(&mut self, ticket: u64, handle: AbortHandle) {
        tracing::trace!(ticket, "deferred trim armed");
        self.pending = Some(Pending { ticket, handle });
    }

    /// Cancel the pending timer, if any. Returns whether one was pending.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                tracing::trace!(ticket = pending.ticket, "deferred trim cancelled");
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Claim the timer for a task that just woke up. Returns `false` if the
    /// ticket was cancelled or superseded in the meantime.
    pub(crate) fn fire(&mut self, ticket: u64) -> bool {
        if self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            tracing::trace!(ticket, "deferred trim fired");
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
