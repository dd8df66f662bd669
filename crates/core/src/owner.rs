//! Owner-thread state cell.
//!
//! Every component keeps its mutable state in an `OwnerCell`. Operations
//! run against the state through `run`. An operation requested while
//! another one is running on the same cell (a listener reacting to an event
//! the running operation raised) is queued and executed, in request order,
//! as soon as the running operation returns. Nothing ever observes the state
//! half-way through an operation.

use crate::error::{Error, Result};
use crate::fault::{panic_on_fault, FaultHandler};
use std::cell::RefCell;
use std::collections::VecDeque;

type PendingOp<S> = Box<dyn FnOnce(&mut S) -> Result<()>>;

/// Serializes operations on a component's state.
pub struct OwnerCell<S> {
    state: RefCell<S>,
    pending: RefCell<VecDeque<PendingOp<S>>>,
    fault: RefCell<FaultHandler>,
}

impl<S> OwnerCell<S> {
    /// Wraps `state` with the panicking fault handler.
    pub fn new(state: S) -> Self {
        Self {
            state: RefCell::new(state),
            pending: RefCell::new(VecDeque::new()),
            fault: RefCell::new(panic_on_fault()),
        }
    }

    /// Runs `op` against the state.
    ///
    /// When the cell is idle `op` runs immediately and its result is
    /// returned. When the cell is busy `op` is queued, `Ok(())` is returned,
    /// and a later failure is delivered to the fault handler.
    pub fn run<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut S) -> Result<()> + 'static,
    {
        let result = {
            let Ok(mut state) = self.state.try_borrow_mut() else {
                self.pending.borrow_mut().push_back(Box::new(op));
                tracing::trace!("owner cell busy, operation deferred");
                return Ok(());
            };
            op(&mut state)
        };
        self.drain();
        result
    }

    /// Reads the state, or returns `None` while an operation is running.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.state.try_borrow().ok().map(|state| f(&state))
    }

    /// Direct access for an exclusive owner, e.g. inside `Drop`.
    pub fn get_mut(&mut self) -> &mut S {
        self.state.get_mut()
    }

    /// Returns true while an operation is running.
    pub fn is_busy(&self) -> bool {
        self.state.try_borrow_mut().is_err()
    }

    /// Number of deferred operations waiting to run.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Replaces the fault handler.
    pub fn set_fault_handler(&self, handler: FaultHandler) {
        *self.fault.borrow_mut() = handler;
    }

    /// Delivers `err` to the fault handler.
    pub fn report(&self, err: &Error) {
        let handler = self.fault.borrow().clone();
        handler(err);
    }

    /// Runs `op` and routes a failure to the fault handler. Used by event
    /// callbacks, which have nobody to return an error to.
    pub fn run_or_report<F>(&self, op: F)
    where
        F: FnOnce(&mut S) -> Result<()> + 'static,
    {
        if let Err(err) = self.run(op) {
            self.report(&err);
        }
    }

    fn drain(&self) {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(op) = next else { break };
            let outcome = match self.state.try_borrow_mut() {
                Ok(mut state) => op(&mut state),
                Err(_) => {
                    self.pending.borrow_mut().push_front(op);
                    break;
                }
            };
            if let Err(err) = outcome {
                self.report(&err);
            }
        }
    }
}
