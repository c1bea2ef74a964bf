//! Per-run search control: evaluation budget, cancellation, and the
//! best-so-far ledger.
//!
//! argmin drops its state when a run returns an error, so the adapter records
//! every successful evaluation here. When the run is stopped by the budget,
//! a cancellation request, or a stalled line search, [`minimize`](super::minimize)
//! rebuilds the outcome from this ledger instead of failing.
//!
//! argmin's L-BFGS folds line-search errors into a `SolverExit` termination,
//! so the first error the adapter hands to argmin is also kept here and takes
//! precedence over whatever the run reports.
//!
//! Costs evaluated before argmin starts (the Nelder–Mead vertices) are queued
//! as primed values and replayed, without charging the budget again, when the
//! solver asks for them.
//!
//! One `SearchControl` belongs to exactly one run and is not `Sync`.
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use argmin::core::{Error, KV, State, observers::Observe};

use crate::optimization::{
    errors::{OptError, OptResult},
    objective_optimizer::types::{Cost, Theta},
};

#[derive(Debug)]
pub struct SearchControl<'c> {
    max_evals: Option<u64>,
    cancel: Option<&'c AtomicBool>,
    evaluations: Cell<u64>,
    best: RefCell<Option<(Theta, Cost)>>,
    failure: RefCell<Option<OptError>>,
    primed: RefCell<VecDeque<(Theta, Cost)>>,
    iterations: Arc<AtomicU64>,
}

impl<'c> SearchControl<'c> {
    pub fn new(max_evals: Option<u64>, cancel: Option<&'c AtomicBool>) -> Self {
        SearchControl {
            max_evals,
            cancel,
            evaluations: Cell::new(0),
            best: RefCell::new(None),
            failure: RefCell::new(None),
            primed: RefCell::new(VecDeque::new()),
            iterations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Gate one objective evaluation. Polls the cancellation flag, then
    /// charges the budget.
    ///
    /// # Errors
    /// - [`OptError::Cancelled`] once the flag is set.
    /// - [`OptError::EvaluationBudgetExhausted`] when `max_evals` evaluations
    ///   have already been made.
    pub fn admit(&self) -> OptResult<()> {
        self.poll_cancel()?;
        let used = self.evaluations.get();
        if let Some(max_evals) = self.max_evals {
            if used >= max_evals {
                return Err(OptError::EvaluationBudgetExhausted { max_evals });
            }
        }
        self.evaluations.set(used + 1);
        Ok(())
    }

    /// # Errors
    /// [`OptError::Cancelled`] once the flag is set.
    pub fn poll_cancel(&self) -> OptResult<()> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(OptError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Offer an evaluated point to the ledger; kept if strictly better.
    pub fn record(&self, theta: &Theta, cost: Cost) {
        let mut best = self.best.borrow_mut();
        let improves = match best.as_ref() {
            Some((_, best_cost)) => cost < *best_cost,
            None => true,
        };
        if improves {
            *best = Some((theta.clone(), cost));
        }
    }

    /// Keep `err` unless an earlier failure is already on record.
    pub fn note_failure(&self, err: &OptError) {
        let mut slot = self.failure.borrow_mut();
        if slot.is_none() {
            *slot = Some(err.clone());
        }
    }

    /// First error raised to the solver during this run, if any.
    pub fn take_failure(&self) -> Option<OptError> {
        self.failure.borrow_mut().take()
    }

    /// Queue a cost evaluated outside the solver for [`take_primed`](Self::take_primed).
    pub fn prime(&self, theta: &Theta, cost: Cost) {
        self.primed.borrow_mut().push_back((theta.clone(), cost));
    }

    /// Pop the oldest primed cost if it was evaluated at exactly `theta`.
    pub fn take_primed(&self, theta: &Theta) -> Option<Cost> {
        let mut primed = self.primed.borrow_mut();
        match primed.front() {
            Some((p, _)) if p == theta => primed.pop_front().map(|(_, cost)| cost),
            _ => None,
        }
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    /// Best point seen so far, leaving the ledger empty.
    pub fn take_best(&self) -> Option<(Theta, Cost)> {
        self.best.borrow_mut().take()
    }

    /// Observer that keeps this control's iteration count current.
    pub fn iteration_counter(&self) -> IterationCounter {
        IterationCounter { count: Arc::clone(&self.iterations) }
    }
}

/// argmin observer counting completed iterations.
#[derive(Debug, Clone)]
pub struct IterationCounter {
    count: Arc<AtomicU64>,
}

impl<I: State> Observe<I> for IterationCounter {
    fn observe_iter(&mut self, _state: &I, _kv: &KV) -> Result<(), Error> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
