//! Confirmed batch mutations.
//!
//! A batch applies one remote mutation per selected item, strictly in order and
//! one at a time. The first failure stops the batch: later items are never
//! attempted and the caller gets a single outcome describing the run.
//!
//! Refreshing the view, publishing alerts and closing the dialog are left to
//! the caller (see [`crate::workflows`]).

use std::future::Future;
use std::ops::Index;
use tracing::{Instrument, Level, event, info_span};

/// Ordered, read-only set of entities chosen for a bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T> {
    items: Vec<T>,
}

impl<T> Selection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<T>> for Selection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for Selection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> Index<usize> for Selection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a Selection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Result of a single mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<E> {
    Success,
    Failure(E),
}

impl<E> MutationOutcome<E> {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Success)
    }
}

impl<E> From<Result<(), E>> for MutationOutcome<E> {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => MutationOutcome::Success,
            Err(cause) => MutationOutcome::Failure(cause),
        }
    }
}

/// The mutation that stopped a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure<E> {
    /// Position of the failing item in the selection
    pub index: usize,
    pub cause: E,
}

/// Aggregate outcome of one batch run.
///
/// A batch is successful iff it holds no failure; there is no way to build a
/// successful result that also carries a cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult<E> {
    succeeded: usize,
    failure: Option<BatchFailure<E>>,
}

impl<E> BatchResult<E> {
    fn start() -> Self {
        Self {
            succeeded: 0,
            failure: None,
        }
    }

    fn record(
        mut self,
        index: usize,
        outcome: MutationOutcome<E>,
    ) -> std::ops::ControlFlow<Self, Self> {
        use std::ops::ControlFlow;

        match outcome {
            MutationOutcome::Success => {
                self.succeeded += 1;
                ControlFlow::Continue(self)
            }
            MutationOutcome::Failure(cause) => {
                self.failure = Some(BatchFailure { index, cause });
                ControlFlow::Break(self)
            }
        }
    }

    /// Whether every item of the selection was mutated
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Number of items mutated before the batch finished or stopped
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of mutation calls issued, including the failing one
    pub fn attempted(&self) -> usize {
        self.succeeded + usize::from(self.failure.is_some())
    }

    pub fn failure(&self) -> Option<&BatchFailure<E>> {
        self.failure.as_ref()
    }

    pub fn cause(&self) -> Option<&E> {
        self.failure.as_ref().map(|failure| &failure.cause)
    }

    /// Collapses the run into the single outcome shown to the user: the
    /// processed count on success, or the failure that stopped the batch.
    pub fn into_outcome(self) -> Result<usize, BatchFailure<E>> {
        match self.failure {
            None => Ok(self.succeeded),
            Some(failure) => Err(failure),
        }
    }
}

/// Runs `mutate` over `selection` in order, awaiting each call before the next.
///
/// Stops at the first failure. Items after the failing one are never passed to
/// `mutate`. Nothing is retried.
pub async fn run_batch<'a, T, E, F, Fut>(
    selection: &'a Selection<T>,
    mut mutate: F,
) -> BatchResult<E>
where
    F: FnMut(&'a T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let span = info_span!("batch.run", size = selection.len());

    async move {
        let mut result = BatchResult::start();

        for (index, item) in selection.iter().enumerate() {
            let outcome = MutationOutcome::from(mutate(item).await);
            if let MutationOutcome::Failure(cause) = &outcome {
                event!(
                    Level::WARN,
                    index,
                    already_applied = result.succeeded,
                    skipped = selection.len() - index - 1,
                    error = %cause,
                    "batch stopped at first failed mutation"
                );
            } else {
                event!(Level::DEBUG, index, "mutation applied");
            }

            result = match result.record(index, outcome) {
                std::ops::ControlFlow::Continue(next) => next,
                std::ops::ControlFlow::Break(stopped) => return stopped,
            };
        }

        event!(Level::DEBUG, succeeded = result.succeeded, "batch completed");
        result
    }
    .instrument(span)
    .await
}

/// Callback form of [`run_batch`]: hands the outcome to `on_complete` once.
pub async fn run_batch_with<'a, T, E, F, Fut, C>(
    selection: &'a Selection<T>,
    mutate: F,
    on_complete: C,
)
where
    F: FnMut(&'a T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
    C: FnOnce(BatchResult<E>),
{
    on_complete(run_batch(selection, mutate).await);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    async fn record_calls(
        selection: &Selection<&'static str>,
        failing: &[(&str, &'static str)],
    ) -> (Vec<&'static str>, BatchResult<&'static str>) {
        let calls = RefCell::new(Vec::new());
        let result = run_batch(selection, |item: &&'static str| {
            calls.borrow_mut().push(*item);
            let failure = failing.iter().find(|(name, _)| name == item).map(|(_, cause)| *cause);
            async move {
                match failure {
                    Some(cause) => Err(cause),
                    None => Ok(()),
                }
            }
        })
        .await;
        (calls.into_inner(), result)
    }

    #[tokio::test]
    async fn all_items_succeed_in_order() {
        let selection = Selection::from(vec!["a", "b", "c", "d"]);
        let (calls, result) = record_calls(&selection, &[]).await;

        assert_eq!(calls, vec!["a", "b", "c", "d"]);
        assert!(result.is_success());
        assert_eq!(result.into_outcome(), Ok(4));
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let selection = Selection::from(vec!["A", "B", "C"]);
        let (calls, result) = record_calls(&selection, &[("B", "conflict")]).await;

        assert_eq!(calls, vec!["A", "B"]);
        assert!(!result.is_success());
        assert_eq!(result.succeeded(), 1);
        assert_eq!(result.attempted(), 2);
        assert_eq!(result.cause(), Some(&"conflict"));
        assert_eq!(
            result.into_outcome(),
            Err(BatchFailure { index: 1, cause: "conflict" })
        );
    }

    #[tokio::test]
    async fn later_failures_are_never_reached() {
        let selection = Selection::from(vec!["A", "B", "C"]);
        let failing = [("A", "forbidden"), ("C", "conflict")];
        let (calls, result) = record_calls(&selection, &failing).await;

        assert_eq!(calls, vec!["A"]);
        assert_eq!(result.cause(), Some(&"forbidden"));
        assert_eq!(result.succeeded(), 0);
    }

    #[tokio::test]
    async fn empty_selection_is_a_success_of_zero() {
        let selection: Selection<&'static str> = Selection::empty();
        for _ in 0..2 {
            let (calls, result) = record_calls(&selection, &[]).await;
            assert!(calls.is_empty());
            assert_eq!(result.into_outcome(), Ok(0));
        }
    }

    #[tokio::test]
    async fn callback_receives_result_once() {
        let selection = Selection::from(vec![1, 2, 3]);
        let mut reported = Vec::new();

        run_batch_with(
            &selection,
            |n: &i32| {
                let n = *n;
                async move { if n == 3 { Err(format!("item {} rejected", n)) } else { Ok(()) } }
            },
            |result| reported.push(result),
        )
        .await;

        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].succeeded(), 2);
        assert_eq!(reported[0].failure().map(|f| f.index), Some(2));
    }

    #[test]
    fn mutation_outcome_from_result() {
        assert!(MutationOutcome::<String>::from(Ok(())).is_success());
        assert_eq!(
            MutationOutcome::from(Err::<(), _>("boom")),
            MutationOutcome::Failure("boom")
        );
    }
}
