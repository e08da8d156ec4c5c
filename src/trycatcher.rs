//! One-shot try/catch/finally execution.
//!
//! [`TryCatcher`] holds a try block, a [`CatchMap`] of category handlers and an
//! optional finally block. Calling [`TryCatcher::execute`] runs the try block once,
//! routes any failure it returns to the most specific matching handler, and then
//! runs the finally block.
//!
//! # Execution Order
//!
//! 1. The dispatcher is marked [`ExecutionState::Executed`].
//! 2. The try block runs.
//! 3. On failure, the failure's [`Category`] is resolved through the catch map and
//!    the matching handler is called with the failure value.
//! 4. The finally block runs, even if the handler failed or panicked.
//!
//! Handler and finally failures are not caught; they are returned from `execute`
//! wrapped in [`Error`]. Panics are not caught either, but the finally block runs
//! while they unwind.
//!
//! # Examples
//!
//! ```rust
//! use std::cell::RefCell;
//! use trycatcher::{Category, TryCatcher};
//!
//! const IO_FAILURE: Category = Category::new("IOFailure", &Category::ANY);
//! const FILE_NOT_FOUND: Category = Category::new("FileNotFound", &IO_FAILURE);
//!
//! let output = RefCell::new(Vec::new());
//!
//! TryCatcher::of(|| Err(FILE_NOT_FOUND))
//!     .when(IO_FAILURE, |_| {
//!         output.borrow_mut().push("io");
//!         Ok(())
//!     })
//!     .default_catch(|_| {
//!         output.borrow_mut().push("any");
//!         Ok(())
//!     })
//!     .execute()?;
//!
//! assert_eq!(*output.borrow(), vec!["io"]);
//! # Ok::<(), trycatcher::Error<Category>>(())
//! ```

use std::{fmt, rc::Rc};

use strum::{Display, IntoStaticStr};

use crate::{
    catchmap::{CatchBlock, CatchMap},
    category::{Categorized, Category},
    Error, Result,
};

/// The unit of work whose failures are managed. Consumed by the first execution.
pub type TryBlock<'a, E> = Box<dyn FnOnce() -> std::result::Result<(), E> + 'a>;

/// Cleanup run after the try block and any handler, whatever their outcome.
pub type FinallyBlock<'a, E> = Box<dyn FnOnce() -> std::result::Result<(), E> + 'a>;

/// Lifecycle of a [`TryCatcher`]. The only transition is `Unexecuted` to `Executed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ExecutionState {
    /// The try block has not run yet.
    #[default]
    Unexecuted,
    /// The try block has run; further `execute` calls do nothing.
    Executed,
}

/// Fluent try/catch/finally dispatcher.
///
/// Registration methods consume and return the dispatcher so they chain from a
/// constructor. `execute` borrows it mutably and runs the blocks at most once.
///
/// The lifetime `'a` lets blocks borrow from the caller's stack. The type parameter
/// `E` is the failure type shared by all blocks; it must implement [`Categorized`]
/// for routing.
///
/// A `TryCatcher` is intended for a single caller and is neither `Send` nor `Sync`.
pub struct TryCatcher<'a, E> {
    state: ExecutionState,
    try_block: Option<TryBlock<'a, E>>,
    finally_block: Option<FinallyBlock<'a, E>>,
    catch_map: CatchMap<'a, E>,
}

impl<'a, E> TryCatcher<'a, E> {
    /// Creates a dispatcher with no try block and a no-op default handler.
    #[must_use]
    pub fn new() -> Self {
        TryCatcher {
            state: ExecutionState::Unexecuted,
            try_block: None,
            finally_block: None,
            catch_map: CatchMap::new(),
        }
    }

    /// Creates a dispatcher for `try_block`.
    #[must_use]
    pub fn with_try<T>(try_block: T) -> Self
    where
        T: FnOnce() -> std::result::Result<(), E> + 'a,
    {
        Self::new().try_block(try_block)
    }

    /// Creates a dispatcher for `try_block` whose [`Category::ANY`] handler is
    /// `default_catch`.
    #[must_use]
    pub fn with_default<T, C>(try_block: T, default_catch: C) -> Self
    where
        T: FnOnce() -> std::result::Result<(), E> + 'a,
        C: Fn(E) -> std::result::Result<(), E> + 'a,
    {
        Self::with_try(try_block).default_catch(default_catch)
    }

    /// Shorthand for [`TryCatcher::with_try`].
    #[must_use]
    pub fn of<T>(try_block: T) -> Self
    where
        T: FnOnce() -> std::result::Result<(), E> + 'a,
    {
        Self::with_try(try_block)
    }

    /// Shorthand for [`TryCatcher::with_default`].
    #[must_use]
    pub fn of_with_default<T, C>(try_block: T, default_catch: C) -> Self
    where
        T: FnOnce() -> std::result::Result<(), E> + 'a,
        C: Fn(E) -> std::result::Result<(), E> + 'a,
    {
        Self::with_default(try_block, default_catch)
    }

    /// Sets the try block, replacing any previous one.
    ///
    /// Has no effect on a dispatcher that has already executed.
    #[must_use]
    pub fn try_block<T>(mut self, try_block: T) -> Self
    where
        T: FnOnce() -> std::result::Result<(), E> + 'a,
    {
        self.try_block = Some(Box::new(try_block));
        self
    }

    /// Registers `action` for failures of exactly `category` and its descendants
    /// that have no more specific handler.
    ///
    /// # Arguments
    ///
    /// * `category` - The category to handle
    /// * `action` - Handler receiving the failure value
    #[must_use]
    pub fn when<C>(self, category: Category, action: C) -> Self
    where
        C: Fn(E) -> std::result::Result<(), E> + 'a,
    {
        self.catch_when(action, [category])
    }

    /// Registers one shared `action` for every category in `categories`.
    ///
    /// # Arguments
    ///
    /// * `action` - Handler receiving the failure value
    /// * `categories` - The categories the handler is registered for
    #[must_use]
    pub fn catch_when<C, I>(mut self, action: C, categories: I) -> Self
    where
        C: Fn(E) -> std::result::Result<(), E> + 'a,
        I: IntoIterator<Item = Category>,
    {
        let block: CatchBlock<'a, E> = Rc::new(action);
        for category in categories {
            self.catch_map.put(category, Rc::clone(&block));
        }
        self
    }

    /// Replaces the [`Category::ANY`] handler.
    #[must_use]
    pub fn default_catch<C>(self, action: C) -> Self
    where
        C: Fn(E) -> std::result::Result<(), E> + 'a,
    {
        self.when(Category::ANY, action)
    }

    /// Sets the finally block, replacing any previous one.
    #[must_use]
    pub fn finally_block<F>(mut self, action: F) -> Self
    where
        F: FnOnce() -> std::result::Result<(), E> + 'a,
    {
        self.finally_block = Some(Box::new(action));
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Returns `true` once the try block has run.
    #[must_use]
    pub fn is_executed(&self) -> bool {
        self.state == ExecutionState::Executed
    }

    /// Read-only view of the registered handlers.
    #[must_use]
    pub fn catch_map(&self) -> &CatchMap<'a, E> {
        &self.catch_map
    }

    /// Executes `other` and returns it, for running independent dispatchers in
    /// sequence. `self` is not modified.
    ///
    /// # Errors
    ///
    /// Whatever `other.execute()` returns.
    pub fn then<'o, 'b, F: Categorized>(
        &self,
        other: &'o mut TryCatcher<'b, F>,
    ) -> Result<&'o mut TryCatcher<'b, F>, F> {
        other.execute()
    }
}

impl<'a, E: Categorized> TryCatcher<'a, E> {
    /// Runs the try block, dispatches its failure and runs the finally block.
    ///
    /// Only the first call does anything; later calls return `Ok(self)` untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingTryBlock`] if no try block was registered. The dispatcher
    ///   stays unexecuted and nothing else runs.
    /// - [`Error::Catch`] if the selected handler returned a failure.
    /// - [`Error::Finally`] if the finally block returned a failure. This wins over
    ///   a handler failure from the same run.
    ///
    /// In every case except `MissingTryBlock` the dispatcher is marked executed.
    ///
    /// # Panics
    ///
    /// A panic in the try block or a catch block is not caught. The finally block
    /// still runs while the panic unwinds, and the dispatcher is already marked
    /// executed, so a later call is a no-op.
    pub fn execute(&mut self) -> Result<&mut Self, E> {
        if self.is_executed() {
            tracing::trace!("try block already executed, skipping");
            return Ok(self);
        }

        let try_block = self.try_block.take().ok_or(Error::MissingTryBlock)?;
        self.state = ExecutionState::Executed;

        let finally = FinallyGuard {
            block: self.finally_block.take(),
        };

        let outcome = match try_block() {
            Ok(()) => Ok(()),
            Err(failure) => self.dispatch(failure),
        };

        finally.complete().map_err(Error::Finally)?;
        outcome?;
        Ok(self)
    }

    fn dispatch(&self, failure: E) -> Result<(), E> {
        let raised = failure.category();
        let resolved = self
            .catch_map
            .resolve(raised)
            .or_else(|| self.catch_map.resolve(Category::ANY));

        let Some((matched, block)) = resolved else {
            tracing::debug!(%raised, "no catch block resolved, ignoring failure");
            return Ok(());
        };

        tracing::debug!(%raised, %matched, "routing failure to catch block");
        block(failure).map_err(|failure| Error::Catch {
            category: matched,
            failure,
        })
    }
}

/// Holds the finally block for one execution and runs it exactly once, either
/// through [`FinallyGuard::complete`] or on drop while a panic unwinds.
struct FinallyGuard<'a, E> {
    block: Option<FinallyBlock<'a, E>>,
}

impl<E> FinallyGuard<'_, E> {
    fn complete(mut self) -> std::result::Result<(), E> {
        match self.block.take() {
            Some(block) => block(),
            None => Ok(()),
        }
    }
}

impl<E> Drop for FinallyGuard<'_, E> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            // The unwinding panic takes precedence over a finally failure.
            if block().is_err() {
                tracing::debug!("finally block failed while unwinding");
            }
        }
    }
}

impl<E> Default for TryCatcher<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for TryCatcher<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryCatcher")
            .field("state", &self.state)
            .field("has_try_block", &self.try_block.is_some())
            .field("has_finally_block", &self.finally_block.is_some())
            .field("catch_map", &self.catch_map)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        panic::{self, AssertUnwindSafe},
    };

    use super::*;

    const IO: Category = Category::new("IOFailure", &Category::ANY);
    const NOT_FOUND: Category = Category::new("FileNotFound", &IO);
    const PARSE: Category = Category::new("ParseError", &Category::ANY);

    #[test]
    fn test_new_is_unexecuted() {
        let catcher: TryCatcher<Category> = TryCatcher::new();
        assert_eq!(catcher.state(), ExecutionState::Unexecuted);
        assert!(!catcher.is_executed());
        assert!(catcher.catch_map().contains(Category::ANY));
    }

    #[test]
    fn test_execute_runs_once() {
        let runs = Cell::new(0);
        let mut catcher = TryCatcher::<Category>::of(|| {
            runs.set(runs.get() + 1);
            Ok(())
        });

        catcher.execute().unwrap();
        catcher.execute().unwrap();
        catcher.execute().unwrap();

        assert_eq!(runs.get(), 1);
        assert_eq!(catcher.state(), ExecutionState::Executed);
    }

    #[test]
    fn test_missing_try_block() {
        let finally_runs = Cell::new(0);
        let mut catcher = TryCatcher::<Category>::new().finally_block(|| {
            finally_runs.set(finally_runs.get() + 1);
            Ok(())
        });

        assert!(matches!(catcher.execute(), Err(Error::MissingTryBlock)));
        assert!(!catcher.is_executed());
        assert_eq!(finally_runs.get(), 0);
    }

    #[test]
    fn test_try_block_after_new() {
        let ran = Cell::new(false);
        let mut catcher = TryCatcher::<Category>::new().try_block(|| {
            ran.set(true);
            Ok(())
        });

        catcher.execute().unwrap();
        assert!(ran.get());
    }

    #[test]
    fn test_most_specific_handler_wins() {
        let log = RefCell::new(Vec::new());
        TryCatcher::of(|| Err(NOT_FOUND))
            .when(IO, |_| {
                log.borrow_mut().push("io");
                Ok(())
            })
            .when(NOT_FOUND, |_| {
                log.borrow_mut().push("not-found");
                Ok(())
            })
            .execute()
            .unwrap();

        assert_eq!(*log.borrow(), vec!["not-found"]);
    }

    #[test]
    fn test_handler_receives_failure() {
        let seen = Cell::new(None);
        TryCatcher::of(|| Err(PARSE))
            .default_catch(|failure| {
                seen.set(Some(failure));
                Ok(())
            })
            .execute()
            .unwrap();

        assert_eq!(seen.get(), Some(PARSE));
    }

    #[test]
    fn test_catch_when_shares_handler() {
        let hits = Cell::new(0);
        let mut first = TryCatcher::of(|| Err(PARSE)).catch_when(
            |_| {
                hits.set(hits.get() + 1);
                Ok(())
            },
            [PARSE, NOT_FOUND],
        );
        first.execute().unwrap();

        assert_eq!(hits.get(), 1);
        assert!(first.catch_map().contains(PARSE));
        assert!(first.catch_map().contains(NOT_FOUND));
        assert!(!first.catch_map().contains(IO));
    }

    #[test]
    fn test_handler_failure_still_runs_finally() {
        let finally_ran = Cell::new(false);
        let mut catcher = TryCatcher::of(|| Err(IO))
            .when(IO, |_| Err(PARSE))
            .finally_block(|| {
                finally_ran.set(true);
                Ok(())
            });

        match catcher.execute() {
            Err(Error::Catch { category, failure }) => {
                assert_eq!(category, IO);
                assert_eq!(failure, PARSE);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(finally_ran.get());
        assert!(catcher.is_executed());
    }

    #[test]
    fn test_finally_failure_wins() {
        let mut catcher = TryCatcher::of(|| Err(IO))
            .default_catch(|_| Err(PARSE))
            .finally_block(|| Err(NOT_FOUND));

        match catcher.execute() {
            Err(Error::Finally(failure)) => assert_eq!(failure, NOT_FOUND),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_failure_is_ignored() {
        let finally_ran = Cell::new(false);
        let mut catcher = TryCatcher::of(|| Err(PARSE)).finally_block(|| {
            finally_ran.set(true);
            Ok(())
        });
        catcher.catch_map = CatchMap::without_default();

        catcher.execute().unwrap();
        assert!(finally_ran.get());
        assert!(catcher.is_executed());
    }

    #[test]
    fn test_then_returns_other() {
        let first = TryCatcher::<Category>::of(|| Ok(()));
        let ran = Cell::new(false);
        let mut second = TryCatcher::<Category>::of(|| {
            ran.set(true);
            Ok(())
        });

        let chained = first.then(&mut second).unwrap();
        assert!(chained.is_executed());
        assert!(ran.get());
        assert!(!first.is_executed());
    }

    #[test]
    fn test_finally_runs_when_handler_panics() {
        let finally_ran = Cell::new(false);
        let mut catcher = TryCatcher::of(|| Err(PARSE))
            .default_catch(|_| panic!("handler bug"))
            .finally_block(|| {
                finally_ran.set(true);
                Ok(())
            });

        let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = catcher.execute();
        }));

        assert!(unwound.is_err());
        assert!(finally_ran.get());
        assert!(catcher.is_executed());
    }

    #[test]
    fn test_panicking_try_block_runs_once() {
        let runs = Cell::new(0);
        let finally_runs = Cell::new(0);
        let mut catcher = TryCatcher::<Category>::of(|| {
            runs.set(runs.get() + 1);
            panic!("try bug")
        })
        .finally_block(|| {
            finally_runs.set(finally_runs.get() + 1);
            Ok(())
        });

        let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = catcher.execute();
        }));
        assert!(unwound.is_err());
        assert!(catcher.is_executed());

        assert!(catcher.execute().is_ok());
        assert_eq!(runs.get(), 1);
        assert_eq!(finally_runs.get(), 1);
    }

    #[test]
    fn test_then_does_not_need_categorized_self() {
        struct Opaque;

        let first: TryCatcher<Opaque> = TryCatcher::of(|| Ok(()));
        let mut second = TryCatcher::<Category>::of(|| Ok(()));

        assert!(first.then(&mut second).unwrap().is_executed());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ExecutionState::Unexecuted.to_string(), "Unexecuted");
        let name: &'static str = ExecutionState::Executed.into();
        assert_eq!(name, "Executed");
    }

    #[test]
    fn test_debug_reports_registrations() {
        let catcher = TryCatcher::<Category>::of(|| Ok(())).when(IO, |_| Ok(()));
        let debug = format!("{catcher:?}");
        assert!(debug.contains("has_try_block: true"));
        assert!(debug.contains("has_finally_block: false"));
        assert!(debug.contains("Unexecuted"));
    }
}
