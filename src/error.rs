use thiserror::Error;

use crate::category::Category;

/// The error type returned by [`crate::TryCatcher::execute`].
///
/// Failures raised by the try block are never returned here: they are caught and
/// routed to a catch block. Only failures the dispatcher deliberately does not catch
/// surface through this type, so bugs in handler code stay visible.
///
/// The type parameter `E` is the caller's failure type, the same one the try,
/// catch and finally blocks return.
///
/// # Examples
///
/// ```rust
/// use trycatcher::{Category, Error, TryCatcher};
///
/// const BROKEN: Category = Category::new("Broken", &Category::ANY);
///
/// let mut catcher = TryCatcher::of(|| Err(BROKEN))
///     .when(BROKEN, |failure| Err(failure));
///
/// match catcher.execute() {
///     Err(Error::Catch { category, failure }) => {
///         assert_eq!(category, BROKEN);
///         assert_eq!(failure, BROKEN);
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error<E> {
    /// `execute` was called before a try block was registered.
    ///
    /// The dispatcher stays unexecuted, so a try block can still be supplied
    /// with [`crate::TryCatcher::try_block`] and execution retried.
    #[error("No try block registered")]
    MissingTryBlock,

    /// The catch block selected for a failure raised its own failure.
    ///
    /// # Fields
    ///
    /// * `category` - The registered category the original failure was routed by
    /// * `failure` - The failure returned by the catch block
    #[error("Catch block for '{category}' failed: {failure}")]
    Catch {
        /// The category whose handler was invoked
        category: Category,
        /// The failure returned by the handler
        failure: E,
    },

    /// The finally block raised a failure.
    ///
    /// Takes precedence over a [`Error::Catch`] raised in the same execution.
    #[error("Finally block failed: {0}")]
    Finally(E),
}

impl<E> Error<E> {
    /// Consumes the error and returns the caller's failure value, if it carries one.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Error::MissingTryBlock => None,
            Error::Catch { failure, .. } | Error::Finally(failure) => Some(failure),
        }
    }
}
