// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # trycatcher
//!
//! Fluent try/catch/finally dispatch over a hierarchy of error categories.
//!
//! `trycatcher` lets a caller register a unit of work (the try block), handlers keyed
//! by error [`Category`] (catch blocks) and a cleanup action (the finally block), and
//! then execute them exactly once. A failure returned by the try block is routed to
//! the handler registered for its most specific ancestor category, falling back to
//! [`Category::ANY`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use trycatcher::prelude::*;
//!
//! const IO_FAILURE: Category = Category::new("IOFailure", &Category::ANY);
//! const FILE_NOT_FOUND: Category = Category::new("FileNotFound", &IO_FAILURE);
//!
//! #[derive(Debug)]
//! struct Failure(Category);
//!
//! impl Categorized for Failure {
//!     fn category(&self) -> Category {
//!         self.0
//!     }
//! }
//!
//! let output = RefCell::new(String::new());
//!
//! let mut catcher = TryCatcher::of(|| Err(Failure(FILE_NOT_FOUND)))
//!     .when(IO_FAILURE, |_| {
//!         output.borrow_mut().push_str("io;");
//!         Ok(())
//!     })
//!     .finally_block(|| {
//!         output.borrow_mut().push_str("done;");
//!         Ok(())
//!     });
//!
//! catcher.execute().unwrap();
//! catcher.execute().unwrap();
//!
//! assert_eq!(*output.borrow(), "io;done;");
//! ```
//!
//! ## Architecture
//!
//! - [`Category`] and [`Categorized`] - The category tree and how failures report their place in it
//! - [`CatchMap`] - Category to handler mapping with most-specific-ancestor lookup
//! - [`TryCatcher`] - The dispatcher running try, catch and finally blocks once
//! - [`Error`] and [`Result`] - Failures the dispatcher deliberately does not catch
//!
//! ## Error Handling
//!
//! Only failures returned by the try block are caught. A failing catch block or finally
//! block is reported from [`TryCatcher::execute`]:
//!
//! ```rust
//! use trycatcher::{Category, Error, TryCatcher};
//!
//! const PARSE: Category = Category::new("ParseError", &Category::ANY);
//!
//! let mut catcher = TryCatcher::of(|| Err(PARSE)).default_catch(|_| Err(Category::ANY));
//!
//! match catcher.execute() {
//!     Ok(_) => println!("handled"),
//!     Err(Error::Catch { category, failure }) => println!("{category} handler raised {failure}"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! ```
//!
//! ## Diagnostics
//!
//! Dispatch decisions are emitted as `tracing` events at `debug` level, registrations
//! at `trace` level. Install any `tracing` subscriber to see them.
//!
//! ## Threading
//!
//! A [`TryCatcher`] is meant for a single caller. Its blocks may borrow from the
//! caller's stack and are stored behind `Rc`, so it is neither `Send` nor `Sync`.

pub(crate) mod error;

/// Error categories and the [`Categorized`] trait.
pub mod category;

/// Category keyed handler storage.
pub mod catchmap;

/// The try/catch/finally dispatcher.
pub mod trycatcher;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use trycatcher::prelude::*;
///
/// let mut catcher = TryCatcher::<Category>::of(|| Ok(()));
/// catcher.execute().unwrap();
/// assert_eq!(catcher.state(), ExecutionState::Executed);
/// ```
pub mod prelude;

/// `trycatcher` Result type
///
/// A type alias for [`std::result::Result<T, Error<E>>`], where `E` is the caller's
/// failure type.
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// `trycatcher` Error type
///
/// Reports failures raised by catch or finally blocks, and execution without a try
/// block.
pub use error::Error;

pub use catchmap::{CatchBlock, CatchMap};
pub use category::{Ancestors, Categorized, Category};
pub use trycatcher::{ExecutionState, FinallyBlock, TryBlock, TryCatcher};
