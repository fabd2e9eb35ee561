//! Falsy semantics for ordinary values.
//!
//! Wrapping a value yields a proxy that answers boolean questions with
//! dynamic-language truthiness rules — null, zero, the empty string,
//! `false` and NaN are falsy, everything else is truthy — while staying
//! transparently usable as the value itself: member access, indexing,
//! iteration and conversions all reach through to the wrapped value and
//! re-wrap whatever comes back. Missing members read as the [`Falsy`]
//! undefined sentinel instead of failing.
//!
//! Equality among wrappers follows the falsy equivalence classes:
//! `false`, `0` and `""` are mutually equal; null and undefined equal
//! only each other; NaN equals nothing at all.
//!
//! ```
//! use falsy::Falsify;
//!
//! let name = "".falsify();
//! assert!(name.is_false());
//! assert!(name == 0.falsify());
//!
//! let fallback = name.or(&"guest".falsify());
//! assert_eq!(fallback.try_str().unwrap(), "guest");
//! ```

pub mod error;
pub mod object;
pub mod truth;
pub mod types;
pub mod wrapper;

pub use error::FalsyError;
pub use object::{CallOutcome, HostObject};
pub use truth::FalsyClass;
pub use types::{Shape, Value};
pub use wrapper::{Falsify, Falsy, FalsyIter};
