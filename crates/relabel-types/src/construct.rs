//! Fallible construction.
//!
//! | Pattern | Use When |
//! |---------|----------|
//! | `new()` | Construction always succeeds |
//! | [`TryNew`] | Construction validates its input |
//! | `TryFrom<T>` | Converting from another type |
//!
//! # Example
//!
//! ```
//! use relabel_types::TryNew;
//!
//! #[derive(Debug)]
//! struct FrameIndex(u32);
//!
//! #[derive(Debug, PartialEq)]
//! struct OutOfRange;
//!
//! impl TryNew for FrameIndex {
//!     type Error = OutOfRange;
//!     type Args = (u32, u32);
//!
//!     fn try_new((index, frames): (u32, u32)) -> Result<Self, Self::Error> {
//!         if index >= frames {
//!             return Err(OutOfRange);
//!         }
//!         Ok(FrameIndex(index))
//!     }
//! }
//!
//! assert!(FrameIndex::try_new((2, 3)).is_ok());
//! assert_eq!(FrameIndex::try_new((3, 3)).unwrap_err(), OutOfRange);
//! ```

/// Constructor that validates its arguments.
///
/// Types implementing `TryNew` should not also offer a plain `new()`
/// performing the same validation; the `try_` prefix keeps fallibility
/// visible at the call site.
pub trait TryNew: Sized {
    /// Error returned when validation fails.
    type Error;

    /// Arguments required for construction (use a tuple for several).
    type Args;

    /// Validates `args` and builds the value.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the arguments violate the type's invariants.
    fn try_new(args: Self::Args) -> Result<Self, Self::Error>;
}
