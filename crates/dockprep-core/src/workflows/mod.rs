//! High-level workflows, the entry points for users of the library.
//!
//! [`prepare`] runs the full receptor preparation pipeline over a molecular
//! system: repairs, typing, charges, cleanup, and output.

pub mod prepare;
