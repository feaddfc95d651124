// Crate implementing the Engineering Principles of Optionals
//
// The optional cell is deliberately a mutable value: a bounded set of
// operations may flip an instance between present and absent in place,
// and every combinator reads the state at call time. The asynchronous
// counterpart lives in the optra_pending crate so this one stays free
// of async dependencies.

pub mod errors;
pub mod optionals;

pub use errors::{BoxedError, OptionalError, OptionalResult};
pub use optionals::{absent, present, Optional};
