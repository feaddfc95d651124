// Crate implementing the Engineering Principles of Pending Optionals
//
// Everything here defers: a PendingOptional wraps one future of an
// optional cell and replays the synchronous combinator rules against
// the settled value. Mutating calls fan a single settlement out into a
// pre-mutation snapshot and a post-mutation continuation, so the
// upstream computation runs exactly once.

mod fanout;

pub mod ext;
pub mod pendings;

pub use ext::{IntoPending, TransposePending};
pub use pendings::PendingOptional;
