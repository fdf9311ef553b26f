//! Dispatch: from fired triggers to script runs on exactly one peer.
//!
//! - [`Dispatcher`]: elects an executor per trigger and runs the local ones
//! - [`Peer`]: a participant's full pipeline plus the script store and
//!   manual invocation operations
//!
//! Dispatch is sequential. Scripts for one notification finish before the
//! caller hands over the next notification.

mod dispatcher;
mod peer;

pub use dispatcher::{DispatchEntry, DispatchReport, Dispatcher, Outcome};
pub use peer::Peer;
