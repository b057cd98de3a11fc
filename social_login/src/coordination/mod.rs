//! Login flow coordination
//!
//! High-level functions tying the protocol pieces (state tokens, token
//! exchange, profile fetch) to the account-linking decision engine. This is
//! the main entry point for host applications:
//!
//! - `flow`: the connect / callback / finalize state machine
//! - `linker`: the per-identity linking decision engine
//! - `errors`: coordination-level error type

mod errors;
mod flow;
mod linker;

pub use errors::CoordinationError;
pub use flow::{LoginOrchestrator, LoginOutcome};
pub use linker::{AccountLinker, LinkDisposition, LinkError, LinkedAccount};
