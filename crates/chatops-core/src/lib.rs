pub mod command;
pub mod config;
pub mod error;
pub mod form;
pub mod message;
pub mod router;
pub mod verify;

pub use command::{InboundCommand, InvocationStyle, WorkflowDispatchRequest};
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use router::{CommandRouter, Reply, SlashReply, WorkflowDispatcher};
pub use verify::{BodyFormat, SignedRequest, Verifier};
