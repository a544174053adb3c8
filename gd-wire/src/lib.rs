//! Wire formats shared between the dashboard server and its clients.
//!
//! Nothing in here performs I/O: these are the action routes a client calls,
//! the JSON envelope the server answers with, the colon-delimited UI commands
//! carried in that envelope, and the one-line messages of the push channel.

mod command;
mod envelope;
mod push;
mod route;

pub use command::{Command, CommandError, Opcode};
pub use envelope::{ActionEnvelope, RESULT_OK};
pub use push::{DEFAULT_TOPICS, PushMessage, Subscription};
pub use route::{
    ACTION_ID_PREFIX, ActionRoute, KNOWN_SUFFIXES, PANEL_CONTAINER_PREFIX, RequestKind, action_id,
    panel_selector,
};
