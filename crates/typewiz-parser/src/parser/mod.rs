//! Recursive-descent parser producing a [`NodeArena`].

mod base;
mod node;
mod node_access;
mod node_arena;
mod state;
mod state_declarations;
mod state_expressions;
mod state_statements;
mod state_types;

pub use base::{NodeIndex, NodeList};
pub use node::*;
pub use state::{ParseDiagnostic, ParserState};
