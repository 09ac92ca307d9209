//! Interactive command console for HBnB.
//!
//! Turns text lines into [`ObjectStore`](hbnb_store::ObjectStore) operations.
//! Two surface syntaxes reach the same handlers:
//!
//! - verb-first: `update User 1234 first_name "Betty"`
//! - dotted: `User.update("1234", {"first_name": "Betty", "age": 98})`
//!
//! Dictionary arguments go through a restricted literal parser; class names
//! are resolved through the [`ClassRegistry`](hbnb_types::ClassRegistry) and
//! never evaluated.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod literal;
pub mod parser;
pub mod repl;

pub use command::{split_command, DottedCall, Verb};
pub use dispatcher::{Control, Dispatcher};
pub use error::{ConsoleError, ConsoleResult, LiteralError, ParseError, Rejection};
pub use literal::parse_literal;
pub use parser::parse_line;
pub use repl::{Console, DEFAULT_PROMPT};
