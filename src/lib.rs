//! A small interactive shell.
//!
//! This crate implements the classic read-parse-dispatch-execute loop: a line
//! of input is tokenized under shell quoting rules, an optional `> file`
//! stdout redirection is split off, and the remaining words are dispatched
//! either to a builtin (`cd`, `echo`, `exit`, `pwd`, `type`) or to an
//! external executable resolved through PATH.
//!
//! The main entry point is [`Interpreter`], which owns an [`env::Environment`]
//! and a list of command factories queried in order — builtins first, the
//! external launcher last. The public modules [`command`] and [`env`] expose
//! the traits and types needed to implement additional commands.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
mod lexer;
mod redirect;

pub use interpreter::Interpreter;
