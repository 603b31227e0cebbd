pub mod dfa;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod pattern;
pub mod table;
pub mod token;
pub mod trace;

pub use dfa::{Dfa, Verdict};
pub use error::Error;
pub use grammar::{Grammar, Production};
pub use parser::{Outcome, Parser, Rejection};
pub use pattern::{Pattern, Registry};
pub use table::{ParseTable, TableCell};
pub use token::{EOF, EPSILON, NonTerminal, Terminal, Token, tokenize};
pub use trace::{Action, Step, Trace};
