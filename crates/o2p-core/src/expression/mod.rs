//! Update expression parsing and evaluation for the in-memory backend.
//!
//! Only the `SET path = :value` form is understood, which is everything the
//! record store ever emits. The pipeline is:
//!
//! 1. **Lexing**: Tokenize the expression string into a token stream.
//! 2. **Parsing**: Build an [`UpdateExpr`] from the tokens.
//! 3. **Evaluation**: Resolve placeholders and apply the actions to an item.

pub mod ast;
pub mod evaluator;
pub mod parser;

pub use ast::{AttributeRef, SetAction, UpdateExpr};
pub use evaluator::EvalContext;
pub use parser::{ExpressionError, parse_update};
