//! Console line parsing: tokens, value coercion and literal payloads

pub mod literal;
pub mod tokenizer;

pub use literal::{coerce_token, coerce_unquoted, parse_create_param, parse_dict_literal};
pub use tokenizer::{plain, split_args, split_call_args, unquote};
