// Unit-level checks of the grammar crates through the public API.
mod grammar_model;
mod parser;
