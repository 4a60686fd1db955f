/// SCPI lexer — tokenizes raw bytes into a stream of borrowed tokens.
pub mod lexer;
/// SCPI keyword and command-header pattern matching.
pub mod pattern;
