//! Reading one-shot messages from arguments or stdin.

mod reader;

pub use reader::{InputReader, MAX_INPUT_SIZE};
