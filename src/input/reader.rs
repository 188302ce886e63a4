use anyhow::{Context, Result, bail};
use std::io::{self, Read};

/// Largest message accepted from stdin.
pub const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB

pub struct InputReader;

impl InputReader {
    /// Returns the message given on the command line, or reads it from stdin.
    pub fn read_message(arg: Option<String>) -> Result<String> {
        match arg {
            Some(text) => Ok(text),
            None => Self::read_from(io::stdin().lock()),
        }
    }

    /// Reads all of `reader`, refusing input larger than [`MAX_INPUT_SIZE`].
    pub fn read_from(reader: impl Read) -> Result<String> {
        let mut buffer = Vec::new();
        // One byte past the limit is enough to know it was exceeded.
        reader
            .take(MAX_INPUT_SIZE as u64 + 1)
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;

        if buffer.len() > MAX_INPUT_SIZE {
            bail!(
                "Error: Message exceeds maximum allowed size (1 MB).\n\n\
                 Consider sending a shorter message."
            );
        }

        String::from_utf8(buffer).context("Input is not valid UTF-8")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_wins_over_stdin() {
        let text = InputReader::read_message(Some("Book lunch".to_string())).unwrap();
        assert_eq!(text, "Book lunch");
    }

    #[test]
    fn test_read_from_unicode() {
        let content = "明日の15時に会議を予約して 📅";
        let text = InputReader::read_from(content.as_bytes()).unwrap();
        assert_eq!(text, content);
    }

    #[test]
    fn test_read_from_at_max_size() {
        let content = "x".repeat(MAX_INPUT_SIZE);
        let text = InputReader::read_from(content.as_bytes()).unwrap();
        assert_eq!(text.len(), MAX_INPUT_SIZE);
    }

    #[test]
    fn test_read_from_exceeds_max_size() {
        let content = "x".repeat(MAX_INPUT_SIZE + 1);
        let err = InputReader::read_from(content.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_read_from_invalid_utf8() {
        let err = InputReader::read_from(&[0xff, 0xfe][..]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
