//! Chunked conversion for inputs that do not fit in memory
//!
//! [`StreamingTranslator`] accepts input in arbitrary pieces. Output goes
//! through a fixed-size working buffer, and a UTF-8 sequence split across
//! two chunks is carried over until the rest of it arrives.

use crate::transform::{DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE, Status, Transform};
use crate::{Codec, CodePage, Error, Result};

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Code page bytes to UTF-8
    Decode,
    /// UTF-8 to code page bytes
    Encode,
}

/// Streaming converter for processing large datasets
pub struct StreamingTranslator {
    codec: Codec,
    direction: Direction,
    /// Working output buffer
    buffer: Vec<u8>,
    /// Input held back from the previous chunk
    pending: Vec<u8>,
}

impl StreamingTranslator {
    /// Create a new streaming translator with specified buffer size
    ///
    /// The buffer must hold at least one UTF-8 encoded character.
    pub fn new(page: CodePage, direction: Direction, buffer_size: usize) -> Result<Self> {
        if buffer_size < MIN_BUFFER_SIZE {
            return Err(Error::InvalidInput(format!(
                "buffer size {} is below the minimum of {} bytes",
                buffer_size, MIN_BUFFER_SIZE
            )));
        }
        Ok(Self {
            codec: page.codec(),
            direction,
            buffer: vec![0; buffer_size],
            pending: Vec::new(),
        })
    }

    /// Create with default 64KB buffer
    pub fn with_default_buffer(page: CodePage, direction: Direction) -> Self {
        Self {
            codec: page.codec(),
            direction,
            buffer: vec![0; DEFAULT_BUFFER_SIZE],
            pending: Vec::new(),
        }
    }

    /// Bytes carried over, waiting for the rest of a character
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Process a chunk of data
    ///
    /// More input is expected to follow, so an incomplete character at the
    /// end of `input` is kept for the next call.
    pub fn process_chunk(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        if self.pending.is_empty() {
            self.run(input, false)
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(input);
            self.run(&joined, false)
        }
    }

    /// Flush anything still held back and reset for reuse
    ///
    /// An incomplete trailing character is encoded as the substitute byte.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        let rest = std::mem::take(&mut self.pending);
        self.run(&rest, true)
    }

    fn run(&mut self, input: &[u8], last: bool) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len());
        let mut read = 0;
        loop {
            let progress = match self.direction {
                Direction::Decode => self.codec.decode(&input[read..], &mut self.buffer, last),
                Direction::Encode => self.codec.encode(&input[read..], &mut self.buffer, last),
            };
            output.extend_from_slice(&self.buffer[..progress.written]);
            read += progress.read;
            match progress.status {
                Status::InputEmpty => return Ok(output),
                Status::NeedInput if !last => {
                    self.pending.extend_from_slice(&input[read..]);
                    return Ok(output);
                }
                Status::OutputFull if progress.read > 0 || progress.written > 0 => {}
                _ => return Err(Error::Stalled { position: read }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_translator() {
        let mut stream = StreamingTranslator::with_default_buffer(CodePage::CP_895, Direction::Decode);

        let result1 = stream.process_chunk(&[0x80, 0x81]).unwrap();
        let result2 = stream.process_chunk(&[0x82, 0x83]).unwrap();
        let result3 = stream.finish().unwrap();

        let mut combined = result1;
        combined.extend(result2);
        combined.extend(result3);

        assert_eq!(std::str::from_utf8(&combined).unwrap(), "Čěšý");
    }

    #[test]
    fn test_encode_split_inside_character() {
        let mut stream = StreamingTranslator::new(CodePage::CP_866, Direction::Encode, 4).unwrap();
        let bytes = "Тест".as_bytes();

        let mut output = stream.process_chunk(&bytes[..3]).unwrap();
        assert_eq!(output, vec![0x92]);
        assert_eq!(stream.pending(), &bytes[2..3]);

        output.extend(stream.process_chunk(&bytes[3..]).unwrap());
        output.extend(stream.finish().unwrap());
        assert_eq!(output, vec![0x92, 0xA5, 0xE1, 0xE2]);
        assert!(stream.pending().is_empty());
    }

    #[test]
    fn test_finish_substitutes_truncated_character() {
        let mut stream = StreamingTranslator::new(CodePage::CP_895, Direction::Encode, 8).unwrap();
        let mut output = stream.process_chunk(&[b'x', 0xC4]).unwrap();
        output.extend(stream.finish().unwrap());
        assert_eq!(output, vec![b'x', crate::SUBSTITUTE]);
    }

    #[test]
    fn test_chunking_matches_whole_buffer() {
        let text = "Žluťoučký kůň ╔══╗ ≈ π · Тест € done";
        for page in [CodePage::CP_895, CodePage::CP_866, CodePage::CP_852] {
            let expected = page.encode(text).unwrap();
            for split in [1, 2, 3, 5, 11] {
                let mut stream = StreamingTranslator::new(page, Direction::Encode, 4).unwrap();
                let mut output = Vec::new();
                for chunk in text.as_bytes().chunks(split) {
                    output.extend(stream.process_chunk(chunk).unwrap());
                }
                output.extend(stream.finish().unwrap());
                assert_eq!(output, expected, "{} split={}", page, split);

                let decoded = page.decode(&expected).unwrap();
                let mut stream = StreamingTranslator::new(page, Direction::Decode, 4).unwrap();
                let mut text_out = Vec::new();
                for chunk in expected.chunks(split) {
                    text_out.extend(stream.process_chunk(chunk).unwrap());
                }
                text_out.extend(stream.finish().unwrap());
                assert_eq!(String::from_utf8(text_out).unwrap(), decoded);
            }
        }
    }

    #[test]
    fn test_rejects_tiny_buffer() {
        let result = StreamingTranslator::new(CodePage::CP_437, Direction::Decode, 2);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
