//! Incremental decode/encode transforms
//!
//! A [`Transform`] converts one buffer at a time and reports how far it got.
//! It never keeps state between calls, so a caller streams arbitrarily large
//! input by calling it again with the unread input and a fresh output buffer
//! whenever it stops with [`Status::OutputFull`] or [`Status::NeedInput`].
//!
//! Decoding produces UTF-8. Encoding consumes UTF-8 bytes rather than `&str`
//! so that a chunk boundary may fall inside a multi-byte sequence.

use encoding_rs::{DecoderResult, EncoderResult};

use crate::tables::SingleByteTable;
use crate::{Error, Result};

/// Byte written in place of characters the target code page cannot represent
pub const SUBSTITUTE: u8 = 0x1A;

/// Smallest output buffer that fits any single decoded character
pub const MIN_BUFFER_SIZE: usize = 4;

/// Default working buffer size for the whole-buffer drivers and streams
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Why a transform call returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All input was consumed
    InputEmpty,
    /// The output buffer cannot hold the next converted character
    OutputFull,
    /// Input ends inside a multi-byte sequence and more input may follow
    NeedInput,
}

/// Outcome of a single transform call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Why the call stopped
    pub status: Status,
    /// Input bytes consumed
    pub read: usize,
    /// Output bytes produced
    pub written: usize,
}

impl Progress {
    fn new(status: Status, read: usize, written: usize) -> Self {
        Self {
            status,
            read,
            written,
        }
    }
}

/// A byte-oriented code page converter with partial-buffer signalling
///
/// `last` tells the transform whether `src` ends the whole input. Only the
/// encoder looks at it: an incomplete UTF-8 sequence at the end of `src` is
/// held back when `last` is false and replaced when it is true.
pub trait Transform: Send + Sync {
    /// Convert code page bytes into UTF-8
    fn decode(&self, src: &[u8], dst: &mut [u8], last: bool) -> Progress;

    /// Convert UTF-8 into code page bytes, replacing unmappable characters
    /// with [`SUBSTITUTE`]
    fn encode(&self, src: &[u8], dst: &mut [u8], last: bool) -> Progress;
}

impl Transform for SingleByteTable {
    fn decode(&self, src: &[u8], dst: &mut [u8], _last: bool) -> Progress {
        let mut written = 0;
        for (read, &byte) in src.iter().enumerate() {
            let ch = self.decode_byte(byte);
            let width = ch.len_utf8();
            if written + width > dst.len() {
                return Progress::new(Status::OutputFull, read, written);
            }
            ch.encode_utf8(&mut dst[written..]);
            written += width;
        }
        Progress::new(Status::InputEmpty, src.len(), written)
    }

    fn encode(&self, src: &[u8], dst: &mut [u8], last: bool) -> Progress {
        let mut read = 0;
        let mut written = 0;
        while read < src.len() {
            let (byte, width) = match next_scalar(&src[read..]) {
                Scalar::Char(ch, width) => (self.encode_char(ch).unwrap_or(SUBSTITUTE), width),
                Scalar::Incomplete if !last => {
                    return Progress::new(Status::NeedInput, read, written);
                }
                Scalar::Incomplete | Scalar::Invalid => (SUBSTITUTE, 1),
            };
            if written >= dst.len() {
                return Progress::new(Status::OutputFull, read, written);
            }
            dst[written] = byte;
            written += 1;
            read += width;
        }
        Progress::new(Status::InputEmpty, read, written)
    }
}

/// Adapter for single-byte encodings provided by `encoding_rs`
///
/// A fresh decoder or encoder is created for every call. Single-byte
/// encodings carry no state between characters, so this keeps the adapter
/// stateless like the table transforms.
#[derive(Debug, Clone, Copy)]
pub struct WhatwgCodec(pub &'static encoding_rs::Encoding);

impl WhatwgCodec {
    /// Provider name of the wrapped encoding
    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Codec {
    /// Name of the table or provider encoding doing the work
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Table(table) => table.name(),
            Codec::Whatwg(codec) => codec.name(),
        }
    }
}

impl Transform for WhatwgCodec {
    fn decode(&self, src: &[u8], dst: &mut [u8], last: bool) -> Progress {
        let mut decoder = self.0.new_decoder_without_bom_handling();
        let mut read = 0;
        let mut written = 0;
        loop {
            let (result, r, w) =
                decoder.decode_to_utf8_without_replacement(&src[read..], &mut dst[written..], last);
            read += r;
            written += w;
            match result {
                DecoderResult::InputEmpty => {
                    return Progress::new(Status::InputEmpty, read, written);
                }
                DecoderResult::OutputFull => {
                    return Progress::new(Status::OutputFull, read, written);
                }
                DecoderResult::Malformed(bad, after) => {
                    if dst.len() - written < char::REPLACEMENT_CHARACTER.len_utf8() {
                        read -= bad as usize + after as usize;
                        return Progress::new(Status::OutputFull, read, written);
                    }
                    written += char::REPLACEMENT_CHARACTER
                        .encode_utf8(&mut dst[written..])
                        .len();
                }
            }
        }
    }

    fn encode(&self, src: &[u8], dst: &mut [u8], last: bool) -> Progress {
        let mut encoder = self.0.new_encoder();
        let mut read = 0;
        let mut written = 0;
        while read < src.len() {
            // One output byte consumes at most four input bytes, so validating
            // past that window is wasted work. A character cut by the window
            // is picked up on the next pass.
            let window = (dst.len() - written) * 4 + 3;
            let run = valid_prefix(&src[read..src.len().min(read + window)]);
            if run.is_empty() {
                match next_scalar(&src[read..]) {
                    Scalar::Incomplete if !last => {
                        return Progress::new(Status::NeedInput, read, written);
                    }
                    _ if written >= dst.len() => {
                        return Progress::new(Status::OutputFull, read, written);
                    }
                    _ => {
                        dst[written] = SUBSTITUTE;
                        written += 1;
                        read += 1;
                        continue;
                    }
                }
            }

            let mut offset = 0;
            while offset < run.len() {
                let (result, r, w) = encoder.encode_from_utf8_without_replacement(
                    &run[offset..],
                    &mut dst[written..],
                    false,
                );
                offset += r;
                written += w;
                match result {
                    EncoderResult::InputEmpty => {}
                    EncoderResult::OutputFull => {
                        return Progress::new(Status::OutputFull, read + offset, written);
                    }
                    EncoderResult::Unmappable(ch) => {
                        if written >= dst.len() {
                            offset -= ch.len_utf8();
                            return Progress::new(Status::OutputFull, read + offset, written);
                        }
                        dst[written] = SUBSTITUTE;
                        written += 1;
                    }
                }
            }
            read += offset;
        }
        Progress::new(Status::InputEmpty, read, written)
    }
}

/// Transform selected for a code page
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    /// Table owned by this crate
    Table(&'static SingleByteTable),
    /// Encoding supplied by `encoding_rs`
    Whatwg(WhatwgCodec),
}

impl Transform for Codec {
    fn decode(&self, src: &[u8], dst: &mut [u8], last: bool) -> Progress {
        match self {
            Codec::Table(table) => table.decode(src, dst, last),
            Codec::Whatwg(codec) => codec.decode(src, dst, last),
        }
    }

    fn encode(&self, src: &[u8], dst: &mut [u8], last: bool) -> Progress {
        match self {
            Codec::Table(table) => table.encode(src, dst, last),
            Codec::Whatwg(codec) => codec.encode(src, dst, last),
        }
    }
}

/// Decode a whole buffer, continuing through every `OutputFull`
pub fn decode_to_string<T: Transform + ?Sized>(codec: &T, src: &[u8]) -> Result<String> {
    let out = drive(src, |input, buf| codec.decode(input, buf, true))?;
    String::from_utf8(out).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Encode a whole string, continuing through every `OutputFull`
pub fn encode_to_vec<T: Transform + ?Sized>(codec: &T, src: &str) -> Result<Vec<u8>> {
    drive(src.as_bytes(), |input, buf| codec.encode(input, buf, true))
}

fn drive<F>(src: &[u8], mut step: F) -> Result<Vec<u8>>
where
    F: FnMut(&[u8], &mut [u8]) -> Progress,
{
    let mut out = Vec::with_capacity(src.len());
    let mut buf = vec![0u8; src.len().clamp(MIN_BUFFER_SIZE, DEFAULT_BUFFER_SIZE)];
    let mut read = 0;
    loop {
        let progress = step(&src[read..], &mut buf);
        out.extend_from_slice(&buf[..progress.written]);
        read += progress.read;
        match progress.status {
            Status::InputEmpty => return Ok(out),
            Status::OutputFull if progress.read > 0 || progress.written > 0 => {}
            // The buffer always fits one character and `last` is set, so
            // anything else means the transform is stuck.
            _ => return Err(Error::Stalled { position: read }),
        }
    }
}

enum Scalar {
    Char(char, usize),
    Invalid,
    Incomplete,
}

/// Peel the first scalar value off non-empty UTF-8 input
fn next_scalar(src: &[u8]) -> Scalar {
    let head = &src[..src.len().min(4)];
    let valid = match std::str::from_utf8(head) {
        Ok(s) => s,
        Err(e) if e.valid_up_to() > 0 => valid_prefix(&head[..e.valid_up_to()]),
        Err(e) => {
            return match e.error_len() {
                None => Scalar::Incomplete,
                Some(_) => Scalar::Invalid,
            };
        }
    };
    match valid.chars().next() {
        Some(ch) => Scalar::Char(ch, ch.len_utf8()),
        None => Scalar::Incomplete,
    }
}

/// Longest prefix of `src` that is valid UTF-8
fn valid_prefix(src: &[u8]) -> &str {
    match std::str::from_utf8(src) {
        Ok(s) => s,
        Err(e) => std::str::from_utf8(&src[..e.valid_up_to()]).unwrap_or(""),
    }
}
