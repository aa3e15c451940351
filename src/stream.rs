use encoding_rs::{CoderResult, Decoder, UTF_8};

/// Incremental UTF-8 decoder for chunked response bodies.
///
/// A chunk may end in the middle of a multi-byte code point. Those trailing
/// bytes are held back and completed by the next chunk instead of being
/// decoded lossily on their own. Invalid sequences decode to U+FFFD.
pub struct Utf8StreamDecoder {
    inner: Decoder,
}

impl Default for Utf8StreamDecoder {
    fn default() -> Self {
        Self {
            inner: UTF_8.new_decoder_without_bom_handling(),
        }
    }
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.run(chunk, false)
    }

    /// Flush at end of stream. A dangling partial code point becomes one U+FFFD.
    ///
    /// The decoder is reset afterwards and can take a new stream.
    pub fn finish(&mut self) -> String {
        let tail = self.run(&[], true);
        self.inner = UTF_8.new_decoder_without_bom_handling();
        tail
    }

    fn run(&mut self, chunk: &[u8], last: bool) -> String {
        let mut out = String::new();
        let mut rest = chunk;
        loop {
            let room = self
                .inner
                .max_utf8_buffer_length(rest.len())
                .unwrap_or(rest.len() + 4);
            out.reserve(room);
            let (result, read, _) = self.inner.decode_to_string(rest, &mut out, last);
            rest = &rest[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
        out
    }
}

/// Accumulates the decoded reply text across chunks.
#[derive(Default)]
pub struct ReplyAccumulator {
    decoder: Utf8StreamDecoder,
    text: String,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, append it, and return everything accumulated so far.
    pub fn push(&mut self, chunk: &[u8]) -> &str {
        let piece = self.decoder.decode(chunk);
        self.text.push_str(&piece);
        &self.text
    }

    pub fn finish(&mut self) -> &str {
        let tail = self.decoder.finish();
        self.text.push_str(&tail);
        &self.text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
