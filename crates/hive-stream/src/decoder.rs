//! Newline framing over arbitrary byte chunks.
//!
//! The producer writes one JSON record per newline-terminated line,
//! but the network is free to split a line across any number of
//! reads. The decoder carries the unterminated tail of each chunk
//! forward so a record is only ever handed downstream once its
//! terminating newline has been observed.

/// Incremental line decoder for the NDJSON stream body.
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Bytes received after the last newline, waiting for the rest of
    /// their line. Kept as raw bytes so a UTF-8 sequence split across
    /// chunks reassembles intact.
    residual: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk and return every line completed by it, in
    /// stream order. Empty and whitespace-only lines carry no record
    /// and are filtered out. Decoding is lossy on invalid UTF-8
    /// rather than fatal.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.residual.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.residual.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.residual.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }

    /// End of stream: surface whatever trailing partial never got its
    /// newline. The caller discards it (newline-terminated records
    /// only), typically after logging it.
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.residual);
        let tail = String::from_utf8_lossy(&raw);
        let tail = tail.trim();
        if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_lines_survive_any_split_point() {
        let bytes = b"A\nB\n";
        for split in 0..=bytes.len() {
            let mut decoder = LineDecoder::new();
            let mut lines = decoder.feed(&bytes[..split]);
            lines.extend(decoder.feed(&bytes[split..]));
            assert_eq!(
                lines,
                vec!["A".to_string(), "B".to_string()],
                "split at byte {split} must still yield both lines in order"
            );
            assert_eq!(decoder.finish(), None);
        }
    }

    #[test]
    fn test_line_spanning_three_chunks_reassembles() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"{\"id\":").is_empty());
        assert!(decoder.feed(b"1,\"ok\":tr").is_empty());
        let lines = decoder.feed(b"ue}\n");
        assert_eq!(lines, vec!["{\"id\":1,\"ok\":true}".to_string()]);
    }

    #[test]
    fn test_empty_lines_are_filtered() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.feed(b"A\n\n\nB\n");
        assert_eq!(lines, vec!["A".to_string(), "B".to_string()]);

        assert!(decoder.feed(b"\n").is_empty(), "a lone newline carries no record");
    }

    #[test]
    fn test_trailing_partial_is_not_a_line() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.feed(b"complete\npartial");
        assert_eq!(lines, vec!["complete".to_string()]);
        assert_eq!(
            decoder.finish(),
            Some("partial".to_string()),
            "the unterminated tail surfaces only at end of stream"
        );
        assert_eq!(decoder.finish(), None, "finish drains the residual");
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let bytes = "né\n".as_bytes();
        let mut decoder = LineDecoder::new();
        // Split in the middle of the two-byte 'é'.
        let mut lines = decoder.feed(&bytes[..2]);
        lines.extend(decoder.feed(&bytes[2..]));
        assert_eq!(lines, vec!["né".to_string()]);
    }

    #[test]
    fn test_carriage_returns_are_trimmed() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.feed(b"A\r\nB\r\n");
        assert_eq!(lines, vec!["A".to_string(), "B".to_string()]);
    }
}
