//! Line-oriented input helpers shared by both normalizer modes.

use std::io::{self, BufRead, Seek, SeekFrom};

/// Iterator over the lines of a reader, dropping invalid UTF-8.
///
/// Source logs come from old acquisition software and are not reliably
/// UTF-8. Byte sequences that do not decode are removed rather than
/// replaced, so `caf\xe9` reads as `caf`. Line terminators (`\n` or
/// `\r\n`) are removed.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                Some(Ok(decode_dropping_invalid(&self.buf)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

fn decode_dropping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// True for a header row of the scored-event and stage files.
pub fn is_epoch_header(line: &str) -> bool {
    line.trim_start()
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("epoch"))
}

/// Skip leading header lines, leaving the reader at the first data line.
///
/// Files may carry zero, one or several header lines. The reader is
/// positioned back at the start of the first line that is not a header, so
/// a file without a header is read from its true first line.
pub fn skip_header_lines<R, F>(reader: &mut R, is_header: F) -> io::Result<usize>
where
    R: BufRead + Seek,
    F: Fn(&str) -> bool,
{
    let mut skipped = 0;
    let mut buf = Vec::new();
    loop {
        let pos = reader.stream_position()?;
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if is_header(&decode_dropping_invalid(&buf)) {
            skipped += 1;
        } else {
            reader.seek(SeekFrom::Start(pos))?;
            break;
        }
    }
    Ok(skipped)
}
