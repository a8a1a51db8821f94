use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePos {
    pub line: usize,
    pub col: usize,
}

/// Line index over a source string. Lines are 1-based.
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_offsets: Vec<usize>,
    len: usize,
}

impl SourceMap {
    pub fn from_source(source: &str) -> Self {
        let mut line_offsets = vec![0];
        for (idx, ch) in source.char_indices() {
            if ch == '\n' {
                line_offsets.push(idx + 1);
            }
        }
        Self {
            line_offsets,
            len: source.len(),
        }
    }

    pub fn byte_to_pos(&self, byte: usize) -> SourcePos {
        let line_idx = match self.line_offsets.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_offsets.get(line_idx).copied().unwrap_or(0);
        SourcePos {
            line: line_idx + 1,
            col: byte.saturating_sub(line_start) + 1,
        }
    }

    /// Number of lines, counting a trailing line after the final newline.
    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    /// Byte range of `line` without its line terminator.
    pub fn line_span(&self, source: &str, line: usize) -> Option<Range<usize>> {
        let start = *self.line_offsets.get(line.checked_sub(1)?)?;
        let mut end = self
            .line_offsets
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        if end > start && source.as_bytes().get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Some(start..end)
    }

    pub fn line_text<'src>(&self, source: &'src str, line: usize) -> Option<&'src str> {
        source.get(self.line_span(source, line)?)
    }
}
