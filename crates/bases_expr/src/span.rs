use serde::{Deserialize, Serialize};

/// Byte range of a diagnostic inside an expression source, with its
/// 1-based line and column (formula sources may be YAML block scalars).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (idx, ch) in source.char_indices() {
            if ch == '\n' {
                starts.push(idx + 1);
            }
        }
        Self { starts }
    }

    pub(crate) fn line_col(&self, offset: usize) -> (u32, u32) {
        let idx = self.starts.partition_point(|start| *start <= offset).saturating_sub(1);
        let line = idx as u32 + 1;
        let col = offset.saturating_sub(self.starts[idx]) as u32 + 1;
        (line, col)
    }
}
