//! Trailing fixed-size windows aligned with output rows.

/// Iterator over the trailing window ending at each output row.
///
/// `values` start `leading` rows into the output (one row for returns, whose
/// first row has no prior price). Each item is `Some(slice)` once `window`
/// values have accumulated up to and including that row, `None` before.
#[derive(Debug, Clone)]
pub struct TrailingWindows<'a> {
    values: &'a [f64],
    window: usize,
    leading: usize,
    row: usize,
    rows: usize,
}

impl<'a> TrailingWindows<'a> {
    /// Create an iterator over `values` preceded by `leading` empty rows.
    pub fn new(values: &'a [f64], window: usize, leading: usize) -> Self {
        Self {
            values,
            window,
            leading,
            row: 0,
            rows: leading + values.len(),
        }
    }

    /// Window ending at output row `row`, if it is full.
    pub fn at(&self, row: usize) -> Option<&'a [f64]> {
        if self.window == 0 || row >= self.rows || row < self.leading {
            return None;
        }
        let values: &'a [f64] = self.values;
        let end = row + 1 - self.leading;
        (end >= self.window).then(|| &values[end - self.window..end])
    }
}

impl<'a> Iterator for TrailingWindows<'a> {
    type Item = Option<&'a [f64]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.rows {
            return None;
        }
        let item = self.at(self.row);
        self.row += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows - self.row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrailingWindows<'_> {}
