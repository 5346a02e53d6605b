use tilecl_common::Element;
use tilecl_runtime::config::HardwareProperties;

/// How a row reduction covers the columns of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowStrategy {
    /// The row is exactly one pass wide: one full-width reduction.
    Single,
    /// The row is narrower than one pass: one masked reduction.
    Masked,
    /// The row spans several passes, folded by a combine tree first.
    Tree,
}

/// Decomposition of a row reduction into bounded vector instructions.
///
/// Rows wider than one pass `P` are folded into a `P`-wide partial row:
///
/// ```text
///  pass:   0    1    2    3    4   rem
///        [ a ][ b ][ c ][ d ][ e ][ r. ]
///  pairs   a+b       c+d                 -> workspace passes 0, 1
///  odd     a+b+e                         -> folded into pass 0
///  rem     a+b+e+r (first `rem` lanes)   -> masked fold into pass 0
///  tree    (a+b+e+r)+(c+d)               -> halving until one pass is left
/// ```
///
/// The last pass is then reduced by one single-pass instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowReducePlan {
    /// Selected strategy.
    pub strategy: RowStrategy,
    /// Pass width in elements.
    pub pass: usize,
    /// Rows addressed by one instruction.
    pub max_repeat: usize,
    /// Number of complete passes in a row.
    pub full_passes: usize,
    /// Columns left after the complete passes.
    pub remainder: usize,
    /// Pairs of complete passes combined by the first tree level.
    pub pairs: usize,
}

impl RowReducePlan {
    /// Plan the reduction of rows of `cols` elements of type `E`.
    pub fn new<E: Element>(properties: &HardwareProperties, cols: usize) -> Self {
        let pass = properties.pass_width::<E>();
        let full_passes = cols / pass;
        let remainder = cols % pass;

        let strategy = if cols == pass {
            RowStrategy::Single
        } else if cols < pass {
            RowStrategy::Masked
        } else {
            RowStrategy::Tree
        };
        let pairs = match strategy {
            RowStrategy::Tree => full_passes / 2,
            _ => 0,
        };

        Self {
            strategy,
            pass,
            max_repeat: properties.max_repeat,
            full_passes,
            remainder,
            pairs,
        }
    }

    /// Columns of workspace needed per row.
    pub fn workspace_cols(&self) -> usize {
        match self.strategy {
            RowStrategy::Tree => self.pass * self.pairs.max(1),
            _ => 0,
        }
    }

    /// Split `rows` into `(first_row, row_count)` chunks addressable by one instruction.
    pub fn chunks(&self, rows: usize) -> impl Iterator<Item = (usize, usize)> {
        chunks(rows, self.max_repeat)
    }
}

/// Decomposition of a column reduction into bounded vector instructions.
///
/// The columns are processed in blocks of one pass. Inside a block, rows are
/// combined pairwise into the workspace, an odd last row is carried into the
/// first partial row, and the partial rows are halved until one is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColReducePlan {
    /// Pass width in elements.
    pub pass: usize,
    /// Rows addressed by one instruction.
    pub max_repeat: usize,
    /// Number of column blocks, the last one possibly partial.
    pub blocks: usize,
    /// Row pairs combined by the first level.
    pub pairs: usize,
    cols: usize,
}

impl ColReducePlan {
    /// Plan the reduction of a `rows × cols` region of type `E` into one row.
    pub fn new<E: Element>(properties: &HardwareProperties, rows: usize, cols: usize) -> Self {
        let pass = properties.pass_width::<E>();
        Self {
            pass,
            max_repeat: properties.max_repeat,
            blocks: cols.div_ceil(pass),
            pairs: rows / 2,
            cols,
        }
    }

    /// Width of the column block `block`.
    pub fn block_width(&self, block: usize) -> usize {
        self.pass.min(self.cols - block * self.pass)
    }

    /// Rows of workspace needed.
    pub fn workspace_rows(&self) -> usize {
        self.pairs
    }

    /// Columns of workspace needed per row.
    pub fn workspace_cols(&self) -> usize {
        if self.pairs == 0 {
            0
        } else {
            self.cols.min(self.pass)
        }
    }

    /// Split `rows` into `(first_row, row_count)` chunks addressable by one instruction.
    pub fn chunks(&self, rows: usize) -> impl Iterator<Item = (usize, usize)> {
        chunks(rows, self.max_repeat)
    }
}

fn chunks(total: usize, size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..total)
        .step_by(size.max(1))
        .map(move |start| (start, size.min(total - start)))
}
