use crate::{
    problem::{COST_CEILING, Cost, UNREACHABLE},
    Error, Result,
};

/// Square, not necessarily symmetric matrix of travel costs between location
/// indices. Stored row-major in a flat vector; `index = from * size + to`.
///
/// Entries equal to [`UNREACHABLE`] are accepted at this level and resolved
/// against the jobs and vehicles when the problem is built.
pub struct CostMatrix {
    size: usize,
    data: Vec<Cost>,
}

impl CostMatrix {
    pub fn from_rows(rows: Vec<Vec<Cost>>) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(Error::Input(format!(
                    "matrix line {i} has {} entries, expected {size}",
                    row.len()
                )));
            }
            for (j, cost) in row.into_iter().enumerate() {
                if cost != UNREACHABLE && cost > COST_CEILING {
                    return Err(Error::Input(format!(
                        "matrix entry ({i},{j}) exceeds cost ceiling"
                    )));
                }
                data.push(cost);
            }
        }

        Ok(CostMatrix { size, data })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn at(&self, from: usize, to: usize) -> Cost {
        debug_assert!(from < self.size && to < self.size);
        self.data[from * self.size + to]
    }

    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.at(from, to) != UNREACHABLE
    }
}
