/// Pagination window over a listing of `total` rows.
///
/// A normalized window has `skip` aligned to `limit` and inside `[0, total)`,
/// or `skip == 0` when the listing is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u32,
    pub limit: u32,
    pub total: u64,
}

impl PageWindow {
    pub fn new(skip: u32, limit: u32, total: u64) -> Self {
        Self {
            skip,
            limit: limit.max(1),
            total,
        }
    }

    pub fn normalized(self) -> Self {
        let limit = self.limit.max(1);
        let step = u64::from(limit);
        let skip = u64::from(self.skip);
        let skip = if self.total == 0 {
            0
        } else if skip >= self.total {
            (self.total - 1) / step * step
        } else {
            skip / step * step
        };
        Self {
            skip: u32::try_from(skip).unwrap_or(u32::MAX / limit * limit),
            limit,
            total: self.total,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.skip) + u64::from(self.limit) < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.skip > 0
    }

    pub fn next(self) -> Self {
        let window = self.normalized();
        if window.has_next() {
            Self {
                skip: window.skip + window.limit,
                ..window
            }
        } else {
            window
        }
    }

    pub fn prev(self) -> Self {
        let window = self.normalized();
        Self {
            skip: window.skip.saturating_sub(window.limit),
            ..window
        }
    }

    /// Switches page size, keeping the first visible row on the new page.
    pub fn with_limit(self, limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            ..self
        }
        .normalized()
    }

    /// One-based page number.
    pub fn page_number(&self) -> u64 {
        u64::from(self.skip) / u64::from(self.limit.max(1)) + 1
    }

    pub fn page_count(&self) -> u64 {
        let limit = u64::from(self.limit.max(1));
        self.total.div_ceil(limit).max(1)
    }

    /// e.g. `"11-20 of 251"`.
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            return "0 of 0".to_string();
        }
        let first = u64::from(self.skip) + 1;
        let last = (u64::from(self.skip) + u64::from(self.limit)).min(self.total);
        format!("{first}-{last} of {}", self.total)
    }
}
