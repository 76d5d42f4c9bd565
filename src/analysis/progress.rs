//! Advisory progress reporting

/// Steps between two progress reports.
const INTERVAL: usize = 256;

/// Forwards progress to an optional caller-supplied callback at bounded
/// intervals, never reporting a smaller value than it already has.
pub struct Progress<'p> {
    callback: Option<&'p mut dyn FnMut(usize, usize)>,
    total: usize,
    reported: usize,
    next: usize,
}

impl<'p> Progress<'p> {
    pub fn new(callback: Option<&'p mut dyn FnMut(usize, usize)>, total: usize) -> Self {
        Progress {
            callback,
            total,
            reported: 0,
            next: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn report(&mut self, done: usize) {
        let done = done.min(self.total).max(self.reported);
        if done < self.next {
            return;
        }

        self.reported = done;
        self.next = done + INTERVAL;
        if let Some(callback) = &mut self.callback {
            callback(done, self.total);
        }
    }

    pub fn finish(&mut self) {
        self.reported = self.total;
        if let Some(callback) = &mut self.callback {
            callback(self.total, self.total);
        }
    }
}
