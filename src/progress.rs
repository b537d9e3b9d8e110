// src/progress.rs
/// Progress reporting for long-running stages (the crawl).
/// Frontends implement this to surface status; the library only calls it.
pub trait Progress {
    /// Called at the start of a phase with the number of items in it.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One unit completed (a content batch, a page's traffic).
    fn item_done(&mut self, _label: &str) {}

    /// One unit gave up after retries.
    fn item_failed(&mut self, _label: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Logs a line every `every` items and at phase end.
pub struct LogProgress {
    every: usize,
    total: usize,
    done: usize,
    failed: usize,
}

impl LogProgress {
    pub fn new(every: usize) -> Self {
        Self { every: every.max(1), total: 0, done: 0, failed: 0 }
    }

    fn tick(&mut self) {
        let seen = self.done + self.failed;
        if seen % self.every == 0 || seen == self.total {
            log::info!("  {seen}/{} ({} failed)", self.total, self.failed);
        }
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.failed = 0;
    }

    fn log(&mut self, msg: &str) {
        log::info!("{msg}");
    }

    fn item_done(&mut self, _label: &str) {
        self.done += 1;
        self.tick();
    }

    fn item_failed(&mut self, label: &str) {
        self.failed += 1;
        log::debug!("Failed: {label}");
        self.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_reset_per_phase() {
        let mut p = LogProgress::new(2);
        p.begin(3);
        p.item_done("a");
        p.item_failed("b");
        p.begin(1);
        assert_eq!((p.total, p.done, p.failed), (1, 0, 0));
    }
}
