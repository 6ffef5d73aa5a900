use ghpulse_core::ProgressObserver;

/// Counts completed items and forwards the fraction to an optional observer.
pub(crate) struct Tracker<'a> {
    observer: Option<&'a dyn ProgressObserver>,
    total: usize,
    done: usize,
}

impl<'a> Tracker<'a> {
    pub(crate) fn new(observer: Option<&'a dyn ProgressObserver>, total: usize) -> Self {
        Self {
            observer,
            total,
            done: 0,
        }
    }

    pub(crate) fn advance(&mut self) {
        self.done = (self.done + 1).min(self.total);
        if let Some(observer) = self.observer {
            if self.total > 0 {
                observer.report(self.done as f64 / self.total as f64);
            }
        }
    }
}

/// Maps a step's `[0, 1]` fraction onto `[start, end]` of the overall run.
pub(crate) struct Phase<'a> {
    observer: &'a dyn ProgressObserver,
    start: f64,
    end: f64,
}

impl<'a> Phase<'a> {
    pub(crate) fn new(observer: &'a dyn ProgressObserver, start: f64, end: f64) -> Self {
        Self {
            observer,
            start,
            end,
        }
    }
}

impl ProgressObserver for Phase<'_> {
    fn report(&self, fraction: f64) {
        self.observer
            .report(self.start + fraction.clamp(0.0, 1.0) * (self.end - self.start));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn reports_fraction_per_step() {
        let seen = RefCell::new(Vec::new());
        let observer = |f: f64| seen.borrow_mut().push(f);
        let mut tracker = Tracker::new(Some(&observer), 4);
        for _ in 0..4 {
            tracker.advance();
        }
        assert_eq!(*seen.borrow(), vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn never_exceeds_one() {
        let seen = RefCell::new(Vec::new());
        let observer = |f: f64| seen.borrow_mut().push(f);
        let mut tracker = Tracker::new(Some(&observer), 1);
        tracker.advance();
        tracker.advance();
        assert_eq!(*seen.borrow(), vec![1.0, 1.0]);
    }

    #[test]
    fn silent_without_observer_or_work() {
        let mut tracker = Tracker::new(None, 3);
        tracker.advance();

        let seen = RefCell::new(Vec::new());
        let observer = |f: f64| seen.borrow_mut().push(f);
        let mut empty = Tracker::new(Some(&observer), 0);
        empty.advance();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn phase_rescales_into_its_span() {
        let seen = RefCell::new(Vec::new());
        let observer = |f: f64| seen.borrow_mut().push(f);
        let phase = Phase::new(&observer, 0.5, 1.0);
        phase.report(0.0);
        phase.report(0.5);
        phase.report(1.0);
        assert_eq!(*seen.borrow(), vec![0.5, 0.75, 1.0]);
    }
}
