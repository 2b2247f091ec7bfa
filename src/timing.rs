//! Scoped stage timing.
//!
//! A [`ScopedTimer`] is created by the caller around a piece of work and
//! hands the elapsed time to an injected [`Reporter`] when it is finished or
//! dropped. Nothing here is global; the pipeline itself does not time
//! anything.
//!
//! ```
//! use zenmono::timing::{CollectingReporter, ScopedTimer};
//!
//! let reporter = CollectingReporter::default();
//! {
//!     let _t = ScopedTimer::start("decode", &reporter);
//!     // ... work ...
//! }
//! assert_eq!(reporter.samples()[0].0, "decode");
//! ```

use std::cell::RefCell;
use std::time::{Duration, Instant};

/// Receives one measurement per finished timer.
pub trait Reporter {
    fn report(&self, label: &str, elapsed: Duration);
}

/// Logs measurements at `info` level through the `log` facade.
///
/// The message comes from a template in which `{label}` and `{duration}`
/// are substituted; the duration is in seconds with `precision` decimals.
#[derive(Clone, Debug)]
pub struct LogReporter {
    template: String,
    precision: usize,
}

impl LogReporter {
    pub const DEFAULT_TEMPLATE: &'static str = "({label}) {duration} seconds.";

    pub fn new(template: impl Into<String>, precision: usize) -> Self {
        Self {
            template: template.into(),
            precision,
        }
    }

    pub fn render(&self, label: &str, elapsed: Duration) -> String {
        let seconds = format!("{:.*}", self.precision, elapsed.as_secs_f64());
        self.template
            .replace("{label}", label)
            .replace("{duration}", &seconds)
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEMPLATE, 6)
    }
}

impl Reporter for LogReporter {
    fn report(&self, label: &str, elapsed: Duration) {
        log::info!("{}", self.render(label, elapsed));
    }
}

/// Keeps every measurement in order, for callers that want the numbers
/// back instead of a log line.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    samples: RefCell<Vec<(String, Duration)>>,
}

impl CollectingReporter {
    pub fn samples(&self) -> Vec<(String, Duration)> {
        self.samples.borrow().clone()
    }

    pub fn total(&self) -> Duration {
        self.samples.borrow().iter().map(|(_, d)| *d).sum()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, label: &str, elapsed: Duration) {
        self.samples.borrow_mut().push((label.into(), elapsed));
    }
}

/// Measures from construction until [`finish`](Self::finish) or drop,
/// whichever comes first, and reports exactly once.
pub struct ScopedTimer<'r> {
    label: String,
    start: Instant,
    reporter: &'r dyn Reporter,
    reported: bool,
}

impl<'r> ScopedTimer<'r> {
    pub fn start(label: impl Into<String>, reporter: &'r dyn Reporter) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
            reporter,
            reported: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the clock, report, and return the measurement.
    pub fn finish(mut self) -> Duration {
        self.report()
    }

    fn report(&mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if !self.reported {
            self.reported = true;
            self.reporter.report(&self.label, elapsed);
        }
        elapsed
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        self.report();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_on_finish() {
        let reporter = CollectingReporter::default();
        let timer = ScopedTimer::start("encode", &reporter);
        let elapsed = timer.finish();
        let samples = reporter.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0], ("encode".into(), elapsed));
    }

    #[test]
    fn reports_on_drop_in_creation_order() {
        let reporter = CollectingReporter::default();
        {
            let _decode = ScopedTimer::start("decode", &reporter);
        }
        {
            let _binarize = ScopedTimer::start("binarize", &reporter);
        }
        let labels: Vec<_> = reporter.samples().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["decode", "binarize"]);
        assert!(reporter.total() >= Duration::ZERO);
    }

    #[test]
    fn template_substitution() {
        let reporter = LogReporter::new("[{label}] took {duration}s ({label})", 3);
        assert_eq!(
            reporter.render("binarize", Duration::from_micros(1_234_567)),
            "[binarize] took 1.235s (binarize)"
        );
        assert_eq!(
            LogReporter::default().render("x", Duration::from_millis(1500)),
            "(x) 1.500000 seconds."
        );
    }
}
