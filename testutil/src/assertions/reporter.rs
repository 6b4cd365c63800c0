use log::error;

/// A non-fatal failure channel. A failed check calls [`Reporter::fail`] and the test keeps
/// running, so a single run can surface several failures.
pub trait Reporter {
    fn fail(&mut self, message: String);
}

/// Captures failures without logging or panicking.
impl Reporter for Vec<String> {
    fn fail(&mut self, message: String) {
        self.push(message);
    }
}

impl<R> Reporter for &mut R
where
    R: Reporter + ?Sized,
{
    fn fail(&mut self, message: String) {
        (**self).fail(message)
    }
}

/// Logs every failure as it happens and fails the test once all checks have run.
///
/// The collected failures cause a panic on [`SoftAssertions::finish`], or when the value is
/// dropped, unless they were taken with [`SoftAssertions::into_failures`].
#[derive(Debug, Default)]
pub struct SoftAssertions {
    failures: Vec<String>,
}

impl SoftAssertions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Takes the collected failures. Nothing is raised afterwards.
    pub fn into_failures(mut self) -> Vec<String> {
        std::mem::take(&mut self.failures)
    }

    /// Panics with every collected failure, if there are any.
    pub fn finish(mut self) {
        let failures = std::mem::take(&mut self.failures);
        raise(failures);
    }
}

impl Reporter for SoftAssertions {
    fn fail(&mut self, message: String) {
        error!("{}", message);
        self.failures.push(message);
    }
}

impl Drop for SoftAssertions {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let failures = std::mem::take(&mut self.failures);
        raise(failures);
    }
}

#[allow(clippy::panic)]
fn raise(failures: Vec<String>) {
    if !failures.is_empty() {
        panic!(
            "{} assertion(s) failed:\n  {}",
            failures.len(),
            failures.join("\n  ")
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clean_run_does_not_panic() {
        let soft = SoftAssertions::new();
        assert!(soft.is_clean());
        soft.finish();
    }

    #[test]
    fn failures_can_be_taken() {
        let mut soft = SoftAssertions::new();
        soft.fail("first".to_string());
        soft.fail("second".to_string());
        assert_eq!(soft.failures().len(), 2);
        assert_eq!(soft.into_failures(), vec!["first", "second"]);
    }

    #[test]
    #[should_panic(expected = "2 assertion(s) failed")]
    fn finish_panics_with_all_failures() {
        let mut soft = SoftAssertions::new();
        soft.fail("first".to_string());
        soft.fail("second".to_string());
        soft.finish();
    }

    #[test]
    #[should_panic(expected = "forgotten")]
    fn drop_panics_with_pending_failures() {
        let mut soft = SoftAssertions::new();
        soft.fail("forgotten".to_string());
    }

    #[test]
    fn vec_reporter_collects() {
        let mut failures = Vec::new();
        failures.fail("boom".to_string());
        assert_eq!(failures, vec!["boom"]);
    }
}
