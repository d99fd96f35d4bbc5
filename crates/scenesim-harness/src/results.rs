//! Test outcome bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Test result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
}

/// Individual test result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: f64,
    pub message: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl TestResult {
    pub fn pass(name: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Pass,
            duration_ms,
            message: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn fail(name: impl Into<String>, duration_ms: f64, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Fail,
            duration_ms,
            message: Some(message.into()),
            recorded_at: Utc::now(),
        }
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Error,
            duration_ms: 0.0,
            message: Some(message.into()),
            recorded_at: Utc::now(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

/// Aggregated test results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub duration_ms: f64,
    pub results: Vec<TestResult>,
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: TestResult) {
        self.total += 1;
        self.duration_ms += result.duration_ms;

        match result.status {
            TestStatus::Pass => self.passed += 1,
            TestStatus::Fail => self.failed += 1,
            TestStatus::Error => self.errors += 1,
        }

        self.results.push(result);
    }

    /// Percentage of results that passed.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}

/// The `window.testResults` record a test script publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRunRecord {
    pub success: bool,
    /// Milliseconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// What `assert_test_state` checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExpectations {
    pub name: String,
    pub should_succeed: bool,
    pub max_duration_ms: Option<f64>,
    pub min_duration_ms: Option<f64>,
}

impl Default for TestExpectations {
    fn default() -> Self {
        Self {
            name: "test".to_string(),
            should_succeed: true,
            max_duration_ms: None,
            min_duration_ms: None,
        }
    }
}

impl TestExpectations {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn allow_failure(mut self) -> Self {
        self.should_succeed = false;
        self
    }

    pub fn max_duration(mut self, ms: f64) -> Self {
        self.max_duration_ms = Some(ms);
        self
    }

    pub fn min_duration(mut self, ms: f64) -> Self {
        self.min_duration_ms = Some(ms);
        self
    }

    /// Every expectation `record` violates.
    pub fn violations(&self, record: &TestRunRecord) -> Vec<String> {
        let mut violations = Vec::new();
        if self.should_succeed && !record.success {
            violations.push(format!(
                "Test did not succeed: {}",
                record.error.as_deref().unwrap_or("no error reported")
            ));
        }
        if let Some(max) = self.max_duration_ms {
            if record.duration > max {
                violations.push(format!(
                    "Duration {:.1}ms exceeds maximum {max:.1}ms",
                    record.duration
                ));
            }
        }
        if let Some(min) = self.min_duration_ms {
            if record.duration < min {
                violations.push(format!(
                    "Duration {:.1}ms is below minimum {min:.1}ms",
                    record.duration
                ));
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(success: bool, duration: f64) -> TestRunRecord {
        TestRunRecord {
            success,
            duration,
            error: (!success).then(|| "boom".to_string()),
            timestamp: None,
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = TestSummary::new();
        summary.add(TestResult::pass("a", 10.0));
        summary.add(TestResult::pass("b", 5.0));
        summary.add(TestResult::fail("c", 1.0, "nope"));
        summary.add(TestResult::error("d", "no record"));

        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.pass_rate(), 50.0);
        assert_eq!(summary.duration_ms, 16.0);
        assert!(summary.results[3].message.is_some());
        assert_eq!(TestSummary::new().pass_rate(), 0.0);
    }

    #[test]
    fn test_expectations() {
        let expectations = TestExpectations::named("render").max_duration(100.0).min_duration(1.0);
        assert!(expectations.violations(&record(true, 50.0)).is_empty());
        assert_eq!(expectations.violations(&record(true, 150.0)).len(), 1);
        assert_eq!(expectations.violations(&record(true, 0.5)).len(), 1);

        let failed = expectations.violations(&record(false, 200.0));
        assert_eq!(failed.len(), 2);
        assert!(failed[0].contains("boom"));

        assert!(TestExpectations::default()
            .allow_failure()
            .violations(&record(false, 10.0))
            .is_empty());
    }

    #[test]
    fn test_run_record_from_script_shape() {
        let record: TestRunRecord = serde_json::from_value(serde_json::json!({
            "success": true,
            "duration": 12.5,
            "timestamp": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(record.success);
        assert!(record.error.is_none());
        assert!(record.timestamp.is_some());
    }
}
