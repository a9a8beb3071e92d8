//! Failed test records left behind by a Testplane run

use std::collections::HashMap;

use serde::Deserialize;

/// One entry of Testplane's last-failed JSON file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedTest {
    pub full_title: String,
    pub browser_id: String,
}

impl FailedTest {
    pub fn new(full_title: impl Into<String>, browser_id: impl Into<String>) -> Self {
        Self {
            full_title: full_title.into(),
            browser_id: browser_id.into(),
        }
    }
}

/// Browser ids per test title, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailedTests {
    entries: Vec<(String, Vec<String>)>,
}

impl FailedTests {
    pub fn group_by_full_title(tests: &[FailedTest]) -> Self {
        let mut entries: Vec<(String, Vec<String>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for test in tests {
            match index.get(test.full_title.as_str()) {
                Some(&position) => entries[position].1.push(test.browser_id.clone()),
                None => {
                    index.insert(&test.full_title, entries.len());
                    entries.push((test.full_title.clone(), vec![test.browser_id.clone()]));
                }
            }
        }

        Self { entries }
    }

    pub fn from_entries<T, B>(entries: impl IntoIterator<Item = (T, B)>) -> Self
    where
        T: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(title, browsers)| (title.into(), browsers.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    pub fn get(&self, full_title: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(title, _)| title == full_title)
            .map(|(_, browsers)| browsers.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(title, browsers)| (title.as_str(), browsers.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTestsReport {
    /// Number of failed (test, browser) records
    pub count: usize,
    pub tests: FailedTests,
}

impl FailedTestsReport {
    pub fn from_records(records: &[FailedTest]) -> Self {
        Self {
            count: records.len(),
            tests: FailedTests::group_by_full_title(records),
        }
    }
}

/// What could be recovered after a failed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostMortemData {
    pub failed: Option<FailedTestsReport>,
}

impl PostMortemData {
    pub fn unavailable() -> Self {
        Self { failed: None }
    }

    pub fn failed_tests_count(&self) -> Option<usize> {
        self.failed.as_ref().map(|report| report.count)
    }

    pub fn failed_tests(&self) -> Option<&FailedTests> {
        self.failed.as_ref().map(|report| &report.tests)
    }
}
