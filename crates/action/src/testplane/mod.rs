//! Testplane integration: CLI facade, config view, failed-test records and
//! the browser cache built on top of them.

pub mod cache;
pub mod config;
pub mod facade;
pub mod postmortem;

pub use cache::{CacheDecision, RestoreOutcome, TestplaneCache};
pub use config::ResolvedConfig;
pub use facade::{compose_env, BrowserInventory, Testplane, Version};
pub use postmortem::{FailedTest, FailedTests, FailedTestsReport, PostMortemData};
