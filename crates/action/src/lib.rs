//! Testplane CI step
//!
//! Runs Testplane inside a GitHub Actions job:
//! - Caches locally downloaded browsers keyed by the configured browser set
//! - Installs browser dependencies and runs the tests through a package manager
//! - Publishes step outputs and a job summary with the failed tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  run_action (orchestrator)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestplaneCache                                             │
//! │    ├── init()          config + list-browsers, once         │
//! │    ├── restore_cache() before install-deps                  │
//! │    └── save_cache()    after a passing run                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Testplane (CLI facade over PackageManagerExec)             │
//! │    ├── version / list_browsers / config   (memoized)        │
//! │    ├── install_dependencies()                               │
//! │    ├── run() -> exit code                                   │
//! │    └── get_post_mortem_data() -> failed tests               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  summary: success / failure job summary                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod constants;
pub mod error;
pub mod inputs;
pub mod orchestrator;
pub mod paths;
pub mod report;
pub mod summary;
pub mod testplane;

pub use error::{ActionError, ActionResult};
pub use inputs::{ActionInputs, RunContext};
pub use orchestrator::{run_action, RunOutcome};
pub use testplane::{Testplane, TestplaneCache};
