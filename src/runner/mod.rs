pub mod discovery;
pub mod environment;
pub mod notifier;
pub mod reporter;
pub mod script_runner;
pub mod statement;
pub mod types;

pub use discovery::{COLLECT_TESTS, discover};
pub use environment::ScriptEnvironment;
pub use notifier::{Description, Failure, NotifierEvent, RecordingNotifier, RunNotifier};
pub use reporter::ConsoleNotifier;
pub use script_runner::ScriptRunner;
pub use statement::SET_TEST_INSTANCE;
pub use types::{TestOutcome, TestResult, TestSummary};
