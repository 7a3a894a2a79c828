//! Shared helpers for the CLI integration suite.
//!
//! - `cli_runner`: [`cli_runner::CliRunner`] runs the `popcorn` binary in a
//!   scratch working directory with a clean `POPCORN_*` environment and
//!   captures exit code, stdout and stderr.
//! - `pool_fixture`: [`pool_fixture::PoolFixture`] lays out a gacha asset
//!   tree in a temporary directory.
//!
//! ```rust,ignore
//! use crate::helpers::{cli_runner::CliRunner, pool_fixture::PoolFixture};
//!
//! let pools = PoolFixture::standard();
//! let cli = CliRunner::new();
//! let res = cli.run(&["gacha", "--pool-dir", pools.root_arg(), "--draws", "10"]);
//! assert_eq!(res.exit_code, 0);
//! ```
pub mod error {
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    pub struct TestError {
        pub kind: TestErrorKind,
        pub message: String,
        pub source: Option<Box<dyn StdError + Send + Sync>>,
    }

    impl TestError {
        pub fn new(kind: TestErrorKind, message: impl Into<String>) -> Self {
            Self {
                kind,
                message: message.into(),
                source: None,
            }
        }

        pub fn with_source(
            kind: TestErrorKind,
            message: impl Into<String>,
            source: impl StdError + Send + Sync + 'static,
        ) -> Self {
            Self {
                kind,
                message: message.into(),
                source: Some(Box::new(source)),
            }
        }
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }

    impl StdError for TestError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source
                .as_deref()
                .map(|err| err as &(dyn StdError + 'static))
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TestErrorKind {
        BinaryNotFound,
        FileOperationFailed,
    }

    impl fmt::Display for TestErrorKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                TestErrorKind::BinaryNotFound => "binary not found",
                TestErrorKind::FileOperationFailed => "file operation failed",
            };
            f.write_str(name)
        }
    }
}

pub use error::{TestError, TestErrorKind};
pub mod cli_runner;
pub mod pool_fixture;
