use std::path::PathBuf;
use std::process::{Command, Stdio};

use tempfile::TempDir;

use crate::helpers::{TestError, TestErrorKind};

/// Variables the binary would otherwise inherit from the developer's shell.
const POPCORN_ENV: &[&str] = &[
    "POPCORN_CONFIG",
    "POPCORN_SEED",
    "POPCORN_STARTING_BALANCE",
    "POPCORN_MEMORY_PAIRS",
    "POPCORN_POOL_DIR",
];

#[derive(Debug)]
pub struct CliRunner {
    binary_path: PathBuf,
    work_dir: TempDir,
}

#[derive(Debug, Clone)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliRunner {
    pub fn new() -> Self {
        Self::try_new().expect("CLI runner")
    }

    pub fn try_new() -> Result<Self, TestError> {
        let work_dir = TempDir::new().map_err(|err| {
            TestError::with_source(
                TestErrorKind::FileOperationFailed,
                "failed to create temporary CLI workspace",
                err,
            )
        })?;
        let binary_path = PathBuf::from(env!("CARGO_BIN_EXE_popcorn"));
        if !binary_path.is_file() {
            return Err(TestError::new(
                TestErrorKind::BinaryNotFound,
                format!("{} does not exist", binary_path.display()),
            ));
        }
        Ok(Self {
            binary_path,
            work_dir,
        })
    }

    pub fn run(&self, args: &[&str]) -> CliResult {
        self.run_inner(args, &[], None)
    }

    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> CliResult {
        self.run_inner(args, env, None)
    }

    pub fn run_with_input(&self, args: &[&str], input: &str) -> CliResult {
        self.run_inner(args, &[], Some(input))
    }

    /// Writes `content` into the runner's working directory and returns its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture file");
        path
    }

    fn run_inner(&self, args: &[&str], env: &[(&str, &str)], input: Option<&str>) -> CliResult {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(args)
            .current_dir(self.work_dir.path())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for key in POPCORN_ENV {
            cmd.env_remove(key);
        }
        for (key, value) in env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().expect("failed to spawn CLI binary");
        if let Some(payload) = input {
            use std::io::Write as _;
            if let Some(mut stdin) = child.stdin.take() {
                let _ = stdin.write_all(payload.as_bytes());
            }
        }
        let output = child.wait_with_output().expect("failed to read output");

        CliResult {
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
