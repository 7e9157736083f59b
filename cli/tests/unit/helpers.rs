//! Shared test helpers: a scripted docker runner, reporters and config builders.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::process::{ExitStatus, Output};

use anyhow::Result;
use dockhand_cli::application::ports::{
    AuthEvidence, CommandRunner, CredentialCheck, ProgressReporter,
};
use dockhand_cli::domain::config::{DeployConfig, EnvOverrides, HostContext};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Scripted docker runner ───────────────────────────────────────────────────

/// Records every invocation and answers like a host with docker installed.
///
/// Captured calls (`run`) and terminal-attached steps (`run_status`) are kept
/// apart so tests can assert the step order without the probes in between.
pub struct RecordingRunner {
    pub probes: RefCell<Vec<String>>,
    pub steps: RefCell<Vec<String>>,
    docker_installed: bool,
    compose_installed: bool,
    logged_in: bool,
    failure: Option<(String, i32)>,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self {
            probes: RefCell::new(Vec::new()),
            steps: RefCell::new(Vec::new()),
            docker_installed: true,
            compose_installed: true,
            logged_in: true,
            failure: None,
        }
    }
}

impl RecordingRunner {
    pub fn without_docker() -> Self {
        Self {
            docker_installed: false,
            ..Self::default()
        }
    }

    pub fn without_compose() -> Self {
        Self {
            compose_installed: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn logged_in(mut self, logged_in: bool) -> Self {
        self.logged_in = logged_in;
        self
    }

    /// Make the first step whose command line starts with `prefix` exit with `code`.
    #[must_use]
    pub fn failing(mut self, prefix: &str, code: i32) -> Self {
        self.failure = Some((prefix.to_string(), code));
        self
    }

    /// Leading word of each recorded step, e.g. `["build", "push", ...]`.
    pub fn step_verbs(&self) -> Vec<String> {
        self.steps
            .borrow()
            .iter()
            .map(|line| {
                let mut words = line.split_whitespace();
                match words.next() {
                    // `compose -f a [-f b] <verb>`: skip the file arguments.
                    Some("compose") => {
                        let rest: Vec<&str> = words.collect();
                        let mut i = 0;
                        while rest.get(i) == Some(&"-f") {
                            i += 2;
                        }
                        format!("compose {}", rest.get(i).copied().unwrap_or_default())
                    }
                    Some(verb) => verb.to_string(),
                    None => String::new(),
                }
            })
            .collect()
    }

    pub fn probed(&self, prefix: &str) -> bool {
        self.probes.borrow().iter().any(|p| p.starts_with(prefix))
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        assert_eq!(program, "docker");
        let line = args.join(" ");
        self.probes.borrow_mut().push(line.clone());
        if !self.docker_installed {
            anyhow::bail!("No such file or directory (os error 2)");
        }
        if line == "compose version" && !self.compose_installed {
            return Ok(err_output(1, b"docker: 'compose' is not a docker command."));
        }
        if line.starts_with("login --get-login") {
            return Ok(if self.logged_in {
                ok_output(b"operator\n")
            } else {
                err_output(1, b"not logged in")
            });
        }
        Ok(ok_output(b"Docker version 27.0.3\n"))
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        assert_eq!(program, "docker");
        let line = args.join(" ");
        self.steps.borrow_mut().push(line.clone());
        match &self.failure {
            Some((prefix, code)) if line.starts_with(prefix.as_str()) => Ok(exit_status(*code)),
            _ => Ok(exit_status(0)),
        }
    }
}

// ── Credential check stub ────────────────────────────────────────────────────

/// Answers every probe with a fixed result and counts calls.
pub struct FixedCheck {
    pub evidence: AuthEvidence,
    pub calls: Cell<usize>,
}

impl FixedCheck {
    pub fn new(evidence: AuthEvidence) -> Self {
        Self {
            evidence,
            calls: Cell::new(0),
        }
    }
}

impl CredentialCheck for &FixedCheck {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn probe(&self, _registry: &str) -> AuthEvidence {
        self.calls.set(self.calls.get() + 1);
        self.evidence
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

/// Collects messages instead of printing them.
#[derive(Default)]
pub struct CollectingReporter {
    pub messages: RefCell<Vec<String>>,
}

impl ProgressReporter for CollectingReporter {
    fn step(&self, message: &str) {
        self.messages.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.borrow_mut().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(format!("warn: {message}"));
    }
    fn info(&self, message: &str) {
        self.messages.borrow_mut().push(format!("info: {message}"));
    }
}

// ── Config builders ──────────────────────────────────────────────────────────

/// Token handed out when no token is configured or persisted.
pub const GENERATED_TOKEN: &str =
    "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

/// Resolve `overrides` with `root/home` as home and `root/project` as project directory.
pub fn config_in(root: &Path, mut overrides: EnvOverrides) -> DeployConfig {
    let home = root.join("home");
    let project = root.join("project");
    std::fs::create_dir_all(&project).expect("project dir");
    if overrides.project_dir.is_none() {
        overrides.project_dir = Some(project.display().to_string());
    }
    let persisted = std::fs::read_to_string(project.join(".env")).unwrap_or_default();
    let persisted_token = persisted
        .lines()
        .find_map(|l| l.strip_prefix("DOCKHAND_GATEWAY_TOKEN="))
        .map(str::to_string);
    let host = HostContext {
        home: &home,
        cwd: &project,
        docker_config: None,
        persisted_token: persisted_token.as_deref(),
    };
    DeployConfig::resolve(overrides, &host, || GENERATED_TOKEN.to_string()).expect("config")
}
