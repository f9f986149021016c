//! Downstream site build invocation

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;
use regex::Regex;
use reskin_core::ArtifactVersion;

use crate::error::{Result, WorkflowError};

static MAVEN_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Apache Maven (\S+)").expect("static regex is valid"));

/// Lines of build output kept for the failure message
const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub goals: Vec<String>,
    pub pom_file: PathBuf,
    pub show_errors: bool,
    pub debug: bool,
    /// `-Dkey=value` system properties
    pub properties: Vec<(String, String)>,
    pub profiles: Vec<String>,
}

impl InvocationRequest {
    pub fn new(goal: impl Into<String>, pom_file: impl Into<PathBuf>) -> Self {
        Self {
            goals: vec![goal.into()],
            pom_file: pom_file.into(),
            show_errors: true,
            debug: false,
            properties: Vec::new(),
            profiles: Vec::new(),
        }
    }

    /// Command-line arguments, goals last
    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.pom_file.display().to_string()];
        if self.show_errors {
            args.push("-e".to_string());
        }
        if self.debug {
            args.push("-X".to_string());
        }
        for (key, value) in &self.properties {
            args.push(format!("-D{}={}", key, value));
        }
        if !self.profiles.is_empty() {
            args.push("-P".to_string());
            args.push(self.profiles.join(","));
        }
        args.extend(self.goals.iter().cloned());
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub output_tail: String,
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Downstream build invoker collaborator
pub trait Invoker {
    /// Version of the build tool itself
    fn tooling_version(&self) -> Result<ArtifactVersion>;

    fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResult>;
}

/// Runs the `mvn` executable
#[derive(Debug, Clone)]
pub struct MavenInvoker {
    executable: PathBuf,
}

impl MavenInvoker {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Find `mvn`: an explicit path first, then `MAVEN_HOME`/`M2_HOME`, then
    /// `PATH`
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }
        let name = if cfg!(windows) { "mvn.cmd" } else { "mvn" };
        for var in ["MAVEN_HOME", "M2_HOME"] {
            if let Some(home) = std::env::var_os(var) {
                let candidate = PathBuf::from(home).join("bin").join(name);
                if candidate.is_file() {
                    return Ok(Self::new(candidate));
                }
            }
        }
        which::which(name)
            .map(Self::new)
            .map_err(|e| WorkflowError::ToolingNotFound {
                message: format!("{} ({})", name, e),
            })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Invoker for MavenInvoker {
    fn tooling_version(&self) -> Result<ArtifactVersion> {
        let output = Command::new(&self.executable).arg("--version").output()?;
        let text = String::from_utf8_lossy(&output.stdout);
        parse_tooling_version(&text).ok_or_else(|| WorkflowError::ToolingNotFound {
            message: format!(
                "could not read a version from '{} --version'",
                self.executable.display()
            ),
        })
    }

    fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResult> {
        let args = request.arguments();
        tracing::debug!(executable = %self.executable.display(), ?args, "invoking");

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let mut tail: VecDeque<String> = VecDeque::with_capacity(OUTPUT_TAIL_LINES);
        let streamed = match child.stdout.take() {
            Some(stdout) => echo_output(stdout, &mut tail),
            None => Ok(()),
        };
        if let Err(err) = streamed {
            // the build may be blocked on a full pipe
            let _ = child.kill();
            child.wait()?;
            return Err(err.into());
        }

        let status = child.wait()?;
        Ok(InvocationResult {
            exit_code: status.code(),
            output_tail: Vec::from(tail).join("\n"),
        })
    }
}

/// Copy build output to the console line by line, keeping the last lines.
/// Output is decoded lossily since builds print in the platform charset.
fn echo_output(stdout: impl Read, tail: &mut VecDeque<String>) -> std::io::Result<()> {
    let mut reader = BufReader::new(stdout);
    let mut console = std::io::stdout().lock();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        writeln!(console, "{}", line)?;
        if tail.len() == OUTPUT_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line.to_string());
    }
}

/// Version from `mvn --version` output
pub fn parse_tooling_version(output: &str) -> Option<ArtifactVersion> {
    MAVEN_VERSION
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| ArtifactVersion::new(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tooling_version() {
        let output = "Apache Maven 3.9.6 (bc0240f3c744dd6b6ec2920b3cd08dcc295161ae)\n\
                      Maven home: /usr/share/maven\nJava version: 17.0.9";
        assert_eq!(parse_tooling_version(output).unwrap().as_str(), "3.9.6");
        assert!(parse_tooling_version("command not found").is_none());
    }

    #[test]
    fn test_request_arguments() {
        let mut request = InvocationRequest::new("site-deploy", "/work/pom.xml");
        request.properties.push(("skipTests".to_string(), "true".to_string()));
        request.profiles = vec!["docs".to_string(), "release".to_string()];
        request.debug = true;

        assert_eq!(
            request.arguments(),
            vec![
                "-f",
                "/work/pom.xml",
                "-e",
                "-X",
                "-DskipTests=true",
                "-P",
                "docs,release",
                "site-deploy"
            ]
        );
    }

    #[test]
    fn test_explicit_executable_wins() {
        let invoker = MavenInvoker::locate(Some(Path::new("/opt/maven/bin/mvn"))).unwrap();
        assert_eq!(invoker.executable(), Path::new("/opt/maven/bin/mvn"));
    }

    #[cfg(unix)]
    #[test]
    fn test_invoke_reports_exit_code_and_tail() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-mvn");
        std::fs::write(&script, "#!/bin/sh\necho \"building $*\"\nexit 3\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let result = MavenInvoker::new(&script)
            .invoke(&InvocationRequest::new("site", "pom.xml"))
            .unwrap();
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.is_success());
        assert_eq!(result.output_tail, "building -f pom.xml -e site");
    }

    #[cfg(unix)]
    #[test]
    fn test_invoke_tolerates_non_utf8_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-mvn");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf 'Caf\\351 built\\r\\nBUILD SUCCESS\\n'\nexit 0\n",
        )
        .unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let result = MavenInvoker::new(&script)
            .invoke(&InvocationRequest::new("site", "pom.xml"))
            .unwrap();
        assert!(result.is_success());
        assert_eq!(result.output_tail, "Caf\u{FFFD} built\nBUILD SUCCESS");
    }
}
