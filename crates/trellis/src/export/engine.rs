//! Layout engines.
//!
//! A [`LayoutEngine`] takes DOT text and writes a laid-out artifact. The only
//! production implementation is [`Graphviz`], which shells out to the `dot`
//! binary; tests substitute their own engines.

use std::{
    io::{self, Read, Write},
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};

use crate::{
    TrellisError,
    config::{EngineConfig, OutputFormat},
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Abstraction over graph layout backends.
pub trait LayoutEngine {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Lays out `dot` and writes the result to `output` in `format`.
    ///
    /// # Errors
    ///
    /// - [`TrellisError::LayoutEngineUnavailable`] if the engine cannot start.
    /// - [`TrellisError::LayoutEngine`] if it rejects the input.
    /// - [`TrellisError::Timeout`] if it runs past its deadline.
    fn layout(&self, dot: &str, format: OutputFormat, output: &Path) -> Result<(), TrellisError>;
}

/// Graphviz `dot` run as a child process.
#[derive(Debug, Clone)]
pub struct Graphviz {
    binary: String,
    timeout: Duration,
}

impl Default for Graphviz {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Graphviz {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            binary: config.binary().to_string(),
            timeout: config.timeout(),
        }
    }

    fn spawn(&self, format: OutputFormat, output: &Path) -> Result<Child, TrellisError> {
        Command::new(&self.binary)
            .arg(format!("-T{}", format.extension()))
            .arg("-o")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TrellisError::LayoutEngineUnavailable {
                binary: self.binary.clone(),
                source,
            })
    }
}

impl LayoutEngine for Graphviz {
    fn name(&self) -> &str {
        &self.binary
    }

    fn layout(&self, dot: &str, format: OutputFormat, output: &Path) -> Result<(), TrellisError> {
        debug!(
            engine = self.binary.as_str(),
            format:% = format,
            output = output.display().to_string(),
            timeout:? = self.timeout;
            "Invoking layout engine"
        );
        let mut child = self.spawn(format, output)?;

        // Feed stdin and drain stderr on their own threads so a large graph
        // or a chatty engine cannot deadlock on a full pipe.
        let stdin = child.stdin.take();
        let input = dot.to_string();
        let writer = thread::spawn(move || -> io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });
        let stderr = child.stderr.take();
        let reader = thread::spawn(move || {
            let mut text = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut text);
            }
            text
        });

        let Some(status) = wait_with_timeout(&mut child, self.timeout)? else {
            warn!(
                engine = self.binary.as_str(),
                timeout:? = self.timeout;
                "Layout engine timed out, killing it"
            );
            let _ = child.kill();
            let _ = child.wait();
            return Err(TrellisError::Timeout {
                operation: format!("Layout engine `{}`", self.binary),
                timeout: self.timeout,
            });
        };

        let stderr = reader.join().unwrap_or_default();
        let stderr = stderr.trim();
        if !status.success() {
            return Err(TrellisError::LayoutEngine(format!(
                "`{}` exited with {status}: {stderr}",
                self.binary
            )));
        }
        if let Ok(Err(err)) = writer.join() {
            return Err(TrellisError::LayoutEngine(format!(
                "failed to send graph to `{}`: {err}",
                self.binary
            )));
        }
        if !stderr.is_empty() {
            warn!(engine = self.binary.as_str(), stderr; "Layout engine reported warnings");
        }
        Ok(())
    }
}

/// Polls `child` until it exits or `timeout` elapses. `None` means the
/// deadline passed with the child still running.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<ExitStatus>, TrellisError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let dir = tempdir().unwrap();
        let engine = Graphviz::new(&EngineConfig::new(
            "trellis-no-such-layout-engine",
            Duration::from_secs(5),
        ));

        let result = engine.layout("digraph {}", OutputFormat::Png, &dir.path().join("out.png"));

        match result {
            Err(TrellisError::LayoutEngineUnavailable { binary, .. }) => {
                assert_eq!(binary, "trellis-no-such-layout-engine");
            }
            other => panic!("expected unavailable engine, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_engine_reports_exit_status() {
        let dir = tempdir().unwrap();
        let engine = Graphviz::new(&EngineConfig::new("false", Duration::from_secs(5)));

        let result = engine.layout("digraph {}", OutputFormat::Svg, &dir.path().join("out.svg"));

        assert!(matches!(result, Err(TrellisError::LayoutEngine(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_engine_is_killed_after_timeout() {
        use std::{fs, os::unix::fs::PermissionsExt};

        let dir = tempdir().unwrap();
        let script = dir.path().join("slow-dot");
        fs::write(&script, "#!/bin/sh\nexec sleep 5\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let engine = Graphviz::new(&EngineConfig::new(
            script.to_string_lossy(),
            Duration::from_millis(50),
        ));
        let output = dir.path().join("out.png");

        let started = Instant::now();
        let result = engine.layout("digraph {}", OutputFormat::Png, &output);

        match result {
            Err(TrellisError::Timeout { timeout, .. }) => {
                assert_eq!(timeout, Duration::from_millis(50));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_gives_up() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();

        let status = wait_with_timeout(&mut child, Duration::from_millis(50)).unwrap();

        assert!(status.is_none());
        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_default_engine_is_dot() {
        assert_eq!(Graphviz::default().name(), "dot");
    }
}
