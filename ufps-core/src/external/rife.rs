//! Interpolation tool invocation.
//!
//! The interpolation tool is a directory of Python entry point scripts plus a
//! model directory. [`RifeSynthesizer`] runs one entry point with the
//! interpreter, working directory set to the tool root, and reports whether
//! it exited successfully along with the tail of its output.

use super::{FrameSynthesizer, SynthesisOutcome, SynthesisRequest};
use crate::error::{CoreError, CoreResult, diagnostic_tail};

use log::{debug, warn};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const DIAGNOSTIC_LINES: usize = 20;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long output readers may keep going once the process is gone. Processes
/// the tool spawned can hold its pipes open after it was killed.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Command line arguments for one invocation, after the script name.
#[must_use]
pub fn entry_point_args(request: &SynthesisRequest<'_>) -> Vec<String> {
    let mut args = vec![
        "--img".to_string(),
        request.input_dir.to_string_lossy().into_owned(),
        "--output".to_string(),
        request.output_dir.to_string_lossy().into_owned(),
        "--exp".to_string(),
        request.exponent.to_string(),
    ];
    if let Some(model_dir) = request.model_dir {
        args.push("--modelDir".to_string());
        args.push(model_dir.to_string_lossy().into_owned());
    }
    args
}

/// [`FrameSynthesizer`] that runs the tool's scripts with a Python interpreter.
#[derive(Debug, Clone)]
pub struct RifeSynthesizer {
    python_path: PathBuf,
    rife_dir: PathBuf,
    timeout: Option<Duration>,
}

impl RifeSynthesizer {
    pub fn new(python_path: impl Into<PathBuf>, rife_dir: impl Into<PathBuf>) -> Self {
        Self {
            python_path: python_path.into(),
            rife_dir: rife_dir.into(),
            timeout: None,
        }
    }

    /// Kills an invocation that runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn absolute(path: &Path) -> CoreResult<PathBuf> {
        Ok(std::path::absolute(path)?)
    }
}

/// Reads `reader` to the end on a background thread, sending the text when done.
fn drain<R: Read + Send + 'static>(reader: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut reader) = reader {
            let mut bytes = Vec::new();
            if reader.read_to_end(&mut bytes).is_ok() {
                text = String::from_utf8_lossy(&bytes).into_owned();
            }
        }
        let _ = tx.send(text);
    });
    rx
}

/// Collects drained output, giving up on readers still blocked after `deadline`.
fn collect_output(streams: [mpsc::Receiver<String>; 2], deadline: Instant) -> String {
    let mut output = String::new();
    for stream in streams {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match stream.recv_timeout(remaining) {
            Ok(text) => output.push_str(&text),
            Err(_) => debug!("Output pipe still held open, continuing without it"),
        }
    }
    output
}

/// Waits for `child`, killing it once `timeout` elapses. `None` means it was killed.
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= timeout {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl FrameSynthesizer for RifeSynthesizer {
    fn has_entry_point(&self, entry_point: &str) -> bool {
        self.rife_dir.join(entry_point).is_file()
    }

    fn invoke(&self, request: &SynthesisRequest<'_>) -> CoreResult<SynthesisOutcome> {
        // The process runs from the tool root, so relative paths would resolve there.
        let input_dir = Self::absolute(request.input_dir)?;
        let output_dir = Self::absolute(request.output_dir)?;
        let model_dir = request.model_dir.map(Self::absolute).transpose()?;
        let resolved = SynthesisRequest {
            input_dir: &input_dir,
            output_dir: &output_dir,
            model_dir: model_dir.as_deref(),
            ..request.clone()
        };

        let mut cmd = Command::new(&self.python_path);
        cmd.arg(request.entry_point)
            .args(entry_point_args(&resolved))
            .current_dir(&self.rife_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("Running interpolation: {cmd:?}");

        let label = format!("{} {}", self.python_path.display(), request.entry_point);
        let mut child = cmd
            .spawn()
            .map_err(|e| CoreError::CommandStart(label.clone(), e))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_timeout(&mut child, self.timeout)
            .map_err(|e| CoreError::CommandWait(label.clone(), e))?;

        let output = collect_output([stdout, stderr], Instant::now() + DRAIN_GRACE);
        let tail = diagnostic_tail(&output, DIAGNOSTIC_LINES);

        let outcome = match status {
            Some(status) if status.success() => SynthesisOutcome {
                success: true,
                diagnostic: tail,
            },
            Some(status) => SynthesisOutcome {
                success: false,
                diagnostic: format!("{label} exited with {status}\n{tail}").trim().to_string(),
            },
            None => {
                warn!("Interpolation attempt {label} timed out, killed");
                SynthesisOutcome {
                    success: false,
                    diagnostic: format!(
                        "{label} timed out after {}s\n{tail}",
                        self.timeout.map_or(0, |t| t.as_secs())
                    )
                    .trim()
                    .to_string(),
                }
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn request<'a>(entry: &'a str, input: &'a Path, output: &'a Path, model: Option<&'a Path>) -> SynthesisRequest<'a> {
        SynthesisRequest {
            entry_point: entry,
            input_dir: input,
            output_dir: output,
            exponent: 2,
            model_dir: model,
        }
    }

    #[test]
    fn args_include_model_dir_only_when_given() {
        let with = entry_point_args(&request("x.py", Path::new("/i"), Path::new("/o"), Some(Path::new("/m"))));
        assert_eq!(with, ["--img", "/i", "--output", "/o", "--exp", "2", "--modelDir", "/m"]);

        let without = entry_point_args(&request("x.py", Path::new("/i"), Path::new("/o"), None));
        assert_eq!(without, ["--img", "/i", "--output", "/o", "--exp", "2"]);
    }

    #[test]
    fn entry_points_resolve_against_tool_root() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("inference_img.py"), "").unwrap();
        let synth = RifeSynthesizer::new("python3", root.path());
        assert!(synth.has_entry_point("inference_img.py"));
        assert!(!synth.has_entry_point("inference_video.py"));
    }

    #[cfg(unix)]
    #[test]
    fn runs_from_tool_root_and_reports_success() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        let input = work.path().join("in");
        let output = work.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(
            root.path().join("interp.sh"),
            "pwd > \"$4/cwd.txt\"\ntouch \"$4/0000000.png\"\necho done\n",
        )
        .unwrap();

        let synth = RifeSynthesizer::new("sh", root.path());
        let outcome = synth.invoke(&request("interp.sh", &input, &output, None)).unwrap();
        assert!(outcome.success);
        assert!(output.join("0000000.png").exists());

        let cwd = fs::read_to_string(output.join("cwd.txt")).unwrap();
        assert_eq!(
            fs::canonicalize(cwd.trim()).unwrap(),
            fs::canonicalize(root.path()).unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn failure_keeps_diagnostics() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        fs::write(root.path().join("bad.sh"), "echo 'CUDA out of memory' >&2\nexit 3\n").unwrap();

        let synth = RifeSynthesizer::new("sh", root.path());
        let outcome = synth.invoke(&request("bad.sh", work.path(), work.path(), None)).unwrap();
        assert!(!outcome.success);
        assert!(outcome.diagnostic.contains("CUDA out of memory"));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_the_attempt() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        fs::write(root.path().join("slow.sh"), "exec sleep 10\n").unwrap();

        let synth = RifeSynthesizer::new("sh", root.path()).with_timeout(Some(Duration::from_millis(300)));
        let started = Instant::now();
        let outcome = synth.invoke(&request("slow.sh", work.path(), work.path(), None)).unwrap();
        assert!(!outcome.success);
        assert!(outcome.diagnostic.contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_is_not_held_up_by_background_children() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        fs::write(
            root.path().join("forks.sh"),
            "echo 'loading model' >&2\nsleep 10 &\nexec sleep 10\n",
        )
        .unwrap();

        let synth = RifeSynthesizer::new("sh", root.path()).with_timeout(Some(Duration::from_millis(300)));
        let started = Instant::now();
        let outcome = synth.invoke(&request("forks.sh", work.path(), work.path(), None)).unwrap();
        assert!(!outcome.success);
        assert!(outcome.diagnostic.contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn missing_interpreter_is_a_start_error() {
        let root = tempdir().unwrap();
        let synth = RifeSynthesizer::new("/nonexistent/python", root.path());
        let err = synth
            .invoke(&request("x.py", root.path(), root.path(), None))
            .unwrap_err();
        assert!(matches!(err, CoreError::CommandStart(..)));
    }
}
