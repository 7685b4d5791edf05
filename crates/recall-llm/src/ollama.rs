use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use recall_core::error::{Error, Result};
use recall_core::traits::{summary_prompt, Summarizer};
use recall_core::SummaryLength;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs `<bin> run <model> <prompt>` as a child process.
///
/// The prompt is passed as a single argument; no shell is involved.
pub struct OllamaSummarizer {
    bin: String,
    model: String,
    timeout: Duration,
    name: String,
}

impl OllamaSummarizer {
    pub fn new(bin: &str, model: &str, timeout: Duration) -> Self {
        Self { bin: bin.to_string(), model: model.to_string(), timeout, name: format!("ollama:{model}") }
    }

    fn run(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.bin)
            .arg("run")
            .arg(&self.model)
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Summarize(format!("failed to start '{}': {e}", self.bin)))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = wait_with_timeout(&mut child, self.timeout)?;

        let out = join_output(stdout, "stdout")?;
        let err = join_output(stderr, "stderr")?;
        if !status.success() {
            return Err(Error::Summarize(format!("'{} run' exited with {status}: {}", self.bin, err.trim())));
        }
        let summary = out.trim().to_string();
        if summary.is_empty() {
            return Err(Error::Summarize(format!("'{} run' produced no output", self.bin)));
        }
        Ok(summary)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut p) = pipe {
            if let Err(e) = p.read_to_string(&mut buf) {
                warn!("Failed to read child output: {}", e);
            }
        }
        buf
    })
}

fn join_output(handle: thread::JoinHandle<String>, stream: &str) -> Result<String> {
    handle
        .join()
        .map_err(|_| Error::Summarize(format!("reader thread for child {stream} panicked")))
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<std::process::ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if start.elapsed() >= timeout {
            // Kill can fail if the child exited in between; the wait below reaps it either way.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Summarize(format!("summarizer timed out after {:?}", timeout)));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl Summarizer for OllamaSummarizer {
    fn name(&self) -> &str { &self.name }

    fn summarize(&self, text: &str, length: &SummaryLength) -> Result<String> {
        let start = Instant::now();
        let summary = self.run(&summary_prompt(text, length))?;
        debug!("ollama summarized {} chars in {:?}", text.len(), start.elapsed());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panicked_reader_is_reported() {
        let handle = thread::spawn(|| -> String { panic!("reader died") });
        let err = join_output(handle, "stdout").unwrap_err();
        assert!(matches!(err, Error::Summarize(_)));
        assert!(err.to_string().contains("stdout"), "{err}");
    }
}
