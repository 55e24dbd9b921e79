// src/exec/output.rs

//! Operator-facing output and the managed program's output pumps.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// Destination for operator-facing lines.
pub type LineSink = Arc<dyn Fn(String) + Send + Sync>;

/// The default sink: one line per `println!`.
pub fn stdout_sink() -> LineSink {
    Arc::new(|line| println!("{line}"))
}

/// A sink that drops everything.
pub fn null_sink() -> LineSink {
    Arc::new(|_| {})
}

/// Status line from the supervisor itself.
pub fn status(message: impl AsRef<str>) -> String {
    format!("[reloadr] {}", message.as_ref())
}

/// A line produced by the managed program (or the build), tagged with its
/// name.
pub fn prefixed(name: &str, line: &str) -> String {
    format!("{name}: {line}")
}

/// Stream `reader` line by line into `sink` as lines arrive.
///
/// Returns the number of lines forwarded once the pipe closes.
pub async fn stream_lines<R>(reader: R, name: &str, sink: &LineSink) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut count = 0;
    while let Some(line) = lines.next_line().await? {
        sink(prefixed(name, &line));
        count += 1;
    }
    Ok(count)
}

/// Read `reader` to the end and return it as (lossy) UTF-8.
pub async fn buffer_all<R>(mut reader: R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Split buffered diagnostic text into prefixed lines, dropping leading and
/// trailing blank space.
pub fn diagnostic_lines(name: &str, text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(|line| prefixed(name, line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn capture() -> (LineSink, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: LineSink = Arc::new(move |line| sink_seen.lock().unwrap().push(line));
        (sink, seen)
    }

    #[tokio::test]
    async fn stream_lines_prefixes_each_line() {
        let (sink, seen) = capture();
        let input: &[u8] = b"listening on :8080\nready\n";

        let n = stream_lines(input, "server", &sink).await.unwrap();

        assert_eq!(n, 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["server: listening on :8080", "server: ready"]
        );
    }

    #[tokio::test]
    async fn buffer_all_reads_everything() {
        let input: &[u8] = b"panic: boom\n\tat main.go:3\n";
        assert_eq!(buffer_all(input).await.unwrap(), "panic: boom\n\tat main.go:3\n");
    }

    #[test]
    fn diagnostic_lines_trims_blank_edges() {
        let lines = diagnostic_lines("app", "\n./main.go:3: syntax error\n\n");
        assert_eq!(lines, vec!["app: ./main.go:3: syntax error"]);
        assert!(diagnostic_lines("app", "  \n").is_empty());
    }
}
