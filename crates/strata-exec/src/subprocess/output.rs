use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

use crate::subprocess::LogConfig;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Forward every line of `reader` to the log until EOF.
///
/// Lines are decoded lossily. The pipe is drained to EOF even after a read
/// error so the child never writes into a closed pipe.
pub(crate) async fn pump<R>(reader: R, stream: Stream, run_id: String, cfg: LogConfig)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return,
            Ok(_) => {
                let line = String::from_utf8_lossy(trim_newline(&buf));
                emit(stream, &run_id, truncate(&line, cfg.max_line_length), cfg);
            }
            Err(e) => {
                debug!(run = %run_id, stream = stream.as_str(), "output read failed: {e}");
                break;
            }
        }
    }
    if let Err(e) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
        debug!(run = %run_id, stream = stream.as_str(), "output drain failed: {e}");
    }
}

fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn emit(stream: Stream, run_id: &str, line: &str, cfg: LogConfig) {
    let name = stream.as_str();
    match stream {
        Stream::Stdout if cfg.stdout_info => info!(run = run_id, stream = name, "{line}"),
        Stream::Stderr if cfg.stderr_warn => warn!(run = run_id, stream = name, "{line}"),
        _ => debug!(run = run_id, stream = name, "{line}"),
    }
}

/// Cut `line` to at most `max` bytes on a char boundary.
pub(crate) fn truncate(line: &str, max: usize) -> &str {
    if line.len() <= max {
        return line;
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
