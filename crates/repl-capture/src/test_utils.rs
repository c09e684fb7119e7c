//! Test utilities: a scripted in-memory interpreter.
//!
//! Provides a deterministic interpreter running over an in-memory duplex
//! stream, so protocol behavior can be tested without spawning processes.
//! The interpreter understands a tiny command language:
//!
//! - `echo <text>` prints `<text>` as one output line
//! - `lines <a>|<b>|...` prints each `|`-separated part as its own line;
//!   a part written `@<path>` is emitted as an artifact signal line
//!   (`#repl:img:<path>`)
//! - a line ending in `:` enters continuation mode until a blank line
//! - anything else prints nothing
//!
//! Every response ends with the appropriate prompt marker, and the very
//! first bytes written are the startup prompt (consumed by the session
//! handshake).

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, WriteHalf};

use crate::config::PromptMarkers;

/// Spawn a scripted interpreter task and return the session-side transport.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn scripted_interpreter(markers: PromptMarkers) -> DuplexStream {
    let (client, server) = tokio::io::duplex(64 * 1024);
    tokio::spawn(run_scripted(server, markers));
    client
}

async fn run_scripted(stream: DuplexStream, markers: PromptMarkers) {
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut lines = BufReader::new(read_half).lines();

    write_prompt(&mut write_half, markers.primary()).await;

    let mut continuation = false;
    while let Ok(Some(line)) = lines.next_line().await {
        if continuation {
            if line.trim().is_empty() {
                continuation = false;
                write_prompt(&mut write_half, markers.primary()).await;
            } else {
                write_prompt(&mut write_half, markers.continuation()).await;
            }
            continue;
        }

        if line.ends_with(':') {
            continuation = true;
            write_prompt(&mut write_half, markers.continuation()).await;
            continue;
        }

        for output in respond(&line) {
            let _ = write_half.write_all(output.as_bytes()).await;
            let _ = write_half.write_all(b"\n").await;
        }
        write_prompt(&mut write_half, markers.primary()).await;
    }
}

async fn write_prompt(write_half: &mut WriteHalf<DuplexStream>, marker: &str) {
    let _ = write_half.write_all(marker.as_bytes()).await;
    let _ = write_half.flush().await;
}

fn respond(line: &str) -> Vec<String> {
    // Directive stripping can leave trailing whitespace on the submitted
    // line; a real interpreter would see it too, but it is noise here.
    let line = line.trim_end();
    if let Some(rest) = line.strip_prefix("echo ") {
        vec![rest.to_string()]
    } else if let Some(rest) = line.strip_prefix("lines ") {
        rest.split('|')
            .map(|part| match part.strip_prefix('@') {
                Some(path) => format!("#repl:img:{path}"),
                None => part.to_string(),
            })
            .collect()
    } else {
        Vec::new()
    }
}
