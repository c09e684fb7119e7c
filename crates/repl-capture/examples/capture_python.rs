//! Capture a short python session and print it as renderable blocks.
//!
//! Run with: `cargo run --example capture_python`
//! (requires `python3` on PATH; set `RUST_LOG=debug` for protocol logging)

use repl_capture::{CaptureConfig, DisplayOverride, Run, SyncRegistry, segment};

fn main() -> Result<(), repl_capture::CaptureError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = SyncRegistry::new(CaptureConfig::default())?;

    let transcript = registry.communicate(
        "examples/capture_python.rst",
        [
            "x = 6 * 7",
            "print(f\"the answer is {x}\")",
            "for c in \"abc\":",
            "    print(c)",
        ],
        DisplayOverride::none(),
    )?;

    for run in segment(&transcript) {
        match run {
            Run::Text(lines) => {
                println!("--- literal block ---");
                for line in lines {
                    println!("{line}");
                }
            }
            Run::Signals(signals) => {
                println!("--- artifacts ---");
                for signal in signals {
                    println!("{}", signal.payload());
                }
            }
        }
    }

    registry.kill_all();
    Ok(())
}
