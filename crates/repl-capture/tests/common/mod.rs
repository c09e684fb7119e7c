//! Shared fixtures: a deterministic fixed-prompt interpreter in POSIX sh.

use repl_capture::CaptureConfig;
use repl_pipe::SpawnConfig;

/// A fake interpreter with python-style prompts:
///
/// - `echo <text>` prints `<text>`
/// - `lines <a>|<b>|…` prints each part; `@<path>` parts become artifact
///   signal lines
/// - a line ending in `:` enters continuation mode until a blank line
/// - anything else prints nothing
pub const FAKE_REPL: &str = r#"
printf '>>> '
pending=0
while IFS= read -r line; do
  while [ "${line% }" != "$line" ]; do line=${line% }; done
  if [ "$pending" -eq 1 ]; then
    if [ -z "$line" ]; then
      pending=0
      printf '>>> '
    else
      printf '... '
    fi
    continue
  fi
  case "$line" in
    *:)
      pending=1
      printf '... '
      ;;
    'echo '*)
      printf '%s\n' "${line#echo }"
      printf '>>> '
      ;;
    'lines '*)
      rest=${line#lines }
      IFS='|'
      set -f
      for part in $rest; do
        case "$part" in
          @*) printf '#repl:img:%s\n' "${part#@}" ;;
          *) printf '%s\n' "$part" ;;
        esac
      done
      set +f
      unset IFS
      printf '>>> '
      ;;
    *)
      printf '>>> '
      ;;
  esac
done
"#;

/// Capture configuration pointed at the sh fake interpreter.
pub fn fake_repl_config() -> CaptureConfig {
    CaptureConfig::default().spawn(SpawnConfig::new("sh").args(["-c", FAKE_REPL]))
}
