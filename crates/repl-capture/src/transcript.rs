//! Transcript lines and segmentation.
//!
//! A transcript is the ordered record of one `communicate` invocation:
//! echoed input and interpreter output as [`TranscriptLine::Text`], side
//! effects as [`TranscriptLine::Signal`]. Downstream rendering treats the
//! two kinds entirely differently (literal block vs artifact reference), so
//! [`segment`] partitions a transcript into maximal same-kind runs.

use crate::signal::Signal;

/// One line of a captured transcript, in interpreter emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptLine {
    /// Echoed input (prefixed with the active prompt marker) or verbatim
    /// newline-stripped interpreter output.
    Text(String),
    /// An out-of-band signal reporting a side effect.
    Signal(Signal),
}

impl TranscriptLine {
    /// Classify a raw output line, parsing signals once at the boundary.
    #[must_use]
    pub fn from_output(line: String, token: &str) -> Self {
        match Signal::parse(&line, token) {
            Some(signal) => Self::Signal(signal),
            None => Self::Text(line),
        }
    }

    /// The text content, for ordinary lines.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Signal(_) => None,
        }
    }

    /// The signal, for out-of-band lines.
    #[must_use]
    pub const fn as_signal(&self) -> Option<&Signal> {
        match self {
            Self::Signal(signal) => Some(signal),
            Self::Text(_) => None,
        }
    }

    /// Whether this line is an out-of-band signal.
    #[must_use]
    pub const fn is_signal(&self) -> bool {
        matches!(self, Self::Signal(_))
    }

    /// Render the line back to its wire form.
    #[must_use]
    pub fn render(&self, token: &str) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Signal(signal) => signal.to_line(token),
        }
    }
}

/// A maximal contiguous run of same-kind transcript lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    /// Ordinary lines, rendered as one literal block.
    Text(Vec<String>),
    /// Signal lines, rendered as artifact references.
    Signals(Vec<Signal>),
}

impl Run {
    /// Number of lines in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(lines) => lines.len(),
            Self::Signals(signals) => signals.len(),
        }
    }

    /// Whether the run is empty (never produced by [`segment`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Join a text run into one literal block.
    #[must_use]
    pub fn render_text(&self) -> Option<String> {
        match self {
            Self::Text(lines) => Some(lines.join("\n")),
            Self::Signals(_) => None,
        }
    }
}

/// Partition a transcript into maximal same-kind runs, preserving order.
#[must_use]
pub fn segment(lines: &[TranscriptLine]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for line in lines {
        match (runs.last_mut(), line) {
            (Some(Run::Text(texts)), TranscriptLine::Text(text)) => texts.push(text.clone()),
            (Some(Run::Signals(signals)), TranscriptLine::Signal(signal)) => {
                signals.push(signal.clone());
            }
            (_, TranscriptLine::Text(text)) => runs.push(Run::Text(vec![text.clone()])),
            (_, TranscriptLine::Signal(signal)) => {
                runs.push(Run::Signals(vec![signal.clone()]));
            }
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "#repl:";

    fn text(s: &str) -> TranscriptLine {
        TranscriptLine::Text(s.to_string())
    }

    fn sig(path: &str) -> TranscriptLine {
        TranscriptLine::Signal(Signal::artifact(path))
    }

    #[test]
    fn boundary_classification() {
        assert!(!TranscriptLine::from_output("x = 1".to_string(), TOKEN).is_signal());
        assert!(TranscriptLine::from_output("#repl:img:/f.svg".to_string(), TOKEN).is_signal());
    }

    #[test]
    fn interleaved_transcript_segments_into_four_runs() {
        let transcript = vec![
            text("A"),
            sig("/s1"),
            sig("/s2"),
            text("B"),
            text("C"),
            sig("/s3"),
        ];
        let runs = segment(&transcript);
        assert_eq!(
            runs,
            vec![
                Run::Text(vec!["A".to_string()]),
                Run::Signals(vec![Signal::artifact("/s1"), Signal::artifact("/s2")]),
                Run::Text(vec!["B".to_string(), "C".to_string()]),
                Run::Signals(vec![Signal::artifact("/s3")]),
            ]
        );
    }

    #[test]
    fn empty_transcript_yields_no_runs() {
        assert!(segment(&[]).is_empty());
    }

    #[test]
    fn uniform_transcript_is_one_run() {
        let transcript = vec![text("a"), text("b"), text("c")];
        let runs = segment(&transcript);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].render_text().as_deref(), Some("a\nb\nc"));
    }

    #[test]
    fn render_round_trips_signals() {
        let line = sig("/tmp/fig.svg");
        assert_eq!(line.render(TOKEN), "#repl:img:/tmp/fig.svg");
    }
}
