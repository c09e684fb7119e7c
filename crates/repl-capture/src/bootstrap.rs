//! Interpreter bootstrap scripts.
//!
//! A registry can run a fixed script inside a freshly spawned interpreter
//! before any document content reaches it, typically to select a plotting
//! backend that saves figures on show and self-reports the saved path as an
//! artifact signal line. Bootstrap runs with input hidden and must be
//! silent; any output is a setup failure attributable to the script, not
//! document content.

/// An ordered list of interpreter lines run silently at session creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitScript {
    lines: Vec<String>,
}

impl InitScript {
    /// An empty script (runs nothing).
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Create a script from interpreter lines.
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// The interpreter lines, in submission order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether the script runs nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append another script's lines after this one's.
    #[must_use]
    pub fn then(mut self, other: Self) -> Self {
        self.lines.extend(other.lines);
        self
    }

    /// Build the matplotlib configuration script: select a figure-saving
    /// backend module and point it at the artifact directory and format.
    ///
    /// The backend module itself runs inside the interpreter and reports
    /// each saved figure as an artifact signal line; these lines fail
    /// silently when matplotlib is not installed.
    #[must_use]
    pub fn matplotlib(backend_module: &str, artifact_prefix: &str, format: ImageFormat) -> Self {
        Self::new([
            "import matplotlib as _mpl".to_string(),
            format!("_mpl.use(\"module://{backend_module}\")"),
            format!("_mpl.rcParams[\"savefig.directory\"] = r\"{artifact_prefix}\""),
            format!("_mpl.rcParams[\"savefig.format\"] = \"{}\"", format.as_str()),
        ])
    }

    /// Build an rcParams adjustment script from key/value pairs.
    ///
    /// Returns an empty script when no pairs are given.
    #[must_use]
    pub fn rc_params<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, RcValue)>,
        K: Into<String>,
    {
        let assignments: Vec<String> = pairs
            .into_iter()
            .map(|(key, value)| format!("_mpl.rcParams['{}']={}", key.into(), value.render()))
            .collect();
        if assignments.is_empty() {
            return Self::empty();
        }
        let mut lines = vec!["import matplotlib as _mpl".to_string()];
        lines.extend(assignments);
        Self { lines }
    }
}

/// A value assigned to an rcParams key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RcValue {
    /// A string value, quoted on the interpreter side.
    Text(String),
    /// A literal interpreter expression, passed through verbatim.
    Literal(String),
}

impl RcValue {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => format!("'{text}'"),
            Self::Literal(literal) => literal.clone(),
        }
    }
}

/// Output format for generated figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Scalable vector graphics.
    Svg,
    /// Portable document format.
    Pdf,
    /// Portable network graphics.
    Png,
}

impl ImageFormat {
    /// The format name as understood by the plotting library.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Png => "png",
        }
    }

    /// The MIME type of the format.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
        }
    }

    /// Pick the first format a documentation builder supports, by MIME
    /// type, in quality order (svg, pdf, png).
    #[must_use]
    pub fn for_mime_types<'a, I>(supported: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let supported: Vec<&str> = supported.into_iter().collect();
        [Self::Svg, Self::Pdf, Self::Png]
            .into_iter()
            .find(|format| supported.contains(&format.mime()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matplotlib_script_shape() {
        let script = InitScript::matplotlib("docrepl.mpl_backend", "/out/_images/mpl_", ImageFormat::Svg);
        let lines = script.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "import matplotlib as _mpl");
        assert!(lines[1].contains("module://docrepl.mpl_backend"));
        assert!(lines[2].contains("savefig.directory"));
        assert!(lines[2].contains("/out/_images/mpl_"));
        assert!(lines[3].ends_with("= \"svg\""));
    }

    #[test]
    fn rc_params_quotes_text_values() {
        let script = InitScript::rc_params([
            ("savefig.dpi", RcValue::Literal("96".to_string())),
            ("savefig.facecolor", RcValue::Text("white".to_string())),
        ]);
        let lines = script.lines();
        assert_eq!(lines[0], "import matplotlib as _mpl");
        assert_eq!(lines[1], "_mpl.rcParams['savefig.dpi']=96");
        assert_eq!(lines[2], "_mpl.rcParams['savefig.facecolor']='white'");
    }

    #[test]
    fn rc_params_empty_when_no_pairs() {
        let script = InitScript::rc_params(std::iter::empty::<(&str, RcValue)>());
        assert!(script.is_empty());
    }

    #[test]
    fn format_detection_prefers_vector() {
        let format = ImageFormat::for_mime_types(["image/png", "image/svg+xml"]);
        assert_eq!(format, Some(ImageFormat::Svg));
        assert_eq!(ImageFormat::for_mime_types(["text/html"]), None);
    }

    #[test]
    fn scripts_compose_in_order() {
        let script = InitScript::new(["a = 1"]).then(InitScript::new(["b = 2"]));
        assert_eq!(script.lines(), ["a = 1", "b = 2"]);
    }
}
