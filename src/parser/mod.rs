//! # Parser Module
//!
//! @title Source Context for Move Modules
//! @author Ramprasad
//!
//! Splits Move source text into numbered lines and classifies comment lines
//! once per scan. The scanner works on text only; there is no syntax tree.
//!
//! ## Key Types
//!
//! - [`AnalysisContext`] - Source text plus its classified lines
//! - [`SourceLine`] - A single numbered line

/// A single line of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number.
    pub number: usize,

    /// Line content without the trailing newline.
    pub text: String,

    /// Whether the line is a comment and must be ignored by line rules.
    pub is_comment: bool,
}

/// Complete analysis context for one Move source.
///
/// # Example
///
/// ```rust,ignore
/// let context = AnalysisContext::from_source("sources/nft.move", source_code);
/// for line in context.code_lines() {
///     println!("{}: {}", line.number, line.text);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Path identifier for the source, used only for display.
    pub file_path: String,

    /// Raw source code content.
    pub source_code: String,

    /// Every line of the source, comments included.
    pub lines: Vec<SourceLine>,
}

impl AnalysisContext {
    /// Creates a new analysis context from source code.
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path identifier for the source file
    /// * `source_code` - Raw Move source code content
    pub fn from_source(file_path: &str, source_code: impl Into<String>) -> Self {
        let source_code = source_code.into();
        let lines = source_code
            .lines()
            .enumerate()
            .map(|(idx, text)| SourceLine {
                number: idx + 1,
                text: text.to_string(),
                is_comment: is_comment_line(text),
            })
            .collect();

        Self {
            file_path: file_path.to_string(),
            source_code,
            lines,
        }
    }

    /// Iterates over lines that are not comments.
    pub fn code_lines(&self) -> impl Iterator<Item = &SourceLine> {
        self.lines.iter().filter(|line| !line.is_comment)
    }

    /// Joins the code lines around `index` into one string.
    ///
    /// The window spans `before` lines before through `after` lines after
    /// the 0-based `index`, clamped to the source. Comment lines inside the
    /// window are left out.
    pub fn window_text(&self, index: usize, before: usize, after: usize) -> String {
        if self.lines.is_empty() {
            return String::new();
        }

        let start = index.saturating_sub(before);
        let end = index.saturating_add(after).min(self.lines.len() - 1);

        self.lines
            .get(start..=end)
            .unwrap_or_default()
            .iter()
            .filter(|line| !line.is_comment)
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Returns true if the trimmed line starts with `//`.
///
/// Covers line comments and `///` doc comments. A line that starts with `*`
/// is code: Move expressions wrapped with the operator first look the same.
pub fn is_comment_line(line: &str) -> bool {
    line.trim().starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_detection() {
        assert!(is_comment_line("// public fun mint()"));
        assert!(is_comment_line("    /// Mints a token"));
        assert!(!is_comment_line("*balance = 0;"));
        assert!(!is_comment_line("let x = 1; // trailing"));
        assert!(!is_comment_line(""));
    }

    #[test]
    fn test_lines_are_numbered_from_one() {
        let context = AnalysisContext::from_source("m.move", "module a::b {\n// note\n}\n");
        assert_eq!(context.lines.len(), 3);
        assert_eq!(context.lines[0].number, 1);
        assert!(context.lines[1].is_comment);
        assert_eq!(context.lines[2].text, "}");
        assert_eq!(context.code_lines().count(), 2);
    }

    #[test]
    fn test_leading_operator_line_is_code() {
        assert!(!is_comment_line("        * oracle::get_price(&pool.feed)"));
        assert!(!is_comment_line("    * MAX_SUPPLY"));

        let source = "public fun value(pool: &Pool, amount: u64): u64 {\n    amount\n        * oracle::get_price(&pool.feed)\n}";
        let context = AnalysisContext::from_source("m.move", source);
        assert_eq!(context.code_lines().count(), 4);
        assert!(context.window_text(0, 5, 10).contains("* oracle::get_price"));
    }

    #[test]
    fn test_window_is_clamped_and_skips_comments() {
        let source = (1..=20)
            .map(|n| {
                if n == 4 {
                    "// tx_context::sender".to_string()
                } else {
                    format!("line{}", n)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let context = AnalysisContext::from_source("m.move", source);

        let window = context.window_text(1, 5, 10);
        assert!(window.starts_with("line1\n"));
        assert!(window.ends_with("line12"));
        assert!(!window.contains("tx_context"));

        let tail = context.window_text(19, 5, 10);
        assert!(tail.starts_with("line15"));
        assert!(tail.ends_with("line20"));
    }

    #[test]
    fn test_empty_source() {
        let context = AnalysisContext::from_source("m.move", "");
        assert!(context.lines.is_empty());
        assert_eq!(context.window_text(0, 5, 10), "");
    }
}
