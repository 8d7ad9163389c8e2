//! Comment delimiters for the supported languages and predicates that
//! classify a document offset as code or comment.
//!
//! Classification scans delimiter occurrences in the document prefix rather
//! than parsing the language: string literals and conditional compilation
//! are ignored, which is acceptable for preview-quality lexical scoping.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Comment delimiters for one language. An empty string means the language
/// has no comment form of that kind.
pub struct CommentStyle {
    pub line: &'static str,
    pub block_open: &'static str,
    pub block_close: &'static str,
}

const NONE: CommentStyle = CommentStyle {
    line: "",
    block_open: "",
    block_close: "",
};

/// Delimiters for a language id (matched lower-cased). Unknown languages
/// yield empty delimiters and are treated as all-code.
pub fn comment_style(lang_id: &str) -> CommentStyle {
    match lang_id.to_lowercase().as_str() {
        "vb" => CommentStyle {
            line: "'",
            ..NONE
        },
        "lua" | "sql" | "tsql" => CommentStyle {
            line: "--",
            ..NONE
        },
        "clojure" => CommentStyle {
            line: ";;",
            ..NONE
        },
        "yaml" | "shellscript" | "ruby" | "powershell" | "coffeescript" | "python" | "r"
        | "perl" | "perl6" => CommentStyle {
            line: "#",
            ..NONE
        },
        "jade" => CommentStyle {
            line: "//-",
            ..NONE
        },
        "c" | "cpp" | "csharp" | "groovy" | "php" | "javascript" | "javascriptreact"
        | "typescript" | "typescriptreact" | "java" | "objective-c" | "swift" | "go" | "rust" => {
            CommentStyle {
                line: "//",
                block_open: "/*",
                block_close: "*/",
            }
        }
        "fsharp" => CommentStyle {
            line: "//",
            block_open: "(*",
            block_close: "*)",
        },
        "html" | "xml" => CommentStyle {
            line: "",
            block_open: "<!--",
            block_close: "-->",
        },
        _ => NONE,
    }
}

impl CommentStyle {
    /// Whether an offset just past `prefix` sits inside a comment. A line
    /// comment counts when its delimiter appears after the last newline; a
    /// block comment counts when the most recent opener has no closer after
    /// it.
    pub fn is_in_comment(&self, prefix: &str, only_block: bool) -> bool {
        if !only_block && !self.line.is_empty() {
            let line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
            if prefix[line_start..].contains(self.line) {
                return true;
            }
        }
        if self.block_open.is_empty() || self.block_close.is_empty() {
            return false;
        }
        match (prefix.rfind(self.block_open), prefix.rfind(self.block_close)) {
            (Some(open), Some(close)) => open > close,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Whether the last line of `prefix` is nothing but a line comment.
    pub fn is_whole_line_line_comment(&self, prefix: &str) -> bool {
        if self.line.is_empty() {
            return false;
        }
        let line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
        prefix[line_start..].trim_start().starts_with(self.line)
    }

    /// Whether `prefix`, trimmed, ends exactly at a block comment close with
    /// no opener after it.
    pub fn is_whole_line_block_commented(&self, prefix: &str) -> bool {
        if self.block_open.is_empty() || self.block_close.is_empty() {
            return false;
        }
        let trimmed = prefix.trim();
        let Some(close) = trimmed.rfind(self.block_close) else {
            return false;
        };
        let open_before_close = trimmed.rfind(self.block_open).map_or(true, |o| o < close);
        open_before_close && close == trimmed.len() - self.block_close.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_the_fixed_languages() {
        assert_eq!(comment_style("c").line, "//");
        assert_eq!(comment_style("C").block_open, "/*");
        assert_eq!(comment_style("fsharp").block_open, "(*");
        assert_eq!(comment_style("html").line, "");
        assert_eq!(comment_style("html").block_open, "<!--");
        assert_eq!(comment_style("python").line, "#");
        assert_eq!(comment_style("vb").line, "'");
        assert_eq!(comment_style("jade").line, "//-");
        assert_eq!(comment_style("fortran"), NONE);
    }

    #[test]
    fn line_comment_detected_on_current_line() {
        let style = comment_style("c");
        assert!(style.is_in_comment("int x; // note ", false));
        assert!(!style.is_in_comment("int x; ", false));
        // A comment on an earlier line does not leak forward.
        assert!(!style.is_in_comment("// note\nint x; ", false));
    }

    #[test]
    fn block_comment_spans_lines() {
        let style = comment_style("cpp");
        assert!(style.is_in_comment("a;\n/* open\nstill ", false));
        assert!(!style.is_in_comment("a;\n/* closed */\n", false));
        // only_block skips the line-comment check.
        assert!(!style.is_in_comment("x // line ", true));
    }

    #[test]
    fn languages_without_comments_are_all_code() {
        let style = comment_style("unknownlang");
        assert!(!style.is_in_comment("anything // at all /* here ", false));
    }

    #[test]
    fn whole_line_predicates() {
        let style = comment_style("c");
        assert!(style.is_whole_line_line_comment("code();\n  // note"));
        assert!(!style.is_whole_line_line_comment("code(); // note"));
        assert!(style.is_whole_line_block_commented("/* a\n b */"));
        assert!(!style.is_whole_line_block_commented("/* a */ code();"));
        assert!(!style.is_whole_line_block_commented("/* still open"));
    }
}
