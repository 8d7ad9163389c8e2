use std::path::Path;

/// Language id for a file, by extension. `None` means the file is not
/// analyzable and is skipped.
pub fn language_id(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let lang = match ext.as_str() {
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" => "cpp",
        "cs" => "csharp",
        "fs" | "fsi" | "fsx" => "fsharp",
        "java" => "java",
        "js" | "mjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" => "typescript",
        "tsx" => "typescriptreact",
        "py" => "python",
        "rb" => "ruby",
        "go" => "go",
        "rs" => "rust",
        "php" => "php",
        "swift" => "swift",
        "m" => "objective-c",
        "groovy" => "groovy",
        "sql" => "sql",
        "yaml" | "yml" => "yaml",
        "sh" | "bash" => "shellscript",
        "ps1" | "psm1" => "powershell",
        "pl" | "pm" => "perl",
        "r" => "r",
        "lua" => "lua",
        "clj" | "cljs" => "clojure",
        "vb" => "vb",
        "coffee" => "coffeescript",
        "html" | "htm" => "html",
        "xml" | "csproj" | "config" => "xml",
        "jade" | "pug" => "jade",
        _ => return None,
    };
    Some(lang)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_extensions_resolve() {
        assert_eq!(language_id(Path::new("a.c")), Some("c"));
        assert_eq!(language_id(Path::new("a.CPP")), Some("cpp"));
        assert_eq!(language_id(Path::new("a.tsx")), Some("typescriptreact"));
        assert_eq!(language_id(Path::new("Makefile")), None);
        assert_eq!(language_id(Path::new("a.unknown")), None);
    }
}
