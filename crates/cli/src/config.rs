use anyhow::Context;
use rules::Settings;
use std::fs;
use std::path::Path;

/// Reads analysis settings from a TOML file.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    let settings: Settings = toml::from_str(&data)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn settings_load_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
ignore_rules_list = ["DS001"]
enable_manual_review_rules = true
"#,
        )
        .unwrap();
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.ignore_rules_list, vec!["DS001"]);
        assert!(settings.enable_manual_review_rules);
        assert!(settings.enable_best_practice_rules);
        assert!(settings.ignore_files_list.is_empty());
    }

    #[test]
    fn bad_settings_file_reports_its_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "not = [valid").unwrap();
        let err = load_settings(&path).unwrap_err();
        assert!(err.to_string().contains("settings.toml"));
    }
}
