use directories::ProjectDirs;
use serde::Deserialize;
use spillgrid_core::DEFAULT_SHEET_NAME;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Overrides `files_path` from the config file.
pub const FILES_PATH_ENV: &str = "SPILLGRID_FILES_PATH";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    files_path: Option<PathBuf>,
    default_sheet: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base directory for relative workbook paths.
    pub files_path: Option<PathBuf>,
    /// Sheet shown when `show` is given no `--sheet`.
    pub default_sheet: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            files_path: None,
            default_sheet: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl Config {
    /// Resolve a workbook path given on the command line.
    pub fn resolve(&self, file: &Path) -> PathBuf {
        match &self.files_path {
            Some(base) if file.is_relative() => base.join(file),
            _ => file.to_path_buf(),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "spillgrid").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the user configuration.
///
/// Problems reading or parsing the file become warnings; the defaults are
/// used for anything that could not be read.
pub fn load_config(config_file: Option<&Path>) -> (Config, Vec<String>) {
    let path = config_file.map(Path::to_path_buf).or_else(user_config_path);
    load_config_with(
        path.as_deref(),
        config_file.is_some(),
        std::env::var_os(FILES_PATH_ENV),
    )
}

fn load_config_with(
    path: Option<&Path>,
    explicit: bool,
    files_path_env: Option<OsString>,
) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut file = ConfigFile::default();

    if let Some(path) = path {
        if path.exists() {
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
                    warnings.push(format!(
                        "Refusing to read {}: file too large ({} bytes, max {})",
                        path.display(),
                        meta.len(),
                        MAX_CONFIG_FILE_BYTES
                    ));
                }
                Ok(_) => match std::fs::read_to_string(path) {
                    Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                        Ok(parsed) => file = parsed,
                        Err(err) => {
                            warnings.push(format!("Failed to parse {}: {}", path.display(), err))
                        }
                    },
                    Err(err) => {
                        warnings.push(format!("Failed to read {}: {}", path.display(), err))
                    }
                },
                Err(err) => warnings.push(format!(
                    "Failed to read metadata for {}: {}",
                    path.display(),
                    err
                )),
            }
        } else if explicit {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
    }

    let mut config = Config::default();
    if let Some(sheet) = file.default_sheet.map(|s| s.trim().to_string()) {
        if sheet.is_empty() {
            warnings.push("Ignoring empty default_sheet".to_string());
        } else {
            config.default_sheet = sheet;
        }
    }
    config.files_path = files_path_env
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or(file.files_path);

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_default_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config_with(Some(&dir.path().join("none.toml")), false, None);
        assert_eq!(config, Config::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_explicit_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (_, warnings) = load_config_with(Some(&dir.path().join("none.toml")), true, None);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config file not found"));
    }

    #[test]
    fn reads_keys_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "files_path = \"/data/books\"\ndefault_sheet = \"Report\"\n");
        let (config, warnings) = load_config_with(Some(&path), true, None);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.files_path, Some(PathBuf::from("/data/books")));
        assert_eq!(config.default_sheet, "Report");
    }

    #[test]
    fn environment_overrides_files_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "files_path = \"/data/books\"\n");
        let (config, _) = load_config_with(Some(&path), true, Some(OsString::from("/srv/xlsx")));
        assert_eq!(config.files_path, Some(PathBuf::from("/srv/xlsx")));
    }

    #[test]
    fn invalid_file_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "colour = \"blue\"\n");
        let (config, warnings) = load_config_with(Some(&path), true, None);
        assert_eq!(config, Config::default());
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn resolve_joins_relative_paths_only() {
        let config = Config {
            files_path: Some(PathBuf::from("/data")),
            ..Config::default()
        };
        assert_eq!(config.resolve(Path::new("book.xlsx")), PathBuf::from("/data/book.xlsx"));
        assert_eq!(config.resolve(Path::new("/tmp/book.xlsx")), PathBuf::from("/tmp/book.xlsx"));
        assert_eq!(
            Config::default().resolve(Path::new("book.xlsx")),
            PathBuf::from("book.xlsx")
        );
    }
}
