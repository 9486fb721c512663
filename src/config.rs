//! Persistent default flags.
//!
//! A config file is a list of command-line flag tokens, one or more per line,
//! with `#` comment lines. The global file lives in the platform config
//! directory; a `.cardscrollrc` in the working directory overrides it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR: &str = "cardscroll";
const LOCAL_FILE: &str = ".cardscrollrc";

/// Flags that can be stored in a config file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub count: Option<usize>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub no_animation: bool,
    pub perf: bool,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: valued options from `other` win, booleans
    /// are combined.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            count: other.count.or(self.count),
            seed: other.seed.or(self.seed),
            output: other.output.clone().or_else(|| self.output.clone()),
            no_animation: self.no_animation || other.no_animation,
            perf: self.perf || other.perf,
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    fn to_lines(&self) -> Vec<String> {
        let mut lines = vec!["# cardscroll defaults (saved with --save)".to_string()];
        if let Some(count) = self.count {
            lines.push(format!("--count {count}"));
        }
        if let Some(seed) = self.seed {
            lines.push(format!("--seed {seed}"));
        }
        if let Some(output) = &self.output {
            lines.push(format!("--output {}", output.display()));
        }
        if self.no_animation {
            lines.push("--no-animation".to_string());
        }
        if self.perf {
            lines.push("--perf".to_string());
        }
        if let Some(path) = &self.render_debug_log {
            lines.push(format!("--render-debug-log {}", path.display()));
        }
        lines
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(LOCAL_FILE)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

/// Read flags from `path`. A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write `flags` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", flags.to_lines().join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove the config file at `path` if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Value of `--name VALUE` or `--name=VALUE` at `tokens[*i]`, advancing `i`
/// past a separate value token.
fn option_value<'a>(tokens: &'a [String], i: &mut usize, name: &str) -> Option<&'a str> {
    let token = tokens.get(*i)?.as_str();
    let rest = token.strip_prefix(name)?;
    if rest.is_empty() {
        let value = tokens.get(*i + 1)?;
        *i += 1;
        return Some(value.as_str());
    }
    rest.strip_prefix('=')
}

/// Pick the known flags out of a token list. Unknown tokens and unparseable
/// values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].as_str() {
            "--no-animation" => flags.no_animation = true,
            "--perf" => flags.perf = true,
            _ => {
                if let Some(value) = option_value(tokens, &mut i, "--count") {
                    flags.count = value.parse().ok().or(flags.count);
                } else if let Some(value) = option_value(tokens, &mut i, "--seed") {
                    flags.seed = value.parse().ok().or(flags.seed);
                } else if let Some(value) = option_value(tokens, &mut i, "--output") {
                    flags.output = Some(PathBuf::from(value));
                } else if let Some(value) = option_value(tokens, &mut i, "--render-debug-log") {
                    flags.render_debug_log = Some(PathBuf::from(value));
                }
            }
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "cardscroll",
            "--count",
            "500",
            "--seed=7",
            "--no-animation",
            "--output",
            "dump.json",
            "--render-debug-log=render.log",
            "--unknown",
        ]));
        assert_eq!(flags.count, Some(500));
        assert_eq!(flags.seed, Some(7));
        assert!(flags.no_animation);
        assert!(!flags.perf);
        assert_eq!(flags.output, Some(PathBuf::from("dump.json")));
        assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
    }

    #[test]
    fn test_bad_numbers_are_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--count", "lots", "--seed"]));
        assert_eq!(flags.count, None);
        assert_eq!(flags.seed, None);
    }

    #[test]
    fn test_prefix_of_flag_is_not_a_match() {
        let flags = parse_flag_tokens(&tokens(&["--countdown", "3"]));
        assert_eq!(flags.count, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            count: Some(100),
            perf: true,
            output: Some(PathBuf::from("file.json")),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            count: Some(5),
            no_animation: true,
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert_eq!(merged.count, Some(5));
        assert!(merged.perf);
        assert!(merged.no_animation);
        assert_eq!(merged.output, Some(PathBuf::from("file.json")));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".cardscrollrc");
        let flags = ConfigFlags {
            count: Some(2_000),
            seed: Some(99),
            output: Some(PathBuf::from("out.json")),
            no_animation: true,
            perf: true,
            render_debug_log: Some(PathBuf::from("render.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
