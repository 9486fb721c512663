use std::path::PathBuf;

use cardscroll::config::{ConfigFlags, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".cardscrollrc");
    let content = r#"
# comment
--no-animation

--count 250

--output=records.json
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.no_animation);
    assert_eq!(flags.count, Some(250));
    assert_eq!(flags.output, Some(PathBuf::from("records.json")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".cardscrollrc");
    std::fs::write(&path, "--perf\n--count 250\n--render-debug-log file.log\n").unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "cardscroll".to_string(),
        "--count".to_string(),
        "10".to_string(),
        "--seed".to_string(),
        "3".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.perf, "file flags should remain enabled");
    assert_eq!(effective.count, Some(10), "cli should override count");
    assert_eq!(effective.seed, Some(3));
    assert_eq!(
        effective.render_debug_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        no_animation: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        perf: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.no_animation);
    assert!(merged.perf);
}
