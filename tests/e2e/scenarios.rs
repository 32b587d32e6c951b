use super::helpers::{stderr, stdout, TestProject};

const NOTICES: &str = "THIRD_PARTY_NOTICES.md";
const EXPORT: &str = "third_party_notices.json";
const MIT_TEXT: &str = "MIT License\n\nCopyright (c) <year> <copyright holders>\n";

fn sample_project() -> TestProject {
    let project = TestProject::new();
    project.add_package("pkg-a", "pkg-a", "1.0.0", "MIT");
    project.add_package("pkg-b", "pkg-b", "2.0.0", "MIT OR Apache-2.0");
    project.add_package("@types/foo", "@types/foo", "1.0.0", "MIT");
    project.add_license_template("MIT", MIT_TEXT);
    project.add_license_template("Apache-2.0", "Apache License\nVersion 2.0, January 2004\n");
    project
}

fn without_line(content: &str, marker: &str) -> String {
    content
        .lines()
        .filter(|line| !line.contains(marker))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_generate_groups_packages_by_license() {
    let project = sample_project();

    let output = project.run(&["generate"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("✓ Wrote THIRD_PARTY_NOTICES.md"));

    let notices = project.read(NOTICES);
    assert!(notices.starts_with("# Third-Party Notices\n\n_Generated by attribution-notices on "));
    assert!(notices.contains("## MIT\n\n- pkg-a@1.0.0 — https://example.com/pkg-a\n\n"));
    assert!(notices
        .contains("## MIT OR Apache-2.0\n\n- pkg-b@2.0.0 — https://example.com/pkg-b\n\n"));
    assert!(!notices.contains("@types/foo"));

    assert!(notices.contains(&format!("# License Texts\n\n## MIT\n\n```\n{}```\n", MIT_TEXT)));
    assert!(!notices.contains("Apache License"));

    assert!(!project.exists(EXPORT));
}

#[test]
fn test_generate_is_the_default_command() {
    let project = sample_project();

    let output = project.run(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.read(NOTICES).contains("pkg-a@1.0.0"));
}

#[test]
fn test_json_export_with_include_texts_override() {
    let project = sample_project();

    let output = project.run(&["--format=json", "--include-texts", "Apache-2.0"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("✓ Wrote third_party_notices.json"));
    assert!(!project.exists(NOTICES));

    let export: serde_json::Value = serde_json::from_str(&project.read(EXPORT)).unwrap();
    assert!(export["generatedAt"].is_string());
    assert_eq!(export["config"]["includeTexts"], serde_json::json!(["Apache-2.0"]));
    assert_eq!(export["config"]["exclude"], serde_json::json!(["@types/*"]));

    let names: Vec<&str> = export["packages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["pkg-a", "pkg-b"]);
    assert_eq!(export["packages"][1]["license"], "MIT OR Apache-2.0");

    let texts = export["embeddedTexts"].as_object().unwrap();
    assert_eq!(texts.keys().collect::<Vec<_>>(), vec!["Apache-2.0"]);
}

#[test]
fn test_both_formats_are_stable_across_runs() {
    let project = sample_project();

    let first = project.run(&["generate", "--format", "both"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let notices_first = project.read(NOTICES);
    let export_first = project.read(EXPORT);

    let second = project.run(&["generate", "--format", "both"]);
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    let notices_second = project.read(NOTICES);
    let export_second = project.read(EXPORT);

    assert_eq!(
        without_line(&notices_first, "_Generated by"),
        without_line(&notices_second, "_Generated by")
    );
    assert_eq!(
        without_line(&export_first, "\"generatedAt\""),
        without_line(&export_second, "\"generatedAt\"")
    );
}

#[test]
fn test_custom_output_path() {
    let project = sample_project();

    let output = project.run(&["generate", "--out", "docs/NOTICES.md", "--quiet"]);

    // docs/ does not exist yet, so the write fails
    assert!(!output.status.success());

    std::fs::create_dir_all(project.root().join("docs")).unwrap();
    let output = project.run(&["generate", "--out", "docs/NOTICES.md", "--quiet"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert!(project.read("docs/NOTICES.md").contains("pkg-b@2.0.0"));
    assert!(!project.exists(NOTICES));
}

#[test]
fn test_project_root_found_from_subdirectory() {
    let project = sample_project();
    let nested = project.root().join("src").join("components");
    std::fs::create_dir_all(&nested).unwrap();

    let output = project.run_in(&nested, &["generate"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.read(NOTICES).contains("pkg-a@1.0.0"));
    assert!(!nested.join(NOTICES).exists());
}

#[test]
fn test_config_file_controls_exclusions() {
    let project = sample_project();
    project.write_file(
        "attribution-notices.config.json",
        r#"{ "exclude": ["pkg-*"], "includeTexts": ["apache-2.0"] }"#,
    );

    let output = project.run(&["generate"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let notices = project.read(NOTICES);
    assert!(notices.contains("- @types/foo@1.0.0"));
    assert!(!notices.contains("pkg-a"));
    assert!(!notices.contains("# License Texts"));
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let project = sample_project();
    project.write_file("attribution-notices.config.json", "{ \"exclude\": [");

    let output = project.run(&["generate", "--verbose"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Ignoring"));
    let notices = project.read(NOTICES);
    assert!(notices.contains("pkg-a@1.0.0"));
    assert!(!notices.contains("@types/foo"));
}

#[test]
fn test_nested_and_duplicate_installs() {
    let project = sample_project();
    project.add_package("pkg-a/node_modules/inner", "inner", "0.1.0", "ISC");
    project.add_package("pkg-b/node_modules/pkg-a", "pkg-a", "1.0.0", "MIT");
    project.write_file("node_modules/broken/package.json", "{ nope");
    project.write_file("node_modules/.bin/pkg-a", "#!/bin/sh\n");

    let output = project.run(&["generate", "--verbose"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let notices = project.read(NOTICES);
    assert!(notices.contains("## ISC\n\n- inner@0.1.0"));
    assert_eq!(notices.matches("- pkg-a@1.0.0").count(), 1);
    assert!(stderr(&output).contains("is not valid JSON"));
}

#[test]
fn test_missing_node_modules_exits_with_hint() {
    let project = TestProject::without_dependencies();

    let output = project.run(&["generate"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("node_modules not found"));
    assert!(!project.exists(NOTICES));
}

#[test]
fn test_unknown_subcommand_prints_usage() {
    let project = sample_project();

    let output = project.run(&["publish"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Usage"));
    assert!(!project.exists(NOTICES));
}

#[test]
fn test_unrecognised_options_are_ignored() {
    let project = sample_project();

    let output = project.run(&["generate", "--foo", "bar", "--format=json", "--dry", "--verbose"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Ignoring unknown option --foo"));
    assert!(stderr(&output).contains("Ignoring unknown option --dry"));
    assert!(project.exists(EXPORT));
    assert!(!project.exists(NOTICES));
}

#[test]
fn test_bare_include_texts_keeps_configured_list() {
    let project = sample_project();

    let output = project.run(&["generate", "--include-texts"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.read(NOTICES).contains("# License Texts\n\n## MIT\n"));
}

#[test]
fn test_unknown_format_writes_nothing() {
    let project = sample_project();

    let output = project.run(&["generate", "--format", "xml"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("Unknown format 'xml'"));
    assert!(!project.exists(NOTICES));
    assert!(!project.exists(EXPORT));
}
