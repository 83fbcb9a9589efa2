use pyvet::config;
use pyvet::lint::Linter;
use pyvet::models::MessageCategory;
use pyvet::output::{compose_lint_json, render_lint, OutputFormat};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, contents: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, contents).unwrap();
}

#[test]
fn test_config_file_and_cli_overrides() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(
        &root,
        "pyvet.toml",
        r#"
[main]
disable = ["trailing-whitespace"]
ignore = ["vendor"]
output-format = "json"

[format]
max-line-length = 20
"#,
    );
    write(&root, "app/__init__.py", "");
    write(&root, "app/core.py", "value = 'a fairly long string literal'\nother = 1 \n");
    write(&root, "app/vendor/lib.py", "x = 1 \n\n\n");
    write(&root, "app/broken.py", "s = '\u{0}'\n");

    let eff = config::resolve_effective(root.join("app").to_str()).unwrap();
    assert_eq!(eff.repo_root, root);

    let mut linter = Linter::new().unwrap();
    linter.set_cwd(&root);
    linter.load_configuration(&eff.config).unwrap();
    linter.set_option("main", "enable", "trailing-whitespace").unwrap();
    linter.set_option("main", "disable", "missing-final-newline").unwrap();
    assert_eq!(linter.settings().output_format, OutputFormat::Json);

    let res = linter.check(&[root.join("app")]).unwrap();
    let got: Vec<(&str, &str, u32)> = res
        .messages
        .iter()
        .map(|m| (m.location.path.as_str(), m.symbol.as_str(), m.location.line))
        .collect();
    assert_eq!(
        got,
        vec![
            ("app/broken.py", "syntax-error", 1),
            ("app/core.py", "line-too-long", 1),
            ("app/core.py", "trailing-whitespace", 2),
        ]
    );
    assert_eq!(res.errors.len(), 1);
    assert_eq!(res.errors[0].module, "app.broken");
    assert_eq!(res.stats.modules, 2);
    assert_eq!(res.stats.count(MessageCategory::Convention), 2);
    assert_eq!(res.stats.exit_code(linter.settings().exit_zero), 2 | 16);

    let json = compose_lint_json(&res);
    assert_eq!(json["messages"][1]["module"], "app.core");
    assert_eq!(json["messages"][1]["message"], "Line too long (38/20)");
    assert_eq!(json["summary"]["convention"], 2);

    let human = render_lint(&res, false);
    assert!(human.contains("************* Module app.core\napp/core.py:1:0: C0301: Line too long (38/20) (line-too-long)\n"));
}

#[test]
fn test_exit_zero_and_disable_all() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(&root, "m.py", "x = 1  \n");

    let mut linter = Linter::new().unwrap();
    linter.set_cwd(&root);
    linter.set_option("main", "exit-zero", "yes").unwrap();
    let res = linter.check(&[root.join("m.py")]).unwrap();
    assert_eq!(res.messages.len(), 1);
    assert_eq!(res.stats.exit_code(linter.settings().exit_zero), 0);

    let mut linter = Linter::new().unwrap();
    linter.set_option("main", "disable", "all").unwrap();
    let res = linter.check(&[root.join("m.py")]).unwrap();
    assert!(res.messages.is_empty());
    assert_eq!(res.stats.statements, 1);
}
