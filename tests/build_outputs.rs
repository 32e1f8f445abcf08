use std::error::Error;
use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use assetdag::fs::RealFileSystem;
use assetdag::mode::ModeResolver;
use assetdag::runner::Runner;
use assetdag::Orchestrator;
use assetdag_test_utils::{init_tracing, with_timeout, write_tree};

type TestResult = Result<(), Box<dyn Error>>;

fn table(src: &str) -> toml::Table {
    toml::from_str(src).unwrap()
}

#[tokio::test]
async fn default_aggregate_builds_every_output() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    write_tree(
        dir.path(),
        &[
            ("assets/img/logo.png", "LOGO"),
            ("assets/img/icon.png", "ICON"),
            ("assets/less/a.less", "a {\n  color: red;\n}\n"),
            ("assets/less/b.less", "b {}"),
            ("assets/js/one.js", "one()"),
            ("assets/js/two.js", "two()"),
        ],
    );

    let mut o = Orchestrator::new(
        Runner::new(),
        Arc::new(RealFileSystem),
        dir.path(),
        ModeResolver::new(false),
    );
    o.config(&table("watch = false"))?
        .files("assets/img/*.png", "public/img/", None)?
        .style(
            ["assets/less/a.less", "assets/less/b.less"],
            "public/css/site.css",
            Some(&table(r#"banner = "/* site */""#)),
        )?
        .script("assets/js/*.js", "", None)?;

    let runner = o.into_runner();
    let report = with_timeout(runner.run(&["default"])).await?;
    assert!(report.is_success(), "failures: {:?}", report.failed);
    assert_eq!(report.succeeded.len(), 3);

    let root = dir.path();
    assert_eq!(fs::read_to_string(root.join("public/img/logo.png"))?, "LOGO");
    assert_eq!(fs::read_to_string(root.join("public/img/icon.png"))?, "ICON");
    assert_eq!(
        fs::read_to_string(root.join("public/css/site.css"))?,
        "/* site */\na {\n  color: red;\n}\n\nb {}"
    );
    assert_eq!(fs::read_to_string(root.join("public/app.js"))?, "one();\ntwo()");
    Ok(())
}

#[tokio::test]
async fn production_compresses_bundles() -> TestResult {
    let dir = tempdir()?;
    write_tree(
        dir.path(),
        &[("assets/less/app.less", "body {\n    margin: 0;\n\n}\n")],
    );

    let mut o = Orchestrator::new(
        Runner::new(),
        Arc::new(RealFileSystem),
        dir.path(),
        ModeResolver::new(true),
    );
    o.style("assets/less/app.less", "public/css/app.css", None)?;

    let report = with_timeout(o.into_runner().run(&["production"])).await?;
    report.into_result()?;

    assert_eq!(
        fs::read_to_string(dir.path().join("public/css/app.css"))?,
        "body {\nmargin: 0;\n}"
    );
    Ok(())
}

#[tokio::test]
async fn files_without_overwrite_keep_existing_output() -> TestResult {
    let dir = tempdir()?;
    write_tree(
        dir.path(),
        &[("robots.txt", "new"), ("public/robots.txt", "old")],
    );

    let mut o = Orchestrator::new(
        Runner::new(),
        Arc::new(RealFileSystem),
        dir.path(),
        ModeResolver::new(true),
    );
    o.files("robots.txt", "public/robots.txt", Some(&table("overwrite = false")))?;

    with_timeout(o.into_runner().run(&["default"]))
        .await?
        .into_result()?;
    assert_eq!(fs::read_to_string(dir.path().join("public/robots.txt"))?, "old");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn compiler_filters_the_bundle() -> TestResult {
    let dir = tempdir()?;
    write_tree(dir.path(), &[("assets/js/app.js", "hello")]);

    let mut o = Orchestrator::new(
        Runner::new(),
        Arc::new(RealFileSystem),
        dir.path(),
        ModeResolver::new(true),
    );
    o.config(&table(
        r#"
        [script]
        compiler = "tr a-z A-Z"
        "#,
    ))?
    .script("assets/js/app.js", "public/js/app.js", None)?;

    with_timeout(o.into_runner().run(&["default"]))
        .await?
        .into_result()?;
    assert_eq!(
        fs::read_to_string(dir.path().join("public/js/app.js"))?.trim(),
        "HELLO"
    );
    Ok(())
}

#[tokio::test]
async fn unknown_task_name_is_an_error() -> TestResult {
    let dir = tempdir()?;
    let o = Orchestrator::new(
        Runner::new(),
        Arc::new(RealFileSystem),
        dir.path(),
        ModeResolver::new(false),
    );
    let err = o.into_runner().run(&["nope"]).await.unwrap_err();
    assert!(matches!(err, assetdag::AssetdagError::TaskNotFound(name) if name == "nope"));
    Ok(())
}
