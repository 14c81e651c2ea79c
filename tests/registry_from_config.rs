// tests/registry_from_config.rs

mod common;

use std::path::Path;
use std::sync::Arc;

use taskpipe::config::Settings;
use taskpipe::fs::{FileSystem, MockFileSystem};
use taskpipe::pipe::RenameRule;
use taskpipe::task::{TaskRegistry, TaskRunner};
use taskpipe::watch::bindings_from_config;

use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder, name, series_of};

fn rename_to_dist() -> Vec<RenameRule> {
    vec![
        RenameRule::Relocate {
            from: "src".into(),
            to: "dist".into(),
        },
        RenameRule::Lowercase,
    ]
}

#[tokio::test]
async fn config_tasks_run_against_the_filesystem() {
    let fs = MockFileSystem::new();
    fs.add_file("./src/js/App.js", "js");
    fs.add_file("./src/css/Site.css", "css");

    let cfg = ConfigFileBuilder::new()
        .with_task(
            "js",
            TaskConfigBuilder::pipe(&["src/js/*.js"]).rename(rename_to_dist()).build(),
        )
        .with_task(
            "css",
            TaskConfigBuilder::pipe(&["src/css/*.css"]).rename(rename_to_dist()).build(),
        )
        .with_task(
            "default",
            TaskConfigBuilder::parallel(vec![name("js"), series_of(vec![name("css")])]).build(),
        )
        .build();

    let registry = TaskRegistry::from_config(&cfg, &Settings::new("."), Arc::new(fs.clone())).unwrap();
    assert_eq!(
        registry.lookup("default").unwrap().label(),
        "parallel(js, series(css))"
    );

    TaskRunner::new(registry).run_named("default").await.unwrap();
    assert!(fs.is_file(Path::new("./dist/js/app.js")));
    assert!(fs.is_file(Path::new("./dist/css/site.css")));
}

#[tokio::test]
async fn base_path_prefixes_pipe_sources() {
    let fs = MockFileSystem::new();
    fs.add_file("./web/src/js/a.js", "a");
    fs.add_file("./src/js/b.js", "b");

    let cfg = ConfigFileBuilder::new()
        .with_task("js", TaskConfigBuilder::pipe(&["src/js/*.js"]).dest("out").build())
        .build();
    let settings = Settings::new(".").with_base_path("web/");

    let registry = TaskRegistry::from_config(&cfg, &settings, Arc::new(fs.clone())).unwrap();
    TaskRunner::new(registry).run_named("js").await.unwrap();

    assert!(fs.is_file(Path::new("./web/out/src/js/a.js")));
    assert!(!fs.is_file(Path::new("./web/out/src/js/b.js")));
    assert!(!fs.is_file(Path::new("./out/src/js/b.js")));
}

#[tokio::test]
async fn base_path_outputs_mirror_into_dist_under_the_base() {
    let fs = MockFileSystem::new();
    fs.add_file("./web/src/js/Foo.js", "foo");

    let mut rules = rename_to_dist();
    rules.push(RenameRule::Prefix("lib-".into()));
    let cfg = ConfigFileBuilder::new()
        .with_task("js", TaskConfigBuilder::pipe(&["src/js/**/*.js"]).rename(rules).build())
        .with_task(
            "js_uglify",
            TaskConfigBuilder::pipe(&["dist/js/**/*.js", "!**/*.min.js"])
                .rename(vec![RenameRule::ExtensionPrefix(".min".into())])
                .build(),
        )
        .with_task("default", TaskConfigBuilder::series(vec![name("js"), name("js_uglify")]).build())
        .build();
    let settings = Settings::new(".").with_base_path("web/");

    let registry = TaskRegistry::from_config(&cfg, &settings, Arc::new(fs.clone())).unwrap();
    TaskRunner::new(registry).run_named("default").await.unwrap();

    assert!(fs.is_file(Path::new("./web/dist/js/lib-foo.js")));
    assert!(fs.is_file(Path::new("./web/dist/js/lib-foo.min.js")));
    assert!(!fs.is_file(Path::new("./web/src/js/lib-foo.js")));
}

#[test]
fn watch_bindings_use_names_or_composite_labels() {
    let cfg = ConfigFileBuilder::new()
        .with_task("js", TaskConfigBuilder::cmd("true").build())
        .with_task("js_uglify", TaskConfigBuilder::cmd("true").build())
        .with_watch(&["src/js/**/*.js"], name("js"))
        .with_watch(
            &["src/js/**/*.js", "!**/*.min.js"],
            series_of(vec![name("js"), name("js_uglify")]),
        )
        .build();

    let bindings = bindings_from_config(&cfg, &Settings::new(".").with_base_path("app/")).unwrap();
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[0].key(), "js");
    assert_eq!(bindings[1].key(), "series(js, js_uglify)");
    assert!(bindings[0].matches("app/src/js/a.js"));
    assert!(!bindings[1].matches("app/src/js/a.min.js"));
}
