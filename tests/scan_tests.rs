mod common;

use serde_json::json;
use tsu_loader::{Error, Loader, Options, Registry, RouteFile};

use common::App;

fn groups(routes: &[RouteFile]) -> Vec<(&str, &str)> {
    routes.iter().map(|r| (r.file_group.as_str(), r.dir_group.as_str())).collect()
}

#[test]
fn files_map_to_groups_one_level_deep() {
    let app = App::new();
    app.touch("controller/home.rs");
    app.touch("controller/api/content.rs");
    app.touch("controller/api/v2/deep.rs");
    app.touch("controller/api/v2/more/deeper.rs");

    let loader = Loader::new(Options::default().app_path(app.path()), Registry::new()).unwrap();
    let scanned = loader.scan().unwrap();

    assert_eq!(groups(&scanned.routes), [("/api/content", "/api"), ("/home", "/")]);
    let content = &scanned.routes[0];
    assert_eq!(content.file_name, "content.rs");
    assert_eq!(content.module_name, "content");
    assert_eq!(content.file_path, app.path().join("controller/api/content.rs"));
}

#[test]
fn exclusion_sentinel_hides_files_and_directories() {
    let app = App::new();
    app.touch("controller/!draft.rs");
    app.touch("controller/!legacy/old.rs");
    app.touch("controller/!legacy/__mid.rs");
    app.touch("controller/api/!wip.rs");
    app.touch("controller/api/live.rs");

    let loader = Loader::new(Options::default().app_path(app.path()), Registry::new()).unwrap();
    let scanned = loader.scan().unwrap();

    assert_eq!(groups(&scanned.routes), [("/api/live", "/api")]);
    assert!(scanned.tables.groups.is_empty());
}

#[test]
fn subgroup_allow_list_limits_descent() {
    let app = App::new();
    app.touch("controller/api/content.rs");
    app.touch("controller/admin/panel.rs");
    app.touch("controller/root.rs");

    let opts = Options::default().app_path(app.path()).subgroup(["api"]);
    let loader = Loader::new(opts, Registry::new()).unwrap();
    let scanned = loader.scan().unwrap();

    assert_eq!(groups(&scanned.routes), [("/api/content", "/api"), ("/root", "/")]);
}

#[test]
fn ineligible_files_are_ignored() {
    let app = App::new();
    app.touch("controller/.rs");
    app.touch("controller/README.md");
    app.touch("controller/notes.rs.bak");
    app.touch("controller/ok.rs");

    let loader = Loader::new(Options::default().app_path(app.path()), Registry::new()).unwrap();
    assert_eq!(groups(&loader.scan().unwrap().routes), [("/ok", "/")]);
}

#[test]
fn mid_files_fill_global_and_group_tiers_and_never_route() {
    let app = App::new();
    let root_mid = app.touch("controller/__mid.rs");
    let api_mid = app.touch("controller/api/__mid.rs");
    app.touch("controller/api/content.rs");

    let registry = Registry::new()
        .exports(&root_mid, json!([{ "name": "a" }, { "name": "b" }]))
        .exports(&api_mid, json!([{ "name": "c" }]));
    let loader = Loader::new(Options::default().app_path(app.path()), registry).unwrap();
    let scanned = loader.scan().unwrap();

    assert_eq!(groups(&scanned.routes), [("/api/content", "/api")]);
    let global = scanned.tables.global.expect("global tier");
    assert_eq!(global.exports, json!([{ "name": "a" }, { "name": "b" }]));
    assert_eq!(global.origin, root_mid);
    assert_eq!(scanned.tables.groups["/api"].exports, json!([{ "name": "c" }]));
}

#[test]
fn malformed_mid_export_is_not_a_scan_error() {
    let app = App::new();
    let mid = app.touch("controller/__mid.rs");

    let registry = Registry::new().exports(&mid, json!({ "not": "a list" }));
    let loader = Loader::new(Options::default().app_path(app.path()), registry).unwrap();
    let scanned = loader.scan().unwrap();

    assert!(matches!(scanned.tables.global.unwrap().descriptors(), Err(Error::Descriptor { .. })));
}

#[test]
fn mid_file_of_the_wrong_kind_fails_the_scan() {
    let app = App::new();
    let mid = app.touch("controller/__mid.rs");

    let registry = Registry::new().model(&mid, |_res| Ok(()));
    let loader = Loader::new(Options::default().app_path(app.path()), registry).unwrap();

    assert!(matches!(loader.scan(), Err(Error::ModuleKind { .. })));
}

#[test]
fn trailing_slash_on_root_does_not_change_groups() {
    let app = App::new();
    app.touch("ctl/api/content.rs");

    let mut opts = Options::default().app_path(app.path());
    opts.controller_path = "ctl/".into();
    let loader = Loader::new(opts, Registry::new()).unwrap();
    let scanned = loader.scan().unwrap();

    assert_eq!(groups(&scanned.routes), [("/api/content", "/api")]);
}

#[test]
fn custom_extension_selects_module_files() {
    let app = App::new();
    app.touch("controller/api/content.ctl");
    app.touch("controller/api/ignored.rs");

    let mut opts = Options::default().app_path(app.path());
    opts.extension = "ctl".into();
    let loader = Loader::new(opts, Registry::new()).unwrap();

    assert_eq!(groups(&loader.scan().unwrap().routes), [("/api/content", "/api")]);
}

#[test]
fn missing_controller_directory_is_created_at_startup() {
    let app = App::new();
    let loader = Loader::new(Options::default().app_path(app.path()), Registry::new()).unwrap();

    assert!(app.path().join("controller").is_dir());
    assert!(app.path().join("middleware").is_dir());
    assert!(app.path().join("model").is_dir());
    assert!(loader.scan().unwrap().routes.is_empty());
}

#[test]
fn unreadable_root_fails_the_scan() {
    let app = App::new();
    let loader = Loader::new(Options::default().app_path(app.path()), Registry::new()).unwrap();
    std::fs::remove_dir(app.path().join("controller")).unwrap();

    assert!(matches!(loader.scan(), Err(Error::Io { .. })));
}
