use annotate_core::{
    Error, FileAdapter, LoadTransform, NoCacheTransform, PipelineFile, SourceFile, VersionToken,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in [
        "app/components/header.js",
        "app/components/footer.js",
        "app/main.js",
        "app/templates/header.template.html",
    ] {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    dir
}

fn contents(file: &SourceFile) -> String {
    String::from_utf8(file.buffer().unwrap().to_vec()).unwrap()
}

#[test]
fn load_then_no_cache() {
    let dir = project();
    let adapter = FileAdapter::new(LoadTransform::new(dir.path()))
        .then(NoCacheTransform::new(VersionToken::fixed("1700000000000")));

    let source = "\
var scripts = [
//@Load(components, ['app/components/*.js', 'app/main.js'], {'base': 'app', 'posix': true})
];
var header = {
    //@NoCache()
    templateUrl: 'templates/header.template.html',
    //@NoCache()
    controllerUrl: './components/header'
};
";
    let file = adapter
        .process(SourceFile::buffer(dir.path().join("index.js"), source))
        .unwrap();

    assert_eq!(
        contents(&file),
        "\
var scripts = [
\"components/footer.js\",
\"components/header.js\",
\"main.js\"
];
var header = {
    templateUrl: 'templates/header.template.html?v=1700000000000',
    controllerUrl: './components/header?v=1700000000000'
};
"
    );
}

#[test]
fn batch_run_keeps_going_after_a_bad_file() {
    let dir = project();
    let adapter = FileAdapter::new(LoadTransform::new(dir.path()));

    let report = adapter.run(vec![
        SourceFile::buffer("dup.js", "//@Load(a, ['*.js'])\n//@Load(a, ['*.css'])"),
        SourceFile::buffer("ok.js", "[//@Load(main, ['app/main.js'])]"),
        SourceFile::buffer("empty.js", "[//@Load()]"),
    ]);

    assert_eq!(report.files.len(), 1);
    assert_eq!(contents(&report.files[0]), "[\"app/main.js\"]");

    assert_eq!(report.failures.len(), 2);
    assert!(matches!(report.failures[0].error, Error::DuplicateLabel { .. }));
    assert!(matches!(report.failures[1].error, Error::EmptyArguments));
}

#[test]
fn load_output_is_stable_under_rerun() {
    let dir = project();
    let adapter = FileAdapter::new(LoadTransform::new(dir.path()));

    let once = adapter
        .process(SourceFile::buffer("a.js", "x = [//@Load(all, ['app/**/*.js'])];"))
        .unwrap();
    let first = contents(&once);
    let twice = adapter.process(once).unwrap();

    assert_eq!(contents(&twice), first);
}

#[test]
fn write_in_place_and_to_out_dir() {
    let dir = project();
    let input = dir.path().join("app/index.js");
    fs::write(&input, "//@NoCache()\n'views/main.html'\n").unwrap();

    let adapter = FileAdapter::new(NoCacheTransform::new(VersionToken::fixed("7")));
    let file = adapter
        .process(SourceFile::read(&input).unwrap().with_base(dir.path()))
        .unwrap();

    let out = dir.path().join("dist");
    let written = file.write(Some(&out)).unwrap().unwrap();
    assert_eq!(written, out.join("app/index.js"));
    assert_eq!(fs::read_to_string(&written).unwrap(), "'views/main.html?v=7'\n");
    assert_eq!(
        fs::read_to_string(&input).unwrap(),
        "//@NoCache()\n'views/main.html'\n"
    );

    file.write(None).unwrap();
    assert_eq!(fs::read_to_string(Path::new(&input)).unwrap(), "'views/main.html?v=7'\n");
}
