use super::*;
use crate::asset::walk_files;
use crate::config::BuildSectionConfig;
use std::collections::BTreeMap;
use tempfile::TempDir;

struct Site {
    _dir: TempDir,
    config: SiteConfig,
}

impl Site {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let config = SiteConfig {
            build: BuildSectionConfig {
                source: root.join("src"),
                output: root.join("dist"),
                quiet: true,
                ..Default::default()
            },
            root,
            ..Default::default()
        };
        fs::create_dir_all(&config.build.source).unwrap();
        Self { _dir: dir, config }
    }

    fn write(&self, rel: &str, content: impl AsRef<[u8]>) {
        let path = self.config.build.source.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn output(&self, rel: &str) -> PathBuf {
        self.config.build.output.join(rel.trim_start_matches('/'))
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.output(rel)).unwrap()
    }

    fn build(&self) -> BuildReport {
        build_site(&self.config).unwrap()
    }

    /// Relative path -> bytes for the whole output tree.
    fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let out = &self.config.build.output;
        walk_files(out)
            .unwrap()
            .into_iter()
            .map(|path| {
                let bytes = fs::read(&path).unwrap();
                (path.strip_prefix(out).unwrap().to_path_buf(), bytes)
            })
            .collect()
    }

    fn basic(&self) {
        self.write(
            "index.html",
            "<html><head>\
             <link rel=\"stylesheet\" href=\"/css/site.css\">\
             <script src=\"js/app.js\"></script>\
             </head><body><img src=\"img/logo.png\"></body></html>",
        );
        self.write("js/app.js", "function greet(name) {\n  console.log('hello ' + name);\n}\ngreet('world');\n");
        self.write("css/site.css", "body {\n  color: red;\n}\n");
        self.write("img/logo.png", [0x89, b'P', b'N', b'G', 0x00, 0xff]);
    }
}

fn phase_of(err: &anyhow::Error) -> Option<BuildPhase> {
    err.downcast_ref::<PhaseError>().map(|e| e.phase)
}

#[test]
fn test_build_layout() {
    let site = Site::new();
    site.basic();

    let report = site.build();

    assert_eq!(report.phase, BuildPhase::Done);
    assert_eq!(report.entry_points, 2);
    assert_eq!(report.copied, 2);
    assert_eq!(report.documents, 1);
    assert_eq!(report.references, 2);
    assert_eq!(report.manifest_path, site.output("manifest.json"));

    // Entry points only exist under hashed names
    assert!(!site.output("js/app.js").exists());
    assert!(!site.output("css/site.css").exists());
    let js = report.manifest.lookup("/js/app.js").unwrap();
    let css = report.manifest.lookup("/css/site.css").unwrap();
    assert!(site.output(js).is_file());
    assert!(site.output(css).is_file());

    // Everything else is copied verbatim
    assert_eq!(
        fs::read(site.output("img/logo.png")).unwrap(),
        [0x89, b'P', b'N', b'G', 0x00, 0xff]
    );
    assert!(site.output("index.html").is_file());
}

#[test]
fn test_build_manifest_file() {
    let site = Site::new();
    site.basic();

    let report = site.build();

    let json = site.read("manifest.json");
    let parsed: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
    let expected: BTreeMap<String, String> = report
        .manifest
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(parsed, expected);
    assert_eq!(parsed.len(), 2);
}

#[test]
fn test_build_rewrites_references() {
    let site = Site::new();
    site.basic();

    let report = site.build();
    let html = site.read("index.html");

    let js = report.manifest.lookup("/js/app.js").unwrap();
    let css = report.manifest.lookup("/css/site.css").unwrap();
    assert!(html.contains(&format!("href=\"{css}\"")));
    assert!(html.contains(&format!("src=\"{js}\"")));
    // Images are not entry points and keep their reference
    assert!(html.contains("<img src=\"img/logo.png\">"));

    // Every rewritten reference names a file that exists
    for (_, dist) in report.manifest.iter() {
        assert!(site.output(dist).is_file(), "{dist} missing");
    }
}

#[test]
fn test_build_is_idempotent() {
    let site = Site::new();
    site.basic();

    site.build();
    let first = site.snapshot();
    site.build();
    let second = site.snapshot();

    assert_eq!(first, second);
}

#[test]
fn test_build_hash_tracks_content() {
    let site = Site::new();
    site.basic();

    let before = site.build().manifest;
    site.write("js/app.js", "console.log('changed');\n");
    let after = site.build().manifest;

    assert_ne!(before.lookup("/js/app.js"), after.lookup("/js/app.js"));
    assert_eq!(before.lookup("/css/site.css"), after.lookup("/css/site.css"));
    // The old name does not linger
    assert!(!site.output(before.lookup("/js/app.js").unwrap()).exists());
}

#[test]
fn test_build_leaves_unmatched_documents_untouched() {
    let site = Site::new();
    let html = "<!DOCTYPE html>\n<html>\n<head>\n\
                <script src=\"https://cdn.example.com/lib.js\"></script>\n\
                <script src=\"//cdn.example.com/other.js\"></script>\n\
                <link rel=\"icon\" href=\"data:image/png;base64,AAAA\">\n\
                <script src=\"/js/missing.js\"></script>\n\
                <link rel=\"stylesheet\" href=\"\">\n\
                </head>\n</html>\n";
    site.write("index.html", html);
    site.write("js/app.js", "let a = 1;");

    let report = site.build();

    assert_eq!(report.references, 0);
    assert_eq!(site.read("index.html"), html);
}

#[test]
fn test_build_resolves_relative_to_document() {
    let site = Site::new();
    site.write(
        "blog/post/index.html",
        "<link rel=\"stylesheet\" href=\"../style.css\"><script src=\"../../js/app.js\"></script>",
    );
    site.write("blog/style.css", "p { margin: 0 }");
    site.write("js/app.js", "let a = 1;");

    let report = site.build();
    let html = site.read("blog/post/index.html");

    let css = report.manifest.lookup("/blog/style.css").unwrap();
    let js = report.manifest.lookup("/js/app.js").unwrap();
    assert!(css.starts_with("/blog/style-"));
    assert!(html.contains(&format!("href=\"{css}\"")));
    assert!(html.contains(&format!("src=\"{js}\"")));
}

#[test]
fn test_build_starts_from_clean_slate() {
    let site = Site::new();
    site.basic();
    fs::create_dir_all(site.output("old")).unwrap();
    fs::write(site.output("old/stale-12345678.js"), "stale").unwrap();
    fs::write(site.output("leftover.html"), "<p>old</p>").unwrap();

    site.build();

    assert!(!site.output("old").exists());
    assert!(!site.output("leftover.html").exists());
}

#[test]
fn test_build_empty_source() {
    let site = Site::new();

    let report = site.build();

    assert_eq!(report.entry_points, 0);
    assert!(report.manifest.is_empty());
    assert_eq!(site.read("manifest.json"), "{}\n");
}

#[test]
fn test_build_without_minify_keeps_names() {
    let mut site = Site::new();
    site.config.build.minify = false;
    site.write("js/math.js", "export function add(first, second) {\n  return first + second;\n}\n");

    let report = site.build();
    let js = site.read(report.manifest.lookup("/js/math.js").unwrap());

    assert!(js.contains("second"));
}

#[test]
fn test_build_compile_error_aborts() {
    let site = Site::new();
    site.basic();
    site.write("js/broken.js", "let = ;");

    let err = build_site(&site.config).unwrap_err();

    assert_eq!(phase_of(&err), Some(BuildPhase::Bundled));
    assert!(format!("{err:#}").contains("broken.js"));
    assert!(!site.output("manifest.json").exists());
    // Documents are never rewritten against a partial manifest
    assert!(!site.output("index.html").exists());
}

#[test]
fn test_build_missing_source() {
    let site = Site::new();
    fs::remove_dir_all(&site.config.build.source).unwrap();

    let err = build_site(&site.config).unwrap_err();

    assert_eq!(phase_of(&err), Some(BuildPhase::EntryPointsFound));
}

#[test]
fn test_build_manifest_in_subdirectory() {
    let mut site = Site::new();
    site.config.build.manifest = PathBuf::from("meta/assets.json");
    site.basic();

    let report = site.build();

    assert_eq!(report.manifest_path, site.output("meta/assets.json"));
    assert!(report.manifest_path.is_file());
    assert!(!site.output("manifest.json").exists());
}

#[test]
fn test_build_rewrites_unquoted_references() {
    let site = Site::new();
    site.write(
        "index.html",
        "<link rel=stylesheet href=css/site.css><script src=js/app.js></script>",
    );
    site.write("js/app.js", "let a = 1;");
    site.write("css/site.css", "body { color: red }");

    let report = site.build();
    let html = site.read("index.html");

    let js = report.manifest.lookup("/js/app.js").unwrap();
    let css = report.manifest.lookup("/css/site.css").unwrap();
    assert_eq!(report.references, 2);
    assert_eq!(html, format!("<link rel=stylesheet href={css}><script src={js}></script>"));
    assert!(site.output(js).is_file());
}

#[test]
fn test_build_keeps_markup_inside_inline_script() {
    let site = Site::new();
    let html = "<script>document.write('<script src=\"/js/app.js\"></' + 'script>');</script>\n\
                <textarea><link href=\"/css/site.css\"></textarea>\n";
    site.write("index.html", html);
    site.write("js/app.js", "let a = 1;");
    site.write("css/site.css", "body { color: red }");

    let report = site.build();

    assert_eq!(report.references, 0);
    assert_eq!(site.read("index.html"), html);
}

#[cfg(unix)]
#[test]
fn test_build_follows_file_symlinks() {
    use std::os::unix::fs::symlink;

    let site = Site::new();
    let shared = site.config.root.join("shared");
    fs::create_dir_all(&shared).unwrap();
    fs::write(shared.join("app.js"), "console.log('shared');").unwrap();
    fs::write(shared.join("logo.png"), [1u8, 2, 3]).unwrap();

    site.write("index.html", "<script src=\"/js/app.js\"></script>");
    fs::create_dir_all(site.config.build.source.join("js")).unwrap();
    symlink(shared.join("app.js"), site.config.build.source.join("js/app.js")).unwrap();
    symlink(shared.join("logo.png"), site.config.build.source.join("logo.png")).unwrap();

    let report = site.build();

    let js = report.manifest.lookup("/js/app.js").unwrap();
    assert!(site.output(js).is_file());
    assert!(site.read("index.html").contains(js));
    assert_eq!(fs::read(site.output("logo.png")).unwrap(), [1u8, 2, 3]);
}
