//! Shared helpers for building on-disk page repositories in a temp dir.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use fitrun::repository::REPORT_ASSETS;
use tempfile::TempDir;

/// A test repository under a temporary directory, removed on drop.
pub struct RepoBuilder {
    dir: TempDir,
}

impl RepoBuilder {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join("pages")).expect("create pages dir");
        Self { dir }
    }

    /// Same as [`RepoBuilder::new`] with every report asset present.
    pub fn with_assets() -> Self {
        let repo = Self::new();
        for (source, _) in REPORT_ASSETS {
            let path = repo.dir.path().join("files").join(source);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("/* {source} */")).unwrap();
        }
        repo
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// A fresh output directory next to the repository.
    pub fn output(&self) -> PathBuf {
        self.dir.path().join("report")
    }

    fn page_dir(&self, dotted: &str) -> PathBuf {
        dotted
            .split('.')
            .fold(self.dir.path().join("pages"), |path, part| path.join(part))
    }

    /// Writes a page with content and no markers.
    pub fn page(self, dotted: &str, content: &str) -> Self {
        self.write_page(dotted, content, None)
    }

    pub fn test(self, dotted: &str, content: &str) -> Self {
        self.write_page(dotted, content, Some("test: true\n"))
    }

    pub fn suite(self, dotted: &str) -> Self {
        self.write_page(dotted, "", Some("suite: true\n"))
    }

    pub fn suite_ordered(self, dotted: &str, order: &[&str]) -> Self {
        let properties = format!("suite: true\norder: [{}]\n", order.join(", "));
        self.write_page(dotted, "", Some(&properties))
    }

    fn write_page(self, dotted: &str, content: &str, properties: Option<&str>) -> Self {
        let dir = self.page_dir(dotted);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("content.txt"), content).unwrap();
        if let Some(properties) = properties {
            fs::write(dir.join("properties.yaml"), properties).unwrap();
        }
        self
    }
}

/// A one-cell table naming a fixture.
pub fn table(fixture: &str) -> String {
    format!("<table><tr><td>{fixture}</td></tr></table>")
}

/// A division column table with one row per `(numerator, denominator,
/// expected)` triple.
pub fn division(rows: &[(&str, &str, &str)]) -> String {
    let mut html = String::from(
        "<table><tr><td>Division</td></tr>\
         <tr><td>numerator</td><td>denominator</td><td>quotient?</td></tr>",
    );
    for (n, d, q) in rows {
        html.push_str(&format!("<tr><td>{n}</td><td>{d}</td><td>{q}</td></tr>"));
    }
    html.push_str("</table>");
    html
}
