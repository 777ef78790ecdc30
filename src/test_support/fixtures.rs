//! C/C++ source-tree fixtures for scanner and analyzer tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A C project laid out on disk inside a temporary directory.
#[derive(Debug)]
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Create an empty project.
    pub fn new() -> Self {
        ProjectFixture {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write a file relative to the project root, creating parents.
    pub fn file(self, rel: impl AsRef<Path>, content: &str) -> Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a project file.
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(rel)
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        ProjectFixture::new()
    }
}

/// A `main` translation unit including the given headers.
pub fn main_c(includes: &[&str]) -> String {
    let mut out = String::new();
    for inc in includes {
        out.push_str(&format!("#include {}\n", inc));
    }
    out.push_str("\nint main(int argc, char **argv) {\n    return 0;\n}\n");
    out
}

/// A library translation unit with one function.
pub fn lib_c(name: &str, includes: &[&str]) -> String {
    let mut out = String::new();
    for inc in includes {
        out.push_str(&format!("#include {}\n", inc));
    }
    out.push_str(&format!("\nint {name}_init(void) {{\n    return 0;\n}}\n"));
    out
}

/// A header declaring `<name>_init`.
pub fn header(name: &str) -> String {
    let guard = name.to_uppercase().replace('-', "_");
    format!("#ifndef {guard}_H\n#define {guard}_H\n\nint {name}_init(void);\n\n#endif\n")
}
