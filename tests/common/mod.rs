//! Shared test fixtures and utilities for integration tests.
//!
//! Every fixture builds its own index or temp directory, so tests never share
//! state or snapshot files.

use rstest::fixture;
use std::path::{Path, PathBuf};
use symsearch::{IndexStore, IndexTable, SymbolRecord};
use tempfile::TempDir;

/// A trimmed Doxygen `functions_f.js` in the exact layout Doxygen emits.
#[allow(dead_code)]
pub const DOXYGEN_FUNCTIONS_P: &str = r"var searchData=
[
  ['p2g_1220',['p2g',['../namespaceCajita.html#af35c',1,'Cajita']]],
  ['packarray_1221',['packArray',['../classCajita_1_1Halo.html#af942',1,'Cajita::Halo::packArray(const Kokkos::View&lt; char * &gt; &amp;buffer, std::integral_constant&lt; std::size_t, 0 &gt;)'],['../classCajita_1_1Halo.html#ae5b9',1,'Cajita::Halo::packArray(const Kokkos::View&lt; char * &gt; &amp;buffer, std::integral_constant&lt; std::size_t, N &gt;)']]],
  ['packbuffer_1222',['packBuffer',['../classCajita_1_1Halo.html#af6d7',1,'Cajita::Halo']]],
  ['permute_1226',['permute',['../namespaceCabana.html#a02c3',1,'Cabana::permute(const LinkedCellListType &amp;linked_cell_list, AoSoA_t &amp;aosoa)'],['../namespaceCabana.html#a5a1c',1,'Cabana::permute(const LinkedCellListType &amp;linked_cell_list, SliceType &amp;slice)']]]
];
";

/// A second category file; `unpackBuffer` contains "pack" only in the middle.
#[allow(dead_code)]
pub const DOXYGEN_FUNCTIONS_U: &str = r"var searchData=
[
  ['unpackbuffer_1300',['unpackBuffer',['../classCajita_1_1Halo.html#a7c1e',1,'Cajita::Halo']]]
];
";

/// Halo record helper.
#[allow(dead_code)]
pub fn halo(label: &str, anchor: &str, signature: Option<&str>) -> SymbolRecord {
    let record = SymbolRecord::new(label, "Cajita::Halo", anchor);
    match signature {
        Some(signature) => record.with_signature(signature),
        None => record,
    }
}

/// The five records a documentation build emits under the single token "pack".
#[allow(dead_code)]
pub fn pack_records() -> Vec<SymbolRecord> {
    vec![
        halo("packArray", "halo.html#pa1", Some("(buffer, 0)")),
        halo("packArray", "halo.html#pa2", Some("(buffer, N)")),
        halo("packBuffer", "halo.html#pb", None),
        halo("packElement", "halo.html#pe1", Some("(buffer, view)")),
        halo("packElement", "halo.html#pe2", Some("(buffer, views)")),
    ]
}

/// Four `permute` overloads spread over two scopes.
#[allow(dead_code)]
pub fn permute_records() -> Vec<SymbolRecord> {
    vec![
        SymbolRecord::new("permute", "Cabana", "cabana.html#p1").with_signature("(cells, aosoa)"),
        SymbolRecord::new("permute", "Cabana", "cabana.html#p2").with_signature("(cells, slice)"),
        SymbolRecord::new("permute", "Cabana::Impl", "impl.html#p3")
            .with_signature("(bins, aosoa)"),
        SymbolRecord::new("permute", "Cabana::Impl", "impl.html#p4")
            .with_signature("(bins, slice)"),
    ]
}

/// A small table mixing the hand-built "pack" and "permute" entries with others.
#[allow(dead_code)]
pub fn sample_table() -> IndexTable {
    let mut table = IndexTable::default();
    table.push("permute", permute_records());
    table.push("pack", pack_records());
    table.push("unpack", vec![halo("unpackBuffer", "halo.html#ub", None)]);
    table.push(
        "packedsize",
        vec![SymbolRecord::new("packedSize", "Cabana", "cabana.html#ps")],
    );
    table.push(
        "halo",
        vec![SymbolRecord::new("Halo", "Cajita", "classCajita_1_1Halo.html")],
    );
    table
}

#[fixture]
#[allow(dead_code)]
pub fn sample_store() -> IndexStore {
    IndexStore::build(sample_table()).expect("sample table is well formed")
}

/// A temporary workspace directory for test isolation.
///
/// The directory is removed when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file (and parent directories) and returns its full path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn create_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }
}

/// A workspace laid out like Doxygen HTML output, with `html/search/` populated.
#[allow(dead_code)]
pub struct DoxygenSite {
    pub workspace: TempWorkspace,
    pub search_dir: PathBuf,
}

#[fixture]
#[allow(dead_code)]
pub fn doxygen_site() -> DoxygenSite {
    let workspace = TempWorkspace::new();
    workspace.create_file("html/search/functions_f.js", DOXYGEN_FUNCTIONS_P);
    workspace.create_file("html/search/functions_14.js", DOXYGEN_FUNCTIONS_U);
    // Doxygen's own support files must be ignored
    workspace.create_file("html/search/search.js", "function SearchBox() {}");
    workspace.create_file("html/search/searchdata.js", "var indexSectionsWithContent = {};");
    let search_dir = workspace.path().join("html/search");
    DoxygenSite {
        workspace,
        search_dir,
    }
}
