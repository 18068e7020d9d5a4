mod common;

use assert2::{check, let_assert};
use common::{DOXYGEN_FUNCTIONS_P, DoxygenSite, doxygen_site};
use rstest::rstest;
use symsearch::source::{self, DiscoveryOptions, SourceFormat, doxygen};
use symsearch::{IndexStore, QueryEngine};

fn functions_only() -> DiscoveryOptions {
    DiscoveryOptions {
        format: SourceFormat::Auto,
        categories: vec!["functions".to_string()],
    }
}

/// Test: overload occurrences become separate records with decoded signatures.
#[test]
fn overloads_decoded_from_search_data() {
    let entries = doxygen::parse_search_data(DOXYGEN_FUNCTIONS_P).unwrap();
    check!(entries.len() == 4);

    let pack_array = &entries[1];
    check!(pack_array.id == "packarray_1221");
    check!(pack_array.records.len() == 2);

    let first = &pack_array.records[0];
    check!(first.label == "packArray");
    check!(first.scope == "Cajita::Halo");
    check!(first.anchor == "../classCajita_1_1Halo.html#af942");
    let_assert!(Some(signature) = &first.signature);
    check!(signature.starts_with("(const Kokkos::View< char * > &buffer"));
}

/// Test: occurrences that only carry the scope have no signature.
#[test]
fn scope_only_occurrence() {
    let entries = doxygen::parse_search_data(DOXYGEN_FUNCTIONS_P).unwrap();
    let pack_buffer = &entries[2];
    check!(pack_buffer.records[0].scope == "Cajita::Halo");
    check!(pack_buffer.records[0].signature.is_none());
}

#[rstest]
fn discovery_skips_support_files(doxygen_site: DoxygenSite) {
    let files = source::discover(&[doxygen_site.search_dir.clone()], &functions_only()).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    check!(names == ["functions_14.js", "functions_f.js"]);
}

#[rstest]
fn default_categories_only_take_all_files(doxygen_site: DoxygenSite) {
    let files =
        source::discover(&[doxygen_site.search_dir.clone()], &DiscoveryOptions::default()).unwrap();
    check!(files.is_empty());
}

/// Test: a Doxygen directory builds an index that answers incremental queries.
#[rstest]
fn search_directory_end_to_end(doxygen_site: DoxygenSite) {
    let options = functions_only();
    let paths = source::discover(&[doxygen_site.search_dir.clone()], &options).unwrap();
    let files = source::read_sources(&paths, options.format).unwrap();
    let store = IndexStore::build(source::assemble_table(&files).unwrap()).unwrap();

    check!(store.token_count() == 5);
    check!(store.lookup("permute").len() == 2);

    let labels: Vec<&str> = QueryEngine::new(&store)
        .search("pack")
        .iter()
        .map(|r| r.label.as_str())
        .collect();
    check!(labels == ["packArray", "packArray", "packBuffer", "unpackBuffer"]);
}

#[rstest]
fn syntax_errors_name_the_file(doxygen_site: DoxygenSite) {
    let broken = doxygen_site
        .workspace
        .create_file("html/search/functions_0.js", "var searchData=[['a_0',['a',");

    let files = source::read_sources(&[broken.clone()], SourceFormat::Auto).unwrap();
    let_assert!(Err(error) = source::assemble_table(&files));
    check!(error.to_string().contains("functions_0.js"));
}
