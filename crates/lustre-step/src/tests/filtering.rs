//! Restricting steps to files by extension.

use std::sync::Arc;

use rstest::rstest;

use super::support::{Counters, counters, suffix_step};
use crate::{FileContext, FileFilter, FormatterStep};

#[rstest]
#[case::plain("rs", "src/main.rs", true)]
#[case::leading_dot(".rs", "src/main.rs", true)]
#[case::case_insensitive("RS", "src/Main.Rs", true)]
#[case::other_extension("rs", "README.md", false)]
#[case::no_extension("rs", "Makefile", false)]
fn filter_matches_extensions(#[case] extension: &str, #[case] path: &str, #[case] expected: bool) {
    let filter = FileFilter::extensions([extension]).expect("filter");
    let accepted = filter.accepts(&FileContext::new(path)).expect("real file");
    assert_eq!(accepted, expected);
}

#[rstest]
#[case::nothing(&[])]
#[case::blank(&["rs", " "])]
#[case::dot_only(&["."])]
#[case::compound(&["tar.gz"])]
#[case::compound_with_leading_dot(&[".tar.gz"])]
fn filter_rejects_unusable_extensions(#[case] extensions: &[&str]) {
    let error = FileFilter::extensions(extensions.iter().copied()).expect_err("unusable");
    assert!(error.is_invalid_argument());
}

#[test]
fn compound_extension_is_refused_but_its_last_part_matches() {
    let error = FileFilter::extensions(["tar.gz"]).expect_err("compound");
    assert!(error.to_string().contains("tar.gz"));

    let filter = FileFilter::extensions(["gz"]).expect("filter");
    let accepted = filter
        .accepts(&FileContext::new("backup.tar.gz"))
        .expect("real file");
    assert!(accepted);
}

#[rstest]
fn rejected_files_pass_through_without_building(counters: Arc<Counters>) {
    let step = suffix_step("suffix", &counters, ";", false)
        .filter_by_file(FileFilter::extensions(["rs"]).expect("filter"));

    let file = FileContext::new("notes.txt");
    assert_eq!(step.format("bad", &file).expect("pass through"), "bad");
    assert!(step.lint("\tx", &file).expect("no lint").is_empty());
    assert_eq!(counters.computed(), 0);
    assert_eq!(counters.built(), 0);

    let source = FileContext::new("lib.rs");
    assert_eq!(step.format("x", &source).expect("format"), "x;");
    assert_eq!(step.lint("\tx", &source).expect("lint").len(), 1);
    assert_eq!(step.name(), "suffix");
}

#[rstest]
fn filtering_needs_a_real_file(counters: Arc<Counters>) {
    let step = suffix_step("suffix", &counters, ";", false)
        .filter_by_file(FileFilter::extensions(["rs"]).expect("filter"));
    let error = step
        .format("x", FileContext::sentinel())
        .expect_err("sentinel rejected");
    assert!(error.is_invalid_argument());
    assert!(step.lint("x", FileContext::sentinel()).is_err());
}

#[rstest]
fn fingerprint_covers_delegate_and_filter(counters: Arc<Counters>) {
    let plain = suffix_step("suffix", &counters, ";", false);
    let plain_fingerprint = plain.fingerprint().expect("fingerprint");

    let rust_only = suffix_step("suffix", &counters, ";", false)
        .filter_by_file(FileFilter::extensions(["rs"]).expect("filter"));
    let rust_again = suffix_step("renamed", &counters, ";", false)
        .filter_by_file(FileFilter::extensions([".RS"]).expect("filter"));
    let markdown = suffix_step("suffix", &counters, ";", false)
        .filter_by_file(FileFilter::extensions(["md"]).expect("filter"));
    let other_state = suffix_step("suffix", &counters, ",", false)
        .filter_by_file(FileFilter::extensions(["rs"]).expect("filter"));

    let fingerprint = rust_only.fingerprint().expect("fingerprint");
    assert_ne!(fingerprint, plain_fingerprint);
    assert_eq!(fingerprint, rust_again.fingerprint().expect("fingerprint"));
    assert_ne!(fingerprint, markdown.fingerprint().expect("fingerprint"));
    assert_ne!(fingerprint, other_state.fingerprint().expect("fingerprint"));
}

#[rstest]
fn dispose_reaches_the_delegate(counters: Arc<Counters>) {
    let mut step = suffix_step("suffix", &counters, ";", true)
        .filter_by_file(FileFilter::extensions(["rs"]).expect("filter"));
    step.format("x", &FileContext::new("a.rs")).expect("format");
    step.dispose_function();
    assert_eq!(counters.released(), 1);
}
