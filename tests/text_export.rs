mod common;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use mstab::cancel::CancelToken;
use mstab::data::Cell;
use mstab::error::ReadError;
use mstab::io_utils;
use mstab::table::Table;
use mstab::text_export::{TextExportKind, read_text_export};

use common::TestWorkspace;

fn read_file(kind: TextExportKind, path: &Path) -> Result<Table, ReadError> {
    let reader = BufReader::new(File::open(path).expect("open input"));
    read_text_export(kind, reader, &CancelToken::new())
}

#[test]
fn consensus_export_joins_identifications_across_a_file() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "consensus.txt",
        concat!(
            "#MAP id filename label size\n",
            "#RUN run_id score_type score_direction date_time search_engine_version parameters\n",
            "#CONSENSUS rt_cf mz_cf intensity_cf charge_cf width_cf quality_cf\n",
            "#PEPTIDE rt mz score rank sequence charge aa_before aa_after score_type search_identifier accessions start end\n",
            "MAP 0 file1.mzML label0 2\n",
            "CONSENSUS 300.5 500.25 12000 2 0.5 0.9\n",
            "PEPTIDE 300.6 500.2 0.99 1 MKVLAAGK 2 K L q-value run0 sp|P02768 10 17\n",
            "CONSENSUS 420.7 600.5 8000 3 0.4 0.8\n",
        ),
    );

    let table = read_file(TextExportKind::Consensus, &path).expect("read consensus");
    assert_eq!(table.len(), 2);
    assert_eq!(table.schema().len(), 6 + 13);
    assert_eq!(table.schema().headers()[0], "rt_cf");
    assert_eq!(table.schema().headers()[10], "sequence");

    let identified = table.rows()[0].cells();
    assert_eq!(identified[0], Cell::Double(300.5));
    assert_eq!(identified[3], Cell::Integer(2));
    assert_eq!(identified[10], Cell::String("MKVLAAGK".into()));
    assert_eq!(identified[16], Cell::String("sp|P02768".into()));

    let unidentified = table.rows()[1].cells();
    assert_eq!(unidentified[1], Cell::Double(600.5));
    assert_eq!(unidentified[10], Cell::String("UNIDENTIFIED_PEPTIDE".into()));
    assert_eq!(unidentified[16], Cell::String("UNIDENTIFIED_PROTEIN".into()));
}

#[test]
fn element_line_directly_after_headers_is_kept() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "single.txt",
        concat!(
            "#CONSENSUS rt_cf mz_cf\n",
            "CONSENSUS 1.25 655.35\n",
        ),
    );

    let table = read_file(TextExportKind::Consensus, &path).expect("read consensus");
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].cells()[0], Cell::Double(1.25));
}

#[test]
fn feature_export_with_semicolon_separator_is_sniffed() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "features.csv",
        concat!(
            "#FEATURE;rt;mz;intensity;charge;quality\n",
            "FEATURE;88.1;345.67;51000;2;0.95\n",
            "FEATURE;92.4;345.70;4200;2;0.40\n",
        ),
    );

    let table = read_file(TextExportKind::Feature, &path).expect("read features");
    assert_eq!(table.len(), 2);
    let cells = table.rows()[0].cells();
    assert_eq!(cells[0], Cell::Double(88.1));
    assert_eq!(cells[2], Cell::Double(51000.0));
    assert_eq!(cells[3], Cell::Double(2.0));
}

#[test]
fn peptide_lines_of_a_consensus_file_read_as_their_own_table() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "consensus.txt",
        concat!(
            "#CONSENSUS\trt_cf\tmz_cf\n",
            "#PEPTIDE\trt\tmz\tscore\trank\tsequence\tcharge\taa_before\taa_after\tscore_type\tsearch_identifier\taccessions\tstart\tend\n",
            "CONSENSUS\t300.5\t500.25\n",
            "PEPTIDE\t300.6\t500.2\t0.99\t1\tMKVLAAGK\t2\tK\tL\tq-value\trun0\tsp|P02768\t10\t17\n",
            "CONSENSUS\t420.7\t600.5\n",
            "PEPTIDE\t420.8\t600.4\t0.80\t1\tAAGKLER\t3\tR\tA\tq-value\trun0\tsp|P00330\t4\t10\n",
        ),
    );

    let table = read_file(TextExportKind::Peptides, &path).expect("read peptides");
    assert_eq!(table.schema().len(), 13);
    assert_eq!(table.schema().headers()[0], "peptide_rt");
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].cells()[4], Cell::String("MKVLAAGK".into()));
    assert_eq!(table.rows()[1].cells()[5], Cell::Integer(3));
}

#[test]
fn latin1_input_decodes_through_the_encoding_option() {
    let workspace = TestWorkspace::new();
    let mut contents = Vec::new();
    contents.extend_from_slice(
        b"#rt\tmz\tscore\trank\tsequence\tcharge\taa_before\taa_after\tscore_type\tsearch_identifier\taccessions\tstart\tend\n",
    );
    contents.extend_from_slice(b"1.5\t500.2\t0.99\t1\tprot\xE9ine\t2\tK\tL\tq-value\trun0\tsp|P1\t10\t17\n");
    let path = workspace.write_bytes("peptides_latin1.tsv", &contents);

    let encoding = io_utils::resolve_encoding(Some("latin1")).expect("encoding label");
    let reader = io_utils::open_text_reader(&path, encoding).expect("open reader");
    let table =
        read_text_export(TextExportKind::Peptides, reader, &CancelToken::new()).expect("read");
    assert_eq!(table.rows()[0].cells()[4], Cell::String("protéine".into()));
}

#[test]
fn feature_file_without_its_header_fails_with_context() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("broken.txt", "#MAP id filename\nFEATURE 1.0 2.0\n");
    let err = read_file(TextExportKind::Feature, &path).unwrap_err();
    assert!(err.to_string().contains("#FEATURE"));
}
