mod common;

use std::fs;
use std::fs::File;
use std::io::BufReader;

use mstab::cancel::CancelToken;
use mstab::cli::OutputFormat;
use mstab::data::Cell;
use mstab::mztab::{SmallMoleculeOptions, read_mztab, read_small_molecules};
use mstab::sink;

use common::TestWorkspace;

const MZTAB_SAMPLE: &str = concat!(
    "MTD\tmzTab-version\t1.0.0\n",
    "MTD\tmzTab-mode\tSummary\n",
    "MTD\tdescription\tiTRAQ quantification\n",
    "\n",
    "PRH\taccession\tdescription\ttaxid\tspecies\tprotein_coverage\n",
    "PRT\tP02768\tSerum albumin\t9606\tHomo sapiens\t0.81\n",
    "PRT\tP00330\tAlcohol dehydrogenase\tnull\tnull\t-\n",
    "\n",
    "PEH\tsequence\taccession\tcharge\tretention_time\tunique\tpeptide_abundance_study_variable[1]\n",
    "PEP\tMKVLAAGK\tP02768\t2\t20.8|21.2\t1\t0.53\n",
    "\n",
    "PSH\tsequence\tPSM_ID\texp_mass_to_charge\tcalc_mass_to_charge\n",
    "PSM\tMKVLAAGK\t1\t443.76\t443.75\n",
);

#[test]
fn mztab_file_splits_into_section_tables() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("sample.mzTab", MZTAB_SAMPLE);

    let reader = BufReader::new(File::open(&path).expect("open input"));
    let tables = read_mztab(reader, &CancelToken::new()).expect("read mzTab");

    assert_eq!(tables.metadata.len(), 3);
    assert_eq!(tables.metadata.schema().headers(), ["fieldname", "value"]);

    assert_eq!(tables.proteins.len(), 2);
    let albumin = tables.proteins.rows()[0].cells();
    assert_eq!(albumin[2], Cell::Integer(9606));
    assert_eq!(albumin[4], Cell::Double(0.81));
    let adh = tables.proteins.rows()[1].cells();
    assert_eq!(adh[2], Cell::Missing("null".into()));
    assert_eq!(adh[4], Cell::Missing("-".into()));

    assert_eq!(tables.peptides.len(), 1);
    let peptide = tables.peptides.rows()[0].cells();
    assert_eq!(peptide[3], Cell::DoubleList(vec![20.8, 21.2]));
    assert_eq!(peptide[4], Cell::Boolean(true));
    assert_eq!(peptide[5], Cell::Double(0.53));

    assert_eq!(tables.psms.len(), 1);
    assert_eq!(tables.psms.rows()[0].cells()[2], Cell::Double(443.76));

    assert!(tables.small_molecules.is_empty());
    assert!(tables.small_molecules.schema().is_empty());
}

#[test]
fn section_tables_write_one_file_each() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sample.mzTab", MZTAB_SAMPLE);
    let out_dir = workspace.path().join("tables");

    let reader = BufReader::new(File::open(&input).expect("open input"));
    let tables = read_mztab(reader, &CancelToken::new()).expect("read mzTab");
    sink::write_mztab_tables(&tables, &out_dir, OutputFormat::Csv, b',').expect("write tables");

    let metadata = fs::read_to_string(out_dir.join("metadata.csv")).expect("read metadata.csv");
    assert!(metadata.starts_with("\"fieldname\",\"value\""));
    assert!(metadata.contains("\"mzTab-version\",\"1.0.0\""));

    let proteins = fs::read_to_string(out_dir.join("proteins.csv")).expect("read proteins.csv");
    assert!(proteins.contains("\"P02768\""));
    // Missing taxid and coverage render as empty fields; the string-typed
    // species column keeps its literal "null".
    assert!(proteins.contains("\"P00330\",\"Alcohol dehydrogenase\",\"\",\"null\",\"\""));

    for stem in ["peptides", "psms", "small_molecules"] {
        assert!(out_dir.join(format!("{stem}.csv")).exists());
    }
}

#[test]
fn small_molecule_file_reads_with_the_canonical_layout() {
    let names = [
        "identifier",
        "unit_id",
        "chemical_formula",
        "smiles",
        "inchi_key",
        "description",
        "mass_to_charge",
        "charge",
        "retention_time",
        "taxid",
        "species",
        "database",
        "database_version",
        "reliability",
        "uri",
        "spectra_ref",
        "search_engine",
        "search_engine_score",
        "modifications",
        "smallmolecule_abundance_sub[1]",
        "smallmolecule_abundance_stdev_sub[1]",
        "smallmolecule_abundance_std_error_sub[1]",
    ];
    let mut text = String::from("MTD\tmzTab-version\t1.0.0\n");
    text.push_str(&format!("SMH\t{}\n", names.join("\t")));
    text.push_str(
        "SML\tCHEBI:17234\tunit1\tC6H12O6\tOC1OC(CO)C(O)C(O)C1O\tWQZ\tGlucose\t180.0634\t1\t120.5\t9606\tHomo sapiens\tHMDB\t3.6\t2\tnull\tms_run[1]:scan=100\t[MS,MS:1001477,SpectraST,]\t0.92\t0\t0.25\t0.05\tNaN\n",
    );

    let workspace = TestWorkspace::new();
    let path = workspace.write("molecules.mzTab", &text);
    let reader = BufReader::new(File::open(&path).expect("open input"));
    let table = read_small_molecules(reader, &SmallMoleculeOptions::default(), &CancelToken::new())
        .expect("read small molecules");

    assert_eq!(table.schema().len(), 22);
    assert_eq!(table.len(), 1);
    let cells = table.rows()[0].cells();
    assert_eq!(cells[7], Cell::Integer(1));
    assert_eq!(cells[19], Cell::Double(0.25));
    assert_eq!(cells[21], Cell::Double(-1.0));
}
