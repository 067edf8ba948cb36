use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use rstest::rstest;
use s6map_flow::{FlowConfig, FlowError, run};
use s6map_netlist::{SymbolStore, SymbolTag};
use tempfile::TempDir;

struct Design {
    name: &'static str,
    source: &'static str,
    /// Cells expected in the EDIF external library.
    cells: &'static [&'static str],
}

lazy_static! {
    static ref DESIGNS: Vec<Design> = vec![
        Design {
            name: "inverter",
            source: "module inverter;\ninput a;\noutput y;\ny = ~a;\n",
            cells: &["IBUF", "OBUF", "LUT1"],
        },
        Design {
            name: "majority",
            source: "# 2-of-3 vote\nmodule majority;\ninput a, b, c;\noutput y;\ny = (a & b) | (a & c) | (b & c);\n",
            cells: &["IBUF", "OBUF", "LUT3"],
        },
        Design {
            name: "tied",
            source: "module tied;\noutput hi, lo;\nhi = 1;\nlo = 0;\n",
            cells: &["OBUF", "VCC", "GND"],
        },
    ];
}

fn write_input(dir: &Path, design: &Design) -> std::path::PathBuf {
    let path = dir.join(format!("{}.s6", design.name));
    fs::write(&path, design.source).expect("write input");
    path
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
fn writes_netlist_and_symbols(#[case] index: usize) {
    let design = &DESIGNS[index];
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), design);
    let edif = dir.path().join("out.edf");
    let sym = dir.path().join("out.sym");

    run(&input, &edif, &sym, &FlowConfig::default()).expect("run succeeds");

    let text = fs::read_to_string(&edif).expect("netlist written");
    assert!(text.starts_with(&format!("(edif {}\n", design.name)));
    assert!(text.contains("(property PART (string \"xc6slx45-fgg484-2\") (owner \"Xilinx\"))"));
    for cell in design.cells {
        assert!(text.contains(&format!("(cell {cell} (cellType GENERIC)")), "missing {cell}");
    }

    let symbols = SymbolStore::parse(&fs::read_to_string(&sym).expect("symbols written")).expect("well formed");
    for (_, signal) in s6map_ir::parse(design.source).expect("parses").iter() {
        let symbol = symbols.lookup(&signal.name, SymbolTag::Net).expect("signal has a net symbol");
        assert!(text.contains(&format!("N{}", symbol.uid())));
    }
}

#[test]
fn part_comes_from_config() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), &DESIGNS[0]);
    let edif = dir.path().join("out.edf");
    let sym = dir.path().join("out.sym");
    let config = FlowConfig::builder().part("xc6slx9-tqg144-2").build();

    run(&input, &edif, &sym, &config).expect("run succeeds");

    let text = fs::read_to_string(&edif).expect("netlist written");
    assert!(text.contains("(string \"xc6slx9-tqg144-2\")"));
}

#[test]
fn missing_input_is_a_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    let result = run(
        dir.path().join("absent.s6"),
        dir.path().join("out.edf"),
        dir.path().join("out.sym"),
        &FlowConfig::default(),
    );
    assert!(matches!(result, Err(FlowError::Parse(_))));
}

#[test]
fn unwritable_output_names_the_path() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), &DESIGNS[0]);
    let edif = dir.path().join("no_such_dir").join("out.edf");
    let result = run(&input, &edif, dir.path().join("out.sym"), &FlowConfig::default());
    assert!(matches!(result, Err(FlowError::Io { ref path, .. }) if *path == edif));
}

#[test]
fn config_file_is_loaded() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("s6map.json");
    fs::write(&path, r#"{"part": "xc6slx16-csg324-3", "mapper_options": {"order": "reverse"}}"#).expect("write config");
    let config = FlowConfig::from_json_file(&path).expect("valid config");
    assert_eq!(config.part, "xc6slx16-csg324-3");
    assert_eq!(config.mapper_options.get("order").map(String::as_str), Some("reverse"));
}
