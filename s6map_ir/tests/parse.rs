use std::io::Write;

use rstest::rstest;
use s6map_ir::{Expr, ParseError, Purity, SignalKind, parse, parse_file};

const COUNTER: &str = "
# two-bit toggle with a combinational output
module toggle;
input clk, en;
output q0, led;
signal t;

t = q0 ^ en;
q0 = fd(clk, t);
led = mux(en, 0, q0);   # gated
";

#[test]
fn parses_declarations_in_order() {
    let module = parse(COUNTER).expect("valid module");
    assert_eq!(module.name(), "toggle");
    let signals: Vec<(&str, SignalKind)> = module.iter().map(|(_, s)| (s.name.as_str(), s.kind)).collect();
    assert_eq!(
        signals,
        vec![
            ("clk", SignalKind::Input),
            ("en", SignalKind::Input),
            ("q0", SignalKind::Output),
            ("led", SignalKind::Output),
            ("t", SignalKind::Internal),
        ]
    );
}

#[test]
fn flip_flop_clock_is_a_signal_reference() {
    let module = parse(COUNTER).expect("valid module");
    let q0 = module.find("q0").expect("q0 declared");
    let clk = module.find("clk").expect("clk declared");
    let ff = module
        .signal(q0)
        .source
        .as_ref()
        .and_then(Expr::as_flip_flop)
        .expect("q0 is registered");
    assert_eq!(*ff.clock, Expr::Signal(clk));
}

#[test]
fn purity_of_parsed_drivers() {
    let module = parse(COUNTER).expect("valid module");
    let purity = |name: &str| {
        let id = module.find(name).expect("declared");
        Purity::of(module.signal(id).source.as_ref())
    };
    assert_eq!(purity("clk"), Purity::Empty);
    assert_eq!(purity("t"), Purity::Bdd);
    assert_eq!(purity("q0"), Purity::Impure);
    assert_eq!(purity("led"), Purity::Bdd);
}

#[rstest]
#[case("module m; output y; y = x;", "not declared")]
#[case("module m; input a; signal a;", "declared twice")]
#[case("module m; input a; output y; y = a; y = ~a;", "assigned twice")]
#[case("module m; input a; a = 1;", "cannot be assigned")]
#[case("module m; output y; y = (1;", "syntax error")]
#[case("modul m;", "syntax error")]
fn rejects_malformed_modules(#[case] source: &str, #[case] message: &str) {
    let err = parse(source).expect_err("module should be rejected");
    assert!(err.to_string().contains(message), "unexpected error: {err}");
}

#[test]
fn reads_files() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(COUNTER.as_bytes()).expect("write");
    let module = parse_file(file.path()).expect("valid module");
    assert_eq!(module.len(), 5);

    let missing = parse_file(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(ParseError::Io { .. })));
}
