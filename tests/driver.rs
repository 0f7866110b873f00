use std::fs;
use std::path::{Path, PathBuf};

use hack_asm::driver::{self, DriverConfig, DriverError};
use hack_asm::{AsmError, MnemonicMap};
use pretty_assertions::assert_eq;

struct Scratch(PathBuf);

impl Scratch {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("hack-asm-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        Scratch(dir)
    }

    fn write(&self, name: &str, text: &str) -> PathBuf {
        let p = self.0.join(name);
        fs::write(&p, text).unwrap();
        p
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn map() -> MnemonicMap {
    MnemonicMap::hack().unwrap()
}

fn read(p: &Path) -> String {
    fs::read_to_string(p).unwrap()
}

#[test]
fn single_file_writes_hack_sibling() {
    let s = Scratch::new("single");
    let src = s.write("Add.asm", "@2\nD=A\n@3\nD=D+A\n@0\nM=D\n");
    let report = driver::run(Some(src.as_path()), &map(), &DriverConfig::default()).unwrap();
    let out = s.0.join("Add.hack");
    assert_eq!(report.translated, vec![out.clone()]);
    assert_eq!(
        read(&out),
        "0000000000000010\n1110110000010000\n0000000000000011\n1110000010010000\n0000000000000000\n1110001100001000\n"
    );
    assert!(!s.0.join("Add.symbols.json").exists());
}

#[test]
fn directory_translates_each_file_independently() {
    let s = Scratch::new("batch");
    s.write("a.asm", "@x\nM=1\n");
    s.write("b.asm", "@y\n@x\nM=0\n");
    s.write("notes.txt", "@z\n");
    let report = driver::run(Some(s.0.as_path()), &map(), &DriverConfig::default()).unwrap();
    assert_eq!(report.translated, vec![s.0.join("a.hack"), s.0.join("b.hack")]);
    // fresh variable counter per file
    assert_eq!(read(&s.0.join("a.hack")), "0000000000010000\n1110111111001000\n");
    assert_eq!(
        read(&s.0.join("b.hack")),
        "0000000000010000\n0000000000010001\n1110101010001000\n"
    );
    assert!(!s.0.join("notes.hack").exists());
}

#[test]
fn wrong_suffix_and_empty_directory_are_invalid_input() {
    let s = Scratch::new("kind");
    let txt = s.write("prog.txt", "@1\n");
    let err = driver::run(Some(txt.as_path()), &map(), &DriverConfig::default()).unwrap_err();
    assert!(matches!(err, DriverError::InvalidInputKind { .. }));
    assert_eq!(err.exit_code(), 4);

    let err = driver::collect_inputs(Some(s.0.as_path())).unwrap_err();
    assert!(matches!(err, DriverError::InvalidInputKind { .. }));
}

#[test]
fn missing_path() {
    let err = driver::collect_inputs(None).unwrap_err();
    assert!(matches!(err, DriverError::MissingPath { path: None }));
    let s = Scratch::new("missing");
    let err = driver::collect_inputs(Some(s.0.join("gone.asm").as_path())).unwrap_err();
    assert!(matches!(err, DriverError::MissingPath { path: Some(_) }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn failed_translation_leaves_no_output() {
    let s = Scratch::new("partial");
    let src = s.write("Bad.asm", "@1\nD=A\n@40000\n");
    let err = driver::translate_file(&src, &map(), &DriverConfig::default()).unwrap_err();
    match &err {
        DriverError::Assemble { path, source } => {
            assert_eq!(path, &src);
            assert_eq!(source, &AsmError::AddressOutOfRange { line: 3, value: "40000".into() });
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 5);
    assert!(!s.0.join("Bad.hack").exists());
}

#[test]
fn batch_aborts_on_first_failure_by_default() {
    let s = Scratch::new("abort");
    s.write("a.asm", "D=Q\n");
    s.write("b.asm", "@1\n");
    let err = driver::run(Some(s.0.as_path()), &map(), &DriverConfig::default()).unwrap_err();
    assert_eq!(err.exit_code(), 6);
    assert!(!s.0.join("b.hack").exists());
}

#[test]
fn keep_going_translates_the_rest() {
    let s = Scratch::new("keep");
    s.write("a.asm", "D=Q\n");
    s.write("b.asm", "@1\n");
    let cfg = DriverConfig { keep_going: true, ..DriverConfig::default() };
    let report = driver::run(Some(s.0.as_path()), &map(), &cfg).unwrap();
    assert_eq!(report.translated, vec![s.0.join("b.hack")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].exit_code(), 6);
    assert_eq!(report.exit_code(), Some(6));
    assert!(!s.0.join("a.hack").exists());
}

#[test]
fn emit_symbols_writes_json() {
    let s = Scratch::new("symbols");
    let src = s.write("Loop.asm", "(LOOP)\n@count\nM=M+1\n@LOOP\n0;JMP\n");
    let cfg = DriverConfig { emit_symbols: true, ..DriverConfig::default() };
    driver::translate_file(&src, &map(), &cfg).unwrap();
    let json: serde_json::Value = serde_json::from_str(&read(&s.0.join("Loop.symbols.json"))).unwrap();
    assert_eq!(json["LOOP"], 0);
    assert_eq!(json["count"], 16);
    assert_eq!(json["SCREEN"], 16384);
}

#[test]
fn map_file_override_and_errors() {
    let s = Scratch::new("map");
    let good = s.write("tiny.map", "0 <comp> 0101010\nnull <dest> 000\nnull <jmp> 000\nJMP <jmp> 111\n");
    let m = driver::load_map(Some(good.as_path())).unwrap();
    assert_eq!(m.lookup(hack_asm::Field::Jump, "JMP"), Some(0b111));

    let bad = s.write("bad.map", "0 <comp> 01\n");
    let err = driver::load_map(Some(bad.as_path())).unwrap_err();
    assert!(matches!(err, DriverError::InvalidMap { .. }));
    assert_eq!(err.exit_code(), 8);

    let err = driver::load_map(Some(s.0.join("absent.map").as_path())).unwrap_err();
    assert_eq!(err.exit_code(), 9);
}
