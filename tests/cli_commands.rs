use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use jornada_manager::cli::{self, Cli};
use jornada_manager::{Document, OpenOutcome};
use tempfile::tempdir;

const SAMPLE: &str = r#"[
  {"proyecto": "J1", "fecha": "2024-02-03", "ubicacion": "Cádiz", "arbitro": "León",
   "estado": "Pendiente", "resultado": "", "descripcion": "Liga, jornada 1"},
  {"proyecto": "J2", "fecha": "2024-02-10", "ubicacion": "Huelva", "arbitro": "León",
   "estado": "Completado", "resultado": "3-0", "descripcion": "Liga"}
]"#;

/// Run the binary's entry point with a config path that does not exist, so
/// the user's own settings never leak into the test.
fn run(dir: &Path, args: &[&str]) -> Result<()> {
    let config = dir.join("missing.toml");
    let mut argv = vec!["jornadas", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    cli::run(Cli::parse_from(argv))
}

#[test]
fn export_then_import_reproduces_the_records() -> Result<()> {
    let dir = tempdir()?;
    let source = dir.path().join("liga.json");
    let csv = dir.path().join("liga.csv");
    let copy = dir.path().join("copia.json");
    fs::write(&source, SAMPLE)?;

    run(dir.path(), &["export-csv", source.to_str().unwrap(), "--out", csv.to_str().unwrap()])?;
    run(dir.path(), &["import-csv", csv.to_str().unwrap(), "--out", copy.to_str().unwrap()])?;

    let mut exported = Document::new();
    let mut imported = Document::new();
    assert!(matches!(exported.open(Some(&source)), OpenOutcome::Loaded { records: 2, .. }));
    assert!(matches!(imported.open(Some(&copy)), OpenOutcome::Loaded { records: 2, .. }));
    assert_eq!(imported.store().records(), exported.store().records());
    Ok(())
}

#[test]
fn check_and_list_accept_a_valid_file() -> Result<()> {
    let dir = tempdir()?;
    let source = dir.path().join("liga.json");
    fs::write(&source, SAMPLE)?;

    run(dir.path(), &["check", source.to_str().unwrap()])?;
    run(
        dir.path(),
        &["list", source.to_str().unwrap(), "--term", "huelva", "--sort", "fecha"],
    )?;
    Ok(())
}

#[test]
fn check_fails_on_a_broken_file() -> Result<()> {
    let dir = tempdir()?;
    let source = dir.path().join("roto.json");
    fs::write(&source, "[{\"proyecto\": \"J1\"}]")?;

    let err = run(dir.path(), &["check", source.to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().contains("missing fields"));
    Ok(())
}

#[test]
fn invalid_page_size_override_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let source = dir.path().join("liga.json");
    fs::write(&source, SAMPLE)?;

    assert!(run(dir.path(), &["--page-size", "0", "check", source.to_str().unwrap()]).is_err());
    Ok(())
}
