use anyhow::{Context, Result};
use chrono::Local;
use std::env;
use std::fs;

use ancc_workbench::{bilan_from_extract, load_extract, Session, TAX_RATE, VERSION};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("demo") => run_demo(),
        Some("report") => {
            let path = args.get(2).context("Usage: ancc-workbench report <save.json>")?;
            run_report(path)
        }
        Some("extract") => {
            let path = args.get(2).context("Usage: ancc-workbench extract <extract.csv> [out.json]")?;
            run_extract(path, args.get(3).map(String::as_str))
        }
        Some("export") => run_export(args.get(2).map(String::as_str)),
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("ancc-workbench {}", VERSION);
            eprintln!("Usage: ancc-workbench [demo | report <save.json> | extract <extract.csv> [out.json] | export [out.json]]");
            std::process::exit(2);
        }
    }
}

/// Seeded session with a few worked revaluations, then the synthesis report.
fn run_demo() -> Result<()> {
    let mut session = Session::new();

    session.set_adjustment("terrains", Some(310_000.0), "Expertise immobilière", true);
    session.set_adjustment("fonds-commerce", Some(150_000.0), "Valorisation par multiple d'EBE", true);
    session.set_adjustment("stocks", Some(88_000.0), "Dépréciation rotation lente", false);
    session.set_adjustment("ifc", Some(25_000.0), "Engagement retraites non provisionné", false);

    print_report(&session);
    Ok(())
}

/// Load a save document and print its synthesis.
fn run_report(path: &str) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read save file: {}", path))?;

    let mut session = Session::empty();
    session
        .restore_json(&text)
        .with_context(|| format!("Rejected save file: {}", path))?;

    print_report(&session);
    Ok(())
}

/// Build a balance sheet from a CSV ledger extract, print the synthesis,
/// optionally write the save document.
fn run_extract(path: &str, out: Option<&str>) -> Result<()> {
    let rows = load_extract(path)?;
    println!("📂 Loaded {} extract rows from {}", rows.len(), path);

    let session = Session::with_bilan(bilan_from_extract(&rows));
    print_report(&session);

    if let Some(out_path) = out {
        fs::write(out_path, session.export_json())
            .with_context(|| format!("Failed to write save file: {}", out_path))?;
        println!("💾 Saved session to {}", out_path);
    }
    Ok(())
}

/// Write the seed session's save document to a file, or to stdout when no
/// path is given.
fn run_export(out: Option<&str>) -> Result<()> {
    let session = Session::new();
    let json = session.export_json();

    match out {
        Some(out_path) => {
            fs::write(out_path, json)
                .with_context(|| format!("Failed to write save file: {}", out_path))?;
            println!("💾 Saved session to {}", out_path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_report(session: &Session) {
    let results = session.results();

    println!("\n📊 Synthèse ANCC — {}", Local::now().format("%Y-%m-%d"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Postes au bilan           {:>14}", session.bilan().len());
    println!("Total actif               {:>14.2}", results.total_asset);
    println!("Total passif              {:>14.2}", results.total_liability);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("ANC (capitaux propres)    {:>14.2}", results.anc);
    println!("Plus-values               {:>14.2}", results.total_gains);
    println!("Moins-values              {:>14.2}", results.total_losses);
    println!("Retraitement net          {:>14.2}", results.net_adjustment);
    println!("Impôt différé ({:.0}%)      {:>14.2}", TAX_RATE * 100.0, results.deferred_tax);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("ANCC                      {:>14.2}", results.corrected_net_worth);
    println!("Avancement des retraitements : {}%", session.completeness());
}
