use crate::Target;
use crate::session::Session;
use declscope_api::QualifiedName;
use declscope_core::{DiagnosticReport, ExistenceProbe};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Unit")]
    name: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Physical")]
    physical: bool,
    #[tabled(rename = "Stamp")]
    stamp: u64,
}

pub fn run(target: &Target, package: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(&target.manifest, &target.module)?;
    let package = QualifiedName::parse(package)?;

    // Resolve first so the cached entry reflects a real lookup.
    let resolved = session.factory.provider_for_package(&package)?.is_some();
    let report = session.factory.report(&package);

    if json {
        let out = serde_json::json!({
            "resolved": resolved,
            "creation": session.factory.creation_report(),
            "failure": report,
            "cache": session.cache.stats(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    render(&report, resolved);
    let stats = session.cache.stats();
    println!();
    println!(
        "Cache:       {} hits, {} misses, {} recomputations ({} of {} modules cached)",
        stats.hits,
        stats.misses,
        stats.recomputations,
        stats.cached_modules,
        session.cache.config().max_modules
    );
    Ok(())
}

fn render(report: &DiagnosticReport, resolved: bool) {
    let package = report
        .failing_package
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_default();

    println!("Package:     {}", package);
    println!("Module:      {}", report.module);
    println!("Resolves:    {}", if resolved { "yes" } else { "no" });
    println!("Scope:       {}", report.scope);
    println!("Tracker:     {}", report.tracker_value);
    match report.cached_tag {
        Some(tag) => println!("Cached tag:  {}", tag),
        None => println!("Cached tag:  (none)"),
    }
    match report.cached_existence {
        Some(cached) => println!("Cached:      {}", cached),
        None => println!("Cached:      (no entry)"),
    }
    match &report.fresh_existence {
        Some(ExistenceProbe::Exists(fresh)) => println!("Fresh:       {}", fresh),
        Some(ExistenceProbe::Unavailable(reason)) => println!("Fresh:       unavailable ({})", reason),
        None => {}
    }
    if let Some(in_units) = report.package_in_source_units {
        println!("In units:    {}", in_units);
    }
    if report.is_stale_cache() {
        println!("Verdict:     cached entry is stale");
    }

    if report.source_units.is_empty() {
        println!("No source units.");
        return;
    }
    let rows: Vec<UnitRow> = report
        .source_units
        .iter()
        .map(|u| UnitRow {
            name: u.display_name.clone(),
            package: u.package.to_string(),
            physical: u.is_physical,
            stamp: u.modification_stamp,
        })
        .collect();
    println!("{}", Table::new(rows));
}
