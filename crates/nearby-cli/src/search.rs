//! `search` and `references` command handlers.

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use anyhow::Context;
use nearby_core::{AppConfig, FacilityId, GeoIndex, ReferenceSet, SearchParameters};
use nearby_engine::{
    export_file_name, write_csv, RankingMode, RefinementState, ResolveOptions, RoadDistance,
    SelectionController,
};
use nearby_routing::OsrmClient;

use crate::SearchArgs;

fn load_references(config: &AppConfig) -> anyhow::Result<ReferenceSet> {
    nearby_core::load_references(&config.references_path, &config.reference_id_column)
        .context("failed to load reference points")
}

pub(crate) fn list_references(config: &AppConfig) -> anyhow::Result<()> {
    let references = load_references(config)?;
    for reference in references.iter() {
        println!(
            "{}\t{:.5}, {:.5}",
            reference.name,
            reference.point.lat(),
            reference.point.lon()
        );
    }
    Ok(())
}

pub(crate) async fn run_search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let facilities =
        nearby_core::load_facilities(&config.facilities_path, &config.facility_id_column)
            .context("failed to load facilities")?;
    let references = load_references(config)?;

    let mut controller = SelectionController::new(
        Arc::new(GeoIndex::new(facilities)),
        Arc::new(references),
        ResolveOptions::from(&config.routing),
    );

    let radius = args.radius.unwrap_or(config.default_radius_miles);
    let params = SearchParameters::new(args.reference.as_str(), radius)?;
    controller.on_search_parameters_changed(params)?;

    if args.driving {
        let router = OsrmClient::new(&config.routing).context("failed to build routing client")?;
        controller.trigger_resolution(&router).await;
    }

    if let Some(name) = args.select {
        if let Err(e) = controller.select(&FacilityId::new(name)) {
            tracing::warn!(error = %e, "selection ignored");
        }
    }

    print_results(&controller, &args.reference, radius);

    if let Some(dir) = args.export_dir {
        let today = chrono::Local::now().date_naive();
        let path = dir.join(export_file_name(&args.reference, radius, today));
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_csv(
            controller.current_result_set(),
            controller.ranking_mode(),
            BufWriter::new(file),
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        println!("exported to {}", path.display());
    }

    Ok(())
}

fn print_results(controller: &SelectionController, reference: &str, radius: f64) {
    let results = controller.current_result_set();
    println!(
        "Facilities within {radius} miles of {reference} ({})",
        results.len()
    );

    let road_mode = controller.ranking_mode() == RankingMode::Road;
    for (rank, row) in results.iter().enumerate() {
        let marker = if controller.active() == Some(row.id()) { "*" } else { " " };
        let road = match row.road {
            Some(RoadDistance::Resolved(miles)) => format!("{miles:>7.2} mi driving"),
            Some(RoadDistance::Unavailable) => "    n/a driving".to_string(),
            None => String::new(),
        };
        if road_mode {
            println!(
                "{marker}{:>3}. {:<40} {:>7.2} mi  {road}",
                rank + 1,
                row.id(),
                row.straight_line_miles
            );
        } else {
            println!(
                "{marker}{:>3}. {:<40} {:>7.2} mi",
                rank + 1,
                row.id(),
                row.straight_line_miles
            );
        }
    }

    match controller.refinement_state() {
        RefinementState::Pending => println!("(straight-line ranking; pass --driving for road distances)"),
        RefinementState::Complete => println!("(ranked by driving distance where available)"),
        RefinementState::NotAvailable => {}
    }
}
