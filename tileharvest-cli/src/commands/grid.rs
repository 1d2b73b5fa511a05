//! Grid command - list the tiles covering a region.

use tileharvest::grid::GridBuilder;
use tileharvest::region::snap;
use tileharvest::sources::{qualify_url, resolve_source};

use super::common::{resolve_zoom, RegionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the grid command.
pub struct GridArgs {
    pub region: RegionArgs,
    pub zoom: Option<u8>,
    /// Build the grid over the snapped square instead of the raw selection
    pub snap: bool,
    /// Preset name or template; prints each tile's source URL when set
    pub source: Option<String>,
}

/// Run the grid command.
pub fn run(args: GridArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("grid");

    let zoom = resolve_zoom(args.zoom, runner.config())?;
    let mut region = args.region.to_region()?;
    if args.snap {
        region = snap(&region.bounds(), zoom)?.to_region();
    }

    let builder = GridBuilder::new(zoom).map_err(|e| CliError::Config(e.to_string()))?;
    let cells = builder.build(&region);
    let template = args.source.as_deref().map(resolve_source);

    for cell in &cells {
        let coord = cell.coord;
        match &template {
            Some(template) => println!(
                "{}/{}/{}\t{}\t{}",
                coord.z,
                coord.x,
                coord.y,
                coord.quadkey(),
                qualify_url(template, &coord)
            ),
            None => println!("{}/{}/{}\t{}", coord.z, coord.x, coord.y, coord.quadkey()),
        }
    }

    eprintln!(
        "{} of {} candidate tiles intersect the region",
        cells.len(),
        builder.candidate_count(&region)
    );
    Ok(())
}
