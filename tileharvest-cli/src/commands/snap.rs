//! Snap command - show the tile-aligned square a region snaps to.

use tileharvest::region::snap;

use super::common::{resolve_zoom, RegionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the snap command.
pub struct SnapArgs {
    pub region: RegionArgs,
    pub zoom: Option<u8>,
}

/// Run the snap command.
pub fn run(args: SnapArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("snap");

    let zoom = resolve_zoom(args.zoom, runner.config())?;
    let region = args.region.to_region()?;
    let snapped = snap(&region.bounds(), zoom)?;
    let corners = snapped.tile_corners();

    println!("Selection:  {}", region.bounds());
    println!("Zoom:       {}", zoom);
    println!();
    println!(
        "Tile edges: x {}..{}, y {}..{} ({}x{} tiles)",
        corners.northwest.x,
        corners.northeast.x,
        corners.northwest.y,
        corners.southwest.y,
        snapped.size(),
        snapped.size()
    );
    println!("Northwest:  {}", snapped.northwest());
    println!("Northeast:  {}", snapped.northeast());
    println!("Southwest:  {}", snapped.southwest());
    println!("Southeast:  {}", snapped.southeast());
    println!("Bounds:     {}", snapped.bounds());
    println!("Center:     {}", snapped.bounds().center());

    Ok(())
}
