//! Sources command - list built-in tile sources.

use tileharvest::sources::PRESETS;

/// Run the sources command.
pub fn run() {
    let width = PRESETS.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for source in PRESETS {
        println!("{:width$}  {}", source.name, source.template, width = width);
    }
}
