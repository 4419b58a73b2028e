use argh::FromArgs;
use std::path::PathBuf;

use elevest::{io::read_pairwise_matches, EstimatorConfig};

#[derive(FromArgs)]
/// Estimate the camera elevation from a JSON file of pairwise matches
struct Args {
    /// path to the JSON match file
    #[argh(option, short = 'm')]
    matches: PathBuf,

    /// path to a JSON estimator configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// lower bound of the search in degrees
    #[argh(option)]
    min_elev: Option<f64>,

    /// upper bound of the search in degrees, exclusive
    #[argh(option)]
    max_elev: Option<f64>,

    /// evaluate the candidate elevations in parallel
    #[argh(switch, short = 'p')]
    parallel: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match args.config {
        Some(path) => EstimatorConfig::from_json_file(path)?,
        None => EstimatorConfig::default(),
    };
    if let Some(min_elevation) = args.min_elev {
        config.min_elevation = min_elevation;
    }
    if let Some(max_elevation) = args.max_elev {
        config.max_elevation = max_elevation;
    }
    config.search.parallel |= args.parallel;

    let matches = read_pairwise_matches(&args.matches)?;
    for ((view_a, view_b), table) in matches.iter() {
        log::info!("views {view_a}-{view_b}: {} matches", table.len());
    }

    let elevation = elevest::estimate_elevation_with_config(&matches, &config)?;
    println!("Estimated elevation: {elevation} degrees");

    Ok(())
}
