use argh::FromArgs;
use std::path::PathBuf;

use elevest::{
    io::write_pairwise_matches, k3d::camera::default_camera_matrix, synthetic::SyntheticScene,
};

#[derive(FromArgs)]
/// Generate matches for a known elevation and estimate it back
struct Args {
    /// ground-truth elevation in degrees
    #[argh(option, short = 'e', default = "60.0")]
    elevation: f64,

    /// number of 3D points in the scene
    #[argh(option, short = 'n', default = "100")]
    num_points: usize,

    /// maximum absolute pixel noise per axis
    #[argh(option, default = "0.0")]
    noise: f64,

    /// random seed
    #[argh(option, short = 's', default = "0")]
    seed: u64,

    /// optional path to save the generated matches as JSON
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let scene = SyntheticScene {
        elevation_deg: args.elevation,
        num_points: args.num_points,
        pixel_noise: args.noise,
        seed: args.seed,
        ..Default::default()
    };

    let k = default_camera_matrix();
    let matches = scene.pairwise_matches(&k)?;

    if let Some(path) = args.output {
        write_pairwise_matches(&path, &matches)?;
        println!("Matches written to {}", path.display());
    }

    let elevation = elevest::estimate_elevation(&matches, 30.0, 150.0, Some(k))?;
    println!(
        "Ground truth: {} degrees, estimated: {elevation} degrees",
        args.elevation
    );

    Ok(())
}
