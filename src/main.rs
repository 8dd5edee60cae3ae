use anyhow::Result;
use std::env;
use std::path::Path;

use covid_disparity::{ModelConfig, PreprocessingSystem, SuperRegion};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // Optional argument: path to a JSON config file.
    let config = if args.len() > 1 {
        ModelConfig::from_file(Path::new(&args[1]))?
    } else {
        ModelConfig::toronto()
    };

    run_model(&config)
}

fn run_model(config: &ModelConfig) -> Result<()> {
    println!("🦠 Regional Covid Disparity Model");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "   Case window: {} to {}",
        config.start_date, config.end_date
    );

    println!("\n📂 Loading region and case data...");
    let mut system = PreprocessingSystem::new();
    let region = system.init_model(config)?;
    println!(
        "✓ Assembled '{}': {} sub regions, {} accepted cases",
        region.name,
        region.sub_region_count(),
        region.total_case_count()
    );

    print_scaling(region);
    print_regression(region);

    Ok(())
}

fn print_scaling(region: &SuperRegion) {
    println!("\n📏 Scaled indices");
    println!(
        "   Income bounds: {:.0} to {:.0} (multiplier {:.5})",
        region.economic_bounds.min, region.economic_bounds.max, region.economic_bounds.multiplier
    );
    println!(
        "   Case rate bounds: {:.1} to {:.1} per 100,000 (multiplier {:.5})",
        region.case_bounds.min, region.case_bounds.max, region.case_bounds.multiplier
    );

    for sub_region in region.sub_regions() {
        println!(
            "   {:<32} economic {:>5.2}   cases {:>5.2}",
            sub_region.name, sub_region.scaled_economic_index, sub_region.scaled_case_index
        );
    }
}

fn print_regression(region: &SuperRegion) {
    let Some(model) = &region.regression_model else {
        return;
    };

    println!("\n📈 Fitted curve: y = {:.4} * {:.4}^x", model.a, model.b);
    println!(
        "   Log-space slope {:.4}, intercept {:.4}, residual sum {:.4}",
        model.slope, model.intercept, model.residual_sum_of_squares
    );
    println!(
        "   {} training points, {} kept for the log fit, {} angle samples",
        model.coordinates().len(),
        model.log_coordinates.len(),
        2 * model.angle_divisor()
    );
}
