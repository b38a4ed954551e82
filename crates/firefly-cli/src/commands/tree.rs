//! Tree command

use anyhow::{Context, Result};
use firefly_core::SceneRng;
use firefly_tree::{Tree, TreeConfig};

pub fn run(seed: Option<u64>, depth: Option<u32>, format: &str) -> Result<()> {
    let mut config = TreeConfig::default();
    if let Some(depth) = depth {
        config.depth = depth;
    }
    let mut rng = match seed {
        Some(seed) => SceneRng::seeded(seed),
        None => SceneRng::from_entropy(),
    };
    let tree = Tree::generate(&config, &mut rng).context("Failed to generate tree")?;

    let bounds = tree.bounding_box();
    // Branch depth counts down toward the leaves
    let levels = tree
        .branches()
        .iter()
        .map(|b| config.depth + 1 - b.depth)
        .max()
        .unwrap_or(0);
    let spawn_points = tree.spawn_points();

    match format {
        "json" => {
            let report = serde_json::json!({
                "depth": config.depth,
                "branches": tree.branches().len(),
                "levels": levels,
                "spawn_points": spawn_points.len(),
                "bounds_min": bounds.min.to_array(),
                "bounds_max": bounds.max.to_array(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "text" => {
            println!("Tree (depth {}):", config.depth);
            println!("  Branches:     {}", tree.branches().len());
            println!("  Levels:       {}", levels);
            println!("  Spawn points: {}", spawn_points.len());
            println!(
                "  Bounds:       ({:.1}, {:.1}, {:.1}) .. ({:.1}, {:.1}, {:.1})",
                bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
            );
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }

    Ok(())
}
