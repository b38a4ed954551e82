//! Simulate command

use anyhow::{Context, Result};
use firefly_core::{ElementKey, LayoutNode, LayoutSnapshot, RecordingSink, ScreenRect, Viewport};
use firefly_runtime::{FrameClock, PointerEvent, Scene, SceneConfig};

pub struct SimulateArgs {
    pub config: Option<String>,
    pub layout: Option<String>,
    pub frames: u32,
    pub dt: f32,
    pub seed: Option<u64>,
    pub pointer: Option<[f32; 2]>,
    pub format: String,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    if args.format != "text" && args.format != "json" {
        anyhow::bail!("Unknown format: {}", args.format);
    }

    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path).with_context(|| format!("Failed to load config {}", path))?,
        None => SceneConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let layout = match &args.layout {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read layout {}", path))?;
            LayoutSnapshot::from_toml_str(&text).context("Failed to parse layout")?
        }
        None => demo_layout(),
    };

    let mut scene = Scene::new(config, &layout).context("Failed to build scene")?;
    if let Some([x, y]) = args.pointer {
        scene.handle_pointer(&PointerEvent::Move { x, y });
    }

    let mut sink = RecordingSink::new();
    step_frames(&mut scene, &layout, args.frames, args.dt, &mut sink);
    let stats = scene.stats();
    log::debug!("Sink received {} element writes", sink.writes());

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let p = &stats.particles;
    println!("Simulated {} frames ({:.2}s)", stats.frames, stats.elapsed);
    println!("  Fireflies:       {}", p.count);
    println!("  Bursting:        {}", p.bursting);
    println!("  Avoiding UI:     {}", p.avoiding);
    println!(
        "  Intensity:       min {:.2} / mean {:.2} / max {:.2}",
        p.min_intensity, p.mean_intensity, p.max_intensity
    );
    println!(
        "  Bounds:          ({:.1}, {:.1}, {:.1}) .. ({:.1}, {:.1}, {:.1})",
        p.bounds_min[0], p.bounds_min[1], p.bounds_min[2], p.bounds_max[0], p.bounds_max[1], p.bounds_max[2]
    );
    println!("  UI boundaries:   {}", stats.boundaries);
    println!("  Follow elements: {}", stats.follow_elements);
    println!(
        "  Swirls:          {} active, {} particles",
        stats.active_swirls, stats.swirl_particles
    );

    Ok(())
}

/// Run `frames` frames of `dt` seconds each through a frame clock, so
/// oversized steps are clamped the same way a stalled live loop would be
fn step_frames(scene: &mut Scene, layout: &LayoutSnapshot, frames: u32, dt: f32, sink: &mut RecordingSink) {
    let mut clock = FrameClock::new();
    for _ in 0..frames {
        let dt = clock.advance(dt as f64);
        scene.frame(dt, layout, sink);
    }
    log::debug!("Clock advanced {:.3}s over {} frames", clock.total_time, clock.frames());
}

/// A concert-poster page at 1920x1080, used when no layout file is given
pub fn demo_layout() -> LayoutSnapshot {
    let mut layout = LayoutSnapshot::new(Viewport::new(1920.0, 1080.0));
    add_text(&mut layout, "venue", "venue-name", "The Old Barn", ScreenRect::new(660.0, 120.0, 600.0, 90.0));
    add_text(&mut layout, "band-1", "band-name", "Glowworms", ScreenRect::new(760.0, 420.0, 400.0, 60.0));
    add_text(&mut layout, "band-2", "band-name", "Night Owls", ScreenRect::new(760.0, 500.0, 400.0, 60.0));
    add_text(&mut layout, "date", "date-display", "June 21", ScreenRect::new(810.0, 700.0, 300.0, 50.0));
    layout.insert(LayoutNode::new("tagline", ScreenRect::new(610.0, 880.0, 700.0, 40.0)).with_class("tagline"));
    layout
}

/// An element plus one node per non-space letter, laid out left to right
fn add_text(layout: &mut LayoutSnapshot, key: &str, class: &str, text: &str, rect: ScreenRect) {
    let count = text.chars().count().max(1);
    let step = rect.width / count as f32;
    let mut letters = Vec::new();
    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        let letter = ElementKey::new(format!("{key}-{i}"));
        let tint = if i % 2 == 0 { "coral" } else { "yellow" };
        layout.insert(
            LayoutNode::new(letter.as_str(), ScreenRect::new(rect.left + step * i as f32, rect.top, step, rect.height))
                .with_class(tint),
        );
        letters.push(letter);
    }
    layout.insert(LayoutNode::new(key, rect).with_class(class).with_letters(letters));
}

#[cfg(test)]
mod tests {
    use super::*;
    use firefly_core::Selector;

    #[test]
    fn test_demo_layout_has_letters_and_classes() {
        let layout = demo_layout();
        let band = layout.get(&"band-1".into()).unwrap();
        assert_eq!(band.letters.len(), 9);
        assert!(layout.get(&band.letters[0]).unwrap().has_class("coral"));
        let bands = Selector::parse(".band-name").unwrap();
        assert_eq!(layout.select(&bands).count(), 2);
    }

    #[test]
    fn test_demo_layout_survives_toml() {
        let layout = demo_layout();
        let text = toml::to_string(&layout).unwrap();
        assert_eq!(LayoutSnapshot::from_toml_str(&text).unwrap(), layout);
    }

    #[test]
    fn test_simulate_with_defaults() {
        run(SimulateArgs {
            config: None,
            layout: None,
            frames: 30,
            dt: 1.0 / 60.0,
            seed: Some(1),
            pointer: Some([960.0, 450.0]),
            format: "json".into(),
        })
        .unwrap();
    }

    #[test]
    fn test_oversized_steps_are_clamped() {
        let layout = demo_layout();
        let config = SceneConfig {
            seed: Some(3),
            ..Default::default()
        };
        let mut scene = Scene::new(config, &layout).unwrap();
        let mut sink = RecordingSink::new();
        step_frames(&mut scene, &layout, 4, 2.0, &mut sink);
        let stats = scene.stats();
        assert_eq!(stats.frames, 4);
        assert!((stats.elapsed - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = run(SimulateArgs {
            config: None,
            layout: None,
            frames: 1,
            dt: 1.0 / 60.0,
            seed: Some(1),
            pointer: None,
            format: "yaml".into(),
        });
        assert!(err.is_err());
    }
}
