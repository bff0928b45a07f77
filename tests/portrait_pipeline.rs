use std::time::Duration;

use glyphform::{
    Dimensions, Engine, EngineConfig, Glyph, TextPainter, TickOutcome, sampler,
};
use image::RgbaImage;

fn solid(value: u8) -> RgbaImage {
    RgbaImage::from_pixel(100, 60, image::Rgba([value, value, value, 255]))
}

fn config() -> EngineConfig {
    EngineConfig {
        dimensions: Dimensions::new(10, 6, 10.0).unwrap(),
        looping: false,
        responsive: false,
        ..EngineConfig::default()
    }
}

#[test]
fn white_source_yields_all_blank_target() {
    let engine = Engine::new(solid(255), config()).unwrap();
    let target = engine.target().unwrap();
    assert!(target.cells().iter().all(|g| *g == Glyph::BLANK));
}

#[test]
fn black_source_yields_all_darkest_target() {
    let engine = Engine::new(solid(0), config()).unwrap();
    let target = engine.target().unwrap();
    assert!(target.cells().iter().all(|g| *g == Glyph::DARKEST));
}

#[test]
fn black_source_reveals_to_all_at_signs() {
    let mut engine = Engine::new(solid(0), config()).unwrap();
    let mut painter = TextPainter::new();

    let mut now = Duration::ZERO;
    loop {
        let outcome = engine.tick(now, &mut painter).unwrap();
        if outcome == TickOutcome::Completed {
            break;
        }
        now += Duration::from_millis(16);
    }

    let frame = painter.last_frame().unwrap();
    assert_eq!(frame.lines().count(), 6);
    for line in frame.lines() {
        assert_eq!(line, "@@@@@@@@@@");
    }
}

#[test]
fn target_is_identical_across_repeated_samplings() {
    let img = RgbaImage::from_fn(97, 53, |x, y| {
        let v = ((x * 7 + y * 13) % 251) as u8;
        image::Rgba([v, v.wrapping_mul(3), v / 2, 255])
    });
    let a = sampler::sample_target(&img, 24, 18).unwrap();
    let b = sampler::sample_target(&img, 24, 18).unwrap();
    assert_eq!(a, b);

    // The same image through two engines gives the same target too.
    let cfg = EngineConfig {
        dimensions: Dimensions::new(24, 18, 10.0).unwrap(),
        responsive: false,
        ..EngineConfig::default()
    };
    let e1 = Engine::new(img.clone(), cfg.clone()).unwrap();
    let e2 = Engine::new(img, cfg).unwrap();
    assert_eq!(e1.target(), e2.target());
}

#[test]
fn identical_seeds_paint_identical_runs() {
    let img = RgbaImage::from_fn(64, 48, |x, y| {
        let v = ((x ^ y) * 5 % 256) as u8;
        image::Rgba([v, v, v, 255])
    });
    let cfg = EngineConfig {
        dimensions: Dimensions::new(12, 9, 10.0).unwrap(),
        looping: false,
        responsive: false,
        seed: 42,
        ..EngineConfig::default()
    };

    let mut frames_a = Vec::new();
    let mut frames_b = Vec::new();
    for frames in [&mut frames_a, &mut frames_b] {
        let mut engine = Engine::new(img.clone(), cfg.clone()).unwrap();
        let mut painter = TextPainter::new();
        let mut now = Duration::ZERO;
        loop {
            let outcome = engine.tick(now, &mut painter).unwrap();
            if matches!(outcome, TickOutcome::Painted | TickOutcome::Completed) {
                frames.push(painter.last_frame().unwrap().to_owned());
            }
            if outcome == TickOutcome::Completed {
                break;
            }
            now += Duration::from_millis(16);
        }
    }
    assert_eq!(frames_a, frames_b);
}

#[test]
fn dimension_change_is_a_full_reset() {
    let mut engine = Engine::new(solid(0), config()).unwrap();
    let mut painter = TextPainter::new();
    engine.tick(Duration::ZERO, &mut painter).unwrap();
    assert!(engine.is_animating());

    let new_dims = Dimensions::new(20, 12, 12.0).unwrap();
    engine.set_dimensions(new_dims).unwrap();
    assert!(!engine.is_animating());
    assert_eq!(engine.dimensions(), new_dims);

    let target = engine.target().unwrap();
    assert_eq!(target.width(), 20);
    assert_eq!(target.height(), 12);
    // Rebuilt current grid starts blank again.
    assert!(engine.current().unwrap().cells().iter().all(|g| g.is_blank()));
}

#[test]
fn responsive_container_width_rebuilds_grids() {
    let mut engine = Engine::new(
        solid(128),
        EngineConfig {
            dimensions: Dimensions::new(60, 45, 10.0).unwrap(),
            responsive: true,
            looping: false,
            ..EngineConfig::default()
        },
    )
    .unwrap();

    engine.observe_container_width(500).unwrap();
    let dims = engine.dimensions();
    assert_eq!((dims.width, dims.height), (42, 31));
    assert_eq!(engine.target().unwrap().width(), 42);

    // Desktop width restores the configured dimensions.
    engine.observe_container_width(1400).unwrap();
    assert_eq!(engine.dimensions().width, 60);
}

#[test]
fn surface_pixel_size_follows_cell_pitch() {
    let engine = Engine::new(solid(10), config()).unwrap();
    let dims = engine.dimensions();
    assert_eq!(dims.surface_width(), 60); // 10 cells * 10px * 0.6
    assert_eq!(dims.surface_height(), 60); // 6 cells * 10px
}
