//! Integration tests: grid packing and fit-to-viewport.

use mb_core::layout::{fit_to_viewport, pack_grid};
use mb_core::measure::svg_size;
use mb_core::{Point, Size};

fn sizes() -> Vec<Size> {
    vec![
        Size::new(320.0, 200.0),
        Size::new(180.0, 420.0),
        Size::new(640.0, 90.0),
        Size::new(250.0, 250.0),
        Size::new(100.0, 100.0),
    ]
}

#[test]
fn single_column_stacks_with_increasing_y() {
    let grid = pack_grid(&sizes(), 1);
    assert!(grid.positions.iter().all(|p| p.x == 0.0));
    assert!(grid.positions.windows(2).all(|w| w[0].y < w[1].y));
}

#[test]
fn enough_columns_put_everything_on_one_row() {
    for cols in [5, 6, 40] {
        let grid = pack_grid(&sizes(), cols);
        assert!(grid.positions.iter().all(|p| p.y == 0.0), "cols={cols}");
        assert!(grid.positions.windows(2).all(|w| w[0].x < w[1].x));
    }
}

#[test]
fn three_columns_align_on_widest_and_tallest() {
    let grid = pack_grid(&sizes(), 3);
    assert_eq!(grid.col_widths.as_slice(), &[320.0, 180.0, 640.0]);
    assert_eq!(grid.row_heights.as_slice(), &[420.0, 250.0]);
    assert_eq!(grid.positions[3], Point::new(0.0, 420.0));
    assert_eq!(grid.positions[4], Point::new(320.0, 420.0));
    assert_eq!(grid.content_size(), Size::new(1140.0, 670.0));
}

#[test]
fn fit_scale_never_exceeds_one() {
    let viewports = [
        Size::new(100.0, 100.0),
        Size::new(1280.0, 720.0),
        Size::new(5000.0, 5000.0),
    ];
    for cols in 1..=6 {
        let grid = pack_grid(&sizes(), cols);
        for viewport in viewports {
            let t = fit_to_viewport(grid.content_size(), viewport, 80.0);
            assert!(t.scale <= 1.0 && t.scale > 0.0);
        }
    }
}

#[test]
fn fitted_content_is_centred() {
    let grid = pack_grid(&sizes(), 3);
    let viewport = Size::new(1280.0, 720.0);
    let t = fit_to_viewport(grid.content_size(), viewport, 80.0);
    let content = grid.content_size();
    let left = t.offset.x;
    let right = viewport.width - (t.offset.x + content.width * t.scale);
    assert!((left - right).abs() < 1e-9);
}

#[test]
fn measured_svgs_feed_the_packer() {
    let svgs = [
        r#"<svg viewBox="0 0 288 168"></svg>"#,
        r#"<svg width="148" height="388"></svg>"#,
    ];
    let sizes: Vec<Size> = svgs
        .iter()
        .map(|svg| svg_size(svg, 32.0, Size::new(300.0, 200.0)))
        .collect();
    let grid = pack_grid(&sizes, 2);
    assert_eq!(grid.positions[1], Point::new(320.0, 0.0));
    assert_eq!(grid.content_size(), Size::new(500.0, 420.0));
}
