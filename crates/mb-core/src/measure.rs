//! Card size of a rendered SVG diagram.
//!
//! The renderer hands back SVG markup. Its intrinsic size comes from the
//! root element's `viewBox`, falling back to `width`/`height`, and finally
//! to a fixed default. Card padding is added on both axes.

use kurbo::Size;
use regex::Regex;
use std::sync::LazyLock;

static SVG_OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<svg\b[^>]*>").expect("svg tag pattern is valid"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern is valid")
});

/// Card size for an SVG string: intrinsic size plus `padding` on each axis.
pub fn svg_size(svg: &str, padding: f64, fallback: Size) -> Size {
    let intrinsic = intrinsic_size(svg, fallback);
    Size::new(intrinsic.width + padding, intrinsic.height + padding)
}

fn intrinsic_size(svg: &str, fallback: Size) -> Size {
    let Some(tag) = SVG_OPEN_TAG.find(svg) else {
        log::debug!("svg_size: no <svg> element, using fallback");
        return fallback;
    };
    let attr = |name: &str| {
        ATTRIBUTE.captures_iter(tag.as_str()).find_map(|caps| {
            (caps.get(1)?.as_str() == name)
                .then(|| caps.get(2).or_else(|| caps.get(3)))
                .flatten()
                .map(|m| m.as_str())
        })
    };

    if let Some(view_box) = attr("viewBox") {
        let parts: Vec<f64> = view_box
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(|s| leading_number(s).unwrap_or(f64::NAN))
            .collect();
        let pick = |i: usize, default: f64| {
            parts
                .get(i)
                .copied()
                .filter(|v| v.is_finite() && *v != 0.0)
                .unwrap_or(default)
        };
        return Size::new(pick(2, fallback.width), pick(3, fallback.height));
    }

    let dimension = |name: &str, default: f64| {
        attr(name)
            .and_then(leading_number)
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    };
    Size::new(
        dimension("width", fallback.width),
        dimension("height", fallback.height),
    )
}

/// Parse the numeric prefix of a length such as `120.5px`.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit()
                || c == '.'
                || ((c == '-' || c == '+') && i == 0)
                || ((c == 'e' || c == 'E') && i > 0))
        })
        .map_or(text.len(), |(i, _)| i);
    (1..=end)
        .rev()
        .find_map(|len| text[..len].parse::<f64>().ok())
}
