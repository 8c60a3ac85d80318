//! Reduced channels as kurbo paths, for inspection and SVG output.
//!
//! Frame runs along x, value along y. Segments with a handle fit become
//! the same cubic the fit was scored on; segments without one become
//! straight lines.

use kurbo::{BezPath, PathEl, Point, Rect, Shape};

use crate::ncurve::Sample;
use crate::tweak::{segment_cubic, SegmentFit};

/// Path through `keys`. `fits` is either empty or one per segment.
pub fn channel_path(keys: &[Sample], fits: &[SegmentFit]) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = keys.first() else {
        return path;
    };
    path.move_to(Point::new(first.frame, first.value));
    for (m, pair) in keys.windows(2).enumerate() {
        match fits.get(m) {
            Some(fit) => {
                let c = segment_cubic(pair[0], pair[1], fit.p1, fit.p2);
                path.push(PathEl::CurveTo(c.p1, c.p2, c.p3));
            }
            None => path.line_to(Point::new(pair[1].frame, pair[1].value)),
        }
    }
    path
}

/// A standalone SVG document with one stroked path per channel.
///
/// The y axis is flipped so larger values draw higher.
pub fn svg_document(paths: &[(String, BezPath)]) -> String {
    let bounds = paths
        .iter()
        .map(|(_, p)| p.bounding_box())
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0));
    let margin = 0.05 * bounds.width().max(bounds.height()).max(1.0);
    let view = bounds.inflate(margin, margin);

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\">\n",
        view.x0,
        -view.y1,
        view.width(),
        view.height(),
    );
    svg.push_str("  <g transform=\"scale(1,-1)\" fill=\"none\" stroke=\"black\" stroke-width=\"0.5\" vector-effect=\"non-scaling-stroke\">\n");
    for (name, path) in paths {
        svg.push_str(&format!(
            "    <path id=\"{}\" d=\"{}\"/>\n",
            escape_attr(name),
            path.to_svg()
        ));
    }
    svg.push_str("  </g>\n</svg>\n");
    svg
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
