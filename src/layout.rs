//! Maps frame intervals to pixel rectangles.

use crate::flow::Node;
use crate::options::Options;

/// Horizontal margin on each side of the frames.
pub const XPAD: f64 = 10.0;
/// Vertical gap between stacked frames.
pub const FRAME_PAD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub image_width: f64,
    pub image_height: f64,
    pub frame_height: f64,
    /// Top padding: title, plus subtitle when present.
    pub ypad1: f64,
    /// Bottom padding: details and match labels.
    pub ypad2: f64,
    /// Pixels per unit of time.
    pub scale: f64,
    pub inverted: bool,
}

impl Layout {
    /// Sizes the horizontal axis for `total` time. The height is fixed later
    /// by [`Layout::with_depth`], once pruning knows the deepest frame.
    pub fn new(opts: &Options, total: f64) -> Self {
        let mut ypad1 = opts.font_size * 3.0;
        if opts.subtitle.is_some() {
            ypad1 += opts.font_size * 2.0;
        }
        let ypad2 = opts.font_size * 2.0 + 10.0;

        Layout {
            image_width: opts.image_width,
            image_height: ypad1 + ypad2,
            frame_height: opts.frame_height,
            ypad1,
            ypad2,
            scale: (opts.image_width - 2.0 * XPAD) / total,
            inverted: opts.inverted,
        }
    }

    /// The narrowest interval, in time units, that is still drawn.
    pub fn min_width_time(&self, min_width_px: f64) -> f64 {
        min_width_px / self.scale
    }

    pub fn with_depth(mut self, max_depth: usize) -> Self {
        self.image_height = (max_depth as f64 + 1.0) * self.frame_height + self.ypad1 + self.ypad2;
        self
    }

    pub fn rect(&self, node: &Node) -> Rect {
        let depth = node.depth as f64;
        let x1 = XPAD + node.start * self.scale;
        let x2 = XPAD + node.end * self.scale;

        let (y1, y2) = if self.inverted {
            (
                self.ypad1 + depth * self.frame_height,
                self.ypad1 + (depth + 1.0) * self.frame_height - FRAME_PAD,
            )
        } else {
            let bottom = self.image_height - self.ypad2;
            (
                bottom - (depth + 1.0) * self.frame_height + FRAME_PAD,
                bottom - depth * self.frame_height,
            )
        };
        Rect { x1, y1, x2, y2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(depth: usize, start: f64, end: f64) -> Node {
        Node {
            name: "f".to_string(),
            depth,
            start,
            end,
            delta: None,
        }
    }

    #[test]
    fn test_horizontal_scale() {
        let layout = Layout::new(&Options::default(), 1180.0).with_depth(0);
        assert_eq!(layout.scale, 1.0);
        let rect = layout.rect(&node(0, 100.0, 300.0));
        assert_eq!((rect.x1, rect.x2), (110.0, 310.0));
        assert_eq!(layout.min_width_time(0.1), 0.1);
    }

    #[test]
    fn test_image_height() {
        let layout = Layout::new(&Options::default(), 10.0).with_depth(3);
        // 4 rows of 16px, 36px on top, 34px at the bottom.
        assert_eq!(layout.image_height, 64.0 + 36.0 + 34.0);

        let opts = Options {
            subtitle: Some("sub".to_string()),
            ..Default::default()
        };
        let layout = Layout::new(&opts, 10.0).with_depth(3);
        assert_eq!(layout.image_height, 64.0 + 60.0 + 34.0);
    }

    #[test]
    fn test_flame_orientation() {
        let layout = Layout::new(&Options::default(), 10.0).with_depth(2);
        // height = 48 + 36 + 34 = 118, frames sit on 118 - 34 = 84
        let root = layout.rect(&node(0, 0.0, 10.0));
        assert_eq!((root.y1, root.y2), (69.0, 84.0));
        let top = layout.rect(&node(2, 0.0, 10.0));
        assert_eq!((top.y1, top.y2), (37.0, 52.0));
        assert_eq!(top.height(), 15.0);
    }

    #[test]
    fn test_icicle_orientation() {
        let opts = Options {
            inverted: true,
            ..Default::default()
        };
        let layout = Layout::new(&opts, 10.0).with_depth(2);
        let root = layout.rect(&node(0, 0.0, 10.0));
        assert_eq!((root.y1, root.y2), (36.0, 51.0));
        let child = layout.rect(&node(1, 0.0, 5.0));
        assert_eq!((child.y1, child.y2), (52.0, 67.0));
        assert_eq!(child.width(), 590.0);
    }
}
