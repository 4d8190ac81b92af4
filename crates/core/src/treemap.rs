//! Squarified partitioning of a rectangle into weighted parts.
//!
//! As described in "Squarified Treemaps", Mark Bruls, Kees Huizing and Jarke J. van Wijk, 2000.

use serde::{Deserialize, Serialize};

/// Relative mismatch between the sum of areas and the box area that is tolerated
/// without rescaling the areas.
pub const AREA_TOLERANCE: f64 = 1e-9;

/// Axis-aligned rectangle, `x`/`y` at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Placeholder for an area that received no space. Must not be rendered.
    pub const NIL: Rect = Rect {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Shrinks by `d` on all four sides. Width and height never go below zero.
    pub fn inset(&self, d: f64) -> Rect {
        Rect {
            x: self.x + d,
            y: self.y + d,
            w: (self.w - 2.0 * d).max(0.0),
            h: (self.h - 2.0 * d).max(0.0),
        }
    }

    fn short_side(&self) -> f64 {
        self.w.min(self.h)
    }
}

/// Partitions `bounds` into one box per area, with box areas proportional to `areas`.
///
/// Boxes come back in the same order as `areas`. Areas that could not be placed
/// (zero weight, or no space left) get [`Rect::NIL`].
pub fn squarify(bounds: Rect, areas: &[f64]) -> Vec<Rect> {
    let mut boxes = vec![Rect::NIL; areas.len()];

    let mut weights: Vec<f64> = areas.iter().map(|&a| a.max(0.0)).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return boxes;
    }
    let box_area = bounds.area();
    if (total - box_area).abs() > AREA_TOLERANCE * box_area {
        tracing::debug!(total, box_area, "rescaling areas to fit box");
        for w in &mut weights {
            *w *= box_area / total;
        }
    }

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));

    let mut layout = StripLayout {
        free: bounds,
        boxes: &mut boxes,
    };
    let mut stack: Vec<usize> = Vec::new();
    let mut side = layout.free.short_side();
    for idx in order {
        if stack.is_empty() {
            stack.push(idx);
            continue;
        }
        let current = worst_aspect_ratio(stack.iter().map(|&i| weights[i]), side);
        let extended = worst_aspect_ratio(
            stack.iter().map(|&i| weights[i]).chain(std::iter::once(weights[idx])),
            side,
        );
        if current > extended {
            stack.push(idx);
        } else {
            layout.stack(&stack, &weights);
            stack.clear();
            stack.push(idx);
            side = layout.free.short_side();
        }
    }
    layout.stack(&stack, &weights);

    cutoff_overflows(bounds, &mut boxes);
    boxes
}

/// Fixed boxes plus the free space still left to fill.
struct StripLayout<'a> {
    free: Rect,
    /// Indexed like the caller's areas.
    boxes: &'a mut [Rect],
}

impl StripLayout<'_> {
    /// Lays `stack` out as strips along the shorter side of free space, then shrinks it.
    fn stack(&mut self, stack: &[usize], weights: &[f64]) {
        if stack.is_empty() {
            return;
        }
        let stack_area: f64 = stack.iter().map(|&i| weights[i]).sum();
        if stack_area <= 0.0 {
            return;
        }
        let free_area = self.free.area();
        if free_area <= 0.0 {
            return;
        }
        let share = stack_area / free_area;
        let free = self.free;

        if free.w < free.h {
            // One row across the full width, at the top.
            let thickness = free.h * share;
            let mut offset = free.x;
            for &i in stack {
                let w = free.w * weights[i] / stack_area;
                self.boxes[i] = Rect::new(offset, free.y, w, thickness);
                offset += w;
            }
            self.free = Rect::new(free.x, free.y + thickness, free.w, free.h * (1.0 - share));
        } else {
            // One column across the full height, at the left.
            let thickness = free.w * share;
            let mut offset = free.y;
            for &i in stack {
                let h = free.h * weights[i] / stack_area;
                self.boxes[i] = Rect::new(free.x, offset, thickness, h);
                offset += h;
            }
            self.free = Rect::new(free.x + thickness, free.y, free.w * (1.0 - share), free.h);
        }
    }
}

/// Worst aspect ratio of areas laid out along a side of length `side`.
fn worst_aspect_ratio(areas: impl Iterator<Item = f64>, side: f64) -> f64 {
    let (total, min, max) = areas.fold((0.0, f64::INFINITY, 0.0_f64), |(t, lo, hi), a| {
        (t + a, lo.min(a), hi.max(a))
    });
    if total <= 0.0 || min <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let side_sq = side * side;
    let total_sq = total * total;
    (side_sq * max / total_sq).max(total_sq / (side_sq * min))
}

/// Trims boxes that overshoot the right/bottom edge of `bounds` through rounding.
fn cutoff_overflows(bounds: Rect, boxes: &mut [Rect]) {
    let max_x = bounds.right();
    let max_y = bounds.bottom();
    for b in boxes.iter_mut() {
        let dx = b.right() - max_x;
        if dx > 0.0 {
            b.w = (b.w - dx).max(0.0);
        }
        let dy = b.bottom() - max_y;
        if dy > 0.0 {
            b.h = (b.h - dy).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_rect(got: Rect, exp: Rect) {
        assert!(
            (got.x - exp.x).abs() < EPS
                && (got.y - exp.y).abs() < EPS
                && (got.w - exp.w).abs() < EPS
                && (got.h - exp.h).abs() < EPS,
            "got {got:?}, expected {exp:?}"
        );
    }

    #[test]
    fn paper_example() {
        let boxes = squarify(Rect::new(0.0, 0.0, 6.0, 4.0), &[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0]);

        let expected = [
            Rect::new(0.0, 0.0, 3.0, 2.0),
            Rect::new(0.0, 2.0, 3.0, 2.0),
            Rect::new(3.0, 0.0, 12.0 / 7.0, 7.0 / 3.0),
            Rect::new(3.0 + 12.0 / 7.0, 0.0, 9.0 / 7.0, 7.0 / 3.0),
            Rect::new(3.0, 7.0 / 3.0, 1.2, 5.0 / 3.0),
            Rect::new(4.2, 7.0 / 3.0, 1.2, 5.0 / 3.0),
            Rect::new(5.4, 7.0 / 3.0, 0.6, 5.0 / 3.0),
        ];
        assert_eq!(boxes.len(), expected.len());
        for (got, exp) in boxes.into_iter().zip(expected) {
            assert_rect(got, exp);
        }
    }

    #[test]
    fn single_area_takes_everything() {
        let boxes = squarify(Rect::new(0.0, 0.0, 6.0, 4.0), &[24.0]);
        assert_eq!(boxes, vec![Rect::new(0.0, 0.0, 6.0, 4.0)]);
    }

    #[test]
    fn two_equal_areas_split_in_halves() {
        let boxes = squarify(Rect::new(0.0, 0.0, 6.0, 4.0), &[12.0, 12.0]);
        assert_eq!(
            boxes,
            vec![Rect::new(0.0, 0.0, 3.0, 4.0), Rect::new(3.0, 0.0, 3.0, 4.0)]
        );
    }

    #[test]
    fn result_follows_input_order() {
        let bounds = Rect::new(0.0, 0.0, 6.0, 4.0);
        let sorted = squarify(bounds, &[6.0, 4.0, 1.0]);
        let shuffled = squarify(bounds, &[1.0, 6.0, 4.0]);

        assert_rect(shuffled[0], sorted[2]);
        assert_rect(shuffled[1], sorted[0]);
        assert_rect(shuffled[2], sorted[1]);
    }

    #[test]
    fn areas_are_rescaled_to_box() {
        let boxes = squarify(Rect::new(10.0, 20.0, 6.0, 4.0), &[1.0, 1.0]);
        assert_rect(boxes[0], Rect::new(10.0, 20.0, 3.0, 4.0));
        assert_rect(boxes[1], Rect::new(13.0, 20.0, 3.0, 4.0));
    }

    #[test]
    fn empty_areas() {
        assert!(squarify(Rect::new(0.0, 0.0, 6.0, 4.0), &[]).is_empty());
    }

    #[test]
    fn zero_total_gives_nil_boxes() {
        let boxes = squarify(Rect::new(0.0, 0.0, 6.0, 4.0), &[0.0, 0.0, 0.0]);
        assert_eq!(boxes, vec![Rect::NIL; 3]);
    }

    #[test]
    fn zero_area_entry_is_nil() {
        let boxes = squarify(Rect::new(0.0, 0.0, 6.0, 4.0), &[0.0, 24.0]);
        assert!(boxes[0].is_empty());
        assert_rect(boxes[1], Rect::new(0.0, 0.0, 6.0, 4.0));
    }

    #[test]
    fn no_free_space_places_nothing() {
        let boxes = squarify(Rect::new(0.0, 0.0, 0.0, 4.0), &[1.0, 2.0]);
        assert!(boxes.iter().all(Rect::is_empty));
    }

    #[test]
    fn stacks_column_when_wide() {
        let mut boxes = vec![Rect::NIL; 2];
        let mut layout = StripLayout {
            free: Rect::new(0.0, 0.0, 6.0, 4.0),
            boxes: &mut boxes,
        };
        layout.stack(&[0, 1], &[6.0, 6.0]);

        assert_eq!(layout.free, Rect::new(3.0, 0.0, 3.0, 4.0));
        assert_eq!(boxes, vec![Rect::new(0.0, 0.0, 3.0, 2.0), Rect::new(0.0, 2.0, 3.0, 2.0)]);
    }

    #[test]
    fn stacks_row_when_tall() {
        let mut boxes = vec![Rect::NIL; 1];
        let mut layout = StripLayout {
            free: Rect::new(0.0, 0.0, 4.0, 6.0),
            boxes: &mut boxes,
        };
        layout.stack(&[0], &[12.0]);

        assert_eq!(layout.free, Rect::new(0.0, 3.0, 4.0, 3.0));
        assert_eq!(boxes, vec![Rect::new(0.0, 0.0, 4.0, 3.0)]);
    }

    #[test]
    fn aspect_ratio_matches_paper_steps() {
        let one = worst_aspect_ratio([6.0].into_iter(), 4.0);
        let two = worst_aspect_ratio([6.0, 6.0].into_iter(), 4.0);
        let three = worst_aspect_ratio([6.0, 6.0, 4.0].into_iter(), 4.0);
        assert!(one > two);
        assert!(two < three);
        assert!((two - 1.5).abs() < EPS);
    }

    #[test]
    fn overflow_is_trimmed_without_moving() {
        let mut boxes = [Rect::new(1.0, 1.0, 5.5, 3.5)];
        cutoff_overflows(Rect::new(0.0, 0.0, 6.0, 4.0), &mut boxes);
        assert_eq!(boxes[0], Rect::new(1.0, 1.0, 5.0, 3.0));
    }
}
