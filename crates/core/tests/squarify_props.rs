use proptest::prelude::*;
use treemap_core::{squarify, Rect};

const EPS: f64 = 1e-6;

fn bounds() -> impl Strategy<Value = Rect> {
    (0.0..500.0f64, 0.0..500.0f64, 1.0..1000.0f64, 1.0..1000.0f64)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn covers_the_box(bounds in bounds(), areas in prop::collection::vec(0.01..1000.0f64, 1..40)) {
        let boxes = squarify(bounds, &areas);

        prop_assert_eq!(boxes.len(), areas.len());
        let covered: f64 = boxes.iter().map(Rect::area).sum();
        prop_assert!((covered - bounds.area()).abs() <= EPS * bounds.area(),
            "covered {} of {}", covered, bounds.area());
    }

    #[test]
    fn stays_inside_the_box(bounds in bounds(), areas in prop::collection::vec(0.0..1000.0f64, 0..40)) {
        for b in squarify(bounds, &areas) {
            if b.is_empty() {
                continue;
            }
            prop_assert!(b.x >= bounds.x - EPS && b.y >= bounds.y - EPS);
            prop_assert!(b.right() <= bounds.right() + EPS);
            prop_assert!(b.bottom() <= bounds.bottom() + EPS);
        }
    }

    #[test]
    fn areas_are_proportional(bounds in bounds(), areas in prop::collection::vec(0.01..1000.0f64, 1..40)) {
        let total: f64 = areas.iter().sum();
        let boxes = squarify(bounds, &areas);
        for (a, b) in areas.iter().zip(&boxes) {
            let expected = bounds.area() * a / total;
            prop_assert!((b.area() - expected).abs() <= EPS * bounds.area(),
                "area {} expected {}", b.area(), expected);
        }
    }

    #[test]
    fn permuting_input_permutes_output(
        bounds in bounds(),
        areas in prop::collection::vec(0.01..1000.0f64, 1..20),
        rotate in 0usize..20,
    ) {
        let mut rotated = areas.clone();
        let k = rotate % areas.len();
        rotated.rotate_left(k);

        let plain = squarify(bounds, &areas);
        let turned = squarify(bounds, &rotated);
        for (i, b) in turned.iter().enumerate() {
            let expected = plain[(i + k) % areas.len()];
            prop_assert!((b.area() - expected.area()).abs() <= EPS * bounds.area());
        }
    }
}
