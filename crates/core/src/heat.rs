use crate::model::Tree;

/// Heat ranges narrower than this carry no usable signal.
pub const MIN_HEAT_DIFFERENCE: f64 = 0.000_000_1;

impl Tree {
    /// `(min, max)` over nodes that carry heat, `None` when none do.
    pub fn heat_range(&self) -> Option<(f64, f64)> {
        self.nodes
            .iter()
            .filter(|n| n.has_heat)
            .map(|n| n.heat)
            .fold(None, |range, h| match range {
                None => Some((h, h)),
                Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
            })
    }

    pub fn has_heat(&self) -> bool {
        self.heat_range()
            .is_some_and(|(lo, hi)| hi - lo > MIN_HEAT_DIFFERENCE)
    }

    /// Rescales every heat-bearing node into `[0, 1]`. No-op without meaningful variation.
    pub fn normalize_heat(&mut self) {
        let Some((lo, hi)) = self.heat_range() else {
            return;
        };
        let span = hi - lo;
        if span < MIN_HEAT_DIFFERENCE {
            return;
        }
        for node in self.nodes.iter_mut().filter(|n| n.has_heat) {
            node.heat = (node.heat - lo) / span;
        }
    }
}
