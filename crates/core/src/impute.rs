//! Bottom-up filling of missing sizes and heats.

use crate::config::TreemapConfig;
use crate::model::Tree;

/// Imputes sizes and heats with the configured constants, then normalizes heat.
pub fn prepare(tree: &mut Tree, config: &TreemapConfig) {
    SizeImputer {
        empty_leaf_size: config.empty_leaf_size,
    }
    .impute_size(tree);
    HeatImputer {
        empty_leaf_heat: config.empty_leaf_heat,
    }
    .impute_heat(tree);
    tree.normalize_heat();
}

/// Sets the sum of children into parents without a size, and a constant into empty leaves.
#[derive(Debug, Clone, Copy)]
pub struct SizeImputer {
    pub empty_leaf_size: f64,
}

impl SizeImputer {
    pub fn impute_size(&self, tree: &mut Tree) {
        for id in tree.post_order() {
            let node = tree.get(id);
            if node.size > 0.0 {
                continue;
            }
            let size = if node.is_leaf() {
                self.empty_leaf_size
            } else {
                node.children.iter().map(|&c| tree.get(c).size).sum()
            };
            tree.get_mut(id).size = size;
        }
    }
}

/// Gives heat to every node: a constant for leaves without data, the size-weighted
/// mean of the children for parents without data.
#[derive(Debug, Clone, Copy)]
pub struct HeatImputer {
    pub empty_leaf_heat: f64,
}

impl HeatImputer {
    pub fn impute_heat(&self, tree: &mut Tree) {
        for id in tree.post_order() {
            let node = tree.get(id);
            if node.has_heat {
                continue;
            }
            let heat = if node.is_leaf() {
                self.empty_leaf_heat
            } else {
                let (weighted, total) = node.children.iter().fold((0.0, 0.0), |(w, t), &c| {
                    let child = tree.get(c);
                    (w + child.heat * child.size, t + child.size)
                });
                if total > 0.0 {
                    weighted / total
                } else {
                    let n = node.children.len() as f64;
                    node.children.iter().map(|&c| tree.get(c).heat).sum::<f64>() / n
                }
            };
            let node = tree.get_mut(id);
            node.heat = heat;
            node.has_heat = true;
        }
    }
}
