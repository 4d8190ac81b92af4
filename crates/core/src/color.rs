//! Per-node colouring, applied downstream of layout.

use peniko::color::{AlphaColor, HueDirection, Oklab, Oklch, Srgb};
use peniko::Color;
use std::collections::HashMap;

use crate::model::{NodeId, Tree};

pub const DARK_TEXT: Color = Color::BLACK;
pub const LIGHT_TEXT: Color = Color::WHITE;

pub trait Colorer {
    fn box_color(&self, tree: &Tree, node: NodeId) -> Color;
    fn text_color(&self, tree: &Tree, node: NodeId) -> Color;
}

/// Picks a colorer for a scheme name: `none`, `balanced`, or a palette name.
/// Palettes only apply when the tree has meaningful heat.
pub fn colorer_for(scheme: &str, tree: &Tree) -> Box<dyn Colorer> {
    match (scheme, Palette::by_name(scheme)) {
        ("none", _) => Box::new(NoneColorer),
        ("balanced", _) => Box::new(TreeHueColorer::new(tree)),
        (_, Some(palette)) if tree.has_heat() => Box::new(HeatColorer { palette }),
        _ if tree.has_heat() => Box::new(HeatColorer {
            palette: Palette::rd_bu(),
        }),
        _ => Box::new(TreeHueColorer::new(tree)),
    }
}

pub fn border_color(scheme: &str, border: &str) -> Color {
    match (scheme, border) {
        ("none", _) | (_, "black") => Color::BLACK,
        _ => Color::WHITE,
    }
}

/// Dark text on light boxes, light text otherwise.
fn contrast_text(background: Color) -> Color {
    if background.convert::<Oklab>().components[0] > 0.5 {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoneColorer;

impl Colorer for NoneColorer {
    fn box_color(&self, _tree: &Tree, _node: NodeId) -> Color {
        Color::TRANSPARENT
    }

    fn text_color(&self, _tree: &Tree, _node: NodeId) -> Color {
        DARK_TEXT
    }
}

/// Gradient keypoints, positions sorted within `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Palette {
    stops: Vec<(f64, Color)>,
}

impl Palette {
    pub fn new(stops: Vec<(f64, Color)>) -> Self {
        Self { stops }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "RdBu" => Some(Self::rd_bu()),
            _ => None,
        }
    }

    /// Diverging red-blue palette from ColorBrewer.
    pub fn rd_bu() -> Self {
        Self::new(vec![
            (0.0, Color::from_rgb8(0x67, 0x00, 0x1f)),
            (0.1, Color::from_rgb8(0xb2, 0x18, 0x2b)),
            (0.2, Color::from_rgb8(0xd6, 0x60, 0x4d)),
            (0.3, Color::from_rgb8(0xf4, 0xa4, 0x82)),
            (0.4, Color::from_rgb8(0xfd, 0xdb, 0xc7)),
            (0.5, Color::from_rgb8(0xf7, 0xf7, 0xf7)),
            (0.6, Color::from_rgb8(0xd1, 0xe5, 0xf0)),
            (0.7, Color::from_rgb8(0x92, 0xc5, 0xde)),
            (0.8, Color::from_rgb8(0x43, 0x93, 0xc3)),
            (0.9, Color::from_rgb8(0x21, 0x66, 0xac)),
            (1.0, Color::from_rgb8(0x05, 0x30, 0x61)),
        ])
    }

    /// Blend, in Oklch, of the two keypoints around `t`.
    pub fn color_at(&self, t: f64) -> Color {
        let (Some(&(first_pos, first)), Some(&(last_pos, last))) =
            (self.stops.first(), self.stops.last())
        else {
            return Color::TRANSPARENT;
        };
        if t <= first_pos {
            return first;
        }
        if t >= last_pos {
            return last;
        }
        for pair in self.stops.windows(2) {
            let ((p1, c1), (p2, c2)) = (pair[0], pair[1]);
            if p1 <= t && t <= p2 {
                if p2 - p1 <= 0.0 {
                    return c2;
                }
                let local = ((t - p1) / (p2 - p1)) as f32;
                return c1
                    .convert::<Oklch>()
                    .lerp(c2.convert::<Oklch>(), local, HueDirection::Shorter)
                    .convert::<Srgb>();
            }
        }
        last
    }
}

/// Colours by node heat. Nodes without heat take the middle of the palette.
#[derive(Debug, Clone)]
pub struct HeatColorer {
    pub palette: Palette,
}

impl Colorer for HeatColorer {
    fn box_color(&self, tree: &Tree, node: NodeId) -> Color {
        let n = tree.get(node);
        if n.has_heat {
            self.palette.color_at(n.heat)
        } else {
            self.palette.color_at(0.5)
        }
    }

    fn text_color(&self, tree: &Tree, node: NodeId) -> Color {
        contrast_text(self.box_color(tree, node))
    }
}

/// Splits the hue circle among children so that nodes close in the tree get close hues.
/// Deeper nodes are lighter and less saturated.
#[derive(Debug, Clone)]
pub struct TreeHueColorer {
    hues: HashMap<NodeId, f64>,
    depths: HashMap<NodeId, u32>,
    max_depth: u32,
    pub lightness: f64,
    pub chroma: f64,
    pub delta_lightness: f64,
    pub delta_chroma: f64,
}

impl TreeHueColorer {
    pub fn new(tree: &Tree) -> Self {
        Self::with_offset(tree, 0.0)
    }

    pub fn with_offset(tree: &Tree, offset: f64) -> Self {
        let depths = tree_depths(tree);
        let max_depth = depths.values().copied().max().unwrap_or(0);
        Self {
            hues: tree_hues(tree, offset),
            depths,
            max_depth,
            lightness: 0.55,
            chroma: 0.14,
            delta_lightness: 0.35,
            delta_chroma: 0.08,
        }
    }
}

impl Colorer for TreeHueColorer {
    fn box_color(&self, _tree: &Tree, node: NodeId) -> Color {
        let Some(&hue) = self.hues.get(&node) else {
            return Color::TRANSPARENT;
        };
        let depth = self.depths.get(&node).copied().unwrap_or(0);
        let ratio = if self.max_depth == 0 {
            0.0
        } else {
            f64::from(depth) / f64::from(self.max_depth)
        };
        let l = (self.lightness + self.delta_lightness * ratio).clamp(0.0, 1.0);
        let c = (self.chroma - self.delta_chroma * ratio).max(0.0);
        AlphaColor::<Oklch>::new([l as f32, c as f32, hue as f32, 1.0]).convert::<Srgb>()
    }

    fn text_color(&self, tree: &Tree, node: NodeId) -> Color {
        contrast_text(self.box_color(tree, node))
    }
}

/// Hue in degrees per reachable node: the middle of the hue range it inherited,
/// where each node splits its range equally among its children.
pub fn tree_hues(tree: &Tree, offset: f64) -> HashMap<NodeId, f64> {
    let mut hues = HashMap::with_capacity(tree.len());
    let mut stack = vec![(tree.root, 0.0_f64, 360.0_f64)];
    while let Some((id, lo, hi)) = stack.pop() {
        hues.insert(id, ((lo + hi) / 2.0 + offset).rem_euclid(360.0));
        let children = tree.children(id);
        if children.is_empty() {
            continue;
        }
        let step = (hi - lo) / children.len() as f64;
        for (i, &child) in children.iter().enumerate() {
            let start = lo + step * i as f64;
            stack.push((child, start, start + step));
        }
    }
    hues
}

fn tree_depths(tree: &Tree) -> HashMap<NodeId, u32> {
    let mut depths = HashMap::with_capacity(tree.len());
    let mut stack = vec![(tree.root, 0_u32)];
    while let Some((id, depth)) = stack.pop() {
        depths.insert(id, depth);
        stack.extend(tree.children(id).iter().map(|&c| (c, depth + 1)));
    }
    depths
}
