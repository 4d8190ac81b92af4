use serde::Serialize;

use crate::config::TreemapConfig;
use crate::model::{NodeId, Tree};
use crate::treemap::{squarify, Rect};

pub const FONT_SIZE: f64 = 12.0;
const TEXT_HEIGHT_MULTIPLIER: f64 = 0.8;
const TEXT_WIDTH_MULTIPLIER: f64 = 0.8;
const TOO_SMALL_BOX_WIDTH: f64 = 5.0;
const TOO_SMALL_BOX_HEIGHT: f64 = 5.0;

/// How to render a title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiText {
    pub text: String,
    pub rect: Rect,
    /// Multiplier on [`FONT_SIZE`], at most 1.
    pub scale: f64,
}

/// One positioned rectangle of the treemap and its nested children.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UiBox {
    /// Tree node this box shows. `None` for the root canvas.
    pub node: Option<NodeId>,
    pub rect: Rect,
    pub title: Option<UiText>,
    pub children: Vec<UiBox>,
    /// Canvas-only box, not drawn.
    pub is_invisible: bool,
}

impl UiBox {
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// Depth-first walk over this box and every descendant.
    pub fn iter(&self) -> impl Iterator<Item = &UiBox> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let b = stack.pop()?;
            stack.extend(b.children.iter().rev());
            Some(b)
        })
    }
}

/// Full canvas for `tree`: an invisible root of the configured size holding the
/// root node's layout, inset by the root padding.
pub fn build_treemap(tree: &Tree, config: &TreemapConfig) -> UiBox {
    let canvas = Rect::new(0.0, 0.0, config.width, config.height);
    let content = canvas.inset(config.root_padding);

    let mut root = UiBox {
        rect: canvas,
        is_invisible: true,
        ..UiBox::default()
    };
    let child = build_layout(
        tree,
        tree.root,
        content,
        config.margin_box,
        config.padding_box,
    );
    if child.is_empty() {
        tracing::debug!(?content, "root does not fit the canvas");
    } else {
        root.children.push(child);
    }
    root
}

/// Lays out `node` inside `rect` and recurses into its children.
///
/// Returns an empty box when the region is too small to render; callers skip those.
pub fn build_layout(tree: &Tree, node: NodeId, rect: Rect, margin: f64, padding: f64) -> UiBox {
    let frame = rect.inset(margin);
    if frame.w < TOO_SMALL_BOX_WIDTH
        || frame.h < TOO_SMALL_BOX_HEIGHT
        || frame.w <= 2.0 * padding
        || frame.h <= 2.0 * padding
    {
        return UiBox::default();
    }

    let mut ui = UiBox {
        node: Some(node),
        rect: frame,
        ..UiBox::default()
    };

    let inner = frame.inset(padding);
    let mut title_height = 0.0;
    let name = &tree.get(node).name;
    if !name.is_empty() {
        let (scale, h) = fit_text(name, FONT_SIZE, inner.w);
        if scale > 0.0 && h > 0.0 && h < inner.h {
            title_height = h;
            ui.title = Some(UiText {
                text: name.clone(),
                rect: Rect::new(inner.x, inner.y, inner.w, h),
                scale,
            });
        }
    }

    let children = tree.children(node);
    if children.is_empty() {
        return ui;
    }

    let areas: Vec<f64> = children.iter().map(|&c| tree.effective_size(c)).collect();
    let content = Rect::new(
        inner.x,
        inner.y + title_height,
        inner.w,
        inner.h - title_height,
    );
    let boxes = squarify(content, &areas);

    for (&child, b) in children.iter().zip(boxes) {
        if b.is_empty() {
            continue;
        }
        let child_box = build_layout(tree, child, b, margin, padding);
        if child_box.is_empty() {
            continue;
        }
        ui.children.push(child_box);
    }
    ui
}

/// Scale that fits `text` into `available_width`, and the height the text takes.
pub fn fit_text(text: &str, font_size: f64, available_width: f64) -> (f64, f64) {
    let w = text_width(text, font_size);
    let h = text_height(font_size);
    let scale = if w > 0.0 { (available_width / w).min(1.0) } else { 1.0 };
    (scale, h)
}

fn text_width(text: &str, font_size: f64) -> f64 {
    font_size * text.chars().count() as f64 * TEXT_WIDTH_MULTIPLIER
}

fn text_height(font_size: f64) -> f64 {
    font_size * TEXT_HEIGHT_MULTIPLIER
}
