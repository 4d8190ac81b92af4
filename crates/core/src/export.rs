use crate::layout::UiBox;
use crate::model::Tree;

/// Writes concrete nodes as `path,size[,heat]` rows, readable by
/// [`parse_csv`](crate::parser::parse_csv).
pub fn tree_to_csv(tree: &Tree, w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(w);
    for n in tree.nodes.iter().filter(|n| !n.is_virtual) {
        if n.has_heat {
            writer.write_record([n.path.clone(), n.size.to_string(), n.heat.to_string()])?;
        } else {
            writer.write_record([n.path.clone(), n.size.to_string()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Layout dump: each box with its node path, geometry, title and children.
pub fn to_json(ui: &UiBox, tree: &Tree) -> serde_json::Value {
    serde_json::json!({
        "path": ui.node.map(|id| tree.get(id).path.clone()),
        "x": ui.rect.x,
        "y": ui.rect.y,
        "w": ui.rect.w,
        "h": ui.rect.h,
        "title": ui.title.as_ref().map(|t| serde_json::json!({
            "text": t.text,
            "x": t.rect.x,
            "y": t.rect.y,
            "w": t.rect.w,
            "h": t.rect.h,
            "scale": t.scale,
        })),
        "children": ui.children.iter().map(|c| to_json(c, tree)).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreemapConfig;
    use crate::layout::build_treemap;
    use crate::model::{Record, TreeBuilder};
    use crate::parser::parse_csv;

    #[test]
    fn csv_export_reads_back() {
        let records = vec![
            Record::new("a", 10.0),
            Record::new("a/b", 4.0).with_heat(0.25),
            Record::new("a/c/d", 6.0),
        ];
        let tree = TreeBuilder::new().build(records.clone()).unwrap();

        let mut buf = Vec::new();
        tree_to_csv(&tree, &mut buf).unwrap();
        let back = parse_csv(buf.as_slice()).unwrap();

        assert_eq!(back, records);
    }

    #[test]
    fn json_mirrors_layout() {
        let tree = TreeBuilder::new()
            .build(vec![Record::new("a/b", 1.0), Record::new("a/c", 1.0)])
            .unwrap();
        let ui = build_treemap(&tree, &TreemapConfig::default());
        let json = to_json(&ui, &tree);

        assert!(json["path"].is_null());
        assert_eq!(json["w"], 1028.0);
        let root = &json["children"][0];
        assert_eq!(root["path"], "a");
        assert_eq!(root["title"]["text"], "a");
        assert_eq!(root["children"].as_array().unwrap().len(), 2);
        assert_eq!(root["children"][0]["path"], "a/b");
    }
}
