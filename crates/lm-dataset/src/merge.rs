use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::records::{ClassificationRow, LipidAnnotationRow, MergedRow, ProsomeAnnotationRow};

/// Which classification categories enter the dataset.
///
/// A category is kept when it contains every `include` term and none of the
/// `exclude` terms, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        // Calanus in lateral view; stage CIII is too small to segment.
        Self {
            include: vec!["calanus".to_owned(), "lateral".to_owned()],
            exclude: vec!["ciiistage".to_owned()],
        }
    }
}

impl MergeConfig {
    pub fn selects(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.include
            .iter()
            .all(|t| category.contains(&t.to_lowercase()))
            && !self
                .exclude
                .iter()
                .any(|t| category.contains(&t.to_lowercase()))
    }
}

/// Left-joins selected classification rows with lipid and prosome
/// annotations on object id.
///
/// Every object id with at least one selected category keeps all of its
/// classification rows. Each match pair yields one output row, in input
/// order; rows without a match keep empty annotation columns.
pub fn merge_annotations(
    classification: &[ClassificationRow],
    lipids: &[LipidAnnotationRow],
    prosomes: &[ProsomeAnnotationRow],
    cfg: &MergeConfig,
) -> Vec<MergedRow> {
    let selected: HashSet<&str> = classification
        .iter()
        .filter(|r| cfg.selects(&r.object_annotation_category))
        .map(|r| r.object_id.as_str())
        .collect();

    let lipid_by_id = index_by(lipids.iter().map(|r| (r.object_id(), r)));
    let prosome_by_id = index_by(prosomes.iter().map(|r| (r.object_id(), r)));

    let mut out = Vec::new();
    for class in classification
        .iter()
        .filter(|r| selected.contains(r.object_id.as_str()))
    {
        let base = MergedRow {
            object_id: class.object_id.clone(),
            object_date: class.object_date.clone(),
            object_annotation_category: class.object_annotation_category.clone(),
            ..MergedRow::default()
        };

        let with_lipid: Vec<MergedRow> = match lipid_by_id.get(class.object_id.as_str()) {
            Some(matches) => matches
                .iter()
                .map(|l| MergedRow {
                    lipid_polygon: Some(l.segmentation.clone()),
                    shape_lipid_polygon: l.shape.clone(),
                    shape_y_lipid_polygon: l.shape_y,
                    shape_x_lipid_polygon: l.shape_x,
                    ..base.clone()
                })
                .collect(),
            None => vec![base],
        };

        for row in with_lipid {
            match prosome_by_id.get(class.object_id.as_str()) {
                Some(matches) => out.extend(matches.iter().map(|p| MergedRow {
                    prosome_polygon: Some(p.label.clone()),
                    ..row.clone()
                })),
                None => out.push(row),
            }
        }
    }

    let with_both = out
        .iter()
        .filter(|r| r.lipid_polygon.is_some() && r.prosome_polygon.is_some())
        .count();
    tracing::info!(
        selected_objects = selected.len(),
        rows = out.len(),
        with_both,
        "merged classification with annotations"
    );
    out
}

fn index_by<'a, T>(
    items: impl Iterator<Item = (String, &'a T)>,
) -> HashMap<String, Vec<&'a T>> {
    let mut map: HashMap<String, Vec<&'a T>> = HashMap::new();
    for (id, item) in items {
        map.entry(id).or_default().push(item);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::{MergeConfig, merge_annotations};
    use crate::records::{ClassificationRow, LipidAnnotationRow, ProsomeAnnotationRow};

    fn class(id: &str, cat: &str) -> ClassificationRow {
        ClassificationRow {
            object_id: id.to_owned(),
            object_date: "2013-08-12".to_owned(),
            object_annotation_category: cat.to_owned(),
        }
    }

    fn lipid(id: &str) -> LipidAnnotationRow {
        LipidAnnotationRow {
            filename: format!("{id}.bmp"),
            segmentation: format!("[[[0, 0], [4, 0], [4, 4]]] {id}"),
            shape: Some("(300, 400)".to_owned()),
            shape_y: Some(300),
            shape_x: Some(400),
        }
    }

    fn prosome(id: &str) -> ProsomeAnnotationRow {
        ProsomeAnnotationRow {
            image: format!("/data/upload/1/abcd-{}.bmp", id.replace(' ', "_")),
            label: format!("label {id}"),
        }
    }

    #[test]
    fn category_selection() {
        let cfg = MergeConfig::default();
        assert!(cfg.selects("Calanus hyperboreus<lateral<cvstage"));
        assert!(cfg.selects("calanus glacialis<LATERAL<female"));
        assert!(!cfg.selects("Calanus<dorsal<cvstage"));
        assert!(!cfg.selects("Calanus<lateral<ciiistage"));
        assert!(!cfg.selects("Metridia<lateral"));
    }

    #[test]
    fn left_join_keeps_unmatched_and_fans_out_duplicates() {
        let classification = vec![
            class("a 1", "Calanus<lateral<cvstage"),
            class("b 2", "Calanus<lateral<female"),
            class("c 3", "Calanus<dorsal"),
        ];
        let lipids = vec![lipid("a 1"), lipid("b 2"), lipid("b 2")];
        let prosomes = vec![prosome("a 1")];

        let rows = merge_annotations(&classification, &lipids, &prosomes, &MergeConfig::default());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].object_id, "a 1");
        assert_eq!(rows[0].prosome_polygon.as_deref(), Some("label a 1"));
        assert_eq!(rows[0].shape_x_lipid_polygon, Some(400));

        assert!(rows[1..].iter().all(|r| r.object_id == "b 2"));
        assert!(rows[1..].iter().all(|r| r.lipid_polygon.is_some()));
        assert!(rows[1..].iter().all(|r| r.prosome_polygon.is_none()));
    }

    #[test]
    fn object_without_annotations_is_kept_empty() {
        let classification = vec![class("z 9", "Calanus<lateral<civstage")];
        let rows = merge_annotations(&classification, &[], &[], &MergeConfig::default());
        assert_eq!(rows.len(), 1);
        assert!(rows[0].lipid_polygon.is_none());
        assert!(rows[0].prosome_polygon.is_none());
    }
}
