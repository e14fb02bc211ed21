use approx::assert_relative_eq;
use lipid_morphometry::{
    CalibrationRow, ClassificationRow, Delimiter, FeatureRow, FeatureTableConfig,
    LipidAnnotationRow, MergeConfig, MergedRow, MorphConfig, Polygon, ProsomeAnnotationRow,
    SummaryTable, build_feature_table, compute_object_features, decode_prosome_polygon,
    merge_annotations, polygon_area_px2, polygon_mask, read_rows, write_rows,
};

const CLASSIFICATION_TSV: &str = "\
object_id\tobject_lat\tobject_date\tobject_annotation_category
20130812 101530 000001 001\t78.9\t2013-08-12\tCalanus hyperboreus<lateral<cvstage
20130812 101530 000001 002\t78.9\t2013-08-12\tCalanus hyperboreus<dorsal<cvstage
20130816 093000 000002 001\t79.1\t2013-08-16\tCalanus glacialis<lateral<female
";

const LIPIDS_SSV: &str = "\
filename;segmentation;shape;shape_y;shape_x
20130812 101530 000001 001.bmp;\"[[[100, 100], [140, 100], [140, 120], [100, 120]]]\";(300, 400);300;400
20130812 101530 000001 002.bmp;\"[[[0, 0], [10, 0], [10, 10]]]\";(300, 400);300;400
20130816 093000 000002 001.bmp;\"[[[50, 50], [60, 50], [60, 60], [50, 60]]]\";(300, 400);300.0;400.0
";

const PROSOME_CSV: &str = r#"image,label
/data/upload/3/8a1b2c-20130812_101530_000001_001.bmp,"[{""points"": [[10, 20], [60, 20], [60, 40], [10, 40]], ""polygonlabels"": [""prosome""], ""original_width"": 400, ""original_height"": 300}]"
/data/upload/3/77ee01-20130812_101530_000001_002.bmp,"[{""points"": [[1, 1], [5, 1], [5, 5]], ""original_width"": 400, ""original_height"": 300}]"
"#;

fn merged_fixture() -> Vec<MergedRow> {
    let classification: Vec<ClassificationRow> =
        read_rows(CLASSIFICATION_TSV.as_bytes(), Delimiter::Tab).expect("classification");
    let lipids: Vec<LipidAnnotationRow> =
        read_rows(LIPIDS_SSV.as_bytes(), Delimiter::Semicolon).expect("lipids");
    let prosomes: Vec<ProsomeAnnotationRow> =
        read_rows(PROSOME_CSV.as_bytes(), Delimiter::Comma).expect("prosomes");

    merge_annotations(&classification, &lipids, &prosomes, &MergeConfig::default())
}

#[test]
fn merge_selects_lateral_calanus_and_links_annotations() {
    let merged = merged_fixture();

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].object_id, "20130812 101530 000001 001");
    assert!(merged[0].lipid_polygon.is_some());
    assert!(merged[0].prosome_polygon.is_some());
    assert_eq!(merged[0].shape_x_lipid_polygon, Some(400));

    assert_eq!(merged[1].object_id, "20130816 093000 000002 001");
    assert_eq!(merged[1].shape_y_lipid_polygon, Some(300));
    assert!(merged[1].prosome_polygon.is_none());
}

#[test]
fn merged_table_to_features_to_calibration() {
    let merged = merged_fixture();

    // Through CSV text, as between the `merge` and `features` steps.
    let mut buf = Vec::new();
    write_rows(&mut buf, &merged).expect("write merged");
    let merged: Vec<MergedRow> = read_rows(buf.as_slice(), Delimiter::Comma).expect("read merged");

    let table = build_feature_table(&merged, &FeatureTableConfig::default()).expect("features");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.skipped.len(), 1);
    assert_eq!(table.skipped[0].object_id, "20130816 093000 000002 001");

    let r = &table.rows[0];
    let px2 = 0.023 * 0.023;
    assert_relative_eq!(r.prosome_area_mm2, 12000.0 * px2, max_relative = 1e-12);
    assert_relative_eq!(r.lipid_area_mm2, 800.0 * px2, max_relative = 1e-12);
    assert_relative_eq!(
        r.total_lipids_ug_c,
        0.167 * (800.0 * px2).powf(1.42) * 0.79 * 1000.0,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        r.fullness_ratio_carbon_area,
        r.total_lipids_carbon_area / (r.total_lipids_carbon_area + r.prosome_carbon_area),
        max_relative = 1e-12
    );
    assert!(r.fullness_ratio_carbon_volume > 0.0 && r.fullness_ratio_carbon_volume < 1.0);

    // The calibration view reads straight off the full feature table.
    let mut buf = Vec::new();
    write_rows(&mut buf, &table.rows).expect("write features");
    let text = String::from_utf8(buf.clone()).expect("utf8");
    assert!(text.lines().next().is_some_and(|h| h.contains("total_lipids_ugC")));

    let back: Vec<FeatureRow> = read_rows(buf.as_slice(), Delimiter::Comma).expect("read features");
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].object_id, r.object_id);

    let cal: Vec<CalibrationRow> =
        read_rows(buf.as_slice(), Delimiter::Comma).expect("read calibration");
    assert_eq!(cal, vec![CalibrationRow::from(r)]);

    let summary: Vec<ClassificationRow> =
        read_rows(buf.as_slice(), Delimiter::Comma).expect("read classification view");
    let summary = SummaryTable::from_rows(&summary);
    assert_eq!(
        summary.count("2013-08-12", "Calanus hyperboreus<lateral<cvstage"),
        Some(1)
    );
}

#[test]
fn unit_square_object() {
    let square = Polygon::from_pairs([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    let f = compute_object_features(&square, &square, &MorphConfig::default())
        .expect("unit square");

    assert_relative_eq!(f.prosome.area_mm2, 0.000529, max_relative = 1e-12);
    assert_relative_eq!(
        f.prosome.major.length_mm,
        2f64.sqrt() * 0.023,
        max_relative = 1e-12
    );
    assert_relative_eq!(f.prosome.centroid.x, 0.5);
    assert_relative_eq!(f.prosome.centroid.y, 0.5);
    assert_relative_eq!(
        f.prosome.minor.length_mm,
        4.0 * 0.000529 / (std::f64::consts::PI * 2f64.sqrt() * 0.023),
        max_relative = 1e-12
    );
    assert_relative_eq!(
        f.lipid_content.mass_mg,
        0.167 * 0.000529f64.powf(1.42),
        max_relative = 1e-12
    );
    assert_relative_eq!(f.fullness.ratio_area, 1.0);
    // No prosome tissue left once the lipid is subtracted.
    assert_relative_eq!(f.fullness.ratio_carbon_area, 1.0);
    assert_relative_eq!(f.fullness.ratio_carbon_volume, 1.0);
}

#[test]
fn rasterized_prosome_matches_shoelace_area() {
    let merged = merged_fixture();
    let payload = merged[0].prosome_polygon.as_deref().expect("prosome");
    let ls = decode_prosome_polygon(payload).expect("decodes");

    let mask = polygon_mask(
        &ls.polygon,
        ls.original_width as usize,
        ls.original_height as usize,
    )
    .expect("mask");
    let area = polygon_area_px2(&ls.polygon).expect("area");

    assert_eq!(mask.count_set() as f64, area);
}
