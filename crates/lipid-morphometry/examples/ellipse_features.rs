//! Example: features of a synthetic prosome/lipid pair.
//!
//! Both outlines are sampled ellipses, so the printed axes and areas can be
//! checked against the closed-form values.
//!
//! Run from the workspace root:
//!   cargo run -p lipid-morphometry --example ellipse_features

use std::f64::consts::PI;

use lipid_morphometry::{MorphConfig, Point2, Polygon, compute_object_features};

fn ellipse(center: Point2, a: f64, b: f64, n: usize) -> Polygon {
    Polygon::new(
        (0..n)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / n as f64;
                Point2::new(center.x + a * t.cos(), center.y + b * t.sin())
            })
            .collect(),
    )
}

fn main() {
    let cfg = MorphConfig::default();
    let prosome = ellipse(Point2::new(320.0, 240.0), 150.0, 45.0, 256);
    let lipid = ellipse(Point2::new(300.0, 240.0), 70.0, 20.0, 128);

    let f = match compute_object_features(&prosome, &lipid, &cfg) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("feature extraction failed: {e}");
            std::process::exit(1);
        }
    };

    let px = cfg.pixel_size_mm;
    println!("pixel size          {px} mm");
    println!(
        "prosome  area {:.4} mm2 (ellipse {:.4})  major {:.3} mm  minor {:.3} mm  volume {:.4} mm3",
        f.prosome.area_mm2,
        PI * 150.0 * 45.0 * px * px,
        f.prosome.major.length_mm,
        f.prosome.minor.length_mm,
        f.prosome.volume_mm3,
    );
    println!(
        "lipid    area {:.4} mm2 (ellipse {:.4})  major {:.3} mm  minor {:.3} mm  volume {:.4} mm3",
        f.lipid.area_mm2,
        PI * 70.0 * 20.0 * px * px,
        f.lipid.major.length_mm,
        f.lipid.minor.length_mm,
        f.lipid.volume_mm3,
    );
    println!(
        "lipids   {:.5} mg  {:.2} ugC",
        f.lipid_content.mass_mg, f.lipid_content.carbon_ug
    );
    println!(
        "fullness area {:.3}  carbon/area {:.3}  carbon/volume {:.3}",
        f.fullness.ratio_area, f.fullness.ratio_carbon_area, f.fullness.ratio_carbon_volume
    );
}
