use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontRef, PxScale};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use lm_core::{Mask, Point2, Polygon, polygon_mask};
use lm_dataset::{
    CalibrationRow, ClassificationRow, Delimiter, FeatureTableConfig, LipidAnnotationRow,
    MergeConfig, MergedRow, ProsomeAnnotationRow, SkippedObject, SummaryTable,
    build_feature_table, decode_prosome_polygon, decode_row, exclude_dates, merge_annotations,
    read_rows_from_path, write_rows_to_path, write_summary,
};
use lm_morph::constants::PIXEL_SIZE_MM;
use lm_morph::{Axis, MorphConfig, ObjectFeatures, compute_object_features};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "lipidmorph")]
#[command(about = "Copepod lipid sac and prosome morphometry from polygon annotations")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Link classifications with lipid and prosome annotations
    #[command(name = "merge")]
    Merge(MergeArgs),
    /// Compute morphometric and lipid features for merged objects
    #[command(name = "features")]
    Features(FeaturesArgs),
    /// Reduce a feature table to the calibration columns
    #[command(name = "calibration")]
    Calibration(CalibrationArgs),
    /// Count objects per sampling date and category
    #[command(name = "summary")]
    Summary(SummaryArgs),
    /// Render annotation masks and axes for visual checks
    #[command(name = "overlay")]
    Overlay(OverlayArgs),
}

#[derive(Args, Debug, Clone)]
struct MergeArgs {
    /// EcoTaxa export (`.tsv` is read tab-separated)
    #[arg(long, required = true)]
    classification: PathBuf,
    /// Lipid sac segmentation table (`;`-separated)
    #[arg(long, required = true)]
    lipids: PathBuf,
    /// Label Studio prosome exports; repeat for several annotators
    #[arg(long, required = true, num_args = 1..)]
    prosome: Vec<PathBuf>,
    #[arg(long, required = true)]
    out: PathBuf,
    /// Terms every kept category must contain (default: calanus, lateral)
    #[arg(long)]
    include: Vec<String>,
    /// Terms no kept category may contain (default: ciiistage)
    #[arg(long)]
    exclude: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct FeaturesArgs {
    /// Merged table written by `merge`
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, required = true)]
    out: PathBuf,
    /// Second output without the rows of `--exclude-date`
    #[arg(long)]
    filtered_out: Option<PathBuf>,
    #[arg(long)]
    exclude_date: Vec<String>,
    #[arg(long, default_value_t = PIXEL_SIZE_MM)]
    pixel_size_mm: f64,
    /// Skip objects with undecodable or degenerate polygons instead of failing
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,
    /// Where to write run metadata as JSON
    #[arg(long)]
    meta: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CalibrationArgs {
    /// Feature table written by `features`
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, required = true)]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct SummaryArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, required = true)]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct OverlayArgs {
    /// Merged table written by `merge`
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "masks_with_axes")]
    out_dir: PathBuf,
    /// Folder with the original `<object_id>.jpg` images
    #[arg(long)]
    images: Option<PathBuf>,
    #[arg(long, default_value_t = 10)]
    limit: usize,
    #[arg(long, default_value_t = PIXEL_SIZE_MM)]
    pixel_size_mm: f64,
}

#[derive(Debug, Clone, Serialize)]
struct MetaFeatures {
    input: String,
    config: FeatureTableConfig,
    excluded_dates: Vec<String>,
    rows: usize,
    filtered_rows: Option<usize>,
    skipped: Vec<SkippedObject>,
}

const PROSOME_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LIPID_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const TITLE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const MASK_ALPHA: f32 = 90.0 / 255.0;
const TITLE_ORIGIN: (i32, i32) = (10, 10);
const TITLE_PX: f32 = 12.0;
/// Dash pattern of the axes in pixels: drawn, then skipped.
const DASH_ON: f64 = 4.0;
const DASH_OFF: f64 = 3.0;

static TITLE_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Merge(args) => run_merge(args),
        Command::Features(args) => run_features(args),
        Command::Calibration(args) => run_calibration(args),
        Command::Summary(args) => run_summary(args),
        Command::Overlay(args) => run_overlay(args),
    }
}

fn run_merge(args: MergeArgs) -> Result<()> {
    ensure_file_exists(&args.classification, "classification")?;
    ensure_file_exists(&args.lipids, "lipids")?;

    let classification: Vec<ClassificationRow> = read_rows_from_path(
        &args.classification,
        Delimiter::from_path(&args.classification),
    )
    .with_context(|| format!("reading classification {}", args.classification.display()))?;
    let lipids: Vec<LipidAnnotationRow> = read_rows_from_path(&args.lipids, Delimiter::Semicolon)
        .with_context(|| format!("reading lipid annotations {}", args.lipids.display()))?;

    let mut prosomes: Vec<ProsomeAnnotationRow> = Vec::new();
    for path in &args.prosome {
        ensure_file_exists(path, "prosome")?;
        let rows: Vec<ProsomeAnnotationRow> = read_rows_from_path(path, Delimiter::Comma)
            .with_context(|| format!("reading prosome annotations {}", path.display()))?;
        tracing::info!("{} prosome annotations in {}", rows.len(), path.display());
        prosomes.extend(rows);
    }

    let mut cfg = MergeConfig::default();
    if !args.include.is_empty() {
        cfg.include = args.include;
    }
    if !args.exclude.is_empty() {
        cfg.exclude = args.exclude;
    }

    let merged = merge_annotations(&classification, &lipids, &prosomes, &cfg);
    create_parent_dir(&args.out)?;
    write_rows_to_path(&args.out, &merged)
        .with_context(|| format!("writing merged table {}", args.out.display()))?;
    tracing::info!("{} merged rows written to {}", merged.len(), args.out.display());
    Ok(())
}

fn run_features(args: FeaturesArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;

    let cfg = FeatureTableConfig {
        morph: MorphConfig {
            pixel_size_mm: args.pixel_size_mm,
        },
        skip_invalid: args.skip_invalid,
    };
    cfg.morph.validate().context("checking --pixel-size-mm")?;

    let merged: Vec<MergedRow> = read_rows_from_path(&args.input, Delimiter::Comma)
        .with_context(|| format!("reading merged table {}", args.input.display()))?;
    let table = build_feature_table(&merged, &cfg).context("computing features")?;

    create_parent_dir(&args.out)?;
    write_rows_to_path(&args.out, &table.rows)
        .with_context(|| format!("writing feature table {}", args.out.display()))?;
    tracing::info!("{} feature rows written to {}", table.rows.len(), args.out.display());

    let mut filtered_rows = None;
    if let Some(path) = &args.filtered_out {
        if args.exclude_date.is_empty() {
            tracing::warn!("--filtered-out given without --exclude-date; writing all rows");
        }
        let filtered = exclude_dates(&table.rows, &args.exclude_date);
        create_parent_dir(path)?;
        write_rows_to_path(path, &filtered)
            .with_context(|| format!("writing filtered table {}", path.display()))?;
        tracing::info!("{} filtered rows written to {}", filtered.len(), path.display());
        filtered_rows = Some(filtered.len());
    } else if !args.exclude_date.is_empty() {
        bail!("--exclude-date requires --filtered-out");
    }

    if let Some(meta) = &args.meta {
        write_json(
            meta,
            &MetaFeatures {
                input: args.input.display().to_string(),
                config: cfg,
                excluded_dates: args.exclude_date.clone(),
                rows: table.rows.len(),
                filtered_rows,
                skipped: table.skipped,
            },
        )?;
    }

    Ok(())
}

fn run_calibration(args: CalibrationArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;

    let rows: Vec<CalibrationRow> = read_rows_from_path(&args.input, Delimiter::Comma)
        .with_context(|| format!("reading feature table {}", args.input.display()))?;
    create_parent_dir(&args.out)?;
    write_rows_to_path(&args.out, &rows)
        .with_context(|| format!("writing calibration table {}", args.out.display()))?;
    tracing::info!("{} calibration rows written to {}", rows.len(), args.out.display());
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;

    let rows: Vec<ClassificationRow> = read_rows_from_path(&args.input, Delimiter::Comma)
        .with_context(|| format!("reading feature table {}", args.input.display()))?;
    let summary = SummaryTable::from_rows(&rows);

    create_parent_dir(&args.out)?;
    let file = fs::File::create(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    write_summary(file, &summary)
        .with_context(|| format!("writing summary table {}", args.out.display()))?;
    tracing::info!(
        "{} dates x {} categories written to {}",
        summary.rows.len(),
        summary.categories.len(),
        args.out.display()
    );
    Ok(())
}

fn run_overlay(args: OverlayArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;
    if let Some(dir) = &args.images {
        if !dir.is_dir() {
            bail!("images path is not a directory: {}", dir.display());
        }
    }

    let cfg = MorphConfig {
        pixel_size_mm: args.pixel_size_mm,
    };
    cfg.validate().context("checking --pixel-size-mm")?;

    let merged: Vec<MergedRow> = read_rows_from_path(&args.input, Delimiter::Comma)
        .with_context(|| format!("reading merged table {}", args.input.display()))?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;
    let font = FontRef::try_from_slice(TITLE_FONT).context("loading title font")?;

    let mut rendered = 0;
    for row in &merged {
        if rendered >= args.limit {
            break;
        }
        let Some(objects) =
            decode_row(row).with_context(|| format!("decoding object '{}'", row.object_id))?
        else {
            tracing::warn!("object '{}' lacks an annotation, not rendered", row.object_id);
            continue;
        };
        let features = match compute_object_features(&objects.prosome, &objects.lipid, &cfg) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("object '{}' not rendered: {}", row.object_id, e);
                continue;
            }
        };

        let (width, height) = canvas_size(row)?;
        let mut canvas = match &args.images {
            Some(dir) => load_resized(&dir.join(format!("{}.jpg", row.object_id)), width, height)?,
            None => RgbImage::new(width, height),
        };
        render_object(&mut canvas, &objects.prosome, &objects.lipid, &features)?;
        draw_title(&mut canvas, &font, &row.object_annotation_category);

        let path = args
            .out_dir
            .join(format!("{}_masks.png", row.object_id.replace(' ', "_")));
        canvas
            .save(&path)
            .with_context(|| format!("saving overlay {}", path.display()))?;
        rendered += 1;
    }

    tracing::info!("{} overlays written to {}", rendered, args.out_dir.display());
    Ok(())
}

/// Lipid annotation size, else the prosome's original image size.
fn canvas_size(row: &MergedRow) -> Result<(u32, u32)> {
    if let (Some(w), Some(h)) = (row.shape_x_lipid_polygon, row.shape_y_lipid_polygon) {
        if w > 0 && h > 0 {
            return Ok((w, h));
        }
    }

    let payload = row
        .prosome_polygon
        .as_deref()
        .context("no lipid shape and no prosome annotation")?;
    let ls = decode_prosome_polygon(payload)
        .with_context(|| format!("decoding prosome of '{}'", row.object_id))?;
    Ok((ls.original_width, ls.original_height))
}

fn load_resized(path: &Path, width: u32, height: u32) -> Result<RgbImage> {
    ensure_file_exists(path, "original image")?;
    let img = image::open(path).with_context(|| format!("opening image {}", path.display()))?;
    Ok(image::imageops::resize(&img.to_rgb8(), width, height, FilterType::Triangle))
}

fn render_object(
    canvas: &mut RgbImage,
    prosome: &Polygon,
    lipid: &Polygon,
    features: &ObjectFeatures,
) -> Result<()> {
    let (w, h) = (canvas.width() as usize, canvas.height() as usize);

    let prosome_mask = polygon_mask(prosome, w, h).context("rasterizing prosome")?;
    let lipid_mask = polygon_mask(lipid, w, h).context("rasterizing lipid")?;
    blend_mask(canvas, &prosome_mask, PROSOME_COLOR, MASK_ALPHA);
    blend_mask(canvas, &lipid_mask, LIPID_COLOR, MASK_ALPHA);

    for axis in [&features.prosome.major, &features.prosome.minor] {
        draw_dashed_axis(canvas, axis, PROSOME_COLOR);
    }
    for axis in [&features.lipid.major, &features.lipid.minor] {
        draw_dashed_axis(canvas, axis, LIPID_COLOR);
    }

    Ok(())
}

fn draw_title(canvas: &mut RgbImage, font: &FontRef<'_>, title: &str) {
    let (x, y) = TITLE_ORIGIN;
    draw_text_mut(canvas, TITLE_COLOR, x, y, PxScale::from(TITLE_PX), font, title);
}

/// `end_1` to `end_2` as `DASH_ON` px strokes separated by `DASH_OFF` px gaps.
fn draw_dashed_axis(canvas: &mut RgbImage, axis: &Axis, color: Rgb<u8>) {
    let d = axis.end_2 - axis.end_1;
    let len = d.norm();
    if !len.is_finite() || len == 0.0 {
        return;
    }
    let unit = d.normalize();
    let to_px = |p: Point2| (p.x as f32, p.y as f32);

    let mut s = 0.0;
    while s < len {
        let e = (s + DASH_ON).min(len);
        draw_line_segment_mut(
            canvas,
            to_px(axis.end_1 + unit * s),
            to_px(axis.end_1 + unit * e),
            color,
        );
        s += DASH_ON + DASH_OFF;
    }
}

fn blend_mask(canvas: &mut RgbImage, mask: &Mask, color: Rgb<u8>, alpha: f32) {
    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let set = mask
            .get(x as usize, y as usize)
            .is_some_and(|&v| v != 0);
        if !set {
            continue;
        }
        for c in 0..3 {
            let blended = px[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
            px[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    create_parent_dir(path)?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn create_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display())),
        _ => Ok(()),
    }
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ab_glyph::FontRef;
    use image::{Rgb, RgbImage};
    use lm_core::{Mask, Point2};
    use lm_dataset::MergedRow;
    use lm_morph::Axis;

    use super::{
        LIPID_COLOR, MASK_ALPHA, PROSOME_COLOR, TITLE_FONT, blend_mask, canvas_size,
        draw_dashed_axis, draw_title,
    };

    const PROSOME: &str = r#"[{"points": [[10, 20], [60, 20], [60, 40]],
        "original_width": 640, "original_height": 480}]"#;

    fn row(shape: Option<(u32, u32)>, prosome: Option<&str>) -> MergedRow {
        MergedRow {
            object_id: "20130812 101530 000001 001".to_owned(),
            shape_x_lipid_polygon: shape.map(|s| s.0),
            shape_y_lipid_polygon: shape.map(|s| s.1),
            prosome_polygon: prosome.map(str::to_owned),
            ..MergedRow::default()
        }
    }

    #[test]
    fn blend_mixes_only_masked_pixels() {
        let mut canvas = RgbImage::from_pixel(2, 1, Rgb([100, 50, 200]));
        let mut mask = Mask::new_fill(2, 1, 0u8).expect("mask");
        mask.set(0, 0, 1).expect("in bounds");

        blend_mask(&mut canvas, &mask, LIPID_COLOR, MASK_ALPHA);

        let mix = |px: u8, c: u8| {
            (px as f32 * (1.0 - MASK_ALPHA) + c as f32 * MASK_ALPHA).round() as u8
        };
        assert_eq!(
            canvas.get_pixel(0, 0),
            &Rgb([mix(100, 0), mix(50, 0), mix(200, 255)])
        );
        assert_eq!(canvas.get_pixel(1, 0), &Rgb([100, 50, 200]));
    }

    #[test]
    fn canvas_prefers_lipid_shape_then_prosome_size() {
        assert_eq!(
            canvas_size(&row(Some((400, 300)), Some(PROSOME))).expect("size"),
            (400, 300)
        );
        assert_eq!(
            canvas_size(&row(None, Some(PROSOME))).expect("size"),
            (640, 480)
        );
        assert_eq!(
            canvas_size(&row(Some((0, 300)), Some(PROSOME))).expect("size"),
            (640, 480)
        );
        assert!(canvas_size(&row(None, None)).is_err());
    }

    #[test]
    fn axis_is_drawn_dashed() {
        let mut canvas = RgbImage::new(20, 3);
        let axis = Axis {
            end_1: Point2::new(0.0, 1.0),
            end_2: Point2::new(19.0, 1.0),
            length_mm: 19.0,
        };
        draw_dashed_axis(&mut canvas, &axis, PROSOME_COLOR);

        assert_eq!(canvas.get_pixel(0, 1), &PROSOME_COLOR);
        assert_eq!(canvas.get_pixel(4, 1), &PROSOME_COLOR);
        assert_eq!(canvas.get_pixel(5, 1), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(6, 1), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(8, 1), &PROSOME_COLOR);
        assert!(canvas.rows().next().is_some_and(|mut r| r.all(|p| p == &Rgb([0, 0, 0]))));
    }

    #[test]
    fn zero_length_axis_draws_nothing() {
        let mut canvas = RgbImage::new(4, 4);
        let p = Point2::new(2.0, 2.0);
        let axis = Axis {
            end_1: p,
            end_2: p,
            length_mm: 0.0,
        };
        draw_dashed_axis(&mut canvas, &axis, LIPID_COLOR);
        assert!(canvas.pixels().all(|px| px == &Rgb([0, 0, 0])));
    }

    #[test]
    fn title_is_written_near_the_top_left() {
        let font = FontRef::try_from_slice(TITLE_FONT).expect("bundled font");
        let mut canvas = RgbImage::new(200, 40);
        draw_title(&mut canvas, &font, "Calanus hyperboreus<lateral<cvstage");

        let inked = canvas
            .enumerate_pixels()
            .filter(|(_, _, px)| px[0] > 0)
            .map(|(x, y, _)| (x, y))
            .collect::<Vec<_>>();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|&(x, y)| x >= 9 && y >= 9));
    }
}
