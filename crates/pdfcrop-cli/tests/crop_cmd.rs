//! Integration tests for the `crop` subcommand.

mod common;

use common::{assert_box_approx, cmd, crop_boxes, pdf_with_pages, write_temp_pdf};
use predicates::prelude::*;

const DRAWING: &[u8] = b"100 200 300 100 re f";

fn output_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join("out.pdf")
}

#[test]
fn default_margin_writes_media_sized_crop_boxes() {
    let input = write_temp_pdf(&pdf_with_pages(&[DRAWING]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("page 1:"));

    let boxes = crop_boxes(&out);
    assert_box_approx(boxes[0].unwrap(), [0.0, 0.0, 612.0, 792.0]);
}

#[test]
fn margin_percent() {
    let input = write_temp_pdf(&pdf_with_pages(&[b""]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--margin", "10%"])
        .assert()
        .success();

    assert_box_approx(crop_boxes(&out)[0].unwrap(), [61.2, 79.2, 550.8, 712.8]);
}

#[test]
fn bbox_with_padding() {
    let input = write_temp_pdf(&pdf_with_pages(&[DRAWING, b"50 50 10 10 re f"]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--bbox", "--padding", "5"])
        .assert()
        .success();

    let boxes = crop_boxes(&out);
    assert_box_approx(boxes[0].unwrap(), [95.0, 195.0, 405.0, 305.0]);
    assert_box_approx(boxes[1].unwrap(), [45.0, 45.0, 65.0, 65.0]);
}

#[test]
fn text_bbox_ignores_drawing() {
    let content: &[u8] = b"0 0 612 792 re f BT /F1 10 Tf 72 700 Td (A) Tj ET";
    let input = write_temp_pdf(&pdf_with_pages(&[content]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .arg("--text-bbox")
        .assert()
        .success();

    assert_box_approx(crop_boxes(&out)[0].unwrap(), [72.0, 697.93, 78.67, 707.18]);
}

#[test]
fn raster_bbox() {
    let input = write_temp_pdf(&pdf_with_pages(&[DRAWING]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .arg("--raster-bbox")
        .assert()
        .success();

    assert_box_approx(crop_boxes(&out)[0].unwrap(), [100.0, 200.0, 400.0, 300.0]);
}

#[test]
fn pages_and_parity_limit_written_pages() {
    let input = write_temp_pdf(&pdf_with_pages(&[DRAWING, DRAWING, DRAWING, DRAWING]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--bbox", "--pages", "2-", "--even"])
        .assert()
        .success();

    let boxes = crop_boxes(&out);
    assert_eq!(boxes[0], None);
    assert!(boxes[1].is_some());
    assert_eq!(boxes[2], None);
    assert!(boxes[3].is_some());
}

#[test]
fn flip_mirrors_margins_on_even_pages() {
    let input = write_temp_pdf(&pdf_with_pages(&[b"", b""]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--margin", "0,0,0,72", "--flip"])
        .assert()
        .success();

    let boxes = crop_boxes(&out);
    assert_box_approx(boxes[0].unwrap(), [72.0, 0.0, 612.0, 792.0]);
    assert_box_approx(boxes[1].unwrap(), [0.0, 0.0, 540.0, 792.0]);
}

#[test]
fn even_margin_replaces_strategy_on_even_pages() {
    let input = write_temp_pdf(&pdf_with_pages(&[DRAWING, DRAWING]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--bbox", "--even-margin", "36"])
        .assert()
        .success();

    let boxes = crop_boxes(&out);
    assert_box_approx(boxes[0].unwrap(), [100.0, 200.0, 400.0, 300.0]);
    assert_box_approx(boxes[1].unwrap(), [36.0, 36.0, 576.0, 756.0]);
}

#[test]
fn aspect_square() {
    let input = write_temp_pdf(&pdf_with_pages(&[DRAWING]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--bbox", "--aspect", "1:1"])
        .assert()
        .success();

    // 300x100 grows to 300x300 keeping its top edge
    assert_box_approx(crop_boxes(&out)[0].unwrap(), [100.0, 0.0, 400.0, 300.0]);
}

#[test]
fn dry_run_writes_nothing() {
    let input = write_temp_pdf(&pdf_with_pages(&[DRAWING]));
    let dir = tempfile::tempdir().unwrap();
    let out = output_path(&dir);

    cmd()
        .args(["crop", input.path().to_str().unwrap(), "--dry-run", "--bbox"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "page 1: media 0.00 0.00 612.00 792.00 crop 100.00 200.00 400.00 300.00",
        ));

    assert!(!out.exists());
    assert_eq!(crop_boxes(input.path()), vec![None]);
}

#[test]
fn json_output() {
    let input = write_temp_pdf(&pdf_with_pages(&[DRAWING, b""]));

    let output = cmd()
        .args(["crop", input.path().to_str().unwrap(), "--dry-run", "--bbox"])
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["page_count"], 2);
    assert_eq!(plan["pages"][0]["page"], 1);
    assert_eq!(plan["pages"][0]["crop_box"]["min_x"], 100.0);
    // blank page keeps its media box
    assert_eq!(plan["pages"][1]["crop_box"]["max_y"], 792.0);
}
