mod common;

use cetsbridge_core::{
    ConvertError, ConvertOptions, CoordinateConverter, MatrixPolicy, MissingImageMeta,
    SubtomogramConverter,
};
use common::{build_store, classes_table, data_table, insert_row, project_store, real, text};

#[test]
fn coordinates_without_orientation_mapping_are_points_only() {
    let (_project, coord_path) = project_store("coordinates.sqlite");
    build_store(&coord_path, |conn| {
        // Scope carries no `_eulerMatrix` mapping at all.
        classes_table(
            conn,
            "Classes",
            &[("_tomoId", "k01"), ("_x", "k02"), ("_y", "k03"), ("_z", "k04")],
        );
        data_table(conn, "Objects", &["k01", "k02", "k03", "k04"]);
        insert_row(
            conn,
            "Objects",
            &["k01", "k02", "k03", "k04"],
            vec![text("TOMO1"), real(1.0), real(2.0), real(3.0)],
        );
    });

    let coords = CoordinateConverter::new(&coord_path)
        .unwrap()
        .convert_for("TOMO1")
        .unwrap();

    assert_eq!(coords.len(), 1);
    assert_eq!(coords[0].position, [Some(1.0), Some(2.0), Some(3.0)]);
    assert!(coords[0].orientation.is_none());
}

#[test]
fn malformed_orientation_matrix_follows_policy() {
    let (_project, coord_path) = project_store("coordinates.sqlite");
    build_store(&coord_path, |conn| {
        classes_table(
            conn,
            "Classes",
            &[
                ("_tomoId", "k01"),
                ("_x", "k02"),
                ("_y", "k03"),
                ("_z", "k04"),
                ("_eulerMatrix", "k05"),
            ],
        );
        let cols = &["k01", "k02", "k03", "k04", "k05"];
        data_table(conn, "Objects", cols);
        insert_row(
            conn,
            "Objects",
            cols,
            vec![text("TOMO1"), real(1.0), real(2.0), real(3.0), text("nonsense")],
        );
        insert_row(
            conn,
            "Objects",
            cols,
            vec![
                text("TOMO1"),
                real(4.0),
                real(5.0),
                real(6.0),
                text("[[1, 0, 0], [0, 1, 0], [0, 0, 1]]"),
            ],
        );
    });

    let err = CoordinateConverter::new(&coord_path)
        .unwrap()
        .convert_for("TOMO1")
        .unwrap_err();
    assert!(matches!(err, ConvertError::Geometry(_)));

    let coords = CoordinateConverter::new(&coord_path)
        .unwrap()
        .with_options(ConvertOptions {
            matrix_policy: MatrixPolicy::SkipRecord,
        })
        .convert_for("TOMO1")
        .unwrap();
    assert_eq!(coords.len(), 1);
    assert_eq!(coords[0].position, [Some(4.0), Some(5.0), Some(6.0)]);
}

#[test]
fn subtomogram_with_single_matrix_keeps_order_slot() {
    let (_project, subtomo_path) = project_store("subtomograms.sqlite");
    build_store(&subtomo_path, |conn| {
        // Refined alignment only; the picking orientation was never stored.
        classes_table(
            conn,
            "Classes",
            &[
                ("_tomoId", "s01"),
                ("_filename", "s02"),
                ("_transform._matrix", "s03"),
            ],
        );
        data_table(conn, "Objects", &["s01", "s02", "s03"]);
        insert_row(
            conn,
            "Objects",
            &["s01", "s02", "s03"],
            vec![
                text("TOMO1"),
                text("Runs/extract/p1.mrc"),
                text("[[0, 1, 0], [-1, 0, 0], [0, 0, 1]]"),
            ],
        );
    });

    let subtomos = SubtomogramConverter::new(&subtomo_path, &MissingImageMeta)
        .unwrap()
        .convert_for("TOMO1")
        .unwrap();

    assert_eq!(subtomos.len(), 1);
    assert_eq!(subtomos[0].coordinate_transformations.len(), 1);
    match &subtomos[0].coordinate_transformations[0] {
        cetsbridge_core::CoordinateTransformation::Affine(affine) => {
            assert_eq!(affine.name, "Subtomogram orientation");
        }
        other => panic!("expected affine, got {other:?}"),
    }
}

#[test]
fn filter_scopes_rows_to_the_requested_tomogram() {
    let (_project, subtomo_path) = project_store("subtomograms.sqlite");
    build_store(&subtomo_path, |conn| {
        classes_table(
            conn,
            "Classes",
            &[("_tomoId", "s01"), ("_filename", "s02")],
        );
        data_table(conn, "Objects", &["s01", "s02"]);
        insert_row(
            conn,
            "Objects",
            &["s01", "s02"],
            vec![text("TOMO1"), text("Runs/extract/p1.mrc")],
        );
        insert_row(
            conn,
            "Objects",
            &["s01", "s02"],
            vec![text("TOMO2"), text("Runs/extract/p2.mrc")],
        );
    });

    let converter = SubtomogramConverter::new(&subtomo_path, &MissingImageMeta).unwrap();
    assert_eq!(converter.convert_for("TOMO1").unwrap().len(), 1);
    assert_eq!(converter.convert_for("TOMO2").unwrap().len(), 1);
    assert!(converter.convert_for("TOMO9").unwrap().is_empty());
}
