mod common;

use cetsbridge_core::{
    ConvertError, ConvertOptions, CoordinateTransformation, CtfBySeries, CtfConverter, CtfRecord,
    MatrixPolicy, MissingImageMeta, TiltSeriesConverter,
};
use common::{
    build_store, classes_table, data_table, insert_row, integer, project_store, real, text,
    FixedImageMeta,
};
use rusqlite::Connection;

const TS_CLASS_PAIRS: &[(&str, &str)] = &[
    ("_tsId", "t01"),
    ("_filename", "t02"),
    ("_index", "t03"),
    ("_acqOrder", "t04"),
    ("_tiltAngle", "t05"),
    ("_acquisition._accumDose", "t06"),
    ("_transform._matrix", "t07"),
    ("_oddEvenFileNames", "t08"),
];

const TS_DATA_COLS: &[&str] = &["t01", "t02", "t03", "t04", "t05", "t06", "t07", "t08"];

fn master_tables(conn: &Connection, series: &[(&str, i64)]) {
    classes_table(
        conn,
        "Classes",
        &[("_tsId", "c01"), ("_ctfCorrected", "c02")],
    );
    data_table(conn, "Objects", &["c01", "c02"]);
    for (ts_id, ctf_corrected) in series {
        insert_row(
            conn,
            "Objects",
            &["c01", "c02"],
            vec![text(ts_id), integer(*ctf_corrected)],
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn tilt_image_row(
    conn: &Connection,
    table: &str,
    ts_id: &str,
    filename: &str,
    section: i64,
    acq_order: i64,
    angle: f64,
    dose: f64,
    matrix: &str,
    odd_even: &str,
) {
    insert_row(
        conn,
        table,
        TS_DATA_COLS,
        vec![
            text(ts_id),
            text(filename),
            integer(section),
            integer(acq_order),
            real(angle),
            real(dose),
            text(matrix),
            text(odd_even),
        ],
    );
}

#[test]
fn end_to_end_with_ctf_store() {
    let (project, ts_path) = project_store("tiltseries.sqlite");
    build_store(&ts_path, |conn| {
        master_tables(conn, &[("TS1", 1)]);
        classes_table(conn, "TS1_Classes", TS_CLASS_PAIRS);
        data_table(conn, "TS1_Objects", TS_DATA_COLS);
        tilt_image_row(
            conn,
            "TS1_Objects",
            "TS1",
            "Runs/ts/img1.mrc",
            1,
            1,
            -60.0,
            1.2,
            "[[1, 0, 5], [0, 1, 7], [0, 0, 1]]",
            "img1_odd.mrc,img1_even.mrc",
        );
        tilt_image_row(
            conn,
            "TS1_Objects",
            "TS1",
            "Runs/ts/img2.mrc",
            2,
            2,
            -57.0,
            2.4,
            "[[0, -1, 2.5], [1, 0, -3.5], [0, 0, 1]]",
            "img2_odd.mrc,img2_even.mrc",
        );
    });

    let ctf_path = ts_path.with_file_name("ctftomoseries.sqlite");
    build_store(&ctf_path, |conn| {
        classes_table(conn, "Classes", &[("_tsId", "c01")]);
        data_table(conn, "Objects", &["c01"]);
        insert_row(conn, "Objects", &["c01"], vec![text("TS1")]);
        classes_table(
            conn,
            "id1_Classes",
            &[
                ("_defocusU", "d01"),
                ("_defocusV", "d02"),
                ("_defocusAngle", "d03"),
                ("_phaseShift", "d04"),
                ("_acqOrder", "d05"),
            ],
        );
        data_table(conn, "id1_Objects", &["d01", "d02", "d03", "d04", "d05"]);
        insert_row(
            conn,
            "id1_Objects",
            &["d01", "d02", "d03", "d04", "d05"],
            vec![real(12000.0), real(11800.0), real(45.0), real(0.0), integer(1)],
        );
        insert_row(
            conn,
            "id1_Objects",
            &["d01", "d02", "d03", "d04", "d05"],
            vec![real(13000.0), real(12700.0), real(44.0), real(0.1), integer(2)],
        );
    });

    let ctf_map = CtfConverter::new(&ctf_path).unwrap().convert().unwrap();
    assert_eq!(ctf_map.len(), 1);

    let image_meta = FixedImageMeta(4096, 4096, 1);
    let series_list = TiltSeriesConverter::new(&ts_path, &image_meta)
        .unwrap()
        .convert(Some(&ctf_map))
        .unwrap();

    assert_eq!(series_list.len(), 1);
    let series = &series_list[0];
    assert_eq!(series.ts_id, "TS1");
    assert_eq!(series.ctf_corrected, Some(true));
    assert_eq!(series.images.len(), 2);

    // The converter canonicalizes the store path before deriving the root.
    let expected_last = std::fs::canonicalize(project.path())
        .unwrap()
        .join("Runs/ts/img2.mrc")
        .to_string_lossy()
        .into_owned();
    assert_eq!(series.path.as_deref(), Some(expected_last.as_str()));
    assert_eq!(series.images[1].path.as_deref(), Some(expected_last.as_str()));

    let first = &series.images[0];
    assert_eq!(first.ts_id.as_deref(), Some("TS1"));
    assert_eq!(first.section, Some(1));
    assert_eq!(first.acquisition_order, Some(1));
    assert_eq!(first.nominal_tilt_angle, Some(-60.0));
    assert_eq!(first.accumulated_dose, Some(1.2));
    assert_eq!(first.width, Some(4096));
    assert_eq!(first.height, Some(4096));
    assert_eq!(first.even_path.as_deref(), Some("img1_even.mrc"));
    assert_eq!(first.odd_path.as_deref(), Some("img1_odd.mrc"));

    assert_eq!(first.coordinate_transformations.len(), 2);
    match &first.coordinate_transformations[0] {
        CoordinateTransformation::Translation(translation) => {
            assert_eq!(translation.translation, [5.0, 7.0, 0.0]);
            assert_eq!(translation.input, "Tilt-image");
        }
        other => panic!("expected translation first, got {other:?}"),
    }
    match &first.coordinate_transformations[1] {
        CoordinateTransformation::Affine(affine) => {
            assert_eq!(
                affine.affine,
                [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
            );
        }
        other => panic!("expected affine second, got {other:?}"),
    }

    let second = &series.images[1];
    match &second.coordinate_transformations[1] {
        CoordinateTransformation::Affine(affine) => {
            assert_eq!(
                affine.affine,
                [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]
            );
        }
        other => panic!("expected affine second, got {other:?}"),
    }

    // Positional attachment: image j carries record j of its series.
    assert_eq!(first.ctf.as_ref().unwrap().defocus_u, Some(12000.0));
    assert_eq!(second.ctf.as_ref().unwrap().defocus_u, Some(13000.0));
    assert_eq!(second.ctf.as_ref().unwrap().acquisition_order, Some(2));
}

#[test]
fn ctf_attachment_is_positional_and_per_series() {
    let (_project, ts_path) = project_store("tiltseries.sqlite");
    build_store(&ts_path, |conn| {
        master_tables(conn, &[("TS1", 0), ("TS2", 0)]);
        classes_table(conn, "TS1_Classes", TS_CLASS_PAIRS);
        data_table(conn, "TS1_Objects", TS_DATA_COLS);
        data_table(conn, "TS2_Objects", TS_DATA_COLS);
        for section in 1..=3 {
            tilt_image_row(
                conn,
                "TS1_Objects",
                "TS1",
                &format!("Runs/ts/a{section}.mrc"),
                section,
                section,
                0.0,
                0.0,
                "[[1, 0, 0], [0, 1, 0], [0, 0, 1]]",
                "",
            );
        }
        for section in 1..=2 {
            tilt_image_row(
                conn,
                "TS2_Objects",
                "TS2",
                &format!("Runs/ts/b{section}.mrc"),
                section,
                section,
                0.0,
                0.0,
                "[[1, 0, 0], [0, 1, 0], [0, 0, 1]]",
                "",
            );
        }
    });

    let record = |defocus: f64| CtfRecord {
        defocus_u: Some(defocus),
        ..CtfRecord::default()
    };
    let mut ctf_map = CtfBySeries::new();
    ctf_map.insert(
        "TS1".to_string(),
        vec![record(1.0), record(2.0), record(3.0)],
    );

    let series_list = TiltSeriesConverter::new(&ts_path, &MissingImageMeta)
        .unwrap()
        .convert(Some(&ctf_map))
        .unwrap();

    let ts1 = series_list.iter().find(|s| s.ts_id == "TS1").unwrap();
    let defoci: Vec<Option<f64>> = ts1
        .images
        .iter()
        .map(|image| image.ctf.as_ref().and_then(|ctf| ctf.defocus_u))
        .collect();
    assert_eq!(defoci, vec![Some(1.0), Some(2.0), Some(3.0)]);

    // TS2 is absent from the mapping: nothing attaches.
    let ts2 = series_list.iter().find(|s| s.ts_id == "TS2").unwrap();
    assert!(ts2.images.iter().all(|image| image.ctf.is_none()));
}

#[test]
fn ctf_list_shorter_than_series_attaches_prefix_only() {
    let (_project, ts_path) = project_store("tiltseries.sqlite");
    build_store(&ts_path, |conn| {
        master_tables(conn, &[("TS1", 0)]);
        classes_table(conn, "TS1_Classes", TS_CLASS_PAIRS);
        data_table(conn, "TS1_Objects", TS_DATA_COLS);
        for section in 1..=2 {
            tilt_image_row(
                conn,
                "TS1_Objects",
                "TS1",
                &format!("Runs/ts/a{section}.mrc"),
                section,
                section,
                0.0,
                0.0,
                "[[1, 0, 0], [0, 1, 0], [0, 0, 1]]",
                "",
            );
        }
    });

    let mut ctf_map = CtfBySeries::new();
    ctf_map.insert(
        "TS1".to_string(),
        vec![CtfRecord {
            defocus_u: Some(9.0),
            ..CtfRecord::default()
        }],
    );

    let series_list = TiltSeriesConverter::new(&ts_path, &MissingImageMeta)
        .unwrap()
        .convert(Some(&ctf_map))
        .unwrap();

    let images = &series_list[0].images;
    assert_eq!(
        images[0].ctf.as_ref().and_then(|ctf| ctf.defocus_u),
        Some(9.0)
    );
    assert!(images[1].ctf.is_none());
}

#[test]
fn malformed_matrix_aborts_by_default() {
    let (_project, ts_path) = project_store("tiltseries.sqlite");
    build_store(&ts_path, |conn| {
        master_tables(conn, &[("TS1", 0)]);
        classes_table(conn, "TS1_Classes", TS_CLASS_PAIRS);
        data_table(conn, "TS1_Objects", TS_DATA_COLS);
        tilt_image_row(
            conn,
            "TS1_Objects",
            "TS1",
            "Runs/ts/a1.mrc",
            1,
            1,
            0.0,
            0.0,
            "[[not a matrix",
            "",
        );
    });

    let err = TiltSeriesConverter::new(&ts_path, &MissingImageMeta)
        .unwrap()
        .convert(None)
        .unwrap_err();
    assert!(matches!(err, ConvertError::Geometry(_)));
}

#[test]
fn malformed_matrix_can_skip_the_record() {
    let (_project, ts_path) = project_store("tiltseries.sqlite");
    build_store(&ts_path, |conn| {
        master_tables(conn, &[("TS1", 0)]);
        classes_table(conn, "TS1_Classes", TS_CLASS_PAIRS);
        data_table(conn, "TS1_Objects", TS_DATA_COLS);
        tilt_image_row(
            conn,
            "TS1_Objects",
            "TS1",
            "Runs/ts/a1.mrc",
            1,
            1,
            0.0,
            0.0,
            "[[1, 0, 0], [0, 1, 0], [0, 0, 1]]",
            "",
        );
        tilt_image_row(
            conn,
            "TS1_Objects",
            "TS1",
            "Runs/ts/a2.mrc",
            2,
            2,
            0.0,
            0.0,
            "[[not a matrix",
            "",
        );
    });

    let options = ConvertOptions {
        matrix_policy: MatrixPolicy::SkipRecord,
    };
    let series_list = TiltSeriesConverter::new(&ts_path, &MissingImageMeta)
        .unwrap()
        .with_options(options)
        .convert(None)
        .unwrap();

    assert_eq!(series_list[0].images.len(), 1);
    assert_eq!(series_list[0].images[0].section, Some(1));
}

#[test]
fn master_row_without_ts_id_is_fatal() {
    let (_project, ts_path) = project_store("tiltseries.sqlite");
    build_store(&ts_path, |conn| {
        // Master schema carries no `_tsId` mapping at all.
        classes_table(conn, "Classes", &[("_ctfCorrected", "c02")]);
        data_table(conn, "Objects", &["c02"]);
        insert_row(conn, "Objects", &["c02"], vec![integer(1)]);
    });

    let err = TiltSeriesConverter::new(&ts_path, &MissingImageMeta)
        .unwrap()
        .convert(None)
        .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::MissingField { field: "_tsId", .. }
    ));
}

#[test]
fn series_with_no_images_is_invalid() {
    let (_project, ts_path) = project_store("tiltseries.sqlite");
    build_store(&ts_path, |conn| {
        master_tables(conn, &[("TS1", 0)]);
        classes_table(conn, "TS1_Classes", TS_CLASS_PAIRS);
        data_table(conn, "TS1_Objects", TS_DATA_COLS);
    });

    let err = TiltSeriesConverter::new(&ts_path, &MissingImageMeta)
        .unwrap()
        .convert(None)
        .unwrap_err();
    assert!(matches!(err, ConvertError::InvalidData(_)));
}

#[test]
fn store_without_series_converts_to_nothing() {
    let (_project, ts_path) = project_store("tiltseries.sqlite");
    build_store(&ts_path, |conn| {
        master_tables(conn, &[]);
    });

    let series_list = TiltSeriesConverter::new(&ts_path, &MissingImageMeta)
        .unwrap()
        .convert(None)
        .unwrap();
    assert!(series_list.is_empty());
}
