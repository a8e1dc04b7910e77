//! Fixture stores for converter integration tests.
//!
//! Builds real SQLite files laid out like a Scipion project
//! (`<root>/Runs/<protocol>/<store>.sqlite`) so path validation and
//! project-root discovery run against the same shape the converters see in
//! production.
#![allow(dead_code)]

use cetsbridge_core::{ImageInfo, ImageMeta};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a project-shaped temp tree and returns `(root, store_path)`.
/// The store file itself is not created; open it with [`build_store`].
pub fn project_store(file_name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let protocol_dir = dir.path().join("Runs").join("001_Protocol");
    fs::create_dir_all(&protocol_dir).unwrap();
    let store_path = protocol_dir.join(file_name);
    (dir, store_path)
}

/// Opens (creating) a store file and runs the builder against it. The
/// connection closes when the builder returns, before any converter reads.
pub fn build_store(path: &Path, build: impl FnOnce(&Connection)) {
    let conn = Connection::open(path).unwrap();
    build(&conn);
}

/// Creates a classes table holding `(label_property, column_name)` pairs.
pub fn classes_table(conn: &Connection, table: &str, pairs: &[(&str, &str)]) {
    conn.execute_batch(&format!(
        "CREATE TABLE \"{table}\" (label_property TEXT, column_name TEXT);"
    ))
    .unwrap();
    for (label, column) in pairs {
        conn.execute(
            &format!("INSERT INTO \"{table}\" (label_property, column_name) VALUES (?1, ?2);"),
            [label, column],
        )
        .unwrap();
    }
}

/// Creates a data table with untyped columns (the stores rely on SQLite
/// dynamic typing).
pub fn data_table(conn: &Connection, table: &str, columns: &[&str]) {
    let cols = columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute_batch(&format!("CREATE TABLE \"{table}\" ({cols});"))
        .unwrap();
}

/// Inserts one row of typed values.
pub fn insert_row(conn: &Connection, table: &str, columns: &[&str], values: Vec<Value>) {
    let cols = columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=values.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute(
        &format!("INSERT INTO \"{table}\" ({cols}) VALUES ({placeholders});"),
        params_from_iter(values),
    )
    .unwrap();
}

pub fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub fn real(value: f64) -> Value {
    Value::Real(value)
}

pub fn integer(value: i64) -> Value {
    Value::Integer(value)
}

/// Image-header collaborator answering fixed dimensions for every path.
pub struct FixedImageMeta(pub i64, pub i64, pub i64);

impl ImageMeta for FixedImageMeta {
    fn image_info(&self, _path: &Path) -> Option<ImageInfo> {
        Some(ImageInfo {
            size_x: self.0,
            size_y: self.1,
            size_z: self.2,
        })
    }
}
