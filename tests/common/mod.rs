#![allow(dead_code)]

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A scratch directory the binary runs in, with its own data dir.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// The binary, isolated from the caller's config and environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin!("consorcio-admin"));
        cmd.current_dir(self.dir.path())
            .env_remove("CONSORCIO_DATA_DIR")
            .env_remove("CONSORCIO_BACKEND")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }

    /// Runs a command that must succeed and returns its stdout.
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).assert().success().get_output().clone();
        String::from_utf8(output.stdout).expect("utf8 stdout")
    }

    pub fn add_consorcio(&self, nombre: &str) -> String {
        self.run(&[
            "consorcio",
            "add",
            "--nombre",
            nombre,
            "--cuit",
            "30-71234567-8",
            "--direccion",
            "Av. Rivadavia 5000",
            "--telefono",
            "011-4000-0000",
            "--email",
            "admin@example.com",
            "--administrador",
            "Laura Gómez",
        ])
        .trim()
        .to_string()
    }

    pub fn add_unidad(&self, consorcio: &str, numero: &str, porcentaje: &str) -> String {
        self.run(&[
            "unidad",
            "add",
            "--consorcio",
            consorcio,
            "--numero",
            numero,
            "--piso",
            "1",
            "--propietario",
            &format!("Propietario {numero}"),
            "--porcentaje",
            porcentaje,
        ])
        .trim()
        .to_string()
    }
}

/// First tab-separated column of the stdout line whose columns include `needle`.
pub fn id_of_row(stdout: &str, needle: &str) -> String {
    stdout
        .lines()
        .find(|line| line.split('\t').any(|col| col == needle))
        .and_then(|line| line.split('\t').next())
        .unwrap_or_else(|| panic!("no row with {needle} in:\n{stdout}"))
        .to_string()
}
