//! Per-tick telemetry CSV written while a recorded session plays back.

use std::rc::Rc;

use client_core::snapshot::{CameraSnapshot, PlayerSnapshot};
use tracing::{error, info};

use crate::error::ReplayError;
use crate::storage::Storage;

pub const HEADER: [&str; 20] = [
    "Frame",
    "Time",
    "CameraPosX",
    "CameraPosY",
    "CameraPosZ",
    "CameraRotX",
    "CameraRotY",
    "CameraRotZ",
    "CameraRotW",
    "CameraZoom",
    "PlayerPosX",
    "PlayerPosY",
    "PlayerPosZ",
    "PlayerRotX",
    "PlayerRotY",
    "PlayerRotZ",
    "PlayerRotW",
    "PlayerVelX",
    "PlayerVelY",
    "PlayerVelZ",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRow {
    /// Tick index.
    pub frame: u64,
    /// Simulated seconds.
    pub time: f64,
    pub camera: CameraSnapshot,
    pub player: PlayerSnapshot,
}

fn f(v: f32) -> String {
    format!("{v:.6}")
}

impl TelemetryRow {
    /// Cells in `HEADER` order.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let c = &self.camera;
        let p = &self.player;
        vec![
            self.frame.to_string(),
            format!("{:.6}", self.time),
            f(c.position.x),
            f(c.position.y),
            f(c.position.z),
            f(c.rotation.x),
            f(c.rotation.y),
            f(c.rotation.z),
            f(c.rotation.w),
            f(c.zoom),
            f(p.position.x),
            f(p.position.y),
            f(p.position.z),
            f(p.rotation.x),
            f(p.rotation.y),
            f(p.rotation.z),
            f(p.rotation.w),
            f(p.velocity.x),
            f(p.velocity.y),
            f(p.velocity.z),
        ]
    }
}

/// File name for a character/camera preset pair.
#[must_use]
pub fn csv_file_name(character_preset: &str, camera_preset: &str) -> String {
    format!("Record_{character_preset}_{camera_preset}.csv")
}

struct OpenExport {
    file: String,
    rows: Vec<TelemetryRow>,
}

pub struct CsvExporter {
    storage: Option<Rc<dyn Storage>>,
    open: Option<OpenExport>,
}

impl CsvExporter {
    #[must_use]
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self {
            storage: Some(storage),
            open: None,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            storage: None,
            open: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn start(&mut self, character_preset: &str, camera_preset: &str) -> Result<(), ReplayError> {
        if self.storage.is_none() {
            error!(target: "export", "exporter has no storage");
            return Err(ReplayError::Disabled);
        }
        if self.open.is_some() {
            error!(target: "export", "export already open");
            return Err(ReplayError::AlreadyExporting);
        }
        let file = csv_file_name(character_preset, camera_preset);
        info!(target: "export", file = %file, "telemetry export started");
        self.open = Some(OpenExport {
            file,
            rows: Vec::new(),
        });
        Ok(())
    }

    /// Buffer one row. Ignored when no export is open.
    pub fn push(&mut self, row: TelemetryRow) {
        if let Some(open) = self.open.as_mut() {
            open.rows.push(row);
        }
    }

    /// Write the buffered rows and close. Returns the file name.
    pub fn stop(&mut self) -> Result<String, ReplayError> {
        let Some(storage) = self.storage.clone() else {
            error!(target: "export", "exporter has no storage");
            return Err(ReplayError::Disabled);
        };
        let Some(open) = self.open.take() else {
            error!(target: "export", "stop without an open export");
            return Err(ReplayError::NotExporting);
        };
        let txt = render_csv(&open.rows)?;
        storage.write(&open.file, &txt).map_err(|e| {
            error!(target: "export", file = %open.file, error = %format!("{e:#}"), "csv write failed");
            ReplayError::Storage(e)
        })?;
        info!(target: "export", file = %open.file, rows = open.rows.len(), "telemetry export written");
        Ok(open.file)
    }
}

/// Header plus one line per row, comma separated.
pub fn render_csv(rows: &[TelemetryRow]) -> anyhow::Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(HEADER)?;
    for row in rows {
        w.write_record(row.fields())?;
    }
    let bytes = w.into_inner().map_err(|e| anyhow::anyhow!("flush csv: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}
