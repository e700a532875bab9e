//! Step report output formatting
//!
//! A [`StepReport`] flattens one [`StepOutput`] together with the anchor
//! geometry into the values a display shows: per-anchor distance, RSSI and
//! direction vector, the mobile position and the fused bearing. Reports can be
//! rendered as text, JSON or CSV.

use crate::algorithms::direction::DirectionEstimator;
use crate::api::types::{OutputFormat, StepOutput};
use crate::core::{Anchor, AnchorId, Point2D};
use crate::processing::inertial::ImuSample;
use crate::validation::{SimResult, SimulationError};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Per-anchor line of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorReport {
    pub anchor_id: AnchorId,
    pub label: String,
    /// Noisy distance (m)
    pub distance_m: f64,
    pub rssi_dbm: f64,
    /// Unit vector used by the estimator for this anchor
    pub unit_vector: Point2D,
    pub clamped: bool,
}

/// Display-ready summary of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: u64,
    pub mobile: Point2D,
    pub anchors: Vec<AnchorReport>,
    pub direction: Point2D,
    pub bearing_degrees: f64,
    /// Soft geometry warnings raised this step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inertial: Option<ImuSample>,
}

impl StepReport {
    /// Pair each measurement with its anchor and the estimator's unit vector
    pub fn new(output: &StepOutput, anchors: &[Anchor], estimator: &DirectionEstimator) -> SimResult<Self> {
        let mut lines = Vec::with_capacity(output.measurements.len());
        for measurement in &output.measurements {
            let anchor = anchors
                .iter()
                .find(|a| a.id == measurement.anchor_id)
                .ok_or(SimulationError::UnknownAnchor {
                    anchor_id: measurement.anchor_id,
                })?;
            let unit = estimator.unit_vector(&anchor.position, &output.mobile.position);
            lines.push(AnchorReport {
                anchor_id: anchor.id,
                label: anchor.label(),
                distance_m: measurement.noisy_distance,
                rssi_dbm: measurement.rssi_dbm,
                unit_vector: Point2D::from_vector(&unit),
                clamped: measurement.clamped,
            });
        }

        Ok(Self {
            step: output.step(),
            mobile: output.mobile.position,
            anchors: lines,
            direction: output.direction.resultant,
            bearing_degrees: output.direction.bearing_degrees,
            warnings: output.direction.warnings().iter().map(|w| w.to_string()).collect(),
            inertial: output.inertial,
        })
    }
}

/// Human-readable text formatter
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// One line per step instead of one line per anchor
    pub compact: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self { compact: true }
    }

    pub fn format_text(&self, report: &StepReport) -> String {
        let mut output = String::new();

        if self.compact {
            let _ = write!(
                output,
                "step {} | mobile {} | bearing {:.1}°",
                report.step, report.mobile, report.bearing_degrees
            );
            if let Some(strongest) = report
                .anchors
                .iter()
                .max_by(|a, b| a.rssi_dbm.total_cmp(&b.rssi_dbm))
            {
                let _ = write!(output, " | strongest {} {:.1} dBm", strongest.label, strongest.rssi_dbm);
            }
            return output;
        }

        let _ = writeln!(output, "Step {}", report.step);
        for line in &report.anchors {
            let _ = writeln!(
                output,
                "{}: {:.2} m | RSSI: {:.1} dBm | ({:.2}, {:.2}){}",
                line.label,
                line.distance_m,
                line.rssi_dbm,
                line.unit_vector.x,
                line.unit_vector.y,
                if line.clamped { " [clamped]" } else { "" }
            );
        }
        let _ = writeln!(output, "Mobile: {}", report.mobile);
        let _ = writeln!(
            output,
            "Direction: ({:.2}, {:.2}) | Angle: {:.1}°",
            report.direction.x, report.direction.y, report.bearing_degrees
        );
        if let Some(imu) = &report.inertial {
            let _ = writeln!(
                output,
                "IMU: accel ({:.2}, {:.2}, {:.2}) | gyro ({:.2}, {:.2}, {:.2})",
                imu.accel.x, imu.accel.y, imu.accel.z, imu.gyro.x, imu.gyro.y, imu.gyro.z
            );
        }
        for warning in &report.warnings {
            let _ = writeln!(output, "Warning: {}", warning);
        }
        output
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, report: &StepReport) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        }
    }
}

/// CSV formatter for data logging, one row per step
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header for reports over `anchors`
    pub fn header(&self, anchors: &[Anchor]) -> String {
        let mut header = String::from("step,mobile_x,mobile_y,direction_x,direction_y,bearing_deg");
        for anchor in anchors {
            let label = anchor.label();
            let _ = write!(header, ",{}_distance_m,{}_rssi_dbm", label, label);
        }
        header
    }

    pub fn format_csv(&self, report: &StepReport) -> String {
        let mut row = format!(
            "{},{:.4},{:.4},{:.6},{:.6},{:.3}",
            report.step,
            report.mobile.x,
            report.mobile.y,
            report.direction.x,
            report.direction.y,
            report.bearing_degrees
        );
        for line in &report.anchors {
            let _ = write!(row, ",{:.4},{:.3}", line.distance_m, line.rssi_dbm);
        }
        row
    }
}

/// Renders a stream of reports in one of the output formats
#[derive(Debug, Clone)]
pub struct ReportWriter {
    format: OutputFormat,
    text: TextFormatter,
    json: JsonFormatter,
    csv: CsvFormatter,
    header_written: bool,
}

impl ReportWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            text: TextFormatter::new(),
            json: JsonFormatter::new(),
            csv: CsvFormatter::new(),
            header_written: false,
        }
    }

    pub fn with_compact_text(mut self) -> Self {
        self.text = TextFormatter::compact();
        self
    }

    pub fn with_pretty_json(mut self) -> Self {
        self.json = JsonFormatter::pretty();
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render one report; the first CSV row is preceded by the header
    pub fn render(&mut self, report: &StepReport, anchors: &[Anchor]) -> SimResult<String> {
        match self.format {
            OutputFormat::Text => Ok(self.text.format_text(report)),
            OutputFormat::Json => Ok(self.json.format_json(report)?),
            OutputFormat::Csv => {
                let row = self.csv.format_csv(report);
                if self.csv.include_header && !self.header_written {
                    self.header_written = true;
                    Ok(format!("{}\n{}", self.csv.header(anchors), row))
                } else {
                    Ok(row)
                }
            }
        }
    }
}
