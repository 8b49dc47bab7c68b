use std::io::{self, Write};

use crate::sim::telemetry::TelemetryLog;

/// Write the telemetry history to CSV format.
///
/// Columns: time, angle_deg, output, effective, p, i, d
pub fn write_telemetry<W: Write>(writer: &mut W, log: &TelemetryLog) -> io::Result<()> {
    writeln!(writer, "time,angle_deg,output,effective,p,i,d")?;

    for s in log.iter() {
        writeln!(
            writer,
            "{:.4},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}",
            s.time, s.angle_deg, s.output, s.effective, s.p, s.i, s.d,
        )?;
    }

    Ok(())
}

/// Write the telemetry history to a CSV file at the given path.
pub fn write_telemetry_file(path: &str, log: &TelemetryLog) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_telemetry(&mut file, log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::telemetry::TelemetrySample;

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut log = TelemetryLog::default();
        log.push(TelemetrySample {
            time: 0.05,
            angle_deg: 1.25,
            output: -42.0,
            effective: -30.5,
            p: -8.7,
            i: -0.1,
            d: 12.0,
        });
        log.push(TelemetrySample {
            time: 0.1,
            angle_deg: 0.9,
            output: -30.0,
            effective: -30.2,
            p: -6.3,
            i: -0.1,
            d: 9.5,
        });

        let mut buf = Vec::new();
        write_telemetry(&mut buf, &log).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "time,angle_deg,output,effective,p,i,d");
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].starts_with("0.0500,1.250,"));
    }

    #[test]
    fn empty_log_is_header_only() {
        let mut buf = Vec::new();
        write_telemetry(&mut buf, &TelemetryLog::default()).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.lines().count(), 1);
    }
}
