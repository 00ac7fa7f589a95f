//! CSV export of a simulation run.
//!
//! Columns are `time,p_lv,p_aor,p_la,q_lv,q_sys,q_av`, one row per step.

use std::io::Write;

use crate::error::{Result, WindkesselError};
use crate::solver::{OutputRow, TimeSeries};

/// Header line written before the rows.
pub const CSV_HEADER: &str = "time,p_lv,p_aor,p_la,q_lv,q_sys,q_av";

/// Write `series` as CSV to `writer`.
pub fn write_csv<W: Write>(series: &TimeSeries, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER).map_err(output_error)?;
    for row in series.output_rows() {
        write_row(writer, &row)?;
    }
    writer.flush().map_err(output_error)
}

fn write_row<W: Write>(writer: &mut W, row: &OutputRow) -> Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{},{},{}",
        row.time, row.p_lv, row.p_aor, row.p_la, row.q_lv, row.q_sys, row.q_av
    )
    .map_err(output_error)
}

fn output_error(e: std::io::Error) -> WindkesselError {
    WindkesselError::OutputError {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Parameters, State};
    use crate::solver::{CircuitModel, Simulator};

    #[test]
    fn test_csv_layout() {
        let sim = Simulator::new(CircuitModel::new(Parameters::reference()).unwrap());
        let series = sim.run(4, |_| 100.0, State::reference_initial()).unwrap();

        let mut buf = Vec::new();
        write_csv(&series, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], CSV_HEADER);

        let second: Vec<f64> = lines[2].split(',').map(|f| f.parse().unwrap()).collect();
        let sample = series.samples()[1];
        assert_eq!(second.len(), 7);
        assert_eq!(second[0], sample.time);
        assert_eq!(second[1], sample.state.p_lv);
        assert_eq!(second[4], 100.0);
        assert_eq!(second[6], sample.state.q_av);
    }

    #[test]
    fn test_empty_series_writes_header_only() {
        let mut buf = Vec::new();
        write_csv(&TimeSeries::default(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{}\n", CSV_HEADER));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_maps_to_output_error() {
        let err = write_csv(&TimeSeries::default(), &mut FailingWriter).unwrap_err();
        assert!(matches!(err, WindkesselError::OutputError { .. }));
    }
}
