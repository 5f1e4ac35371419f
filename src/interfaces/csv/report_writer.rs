use crate::application::reports::{MonthlyReport, ReportLine};
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// CSV shape of a report line. Amounts are written as plain decimals.
#[derive(Serialize)]
struct ReportRow<'a> {
    unidad: &'a str,
    propietario: &'a str,
    monto: Decimal,
    vencimiento: NaiveDate,
    estado: &'a str,
}

impl<'a> From<&'a ReportLine> for ReportRow<'a> {
    fn from(line: &'a ReportLine) -> Self {
        Self {
            unidad: &line.unidad,
            propietario: &line.propietario,
            monto: line.monto.value(),
            vencimiento: line.vencimiento,
            estado: line.estado,
        }
    }
}

/// Writes a monthly report as CSV, one row per expensa.
///
/// Columns: `unidad,propietario,monto,vencimiento,estado`.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_report(&mut self, report: &MonthlyReport) -> Result<()> {
        if report.lines.is_empty() {
            self.writer
                .write_record(["unidad", "propietario", "monto", "vencimiento", "estado"])?;
        }
        for line in &report.lines {
            self.writer.serialize(ReportRow::from(line))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consorcio::{Consorcio, ConsorcioForm};
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;

    fn report(lines: Vec<ReportLine>) -> MonthlyReport {
        MonthlyReport {
            consorcio: Consorcio::new(ConsorcioForm {
                nombre: "Torre".to_string(),
                ..Default::default()
            }),
            periodo: "2024-01".parse().unwrap(),
            total_expensas: Money::new(dec!(1000)),
            total_pagos: Money::ZERO,
            morosidad: dec!(100),
            lines,
        }
    }

    #[test]
    fn test_write_report_lines() {
        let lines = vec![
            ReportLine {
                unidad: "1A".to_string(),
                propietario: "Ana, hija".to_string(),
                monto: Money::new(dec!(250)),
                vencimiento: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                estado: "PENDIENTE",
            },
            ReportLine {
                unidad: "1B".to_string(),
                propietario: "Juan".to_string(),
                monto: Money::new(dec!(750)),
                vencimiento: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                estado: "PAGADO",
            },
        ];
        let mut buf = Vec::new();
        ReportWriter::new(&mut buf)
            .write_report(&report(lines))
            .unwrap();
        let out = String::from_utf8(buf).unwrap();
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(rows[0], "unidad,propietario,monto,vencimiento,estado");
        assert_eq!(rows[1], "1A,\"Ana, hija\",250,2024-02-29,PENDIENTE");
        assert_eq!(rows[2], "1B,Juan,750,2024-02-29,PAGADO");
    }

    #[test]
    fn test_write_empty_report_keeps_header() {
        let mut buf = Vec::new();
        ReportWriter::new(&mut buf)
            .write_report(&report(Vec::new()))
            .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "unidad,propietario,monto,vencimiento,estado\n"
        );
    }
}
