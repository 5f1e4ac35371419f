use crate::domain::unidad::UnidadForm;
use crate::error::{AdminError, Result};
use std::io::Read;

/// Reads unit rows from a CSV source.
///
/// Expects a header row with `numero,piso,propietario,email,telefono,porcentaje`;
/// `email` and `telefono` may be left out. Fields are trimmed and short
/// records are accepted, so a bad row only fails itself.
pub struct UnidadReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> UnidadReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields each data row paired with the line it starts on.
    ///
    /// Blank lines are skipped but still counted. A header or I/O failure is
    /// yielded once and ends the stream.
    pub fn unidades(mut self) -> impl Iterator<Item = (u64, Result<UnidadForm>)> {
        let (headers, mut failure) = match self.reader.headers().cloned() {
            Ok(headers) => (headers, None),
            Err(e) => (csv::StringRecord::new(), Some(e)),
        };
        let mut record = csv::StringRecord::new();
        let mut done = false;

        std::iter::from_fn(move || {
            if done {
                return None;
            }
            if let Some(e) = failure.take() {
                done = true;
                let line = e.position().map_or(1, |p| p.line());
                return Some((line, Err(AdminError::from(e))));
            }

            let before = self.reader.position().line();
            match self.reader.read_record(&mut record) {
                Ok(false) => None,
                Ok(true) => {
                    let line = record.position().map_or(before, |p| p.line());
                    let form = record
                        .deserialize::<UnidadForm>(Some(&headers))
                        .map_err(AdminError::from)
                        .and_then(|form| form.validate().map(|_| form));
                    Some((line, form))
                }
                Err(e) => {
                    let line = match e.position() {
                        Some(p) => p.line(),
                        None => {
                            done = true;
                            before
                        }
                    };
                    Some((line, Err(AdminError::from(e))))
                }
            }
        })
    }
}
