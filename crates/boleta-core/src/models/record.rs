//! Extraction result records.

use serde::Serialize;

use crate::classify::Provider;

/// Ordered output column names of the result table.
pub const COLUMNS: [&str; 9] = [
    "archivo_pdf",
    "empresa",
    "nro_documento",
    "total_a_pagar",
    "id_cliente",
    "fecha_emision",
    "fecha_vencimiento",
    "consumo_periodo",
    "estado",
];

/// Per-record data quality flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordStatus {
    /// All required fields present.
    #[serde(rename = "OK")]
    Ok,
    /// At least one required field missing.
    #[serde(rename = "PARCIAL")]
    Partial,
    /// An unrecoverable fault occurred while reading the document.
    #[serde(rename = "FALLA_EXTRACCION")]
    ExtractionFailure,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Ok => "OK",
            RecordStatus::Partial => "PARCIAL",
            RecordStatus::ExtractionFailure => "FALLA_EXTRACCION",
        }
    }
}

/// The extraction result for one document. Finalized once by
/// [`RecordBuilder`]; never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct FieldRecord {
    /// Source file name.
    pub file_name: String,
    /// Classified provider.
    pub provider: Provider,
    /// Boleta/folio number.
    pub document_number: Option<String>,
    /// Total amount due, whole currency units.
    pub total_due: Option<i64>,
    /// Client/account id, possibly with a trailing check character.
    pub client_id: Option<String>,
    /// Issue date as captured (format varies per provider).
    pub issue_date: Option<String>,
    /// Due date as captured.
    pub due_date: Option<String>,
    /// Consumption reading with unit suffix.
    pub consumption: Option<String>,
    /// Data quality flag.
    pub status: RecordStatus,

    /// Issuer RUT, when printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_rut: Option<String>,
    /// VAT amount, when printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<i64>,
    /// "Considera movimientos hasta" cutoff date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_through: Option<String>,
    /// Enel's period amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_amount: Option<i64>,
}

impl FieldRecord {
    /// Failure record: file name and provider only, everything else
    /// discarded.
    pub fn extraction_failure(file_name: impl Into<String>, provider: Provider) -> Self {
        Self {
            file_name: file_name.into(),
            provider,
            document_number: None,
            total_due: None,
            client_id: None,
            issue_date: None,
            due_date: None,
            consumption: None,
            status: RecordStatus::ExtractionFailure,
            issuer_rut: None,
            vat_amount: None,
            billed_through: None,
            period_amount: None,
        }
    }

    /// Record for a file whose name matched no provider.
    pub fn unclassified(file_name: impl Into<String>) -> Self {
        Self {
            status: RecordStatus::Partial,
            ..Self::extraction_failure(file_name, Provider::Unknown)
        }
    }

    /// The record as an ordered row matching [`COLUMNS`].
    pub fn csv_row(&self) -> [String; 9] {
        [
            self.file_name.clone(),
            self.provider.label().unwrap_or("").to_string(),
            self.document_number.clone().unwrap_or_default(),
            self.total_due.map(|t| t.to_string()).unwrap_or_default(),
            self.client_id.clone().unwrap_or_default(),
            self.issue_date.clone().unwrap_or_default(),
            self.due_date.clone().unwrap_or_default(),
            self.consumption.clone().unwrap_or_default(),
            self.status.as_str().to_string(),
        ]
    }
}

/// Accumulates fields during extraction and finalizes exactly once,
/// recomputing the status from required-field presence.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    file_name: String,
    provider: Provider,
    document_number: Option<String>,
    total_due: Option<i64>,
    client_id: Option<String>,
    issue_date: Option<String>,
    due_date: Option<String>,
    consumption: Option<String>,
    issuer_rut: Option<String>,
    vat_amount: Option<i64>,
    billed_through: Option<String>,
    period_amount: Option<i64>,
}

impl RecordBuilder {
    pub fn new(file_name: impl Into<String>, provider: Provider) -> Self {
        Self {
            file_name: file_name.into(),
            provider,
            ..Self::default()
        }
    }

    pub fn document_number(&mut self, value: Option<String>) -> &mut Self {
        self.document_number = value;
        self
    }

    pub fn total_due(&mut self, value: Option<i64>) -> &mut Self {
        self.total_due = value;
        self
    }

    pub fn client_id(&mut self, value: Option<String>) -> &mut Self {
        self.client_id = value;
        self
    }

    pub fn issue_date(&mut self, value: Option<String>) -> &mut Self {
        self.issue_date = value;
        self
    }

    pub fn due_date(&mut self, value: Option<String>) -> &mut Self {
        self.due_date = value;
        self
    }

    pub fn consumption(&mut self, value: Option<String>) -> &mut Self {
        self.consumption = value;
        self
    }

    pub fn issuer_rut(&mut self, value: Option<String>) -> &mut Self {
        self.issuer_rut = value;
        self
    }

    pub fn vat_amount(&mut self, value: Option<i64>) -> &mut Self {
        self.vat_amount = value;
        self
    }

    pub fn billed_through(&mut self, value: Option<String>) -> &mut Self {
        self.billed_through = value;
        self
    }

    pub fn period_amount(&mut self, value: Option<i64>) -> &mut Self {
        self.period_amount = value;
        self
    }

    pub fn current_total(&self) -> Option<i64> {
        self.total_due
    }

    /// Discard captures that fail the plausibility rules: ids shorter than
    /// six characters or outside the digit/hyphen/check-digit alphabet,
    /// document numbers with fewer than five digits, totals outside
    /// (0, 1_000_000_000).
    pub fn validate(&mut self) {
        if let Some(id) = &self.client_id {
            if id.chars().count() < 6 || !id.chars().all(is_id_char) {
                self.client_id = None;
            }
        }
        if let Some(doc) = &self.document_number {
            if doc.chars().filter(|c| c.is_ascii_digit()).count() < 5 {
                self.document_number = None;
            }
        }
        if let Some(total) = self.total_due {
            if !(0 < total && total < 1_000_000_000) {
                self.total_due = None;
            }
        }
    }

    /// Finalize into an immutable record. OK requires document number,
    /// total, client id and both dates.
    pub fn finalize(self) -> FieldRecord {
        let complete = self.document_number.is_some()
            && self.total_due.is_some()
            && self.client_id.is_some()
            && self.issue_date.is_some()
            && self.due_date.is_some();

        FieldRecord {
            file_name: self.file_name,
            provider: self.provider,
            document_number: self.document_number,
            total_due: self.total_due,
            client_id: self.client_id,
            issue_date: self.issue_date,
            due_date: self.due_date,
            consumption: self.consumption,
            status: if complete {
                RecordStatus::Ok
            } else {
                RecordStatus::Partial
            },
            issuer_rut: self.issuer_rut,
            vat_amount: self.vat_amount,
            billed_through: self.billed_through,
            period_amount: self.period_amount,
        }
    }

    /// Abandon the builder, discarding every resolved field.
    pub fn fail(self) -> FieldRecord {
        FieldRecord::extraction_failure(self.file_name, self.provider)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | '\u{2013}' | 'k' | 'K')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_builder() -> RecordBuilder {
        let mut b = RecordBuilder::new("cuenta.pdf", Provider::Metrogas);
        b.document_number(Some("123456".into()))
            .total_due(Some(45_000))
            .client_id(Some("9876543".into()))
            .issue_date(Some("05-MAR-2024".into()))
            .due_date(Some("20-MAR-2024".into()))
            .consumption(Some("12.5 m3".into()));
        b
    }

    #[test]
    fn test_status_ok_requires_all_required_fields() {
        assert_eq!(full_builder().finalize().status, RecordStatus::Ok);

        let mut partial = full_builder();
        partial.due_date(None);
        assert_eq!(partial.finalize().status, RecordStatus::Partial);
    }

    #[test]
    fn test_validation_discards_short_id() {
        let mut b = full_builder();
        b.client_id(Some("12345".into()));
        b.validate();
        let record = b.finalize();
        assert_eq!(record.client_id, None);
        assert_eq!(record.status, RecordStatus::Partial);
    }

    #[test]
    fn test_validation_discards_bad_id_alphabet() {
        let mut b = full_builder();
        b.client_id(Some("98765X3".into()));
        b.validate();
        assert_eq!(b.finalize().client_id, None);
    }

    #[test]
    fn test_validation_accepts_check_digit_id() {
        let mut b = full_builder();
        b.client_id(Some("1234567-K".into()));
        b.validate();
        assert_eq!(b.finalize().client_id, Some("1234567-K".to_string()));
    }

    #[test]
    fn test_validation_document_number_digit_projection() {
        let mut b = full_builder();
        b.document_number(Some("A-1234".into()));
        b.validate();
        assert_eq!(b.finalize().document_number, None);
    }

    #[test]
    fn test_validation_total_bounds() {
        for (total, expected) in [
            (1_000_000_000, None),
            (0, None),
            (999_999_999, Some(999_999_999)),
        ] {
            let mut b = full_builder();
            b.total_due(Some(total));
            b.validate();
            assert_eq!(b.finalize().total_due, expected, "total {}", total);
        }
    }

    #[test]
    fn test_fail_discards_resolved_fields() {
        let record = full_builder().fail();
        assert_eq!(record.status, RecordStatus::ExtractionFailure);
        assert_eq!(record.document_number, None);
        assert_eq!(record.total_due, None);
        assert_eq!(record.file_name, "cuenta.pdf");
    }

    #[test]
    fn test_unclassified_record() {
        let record = FieldRecord::unclassified("recibo_desconocido.pdf");
        assert_eq!(record.status, RecordStatus::Partial);
        assert_eq!(record.provider, Provider::Unknown);
        assert_eq!(record.csv_row()[1], "");
    }

    #[test]
    fn test_csv_row_order_matches_columns() {
        let record = full_builder().finalize();
        let row = record.csv_row();
        assert_eq!(row[0], "cuenta.pdf");
        assert_eq!(row[1], "Metrogas");
        assert_eq!(row[2], "123456");
        assert_eq!(row[3], "45000");
        assert_eq!(row[8], "OK");
        assert_eq!(COLUMNS.len(), row.len());
    }
}
