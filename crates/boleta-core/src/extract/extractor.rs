//! The generic bill extractor, driven by a per-provider rule table.

use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use super::amount::{candidate_amounts, clean_amount, pick_preferred_total};
use super::cascade::{first_match, window_after, window_around};
use super::layout::{value_from_tables, LineIndex, Table};
use super::rules::ProviderRules;
use crate::models::record::{FieldRecord, RecordBuilder};
use crate::pdf::{PdfSource, TextSource};
use crate::text::{normalize, NormalizedText};

/// Width of the right-window used to retry client-id patterns.
const ID_WINDOW_WIDTH: usize = 180;
/// Width of the right-window searched for the total.
const TOTAL_WINDOW_WIDTH: usize = 180;
/// Left reach of the around-window, for totals printed before their label.
const TOTAL_WINDOW_LEFT: usize = 120;
/// Bounds of the wide window scanned for candidate amounts.
const TOTAL_SCAN_LEFT: usize = 60;
const TOTAL_SCAN_RIGHT: usize = 400;
/// Maximum horizontal gap between a label token and its value.
const SPATIAL_GAP: f32 = 50.0;
/// Minimum digits for a spatially-resolved document number.
const MIN_DOC_DIGITS: usize = 5;

/// Extracts a [`FieldRecord`] from a document according to one provider's
/// rule table. Every irregularity short of a document read failure
/// degrades to an absent field.
pub struct BillExtractor<'r> {
    rules: &'r ProviderRules,
    total_floor: i64,
}

impl<'r> BillExtractor<'r> {
    pub fn new(rules: &'r ProviderRules) -> Self {
        Self {
            rules,
            total_floor: rules.total_floor,
        }
    }

    /// Override the implausible-total floor (configuration hook).
    pub fn with_total_floor(mut self, floor: i64) -> Self {
        self.total_floor = floor;
        self
    }

    /// Open a PDF and extract its fields. A failure to read the document
    /// is the one fatal path: it yields a record with status
    /// `FALLA_EXTRACCION` and no fields beyond file name and provider.
    pub fn extract_file(&self, path: &Path) -> FieldRecord {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        match PdfSource::open(path) {
            Ok(source) => self.extract(&source, &file_name),
            Err(e) => {
                warn!("failed to read {}: {}", path.display(), e);
                FieldRecord::extraction_failure(file_name, self.rules.provider)
            }
        }
    }

    /// Extract fields from an already-opened text source.
    pub fn extract(&self, source: &dyn TextSource, file_name: &str) -> FieldRecord {
        let pages = acquire_pages(source);
        let text = normalize(&pages);

        let line_indexes: Vec<LineIndex> = (1..=source.page_count())
            .filter_map(|p| source.page_words(p))
            .map(|words| LineIndex::build(&words))
            .collect();
        let tables: Vec<Table> = (1..=source.page_count())
            .filter_map(|p| source.page_tables(p))
            .flatten()
            .collect();

        let mut builder = RecordBuilder::new(file_name, self.rules.provider);
        self.resolve_client_id(&text, &mut builder);
        self.resolve_document_number(&text, &line_indexes, &tables, &mut builder);
        self.resolve_dates(&text, &mut builder);
        self.resolve_total(&text, &line_indexes, &mut builder);
        self.resolve_consumption(&text, &mut builder);
        self.resolve_supplements(&text, &mut builder);

        builder.validate();
        let record = builder.finalize();
        debug!(
            "extracted {} ({}): estado {}",
            file_name,
            self.rules.provider,
            record.status.as_str()
        );
        record
    }

    fn resolve_client_id(&self, text: &NormalizedText, builder: &mut RecordBuilder) {
        let mut id = first_match(&self.rules.client_id, &text.linear);

        if id.is_none() {
            if let Some(label) = &self.rules.client_id_window_label {
                if let Some(window) = window_after(label, &text.linear, ID_WINDOW_WIDTH) {
                    id = first_match(&self.rules.client_id, window);
                }
            }
        }
        if id.is_none() {
            id = first_match(&self.rules.client_id_compact, &text.compact);
        }

        builder.client_id(id);
    }

    fn resolve_document_number(
        &self,
        text: &NormalizedText,
        line_indexes: &[LineIndex],
        tables: &[Table],
        builder: &mut RecordBuilder,
    ) {
        let mut number = first_match(&self.rules.document_number, &text.linear);

        if number.is_none() {
            number = first_match(&self.rules.document_number_compact, &text.compact);
        }
        if number.is_none() {
            if let Some(token) = &self.rules.document_number_token {
                number = value_from_tables(tables, token, MIN_DOC_DIGITS).or_else(|| {
                    line_indexes
                        .iter()
                        .find_map(|index| index.value_right_of(token, SPATIAL_GAP, MIN_DOC_DIGITS))
                });
            }
        }

        builder.document_number(number);
    }

    fn resolve_dates(&self, text: &NormalizedText, builder: &mut RecordBuilder) {
        let issue = first_match(&self.rules.issue_date, &text.linear)
            .or_else(|| first_match(&self.rules.issue_date_compact, &text.compact));
        let due = first_match(&self.rules.due_date, &text.linear)
            .or_else(|| first_match(&self.rules.due_date_compact, &text.compact));

        builder.issue_date(issue);
        builder.due_date(due);
    }

    fn resolve_total(
        &self,
        text: &NormalizedText,
        line_indexes: &[LineIndex],
        builder: &mut RecordBuilder,
    ) {
        let label = &self.rules.total_label;

        // Label-adjacent value, first to the right of the label, then in a
        // window that also reaches left of it.
        let mut total = window_after(label, &text.linear, TOTAL_WINDOW_WIDTH)
            .and_then(|w| first_match(&self.rules.total_value, w))
            .and_then(|v| parsed_amount(&v));
        if total.is_none() {
            total = window_around(label, &text.linear, TOTAL_WINDOW_LEFT, TOTAL_WINDOW_WIDTH)
                .and_then(|w| first_match(&self.rules.total_value, w))
                .and_then(|v| parsed_amount(&v));
        }
        if total.is_none() {
            total = first_match(&self.rules.total_compact, &text.compact)
                .and_then(|v| parsed_amount(&v));
        }

        // A missing or implausibly small capture falls back to ranking
        // every monetary-shaped number near the label. A small capture
        // with no candidate clearing the floor stays absent.
        if total.is_none() || total.is_some_and(|t| t < self.total_floor) {
            let mut candidates =
                window_around(label, &text.linear, TOTAL_SCAN_LEFT, TOTAL_SCAN_RIGHT)
                    .map(candidate_amounts)
                    .unwrap_or_default();
            for index in line_indexes {
                candidates.extend(index.amounts_near(label));
            }

            let best = pick_preferred_total(&candidates);
            if best.is_some() {
                debug!(
                    "total rescue picked {:?} from {} candidates",
                    best,
                    candidates.len()
                );
            }
            total = match (total, best) {
                (_, Some(b)) if b >= self.total_floor => Some(b),
                (None, Some(b)) => Some(b),
                (None, None) => None,
                (Some(_), _) => None,
            };
        }

        builder.total_due(total);
    }

    fn resolve_consumption(&self, text: &NormalizedText, builder: &mut RecordBuilder) {
        let reading = first_match(&self.rules.consumption, &text.linear)
            .or_else(|| first_match(&self.rules.consumption_compact, &text.compact))
            .map(|raw| {
                let normalized = raw.replace('.', "").replace(',', ".");
                format!("{} {}", normalized, self.rules.consumption_unit)
            });

        builder.consumption(reading);
    }

    fn resolve_supplements(&self, text: &NormalizedText, builder: &mut RecordBuilder) {
        if let Some(pattern) = &self.rules.issuer_rut {
            builder.issuer_rut(single_match(pattern, &text.linear));
        }
        if let Some(pattern) = &self.rules.vat_amount {
            builder.vat_amount(single_match(pattern, &text.linear).and_then(|v| parsed_amount(&v)));
        }
        if let Some(pattern) = &self.rules.billed_through {
            builder.billed_through(single_match(pattern, &text.linear));
        }
        if let Some(pattern) = &self.rules.period_amount {
            builder
                .period_amount(single_match(pattern, &text.linear).and_then(|v| parsed_amount(&v)));
        }
    }
}

fn acquire_pages(source: &dyn TextSource) -> Vec<String> {
    (1..=source.page_count())
        .map(|page| source.page_text(page).unwrap_or_default())
        .collect()
}

fn single_match(pattern: &Regex, text: &str) -> Option<String> {
    first_match(std::slice::from_ref(pattern), text)
}

/// A matched value cleaned to whole currency units; unparseable captures
/// contribute nothing to the cascade.
fn parsed_amount(value: &str) -> Option<i64> {
    clean_amount(value)?.value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Provider;
    use crate::extract::layout::PositionedWord;
    use crate::extract::rules::rules_for;
    use crate::models::record::RecordStatus;
    use pretty_assertions::assert_eq;

    /// In-memory source standing in for the PDF collaborator.
    #[derive(Default)]
    struct StaticSource {
        pages: Vec<String>,
        words: Vec<Vec<PositionedWord>>,
        tables: Vec<Vec<Table>>,
    }

    impl StaticSource {
        fn from_text(text: &str) -> Self {
            Self {
                pages: vec![text.to_string()],
                ..Self::default()
            }
        }
    }

    impl TextSource for StaticSource {
        fn page_count(&self) -> u32 {
            self.pages.len().max(self.words.len()).max(self.tables.len()) as u32
        }

        fn page_text(&self, page: u32) -> Option<String> {
            self.pages.get(page as usize - 1).cloned()
        }

        fn page_words(&self, page: u32) -> Option<Vec<PositionedWord>> {
            self.words.get(page as usize - 1).cloned()
        }

        fn page_tables(&self, page: u32) -> Option<Vec<Table>> {
            self.tables.get(page as usize - 1).cloned()
        }
    }

    fn extractor_for(provider: Provider) -> BillExtractor<'static> {
        BillExtractor::new(rules_for(provider).unwrap())
    }

    #[test]
    fn test_metrogas_complete_bill() {
        let source = StaticSource::from_text(
            "METROGAS S.A. R.U.T.: 96.722.460-K \
             BOLETA ELECTRÓNICA N° 123456 \
             FECHA EMISIÓN: 05-MAR-2024 \
             VENCIMIENTO 20-MAR-2024 \
             Número de cuenta: 9876543 \
             CONSUMO TOTAL 12,5 m3 \
             Total a pagar $ 45.000",
        );

        let record = extractor_for(Provider::Metrogas).extract(&source, "metrogas_mar.pdf");

        assert_eq!(record.document_number, Some("123456".to_string()));
        assert_eq!(record.total_due, Some(45_000));
        assert_eq!(record.client_id, Some("9876543".to_string()));
        assert_eq!(record.issue_date, Some("05-MAR-2024".to_string()));
        assert_eq!(record.due_date, Some("20-MAR-2024".to_string()));
        assert_eq!(record.consumption, Some("12.5 m3".to_string()));
        assert_eq!(record.status, RecordStatus::Ok);
        assert_eq!(record.issuer_rut, Some("96.722.460-K".to_string()));
    }

    #[test]
    fn test_enel_complete_bill() {
        let source = StaticSource::from_text(
            "Enel Distribución Chile \
             Boleta Electrónica N° 7890123 \
             N° Cliente: 12345678 \
             Fecha de Emisión: 5 Mar 2024 \
             Fecha de vencimiento: 20 Mar 2024 \
             Consumo total del mes = 350 kWh \
             Monto del período: $ 36.200 \
             Total a pagar $ 38.450",
        );

        let record = extractor_for(Provider::Enel).extract(&source, "enel_marzo.pdf");

        assert_eq!(record.document_number, Some("7890123".to_string()));
        assert_eq!(record.client_id, Some("12345678".to_string()));
        assert_eq!(record.issue_date, Some("5 Mar 2024".to_string()));
        assert_eq!(record.due_date, Some("20 Mar 2024".to_string()));
        assert_eq!(record.consumption, Some("350 kWh".to_string()));
        assert_eq!(record.total_due, Some(38_450));
        assert_eq!(record.period_amount, Some(36_200));
        assert_eq!(record.status, RecordStatus::Ok);
    }

    #[test]
    fn test_aguas_compact_fallbacks() {
        // Layout glued the labels and values together; only the compact
        // view can resolve them.
        let source = StaticSource::from_text(
            "AGUAS ANDINAS BOLETAELECTRÓNICA Nº55555 \
             SunúmerodeCuentaes:123456-7 \
             FECHAEMISIÓN:01-ABR-2024 VENCIMIENTO 15-ABR-2024 \
             CONSUMOTOTAL18,2 TOTALAPAGAR$12.345",
        );

        let record = extractor_for(Provider::AguasAndinas).extract(&source, "aguas_andinas.pdf");

        assert_eq!(record.document_number, Some("55555".to_string()));
        assert_eq!(record.client_id, Some("123456-7".to_string()));
        assert_eq!(record.issue_date, Some("01-ABR-2024".to_string()));
        assert_eq!(record.due_date, Some("15-ABR-2024".to_string()));
        assert_eq!(record.consumption, Some("18.2 m3".to_string()));
        assert_eq!(record.total_due, Some(12_345));
        assert_eq!(record.status, RecordStatus::Ok);
    }

    #[test]
    fn test_small_capture_rescued_by_candidates() {
        // The label-adjacent capture is a stray "2"; the candidate scan
        // around the label recovers the real total.
        let source = StaticSource::from_text(
            "Subtotal 30.000 IVA 5.700 Total a pagar $ 2 pagina 35.700",
        );

        let record = extractor_for(Provider::Metrogas).extract(&source, "metrogas.pdf");
        assert_eq!(record.total_due, Some(35_700));
    }

    #[test]
    fn test_implausible_total_without_better_candidate_is_absent() {
        let source = StaticSource::from_text("Total a pagar $ 2");
        let record = extractor_for(Provider::AguasAndinas).extract(&source, "aguas_andinas.pdf");
        // 2 is below the floor and the scan finds nothing better.
        assert_eq!(record.total_due, None);
    }

    #[test]
    fn test_out_of_range_total_discarded() {
        let source = StaticSource::from_text(
            "BOLETA ELECTRÓNICA N° 123456 \
             FECHA EMISIÓN: 05-MAR-2024 VENCIMIENTO 20-MAR-2024 \
             Número de cuenta: 9876543 \
             Total a pagar $ 1.000.000.000",
        );

        let record = extractor_for(Provider::Metrogas).extract(&source, "metrogas.pdf");
        assert_eq!(record.total_due, None);
        assert_eq!(record.status, RecordStatus::Partial);
    }

    #[test]
    fn test_spatial_document_number_from_words() {
        let source = StaticSource {
            pages: vec!["AGUAS ANDINAS sin etiquetas legibles".to_string()],
            words: vec![vec![
                PositionedWord::new("Folio", 10.0, 40.0, 120.0),
                PositionedWord::new("9876501", 45.0, 95.0, 120.4),
            ]],
            tables: Vec::new(),
        };

        let record = extractor_for(Provider::AguasAndinas).extract(&source, "aguas_andinas.pdf");
        assert_eq!(record.document_number, Some("9876501".to_string()));
    }

    #[test]
    fn test_spatial_document_number_from_tables() {
        let source = StaticSource {
            pages: vec!["AGUAS ANDINAS".to_string()],
            words: Vec::new(),
            tables: vec![vec![vec![
                vec!["Documento".to_string(), "445566".to_string()],
                vec!["Periodo".to_string(), "ABR 2024".to_string()],
            ]]],
        };

        let record = extractor_for(Provider::AguasAndinas).extract(&source, "aguas_andinas.pdf");
        assert_eq!(record.document_number, Some("445566".to_string()));
    }

    #[test]
    fn test_total_beneath_label_found_via_lines() {
        let source = StaticSource {
            pages: vec!["Cuenta del mes".to_string()],
            words: vec![vec![
                PositionedWord::new("TOTAL", 10.0, 45.0, 300.0),
                PositionedWord::new("A", 50.0, 55.0, 300.2),
                PositionedWord::new("PAGAR", 60.0, 95.0, 300.1),
                PositionedWord::new("$", 10.0, 14.0, 315.0),
                PositionedWord::new("27.890", 18.0, 60.0, 315.3),
            ]],
            tables: Vec::new(),
        };

        let record = extractor_for(Provider::AguasAndinas).extract(&source, "aguas_andinas.pdf");
        assert_eq!(record.total_due, Some(27_890));
    }

    #[test]
    fn test_unreadable_page_degrades_to_partial() {
        let source = StaticSource {
            // Page 2 exists in the word list but has no decodable text.
            pages: vec!["Número de cuenta: 9876543".to_string()],
            words: vec![Vec::new(), Vec::new()],
            tables: Vec::new(),
        };

        let record = extractor_for(Provider::Metrogas).extract(&source, "metrogas.pdf");
        assert_eq!(record.client_id, Some("9876543".to_string()));
        assert_eq!(record.status, RecordStatus::Partial);
    }

    #[test]
    fn test_extract_file_failure_discards_fields() {
        let record = extractor_for(Provider::Enel)
            .extract_file(Path::new("/nonexistent/enel_enero.pdf"));
        assert_eq!(record.status, RecordStatus::ExtractionFailure);
        assert_eq!(record.file_name, "enel_enero.pdf");
        assert_eq!(record.total_due, None);
    }

    #[test]
    fn test_configured_floor_overrides_rule_table() {
        let source = StaticSource::from_text("Total a pagar $ 900 Consumo 1");
        let extractor = extractor_for(Provider::Metrogas).with_total_floor(10);
        let record = extractor.extract(&source, "metrogas.pdf");
        // 900 clears the lowered floor, so no rescue runs.
        assert_eq!(record.total_due, Some(900));
    }
}
