//! Per-provider extraction rule tables.
//!
//! The three providers share one extraction skeleton and differ only in
//! label vocabulary, capture shapes, unit suffix and validation floor, so
//! each is described by a [`ProviderRules`] value instead of its own
//! extractor. Linear pattern lists run against space-collapsed text;
//! compact lists run against the whitespace-stripped view, where PDF
//! layouts glue labels and values together.
//!
//! NFKC folding turns the masculine ordinal "º" into "o", so label
//! patterns accept both the degree sign and a plain "o" after "N".

use lazy_static::lazy_static;
use regex::Regex;

use crate::classify::Provider;

/// Rule table driving the generic bill extractor for one provider.
#[derive(Debug)]
pub struct ProviderRules {
    pub provider: Provider,

    /// Client/account id label patterns, linear text.
    pub client_id: Vec<Regex>,
    /// Client id patterns for compact text.
    pub client_id_compact: Vec<Regex>,
    /// Looser label used to narrow a right-window before retrying the
    /// linear id patterns inside it.
    pub client_id_window_label: Option<Regex>,

    /// Document (boleta/folio) number patterns, linear text.
    pub document_number: Vec<Regex>,
    /// Document number patterns for compact text.
    pub document_number_compact: Vec<Regex>,
    /// Single-token label for the spatial word/table fallback, when the
    /// provider's layouts warrant it.
    pub document_number_token: Option<Regex>,

    /// Issue date patterns, linear then compact.
    pub issue_date: Vec<Regex>,
    pub issue_date_compact: Vec<Regex>,

    /// Due date patterns, linear then compact.
    pub due_date: Vec<Regex>,
    pub due_date_compact: Vec<Regex>,

    /// "Total to pay" label, used to anchor value windows.
    pub total_label: Regex,
    /// Monetary value shapes tried inside a label window.
    pub total_value: Vec<Regex>,
    /// Label-plus-value patterns for compact text.
    pub total_compact: Vec<Regex>,
    /// Resolved totals below this floor trigger the candidate-scan rescue.
    pub total_floor: i64,

    /// Consumption patterns, linear then compact.
    pub consumption: Vec<Regex>,
    pub consumption_compact: Vec<Regex>,
    /// Unit suffix appended to the normalized consumption reading.
    pub consumption_unit: &'static str,

    /// Supplementary captures carried outside the core schema.
    pub issuer_rut: Option<Regex>,
    pub vat_amount: Option<Regex>,
    pub billed_through: Option<Regex>,
    pub period_amount: Option<Regex>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
}

fn one(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// Monetary value shapes shared by every provider's total-window search:
/// currency-prefixed, dotted-thousands, then a bare digit run.
fn total_value_shapes() -> Vec<Regex> {
    compile(&[
        r"\$\s*(\d[\d\.]{0,17})",
        r"(\d{1,3}(?:\.\d{3})+)",
        r"(\d{4,9})",
    ])
}

lazy_static! {
    static ref METROGAS: ProviderRules = ProviderRules {
        provider: Provider::Metrogas,
        client_id: compile(&[
            r"(?i)(?:Nro|N[º°o]|Número)\s+de\s+cuenta\s*[:\-]?\s*([\d\-kK]{7,12})",
            r"(?is)n[uú]mero\s+de\s+cuent[ao].*?([\d\-kK]{7,12})",
        ]),
        client_id_compact: compile(&[
            r"(?i)N[uú]merodecuent[ao]:?([\d\-kK]{7,12})",
            r"(?i)Nrodecuenta:?([\d\-kK]{7,12})",
        ]),
        client_id_window_label: Some(one(r"(?i)n[uú]mero\s+de\s+cuent[ao]")),
        document_number: compile(&[
            r"(?i)BOLETA\s+ELECTR[ÓO]NICA\s*N[º°o]?\s*(\d+)",
        ]),
        document_number_compact: compile(&[
            r"(?i)BOLETAELECTR[ÓO]NICA\s*N[º°o]?\s*(\d+)",
        ]),
        document_number_token: None,
        issue_date: compile(&[
            r"(?i)FECHA\s+EMISI[ÓO]N[:\s]*(\d{2}[-/]\w{3}[-/]\d{4})",
        ]),
        issue_date_compact: compile(&[
            r"(?i)FECHAEMISI[ÓO]N:?(\d{2}-\w{3}-\d{4})",
        ]),
        due_date: compile(&[
            r"(?i)VENCIMIENTO\s*(\d{2}[-/]\w{3}[-/]\d{4})",
        ]),
        due_date_compact: compile(&[
            r"(?i)VENCIMIENTO(\d{2}-\w{3}-\d{4})",
        ]),
        total_label: one(r"(?i)TOTAL\s*A\s*PAGAR"),
        total_value: total_value_shapes(),
        total_compact: compile(&[
            r"(?i)TOTALAPAGAR\$?\s*([\d\.,]+)",
        ]),
        total_floor: 1_000,
        consumption: compile(&[
            r"(?i)CONSUMO\s+TOTAL\s*([\d\.,]+)\s*m3",
        ]),
        consumption_compact: compile(&[
            r"(?i)CONSUMOTOTAL([\d\.,]+)m3",
        ]),
        consumption_unit: "m3",
        issuer_rut: Some(one(r"(?i)R\.?U\.?T\.?\s*[:\-]?\s*([\d\.]+-[\dkK])")),
        vat_amount: Some(one(r"(?is)\bIVA\b.*?\$?\s*(\d{1,3}(?:\.\d{3})+|\d+)")),
        billed_through: Some(one(
            r"(?i)Considera\s+movimientos\s+hasta\s*(\d{2}[-/]\d{2}[-/]\d{4})"
        )),
        period_amount: None,
    };

    static ref ENEL: ProviderRules = ProviderRules {
        provider: Provider::Enel,
        client_id: compile(&[
            r"(?i)(?:N[º°o]|Número)\s+Cliente\s*[:\-]?\s*(\d{7,12})",
        ]),
        client_id_compact: compile(&[
            r"(?i)N[º°o]?Cliente:?(\d{7,12})",
        ]),
        client_id_window_label: Some(one(r"(?i)N[º°o]?\s*Cliente")),
        document_number: compile(&[
            r"(?i)Boleta\s+Electr[oó]nica\s*N[º°o]?\s*(\d+)",
        ]),
        document_number_compact: compile(&[
            r"(?i)BoletaElectr[oó]nica\s*N[º°o]?\s*(\d+)",
        ]),
        document_number_token: None,
        issue_date: compile(&[
            r"(?i)Fecha\s+de\s+Emisi[oó]n\s*[:\-]?\s*(\d{1,2}\s+\w{3}\s+\d{4})",
        ]),
        issue_date_compact: compile(&[
            r"(?i)Fechadeemisi[oó]n:?(\d{1,2}\w{3}\d{4})",
        ]),
        due_date: compile(&[
            r"(?i)Fecha\s+de\s+vencimi(?:ento|miento)\s*[:\-]?\s*(\d{1,2}\s+\w{3}\s+\d{4})",
        ]),
        due_date_compact: compile(&[
            r"(?i)Fechadevencimiento:?(\d{1,2}\w{3}\d{4})",
        ]),
        total_label: one(r"(?i)TOTAL\s*A\s*PAGAR"),
        total_value: total_value_shapes(),
        total_compact: compile(&[
            r"(?i)TOTALAPAGAR\$?\s*([\d\.,]+)",
        ]),
        total_floor: 1_000,
        consumption: compile(&[
            r"(?i)Consumo\s+total\s+del\s+mes\s*=?\s*(\d+)\s*kWh?",
        ]),
        consumption_compact: compile(&[
            r"(?i)Consumototaldelmes=?(\d+)kWh?",
        ]),
        consumption_unit: "kWh",
        issuer_rut: Some(one(r"(?i)R\.?U\.?T\.?\s*[:\-]?\s*([\d\.]+-[\dkK])")),
        vat_amount: None,
        billed_through: None,
        period_amount: Some(one(
            r"(?i)Monto\s+del\s+per[ií]odo\s*[:\-]?\s*\$?\s*(\d{1,3}(?:\.\d{3})+|\d+)"
        )),
    };

    static ref AGUAS_ANDINAS: ProviderRules = ProviderRules {
        provider: Provider::AguasAndinas,
        client_id: compile(&[
            r"(?i)(?:Nro|N[º°o]|Número)\s+de\s+cuenta\s*[:\-]?\s*([\d\-kK]{6,})",
            r"(?i)(?:Nro|N[º°o]|Número)\s+cliente\s*[:\-]?\s*([\d\-kK]{6,})",
            r"(?i)(?:Nro|N[º°o]|Número)\s+servicio\s*[:\-]?\s*([\d\-kK]{6,})",
            r"(?i)(?:Cuenta\s+Contrato|Contrato)\s*[:\-]?\s*([\d\-kK]{6,})",
            r"(?i)Su\s+n[uú]mero\s+de\s+Cuenta\s+es\s*[:\-]?\s*([\d\-kK]{6,})",
        ]),
        client_id_compact: compile(&[
            r"(?i)Sun[uú]merodeCuentaes:?([\d\-kK]{6,})",
            r"(?i)(?:Nrodecuenta|N[uú]merodeCuenta):?([\d\-kK]{6,})",
        ]),
        client_id_window_label: Some(one(
            r"(?i)Su\s+n[uú]mero\s+de\s+Cuenta\s+es|Nro\s+de\s+cuenta"
        )),
        document_number: compile(&[
            r"(?i)BOLETA\s+ELECTR[ÓO]NICA\s*N[º°o]?\s*(\d+)",
            r"(?i)Folio\s*[:\-]?\s*(\d{5,})",
            r"(?i)(?:Documento|Doc\.?)\s*(?:N[º°o]|#)?\s*[:\-]?\s*(\d{5,})",
            r"(?i)\bN[º°]\s*(\d{5,})",
        ]),
        document_number_compact: compile(&[
            r"(?i)BOLETAELECTR[ÓO]NICA\s*N[º°o]?\s*(\d+)",
            r"(?i)N[º°]\s*(\d{5,})",
        ]),
        document_number_token: Some(one(r"(?i)^(?:N[º°o]?|Folio|Documento)[.:]?$")),
        issue_date: compile(&[
            r"(?i)FECHA\s+EMISI[ÓO]N[:\s]*([0-3]?\d[-/]\w{3}[-/]\d{4})",
            r"(?i)FECHA\s+DE\s+EMISI[ÓO]N[:\s]*([0-3]?\d[-/][01]?\d[-/]\d{4})",
            r"(?i)EMISI[ÓO]N[:\s]*([0-3]?\d\s+\w+\s+\d{4})",
        ]),
        issue_date_compact: compile(&[
            r"(?i)FECHAEMISI[ÓO]N:?(\d{2}-\w{3}-20\d{2})",
            r"(?i)Fechadeemisi[oó]n:?(\d{2}\w{3}\d{4})",
        ]),
        due_date: compile(&[
            r"(?i)VENCIMIENTO[:\s]*([0-3]?\d[-/]\w{3}[-/]\d{4})",
            r"(?i)FECHA\s+DE\s+VENCIM(?:IENTO|MIENTO)\s*[:\-]?\s*([0-3]?\d\s+\w+\s+\d{4})",
        ]),
        due_date_compact: compile(&[
            r"(?i)VENCIMIENTO(\d{2}-\w{3}-20\d{2})",
            r"(?i)PAGARHASTA(\d{2}-\w{3}-20\d{2})",
        ]),
        total_label: one(r"(?i)TOTAL\s*A\s*PAGAR"),
        total_value: total_value_shapes(),
        total_compact: compile(&[
            r"(?i)TOTALAPAGAR\$*([\d\.,]+)",
        ]),
        total_floor: 10_000,
        consumption: compile(&[
            r"(?i)CONSUMO\s+TOTAL\s*([\d\.,]+)\s*m3",
            r"(?i)CONSUMO\s+DEL\s+PER[IÍ]ODO\s*([\d\.,]+)\s*m3",
            r"(?i)CONSUMO\s+FACTURADO\s*([\d\.,]+)\s*m3",
            r"(?i)DIFERENCIA\s+DE\s+LECTURAS\s*([\d\.,]+)\s*m3",
        ]),
        consumption_compact: compile(&[
            r"(?i)CONSUMOAGUAPOTABLENOPUNTA([\d\.,]+)",
            r"(?i)CONSUMOAGUA([\d\.,]+)",
            r"(?i)CONSUMOTOTAL\([\w\d]*\)=([\d\.,]+)",
            r"(?i)CONSUMOTOTAL([\d\.,]+)",
        ]),
        consumption_unit: "m3",
        issuer_rut: Some(one(r"(?i)R\.?U\.?T\.?\s*[:\-]?\s*([\d\.]+-[\dkK])")),
        vat_amount: Some(one(r"(?is)\bIVA\b.*?\$?\s*(\d{1,3}(?:\.\d{3})+|\d+)")),
        billed_through: None,
        period_amount: None,
    };
}

/// The rule table for a provider, or `None` for [`Provider::Unknown`].
pub fn rules_for(provider: Provider) -> Option<&'static ProviderRules> {
    match provider {
        Provider::Metrogas => Some(&METROGAS),
        Provider::Enel => Some(&ENEL),
        Provider::AguasAndinas => Some(&AGUAS_ANDINAS),
        Provider::Unknown => None,
    }
}
