//! P9 and account statement orchestration
//!
//! Both flows run the same pipeline: load the template, then the data;
//! substitute scalar tokens; substitute the generated rows; (statement only)
//! embed the logo; render to `{output_dir}/{prefix}_{timestamp}.pdf`.

use crate::config::{DocumentRequest, GeneratorConfig};
use crate::error::Result;
use crate::output::{output_path, Clock, DocumentKind, SystemClock};
use crate::render::{HtmlPdfRenderer, PdfRenderer};
use log::{debug, info};
use serde_json::Value;
use std::path::PathBuf;
use template::{
    embed_asset, load_data, load_template, monthly_entries, p9_rows, transaction_rows,
    transactions, TokenBinding, TokenTable,
};

pub const P9_ROWS_TOKEN: &str = "MONTHLY_DATA_ROWS";
pub const STATEMENT_ROWS_TOKEN: &str = "TRANSACTIONS";

pub const P9_TOKENS: &[TokenBinding] = &[
    TokenBinding::text("YEAR", "$.year"),
    TokenBinding::text("EMPLOYER_NAME", "$.employer.name"),
    TokenBinding::text("EMPLOYER_PIN", "$.employer.pin"),
    TokenBinding::text("EMPLOYEE_LASTNAME", "$.employee.lastName"),
    TokenBinding::text("EMPLOYEE_FIRSTNAME", "$.employee.firstName"),
    TokenBinding::text("EMPLOYEE_PIN", "$.employee.pin"),
    TokenBinding::currency("TOTAL_CHARGEABLE_PAY", "$.totals.chargeablePay"),
    TokenBinding::currency("TOTAL_TAX", "$.totals.payeTax"),
];

pub const STATEMENT_TOKENS: &[TokenBinding] = &[
    TokenBinding::text("DATE_ISSUED", "$.dateIssued"),
    TokenBinding::text("CUSTOMER_NAME", "$.customer.name"),
    TokenBinding::text("CUSTOMER_PHONE", "$.customer.phone"),
    TokenBinding::text("STATEMENT_PERIOD", "$.statementPeriod"),
    TokenBinding::text("ACCOUNT_NUMBER", "$.account.number"),
    TokenBinding::text("OPENING_BALANCE", "$.balances.opening"),
    TokenBinding::text("TOTAL_CREDITS", "$.balances.totalCredits"),
    TokenBinding::text("TOTAL_DEBITS", "$.balances.totalDebits"),
    TokenBinding::text("CLOSING_BALANCE", "$.balances.closing"),
    TokenBinding::text("PAGE_NUMBER", "$.pageNumber"),
];

/// Substitute the P9 tokens and monthly rows into `html`
pub fn populate_p9(html: &str, data: &Value) -> template::Result<String> {
    let entries = monthly_entries(data)?;
    debug!("P9 data has {} monthly entries", entries.len());

    let table = TokenTable::from_bindings(P9_TOKENS, data)?.with(P9_ROWS_TOKEN, p9_rows(&entries));
    Ok(table.apply(html))
}

/// Substitute the statement tokens and transaction rows into `html`
pub fn populate_statement(html: &str, data: &Value) -> template::Result<String> {
    let transactions = transactions(data)?;
    debug!("Statement data has {} transactions", transactions.len());

    let table = TokenTable::from_bindings(STATEMENT_TOKENS, data)?
        .with(STATEMENT_ROWS_TOKEN, transaction_rows(&transactions));
    Ok(table.apply(html))
}

/// Runs generation requests against a renderer and a clock
pub struct DocumentGenerator<R = HtmlPdfRenderer, C = SystemClock> {
    config: GeneratorConfig,
    renderer: R,
    clock: C,
}

impl DocumentGenerator {
    /// Production generator: HTML renderer configured from `config`, local time
    pub fn new(config: GeneratorConfig) -> Self {
        let renderer = HtmlPdfRenderer::from_config(&config);
        Self::with_parts(config, renderer, SystemClock)
    }
}

impl<R: PdfRenderer, C: Clock> DocumentGenerator<R, C> {
    pub fn with_parts(config: GeneratorConfig, renderer: R, clock: C) -> Self {
        Self {
            config,
            renderer,
            clock,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// P9 report from the configured paths
    pub fn generate_p9(&self) -> Result<PathBuf> {
        self.generate(&self.config.request(DocumentKind::P9Report))
    }

    /// Account statement from the configured paths
    pub fn generate_account_statement(&self) -> Result<PathBuf> {
        self.generate(&self.config.request(DocumentKind::AccountStatement))
    }

    /// Run one request and return the path of the written PDF
    pub fn generate(&self, request: &DocumentRequest) -> Result<PathBuf> {
        info!(
            "Generating {} from {} and {}",
            request.kind,
            request.template.display(),
            request.data.display()
        );

        let html = load_template(&request.template)?;
        let data = load_data(&request.data)?;

        let html = match request.kind {
            DocumentKind::P9Report => populate_p9(&html, &data)?,
            DocumentKind::AccountStatement => embed_asset(
                &populate_statement(&html, &data)?,
                &self.config.logo_file,
                &self.config.logo_reference,
            ),
        };

        let output = output_path(&self.config.output_dir, request.kind, self.clock.now());
        self.renderer.render_to_file(&html, &output)?;
        Ok(output)
    }
}
