//! Table row generation for P9 monthly entries and statement transactions

use crate::binding::{require_binding, value_to_f64, value_to_string};
use crate::format::format_currency;
use crate::{Result, TemplateError};
use log::debug;
use serde_json::Value;
use std::fmt::Write;

/// Data path of the P9 monthly entries
pub const MONTHLY_DATA_PATH: &str = "$.monthlyData";
/// Data path of the statement transactions
pub const TRANSACTIONS_PATH: &str = "$.transactions";

/// Style of the P9 totals row
const TOTALS_ROW_STYLE: &str = "font-weight: bold; background-color: #f0f0f0;";

/// Numeric P9 columns, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum P9Column {
    BasicSalary,
    BenefitsNonCash,
    ValueOfQuarters,
    TotalGrossPay,
    RetirementContribution30Percent,
    RetirementContributionActual,
    RetirementContributionFixed,
    OwnerOccupiedInterest,
    TotalRetirementAndInterest,
    ChargeablePay,
    TaxCharged,
    PersonalRelief,
    InsuranceRelief,
    PayeTax,
}

impl P9Column {
    pub const COUNT: usize = 14;

    pub const ALL: [P9Column; Self::COUNT] = [
        P9Column::BasicSalary,
        P9Column::BenefitsNonCash,
        P9Column::ValueOfQuarters,
        P9Column::TotalGrossPay,
        P9Column::RetirementContribution30Percent,
        P9Column::RetirementContributionActual,
        P9Column::RetirementContributionFixed,
        P9Column::OwnerOccupiedInterest,
        P9Column::TotalRetirementAndInterest,
        P9Column::ChargeablePay,
        P9Column::TaxCharged,
        P9Column::PersonalRelief,
        P9Column::InsuranceRelief,
        P9Column::PayeTax,
    ];

    /// Field name in the monthly entry JSON
    pub fn field_name(self) -> &'static str {
        match self {
            P9Column::BasicSalary => "basicSalary",
            P9Column::BenefitsNonCash => "benefitsNonCash",
            P9Column::ValueOfQuarters => "valueOfQuarters",
            P9Column::TotalGrossPay => "totalGrossPay",
            P9Column::RetirementContribution30Percent => "retirementContribution30Percent",
            P9Column::RetirementContributionActual => "retirementContributionActual",
            P9Column::RetirementContributionFixed => "retirementContributionFixed",
            P9Column::OwnerOccupiedInterest => "ownerOccupiedInterest",
            P9Column::TotalRetirementAndInterest => "totalRetirementAndInterest",
            P9Column::ChargeablePay => "chargeablePay",
            P9Column::TaxCharged => "taxCharged",
            P9Column::PersonalRelief => "personalRelief",
            P9Column::InsuranceRelief => "insuranceRelief",
            P9Column::PayeTax => "payeTax",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One month of a P9 report
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyEntry {
    pub month: String,
    pub values: [f64; P9Column::COUNT],
}

impl MonthlyEntry {
    /// Read an entry; `location` is its binding path, used in errors
    pub fn from_value(entry: &Value, location: &str) -> Result<Self> {
        let month = value_to_string(field(entry, location, "month")?);

        let mut values = [0.0; P9Column::COUNT];
        for column in P9Column::ALL {
            values[column.index()] = value_to_f64(field(entry, location, column.field_name())?);
        }

        Ok(Self { month, values })
    }

    pub fn value(&self, column: P9Column) -> f64 {
        self.values[column.index()]
    }
}

/// Column sums over all monthly entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub values: [f64; P9Column::COUNT],
}

impl Totals {
    pub fn from_entries(entries: &[MonthlyEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut totals, entry| {
            for (total, value) in totals.values.iter_mut().zip(entry.values) {
                *total += value;
            }
            totals
        })
    }

    pub fn value(&self, column: P9Column) -> f64 {
        self.values[column.index()]
    }
}

/// Money moving into or out of the account
///
/// A transaction shows exactly one of the two amount columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Movement {
    Credit(String),
    Debit(String),
}

impl Movement {
    /// A non-empty credit wins; otherwise the (possibly empty) debit is used
    pub fn from_fields(credit: &str, debit: &str) -> Self {
        if credit.is_empty() {
            Movement::Debit(debit.to_string())
        } else {
            Movement::Credit(credit.to_string())
        }
    }
}

/// One line of an account statement; all fields are display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub date: String,
    pub doc_no: String,
    pub description: String,
    pub movement: Movement,
    pub balance: String,
}

impl Transaction {
    /// Read a transaction; `location` is its binding path, used in errors
    pub fn from_value(entry: &Value, location: &str) -> Result<Self> {
        let text = |name: &str| field(entry, location, name).map(value_to_string);

        Ok(Self {
            date: text("date")?,
            doc_no: text("docNo")?,
            description: text("description")?,
            movement: Movement::from_fields(&text("credit")?, &text("debit")?),
            balance: text("balance")?,
        })
    }
}

fn field<'a>(entry: &'a Value, location: &str, name: &str) -> Result<&'a Value> {
    entry
        .get(name)
        .ok_or_else(|| TemplateError::MissingField(format!("{location}.{name}")))
}

/// Elements of the array at `path`
fn array_at<'a>(data: &'a Value, path: &str) -> Result<&'a [Value]> {
    require_binding(path, data)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| TemplateError::UnexpectedType {
            path: path.to_string(),
            expected: "an array",
        })
}

/// Read `$.monthlyData`
pub fn monthly_entries(data: &Value) -> Result<Vec<MonthlyEntry>> {
    array_at(data, MONTHLY_DATA_PATH)?
        .iter()
        .enumerate()
        .map(|(i, entry)| MonthlyEntry::from_value(entry, &format!("{MONTHLY_DATA_PATH}[{i}]")))
        .collect()
}

/// Read `$.transactions`
pub fn transactions(data: &Value) -> Result<Vec<Transaction>> {
    array_at(data, TRANSACTIONS_PATH)?
        .iter()
        .enumerate()
        .map(|(i, entry)| Transaction::from_value(entry, &format!("{TRANSACTIONS_PATH}[{i}]")))
        .collect()
}

/// One `<tr>` per entry followed by the totals row
pub fn p9_rows(entries: &[MonthlyEntry]) -> String {
    let mut rows = String::new();

    for entry in entries {
        rows.push_str("<tr>");
        push_cell(&mut rows, &entry.month);
        for value in entry.values {
            push_cell(&mut rows, &format_currency(value));
        }
        rows.push_str("</tr>");
    }

    let totals = Totals::from_entries(entries);
    let _ = write!(rows, "<tr style='{TOTALS_ROW_STYLE}'>");
    push_cell(&mut rows, "TOTAL");
    for value in totals.values {
        push_cell(&mut rows, &format_currency(value));
    }
    rows.push_str("</tr>");

    debug!("Generated {} monthly row(s) and totals", entries.len());
    rows
}

/// One `<tr>` per transaction
pub fn transaction_rows(transactions: &[Transaction]) -> String {
    let mut rows = String::new();

    for transaction in transactions {
        rows.push_str("<tr>");
        let _ = write!(rows, "<td class='date-col'>{}</td>", transaction.date);
        let _ = write!(rows, "<td class='doc-col'>{}</td>", transaction.doc_no);
        let _ = write!(
            rows,
            "<td class='description-col'>{}</td>",
            transaction.description
        );
        match &transaction.movement {
            Movement::Credit(amount) => {
                let _ = write!(
                    rows,
                    "<td class='amount-col table-credit'>{amount}</td><td class='amount-col'></td>"
                );
            }
            Movement::Debit(amount) => {
                let _ = write!(
                    rows,
                    "<td class='amount-col'></td><td class='amount-col table-debit'>{amount}</td>"
                );
            }
        }
        let _ = write!(
            rows,
            "<td class='balance-col balance-amount'>{}</td>",
            transaction.balance
        );
        rows.push_str("</tr>");
    }

    debug!("Generated {} transaction row(s)", transactions.len());
    rows
}

fn push_cell(rows: &mut String, content: &str) {
    rows.push_str("<td>");
    rows.push_str(content);
    rows.push_str("</td>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(month: &str, basic_salary: f64) -> MonthlyEntry {
        let mut values = [0.0; P9Column::COUNT];
        values[0] = basic_salary;
        MonthlyEntry {
            month: month.to_string(),
            values,
        }
    }

    #[test]
    fn test_column_order() {
        let names: Vec<&str> = P9Column::ALL.iter().map(|c| c.field_name()).collect();
        assert_eq!(names.first(), Some(&"basicSalary"));
        assert_eq!(names.last(), Some(&"payeTax"));
        assert_eq!(names.len(), 14);
        for (i, column) in P9Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), i);
        }
    }

    #[test]
    fn test_monthly_entry_coercion() {
        let mut value = json!({ "month": "January" });
        for column in P9Column::ALL {
            value[column.field_name()] = json!(0);
        }
        value["basicSalary"] = json!("1500.5");
        value["benefitsNonCash"] = json!(true);
        value["valueOfQuarters"] = json!(null);

        let entry = MonthlyEntry::from_value(&value, "$.monthlyData[0]").unwrap();
        assert_eq!(entry.month, "January");
        assert_eq!(entry.value(P9Column::BasicSalary), 1500.5);
        assert_eq!(entry.value(P9Column::BenefitsNonCash), 1.0);
        assert_eq!(entry.value(P9Column::ValueOfQuarters), 0.0);
    }

    #[test]
    fn test_monthly_entry_missing_field() {
        let value = json!({ "month": "January", "basicSalary": 1 });
        match MonthlyEntry::from_value(&value, "$.monthlyData[3]") {
            Err(TemplateError::MissingField(path)) => {
                assert_eq!(path, "$.monthlyData[3].benefitsNonCash")
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_totals_fold() {
        let entries = vec![entry("Jan", 1000.0), entry("Feb", 250.25)];
        let totals = Totals::from_entries(&entries);
        assert_eq!(totals.value(P9Column::BasicSalary), 1250.25);
        assert_eq!(totals.value(P9Column::PayeTax), 0.0);
        assert_eq!(Totals::from_entries(&[]), Totals::default());
    }

    #[test]
    fn test_p9_rows_markup() {
        let rows = p9_rows(&[entry("January", 1000.0)]);
        let zeros = "<td>0.00</td>".repeat(13);

        assert_eq!(
            rows,
            format!(
                "<tr><td>January</td><td>1000.00</td>{zeros}</tr>\
                 <tr style='font-weight: bold; background-color: #f0f0f0;'>\
                 <td>TOTAL</td><td>1000.00</td>{zeros}</tr>"
            )
        );
    }

    #[test]
    fn test_p9_rows_empty_still_has_totals() {
        let rows = p9_rows(&[]);
        assert!(rows.starts_with("<tr style="));
        assert_eq!(rows.matches("<tr").count(), 1);
        assert_eq!(rows.matches("<td>0.00</td>").count(), 14);
    }

    #[test]
    fn test_movement_from_fields() {
        assert_eq!(
            Movement::from_fields("500.00", ""),
            Movement::Credit("500.00".to_string())
        );
        assert_eq!(
            Movement::from_fields("", "120.00"),
            Movement::Debit("120.00".to_string())
        );
        assert_eq!(Movement::from_fields("", ""), Movement::Debit(String::new()));
        assert_eq!(
            Movement::from_fields("1.00", "2.00"),
            Movement::Credit("1.00".to_string())
        );
    }

    #[test]
    fn test_transaction_row_markup() {
        let transaction = Transaction {
            date: "01/01/2024".to_string(),
            doc_no: "DOC1".to_string(),
            description: "Deposit".to_string(),
            movement: Movement::Credit("500.00".to_string()),
            balance: "1500.00".to_string(),
        };

        assert_eq!(
            transaction_rows(&[transaction]),
            "<tr><td class='date-col'>01/01/2024</td><td class='doc-col'>DOC1</td>\
             <td class='description-col'>Deposit</td>\
             <td class='amount-col table-credit'>500.00</td><td class='amount-col'></td>\
             <td class='balance-col balance-amount'>1500.00</td></tr>"
        );
    }

    #[test]
    fn test_transaction_from_value() {
        let value = json!({
            "date": "02/01/2024",
            "docNo": 77,
            "description": "ATM",
            "credit": "",
            "debit": "200.00",
            "balance": "1300.00"
        });
        let transaction = Transaction::from_value(&value, "$.transactions[0]").unwrap();
        assert_eq!(transaction.doc_no, "77");
        assert_eq!(transaction.movement, Movement::Debit("200.00".to_string()));
    }

    #[test]
    fn test_null_credit_renders_blank_debit_pair() {
        let mut value = json!({
            "date": "03/01/2024",
            "docNo": "DOC3",
            "description": "Charge",
            "credit": null,
            "debit": "50.00",
            "balance": "1250.00"
        });
        let transaction = Transaction::from_value(&value, "$.transactions[2]").unwrap();
        assert_eq!(transaction.movement, Movement::Debit("50.00".to_string()));
        assert!(transaction_rows(&[transaction]).contains(
            "<td class='amount-col'></td><td class='amount-col table-debit'>50.00</td>"
        ));

        value["debit"] = Value::Null;
        let transaction = Transaction::from_value(&value, "$.transactions[2]").unwrap();
        assert_eq!(transaction.movement, Movement::Debit(String::new()));
        assert!(transaction_rows(&[transaction])
            .contains("<td class='amount-col'></td><td class='amount-col table-debit'></td>"));
    }

    #[test]
    fn test_array_paths() {
        let data = json!({ "monthlyData": [], "transactions": {} });
        assert!(monthly_entries(&data).unwrap().is_empty());
        assert!(matches!(
            transactions(&data),
            Err(TemplateError::UnexpectedType { .. })
        ));
        assert!(matches!(
            monthly_entries(&json!({})),
            Err(TemplateError::MissingField(_))
        ));
    }
}
