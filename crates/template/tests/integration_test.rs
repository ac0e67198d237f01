//! Integration tests for template population

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use template::{
    embed_asset, load_data, load_template, marker, monthly_entries, p9_rows, transaction_rows,
    transactions, P9Column, TemplateError, TokenBinding, TokenTable, Totals,
};

fn monthly(month: &str, base: f64) -> Value {
    let mut entry = json!({ "month": month });
    for (i, column) in P9Column::ALL.iter().enumerate() {
        entry[column.field_name()] = json!(base + i as f64 * 0.01);
    }
    entry
}

fn p9_data(entries: Vec<Value>) -> Value {
    json!({
        "year": "2024",
        "employer": { "name": "Ukulima Sacco", "pin": "P051234567X" },
        "employee": { "lastName": "Doe", "firstName": "Jane", "pin": "A009876543Z" },
        "totals": { "chargeablePay": 1000, "payeTax": 0 },
        "monthlyData": entries
    })
}

#[test]
fn test_p9_rows_show_basic_salary_in_row_and_totals() {
    let mut entry = json!({ "month": "January" });
    for column in P9Column::ALL {
        entry[column.field_name()] = json!(0);
    }
    entry["basicSalary"] = json!(1000);

    let rows = p9_rows(&monthly_entries(&p9_data(vec![entry])).unwrap());

    assert!(rows.starts_with("<tr><td>January</td><td>1000.00</td>"));
    assert!(rows.contains("<td>TOTAL</td><td>1000.00</td>"));
}

#[test]
fn test_totals_equal_column_sums() {
    let entries: Vec<Value> = ["January", "February", "March", "April"]
        .iter()
        .enumerate()
        .map(|(i, month)| monthly(month, 1000.0 * (i + 1) as f64 + 0.333))
        .collect();
    let data = p9_data(entries.clone());
    let parsed = monthly_entries(&data).unwrap();
    let totals = Totals::from_entries(&parsed);

    for column in P9Column::ALL {
        let expected: f64 = entries
            .iter()
            .map(|entry| entry[column.field_name()].as_f64().unwrap())
            .sum();
        assert!((totals.value(column) - expected).abs() < 0.005, "{column:?}");
    }
}

#[test]
fn test_missing_binding_aborts_population() {
    let data = p9_data(vec![monthly("January", 1.0)]);
    let bindings = [
        TokenBinding::text("EMPLOYER_NAME", "$.employer.name"),
        TokenBinding::text("EMPLOYER_ADDRESS", "$.employer.address"),
    ];

    match TokenTable::from_bindings(&bindings, &data) {
        Err(TemplateError::MissingField(path)) => assert_eq!(path, "$.employer.address"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[test]
fn test_population_is_idempotent() {
    let html = "<h1>P9 {{YEAR}}</h1><p>{{TOTAL_TAX}}</p><table>{{MONTHLY_DATA_ROWS}}</table>";
    let data = p9_data(vec![monthly("January", 10.0)]);
    let table = TokenTable::from_bindings(
        &[
            TokenBinding::text("YEAR", "$.year"),
            TokenBinding::currency("TOTAL_TAX", "$.totals.payeTax"),
        ],
        &data,
    )
    .unwrap()
    .with("MONTHLY_DATA_ROWS", p9_rows(&monthly_entries(&data).unwrap()));

    let once = table.apply(html);
    assert!(!once.contains("{{"));
    assert_eq!(table.apply(&once), once);
}

#[test]
fn test_exactly_one_amount_cell_per_transaction() {
    let data = json!({
        "transactions": [
            { "date": "01/01", "docNo": "D1", "description": "Deposit", "credit": "500.00", "debit": "", "balance": "500.00" },
            { "date": "02/01", "docNo": "D2", "description": "Withdrawal", "credit": "", "debit": "100.00", "balance": "400.00" },
            { "date": "03/01", "docNo": "D3", "description": "Memo", "credit": "", "debit": "", "balance": "400.00" }
        ]
    });
    let rows = transaction_rows(&transactions(&data).unwrap());
    let rows: Vec<&str> = rows
        .split("</tr>")
        .filter(|row| !row.is_empty())
        .collect();

    assert_eq!(rows.len(), 3);
    assert!(rows[0].contains("<td class='amount-col table-credit'>500.00</td><td class='amount-col'></td>"));
    assert!(rows[1].contains("<td class='amount-col'></td><td class='amount-col table-debit'>100.00</td>"));
    assert!(rows[2].contains("<td class='amount-col'></td><td class='amount-col table-debit'></td>"));
    for row in &rows[..2] {
        assert_eq!(row.matches("<td class='amount-col'></td>").count(), 1);
    }
}

#[test]
fn test_statement_population_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("statement.html");
    let data_path = dir.path().join("statement.json");
    let logo_path = dir.path().join("logo.png");

    fs::write(
        &template_path,
        "<img src='assets/ukulima-sacco-logo.png'><p>{{CUSTOMER_NAME}}</p><table>{{TRANSACTIONS}}</table>",
    )
    .unwrap();
    fs::write(
        &data_path,
        r#"{ "customer": { "name": "Jane Doe" }, "transactions": [] }"#,
    )
    .unwrap();
    fs::write(&logo_path, [0x89, b'P', b'N', b'G']).unwrap();

    let html = load_template(&template_path).unwrap();
    let data = load_data(&data_path).unwrap();
    let table = TokenTable::from_bindings(&[TokenBinding::text("CUSTOMER_NAME", "$.customer.name")], &data)
        .unwrap()
        .with("TRANSACTIONS", transaction_rows(&transactions(&data).unwrap()));
    let html = embed_asset(&table.apply(&html), &logo_path, "assets/ukulima-sacco-logo.png");

    assert_eq!(
        html,
        "<img src='data:image/png;base64,iVBORw=='><p>Jane Doe</p><table></table>"
    );
}

#[test]
fn test_absent_logo_leaves_reference() {
    let dir = tempfile::tempdir().unwrap();
    let html = "<img src='assets/ukulima-sacco-logo.png'>";
    let out = embed_asset(html, dir.path().join("nope.png"), "assets/ukulima-sacco-logo.png");
    assert_eq!(out, html);
    assert!(!out.contains(&marker("TRANSACTIONS")));
}
