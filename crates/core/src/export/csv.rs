//! CSV rendering of reports.

use rust_decimal::Decimal;

use super::{ExportFile, ExportFormat};
use crate::reports::{
    AccountBalanceReport, BalanceSheetGroup, BalanceSheetReport, Figure, GlDetailReport,
    GlSummaryReport, ProfitLossReport, ReportError, ReportHeader, StatementSection,
    TrialBalanceReport,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

type CsvWriter = ::csv::Writer<Vec<u8>>;

fn writer() -> CsvWriter {
    ::csv::WriterBuilder::new()
        .flexible(true)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(wtr: CsvWriter, filename: String) -> Result<ExportFile, ReportError> {
    let body = wtr
        .into_inner()
        .map_err(|e| ReportError::Export(e.to_string()))?;
    Ok(ExportFile {
        filename,
        content_type: ExportFormat::Csv.content_type(),
        body,
    })
}

fn write_header(wtr: &mut CsvWriter, header: &ReportHeader) -> Result<(), ReportError> {
    wtr.write_record([header.title.as_str()])?;
    wtr.write_record(["Company", header.company_name.as_str()])?;
    wtr.write_record(["Currency", header.currency.as_str()])?;
    wtr.write_record([
        "Period".to_string(),
        header.start_date.format(DATE_FORMAT).to_string(),
        header.end_date.format(DATE_FORMAT).to_string(),
    ])?;
    wtr.write_record(["Journal type", header.journal_type.as_str()])?;
    wtr.write_record([""])?;
    Ok(())
}

fn range_suffix(header: &ReportHeader) -> String {
    format!(
        "{}_{}",
        header.start_date.format(DATE_FORMAT),
        header.end_date.format(DATE_FORMAT)
    )
}

fn amount(value: Decimal) -> String {
    format!("{value:.2}")
}

fn opt_amount(value: Option<Decimal>) -> String {
    value.map(amount).unwrap_or_default()
}

/// Filename-safe form of a period name: `January 2024` becomes `January-2024`.
#[must_use]
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Trial balance as `trial-balance_{start}_{end}.csv`.
///
/// # Errors
///
/// `Export` when writing fails.
pub fn trial_balance(report: &TrialBalanceReport) -> Result<ExportFile, ReportError> {
    let mut wtr = writer();
    write_header(&mut wtr, &report.header)?;
    wtr.write_record([
        "Code",
        "Account",
        "Opening",
        "Debit",
        "Credit",
        "Closing Debit",
        "Closing Credit",
    ])?;
    for row in &report.rows {
        wtr.write_record([
            row.account.code.clone(),
            row.account.name.clone(),
            amount(row.opening),
            amount(row.debit),
            amount(row.credit),
            amount(row.closing_debit),
            amount(row.closing_credit),
        ])?;
    }
    let t = &report.totals;
    wtr.write_record([
        String::new(),
        "Total".to_string(),
        String::new(),
        amount(t.debit),
        amount(t.credit),
        amount(t.closing_debit),
        amount(t.closing_credit),
    ])?;
    finish(wtr, format!("trial-balance_{}.csv", range_suffix(&report.header)))
}

fn figure_cells(figure: &Figure) -> [String; 4] {
    [
        amount(figure.amount),
        opt_amount(figure.previous),
        opt_amount(figure.change),
        opt_amount(figure.percent_of_revenue),
    ]
}

fn write_section(wtr: &mut CsvWriter, section: &StatementSection) -> Result<(), ReportError> {
    wtr.write_record([section.label.as_str()])?;
    for line in &section.lines {
        let [a, p, c, pct] = figure_cells(&line.figure);
        wtr.write_record([line.code.clone(), line.name.clone(), a, p, c, pct])?;
    }
    write_total(wtr, &format!("Total {}", section.label), &section.total)
}

fn write_total(wtr: &mut CsvWriter, label: &str, figure: &Figure) -> Result<(), ReportError> {
    let [a, p, c, pct] = figure_cells(figure);
    wtr.write_record([String::new(), label.to_string(), a, p, c, pct])?;
    Ok(())
}

const STATEMENT_COLUMNS: [&str; 6] = ["Code", "Account", "Amount", "Previous", "Change", "% of Revenue"];

/// Profit & loss as `profit-loss_{start}_{end}.csv`.
///
/// # Errors
///
/// `Export` when writing fails.
pub fn profit_loss(report: &ProfitLossReport) -> Result<ExportFile, ReportError> {
    let mut wtr = writer();
    write_header(&mut wtr, &report.header)?;
    wtr.write_record(STATEMENT_COLUMNS)?;
    write_section(&mut wtr, &report.revenue)?;
    write_section(&mut wtr, &report.cost_of_revenue)?;
    write_total(&mut wtr, "Gross Profit", &report.gross_profit)?;
    write_section(&mut wtr, &report.operating_expense)?;
    write_total(&mut wtr, "Operating Income", &report.operating_income)?;
    write_section(&mut wtr, &report.other_income)?;
    write_section(&mut wtr, &report.other_expense)?;
    write_total(&mut wtr, "Net Income", &report.net_income)?;
    finish(wtr, format!("profit-loss_{}.csv", range_suffix(&report.header)))
}

fn write_group(wtr: &mut CsvWriter, group: &BalanceSheetGroup) -> Result<(), ReportError> {
    wtr.write_record([group.label.as_str()])?;
    for section in &group.sections {
        write_section(wtr, section)?;
    }
    Ok(())
}

/// Balance sheet as `balance-sheet_{as_of}.csv`.
///
/// # Errors
///
/// `Export` when writing fails.
pub fn balance_sheet(report: &BalanceSheetReport) -> Result<ExportFile, ReportError> {
    let mut wtr = writer();
    write_header(&mut wtr, &report.header)?;
    wtr.write_record(STATEMENT_COLUMNS)?;
    write_group(&mut wtr, &report.assets)?;
    write_total(&mut wtr, "Total Assets", &report.assets.total)?;
    write_group(&mut wtr, &report.liabilities)?;
    write_total(&mut wtr, "Total Liabilities", &report.liabilities.total)?;
    write_group(&mut wtr, &report.equity)?;
    write_total(&mut wtr, "Current Earnings", &report.current_earnings)?;
    write_total(&mut wtr, "Total Equity", &report.equity.total)?;
    write_total(
        &mut wtr,
        "Total Liabilities and Equity",
        &report.liabilities_and_equity,
    )?;
    finish(
        wtr,
        format!(
            "balance-sheet_{}.csv",
            report.header.end_date.format(DATE_FORMAT)
        ),
    )
}

/// General ledger detail as `gl-detail_{start}_{end}.csv`.
///
/// # Errors
///
/// `Export` when writing fails.
pub fn gl_detail(report: &GlDetailReport) -> Result<ExportFile, ReportError> {
    let mut wtr = writer();
    write_header(&mut wtr, &report.header)?;
    wtr.write_record([
        "Date",
        "Journal",
        "Description",
        "Reference",
        "Debit",
        "Credit",
        "Balance",
    ])?;
    for account in &report.accounts {
        wtr.write_record([
            String::new(),
            account.account.code.clone(),
            account.account.name.clone(),
            String::new(),
            String::new(),
            String::new(),
            amount(account.opening),
        ])?;
        for line in &account.lines {
            wtr.write_record([
                line.entry_date.format(DATE_FORMAT).to_string(),
                line.journal_number.clone(),
                line.description
                    .clone()
                    .unwrap_or_else(|| line.journal_description.clone()),
                line.reference.clone().unwrap_or_default(),
                amount(line.debit),
                amount(line.credit),
                amount(line.running_balance),
            ])?;
        }
        wtr.write_record([
            String::new(),
            String::new(),
            format!("Total {}", account.account.code),
            String::new(),
            amount(account.total_debit),
            amount(account.total_credit),
            amount(account.closing),
        ])?;
    }
    finish(wtr, format!("gl-detail_{}.csv", range_suffix(&report.header)))
}

/// General ledger summary as `gl-summary_{start}_{end}.csv`.
///
/// # Errors
///
/// `Export` when writing fails.
pub fn gl_summary(report: &GlSummaryReport) -> Result<ExportFile, ReportError> {
    let mut wtr = writer();
    write_header(&mut wtr, &report.header)?;
    wtr.write_record(["Code", "Account", "Opening", "Debit", "Credit", "Closing"])?;
    for group in &report.groups {
        wtr.write_record([group.group_code.as_str(), group.group_name.as_str()])?;
        for row in &group.accounts {
            wtr.write_record([
                row.account.code.clone(),
                row.account.name.clone(),
                amount(row.opening),
                amount(row.debit),
                amount(row.credit),
                amount(row.closing),
            ])?;
        }
        wtr.write_record([
            String::new(),
            format!("Total {}", group.group_name),
            amount(group.opening),
            amount(group.debit),
            amount(group.credit),
            amount(group.closing),
        ])?;
    }
    wtr.write_record([
        String::new(),
        "Total".to_string(),
        String::new(),
        amount(report.total_debit),
        amount(report.total_credit),
        String::new(),
    ])?;
    finish(wtr, format!("gl-summary_{}.csv", range_suffix(&report.header)))
}

/// Account balance as `account-balance_{period}.csv`.
///
/// # Errors
///
/// `Export` when writing fails.
pub fn account_balance(report: &AccountBalanceReport) -> Result<ExportFile, ReportError> {
    let mut wtr = writer();
    write_header(&mut wtr, &report.header)?;
    wtr.write_record([
        "Code",
        "Account",
        "Opening",
        "Debit",
        "Credit",
        "Closing",
        "Live Closing",
        "In Sync",
    ])?;
    for row in &report.rows {
        let stored = row.stored.as_ref();
        wtr.write_record([
            row.account.code.clone(),
            row.account.name.clone(),
            opt_amount(stored.map(|s| s.opening_balance)),
            opt_amount(stored.map(|s| s.debit_movement)),
            opt_amount(stored.map(|s| s.credit_movement)),
            opt_amount(stored.map(|s| s.closing_balance)),
            amount(row.live_closing),
            if row.in_sync { "yes" } else { "no" }.to_string(),
        ])?;
    }
    finish(
        wtr,
        format!("account-balance_{}.csv", slug(&report.fiscal_period_name)),
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::balance::{AccountRow, JournalTypeFilter};
    use crate::fiscal::PeriodRange;
    use crate::ledger::AccountCategory;
    use crate::reports::{ReportContext, TrialBalanceRow, TrialBalanceTotals};

    fn ctx() -> ReportContext {
        ReportContext {
            company_name: "Acme, Inc.".into(),
            currency: "IDR".into(),
            range: PeriodRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )
            .unwrap(),
            journal_type: JournalTypeFilter::All,
        }
    }

    fn cash() -> AccountRow {
        AccountRow {
            account_id: Uuid::new_v4(),
            code: "1101".into(),
            name: "Cash".into(),
            account_type: "ASSET".into(),
            group_id: Uuid::new_v4(),
            group_code: "11".into(),
            group_name: "Current Assets".into(),
            category: AccountCategory::CurrentAsset,
            level: 1,
            normal_balance: AccountCategory::CurrentAsset.default_normal_balance(),
        }
    }

    #[test]
    fn test_trial_balance_csv() {
        let report = TrialBalanceReport {
            header: ctx().header("Trial Balance"),
            rows: vec![TrialBalanceRow {
                account: cash(),
                opening: dec!(0),
                debit: dec!(1500.5),
                credit: dec!(0),
                closing: dec!(1500.5),
                is_debit: true,
                closing_debit: dec!(1500.5),
                closing_credit: dec!(0),
            }],
            totals: TrialBalanceTotals::default(),
        };

        let file = trial_balance(&report).unwrap();
        assert_eq!(file.filename, "trial-balance_2024-01-01_2024-01-31.csv");
        assert_eq!(file.content_type, "text/csv; charset=utf-8");

        let text = String::from_utf8(file.body).unwrap();
        assert!(text.starts_with("Trial Balance\n"));
        assert!(text.contains("Company,\"Acme, Inc.\"\n"));
        assert!(text.contains("1101,Cash,0.00,1500.50,0.00,1500.50,0.00\n"));
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("January 2024"), "January-2024");
        assert_eq!(slug("  Q1/2024 "), "Q1-2024");
    }
}
