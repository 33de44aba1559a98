//! Database seeder for Bukubesar development and testing.
//!
//! Seeds a small chart of accounts, the twelve monthly periods of the current
//! year and a handful of posted journal entries. Does nothing when account
//! types already exist.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use bukubesar_core::fiscal::PeriodRange;
use bukubesar_core::ledger::{JournalEntryInput, JournalLineInput};
use bukubesar_db::{
    AccountGroupRepository, AccountRepository, AccountTypeRepository, FiscalRepository,
    JournalRepository, UserRepository,
    entities::sea_orm_active_enums::{AccountCategory, NormalBalance},
    repositories::{AccountGroupInput, AccountInput, AccountTypeInput},
};
use sea_orm::DatabaseConnection;

/// User recorded as author of the seeded entries.
const SEED_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

const TYPES: &[(&str, &str, NormalBalance)] = &[
    ("1", "Aset", NormalBalance::Debit),
    ("2", "Kewajiban", NormalBalance::Credit),
    ("3", "Ekuitas", NormalBalance::Credit),
    ("4", "Pendapatan", NormalBalance::Credit),
    ("5", "Beban", NormalBalance::Debit),
];

/// (code, name, type code, category)
const GROUPS: &[(&str, &str, &str, AccountCategory)] = &[
    ("11", "Aset Lancar", "1", AccountCategory::CurrentAsset),
    ("12", "Aset Tetap", "1", AccountCategory::FixedAsset),
    ("21", "Kewajiban Lancar", "2", AccountCategory::CurrentLiability),
    ("31", "Modal", "3", AccountCategory::Equity),
    ("41", "Pendapatan Usaha", "4", AccountCategory::Revenue),
    ("51", "Harga Pokok Penjualan", "5", AccountCategory::CostOfRevenue),
    ("61", "Beban Operasional", "5", AccountCategory::OperatingExpense),
];

/// (code, name, group code, normal balance override)
const ACCOUNTS: &[(&str, &str, &str, Option<NormalBalance>)] = &[
    ("1101", "Kas", "11", None),
    ("1102", "Bank", "11", None),
    ("1103", "Piutang Usaha", "11", None),
    ("1201", "Peralatan", "12", None),
    ("1202", "Akumulasi Penyusutan Peralatan", "12", Some(NormalBalance::Credit)),
    ("2101", "Utang Usaha", "21", None),
    ("3101", "Modal Pemilik", "31", None),
    ("4101", "Penjualan", "41", None),
    ("5101", "Harga Pokok Penjualan", "51", None),
    ("6101", "Beban Sewa", "61", None),
    ("6102", "Beban Gaji", "61", None),
    ("6103", "Beban Penyusutan", "61", None),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;

    println!("Connecting to database...");
    let db = bukubesar_db::connect(&database_url).await?;

    if !AccountTypeRepository::new(db.clone()).list().await?.is_empty() {
        println!("Account types already exist, nothing to seed.");
        return Ok(());
    }

    println!("Seeding seed user...");
    UserRepository::new(db.clone())
        .ensure(
            SEED_USER_ID,
            Some("seeder@bukubesar.local".to_string()),
            Some("Seeder".to_string()),
        )
        .await?;

    println!("Seeding chart of accounts...");
    let accounts = seed_chart(&db).await?;

    let year = Utc::now().year();
    println!("Seeding fiscal periods for {year}...");
    seed_periods(&db, year).await?;

    println!("Seeding journal entries...");
    seed_journals(&db, year, &accounts).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Returns account IDs keyed by code.
async fn seed_chart(db: &DatabaseConnection) -> anyhow::Result<HashMap<&'static str, Uuid>> {
    let types = AccountTypeRepository::new(db.clone());
    let groups = AccountGroupRepository::new(db.clone());
    let accounts = AccountRepository::new(db.clone());

    let mut type_ids = HashMap::new();
    for &(code, name, normal_balance) in TYPES {
        let created = types
            .create(AccountTypeInput {
                code: code.to_string(),
                name: name.to_string(),
                normal_balance,
            })
            .await?;
        type_ids.insert(code, created.id);
    }

    let mut group_ids = HashMap::new();
    for &(code, name, type_code, category) in GROUPS {
        let created = groups
            .create(AccountGroupInput {
                code: code.to_string(),
                name: name.to_string(),
                account_type_id: type_ids[type_code],
                normal_balance: None,
                category,
            })
            .await?;
        group_ids.insert(code, created.id);
    }

    let mut account_ids = HashMap::new();
    for &(code, name, group_code, normal_balance) in ACCOUNTS {
        let created = accounts
            .create(AccountInput {
                code: code.to_string(),
                name: name.to_string(),
                description: None,
                parent_id: None,
                account_group_id: group_ids[group_code],
                normal_balance,
                is_active: true,
            })
            .await?;
        account_ids.insert(code, created.id);
    }

    println!("  {} accounts", account_ids.len());
    Ok(account_ids)
}

async fn seed_periods(db: &DatabaseConnection, year: i32) -> anyhow::Result<()> {
    let periods = FiscalRepository::new(db.clone());
    for month in 1..=12 {
        periods
            .create(None, PeriodRange::for_month(year, month)?)
            .await?;
    }
    Ok(())
}

async fn seed_journals(
    db: &DatabaseConnection,
    year: i32,
    accounts: &HashMap<&'static str, Uuid>,
) -> anyhow::Result<()> {
    let journals = JournalRepository::new(db.clone());
    let date = |month: u32, day: u32| {
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| anyhow::anyhow!("invalid seed date {year}-{month}-{day}"))
    };
    let amount = |value: i64| Decimal::new(value, 0);

    let entries = vec![
        JournalEntryInput {
            number: None,
            entry_date: date(1, 2)?,
            description: "Setoran modal awal".to_string(),
            reference: None,
            lines: vec![
                JournalLineInput::debit(accounts["1101"], amount(5_000_000)),
                JournalLineInput::debit(accounts["1102"], amount(95_000_000)),
                JournalLineInput::credit(accounts["3101"], amount(100_000_000)),
            ],
        },
        JournalEntryInput {
            number: None,
            entry_date: date(1, 5)?,
            description: "Pembelian peralatan kantor".to_string(),
            reference: Some("INV-0001".to_string()),
            lines: vec![
                JournalLineInput::debit(accounts["1201"], amount(24_000_000)),
                JournalLineInput::credit(accounts["1102"], amount(24_000_000)),
            ],
        },
        JournalEntryInput {
            number: None,
            entry_date: date(1, 15)?,
            description: "Penjualan kredit".to_string(),
            reference: Some("SO-0001".to_string()),
            lines: vec![
                JournalLineInput::debit(accounts["1103"], amount(15_000_000)),
                JournalLineInput::credit(accounts["4101"], amount(15_000_000)),
                JournalLineInput::debit(accounts["5101"], amount(9_000_000)),
                JournalLineInput::credit(accounts["2101"], amount(9_000_000)),
            ],
        },
        JournalEntryInput {
            number: None,
            entry_date: date(1, 31)?,
            description: "Sewa dan gaji Januari".to_string(),
            reference: None,
            lines: vec![
                JournalLineInput::debit(accounts["6101"], amount(3_000_000)),
                JournalLineInput::debit(accounts["6102"], amount(5_000_000)),
                JournalLineInput::credit(accounts["1101"], amount(500_000)),
                JournalLineInput::credit(accounts["1102"], amount(7_500_000)),
            ],
        },
        JournalEntryInput {
            number: None,
            entry_date: date(1, 31)?,
            description: "Penyusutan peralatan Januari".to_string(),
            reference: None,
            lines: vec![
                JournalLineInput::debit(accounts["6103"], amount(500_000)),
                JournalLineInput::credit(accounts["1202"], amount(500_000)),
            ],
        },
    ];

    for input in entries {
        let created = journals.create(input, SEED_USER_ID).await?;
        let posted = journals.post(created.entry.id, SEED_USER_ID).await?;
        println!("  {} {}", posted.entry.number, posted.entry.description);
    }

    // One draft left for editing.
    journals
        .create(
            JournalEntryInput {
                number: None,
                entry_date: date(2, 3)?,
                description: "Pelunasan piutang (draft)".to_string(),
                reference: None,
                lines: vec![
                    JournalLineInput::debit(accounts["1102"], amount(15_000_000)),
                    JournalLineInput::credit(accounts["1103"], amount(15_000_000)),
                ],
            },
            SEED_USER_ID,
        )
        .await?;

    Ok(())
}
