//! Output sinks for the engagement table: a CSV file or a Google Sheets
//! worksheet.

pub mod csv_file;
pub mod error;
pub mod sheets;

pub use csv_file::write_csv;
pub use error::SinkError;
pub use sheets::{
    column_letter, fetch_sheets_token, load_service_account_key, AppendOutcome, ServiceAccountKey,
    SheetsClient,
};
