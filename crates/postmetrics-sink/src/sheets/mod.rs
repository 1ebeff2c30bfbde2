//! Google Sheets sink: append engagement rows below whatever a worksheet
//! already holds.
//!
//! The append position comes from a read of the current values, so two runs
//! against the same worksheet at once can write over each other. Only one
//! writer per spreadsheet is supported.

mod auth;
mod range;

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use postmetrics_core::{EngagementRow, COLUMNS};

use crate::error::SinkError;

pub use auth::{fetch_sheets_token, load_service_account_key, ServiceAccountKey};
pub use range::column_letter;

use range::{a1_range, quote_sheet_name};

/// What an append wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// 1-based row where the write began.
    pub start_row: usize,
    pub header_written: bool,
    /// Data rows written, excluding the header.
    pub rows_written: usize,
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValueRange {
    pub range: String,
    pub major_dimension: &'static str,
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest<'a> {
    value_input_option: &'static str,
    data: &'a [ValueRange],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    total_updated_cells: Option<u64>,
}

/// Sheets REST client holding a bearer token.
pub struct SheetsClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl SheetsClient {
    /// Builds the HTTP client used for both the token exchange and the
    /// Sheets calls.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if the `reqwest::Client` cannot be built.
    pub fn http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, SinkError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?)
    }

    /// # Errors
    ///
    /// Returns [`SinkError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(client: Client, base_url: &str, token: String) -> Result<Self, SinkError> {
        let base_url = Url::parse(base_url).map_err(|e| SinkError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Reads every non-empty row of `worksheet`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Authentication`] on 401/403,
    /// [`SinkError::UnexpectedStatus`] on other non-2xx, [`SinkError::Malformed`]
    /// if the body is not a value range.
    pub async fn read_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<Value>>, SinkError> {
        let range = quote_sheet_name(worksheet);
        let url = self.endpoint(&[
            "v4",
            "spreadsheets",
            spreadsheet_id,
            "values",
            range.as_str(),
        ])?;
        let response = self.client.get(url.clone()).bearer_auth(&self.token).send().await?;
        let body = check_status(response, &url).await?;
        let parsed: ValueRangeResponse =
            serde_json::from_str(&body).map_err(|e| SinkError::Malformed {
                context: format!("values of {range}"),
                reason: e.to_string(),
            })?;
        Ok(parsed.values)
    }

    /// Writes all `data` ranges in one `values:batchUpdate` call.
    ///
    /// # Errors
    ///
    /// As for [`SheetsClient::read_values`].
    pub(crate) async fn batch_update(
        &self,
        spreadsheet_id: &str,
        data: &[ValueRange],
    ) -> Result<(), SinkError> {
        let url = self.endpoint(&["v4", "spreadsheets", spreadsheet_id, "values:batchUpdate"])?;
        let request = BatchUpdateRequest {
            value_input_option: "RAW",
            data,
        };
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;
        let body = check_status(response, &url).await?;
        let parsed: BatchUpdateResponse =
            serde_json::from_str(&body).map_err(|e| SinkError::Malformed {
                context: "values:batchUpdate".to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(cells = ?parsed.total_updated_cells, "batch update applied");
        Ok(())
    }

    /// Appends `rows` after the last occupied row of `worksheet`, writing the
    /// column header first when the worksheet is empty.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`SheetsClient::read_values`] and the batch update.
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        rows: &[EngagementRow],
    ) -> Result<AppendOutcome, SinkError> {
        let existing = self.read_values(spreadsheet_id, worksheet).await?;
        let first_empty_row = existing.len() + 1;

        let Some((range, outcome)) = plan_append(worksheet, first_empty_row, rows)? else {
            tracing::info!(worksheet, "no rows to append");
            return Ok(AppendOutcome {
                start_row: first_empty_row,
                header_written: false,
                rows_written: 0,
            });
        };

        tracing::info!(
            worksheet,
            range = %range.range,
            header = outcome.header_written,
            rows = outcome.rows_written,
            "appending rows"
        );
        self.batch_update(spreadsheet_id, std::slice::from_ref(&range))
            .await?;
        Ok(outcome)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SinkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SinkError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Lays out the write for an append starting at `first_empty_row`.
///
/// Returns `None` when there are no rows to write.
pub(crate) fn plan_append(
    worksheet: &str,
    first_empty_row: usize,
    rows: &[EngagementRow],
) -> Result<Option<(ValueRange, AppendOutcome)>, SinkError> {
    if rows.is_empty() {
        return Ok(None);
    }

    let header_written = first_empty_row == 1;
    let mut values = Vec::with_capacity(rows.len() + 1);
    if header_written {
        values.push(COLUMNS.iter().map(|c| Value::from(*c)).collect());
    }
    values.extend(rows.iter().map(row_cells));

    let columns = u32::try_from(COLUMNS.len()).unwrap_or(u32::MAX);
    let last_row = first_empty_row + values.len() - 1;
    let range = a1_range(worksheet, first_empty_row, last_row, columns)
        .ok_or(SinkError::InvalidColumn(columns))?;

    Ok(Some((
        ValueRange {
            range,
            major_dimension: "ROWS",
            values,
        },
        AppendOutcome {
            start_row: first_empty_row,
            header_written,
            rows_written: rows.len(),
        },
    )))
}

/// Cells in column order; counts stay numeric.
fn row_cells(row: &EngagementRow) -> Vec<Value> {
    let mut cells = vec![
        Value::from(row.collected_at.as_str()),
        Value::from(row.title.as_str()),
        Value::from(row.url.as_str()),
        Value::from(row.published.as_str()),
    ];
    cells.extend(row.counts().into_iter().map(Value::from));
    cells
}

async fn check_status(response: reqwest::Response, url: &Url) -> Result<String, SinkError> {
    let status = response.status();
    let endpoint = url.to_string();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SinkError::Authentication {
            status: status.as_u16(),
            endpoint,
        });
    }
    if !status.is_success() {
        return Err(SinkError::UnexpectedStatus {
            status: status.as_u16(),
            endpoint,
        });
    }
    Ok(response.text().await?)
}
