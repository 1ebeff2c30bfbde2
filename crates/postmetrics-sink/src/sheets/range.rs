//! A1-notation helpers.

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Spreadsheet column letters for a 1-based column number.
///
/// 1 → `A`, 26 → `Z`, 27 → `AA`, 52 → `AZ`, 53 → `BA`. Exact multiples of 26
/// end in `Z` and carry one less into the higher digits. Returns `None` for 0.
#[must_use]
pub fn column_letter(n: u32) -> Option<String> {
    match n {
        0 => None,
        1..=26 => Some(char::from(ALPHABET[(n - 1) as usize]).to_string()),
        _ if n % 26 == 0 => Some(format!("{}Z", column_letter(n / 26 - 1)?)),
        _ => Some(format!(
            "{}{}",
            column_letter(n / 26)?,
            char::from(ALPHABET[(n % 26 - 1) as usize])
        )),
    }
}

/// Quote a worksheet title for use in a range unless it is a plain identifier.
pub(crate) fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// `Sheet!A{first_row}:{last_col}{last_row}`.
pub(crate) fn a1_range(
    sheet: &str,
    first_row: usize,
    last_row: usize,
    columns: u32,
) -> Option<String> {
    let last_col = column_letter(columns)?;
    Some(format!(
        "{}!A{first_row}:{last_col}{last_row}",
        quote_sheet_name(sheet)
    ))
}
