//! A1-style cell addressing
//!
//! Indices are 0-based throughout, matching calamine's coordinates.

/// Column letters for a 0-based column index (0 -> `A`, 26 -> `AA`).
#[must_use]
pub fn column_letters(col: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut n = u64::from(col) + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Address for a 0-based `(row, col)` pair, e.g. `(6, 1)` -> `B7`.
#[must_use]
pub fn cell_address(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), u64::from(row) + 1)
}

/// Parse an address like `B7` or `$B$7` into 0-based `(row, col)`.
///
/// Returns `None` for anything that is not letters followed by a positive
/// row number.
#[must_use]
pub fn parse_cell_address(address: &str) -> Option<(u32, u32)> {
    let cleaned: String = address.chars().filter(|c| *c != '$').collect();
    let split = cleaned.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cleaned.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        let value = u32::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
        col = col.checked_mul(26)?.checked_add(value)?;
    }

    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}
