//! Model-year decoding from the VIN year code at position 10.

/// Base year encoded by a position-10 character, in the 1980-2009 cycle.
///
/// `0` and characters outside the year table have no base year. U and Z are
/// never used as year codes.
pub(crate) fn base_year(code: u8) -> Option<i32> {
    let year = match code {
        b'A'..=b'H' => 1980 + i32::from(code - b'A'),
        b'J'..=b'N' => 1988 + i32::from(code - b'J'),
        b'P' => 1993,
        b'R'..=b'T' => 1994 + i32::from(code - b'R'),
        b'V'..=b'Y' => 1997 + i32::from(code - b'V'),
        b'1'..=b'9' => 2000 + i32::from(code - b'0'),
        _ => return None,
    };
    Some(year)
}

/// Resolves the four-digit model year, or `None` when the year code is
/// unrecognized.
///
/// The year table repeats every 30 years. An alphabetic character at VIN
/// position 7 selects the 2010-2039 cycle, a numeric one the 1980-2009
/// cycle. Years past `max_year` (the newest model year the reference
/// snapshot describes) are stepped down one cycle at a time.
pub(crate) fn model_year(year_code: u8, cycle_code: u8, max_year: i32) -> Option<i32> {
    let mut year = base_year(year_code)?;
    if cycle_code.is_ascii_alphabetic() {
        year += 30;
    }
    while year > max_year && year - 30 >= 1980 {
        year -= 30;
    }
    Some(year)
}
