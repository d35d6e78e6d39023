use crate::value::Value;

/// Parse a purchase date written as day, month and year in that order, with any separators in between.
///
/// Exactly three runs of digits have to be present. Two-digit years are taken to be in the 2000s.
/// Days are only checked to be within `1..=31`, and days past the end of the month roll over into the next one.
pub fn parse_date(value: &Value) -> Option<time::Date> {
    let text = value.as_text()?.trim();
    if text.is_empty() {
        return None;
    }
    let mut runs = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty());
    let (day, month, year) = (runs.next()?, runs.next()?, runs.next()?);
    if runs.next().is_some() {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month: u8 = month.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    if year <= 1900 || !(1..=31).contains(&day) {
        return None;
    }
    let month = time::Month::try_from(month).ok()?;
    time::Date::from_calendar_date(year, month, 1)
        .ok()?
        .checked_add(time::Duration::days(i64::from(day) - 1))
}
