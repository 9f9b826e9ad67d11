use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

pub(crate) fn format_date(value: Date) -> String {
    value.format(format_description!("[year]-[month]-[day]")).unwrap_or_else(|_| value.to_string())
}

pub(crate) fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
}

/// Current calendar date for a fixed UTC offset in whole hours.
pub(crate) fn today_at_offset(offset_hours: i8) -> Date {
    let offset = UtcOffset::from_hms(offset_hours, 0, 0).unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Month, Time};

    #[test]
    fn format_primitive_outputs_utc_z() {
        let date = Date::from_calendar_date(2025, Month::January, 2).unwrap();
        let time = Time::from_hms(10, 20, 30).unwrap();
        let value = PrimitiveDateTime::new(date, time);
        assert_eq!(format_primitive(value), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn format_date_is_iso() {
        let date = Date::from_calendar_date(2025, Month::March, 7).unwrap();
        assert_eq!(format_date(date), "2025-03-07");
    }

    #[test]
    fn parse_date_accepts_iso_and_rejects_garbage() {
        let date = Date::from_calendar_date(2025, Month::March, 7).unwrap();
        assert_eq!(parse_date(" 2025-03-07 ").unwrap(), date);
        assert!(parse_date("07.03.2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn today_at_offset_stays_within_a_day_of_utc() {
        let utc = OffsetDateTime::now_utc().date();
        for hours in [-12, 0, 5, 14] {
            let local = today_at_offset(hours);
            let delta = (local - utc).whole_days();
            assert!((-1..=1).contains(&delta), "offset {hours} gave {local}");
        }
    }
}
