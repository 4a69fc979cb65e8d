use chrono::{DateTime, FixedOffset, NaiveDate};

// Local -> FixedOffset (uses the current system offset)
pub fn now_fixed_offset() -> DateTime<FixedOffset> {
    let local = chrono::Local::now();
    local.with_timezone(local.offset())
}

// Calendar date used as "today" when a request does not pin one
pub fn today_local() -> NaiveDate {
    chrono::Local::now().date_naive()
}
