use chrono::{Datelike, Duration, Months, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Inline editor for a calendar date, one part (year, month, day) at a time.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pub buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
            self.buffer.clear();
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.buffer.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.buffer.clear();
    }

    fn digits_needed(&self) -> usize {
        match self.date_part {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    /// Apply the buffered digits to the current part. Out-of-range values,
    /// including a day past the end of the month, leave the date unchanged.
    fn commit_buffer(&mut self) {
        let candidate = self.buffer.parse::<u32>().ok().and_then(|value| {
            let (y, m, d) = (self.date.year(), self.date.month(), self.date.day());
            match self.date_part {
                DatePart::Year if (1900..=2100).contains(&value) => {
                    NaiveDate::from_ymd_opt(value as i32, m, d)
                        // Feb 29 into a non-leap year
                        .or_else(|| NaiveDate::from_ymd_opt(value as i32, m, 28))
                }
                DatePart::Month => NaiveDate::from_ymd_opt(y, value, d),
                DatePart::Day => NaiveDate::from_ymd_opt(y, m, value),
                _ => None,
            }
        });

        if let Some(date) = candidate {
            self.date = date;
        }
        self.buffer.clear();
    }

    /// Step the current part by one. Month steps clamp the day to the end of
    /// the target month.
    fn adjust(&mut self, up: bool) {
        let (y, m, d) = (self.date.year(), self.date.month(), self.date.day());
        let candidate = match (self.date_part, up) {
            (DatePart::Year, _) => {
                let year = if up { y + 1 } else { y - 1 };
                NaiveDate::from_ymd_opt(year, m, d).or_else(|| NaiveDate::from_ymd_opt(year, m, 28))
            }
            (DatePart::Month, true) => self.date.checked_add_months(Months::new(1)),
            (DatePart::Month, false) => self.date.checked_sub_months(Months::new(1)),
            (DatePart::Day, true) => self.date.checked_add_signed(Duration::days(1)),
            (DatePart::Day, false) => self.date.checked_sub_signed(Duration::days(1)),
        };

        if let Some(date) = candidate {
            self.date = date;
        }
        self.buffer.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                if self.buffer.len() >= self.digits_needed() {
                    self.commit_buffer();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            KeyCode::Up => self.adjust(true),
            KeyCode::Down => self.adjust(false),
            _ => {}
        }
    }

    pub fn get_display_string(&self) -> String {
        let (year, month, day) = (
            format!("{:04}", self.date.year()),
            format!("{:02}", self.date.month()),
            format!("{:02}", self.date.day()),
        );

        if !self.editing {
            return format!("{}-{}-{}", year, month, day);
        }

        let marker = if self.buffer.is_empty() {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.buffer)
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, marker, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, marker, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, marker),
        }
    }
}
