use crate::error::ChartServiceError;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregation interval selected for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
}

impl TimeScale {
    /// Every scale, finest first.
    pub const ALL: [TimeScale; 13] = [
        TimeScale::OneMinute,
        TimeScale::ThreeMinutes,
        TimeScale::FiveMinutes,
        TimeScale::FifteenMinutes,
        TimeScale::ThirtyMinutes,
        TimeScale::OneHour,
        TimeScale::TwoHours,
        TimeScale::FourHours,
        TimeScale::OneDay,
        TimeScale::ThreeDays,
        TimeScale::OneWeek,
        TimeScale::OneMonth,
        TimeScale::ThreeMonths,
    ];

    /// The scales offered in the time-scale picker.
    pub const SELECTABLE: [TimeScale; 9] = [
        TimeScale::OneMinute,
        TimeScale::FiveMinutes,
        TimeScale::FifteenMinutes,
        TimeScale::ThirtyMinutes,
        TimeScale::OneHour,
        TimeScale::OneDay,
        TimeScale::ThreeDays,
        TimeScale::OneWeek,
        TimeScale::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeScale::OneMinute => "1m",
            TimeScale::ThreeMinutes => "3m",
            TimeScale::FiveMinutes => "5m",
            TimeScale::FifteenMinutes => "15m",
            TimeScale::ThirtyMinutes => "30m",
            TimeScale::OneHour => "1h",
            TimeScale::TwoHours => "2h",
            TimeScale::FourHours => "4h",
            TimeScale::OneDay => "1d",
            TimeScale::ThreeDays => "3d",
            TimeScale::OneWeek => "1w",
            TimeScale::OneMonth => "1M",
            TimeScale::ThreeMonths => "3M",
        }
    }

    /// Interval code understood by the market-data provider. The provider has
    /// no 3-day bars, so `3d` is served from daily ones.
    pub fn interval(&self) -> &'static str {
        match self {
            TimeScale::OneMinute => "1m",
            TimeScale::ThreeMinutes => "3m",
            TimeScale::FiveMinutes => "5m",
            TimeScale::FifteenMinutes => "15m",
            TimeScale::ThirtyMinutes => "30m",
            TimeScale::OneHour => "1h",
            TimeScale::TwoHours => "2h",
            TimeScale::FourHours => "4h",
            TimeScale::OneDay | TimeScale::ThreeDays => "1d",
            TimeScale::OneWeek => "1wk",
            TimeScale::OneMonth => "1mo",
            TimeScale::ThreeMonths => "3mo",
        }
    }

    pub fn lookback(&self) -> Lookback {
        match self {
            TimeScale::OneMinute | TimeScale::ThreeMinutes | TimeScale::FiveMinutes => {
                Lookback::Days(1)
            }
            TimeScale::FifteenMinutes => Lookback::Days(5),
            TimeScale::ThirtyMinutes => Lookback::Months(1),
            TimeScale::OneHour => Lookback::Months(3),
            TimeScale::TwoHours => Lookback::Months(6),
            TimeScale::FourHours => Lookback::Years(1),
            TimeScale::OneDay | TimeScale::ThreeDays => Lookback::Years(2),
            TimeScale::OneWeek => Lookback::Years(5),
            TimeScale::OneMonth | TimeScale::ThreeMonths => Lookback::Years(10),
        }
    }

    /// Nominal spacing between consecutive bars.
    pub fn step_seconds(&self) -> i64 {
        match self {
            TimeScale::OneMinute => 60,
            TimeScale::ThreeMinutes => 180,
            TimeScale::FiveMinutes => 300,
            TimeScale::FifteenMinutes => 900,
            TimeScale::ThirtyMinutes => 1_800,
            TimeScale::OneHour => 3_600,
            TimeScale::TwoHours => 7_200,
            TimeScale::FourHours => 14_400,
            TimeScale::OneDay => 86_400,
            TimeScale::ThreeDays => 259_200,
            TimeScale::OneWeek => 604_800,
            TimeScale::OneMonth => 2_592_000,
            TimeScale::ThreeMonths => 7_776_000,
        }
    }

    /// Month-based scales step on calendar months rather than fixed seconds.
    pub fn calendar_months(&self) -> Option<u32> {
        match self {
            TimeScale::OneMonth => Some(1),
            TimeScale::ThreeMonths => Some(3),
            _ => None,
        }
    }

    pub fn axis(&self) -> AxisOptions {
        let tick_format = match self {
            TimeScale::OneMinute => TickFormat::Hms,
            TimeScale::ThreeMinutes
            | TimeScale::FiveMinutes
            | TimeScale::FifteenMinutes
            | TimeScale::ThirtyMinutes => TickFormat::Hm,
            TimeScale::OneHour | TimeScale::TwoHours | TimeScale::FourHours => {
                TickFormat::MonthDayHour
            }
            TimeScale::OneDay | TimeScale::ThreeDays => TickFormat::MonthDay,
            TimeScale::OneWeek => TickFormat::WeekdayMonthDay,
            TimeScale::OneMonth | TimeScale::ThreeMonths => TickFormat::MonthYear,
        };

        AxisOptions {
            time_visible: true,
            seconds_visible: matches!(self, TimeScale::OneMinute),
            tick_format,
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeScale {
    type Err = ChartServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeScale::ALL
            .iter()
            .copied()
            .find(|scale| scale.as_str() == s)
            .ok_or_else(|| ChartServiceError::Validation("Invalid time scale".to_string()))
    }
}

/// How far back from "now" a query reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Days(u32),
    Months(u32),
    Years(u32),
}

impl Lookback {
    /// Rough length in days, used for ordering lookbacks against each other.
    pub fn approx_days(&self) -> u32 {
        match self {
            Lookback::Days(n) => *n,
            Lookback::Months(n) => n * 30,
            Lookback::Years(n) => n * 365,
        }
    }

    /// Calendar subtraction. Month arithmetic clamps to the end of the month.
    pub fn before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let approx = now - Duration::days(i64::from(self.approx_days()));
        match self {
            Lookback::Days(n) => now - Duration::days(i64::from(*n)),
            Lookback::Months(n) => now.checked_sub_months(Months::new(*n)).unwrap_or(approx),
            Lookback::Years(n) => now
                .checked_sub_months(Months::new(n * 12))
                .unwrap_or(approx),
        }
    }
}

/// Provider query parameters for one historical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    pub interval: &'static str,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    pub fn ending_at(scale: TimeScale, now: DateTime<Utc>) -> Self {
        Self {
            interval: scale.interval(),
            start: scale.lookback().before(now),
            end: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    pub time_visible: bool,
    pub seconds_visible: bool,
    pub tick_format: TickFormat,
}

/// Tick label layout for the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickFormat {
    Hms,
    Hm,
    MonthDayHour,
    MonthDay,
    WeekdayMonthDay,
    MonthYear,
}
