//! The date/time extension family: `current_datetime` and the relative-time
//! shift functions (`seconds_ago`, `months_from_now`, ...). Not part of the
//! JMESPath standard, but registered unconditionally the way the pack's
//! datetime extension crate registers its whole family in one `register()`
//! call rather than behind per-function feature flags.

use chrono::{DateTime, Datelike, Local};

use crate::error::JmespathError;
use crate::interpreter::FunctionContext;
use crate::value::Value;

use super::{ArgumentType as A, BuiltinFunction, FunctionRegistry, Signature};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

fn format_now(dt: DateTime<Local>) -> Value {
    Value::string(dt.format(FORMAT).to_string())
}

/// Shifts `dt` by `months` calendar months, clamping the day-of-month to
/// the last valid day of the target month (e.g. Jan 31 + 1 month -> the
/// last day of February).
fn shift_months(dt: DateTime<Local>, months: i64) -> DateTime<Local> {
    let total = dt.year() as i64 * 12 + (dt.month() as i64 - 1) + months;
    let target_year = total.div_euclid(12) as i32;
    let target_month = (total.rem_euclid(12) + 1) as u32;
    let last_day = days_in_month(target_year, target_month);
    let day = dt.day().min(last_day);
    dt.with_day(1)
        .unwrap()
        .with_year(target_year)
        .unwrap()
        .with_month(target_month)
        .unwrap()
        .with_day(day)
        .unwrap()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = chrono::NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap();
    let first_of_this = chrono::NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    (first_of_next - first_of_this).num_days() as u32
}

macro_rules! define_function {
    ($name:ident, $args:expr, $variadic:expr) => {
        struct $name {
            signature: Signature,
        }

        impl $name {
            fn new() -> Self {
                $name {
                    signature: Signature::new($args, $variadic),
                }
            }
        }
    };
}

define_function!(CurrentDatetimeFn, vec![], false);
impl BuiltinFunction for CurrentDatetimeFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, _args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        Ok(format_now(Local::now()))
    }
}

/// A shift expressed as a fixed number of seconds (`seconds_ago`, `days_from_now`, ...).
struct SecondsShiftFn {
    signature: Signature,
    seconds_per_unit: i64,
    sign: i64,
}

impl SecondsShiftFn {
    fn new(seconds_per_unit: i64, sign: i64) -> Self {
        SecondsShiftFn {
            signature: Signature::new(vec![A::Number], false),
            seconds_per_unit,
            sign,
        }
    }
}

impl BuiltinFunction for SecondsShiftFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let n = args[0].as_f64().unwrap();
        let delta_seconds = (n * self.seconds_per_unit as f64 * self.sign as f64).round() as i64;
        let shifted = Local::now() + chrono::Duration::seconds(delta_seconds);
        Ok(format_now(shifted))
    }
}

/// A shift expressed in whole calendar months (`months_ago`, `years_from_now`, ...).
struct CalendarShiftFn {
    signature: Signature,
    months_per_unit: i64,
    sign: i64,
}

impl CalendarShiftFn {
    fn new(months_per_unit: i64, sign: i64) -> Self {
        CalendarShiftFn {
            signature: Signature::new(vec![A::Number], false),
            months_per_unit,
            sign,
        }
    }
}

impl BuiltinFunction for CalendarShiftFn {
    fn signature(&self) -> &Signature {
        &self.signature
    }
    fn evaluate(&self, args: &[Value], _ctx: &FunctionContext) -> Result<Value, JmespathError> {
        let n = args[0].as_f64().unwrap().round() as i64;
        let months = n * self.months_per_unit * self.sign;
        Ok(format_now(shift_months(Local::now(), months)))
    }
}

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register("current_datetime", Box::new(CurrentDatetimeFn::new()));

    registry.register("seconds_ago", Box::new(SecondsShiftFn::new(1, -1)));
    registry.register("seconds_from_now", Box::new(SecondsShiftFn::new(1, 1)));
    registry.register("minutes_ago", Box::new(SecondsShiftFn::new(60, -1)));
    registry.register("minutes_from_now", Box::new(SecondsShiftFn::new(60, 1)));
    registry.register("hours_ago", Box::new(SecondsShiftFn::new(3600, -1)));
    registry.register("hours_from_now", Box::new(SecondsShiftFn::new(3600, 1)));
    registry.register("days_ago", Box::new(SecondsShiftFn::new(86_400, -1)));
    registry.register("days_from_now", Box::new(SecondsShiftFn::new(86_400, 1)));
    registry.register("weeks_ago", Box::new(SecondsShiftFn::new(604_800, -1)));
    registry.register("weeks_from_now", Box::new(SecondsShiftFn::new(604_800, 1)));

    registry.register("months_ago", Box::new(CalendarShiftFn::new(1, -1)));
    registry.register("months_from_now", Box::new(CalendarShiftFn::new(1, 1)));
    registry.register("years_ago", Box::new(CalendarShiftFn::new(12, -1)));
    registry.register("years_from_now", Box::new(CalendarShiftFn::new(12, 1)));
}
