use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

pub const CURRENCY: &str = "₹";

pub fn format_count(value: u64) -> String {
    value.to_formatted_string(&Locale::en)
}

/// `₹1,234.50`
pub fn format_currency(value: f64) -> String {
    let formatted = format_fixed(value, 2);
    match formatted.strip_prefix('-') {
        Some(unsigned) => format!("-{}{}", CURRENCY, unsigned),
        None => format!("{}{}", CURRENCY, formatted),
    }
}

pub fn format_ratio(value: f64) -> String {
    format_fixed(value, 2)
}

pub fn format_cost_per_view(value: f64) -> String {
    format!("{}{}", CURRENCY, format_fixed(value, 4))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Grouped integer part with exactly `decimals` fractional digits.
pub fn format_fixed(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let scale = 10u64.pow(decimals);
    let scaled = (value.abs() * scale as f64).round() as u64;
    let whole = (scaled / scale).to_formatted_string(&Locale::en);
    let sign = if value < 0.0 && scaled != 0 { "-" } else { "" };

    if decimals == 0 {
        format!("{}{}", sign, whole)
    } else {
        let fraction = scaled % scale;
        format!(
            "{}{}.{:0width$}",
            sign,
            whole,
            fraction,
            width = decimals as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_grouped() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(15000), "15,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn currency_has_symbol_and_two_decimals() {
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(1234.5), "₹1,234.50");
        assert_eq!(format_currency(500.0), "₹500.00");
        assert_eq!(format_currency(0.005), "₹0.01");
        assert_eq!(format_currency(-12.3), "-₹12.30");
    }

    #[test]
    fn ratios_and_cost_per_view() {
        assert_eq!(format_ratio(30.0), "30.00");
        assert_eq!(format_ratio(66.666), "66.67");
        assert_eq!(format_ratio(12345.678), "12,345.68");
        assert_eq!(format_cost_per_view(500.0 / 15000.0), "₹0.0333");
    }

    #[test]
    fn dates_are_long_form() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        assert_eq!(format_date(date), "March 05, 2024");
    }
}
