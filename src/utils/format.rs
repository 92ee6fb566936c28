//! Display formatting shared by the payroll, document and expiry views.

/// Groups the integer part in threes: `1234567` -> `1,234,567`.
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `12500.5` with suffix `SAR` -> `12,500.50 SAR`; whole amounts drop the decimals.
pub fn money(amount: f64, suffix: &str) -> String {
    let cents = (amount * 100.0).round() as i64;
    let whole = thousands(cents / 100);
    let fraction = (cents % 100).abs();

    let number = match (fraction, cents < 0 && cents / 100 == 0) {
        (0, _) => whole,
        (f, true) => format!("-{whole}.{f:02}"),
        (f, false) => format!("{whole}.{f:02}"),
    };

    if suffix.is_empty() {
        number
    } else {
        format!("{number} {suffix}")
    }
}

/// Rounded to an integer before formatting.
pub fn money_rounded(amount: f64, suffix: &str) -> String {
    money(amount.round(), suffix)
}

pub fn file_size(bytes: Option<u64>) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let bytes = match bytes {
        Some(b) if b > 0 => b,
        _ => return "Unknown".to_string(),
    };

    let mut unit = 0;
    let mut size = bytes as f64;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = (size * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

pub fn days_remaining(days: i64) -> String {
    match days {
        d if d < 0 => format!("Expired {} days ago", d.abs()),
        0 => "Expires today".to_string(),
        1 => "Expires tomorrow".to_string(),
        d => format!("{d} days left"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0")]
    #[case(999, "999")]
    #[case(1000, "1,000")]
    #[case(1234567, "1,234,567")]
    #[case(-45000, "-45,000")]
    fn groups_thousands(#[case] value: i64, #[case] expected: &str) {
        assert_eq!(thousands(value), expected);
    }

    #[test]
    fn money_keeps_cents_only_when_present() {
        assert_eq!(money(12500.0, "SAR"), "12,500 SAR");
        assert_eq!(money(12500.5, "SAR"), "12,500.50 SAR");
        assert_eq!(money(-0.25, ""), "-0.25");
        assert_eq!(money_rounded(8333.33, "SAR"), "8,333 SAR");
    }

    #[rstest]
    #[case(None, "Unknown")]
    #[case(Some(0), "Unknown")]
    #[case(Some(512), "512 B")]
    #[case(Some(1536), "1.5 KB")]
    #[case(Some(5 * 1024 * 1024), "5 MB")]
    fn human_file_sizes(#[case] bytes: Option<u64>, #[case] expected: &str) {
        assert_eq!(file_size(bytes), expected);
    }

    #[rstest]
    #[case(-3, "Expired 3 days ago")]
    #[case(0, "Expires today")]
    #[case(1, "Expires tomorrow")]
    #[case(12, "12 days left")]
    fn days_remaining_labels(#[case] days: i64, #[case] expected: &str) {
        assert_eq!(days_remaining(days), expected);
    }
}
