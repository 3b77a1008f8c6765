/// Format `value` with `,` thousands separators and `decimals` fixed places.
///
/// # Examples
///
/// ```
/// use vis_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(3.0, 0), "3");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let factor = 10_f64.powi(decimals as i32);
    let scaled = value.abs() * factor;
    // Nudge exact binary midpoints (e.g. 1.005) the way a human would round.
    let rounded = (scaled + f64::EPSILON * scaled).round() / factor;

    let whole = group_thousands(&(rounded.trunc() as u64).to_string());
    let body = if decimals == 0 {
        whole
    } else {
        let frac = format!("{:.prec$}", rounded.fract(), prec = decimals as usize);
        format!("{}{}", whole, &frac[1..])
    };

    if value < 0.0 && rounded != 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format a major-unit currency amount with two decimals.
///
/// No currency symbol is added; the input file does not declare one.
///
/// ```
/// use vis_core::formatting::format_amount;
///
/// assert_eq!(format_amount(8.0), "8.00");
/// assert_eq!(format_amount(1234.5), "1,234.50");
/// ```
pub fn format_amount(amount: f64) -> String {
    format_number(amount, 2)
}

/// `part` as a percentage of `whole`, rounded to `decimal_places`.
///
/// Returns `0.0` when `whole` is zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let factor = 10_f64.powi(decimal_places as i32);
    ((part / whole) * 100.0 * factor).round() / factor
}

fn group_thousands(digits: &str) -> String {
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && i % 3 == lead {
            out.push(',');
        }
        out.push(c);
    }
    out
}
