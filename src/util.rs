use std::fmt::Display;

/// Renders an integer with `,` thousands separators (en-US grouping).
pub fn format_number<N: Display>(number: N) -> String {
    let raw = number.to_string();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

/// Signed difference `current - baseline`: `0`, `+N` or `-N`.
pub fn format_delta(current: u64, baseline: u64) -> String {
    let diff = current as i128 - baseline as i128;
    match diff {
        0 => "0".to_string(),
        d if d > 0 => format!("+{}", format_number(d)),
        d => format_number(d),
    }
}

/// True when `input` contains a `YYYY-MM-DD` shaped substring anywhere.
pub fn contains_iso_date(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.windows(10).any(|w| {
        w[..4].iter().all(u8::is_ascii_digit)
            && w[4] == b'-'
            && w[5..7].iter().all(u8::is_ascii_digit)
            && w[7] == b'-'
            && w[8..].iter().all(u8::is_ascii_digit)
    })
}
