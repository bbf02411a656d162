//! Lenient numeric coercion for raw form text.
//!
//! Leading whitespace is skipped and the longest numeric prefix wins, so
//! `"2020abc"` is `2020` and `"12.5kg"` is `12.5`. Input without any numeric
//! prefix coerces to `None`, which goes over the wire as `null`.

pub fn coerce_year(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    text[..end].parse().ok()
}

pub fn coerce_price(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut normalized = String::new();

    if let Some(sign @ (b'+' | b'-')) = bytes.first() {
        normalized.push(char::from(*sign));
        pos = 1;
    }

    let int_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    let int_digits = &text[int_start..pos];

    let mut frac_digits = "";
    if bytes.get(pos) == Some(&b'.') {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if !int_digits.is_empty() || frac_end > frac_start {
            frac_digits = &text[frac_start..frac_end];
            pos = frac_end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    normalized.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_digits);
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp_end = pos + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            normalized.push('e');
            normalized.push_str(&text[pos + 1..exp_end]);
        }
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
