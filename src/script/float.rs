//! Five byte floating point numbers

/// Renders the five byte floating point form used by `%G`.
pub trait FloatCodec {
    fn render(&self, bytes: &[u8; 5]) -> String;
}

/// The Spectrum ROM calculator's number format: either a small integer
/// (first byte zero, then sign byte and a little-endian word) or an exponent
/// byte biased by 128 followed by a big-endian mantissa whose top bit is the
/// sign.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpectrumFloat;

impl SpectrumFloat {
    pub fn value(bytes: &[u8; 5]) -> f64 {
        if bytes[0] == 0 {
            let magnitude = bytes[2] as i32 | (bytes[3] as i32) << 8;
            return if bytes[1] == 0xFF {
                (magnitude - 0x10000) as f64
            } else {
                magnitude as f64
            };
        }

        let mantissa = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let negative = mantissa & 0x8000_0000 != 0;
        let fraction = (mantissa | 0x8000_0000) as f64 / 4_294_967_296.0;
        let value = fraction * 2f64.powi(bytes[0] as i32 - 128);

        if negative {
            -value
        } else {
            value
        }
    }
}

/// Nine significant digits, trailing zeros dropped, exponent form outside
/// `1e-5 .. 1e9`.
fn significant(value: f64) -> String {
    const DIGITS: i32 = 9;

    if value == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:.*e}", (DIGITS - 1) as usize, value);
    let mut parts = sci.splitn(2, 'e');
    let mantissa = parts.next().unwrap_or("0");
    let exponent: i32 = parts.next().and_then(|e| e.parse().ok()).unwrap_or(0);
    let sign = if mantissa.starts_with('-') { "-" } else { "" };
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    if exponent >= -5 && exponent < DIGITS {
        let point = exponent + 1;
        let plain = if point <= 0 {
            format!("0.{}{}", "0".repeat((-point) as usize), digits)
        } else {
            let (whole, fraction) = digits.split_at(point as usize);
            format!("{}.{}", whole, fraction)
        };

        format!("{}{}", sign, plain.trim_end_matches('0').trim_end_matches('.'))
    } else {
        let (lead, rest) = digits.split_at(1);
        let rest = rest.trim_end_matches('0');
        if rest.is_empty() {
            format!("{}{}E{}", sign, lead, exponent)
        } else {
            format!("{}{}.{}E{}", sign, lead, rest, exponent)
        }
    }
}

impl FloatCodec for SpectrumFloat {
    fn render(&self, bytes: &[u8; 5]) -> String {
        if bytes[0] == 0 {
            return format!("{}", Self::value(bytes) as i64);
        }

        significant(Self::value(bytes))
    }
}
