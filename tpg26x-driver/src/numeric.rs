use crate::error::ProtocolError;

/// Parses a pressure value in the controller's `sx.xxxxEsxx` notation.
pub(crate) fn parse_pressure(raw: &str) -> Result<f64, ProtocolError> {
    let invalid = || ProtocolError::InvalidNumber(raw.to_string());
    let (mantissa, exponent) = raw.split_once('E').ok_or_else(invalid)?;
    if !mantissa.contains('.') || exponent.is_empty() {
        return Err(invalid());
    }
    mantissa.parse::<f64>().map_err(|_| invalid())?;
    exponent.parse::<i32>().map_err(|_| invalid())?;
    // Parse as a whole so the value is the nearest double to the decimal text
    raw.parse::<f64>().map_err(|_| invalid())
}

/// Formats a pressure value the way the controller prints it, e.g. `1.2340E-03`.
pub fn format_pressure(value: f64) -> String {
    let formatted = format!("{:.4E}", value);
    match formatted.split_once('E') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(e) => {
                let sign = if e < 0 { '-' } else { '+' };
                format!("{}E{}{:02}", mantissa, sign, e.abs())
            }
            Err(_) => formatted,
        },
        // NaN and infinities
        None => formatted,
    }
}

pub(crate) fn parse_code(raw: &str) -> Result<u8, ProtocolError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::InvalidNumber(raw.to_string()));
    }
    raw.parse::<u8>()
        .map_err(|_| ProtocolError::InvalidNumber(raw.to_string()))
}

pub(crate) fn to_string(data: &[u8]) -> String {
    data.iter()
        .map(|e| format!("{:02X}", e))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pressure() {
        assert_eq!(parse_pressure("1.0000E-03").unwrap(), 1.0e-3);
        assert_eq!(parse_pressure("+1.2340E-03").unwrap(), 1.234e-3);
        assert_eq!(parse_pressure("9.9000E+02").unwrap(), 990.);
        assert_eq!(parse_pressure("-2.5000E-01").unwrap(), -0.25);

        assert!(matches!(
            parse_pressure("1.0000"),
            Err(ProtocolError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_pressure("1.0000E"),
            Err(ProtocolError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_pressure("abcE-03"),
            Err(ProtocolError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_pressure("1E-03"),
            Err(ProtocolError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_format_pressure() {
        assert_eq!(format_pressure(1.234e-3), "1.2340E-03");
        assert_eq!(format_pressure(990.), "9.9000E+02");
        assert_eq!(format_pressure(1.0), "1.0000E+00");
        assert_eq!(format_pressure(5.0e-11), "5.0000E-11");
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code("0").unwrap(), 0);
        assert_eq!(parse_code("12").unwrap(), 12);
        assert!(parse_code("").is_err());
        assert!(parse_code("+1").is_err());
        assert!(parse_code("x").is_err());
    }

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(&[0x06, 0x0D, 0x0A]), "06 0D 0A");
    }
}
