//! Normalization of AEMET coordinate strings into decimal degrees.
//!
//! The station inventory mixes three encodings for the same field: plain
//! decimal numbers, verbose degrees-minutes-seconds (`40°25'00"N`) and a
//! compact digit run (`402443N` / `0034048W`). Everything else collapses to
//! `0.0`, which the upstream service established as its "invalid coordinate"
//! sentinel.

/// Parses an AEMET coordinate string into decimal degrees.
///
/// Accepted forms, tried in order:
/// - a decimal number, returned as-is;
/// - verbose DMS `D°M'S"X` with `X` one of `N`, `S`, `E`, `W`;
/// - compact DMS: six or seven digits followed by a direction letter.
///
/// DMS values convert as `D + M/60 + S/3600`, negated for `S` and `W`.
///
/// Any other input returns exactly `0.0`. Note that this overloads zero as
/// both a legitimate equatorial/prime-meridian value and a parse-failure
/// sentinel; callers inherit that ambiguity.
///
/// # Examples
///
/// ```
/// use aemet_opendata::parse_coordinate;
///
/// assert_eq!(parse_coordinate("40.4167"), 40.4167);
/// assert!((parse_coordinate("40°25'00\"N") - 40.416_666).abs() < 1e-4);
/// assert!((parse_coordinate("025309E") - 2.885_833).abs() < 1e-4);
/// assert_eq!(parse_coordinate("not a coordinate"), 0.0);
/// ```
pub fn parse_coordinate(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if let Ok(decimal) = trimmed.parse::<f64>() {
        return decimal;
    }
    parse_verbose_dms(trimmed)
        .or_else(|| parse_compact_dms(trimmed))
        .unwrap_or(0.0)
}

fn direction_sign(direction: char) -> Option<f64> {
    match direction {
        'N' | 'E' => Some(1.0),
        'S' | 'W' => Some(-1.0),
        _ => None,
    }
}

fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, sign: f64) -> f64 {
    sign * (degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Parses a non-empty all-digit run.
fn digit_run(text: &str) -> Option<f64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// `40°25'00"N` style.
fn parse_verbose_dms(raw: &str) -> Option<f64> {
    let (degrees, rest) = raw.split_once('°')?;
    let (minutes, rest) = rest.split_once('\'')?;
    let (seconds, rest) = rest.split_once('"')?;
    let sign = direction_sign(rest.chars().next()?)?;
    Some(dms_to_decimal(
        digit_run(degrees)?,
        digit_run(minutes)?,
        digit_run(seconds)?,
        sign,
    ))
}

/// `402443N` / `0034048W` style: DDMMSS or DDDMMSS plus direction.
fn parse_compact_dms(raw: &str) -> Option<f64> {
    let direction = raw.chars().last()?;
    let sign = direction_sign(direction)?;
    let body = &raw[..raw.len() - direction.len_utf8()];
    if !(6..=7).contains(&body.len()) || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let split = body.len() - 4;
    Some(dms_to_decimal(
        digit_run(&body[..split])?,
        digit_run(&body[split..split + 2])?,
        digit_run(&body[split + 2..])?,
        sign,
    ))
}

#[cfg(test)]
mod tests {
    use super::parse_coordinate;

    #[test]
    fn decimal_strings_parse_directly() {
        assert_eq!(parse_coordinate("40.4167"), 40.4167);
        assert_eq!(parse_coordinate("-3.7038"), -3.7038);
        assert_eq!(parse_coordinate("  28.1  "), 28.1);
        assert_eq!(parse_coordinate("0"), 0.0);
    }

    #[test]
    fn verbose_dms_converts() {
        let madrid = parse_coordinate("40°25'00\"N");
        assert!((madrid - (40.0 + 25.0 / 60.0)).abs() < 1e-9);

        let west = parse_coordinate("3°42'14\"W");
        assert!((west + (3.0 + 42.0 / 60.0 + 14.0 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn compact_dms_converts() {
        let lon = parse_coordinate("025309E");
        assert!((lon - (2.0 + 53.0 / 60.0 + 9.0 / 3600.0)).abs() < 1e-9);

        let lat = parse_coordinate("402443N");
        assert!((lat - (40.0 + 24.0 / 60.0 + 43.0 / 3600.0)).abs() < 1e-9);

        // Seven-digit longitude with leading zero degrees.
        let lon_w = parse_coordinate("0034048W");
        assert!((lon_w + (3.0 + 40.0 / 60.0 + 48.0 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn north_east_non_negative_south_west_non_positive() {
        assert!(parse_coordinate("402443N") >= 0.0);
        assert!(parse_coordinate("025309E") >= 0.0);
        assert!(parse_coordinate("402443S") <= 0.0);
        assert!(parse_coordinate("0034048W") <= 0.0);
    }

    /// Known limitation: unparseable input is indistinguishable from a
    /// genuine 0.0 coordinate. The sentinel is part of the contract.
    #[test]
    fn unparseable_input_yields_zero_sentinel() {
        assert_eq!(parse_coordinate(""), 0.0);
        assert_eq!(parse_coordinate("not a coordinate"), 0.0);
        assert_eq!(parse_coordinate("40°25'N"), 0.0); // missing seconds
        assert_eq!(parse_coordinate("4024N"), 0.0); // digit run too short
        assert_eq!(parse_coordinate("40244312N"), 0.0); // digit run too long
        assert_eq!(parse_coordinate("402443X"), 0.0); // bad direction
    }
}
