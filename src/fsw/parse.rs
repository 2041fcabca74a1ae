/*!
 * FSW token parsing.
 *
 * Tokens are matched against the FSW grammar with anchored regular expressions
 * and then decoded into `FswToken` values. Hex digits of symbol keys are accepted
 * in either case and emitted lowercase.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::FswError;

use super::{BoxMarker, Coord, FswToken, Sign, Spatial, SymbolKey};

static SIGN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:A((?:S[123][0-9a-fA-F]{2}[0-5][0-9a-fA-F])+))?([BLMR])([0-9]{3}x[0-9]{3})((?:S[123][0-9a-fA-F]{2}[0-5][0-9a-fA-F][0-9]{3}x[0-9]{3})*)$",
    )
    .expect("sign pattern is valid")
});

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(S[123][0-9a-fA-F]{2}[0-5][0-9a-fA-F])([0-9]{3}x[0-9]{3})?$")
        .expect("symbol pattern is valid")
});

static KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"S[123][0-9a-fA-F]{2}[0-5][0-9a-fA-F]").expect("key pattern is valid")
});

static SPATIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(S[123][0-9a-fA-F]{2}[0-5][0-9a-fA-F])([0-9]{3}x[0-9]{3})")
        .expect("spatial pattern is valid")
});

/// Parse one FSW token (a sign or a lone symbol)
pub fn parse_token(token: &str) -> Result<FswToken, FswError> {
    let trimmed = token.trim();

    if let Some(caps) = SIGN_RE.captures(trimmed) {
        let sequence = match caps.get(1) {
            Some(m) => KEY_RE
                .find_iter(m.as_str())
                .map(|k| parse_key(k.as_str()))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let marker = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .and_then(BoxMarker::from_char)
            .ok_or_else(|| FswError::InvalidToken(trimmed.to_string()))?;

        let max = parse_coord(&caps[3])?;

        let spatials = SPATIAL_RE
            .captures_iter(caps.get(4).map_or("", |m| m.as_str()))
            .map(|c| {
                Ok(Spatial {
                    symbol: parse_key(&c[1])?,
                    coord: parse_coord(&c[2])?,
                })
            })
            .collect::<Result<Vec<_>, FswError>>()?;

        return Ok(FswToken::Sign(Sign {
            sequence,
            marker,
            max,
            spatials,
        }));
    }

    if let Some(caps) = SYMBOL_RE.captures(trimmed) {
        let key = parse_key(&caps[1])?;
        let coord = caps.get(2).map(|m| parse_coord(m.as_str())).transpose()?;
        return Ok(FswToken::Symbol { key, coord });
    }

    Err(FswError::InvalidToken(trimmed.to_string()))
}

/// Parse a symbol key like `S15a04`
pub fn parse_key(key: &str) -> Result<SymbolKey, FswError> {
    let digits = key
        .strip_prefix('S')
        .filter(|d| d.len() == 5)
        .ok_or_else(|| FswError::InvalidToken(key.to_string()))?;

    let invalid = || FswError::InvalidToken(key.to_string());
    let base = u16::from_str_radix(&digits[0..3], 16).map_err(|_| invalid())?;
    let fill = u8::from_str_radix(&digits[3..4], 16).map_err(|_| invalid())?;
    let rotation = u8::from_str_radix(&digits[4..5], 16).map_err(|_| invalid())?;

    if !(0x100..=0x38b).contains(&base) || fill > 5 {
        return Err(FswError::SymbolOutOfRange(key.to_string()));
    }

    Ok(SymbolKey {
        base,
        fill,
        rotation,
    })
}

/// Parse a coordinate like `483x510`
pub fn parse_coord(coord: &str) -> Result<Coord, FswError> {
    let (x, y) = coord
        .split_once('x')
        .ok_or_else(|| FswError::InvalidToken(coord.to_string()))?;
    let x: i32 = x.parse().map_err(|_| FswError::InvalidToken(coord.to_string()))?;
    let y: i32 = y.parse().map_err(|_| FswError::InvalidToken(coord.to_string()))?;

    let parsed = Coord::new(x, y);
    if !parsed.in_range() {
        return Err(FswError::CoordinateOutOfRange(x, y));
    }
    Ok(parsed)
}
