/*!
 * FSW sign canonicalization.
 *
 * A sign is canonical when its box corner is the bottom-right of the bounding box
 * of its symbols and, when head or trunk symbols are present, those symbols are
 * centred on the 500x500 origin (heads horizontally, heads and trunk vertically).
 * Normalizing a canonical sign returns it unchanged.
 */

use log::debug;

use crate::errors::FswError;

use super::metrics::SymbolMetrics;
use super::parse::parse_token;
use super::{COORD_CENTER, Coord, FswToken, Sign, Spatial};

#[derive(Debug, Clone, Copy)]
struct Bounds {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

fn bounds<'a>(items: impl Iterator<Item = &'a (Spatial, (u32, u32))>) -> Option<Bounds> {
    items.fold(None, |acc, (spatial, (w, h))| {
        let x2 = spatial.coord.x + *w as i32;
        let y2 = spatial.coord.y + *h as i32;
        Some(match acc {
            None => Bounds {
                x1: spatial.coord.x,
                y1: spatial.coord.y,
                x2,
                y2,
            },
            Some(b) => Bounds {
                x1: b.x1.min(spatial.coord.x),
                y1: b.y1.min(spatial.coord.y),
                x2: b.x2.max(x2),
                y2: b.y2.max(y2),
            },
        })
    })
}

/// Canonicalize a parsed sign. `None` when a symbol size is unknown or the
/// result would leave the coordinate plane.
pub fn normalize_sign(sign: &Sign, metrics: &SymbolMetrics) -> Option<Sign> {
    if sign.spatials.is_empty() {
        return Some(sign.clone());
    }

    let sized = sign
        .spatials
        .iter()
        .map(|spatial| metrics.size(&spatial.symbol).map(|size| (*spatial, size)))
        .collect::<Option<Vec<_>>>()?;

    let all = bounds(sized.iter())?;

    let dx = bounds(sized.iter().filter(|(s, _)| s.symbol.is_hcenter()))
        .map_or(0, |b| COORD_CENTER - (b.x1 + b.x2) / 2);
    let dy = bounds(sized.iter().filter(|(s, _)| s.symbol.is_vcenter()))
        .map_or(0, |b| COORD_CENTER - (b.y1 + b.y2) / 2);

    let max = Coord::new(all.x2 + dx, all.y2 + dy);
    let spatials: Vec<Spatial> = sign
        .spatials
        .iter()
        .map(|s| Spatial {
            symbol: s.symbol,
            coord: s.coord.offset(dx, dy),
        })
        .collect();

    if !max.in_range() || spatials.iter().any(|s| !s.coord.in_range()) {
        debug!("Normalized sign would leave the coordinate plane: {}", sign);
        return None;
    }

    Some(Sign {
        sequence: sign.sequence.clone(),
        marker: sign.marker,
        max,
        spatials,
    })
}

/// Normalize a raw token. `Ok(None)` means the token parsed but has no
/// canonical form under the given metrics.
pub fn normalize_token(token: &str, metrics: &SymbolMetrics) -> Result<Option<String>, FswError> {
    match parse_token(token)? {
        FswToken::Sign(sign) => Ok(normalize_sign(&sign, metrics).map(|s| s.to_string())),
        symbol @ FswToken::Symbol { .. } => Ok(Some(symbol.to_string())),
    }
}
