/*!
 * Tests for FSW parsing and canonicalization
 */

use anyhow::Result;

use signcast::errors::FswError;
use signcast::fsw::{BoxMarker, FswToken, SymbolMetrics, normalize_token, parse_token};
use crate::common;

#[test]
fn test_parseToken_withTemporalPrefix_shouldKeepSequence() {
    let token = parse_token("AS10011S10019M524x535S10011476x465S10019499x484").unwrap();
    let FswToken::Sign(sign) = token else {
        panic!("expected a sign");
    };
    assert_eq!(sign.sequence.len(), 2);
    assert_eq!(sign.marker, BoxMarker::M);
    assert_eq!(sign.spatials.len(), 2);
    assert!(sign.spatials.iter().all(|s| s.symbol.is_hand()));
}

#[test]
fn test_parseToken_withUppercaseHex_shouldEmitLowercase() {
    let token = parse_token("M508x531S15A04483x510").unwrap();
    assert_eq!(token.to_string(), common::HAND_SIGN);
}

#[test]
fn test_parseToken_withInvalidInput_shouldReportWhy() {
    assert!(matches!(parse_token("bad-token"), Err(FswError::InvalidToken(_))));
    assert!(matches!(parse_token("S39000"), Err(FswError::SymbolOutOfRange(_))));
    assert_eq!(
        parse_token("M508x531S15a04200x510"),
        Err(FswError::CoordinateOutOfRange(200, 510))
    );
}

#[test]
fn test_normalizeToken_withStalePrefixedSign_shouldRecomputeBox() -> Result<()> {
    let metrics = SymbolMetrics::embedded();
    let normalized = normalize_token("AS10011S10019M600x600S10011476x465S10019499x484", &metrics)?;
    assert_eq!(
        normalized.as_deref(),
        Some("AS10011S10019M523x509S10011476x465S10019499x484")
    );
    Ok(())
}

#[test]
fn test_normalizeToken_withCanonicalSigns_shouldBeIdentity() -> Result<()> {
    let metrics = SymbolMetrics::embedded();
    for token in [common::HAND_SIGN, common::HEAD_SIGN] {
        assert_eq!(normalize_token(token, &metrics)?.as_deref(), Some(token));
    }
    Ok(())
}

#[test]
fn test_normalizeToken_withLoneSymbol_shouldPassThrough() -> Result<()> {
    let metrics = SymbolMetrics::embedded();
    assert_eq!(
        normalize_token("S38700463x496", &metrics)?.as_deref(),
        Some("S38700463x496")
    );
    Ok(())
}

#[test]
fn test_normalizeToken_withCustomStrictTable_shouldOnlyKnowListedSymbols() -> Result<()> {
    let mut metrics = SymbolMetrics::empty();
    metrics.insert("S15a", (21, 25));

    // falls back from the full key to the base key
    assert_eq!(
        normalize_token("M600x600S15a04483x510", &metrics)?.as_deref(),
        Some("M504x535S15a04483x510")
    );
    assert_eq!(normalize_token(common::HEAD_SIGN, &metrics)?, None);
    Ok(())
}

#[test]
fn test_normalizeToken_withSymbolMissingFromDefaultTable_shouldHaveNoCanonicalForm() -> Result<()> {
    let metrics = SymbolMetrics::embedded();
    // S14c20 is listed by base key, S27106 is not listed at all
    assert_eq!(normalize_token("M518x529S14c20481x471S27106503x489", &metrics)?, None);
    Ok(())
}
