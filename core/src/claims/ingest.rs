use crate::claims::patterns::PatternTable;
use crate::error::{CoreError, CoreResult};
use crate::model::{Claim, ClaimIndex};
use crate::normalize::fold_text;

/// Build claims from registry text such as `"1. A system comprising..."` and
/// `"2. The system of claim 1, wherein..."`. Unnumbered entries take their
/// 1-based position. A claim referring to another claim in its preamble
/// becomes a dependent of that claim.
pub fn claims_from_text<S: AsRef<str>>(raw_claims: &[S]) -> CoreResult<Vec<Claim>> {
    let patterns = PatternTable::compile()?;

    let mut claims = Vec::with_capacity(raw_claims.len());
    for (position, raw) in raw_claims.iter().enumerate() {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            continue;
        }
        let (index, body) = match patterns.claim_number.captures(raw) {
            Some(caps) => {
                let index = parse_index(&caps[1])?;
                let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                (index, &raw[end..])
            }
            None => (position as ClaimIndex + 1, raw),
        };
        let claim = match patterns.dependency_preamble.captures(&fold_text(body)) {
            Some(caps) => Claim::dependent(index, parse_index(&caps[1])?, body),
            None => Claim::independent(index, body),
        };
        claims.push(claim);
    }
    Ok(claims)
}

fn parse_index(digits: &str) -> CoreResult<ClaimIndex> {
    digits
        .parse::<ClaimIndex>()
        .map_err(|_| CoreError::InvalidInput(format!("claim number out of range: {}", digits)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_dependencies_from_preamble() {
        let claims = claims_from_text(&[
            "1. A system comprising a battery pack coupled to a charging controller.",
            "2. The system of claim 1, wherein the controller limits current.",
            "3. A method according to claim 2, further comprising balancing cells.",
        ])
        .unwrap();
        assert_eq!(claims.len(), 3);
        assert!(claims[0].is_independent);
        assert_eq!(claims[1].depends_on, Some(1));
        assert_eq!(claims[2].depends_on, Some(2));
        assert!(claims[1].text.starts_with("The system of claim 1"));
    }

    #[test]
    fn dependency_match_ignores_case() {
        let claims = claims_from_text(&[
            "1. A Method For Charging, Comprising Aligning A Coil.",
            "3. A Method As Claimed In Claim 1, Wherein The Coil Is Round.",
        ])
        .unwrap();
        assert_eq!(claims[1].index, 3);
        assert_eq!(claims[1].depends_on, Some(1));
        assert!(claims[1].text.starts_with("A Method As Claimed"));
    }

    #[test]
    fn unnumbered_claims_use_position() {
        let claims = claims_from_text(&["A coil.", "", "A shield."]).unwrap();
        assert_eq!(claims.iter().map(|c| c.index).collect::<Vec<_>>(), vec![1, 3]);
    }
}
