//! Free shipping eligibility

use uuid::Uuid;

use crate::FreeShippingRule;

/// True iff the product has a free-shipping rule listing `country_id`.
pub fn is_eligible(rule: Option<&FreeShippingRule>, country_id: Uuid) -> bool {
    rule.map_or(false, |r| r.eligible_countries.contains(&country_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rule() { assert!(!is_eligible(None, Uuid::new_v4())); }

    #[test]
    fn test_membership() {
        let (ca, mx) = (Uuid::new_v4(), Uuid::new_v4());
        let rule = FreeShippingRule::new([ca]);
        assert!(is_eligible(Some(&rule), ca));
        assert!(!is_eligible(Some(&rule), mx));
        assert!(!is_eligible(Some(&FreeShippingRule::default()), ca));
    }
}
