#[cfg(test)]
mod tests {
    use crate::errors::{Error, RuleError};
    use crate::rules::{
        CategoryReimbursement, CategoryThresholdReimbursement, OfferScope, ReimbursementRule,
        RuleDefinition, RuleGroup, RuleId, RulePolicy, RuleSet, ThresholdReimbursement,
        ValidityWindow,
    };
    use crate::transactions::{GroupingStrategy, OfferCategory, Transaction};
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn booking(value: Decimal, is_digital: bool, category: OfferCategory) -> Transaction {
        Transaction {
            id: "b1".to_string(),
            created_at: date(2019, 5, 1),
            value,
            is_digital,
            category,
            venue_id: "venue-1".to_string(),
            offerer_id: "offerer-1".to_string(),
        }
    }

    // ==================== Category Rules ====================

    #[test]
    fn test_digital_things_relevant_for_digital_non_exempt_only() {
        let rule = CategoryReimbursement::digital_things();
        assert!(rule.is_relevant(&booking(dec!(10), true, OfferCategory::Standard), dec!(0)));
        assert!(!rule.is_relevant(&booking(dec!(10), true, OfferCategory::Book), dec!(0)));
        assert!(!rule.is_relevant(&booking(dec!(10), true, OfferCategory::CinemaCard), dec!(0)));
        assert!(!rule.is_relevant(&booking(dec!(10), false, OfferCategory::Standard), dec!(0)));
        assert_eq!(rule.apply(&booking(dec!(10), true, OfferCategory::Standard)), dec!(0));
    }

    #[test]
    fn test_physical_offers_relevant_for_physical_or_exempt() {
        let rule = CategoryReimbursement::physical_offers();
        assert!(rule.is_relevant(&booking(dec!(10), false, OfferCategory::Standard), dec!(0)));
        assert!(rule.is_relevant(&booking(dec!(10), true, OfferCategory::Book), dec!(0)));
        assert!(!rule.is_relevant(&booking(dec!(10), true, OfferCategory::Standard), dec!(0)));
        assert_eq!(rule.apply(&booking(dec!(12.34), false, OfferCategory::Standard)), dec!(12.34));
    }

    // ==================== Threshold Rules ====================

    #[test]
    fn test_band_bounds_are_exclusive_below_inclusive_above() {
        let rule = ThresholdReimbursement::between_20000_and_40000();
        let tx = booking(dec!(10), false, OfferCategory::Standard);
        assert!(!rule.is_relevant(&tx, dec!(20000)));
        assert!(rule.is_relevant(&tx, dec!(20000.01)));
        assert!(rule.is_relevant(&tx, dec!(40000)));
        assert!(!rule.is_relevant(&tx, dec!(40000.01)));
    }

    #[test]
    fn test_open_ended_band() {
        let rule = ThresholdReimbursement::above_100000();
        let tx = booking(dec!(10), false, OfferCategory::Standard);
        assert!(!rule.is_relevant(&tx, dec!(100000)));
        assert!(rule.is_relevant(&tx, dec!(5000000)));
    }

    #[test]
    fn test_threshold_rules_ignore_digital_offers() {
        let digital_book = booking(dec!(10), true, OfferCategory::Book);
        assert!(!ThresholdReimbursement::above_100000().is_relevant(&digital_book, dec!(200000)));
        assert!(!ThresholdReimbursement::max_reimbursement_by_offerer()
            .is_relevant(&digital_book, dec!(200000)));
    }

    #[test]
    fn test_band_rate_is_exact() {
        let rule = ThresholdReimbursement::between_20000_and_40000();
        assert_eq!(
            rule.apply(&booking(dec!(10000), false, OfferCategory::Standard)),
            dec!(9500)
        );
    }

    // ==================== Category Threshold Rule ====================

    #[test]
    fn test_book_rule_overrides_and_targets_books_only() {
        let rule = CategoryThresholdReimbursement::book_above_20000();
        assert!(rule.overrides_other_rules());
        assert!(rule.is_relevant(&booking(dec!(10), false, OfferCategory::Book), dec!(20001)));
        assert!(rule.is_relevant(&booking(dec!(10), true, OfferCategory::Book), dec!(20001)));
        assert!(!rule.is_relevant(&booking(dec!(10), false, OfferCategory::Book), dec!(20000)));
        assert!(!rule.is_relevant(
            &booking(dec!(10), false, OfferCategory::CinemaCard),
            dec!(50000)
        ));
        assert!(!CategoryReimbursement::physical_offers().overrides_other_rules());
    }

    // ==================== Validity Window ====================

    #[test]
    fn test_validity_window_is_half_open() {
        let window =
            ValidityWindow::new("test", Some(date(2019, 1, 1)), Some(date(2020, 1, 1))).unwrap();
        assert!(window.contains(date(2019, 1, 1)));
        assert!(window.contains(date(2019, 12, 31)));
        assert!(!window.contains(date(2020, 1, 1)));
        assert!(!window.contains(date(2018, 12, 31)));
        assert!(ValidityWindow::ALWAYS.contains(date(1970, 1, 1)));
    }

    #[test]
    fn test_validity_window_rejects_inverted_bounds() {
        let result = ValidityWindow::new("test", Some(date(2020, 1, 1)), Some(date(2019, 1, 1)));
        assert!(matches!(
            result,
            Err(Error::Rule(RuleError::InvalidWindow { .. }))
        ));
    }

    #[test]
    fn test_is_active_uses_validity_window() {
        let window = ValidityWindow::new("late", Some(date(2020, 1, 1)), None).unwrap();
        let rule = CategoryReimbursement::new(
            RuleId::Custom("LATE".to_string()),
            "Late rule",
            OfferScope::PhysicalOrExempt,
            dec!(1),
            RuleGroup::Custom,
            window,
        )
        .unwrap();
        assert!(!rule.is_active(&booking(dec!(10), false, OfferCategory::Standard)));
    }

    // ==================== Validation ====================

    #[test]
    fn test_rate_outside_unit_interval_is_rejected() {
        let result = CategoryReimbursement::new(
            RuleId::Custom("BAD".to_string()),
            "Bad",
            OfferScope::PhysicalOrExempt,
            dec!(1.5),
            RuleGroup::Custom,
            ValidityWindow::ALWAYS,
        );
        assert!(matches!(
            result,
            Err(Error::Rule(RuleError::InvalidRate { .. }))
        ));
    }

    #[test]
    fn test_empty_band_is_rejected() {
        let result = ThresholdReimbursement::new(
            RuleId::Custom("EMPTY".to_string()),
            "Empty",
            dec!(100),
            Some(dec!(100)),
            dec!(0.5),
            RuleGroup::Custom,
            ValidityWindow::ALWAYS,
        );
        assert!(matches!(
            result,
            Err(Error::Rule(RuleError::InvalidDefinition(_)))
        ));
    }

    // ==================== Rule Sets ====================

    #[test]
    fn test_builtin_rule_sets() {
        let current = RuleSet::for_policy(RulePolicy::Current);
        assert_eq!(current.len(), 3);
        assert_eq!(current.grouping(), GroupingStrategy::OffererYear);
        assert!(current.get(&RuleId::MaxReimbursementByOfferer).is_some());
        assert!(current.get(&RuleId::BookAbove20000).is_none());

        let new = RuleSet::for_policy(RulePolicy::New);
        assert_eq!(new.len(), 6);
        assert_eq!(new.grouping(), GroupingStrategy::VenueYear);
        assert!(new.get(&RuleId::MaxReimbursementByOfferer).is_none());
        assert_eq!(new.rules()[0].id(), &RuleId::DigitalThings);

        assert!(RuleSet::for_policy(RulePolicy::Custom).is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(RulePolicy::from_str("NEW").unwrap(), RulePolicy::New);
        assert_eq!(RulePolicy::from_str("current").unwrap(), RulePolicy::Current);
        assert!(RulePolicy::from_str("custom").is_err());
    }

    #[test]
    fn test_rule_id_round_trip_for_builtin_names() {
        assert_eq!(
            RuleId::from_str("BOOK_REIMBURSEMENT").unwrap(),
            RuleId::BookAbove20000
        );
        assert_eq!(
            RuleId::from_str("SPECIAL").unwrap(),
            RuleId::Custom("SPECIAL".to_string())
        );
        assert!(RuleId::from_str("  ").is_err());
    }

    #[test]
    fn test_rule_set_from_json() {
        let json = r#"{
            "grouping": "VENUE_YEAR",
            "rules": [
                {
                    "kind": "CATEGORY",
                    "id": "PHYSICAL_OFFERS",
                    "description": "Full",
                    "scope": "PHYSICAL_OR_EXEMPT",
                    "rate": "1"
                },
                {
                    "kind": "THRESHOLD",
                    "id": "HALF_ABOVE_1000",
                    "description": "Half above 1000",
                    "above": 1000,
                    "rate": "0.5",
                    "validFrom": "2021-01-01T00:00:00Z"
                },
                {
                    "kind": "CATEGORY_THRESHOLD",
                    "id": "CINEMA",
                    "description": "Cinema cards",
                    "category": "CINEMA_CARD",
                    "above": "500",
                    "rate": "0.9",
                    "group": "BOOK"
                }
            ]
        }"#;
        let set = RuleSet::from_json(json).unwrap();
        assert_eq!(set.policy(), RulePolicy::Custom);
        assert_eq!(set.len(), 3);
        let half = set.get(&RuleId::Custom("HALF_ABOVE_1000".to_string())).unwrap();
        assert_eq!(half.rate(), dec!(0.5));
        assert_eq!(half.group(), RuleGroup::Custom);
        assert!(half.validity().from.is_some());
        let cinema = set.get(&RuleId::Custom("CINEMA".to_string())).unwrap();
        assert!(cinema.overrides_other_rules());
        assert_eq!(cinema.group(), RuleGroup::Book);
    }

    #[test]
    fn test_rule_definition_rejects_invalid_rate() {
        let definition: RuleDefinition = serde_json::from_str(
            r#"{"kind":"CATEGORY","id":"X","description":"x","scope":"DIGITAL_NON_EXEMPT","rate":"-0.1"}"#,
        )
        .unwrap();
        assert!(definition.build().is_err());
    }

    #[test]
    fn test_rule_group_labels_and_positions() {
        assert_eq!(RuleGroup::Standard.position(), 1);
        assert_eq!(RuleGroup::Deprecated.position(), 5);
        assert_eq!(RuleGroup::Book.label(), "Barème livres");
    }
}
