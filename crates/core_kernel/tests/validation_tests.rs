//! Tests for the field-keyed validation error container

use core_kernel::{AccountId, ExpenseId, ValidationErrors};

mod error_accumulation_tests {
    use super::*;

    #[test]
    fn test_single_constructor() {
        let errors = ValidationErrors::single("amount", "must be greater than 0");
        assert!(!errors.is_empty());
        assert_eq!(errors.messages("amount"), ["must be greater than 0"]);
    }

    #[test]
    fn test_iteration_is_field_ordered() {
        let mut errors = ValidationErrors::new();
        errors.add("number", "can't be blank");
        errors.add("balance", "must be greater than 0");
        errors.add("name", "can't be blank");

        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, ["balance", "name", "number"]);
    }

    #[test]
    fn test_into_map_preserves_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("account", "balance is insufficient: $600");
        let map = errors.into_map();

        assert_eq!(
            map.get("account").unwrap(),
            &vec!["balance is insufficient: $600".to_string()]
        );
    }
}

mod validation_property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_added_messages_are_always_retrievable(
            fields in proptest::collection::vec("[a-z]{1,8}", 1..6),
        ) {
            let mut errors = ValidationErrors::new();
            for field in &fields {
                errors.add(field.clone(), "can't be blank");
            }
            prop_assert!(!errors.is_empty());
            for field in &fields {
                prop_assert!(errors.contains(field));
                prop_assert!(!errors.messages(field).is_empty());
            }
        }
    }
}

mod identifier_tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_types_with_distinct_prefixes() {
        assert_eq!(AccountId::prefix(), "ACC");
        assert_eq!(ExpenseId::prefix(), "EXP");
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let first = ExpenseId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let second = ExpenseId::new_v7();
        assert!(first.as_uuid() < second.as_uuid());
    }

    #[test]
    fn test_round_trip_through_display() {
        let id = AccountId::new();
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
