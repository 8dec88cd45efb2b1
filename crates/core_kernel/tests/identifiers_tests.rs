//! Unit tests for strongly-typed identifiers
//!
//! Tests cover creation, prefixed display, parsing, serialization and the
//! ordering that rule evaluation relies on for tie-breaking.

use core_kernel::{CarrierId, ImoId, PremiumRowId, ProductId, RuleId, RuleSetId};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

mod creation {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let ids: HashSet<RuleId> = (0..100).map(|_| RuleId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::from_u128(7);
        let id = CarrierId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(Uuid::from(id), uuid);
        assert_eq!(CarrierId::from(uuid), id);
    }

    #[test]
    fn test_default_is_random() {
        assert_ne!(ProductId::default(), ProductId::default());
    }
}

mod display {
    use super::*;

    #[test]
    fn test_prefixes() {
        let uuid = Uuid::from_u128(1);
        let cases = [
            (ImoId::from_uuid(uuid).to_string(), ImoId::prefix()),
            (CarrierId::from_uuid(uuid).to_string(), CarrierId::prefix()),
            (ProductId::from_uuid(uuid).to_string(), ProductId::prefix()),
            (RuleSetId::from_uuid(uuid).to_string(), RuleSetId::prefix()),
            (RuleId::from_uuid(uuid).to_string(), RuleId::prefix()),
            (PremiumRowId::from_uuid(uuid).to_string(), PremiumRowId::prefix()),
        ];
        for (display, prefix) in cases {
            assert_eq!(display, format!("{}-{}", prefix, uuid));
        }
    }

    #[test]
    fn test_prefix_values() {
        assert_eq!(ImoId::prefix(), "IMO");
        assert_eq!(CarrierId::prefix(), "CAR");
        assert_eq!(ProductId::prefix(), "PRD");
        assert_eq!(RuleSetId::prefix(), "RS");
        assert_eq!(RuleId::prefix(), "RUL");
        assert_eq!(PremiumRowId::prefix(), "PMR");
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        let id = RuleSetId::new();
        assert_eq!(RuleSetId::from_str(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_bare_uuid() {
        let id = ImoId::new();
        assert_eq!(ImoId::from_str(&id.as_uuid().to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CarrierId::from_str("CAR-not-a-uuid").is_err());
        assert!(CarrierId::from_str("").is_err());
    }

    #[test]
    fn test_foreign_prefix_is_rejected() {
        let product = ProductId::new().to_string();
        assert!(CarrierId::from_str(&product).is_err(), "PRD- is not a carrier prefix");
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::from_u128(42);
        let json = serde_json::to_string(&RuleId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn test_json_roundtrip() {
        let id = PremiumRowId::new_v7();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: PremiumRowId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}

mod ordering {
    use super::*;

    #[test]
    fn test_order_follows_uuid() {
        let mut ids = vec![
            RuleId::from_uuid(Uuid::from_u128(3)),
            RuleId::from_uuid(Uuid::from_u128(1)),
            RuleId::from_uuid(Uuid::from_u128(2)),
        ];
        ids.sort();
        let raw: Vec<u128> = ids.iter().map(|id| id.as_uuid().as_u128()).collect();
        assert_eq!(raw, vec![1, 2, 3]);
    }

    #[test]
    fn test_v7_ids_sort_by_creation() {
        let first = RuleSetId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RuleSetId::new_v7();
        assert!(first < second, "Later v7 ids sort after earlier ones");
    }
}
