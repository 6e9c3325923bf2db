//! Tests for control, incidence and weight tables.

use super::*;
use crate::error::TableError;
use crate::zone::ZoneId;

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn puma_controls() -> ControlTable {
    ControlTable::new("PUMA", cols(&["num_hh", "hh_size_1"]))
        .with_zone(ZoneId(200), vec![40.0, 12.0])
        .unwrap()
        .with_zone(ZoneId(100), vec![30.0, f64::NAN])
        .unwrap()
}

// ============================================================================
// ControlTable Tests
// ============================================================================

mod control_table {
    use super::*;

    #[test]
    fn test_zones_are_sorted() {
        let table = puma_controls();
        let zones: Vec<ZoneId> = table.zones().collect();
        assert_eq!(zones, vec![ZoneId(100), ZoneId(200)]);
        assert_eq!(table.zone_count(), 2);
    }

    #[test]
    fn test_get_and_row() {
        let table = puma_controls();
        assert_eq!(table.get(ZoneId(200), "hh_size_1").unwrap(), 12.0);
        assert_eq!(table.row(ZoneId(200)).unwrap(), &[40.0, 12.0]);
        assert!(table.get(ZoneId(100), "hh_size_1").unwrap().is_nan());
    }

    #[test]
    fn test_missing_target() {
        let err = puma_controls().get(ZoneId(100), "hh_inc_30").unwrap_err();
        assert_eq!(
            err,
            TableError::MissingControlTarget {
                table: "PUMA_controls".to_string(),
                target: "hh_inc_30".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_zone() {
        let err = puma_controls().row(ZoneId(999)).unwrap_err();
        assert!(matches!(err, TableError::MissingZone { zone: ZoneId(999), .. }));
    }

    #[test]
    fn test_insert_wrong_length() {
        let mut table = ControlTable::new("PUMA", cols(&["num_hh"]));
        let err = table.insert_zone(ZoneId(1), vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            TableError::LengthMismatch {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_insert_duplicate_zone() {
        let mut table = ControlTable::new("PUMA", cols(&["num_hh"]));
        table.insert_zone(ZoneId(1), vec![1.0]).unwrap();
        let err = table.insert_zone(ZoneId(1), vec![2.0]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateZone { .. }));
    }

    #[test]
    fn test_append_then_select_reorders() {
        let meta = ControlTable::new("PUMA", cols(&["hh_inc_30"]))
            .with_zone(ZoneId(100), vec![7.0])
            .unwrap()
            .with_zone(ZoneId(200), vec![9.0])
            .unwrap();

        let combined = puma_controls().append_columns(&meta).unwrap();
        assert_eq!(combined.columns(), &cols(&["num_hh", "hh_size_1", "hh_inc_30"])[..]);

        let order = cols(&["num_hh", "hh_inc_30", "hh_size_1"]);
        let selected = combined.select(&order).unwrap();
        assert!(selected.has_columns(&order));
        assert_eq!(selected.row(ZoneId(200)).unwrap(), &[40.0, 9.0, 12.0]);
    }

    #[test]
    fn test_append_requires_same_zones() {
        let other = ControlTable::new("PUMA", cols(&["hh_inc_30"]))
            .with_zone(ZoneId(100), vec![7.0])
            .unwrap();
        let err = puma_controls().append_columns(&other).unwrap_err();
        assert!(matches!(err, TableError::ZoneSetMismatch { .. }));
    }

    #[test]
    fn test_select_missing_target() {
        let err = puma_controls().select(&cols(&["num_hh", "gq_pop"])).unwrap_err();
        assert!(matches!(err, TableError::MissingControlTarget { .. }));
    }

    #[test]
    fn test_nan_counts() {
        assert_eq!(
            puma_controls().nan_counts(),
            vec![("hh_size_1".to_string(), 1)]
        );
    }

    #[test]
    fn test_column() {
        assert_eq!(
            puma_controls().column("num_hh").unwrap(),
            vec![(ZoneId(100), 30.0), (ZoneId(200), 40.0)]
        );
    }
}

// ============================================================================
// IncidenceTable Tests
// ============================================================================

mod incidence_table {
    use super::*;

    fn incidence() -> IncidenceTable {
        IncidenceTable::new(4)
            .with_zone_column("PUMA", vec![ZoneId(2), ZoneId(1), ZoneId(2), ZoneId(1)])
            .unwrap()
            .with_incidence("num_hh", vec![1.0; 4])
            .unwrap()
            .with_incidence("persons", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
    }

    #[test]
    fn test_zones_and_groups() {
        let table = incidence();
        assert_eq!(table.zones("PUMA").unwrap(), vec![ZoneId(1), ZoneId(2)]);

        let groups = table.rows_by_zone("PUMA").unwrap();
        assert_eq!(groups[&ZoneId(1)], vec![1, 3]);
        assert_eq!(groups[&ZoneId(2)], vec![0, 2]);
    }

    #[test]
    fn test_slice_rows_is_row_major() {
        let table = incidence();
        let matrix = table
            .slice_rows(&[1, 3], &cols(&["persons", "num_hh"]))
            .unwrap();
        assert_eq!(matrix, vec![vec![2.0, 1.0], vec![4.0, 1.0]]);
    }

    #[test]
    fn test_length_checked() {
        let err = IncidenceTable::new(3)
            .with_incidence("num_hh", vec![1.0, 1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_geography() {
        let err = incidence().zone_column("COUNTY").unwrap_err();
        assert!(matches!(err, TableError::MissingColumn { .. }));
    }

    #[test]
    fn test_replacing_incidence_keeps_order() {
        let table = incidence().with_incidence("num_hh", vec![0.0; 4]).unwrap();
        assert_eq!(table.targets(), &cols(&["num_hh", "persons"])[..]);
        assert_eq!(table.incidence("num_hh").unwrap(), &[0.0; 4]);
    }
}

// ============================================================================
// WeightTable / TableStore Tests
// ============================================================================

mod weight_table {
    use super::*;

    fn weights() -> WeightTable {
        WeightTable::new("PUMA", vec![ZoneId(1), ZoneId(1), ZoneId(2)])
            .with_float_column(BALANCED_WEIGHT, vec![1.5, 2.5, 3.0])
            .unwrap()
    }

    #[test]
    fn test_integer_column_leaves_float_columns() {
        let mut table = weights();
        table
            .add_integer_column(INTEGER_WEIGHT, vec![1, 3, 3])
            .unwrap();
        assert_eq!(table.integer_column(INTEGER_WEIGHT).unwrap(), &[1, 3, 3]);
        assert_eq!(table.float_column(BALANCED_WEIGHT).unwrap(), &[1.5, 2.5, 3.0]);
    }

    #[test]
    fn test_integer_column_length_checked() {
        let mut table = weights();
        assert!(table.add_integer_column(INTEGER_WEIGHT, vec![1]).is_err());
        assert!(table.integer_column(INTEGER_WEIGHT).is_err());
    }

    #[test]
    fn test_missing_float_column() {
        let err = weights().float_column(PRELIMINARY_BALANCED_WEIGHT).unwrap_err();
        assert_eq!(
            err,
            TableError::MissingColumn {
                table: "PUMA_weights".to_string(),
                column: PRELIMINARY_BALANCED_WEIGHT.to_string(),
            }
        );
    }

    #[test]
    fn test_store_round_trip() {
        let mut store = InMemoryTables::new(IncidenceTable::new(3))
            .with_control_table(puma_controls())
            .with_weight_table(weights());

        assert_eq!(store.control_table("PUMA").unwrap().zone_count(), 2);
        assert!(matches!(
            store.control_table("COUNTY"),
            Err(TableError::MissingTable { .. })
        ));

        store
            .add_weight_column("PUMA", INTEGER_WEIGHT, vec![2, 2, 3])
            .unwrap();
        assert_eq!(
            store
                .weight_table("PUMA")
                .unwrap()
                .integer_column(INTEGER_WEIGHT)
                .unwrap(),
            &[2, 2, 3]
        );

        let replacement = ControlTable::new("PUMA", cols(&["num_hh"]));
        store.replace_control_table(replacement);
        assert_eq!(store.control_table("PUMA").unwrap().zone_count(), 0);
        assert_eq!(store.incidence_table().len(), 3);
    }
}
