use super::matching::{matching_rules, Coerced, RentRollField, RENT_ROLL_RULES};
use super::types::{RentRollRecord, UnitRecord};
use crate::pipeline::decode::Row;

const OCCUPIED: &str = "Occupied";
const VACANT: &str = "Vacant";

/// Running totals folded over the unit lines.
#[derive(Debug, Default)]
struct Tally {
    units: Vec<UnitRecord>,
    occupied: u64,
    vacant: u64,
    total_rent: f64,
}

impl Tally {
    fn push(mut self, row: &Row) -> Self {
        let mut unit = UnitRecord::default();
        let mut explicit_status = false;

        for (key, cell) in row {
            for rule in matching_rules(RENT_ROLL_RULES, key) {
                let value = rule.coerce.apply(cell);
                match (rule.field, &value) {
                    (RentRollField::RentAmount, Coerced::Number(rent)) => self.total_rent += rent,
                    (RentRollField::Status, Coerced::Text(_)) => explicit_status = true,
                    _ => {}
                }
                unit.assign(rule.field, value);
            }
        }

        // One status per unit: the last status column wins, as on the record.
        // Inferred only when the source row had no status column at all.
        if explicit_status {
            self.count_status(&unit.status);
        } else {
            let has_tenant = unit
                .tenant_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty());
            if has_tenant {
                unit.status = OCCUPIED.to_string();
                self.occupied += 1;
            } else {
                unit.status = VACANT.to_string();
                self.vacant += 1;
            }
        }

        self.units.push(unit);
        self
    }

    fn count_status(&mut self, status: &str) {
        let lower = status.to_lowercase();
        if lower.contains("occupied") {
            self.occupied += 1;
        } else if lower.contains("vacant") {
            self.vacant += 1;
        }
    }
}

/// Extract the canonical rent roll from decoded table rows.
///
/// Each row is one unit. Explicit statuses that mention neither "occupied"
/// nor "vacant" are kept on the unit but counted in neither bucket.
pub fn extract_rent_roll(rows: &[Row]) -> RentRollRecord {
    let tally = rows.iter().fold(Tally::default(), Tally::push);

    let total_units = rows.len() as u64;
    let (occupancy_rate, average_rent) = if total_units > 0 {
        let n = total_units as f64;
        (tally.occupied as f64 / n * 100.0, tally.total_rent / n)
    } else {
        (0.0, 0.0)
    };

    if total_units == 0 {
        tracing::warn!("Rent roll contains no unit rows");
    }
    tracing::debug!(
        total_units,
        occupied = tally.occupied,
        vacant = tally.vacant,
        "Rent roll extracted"
    );

    RentRollRecord {
        total_units,
        occupied_units: tally.occupied,
        vacant_units: tally.vacant,
        occupancy_rate,
        total_rent: tally.total_rent,
        average_rent,
        units: tally.units,
        raw_row_data: rows.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decode::CellValue;

    fn row(cells: &[(&str, CellValue)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn four_occupied_units() {
        let rents = [1100.0, 1150.0, 1200.0, 1200.0];
        let rows: Vec<Row> = rents
            .iter()
            .enumerate()
            .map(|(i, rent)| {
                row(&[
                    ("Unit Number", CellValue::Number(101.0 + i as f64)),
                    ("Tenant Name", text(&format!("Tenant {i}"))),
                    ("Monthly Rent", CellValue::Number(*rent)),
                    ("Status", text("Occupied")),
                ])
            })
            .collect();

        let record = extract_rent_roll(&rows);
        assert_eq!(record.total_units, 4);
        assert_eq!(record.occupied_units, 4);
        assert_eq!(record.vacant_units, 0);
        assert_eq!(record.total_rent, 4650.0);
        assert_eq!(record.occupancy_rate, 100.0);
        assert_eq!(record.average_rent, 1162.5);
        assert_eq!(record.units[0].unit_number.as_deref(), Some("101"));
        assert_eq!(record.raw_row_data, rows);
    }

    #[test]
    fn empty_roll_has_zero_rates() {
        let record = extract_rent_roll(&[]);
        assert_eq!(record.total_units, 0);
        assert_eq!(record.occupancy_rate, 0.0);
        assert_eq!(record.average_rent, 0.0);
        assert!(record.units.is_empty());
    }

    #[test]
    fn status_inferred_from_tenant_when_column_missing() {
        let rows = vec![
            row(&[("Unit ID", text("A")), ("Tenant Name", text("Jane Doe")), ("Rent", CellValue::Number(900.0))]),
            row(&[("Unit ID", text("B")), ("Rent", CellValue::Number(0.0))]),
        ];
        let record = extract_rent_roll(&rows);
        assert_eq!(record.units[0].status, "Occupied");
        assert_eq!(record.units[1].status, "Vacant");
        assert_eq!(record.occupied_units + record.vacant_units, record.total_units);
        assert_eq!(record.occupancy_rate, 50.0);
    }

    #[test]
    fn explicit_status_is_never_overridden() {
        let rows = vec![row(&[("Tenant Name", text("Jane")), ("Unit Status", text("VACANT - notice"))])];
        let record = extract_rent_roll(&rows);
        assert_eq!(record.units[0].status, "VACANT - notice");
        assert_eq!(record.vacant_units, 1);
        assert_eq!(record.occupied_units, 0);
    }

    #[test]
    fn several_status_columns_count_the_unit_once() {
        let rows = vec![row(&[
            ("Unit Status", text("Occupied")),
            ("Lease Status", text("Occupied")),
        ])];
        let record = extract_rent_roll(&rows);
        assert_eq!(record.total_units, 1);
        assert_eq!(record.occupied_units, 1);
        assert_eq!(record.vacant_units, 0);
        assert_eq!(record.occupancy_rate, 100.0);
    }

    #[test]
    fn last_status_column_decides_the_bucket() {
        let rows = vec![row(&[
            ("Unit Status", text("Occupied")),
            ("Lease Status", text("Vacant - notice given")),
        ])];
        let record = extract_rent_roll(&rows);
        assert_eq!(record.units[0].status, "Vacant - notice given");
        assert_eq!(record.occupied_units, 0);
        assert_eq!(record.vacant_units, 1);
    }

    #[test]
    fn unrecognized_status_counts_in_neither_bucket() {
        let rows = vec![
            row(&[("Status", text("Down for renovation"))]),
            row(&[("Status", text("occupied"))]),
        ];
        let record = extract_rent_roll(&rows);
        assert_eq!(record.total_units, 2);
        assert_eq!(record.occupied_units, 1);
        assert_eq!(record.vacant_units, 0);
        assert!(record.occupied_units + record.vacant_units <= record.total_units);
    }

    #[test]
    fn every_rent_column_adds_to_total() {
        let rows = vec![row(&[
            ("Market Rent", CellValue::Number(1000.0)),
            ("Current Rent", CellValue::Number(950.0)),
            ("Rent Start Date", text("2024-01-01")),
        ])];
        let record = extract_rent_roll(&rows);
        assert_eq!(record.total_rent, 1950.0);
        assert_eq!(record.units[0].rent_amount, Some(950.0));
    }

    #[test]
    fn unparseable_rent_counts_as_zero() {
        let rows = vec![row(&[("Rent", text("$1,200")), ("Tenant Name", text("Li"))])];
        let record = extract_rent_roll(&rows);
        assert_eq!(record.units[0].rent_amount, Some(0.0));
        assert_eq!(record.total_rent, 0.0);
    }

    #[test]
    fn lease_dates_are_text() {
        let rows = vec![row(&[
            ("Lease Start", text("2024-01-01")),
            ("Lease End", CellValue::Number(45657.0)),
        ])];
        let record = extract_rent_roll(&rows);
        assert_eq!(record.units[0].lease_start.as_deref(), Some("2024-01-01"));
        assert_eq!(record.units[0].lease_end.as_deref(), Some("45657"));
    }
}
