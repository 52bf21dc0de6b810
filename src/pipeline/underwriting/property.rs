use serde_json::Value;

/// Crime index lower bounds and their letter grades, highest band first.
/// An index at or above a bound receives that band's grade.
const CRIME_BANDS: &[(f64, &str)] = &[
    (90.0, "F"),
    (80.0, "D-"),
    (70.0, "D"),
    (60.0, "D+"),
    (50.0, "C-"),
    (40.0, "C"),
    (30.0, "C+"),
    (20.0, "B-"),
    (10.0, "B"),
    (5.0, "B+"),
    (2.0, "A-"),
];
const SAFEST_GRADE: &str = "A+";

/// Property-data field carrying a raw neighbourhood crime index.
pub const CRIME_INDEX_FIELD: &str = "propertyCrimeIndex";
/// Property-data field carrying the letter grade the decision engine reads.
pub const CRIME_RATING_FIELD: &str = "propertyCrimeRating";

/// Letter grade for a neighbourhood crime index (higher index, worse grade).
pub fn crime_rating(crime_index: f64) -> &'static str {
    CRIME_BANDS
        .iter()
        .find(|(lower, _)| crime_index >= *lower)
        .map_or(SAFEST_GRADE, |&(_, grade)| grade)
}

/// Grade the raw crime index on a property-data object.
///
/// The rating is only filled in when the object has a usable
/// `propertyCrimeIndex` (number or numeric text) and no rating of its own.
/// Returns the grade that was set.
pub fn grade_crime_index(property: &mut Value) -> Option<&'static str> {
    let Value::Object(fields) = property else {
        return None;
    };
    if fields.get(CRIME_RATING_FIELD).is_some_and(|v| !v.is_null()) {
        return None;
    }

    let index = match fields.get(CRIME_INDEX_FIELD)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !index.is_finite() {
        return None;
    }

    let grade = crime_rating(index);
    fields.insert(CRIME_RATING_FIELD.to_string(), Value::from(grade));
    Some(grade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn crime_rating_bands() {
        assert_eq!(crime_rating(75.0), "D");
        assert_eq!(crime_rating(1.0), "A+");
        assert_eq!(crime_rating(90.0), "F");
        assert_eq!(crime_rating(89.99), "D-");
        assert_eq!(crime_rating(150.0), "F");
        assert_eq!(crime_rating(20.0), "B-");
        assert_eq!(crime_rating(5.0), "B+");
        assert_eq!(crime_rating(2.0), "A-");
        assert_eq!(crime_rating(0.0), "A+");
    }

    #[test]
    fn crime_rating_is_monotonic() {
        let grades: Vec<&str> = (0..=100).rev().map(|i| crime_rating(i as f64)).collect();
        let order: Vec<&str> = std::iter::once("F")
            .chain(CRIME_BANDS.iter().skip(1).map(|(_, g)| *g))
            .chain(std::iter::once(SAFEST_GRADE))
            .collect();
        let mut last = 0;
        for grade in grades {
            let pos = order.iter().position(|g| *g == grade).unwrap();
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn crime_index_fills_missing_rating() {
        let mut property = json!({ "propertyType": "APARTMENT", "propertyCrimeIndex": 42 });
        assert_eq!(grade_crime_index(&mut property), Some("C"));
        assert_eq!(property["propertyCrimeRating"], "C");
        assert_eq!(property["propertyCrimeIndex"], 42);

        let mut property = json!({ "propertyCrimeIndex": "75.5", "propertyCrimeRating": null });
        assert_eq!(grade_crime_index(&mut property), Some("D"));
        assert_eq!(property["propertyCrimeRating"], "D");
    }

    #[test]
    fn supplied_rating_is_kept() {
        let mut property = json!({ "propertyCrimeIndex": 95, "propertyCrimeRating": "B" });
        assert_eq!(grade_crime_index(&mut property), None);
        assert_eq!(property["propertyCrimeRating"], "B");
    }

    #[test]
    fn no_usable_index_leaves_property_untouched() {
        for original in [
            json!({ "propertyType": "APARTMENT" }),
            json!({ "propertyCrimeIndex": "unknown" }),
            json!({ "propertyCrimeIndex": [12] }),
            json!("not an object"),
        ] {
            let mut property = original.clone();
            assert_eq!(grade_crime_index(&mut property), None);
            assert_eq!(property, original);
        }
    }
}
