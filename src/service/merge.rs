use crate::error::ApiError;
use crate::models::patient::{Patient, PatientUpdate};

/// Overlay `update` on the base fields of `existing` and rebuild the record.
///
/// Derived fields are recomputed and every constraint is checked again,
/// including on fields the update did not touch.
pub fn apply_update(id: &str, existing: &Patient, update: PatientUpdate) -> Result<Patient, ApiError> {
    let mut draft = existing.to_draft(id);

    if let Some(name) = update.name {
        draft.name = Some(name);
    }
    if let Some(city) = update.city {
        draft.city = Some(city);
    }
    if let Some(age) = update.age {
        draft.age = Some(age);
    }
    if let Some(gender) = update.gender {
        draft.gender = Some(gender);
    }
    if let Some(height) = update.height {
        draft.height = Some(height);
    }
    if let Some(weight) = update.weight {
        draft.weight = Some(weight);
    }

    draft.into_patient().map(|(_, patient)| patient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::tests::sample_patient;
    use crate::models::patient::{Gender, Verdict};

    #[test]
    fn weight_only_update_recomputes_derived_fields() {
        let existing = sample_patient();
        let update = PatientUpdate {
            weight: Some(45.0),
            ..Default::default()
        };

        let merged = apply_update("p001", &existing, update).unwrap();

        assert_eq!(merged.weight(), 45.0);
        assert_eq!(merged.bmi(), 14.69);
        assert_eq!(merged.verdict(), Verdict::Underweight);
        assert_eq!(merged.name(), existing.name());
        assert_eq!(merged.city(), existing.city());
        assert_eq!(merged.age(), existing.age());
        assert_eq!(merged.gender(), existing.gender());
        assert_eq!(merged.height(), existing.height());
    }

    #[test]
    fn empty_update_is_identity() {
        let existing = sample_patient();
        let merged = apply_update("p001", &existing, PatientUpdate::default()).unwrap();
        assert_eq!(merged, existing);
    }

    #[test]
    fn height_update_moves_verdict() {
        let existing = sample_patient();
        let update = PatientUpdate {
            height: Some(140),
            ..Default::default()
        };

        let merged = apply_update("p001", &existing, update).unwrap();
        assert_eq!(merged.bmi(), 31.63);
        assert_eq!(merged.verdict(), Verdict::Overweight);
    }

    #[test]
    fn accepts_others_gender() {
        let update = PatientUpdate {
            gender: Some("others".to_string()),
            ..Default::default()
        };
        let merged = apply_update("p001", &sample_patient(), update).unwrap();
        assert_eq!(merged.gender(), Gender::Others);
    }

    #[test]
    fn invalid_update_is_rejected() {
        let update = PatientUpdate {
            age: Some(120),
            city: Some(String::new()),
            ..Default::default()
        };

        match apply_update("p001", &sample_patient(), update) {
            Err(ApiError::Validation(violations)) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
                assert_eq!(fields, vec!["age", "city"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
