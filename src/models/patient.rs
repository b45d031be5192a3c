use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{ApiError, FieldViolation};

/// Every stored patient keyed by Id
pub type PatientCollection = BTreeMap<String, Patient>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "others" => Some(Self::Others),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Others => "others",
        }
    }
}

/// BMI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Underweight,
    Normal,
    Overweight,
}

impl Verdict {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 30.0 {
            Self::Normal
        } else {
            Self::Overweight
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
        };
        f.write_str(label)
    }
}

/// Body mass index rounded to two decimals.
///
/// Rounding goes through the exact decimal expansion of the quotient, so
/// `x.xx5` boundaries land where a decimal `round(x, 2)` puts them. Returns
/// a non-finite value when the quotient overflows.
pub fn body_mass_index(height_cm: u32, weight_kg: f64) -> f64 {
    let metres = f64::from(height_cm) / 100.0;
    let bmi = weight_kg / (metres * metres);
    format!("{bmi:.2}").parse().unwrap_or(bmi)
}

/// A validated patient as stored under its Id.
///
/// `bmi` and `verdict` are only ever computed from `height` and `weight`;
/// the type has no setters, so the only way to obtain one is through
/// [`PatientDraft::into_patient`] or by loading a stored collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    name: String,
    city: String,
    age: u8,
    gender: Gender,
    height: u32,
    weight: f64,
    bmi: f64,
    verdict: Verdict,
}

impl Patient {
    fn new(
        name: String,
        city: String,
        age: u8,
        gender: Gender,
        height: u32,
        weight: f64,
        bmi: f64,
    ) -> Self {
        Self {
            name,
            city,
            age,
            gender,
            height,
            weight,
            bmi,
            verdict: Verdict::from_bmi(bmi),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Base fields of this record under `id`, without the derived ones
    pub fn to_draft(&self, id: &str) -> PatientDraft {
        PatientDraft {
            id: Some(id.to_string()),
            name: Some(self.name.clone()),
            city: Some(self.city.clone()),
            age: Some(i64::from(self.age)),
            gender: Some(self.gender.as_str().to_string()),
            height: Some(i64::from(self.height)),
            weight: Some(self.weight),
        }
    }
}

/// Unvalidated patient input.
///
/// Every field is optional so that a missing field is reported alongside
/// the other violations instead of aborting deserialization. Unknown keys,
/// including `bmi` and `verdict`, are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PatientDraft {
    #[serde(rename = "Id")]
    #[validate(required, length(min = 1, message = "must not be empty"))]
    pub id: Option<String>,

    #[validate(required, length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,

    #[validate(required, length(min = 1, message = "must not be empty"))]
    pub city: Option<String>,

    #[validate(
        required,
        range(min = 1, max = 99, message = "must be greater than 0 and less than 100")
    )]
    pub age: Option<i64>,

    #[validate(required)]
    pub gender: Option<String>,

    #[validate(required, range(min = 1, message = "must be greater than 0"))]
    pub height: Option<i64>,

    #[validate(required)]
    pub weight: Option<f64>,
}

impl PatientDraft {
    /// Run every field check, collecting all failures
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(gender) = &self.gender {
            if Gender::parse(gender).is_none() {
                errors.add(
                    "gender",
                    violation("gender", "must be one of male, female, others"),
                );
            }
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight <= 0.0 {
                errors.add("weight", violation("range", "must be greater than 0"));
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and build the stored record, returning it with its Id
    pub fn into_patient(self) -> Result<(String, Patient), ApiError> {
        self.check()
            .map_err(|errors| ApiError::Validation(violations(&errors)))?;

        let mut invalid = Vec::new();
        let id = present("Id", self.id, &mut invalid);
        let name = present("name", self.name, &mut invalid);
        let city = present("city", self.city, &mut invalid);
        let age = present("age", self.age.and_then(|age| u8::try_from(age).ok()), &mut invalid);
        let gender = present("gender", self.gender.as_deref().and_then(Gender::parse), &mut invalid);
        let height = present(
            "height",
            self.height.and_then(|height| u32::try_from(height).ok()),
            &mut invalid,
        );
        let weight = present("weight", self.weight, &mut invalid);

        let (Some(id), Some(name), Some(city), Some(age), Some(gender), Some(height), Some(weight)) =
            (id, name, city, age, gender, height, weight)
        else {
            return Err(ApiError::Validation(invalid));
        };

        // A finite weight over a tiny height can still overflow, and a
        // non-finite bmi cannot be written back as JSON.
        let bmi = body_mass_index(height, weight);
        if !bmi.is_finite() {
            return Err(ApiError::Validation(vec![FieldViolation::new(
                "weight",
                "too large for the given height",
            )]));
        }

        Ok((id, Patient::new(name, city, age, gender, height, weight, bmi)))
    }
}

fn present<T>(field: &'static str, value: Option<T>, invalid: &mut Vec<FieldViolation>) -> Option<T> {
    if value.is_none() {
        invalid.push(FieldViolation::new(field, "out of range"));
    }
    value
}

/// Partial update; absent (or null) fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub height: Option<i64>,
    pub weight: Option<f64>,
}

/// A patient together with its Id, as returned by sorted views
#[derive(Debug, Clone, Serialize)]
pub struct PatientRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(flatten)]
    pub patient: Patient,
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn describe(error: &ValidationError) -> String {
    match (&error.message, &*error.code) {
        (Some(message), _) => message.to_string(),
        (None, "required") => "field required".to_string(),
        (None, code) => format!("failed {code} check"),
    }
}

/// Flatten validator output into field/message pairs ordered by field
pub fn violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |error| FieldViolation::new(field, describe(error)))
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use test_case::test_case;

    pub(crate) fn draft(id: &str, height: i64, weight: f64) -> PatientDraft {
        PatientDraft {
            id: Some(id.to_string()),
            name: Some("Sachin".to_string()),
            city: Some("Satara".to_string()),
            age: Some(30),
            gender: Some("male".to_string()),
            height: Some(height),
            weight: Some(weight),
        }
    }

    /// 175 cm, 62 kg
    pub(crate) fn sample_patient() -> Patient {
        draft("p001", 175, 62.0).into_patient().unwrap().1
    }

    fn fields(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(violations) => {
                violations.into_iter().map(|v| v.field).collect()
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test_case(175, 62.0, 20.24; "average adult")]
    #[test_case(160, 45.0, 17.58; "light adult")]
    #[test_case(180, 100.0, 30.86; "heavy adult")]
    #[test_case(100, 18.5, 18.5; "exact boundary")]
    #[test_case(120, 33.3, 23.12; "decimal rounding below half")]
    #[test_case(120, 36.9, 25.62; "decimal rounding second case")]
    fn bmi_rounds_to_two_decimals(height: u32, weight: f64, expected: f64) {
        assert_eq!(body_mass_index(height, weight), expected);
    }

    #[test_case(17.58, Verdict::Underweight)]
    #[test_case(18.49, Verdict::Underweight)]
    #[test_case(18.5, Verdict::Normal)]
    #[test_case(18.55, Verdict::Normal)]
    #[test_case(18.6, Verdict::Normal)]
    #[test_case(29.99, Verdict::Normal)]
    #[test_case(30.0, Verdict::Overweight)]
    #[test_case(42.1, Verdict::Overweight)]
    fn verdict_boundaries(bmi: f64, expected: Verdict) {
        assert_eq!(Verdict::from_bmi(bmi), expected);
    }

    #[test_case(1, 1e305; "tiny height")]
    #[test_case(50, f64::MAX; "largest weight")]
    fn rejects_weight_that_overflows_bmi(height: i64, weight: f64) {
        let err = draft("p007", height, weight).into_patient().unwrap_err();
        assert_eq!(fields(err), vec!["weight"]);
    }

    #[test]
    fn huge_but_finite_bmi_is_kept() {
        let (_, patient) = draft("p008", 1, 1e303).into_patient().unwrap();
        assert!(patient.bmi().is_finite());
        assert_eq!(patient.verdict(), Verdict::Overweight);
    }

    #[test]
    fn oversized_height_names_the_field() {
        let err = draft("p009", i64::from(u32::MAX) + 1, 70.0).into_patient().unwrap_err();
        assert_eq!(fields(err), vec!["height"]);
    }

    #[test]
    fn valid_draft_derives_bmi_and_verdict() {
        let (id, patient) = draft("p001", 175, 62.0).into_patient().unwrap();

        assert_eq!(id, "p001");
        assert_eq!(patient.name(), "Sachin");
        assert_eq!(patient.gender(), Gender::Male);
        assert_eq!(patient.bmi(), 20.24);
        assert_eq!(patient.verdict(), Verdict::Normal);
    }

    #[test]
    fn underweight_example() {
        let (_, patient) = draft("p002", 160, 45.0).into_patient().unwrap();
        assert_eq!(patient.bmi(), 17.58);
        assert_eq!(patient.verdict(), Verdict::Underweight);
    }

    #[test]
    fn empty_draft_reports_every_missing_field() {
        let err = PatientDraft::default().into_patient().unwrap_err();
        let fields = fields(err);

        for field in ["age", "city", "gender", "height", "name", "weight"] {
            assert!(fields.iter().any(|f| f == field), "missing {field} in {fields:?}");
        }
        assert_eq!(fields.len(), 7);
    }

    #[test]
    fn reports_all_range_and_enum_violations() {
        let mut input = draft("p003", 0, -4.0);
        input.age = Some(100);
        input.gender = Some("unknown".to_string());
        input.name = Some(String::new());

        let fields = fields(input.into_patient().unwrap_err());
        assert_eq!(fields, vec!["age", "gender", "height", "name", "weight"]);
    }

    #[test_case(0; "zero")]
    #[test_case(100; "upper bound")]
    #[test_case(-3; "negative")]
    fn rejects_age_outside_open_interval(age: i64) {
        let mut input = draft("p004", 170, 70.0);
        input.age = Some(age);
        assert_eq!(fields(input.into_patient().unwrap_err()), vec!["age"]);
    }

    #[test_case("male", Gender::Male)]
    #[test_case("female", Gender::Female)]
    #[test_case("others", Gender::Others)]
    fn accepts_known_genders(raw: &str, expected: Gender) {
        let mut input = draft("p005", 170, 70.0);
        input.gender = Some(raw.to_string());
        assert_eq!(input.into_patient().unwrap().1.gender(), expected);
    }

    #[test]
    fn derived_keys_in_input_are_ignored() {
        let input: PatientDraft = serde_json::from_value(serde_json::json!({
            "Id": "p006",
            "name": "Asha",
            "city": "Pune",
            "age": 41,
            "gender": "female",
            "height": 160,
            "weight": 45,
            "bmi": 99.0,
            "verdict": "Overweight"
        }))
        .unwrap();

        let (_, patient) = input.into_patient().unwrap();
        assert_eq!(patient.bmi(), 17.58);
        assert_eq!(patient.verdict(), Verdict::Underweight);
    }

    #[test]
    fn draft_round_trips_base_fields() {
        let patient = sample_patient();
        let (id, rebuilt) = patient.to_draft("p001").into_patient().unwrap();

        assert_eq!(id, "p001");
        assert_eq!(rebuilt, patient);
    }

    #[test]
    fn serializes_without_id() {
        let value = serde_json::to_value(sample_patient()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Sachin",
                "city": "Satara",
                "age": 30,
                "gender": "male",
                "height": 175,
                "weight": 62.0,
                "bmi": 20.24,
                "verdict": "Normal"
            })
        );
    }
}
