//! Schema Invariant Tests
//!
//! - Validation is deterministic
//! - Required fields must be present; strict inputs reject undeclared keys
//! - Type matching is exact (dates are the only coercion)
//! - Entity variants: Partial accepts everything Base accepts,
//!   OptionalDefaults is idempotent
//! - Recursive relation schemas terminate with the input

use hireguard::model::{Catalog, ModelDef, RelationField, ScalarField};
use hireguard::schema::{
    registry, EntityVariant, IssueCategory, IssueCode, Registry, SchemaError, ValidationError, Validator,
};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

const USER_ID: &str = "6f1c3a52-3f0e-4c1e-9a53-3c8d1f7b2a10";
const DEPT_ID: &str = "0b6f8e2a-5d4c-4f3b-8a2e-1c9d7e6f5a40";
const JOB_ID: &str = "9a7e5c3b-1d2f-4e6a-b8c0-2d4f6a8c0e12";
const CANDIDATE_ID: &str = "3e5a7c9b-2f4d-4a6c-8e1b-5d7f9a1c3e56";
const RESUME_ID: &str = "7c9e1a3b-5d7f-4b2c-9e4a-6f8b0d2c4e78";

fn validator() -> Validator<'static> {
    Validator::new(registry())
}

fn rejection(result: Result<Value, SchemaError>) -> ValidationError {
    match result {
        Err(SchemaError::Rejected(err)) => err,
        other => panic!("expected a rejection, got {:?}", other),
    }
}

fn user() -> Value {
    json!({
        "id": USER_ID,
        "name": "Ada Recruiter",
        "email": "ada@example.com",
        "phone": "+14155550123",
        "password": "correct horse",
        "role": "ADMIN",
        "emailVerified": true,
        "phoneVerified": false,
        "createdAt": "2026-01-05T10:00:00.000Z",
        "updatedAt": "2026-01-05T10:00:00.000Z"
    })
}

fn department() -> Value {
    json!({
        "id": DEPT_ID,
        "title": "Engineering",
        "isDeleted": false,
        "createdById": USER_ID,
        "createdAt": "2026-01-06T09:00:00.000Z",
        "updatedAt": "2026-01-06T09:00:00.000Z"
    })
}

fn job() -> Value {
    json!({
        "id": JOB_ID,
        "title": "Backend Engineer",
        "description": null,
        "jobType": "FULL_TIME",
        "shiftType": "DAY",
        "expiryDate": "2026-12-31T00:00:00.000Z",
        "departmentId": DEPT_ID,
        "createdById": USER_ID,
        "createdAt": "2026-01-07T09:00:00.000Z",
        "updatedAt": "2026-01-07T09:00:00.000Z"
    })
}

fn candidate() -> Value {
    json!({
        "id": CANDIDATE_ID,
        "name": "Jane Doe",
        "email": "jane@example.com",
        "age": 31,
        "gender": "FEMALE",
        "skills": ["rust", "sql"],
        "resumeId": RESUME_ID,
        "createdAt": "2026-02-01T09:00:00.000Z",
        "updatedAt": "2026-02-01T09:00:00.000Z"
    })
}

fn resume() -> Value {
    json!({
        "id": RESUME_ID,
        "fileKey": "resumes/jane.pdf",
        "url": "https://files.example.com/resumes/jane.pdf",
        "candidateId": CANDIDATE_ID,
        "createdAt": "2026-02-01T09:00:00.000Z",
        "updatedAt": "2026-02-01T09:00:00.000Z"
    })
}

/// Sets each listed to-many relation to `[]`.
fn empty_relations(mut base: Value, names: &[&str]) -> Value {
    for name in names {
        base[*name] = json!([]);
    }
    base
}

fn user_with_relations() -> Value {
    empty_relations(user(), &["jobs", "departments", "shortListed", "ownedResumes"])
}

fn department_with_relations() -> Value {
    with(
        empty_relations(department(), &["jobs"]),
        "createdBy",
        user_with_relations(),
    )
}

fn job_with_relations() -> Value {
    let doc = empty_relations(job(), &["resumes", "candidates", "shortListed"]);
    let doc = with(doc, "department", department_with_relations());
    with(doc, "createdBy", user_with_relations())
}

fn with(mut base: Value, key: &str, value: Value) -> Value {
    base[key] = value;
    base
}

fn without(mut base: Value, key: &str) -> Value {
    base.as_object_mut().unwrap().remove(key);
    base
}

// =============================================================================
// Validation Determinism Tests
// =============================================================================

/// Same document validates to the same output every time.
#[test]
fn test_validation_is_deterministic() {
    let validator = validator();
    let first = validator.validate("UserSchema", &user()).unwrap();
    for _ in 0..100 {
        assert_eq!(validator.validate("UserSchema", &user()).unwrap(), first);
    }
}

/// Invalid document fails with the same issues every time.
#[test]
fn test_invalid_document_fails_consistently() {
    let validator = validator();
    let doc = without(user(), "email");
    let first = rejection(validator.validate("UserSchema", &doc));
    for _ in 0..100 {
        assert_eq!(rejection(validator.validate("UserSchema", &doc)), first);
    }
}

/// Two registries over the same catalog declare the same names.
#[test]
fn test_registry_build_is_deterministic() {
    let a = Registry::build(Catalog::recruiting()).unwrap();
    let b = Registry::build(Catalog::recruiting()).unwrap();
    assert_eq!(a.names(), b.names());
    assert_eq!(a.len(), registry().len());
}

// =============================================================================
// Required Field Tests
// =============================================================================

/// Missing required field fails validation at its path.
#[test]
fn test_missing_required_field() {
    let err = rejection(validator().validate("UserSchema", &without(user(), "email")));
    let issues = err.issues_at("email");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, IssueCode::MissingField);
}

/// Nullable columns may be omitted or null in entity schemas.
#[test]
fn test_nullable_column_may_be_omitted() {
    let validator = validator();
    assert!(validator.accepts("UserSchema", &without(user(), "role")));
    assert!(validator.accepts("UserSchema", &with(user(), "role", Value::Null)));
    assert!(validator.accepts("CandidateSchema", &without(candidate(), "age")));
}

/// Every issue is collected, not only the first.
#[test]
fn test_all_issues_collected() {
    let doc = json!({
        "id": "not-a-uuid",
        "name": "",
        "email": "nope",
        "phone": "12345",
        "password": "short",
        "emailVerified": "yes",
        "phoneVerified": false,
        "createdAt": "2026-01-05",
        "updatedAt": "2026-01-05"
    });
    let err = rejection(validator().validate("UserSchema", &doc));
    for path in ["id", "name", "email", "phone", "password", "emailVerified"] {
        assert!(!err.issues_at(path).is_empty(), "no issue at {}", path);
    }
    assert_eq!(err.issues().len(), 6);
}

// =============================================================================
// Unknown Key Tests
// =============================================================================

/// Entity schemas strip undeclared keys.
#[test]
fn test_entity_strips_unknown_keys() {
    let out = validator()
        .validate("UserSchema", &with(user(), "nickname", json!("ada")))
        .unwrap();
    assert!(out.get("nickname").is_none());
}

/// Input schemas reject undeclared keys.
#[test]
fn test_input_rejects_unknown_keys() {
    let err = rejection(
        validator().validate("UserWhereInput", &json!({"name": "Ada", "nickname": "ada"})),
    );
    assert_eq!(err.issues_at("nickname")[0].code, IssueCode::UnrecognizedKey);
}

// =============================================================================
// Type Matching Tests
// =============================================================================

/// Strings are never coerced to numbers, integers must be whole.
#[test]
fn test_number_type_exact() {
    let validator = validator();
    let err = rejection(validator.validate("CandidateSchema", &with(candidate(), "age", json!("31"))));
    assert_eq!(err.issues_at("age")[0].code, IssueCode::TypeMismatch);

    let err = rejection(validator.validate("CandidateSchema", &with(candidate(), "age", json!(31.5))));
    assert_eq!(err.issues_at("age")[0].code, IssueCode::TypeMismatch);

    let err = rejection(validator.validate("CandidateSchema", &with(candidate(), "age", json!(0))));
    assert_eq!(err.issues_at("age")[0].code, IssueCode::ConstraintViolation);
    assert_eq!(err.issues_at("age")[0].message, "Age must be a positive number");
}

/// Enum columns accept declared members only.
#[test]
fn test_enum_membership() {
    let err = rejection(
        validator().validate("CandidateSchema", &with(candidate(), "gender", json!("UNKNOWN"))),
    );
    assert_eq!(err.issues_at("gender")[0].code, IssueCode::ConstraintViolation);
    assert!(validator().accepts("GenderSchema", &json!("OTHER")));

    // Non-strings are still type mismatches
    let err = rejection(validator().validate("CandidateSchema", &with(candidate(), "gender", json!(1))));
    assert_eq!(err.issues_at("gender")[0].code, IssueCode::TypeMismatch);
}

/// A string outside the enum is a constraint violation, not a type error.
#[test]
fn test_enum_membership_is_constraint() {
    let doc = json!({"name": "Jane Doe", "resumeId": "r1", "gender": "ROBOT"});
    let err = rejection(validator().validate("CandidateOptionalDefaultsSchema", &doc));
    let issues = err.issues_at("gender");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, IssueCode::ConstraintViolation);
    assert_eq!(issues[0].category(), IssueCategory::Constraint);
}

/// Dates are coerced and normalized to RFC 3339 with milliseconds.
#[test]
fn test_date_coercion() {
    let validator = validator();
    let out = validator
        .validate("UserSchema", &with(user(), "createdAt", json!("2026-01-02")))
        .unwrap();
    assert_eq!(out["createdAt"], "2026-01-02T00:00:00.000Z");

    let out = validator
        .validate("UserSchema", &with(user(), "createdAt", json!(0)))
        .unwrap();
    assert_eq!(out["createdAt"], "1970-01-01T00:00:00.000Z");

    let err = rejection(validator.validate("UserSchema", &with(user(), "createdAt", json!("soon"))));
    assert_eq!(err.issues_at("createdAt")[0].code, IssueCode::TypeMismatch);
}

/// Invalid phone numbers fail with the declared message.
#[test]
fn test_invalid_phone() {
    let err = rejection(validator().validate("UserSchema", &with(user(), "phone", json!("12345"))));
    let issues = err.issues_at("phone");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, IssueCode::ConstraintViolation);
    assert_eq!(issues[0].message, "Invalid phone number");
}

// =============================================================================
// Entity Variant Tests
// =============================================================================

/// Partial accepts every document Base accepts with any subset of keys removed.
#[test]
fn test_partial_contains_base() {
    let validator = validator();
    let fixtures = [
        ("User", user()),
        ("Department", department()),
        ("Job", job()),
        ("Candidate", candidate()),
        ("Resume", resume()),
    ];
    for (model, doc) in fixtures {
        let base = EntityVariant::Base.schema_name(model);
        let partial = EntityVariant::Partial.schema_name(model);
        assert!(validator.accepts(&base, &doc), "{} rejected", base);
        assert!(validator.accepts(&partial, &doc), "{} rejected", partial);
        assert!(validator.accepts(&partial, &json!({})), "{} rejected {{}}", partial);

        // Any single key, and every growing prefix of keys, may be dropped
        let keys: Vec<String> = doc.as_object().unwrap().keys().cloned().collect();
        let mut trimmed = doc.clone();
        for key in &keys {
            let single = without(doc.clone(), key);
            assert!(validator.accepts(&partial, &single), "{} rejected without {}", partial, key);
            trimmed = without(trimmed, key);
            assert!(validator.accepts(&partial, &trimmed), "{} rejected {}", partial, trimmed);
        }
    }
    for model in &registry().catalog().models {
        assert!(validator.accepts(&EntityVariant::Partial.schema_name(&model.name), &json!({})));
    }
}

/// Every model has all eight entity variants.
#[test]
fn test_every_entity_variant_registered() {
    for model in &registry().catalog().models {
        for variant in EntityVariant::ALL {
            assert!(registry().contains(&variant.schema_name(&model.name)));
        }
    }
}

/// Defaults fill omitted columns; validating the output again changes nothing.
#[test]
fn test_optional_defaults_idempotent() {
    let validator = validator();
    let doc = json!({
        "name": "Ada Recruiter",
        "email": "ada@example.com",
        "phone": "+14155550123",
        "password": "correct horse"
    });
    let first = validator.validate("UserOptionalDefaultsSchema", &doc).unwrap();
    assert_eq!(first["role"], "USER");
    assert_eq!(first["emailVerified"], false);
    assert!(first["id"].as_str().is_some());

    let second = validator.validate("UserOptionalDefaultsSchema", &first).unwrap();
    assert_eq!(first, second);

    // Supplied values are kept
    let out = validator
        .validate("UserOptionalDefaultsSchema", &with(doc, "id", json!(USER_ID)))
        .unwrap();
    assert_eq!(out["id"], USER_ID);
}

/// Creating a candidate with the minimum fields.
#[test]
fn test_candidate_create_with_defaults() {
    let doc = json!({"name": "Jane Doe", "resumeId": "r1", "gender": "FEMALE"});
    let out = validator()
        .validate("CandidateOptionalDefaultsSchema", &doc)
        .unwrap();

    let id = out["id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
    assert!(out["createdAt"].as_str().is_some());
    assert!(out["updatedAt"].as_str().is_some());
    for absent in ["age", "email", "skills", "pros", "cons", "jobExperience"] {
        assert!(out.get(absent).is_none(), "{} present", absent);
    }
    assert_eq!(out["name"], "Jane Doe");
}

/// Base schemas never synthesize defaults.
#[test]
fn test_base_requires_default_columns() {
    let err = rejection(validator().validate("UserSchema", &without(user(), "createdAt")));
    assert_eq!(err.issues_at("createdAt")[0].code, IssueCode::MissingField);
}

// =============================================================================
// Relation Recursion Tests
// =============================================================================

/// Job -> department -> createdBy -> jobs -> Job terminates with the input.
#[test]
fn test_relation_cycle_terminates() {
    let creator = with(user_with_relations(), "jobs", json!([job_with_relations()]));
    let dept = with(department_with_relations(), "createdBy", creator);
    let doc = with(job_with_relations(), "department", dept);

    let out = validator().validate("JobWithRelationsSchema", &doc).unwrap();
    assert_eq!(
        out["department"]["createdBy"]["jobs"][0]["department"]["title"],
        "Engineering"
    );
}

/// WithRelations needs every relation key; the partial variants do not.
#[test]
fn test_with_relations_requires_relation_keys() {
    let validator = validator();
    let err = rejection(validator.validate("UserWithRelationsSchema", &user()));
    for name in ["jobs", "departments", "shortListed", "ownedResumes"] {
        assert_eq!(err.issues_at(name)[0].code, IssueCode::MissingField, "{}", name);
    }
    // Optional to-one may be absent or null
    assert!(err.issues_at("profile").is_empty());
    assert!(validator.accepts("UserWithRelationsSchema", &user_with_relations()));
    assert!(validator.accepts(
        "UserWithRelationsSchema",
        &with(user_with_relations(), "profile", Value::Null)
    ));

    assert!(!validator.accepts("UserOptionalDefaultsWithRelationsSchema", &user()));
    assert!(validator.accepts("UserWithPartialRelationsSchema", &user()));
    assert!(validator.accepts("UserOptionalDefaultsWithPartialRelationsSchema", &user()));

    // Required to-one cannot be null
    assert!(!validator.accepts(
        "JobWithRelationsSchema",
        &with(job_with_relations(), "department", Value::Null)
    ));
    assert!(!validator.accepts("JobWithRelationsSchema", &job()));
}

/// Issues deep inside a relation carry the full path.
#[test]
fn test_nested_relation_issue_path() {
    let creator = with(
        user_with_relations(),
        "jobs",
        json!([with(job_with_relations(), "jobType", json!("FREELANCE"))]),
    );
    let dept = with(department_with_relations(), "createdBy", creator);
    let err = rejection(
        validator().validate("JobWithRelationsSchema", &with(job_with_relations(), "department", dept)),
    );
    assert_eq!(err.issues().len(), 1);
    assert_eq!(
        err.issues_at("department.createdBy.jobs[0].jobType")[0].code,
        IssueCode::ConstraintViolation
    );
}

/// Partial relations accept partial related documents.
#[test]
fn test_partial_relations() {
    let doc = with(job_with_relations(), "department", json!({"title": "Engineering"}));
    assert!(validator().accepts("JobWithPartialRelationsSchema", &doc));
    assert!(!validator().accepts("JobWithRelationsSchema", &doc));
}

// =============================================================================
// Registry Construction Tests
// =============================================================================

/// Unknown schema names are reported, not treated as rejections.
#[test]
fn test_unknown_schema() {
    let err = validator().validate("NoSuchSchema", &json!({})).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownSchema(_)));
    assert!(!err.is_rejection());
}

/// Relations to undeclared models fail construction.
#[test]
fn test_dangling_relation_rejected() {
    let catalog = Catalog::new().with_model(
        ModelDef::new("Post")
            .field(ScalarField::string("id").id())
            .field(ScalarField::string("authorId"))
            .relation(RelationField::belongs_to(
                "author",
                "Author",
                &["authorId"],
                &["id"],
                "posts",
            )),
    );
    assert!(Registry::build(catalog).is_err());
}

/// Models without any unique key fail construction.
#[test]
fn test_model_without_unique_key_rejected() {
    let catalog = Catalog::new().with_model(ModelDef::new("Note").field(ScalarField::string("body")));
    assert!(Registry::build(catalog).is_err());
}
