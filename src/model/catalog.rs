//! Built-in recruiting data model
//!
//! Users publish jobs inside departments, candidates apply to jobs with
//! resumes, and users short-list candidates per job.

use serde_json::json;

use super::types::{
    Catalog, ConstraintKind, DefaultRule, EnumDef, ModelDef, RelationField, ScalarField,
    UniqueKey,
};

/// E.164-style phone numbers: optional `+`, no leading zero, 10 to 15 digits.
pub const PHONE_PATTERN: &str = r"^\+?[1-9]\d{9,14}$";

fn id() -> ScalarField {
    ScalarField::string("id")
        .id()
        .default_to(DefaultRule::Uuid)
        .check(ConstraintKind::Uuid, "Invalid id")
}

fn created_at() -> ScalarField {
    ScalarField::datetime("createdAt").default_to(DefaultRule::Now)
}

fn updated_at() -> ScalarField {
    ScalarField::datetime("updatedAt").updated_at()
}

fn required_text(name: &str, message: &str) -> ScalarField {
    ScalarField::string(name).check(ConstraintKind::MinLength { value: 1 }, message)
}

fn phone() -> ScalarField {
    ScalarField::string("phone").check(
        ConstraintKind::Pattern {
            value: PHONE_PATTERN.into(),
        },
        "Invalid phone number",
    )
}

fn email() -> ScalarField {
    ScalarField::string("email").check(ConstraintKind::Email, "Invalid email address")
}

fn flag(name: &str) -> ScalarField {
    ScalarField::boolean(name).default_to(DefaultRule::Literal(json!(false)))
}

impl Catalog {
    /// The recruiting model shipped with the crate.
    pub fn recruiting() -> Self {
        Catalog::new()
            .with_enum(EnumDef::new("Role", &["USER", "ADMIN"]))
            .with_enum(EnumDef::new(
                "JobType",
                &["FULL_TIME", "PART_TIME", "CONTRACT", "INTERNSHIP"],
            ))
            .with_enum(EnumDef::new(
                "ShiftType",
                &["DAY", "NIGHT", "ROTATIONAL", "FLEXIBLE"],
            ))
            .with_enum(EnumDef::new("Gender", &["MALE", "FEMALE", "OTHER"]))
            .with_model(user())
            .with_model(profile())
            .with_model(job())
            .with_model(department())
            .with_model(candidate())
            .with_model(candidates_on_jobs())
            .with_model(short_listed())
            .with_model(resume())
            .with_model(jobs_and_resumes())
    }
}

fn user() -> ModelDef {
    ModelDef::new("User")
        .field(id())
        .field(required_text("name", "Name is required"))
        .field(email().unique())
        .field(phone().unique())
        .field(ScalarField::string("password").check(
            ConstraintKind::MinLength { value: 8 },
            "Password must be at least 8 characters",
        ))
        .field(
            ScalarField::enumeration("role", "Role")
                .nullable()
                .default_to(DefaultRule::Literal(json!("USER"))),
        )
        .field(flag("emailVerified"))
        .field(flag("phoneVerified"))
        .field(created_at())
        .field(updated_at())
        .relation(RelationField::has_one("profile", "Profile", "user"))
        .relation(RelationField::has_many("jobs", "Job", "createdBy"))
        .relation(RelationField::has_many("departments", "Department", "createdBy"))
        .relation(RelationField::has_many("shortListed", "ShortListed", "user"))
        .relation(RelationField::has_many("ownedResumes", "Resume", "createdBy"))
}

fn profile() -> ModelDef {
    ModelDef::new("Profile")
        .field(id())
        .field(required_text("firstName", "First name is required"))
        .field(ScalarField::string("lastName").nullable())
        .field(ScalarField::string("addressLine1").nullable())
        .field(ScalarField::string("addressLine2").nullable())
        .field(ScalarField::string("city").nullable())
        .field(ScalarField::string("state").nullable())
        .field(ScalarField::string("country").nullable())
        .field(ScalarField::string("zipCode").nullable())
        .field(ScalarField::string("userId").unique())
        .field(created_at())
        .field(updated_at())
        .relation(RelationField::belongs_to(
            "user",
            "User",
            &["userId"],
            &["id"],
            "profile",
        ))
}

fn job() -> ModelDef {
    ModelDef::new("Job")
        .field(id())
        .field(required_text("title", "Title is required"))
        .field(ScalarField::string("description").nullable())
        .field(ScalarField::string("location").nullable())
        .field(ScalarField::enumeration("jobType", "JobType"))
        .field(ScalarField::enumeration("shiftType", "ShiftType"))
        .field(ScalarField::datetime("expiryDate"))
        .field(ScalarField::string("departmentId"))
        .field(ScalarField::string("createdById"))
        .field(created_at())
        .field(updated_at())
        .relation(RelationField::belongs_to(
            "department",
            "Department",
            &["departmentId"],
            &["id"],
            "jobs",
        ))
        .relation(RelationField::belongs_to(
            "createdBy",
            "User",
            &["createdById"],
            &["id"],
            "jobs",
        ))
        .relation(RelationField::has_many("resumes", "JobsAndResumes", "job"))
        .relation(RelationField::has_many("candidates", "CandidatesOnJobs", "job"))
        .relation(RelationField::has_many("shortListed", "ShortListed", "job"))
}

fn department() -> ModelDef {
    ModelDef::new("Department")
        .field(id())
        .field(required_text("title", "Title is required"))
        .field(flag("isDeleted"))
        .field(ScalarField::string("createdById"))
        .field(created_at())
        .field(updated_at())
        .relation(RelationField::belongs_to(
            "createdBy",
            "User",
            &["createdById"],
            &["id"],
            "departments",
        ))
        .relation(RelationField::has_many("jobs", "Job", "department"))
}

fn candidate() -> ModelDef {
    ModelDef::new("Candidate")
        .field(id())
        .field(required_text("name", "Name is required"))
        .field(email().nullable())
        .field(phone().nullable())
        .field(
            ScalarField::int("age")
                .nullable()
                .check(ConstraintKind::Positive, "Age must be a positive number"),
        )
        .field(ScalarField::enumeration("gender", "Gender"))
        .field(ScalarField::json("jobExperience").nullable())
        .field(ScalarField::json("skills").nullable())
        .field(ScalarField::json("pros").nullable())
        .field(ScalarField::json("cons").nullable())
        .field(ScalarField::string("resumeId"))
        .field(ScalarField::string("activeResumeId").nullable().unique())
        .field(created_at())
        .field(updated_at())
        .relation(RelationField::has_many("resumes", "Resume", "candidate"))
        .relation(RelationField::has_many("jobs", "CandidatesOnJobs", "candidate"))
        .relation(RelationField::has_many("shortListed", "ShortListed", "candidate"))
}

fn candidates_on_jobs() -> ModelDef {
    ModelDef::new("CandidatesOnJobs")
        .field(id())
        .field(ScalarField::string("candidateId"))
        .field(ScalarField::string("jobId"))
        .field(ScalarField::datetime("assignedAt").default_to(DefaultRule::Now))
        .relation(RelationField::belongs_to(
            "candidate",
            "Candidate",
            &["candidateId"],
            &["id"],
            "jobs",
        ))
        .relation(RelationField::belongs_to(
            "job",
            "Job",
            &["jobId"],
            &["id"],
            "candidates",
        ))
        .unique_key(UniqueKey::over(&["candidateId", "jobId"]))
}

fn short_listed() -> ModelDef {
    ModelDef::new("ShortListed")
        .field(id())
        .field(ScalarField::string("userId"))
        .field(ScalarField::string("candidateId"))
        .field(ScalarField::string("jobId"))
        .field(created_at())
        .relation(RelationField::belongs_to(
            "user",
            "User",
            &["userId"],
            &["id"],
            "shortListed",
        ))
        .relation(RelationField::belongs_to(
            "candidate",
            "Candidate",
            &["candidateId"],
            &["id"],
            "shortListed",
        ))
        .relation(RelationField::belongs_to(
            "job",
            "Job",
            &["jobId"],
            &["id"],
            "shortListed",
        ))
        .unique_key(UniqueKey::over(&["userId", "jobId", "candidateId"]))
}

fn resume() -> ModelDef {
    ModelDef::new("Resume")
        .field(id())
        .field(required_text("fileKey", "File key is required"))
        .field(ScalarField::string("url").check(ConstraintKind::Url, "Invalid url"))
        .field(ScalarField::string("candidateId").nullable())
        .field(ScalarField::string("createdById").nullable())
        .field(created_at())
        .field(updated_at())
        .relation(
            RelationField::belongs_to(
                "candidate",
                "Candidate",
                &["candidateId"],
                &["id"],
                "resumes",
            )
            .optional(),
        )
        .relation(
            RelationField::belongs_to(
                "createdBy",
                "User",
                &["createdById"],
                &["id"],
                "ownedResumes",
            )
            .optional(),
        )
        .relation(RelationField::has_many("jobs", "JobsAndResumes", "resume"))
}

fn jobs_and_resumes() -> ModelDef {
    ModelDef::new("JobsAndResumes")
        .field(ScalarField::string("jobId"))
        .field(ScalarField::string("resumeId"))
        .field(ScalarField::datetime("assignedAt").default_to(DefaultRule::Now))
        .relation(RelationField::belongs_to(
            "job",
            "Job",
            &["jobId"],
            &["id"],
            "resumes",
        ))
        .relation(RelationField::belongs_to(
            "resume",
            "Resume",
            &["resumeId"],
            &["id"],
            "jobs",
        ))
        .unique_key(UniqueKey::over(&["jobId", "resumeId"]))
}
