//! Role Catalogue: the predefined internship roles a resume can be screened against.

use serde::Serialize;

use crate::errors::AppError;

/// Selector value that switches to a caller-supplied job description.
pub const CUSTOM_ROLE_KEY: &str = "custom";

#[derive(Debug, Clone, Serialize)]
pub struct RoleDescription {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// A job description ready for analysis, with the label it is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub label: String,
    pub text: String,
}

const CLOUD_DEVOPS: &str = "\
Cloud / DevOps Intern (AWS Focused)

About the Role:
-> Help HR-Tek optimize cloud usage and deploy the product on AWS with scalability, monitoring, and automation in mind.

Responsibilities:
-> Deploy staging and production environments on AWS.
-> Set up auto-scaling groups, load balancers, and monitoring (CloudWatch).
-> Work on CI/CD pipelines using AWS CodePipeline / Jenkins.
-> Optimize AWS credits for cost efficiency.

Preferred Skills: AWS, EC2, S3, RDS, VPC, IAM, CloudFormation/Terraform, Linux basics.";

const GENAI: &str = "\
GenAI Intern (Generative AI for HR Advisory)

About the Role:
-> Support HR-Tek in building integration-ready modules with enterprise HR systems like SAP, Workday, and Salesforce.
-> Build AI-driven features like HR chatbots, auto-generated digital roadmaps, and vendor-fit recommendations for clients.

Responsibilities:
-> Research integration frameworks of major HRIS (SAP, Workday, Darwinbox).
-> Build mock APIs for data exchange between HR-Tek and external tools.
-> Document integration workflows for enterprise readiness.
-> Work on data mapping & testing.
-> Train and fine-tune LLMs for HR queries.
-> Build a chatbot for HR digital advisory.
-> Prototype AI-based roadmap & recommendation engines.
-> Experiment with OpenAI / Hugging Face models.

Preferred Skills: REST APIs, JSON, Postman, Salesforce basics, SAP/Workday APIs (preferred), Python, LangChain, OpenAI APIs, NLP basics, prompt engineering.";

const UI_UX: &str = "\
UI/UX Design

About the Role:
-> Design clean, modern, and user-friendly dashboards for HR leaders, ensuring the product feels intuitive and enterprise-grade.

Responsibilities:
-> Create wireframes, mockups, and Figma prototypes.
-> Conduct usability testing with mock users.
-> Improve dashboard designs for clarity and adoption.
-> Work with developers to implement designs.

Preferred Skills: Figma, Adobe XD, UX research, design systems.";

const FULL_STACK: &str = "\
Full-Stack Development Intern (React + Node/Python)

About the Role:
-> Work on building and enhancing HR-Tek's web-based application, contributing to core features, bug fixes, and scaling modules.

Responsibilities:
-> Develop front-end features using React.js.
-> Build backend services using Node.js / Python.
-> Debug, test, and fix issues across the product.
-> Assist in integrating APIs with external HR systems.

Preferred Skills: React, Node.js/Python, Firebase, REST APIs, Git.";

pub const ROLES: &[RoleDescription] = &[
    RoleDescription {
        key: "cloud-devops-intern",
        label: "Cloud / DevOps Intern (AWS Focused)",
        description: CLOUD_DEVOPS,
    },
    RoleDescription {
        key: "genai-intern",
        label: "GenAI Intern",
        description: GENAI,
    },
    RoleDescription {
        key: "ui-ux-design",
        label: "UI/UX Design",
        description: UI_UX,
    },
    RoleDescription {
        key: "full-stack-intern",
        label: "Full-Stack Development Intern",
        description: FULL_STACK,
    },
];

pub fn find_role(key: &str) -> Option<&'static RoleDescription> {
    ROLES.iter().find(|r| r.key == key)
}

/// Turns the form's role selector (and custom text) into a job description.
///
/// No selector, or `custom` with blank text, is missing input. An unknown key
/// is a validation error.
pub fn resolve_job_description(
    role_key: Option<&str>,
    custom_text: Option<&str>,
) -> Result<JobDescription, AppError> {
    let role_key = role_key.map(str::trim).filter(|k| !k.is_empty()).ok_or_else(|| {
        AppError::InputMissing("select a role or choose a custom job description".to_string())
    })?;

    if role_key == CUSTOM_ROLE_KEY {
        let text = custom_text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::InputMissing("paste a job description for the custom role".to_string())
            })?;
        return Ok(JobDescription {
            label: "Custom Job Description".to_string(),
            text: text.to_string(),
        });
    }

    let role = find_role(role_key)
        .ok_or_else(|| AppError::Validation(format!("unknown role '{role_key}'")))?;
    Ok(JobDescription {
        label: role.label.to_string(),
        text: role.description.to_string(),
    })
}
