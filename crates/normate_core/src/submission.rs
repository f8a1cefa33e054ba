//! Client-side checks run before a job is submitted.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub const MIN_RESEARCH_QUESTION_CHARS: usize = 10;
pub const MIN_PRODUCT_DESCRIPTION_CHARS: usize = 5;
pub const QUANT_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];
pub const QUAL_EXTENSIONS: &[&str] = &["txt", "docx", "doc"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub research_question: String,
    pub product_description: String,
    #[serde(default)]
    pub time_period: Option<String>,
    #[serde(default)]
    pub arpu: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("research question must be longer than 10 characters")]
    ResearchQuestionTooShort,
    #[error("product description must be longer than 5 characters")]
    ProductDescriptionTooShort,
    #[error("ARPU must be a positive number")]
    InvalidArpu,
    #[error("at least one {0} file is required")]
    MissingFiles(FileRole),
    #[error("{path} is not a supported {role} file (expected one of: {expected})")]
    UnsupportedFile {
        path: String,
        role: FileRole,
        expected: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Quantitative,
    Qualitative,
}

impl FileRole {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileRole::Quantitative => QUANT_EXTENSIONS,
            FileRole::Qualitative => QUAL_EXTENSIONS,
        }
    }
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileRole::Quantitative => write!(f, "quantitative"),
            FileRole::Qualitative => write!(f, "qualitative"),
        }
    }
}

impl AnalysisContext {
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.research_question.trim().chars().count() <= MIN_RESEARCH_QUESTION_CHARS {
            return Err(ContextError::ResearchQuestionTooShort);
        }
        if self.product_description.trim().chars().count() <= MIN_PRODUCT_DESCRIPTION_CHARS {
            return Err(ContextError::ProductDescriptionTooShort);
        }
        if let Some(arpu) = self.arpu {
            if !arpu.is_finite() || arpu <= 0.0 {
                return Err(ContextError::InvalidArpu);
            }
        }
        Ok(())
    }
}

/// Check that `paths` is non-empty and every entry has an extension allowed for `role`.
pub fn validate_files<P: AsRef<Path>>(paths: &[P], role: FileRole) -> Result<(), ContextError> {
    if paths.is_empty() {
        return Err(ContextError::MissingFiles(role));
    }
    for path in paths {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !role.extensions().contains(&ext.as_str()) {
            return Err(ContextError::UnsupportedFile {
                path: path.display().to_string(),
                role,
                expected: role.extensions().join(", "),
            });
        }
    }
    Ok(())
}
