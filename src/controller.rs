//! Conversion controller: owns the UI state and runs one conversion at a time.
//!
//! Every user event is a synchronous transition on [`ConversionController`].
//! The only suspending step is the call to the translation endpoint inside
//! [`ConversionController::convert`], which is bracketed by [`begin`] and
//! [`finish`] so the state machine can be driven without a network.
//!
//! ```text
//! idle --begin ok--> converting --finish Ok--> idle (converted_code set)
//! idle --begin err--> idle (error set, nothing sent)
//! converting --finish Err--> idle (error set)
//! ```
//!
//! [`begin`]: ConversionController::begin
//! [`finish`]: ConversionController::finish

use crate::clipboard::{Clipboard, CopyIndicator};
use crate::error::{ConversionError, TransportError, ValidationError};
use crate::fence::strip_code_fences;
use crate::translation::{build_conversion_prompt, TranslationService};
use futures::future::{AbortRegistration, Abortable};
use serde::Serialize;
use tracing::{info, warn};

pub const DEFAULT_SOURCE_LANGUAGE: &str = "Python";
pub const DEFAULT_TARGET_LANGUAGE: &str = "JavaScript";

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    source_language: String,
    target_language: String,
    source_code: String,
}

impl ConversionRequest {
    /// Check the preconditions in order: code, then languages, then distinctness.
    pub fn new(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        source_code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let source_language = source_language.into();
        let target_language = target_language.into();
        let source_code = source_code.into();

        if source_code.trim().is_empty() {
            return Err(ValidationError::EmptyCode);
        }
        if source_language.is_empty() || target_language.is_empty() {
            return Err(ValidationError::MissingLanguage);
        }
        if source_language == target_language {
            return Err(ValidationError::SameLanguage);
        }

        Ok(Self {
            source_language,
            target_language,
            source_code,
        })
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn prompt(&self) -> String {
        build_conversion_prompt(&self.source_language, &self.target_language, &self.source_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub converted_code: String,
}

/// Send a prepared request and clean up the answer.
pub async fn convert(
    service: &TranslationService,
    request: &ConversionRequest,
) -> Result<ConversionResult, ConversionError> {
    info!(
        "Converting {} -> {} ({} bytes)",
        request.source_language(),
        request.target_language(),
        request.source_code().len()
    );

    let raw = service.complete(&request.prompt()).await?;

    Ok(ConversionResult {
        converted_code: strip_code_fences(&raw),
    })
}

/// Point-in-time view of the UI state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiState {
    pub source_language: String,
    pub target_language: String,
    pub source_code: String,
    pub converted_code: String,
    pub is_converting: bool,
    pub error: Option<String>,
    pub copied: bool,
}

#[derive(Debug, Clone)]
pub struct ConversionController {
    source_language: String,
    target_language: String,
    source_code: String,
    converted_code: String,
    is_converting: bool,
    error: Option<String>,
    copy: CopyIndicator,
}

impl Default for ConversionController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionController {
    pub fn new() -> Self {
        Self {
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            source_code: String::new(),
            converted_code: String::new(),
            is_converting: false,
            error: None,
            copy: CopyIndicator::default(),
        }
    }

    // ==================== Input Events ====================

    pub fn set_source_language(&mut self, language: impl Into<String>) {
        self.source_language = language.into();
    }

    pub fn set_target_language(&mut self, language: impl Into<String>) {
        self.target_language = language.into();
    }

    pub fn set_source_code(&mut self, code: impl Into<String>) {
        self.source_code = code.into();
    }

    // ==================== Conversion ====================

    /// Whether the convert action is available.
    pub fn can_convert(&self) -> bool {
        !self.is_converting
    }

    /// Validate the current input and enter the converting state.
    ///
    /// On a validation failure the error is recorded and nothing else changes.
    /// While a request is outstanding this returns [`ConversionError::Busy`]
    /// and leaves the state untouched.
    pub fn begin(&mut self) -> Result<ConversionRequest, ConversionError> {
        if self.is_converting {
            return Err(ConversionError::Busy);
        }

        let request = ConversionRequest::new(
            self.source_language.as_str(),
            self.target_language.as_str(),
            self.source_code.as_str(),
        );

        match request {
            Ok(request) => {
                self.is_converting = true;
                self.error = None;
                self.converted_code.clear();
                Ok(request)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Apply the outcome of the outstanding request and return to idle.
    pub fn finish(
        &mut self,
        outcome: Result<ConversionResult, ConversionError>,
    ) -> Result<ConversionResult, ConversionError> {
        self.is_converting = false;

        match &outcome {
            Ok(result) => {
                self.converted_code = result.converted_code.clone();
            }
            Err(e) => {
                warn!("Conversion failed: {}", e);
                self.error = Some(e.user_message());
            }
        }

        outcome
    }

    /// Validate, call the endpoint, and record the outcome.
    pub async fn convert(
        &mut self,
        service: &TranslationService,
    ) -> Result<ConversionResult, ConversionError> {
        let request = self.begin()?;
        let outcome = convert(service, &request).await;
        self.finish(outcome)
    }

    /// Like [`convert`](Self::convert), but the request is dropped as soon as
    /// the matching `AbortHandle` fires. An aborted request is a transport failure.
    pub async fn convert_abortable(
        &mut self,
        service: &TranslationService,
        registration: AbortRegistration,
    ) -> Result<ConversionResult, ConversionError> {
        let request = self.begin()?;
        let outcome = match Abortable::new(convert(service, &request), registration).await {
            Ok(outcome) => outcome,
            Err(_aborted) => Err(TransportError::Aborted.into()),
        };
        self.finish(outcome)
    }

    // ==================== Clipboard ====================

    /// Copy the converted code. Returns whether anything was copied.
    ///
    /// Clipboard failures are logged and leave the indicator off.
    pub fn copy(&mut self, clipboard: &mut impl Clipboard) -> bool {
        if self.converted_code.is_empty() {
            return false;
        }

        match clipboard.set_text(&self.converted_code) {
            Ok(()) => {
                self.copy.mark();
                true
            }
            Err(e) => {
                warn!("Copy to clipboard failed: {}", e);
                false
            }
        }
    }

    // ==================== Accessors ====================

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn converted_code(&self) -> &str {
        &self.converted_code
    }

    pub fn is_converting(&self) -> bool {
        self.is_converting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn copied(&self) -> bool {
        self.copy.is_copied()
    }

    pub fn snapshot(&self) -> UiState {
        UiState {
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            source_code: self.source_code.clone(),
            converted_code: self.converted_code.clone(),
            is_converting: self.is_converting,
            error: self.error.clone(),
            copied: self.copied(),
        }
    }
}
