//! Provider credential form controller.
//!
//! Holds the catalog, the active provider and the values shown in the form,
//! and moves through `Idle -> Loading -> Idle` / `Idle -> Submitting -> Idle`.
//! It performs no I/O: callers start a phase, run the request, then hand the
//! result back.

use indexmap::IndexMap;

use crate::catalog::{
    merge_catalog, ProviderCatalog, ProviderSchema, RemoteConfig, DEFAULT_PROVIDER,
};
use crate::localize::Localize;
use crate::error::{AppError, FieldError};
use crate::services::token_store::SaveResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Submitting,
}

/// Which button started a submit. Both run the same save flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    TestConnection,
    Apply,
}

#[derive(Debug, Clone)]
pub struct FormController {
    catalog: ProviderCatalog,
    active: String,
    values: IndexMap<String, String>,
    phase: Phase,
}

impl FormController {
    pub fn new(catalog: ProviderCatalog) -> Result<Self, AppError> {
        let active = catalog
            .first_name()
            .ok_or_else(|| AppError::Config("provider catalog is empty".to_string()))?
            .to_string();
        Ok(Self::with_active(catalog, active))
    }

    /// Controller over [`ProviderCatalog::builtin`], starting on
    /// [`DEFAULT_PROVIDER`].
    pub fn with_builtin_catalog() -> Self {
        Self::with_active(ProviderCatalog::builtin(), DEFAULT_PROVIDER.to_string())
    }

    fn with_active(catalog: ProviderCatalog, active: String) -> Self {
        let mut controller = Self {
            catalog,
            active,
            values: IndexMap::new(),
            phase: Phase::Idle,
        };
        controller.reset_values();
        controller
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a request is in flight; form controls are disabled.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    pub fn active_provider(&self) -> &str {
        &self.active
    }

    pub fn active_schema(&self) -> Option<&ProviderSchema> {
        self.catalog.get(&self.active)
    }

    /// Names of the fields rendered for the active provider.
    pub fn fields(&self) -> Vec<&str> {
        self.active_schema()
            .map(|schema| schema.field_names().collect())
            .unwrap_or_default()
    }

    pub fn required_fields(&self) -> &[String] {
        self.active_schema()
            .map(|schema| schema.required.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields().iter().any(|r| r == field)
    }

    /// Current form values for the active provider.
    pub fn values(&self) -> &IndexMap<String, String> {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Edit one rendered field. Unknown fields are rejected.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> Result<(), AppError> {
        match self.values.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(AppError::InvalidInput(format!(
                "field '{field}' is not shown for provider '{}'",
                self.active
            ))),
        }
    }

    fn reset_values(&mut self) {
        self.values = self
            .catalog
            .get(&self.active)
            .map(|schema| schema.fields.clone())
            .unwrap_or_default();
    }

    pub fn select_provider(&mut self, name: &str) -> Result<(), AppError> {
        if self.is_busy() {
            return Err(AppError::Busy);
        }
        if !self.catalog.contains(name) {
            return Err(AppError::InvalidInput(format!("unknown provider '{name}'")));
        }
        self.active = name.to_string();
        self.reset_values();
        log::debug!("selected AI provider {name}");
        Ok(())
    }

    pub fn begin_load(&mut self) -> Result<(), AppError> {
        if self.is_busy() {
            return Err(AppError::Busy);
        }
        self.phase = Phase::Loading;
        Ok(())
    }

    /// Apply a fetch result. On error the catalog is left as it was and the
    /// error is handed back for the caller to report.
    pub fn finish_load(&mut self, result: Result<RemoteConfig, AppError>) -> Result<(), AppError> {
        if self.phase != Phase::Loading {
            log::warn!("ignoring AI token fetch result outside of a load");
            return Ok(());
        }
        self.phase = Phase::Idle;

        let remote = result?;
        self.catalog = merge_catalog(&self.catalog, &remote);

        match remote.in_use.as_deref() {
            Some(name) if self.catalog.contains(name) => self.active = name.to_string(),
            Some(name) => {
                log::warn!("server marks unknown provider '{name}' as in use; keeping '{}'", self.active)
            }
            None => log::warn!("server response has no in_use provider; keeping '{}'", self.active),
        }
        self.reset_values();
        Ok(())
    }

    /// Fields of `values` that are mandatory and empty, one message each.
    pub fn validate(
        &self,
        values: &IndexMap<String, String>,
        texts: &dyn Localize,
    ) -> Result<(), AppError> {
        let please_enter = texts.lookup("please_enter");
        let errors: Vec<FieldError> = self
            .fields()
            .into_iter()
            .filter(|field| self.is_required(field))
            .filter(|field| {
                values
                    .get(*field)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|field| FieldError {
                field: field.to_string(),
                message: format!("{please_enter}{field}"),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }

    /// Validate and build the save body. The active provider's local entry
    /// takes the submitted values right away and is not rolled back if the
    /// save fails.
    pub fn begin_submit(
        &mut self,
        values: IndexMap<String, String>,
        texts: &dyn Localize,
    ) -> Result<RemoteConfig, AppError> {
        if self.is_busy() {
            return Err(AppError::Busy);
        }
        self.validate(&values, texts)?;

        let body = RemoteConfig::for_submit(&self.catalog, &self.active, &values);
        if let Some(schema) = self.catalog.get_mut(&self.active) {
            schema.fields = values.clone();
        }
        self.values = values;
        self.phase = Phase::Submitting;
        Ok(body)
    }

    /// Apply a save result. `Ok` means the server accepted the settings and
    /// the caller should reload.
    pub fn finish_submit(&mut self, result: Result<SaveResponse, AppError>) -> Result<(), AppError> {
        if self.phase != Phase::Submitting {
            log::warn!("ignoring AI token save result outside of a submit");
            return Ok(());
        }
        self.phase = Phase::Idle;

        let response = result?;
        if response.is_success() {
            Ok(())
        } else {
            Err(AppError::SubmitFailed(response.describe()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localize::Texts;
    use serde_json::json;

    fn remote(value: serde_json::Value) -> RemoteConfig {
        RemoteConfig::from_value(value).expect("remote config")
    }

    fn values(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn starts_idle_on_first_builtin_provider() {
        let controller = FormController::with_builtin_catalog();
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.active_provider(), "DeepInsight");
        assert_eq!(controller.fields(), vec!["ApiKey"]);
        assert!(controller.is_required("ApiKey"));
    }

    #[test]
    fn builtin_controller_matches_new_over_builtin_catalog() {
        let built = FormController::new(ProviderCatalog::builtin()).expect("non-empty catalog");
        let builtin = FormController::with_builtin_catalog();
        assert_eq!(builtin.active_provider(), built.active_provider());
        assert_eq!(builtin.values(), built.values());
        assert_eq!(builtin.catalog(), built.catalog());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = FormController::new(ProviderCatalog::new()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn select_provider_swaps_fields_for_every_provider() {
        let mut controller = FormController::with_builtin_catalog();
        let names: Vec<String> = controller.catalog().names().map(str::to_string).collect();
        for name in names {
            controller.select_provider(&name).expect("select");
            let schema = controller.catalog().get(&name).expect("schema").clone();
            let expected: Vec<&str> = schema.field_names().collect();
            assert_eq!(controller.fields(), expected);
            assert!(!controller.fields().contains(&"required"));
            assert_eq!(controller.required_fields(), schema.required.as_slice());
        }
    }

    #[test]
    fn select_unknown_provider_changes_nothing() {
        let mut controller = FormController::with_builtin_catalog();
        let err = controller.select_provider("Nope").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(controller.active_provider(), "DeepInsight");
    }

    #[test]
    fn successful_load_selects_in_use_and_marks_required() {
        let mut controller = FormController::with_builtin_catalog();
        controller.begin_load().expect("begin");
        assert!(controller.is_busy());

        controller
            .finish_load(Ok(remote(json!({
                "in_use": "X",
                "X": { "a": "1", "required": ["a"] }
            }))))
            .expect("load");

        assert!(!controller.is_busy());
        assert_eq!(controller.active_provider(), "X");
        assert!(controller.is_required("a"));
        assert_eq!(controller.value("a"), Some("1"));
    }

    #[test]
    fn failed_load_leaves_catalog_untouched() {
        let mut controller = FormController::with_builtin_catalog();
        let before = controller.catalog().clone();
        controller.begin_load().expect("begin");

        let err = controller
            .finish_load(Err(AppError::FetchFailed("boom".to_string())))
            .unwrap_err();

        assert!(matches!(err, AppError::FetchFailed(_)));
        assert_eq!(controller.catalog(), &before);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn load_with_unknown_in_use_keeps_active_provider() {
        let mut controller = FormController::with_builtin_catalog();
        controller.select_provider("Claude").expect("select");
        controller.begin_load().expect("begin");
        controller
            .finish_load(Ok(remote(json!({
                "in_use": "Ghost",
                "Claude": { "ApiKey": "k" }
            }))))
            .expect("load");
        assert_eq!(controller.active_provider(), "Claude");
        assert_eq!(controller.value("ApiKey"), Some("k"));
    }

    #[test]
    fn reentrant_load_and_submit_are_rejected_while_busy() {
        let mut controller = FormController::with_builtin_catalog();
        controller.begin_load().expect("begin");
        assert!(matches!(controller.begin_load(), Err(AppError::Busy)));
        assert!(matches!(
            controller.begin_submit(values(&[("ApiKey", "k")]), &Texts::default()),
            Err(AppError::Busy)
        ));
        assert!(matches!(controller.select_provider("Claude"), Err(AppError::Busy)));
    }

    #[test]
    fn submit_with_empty_required_field_is_rejected_per_field() {
        let mut controller = FormController::with_builtin_catalog();
        controller.select_provider("Claude").expect("select");

        let err = controller
            .begin_submit(
                values(&[("ApiKey", "k"), ("ApiSecret", "  "), ("Region", "")]),
                &Texts::default(),
            )
            .unwrap_err();

        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["ApiSecret"]);
        assert_eq!(err.field_errors()[0].message, "Please enter ApiSecret");
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn submit_body_carries_exact_values_and_updates_locally() {
        let mut controller = FormController::with_builtin_catalog();
        controller.begin_load().expect("begin");
        controller
            .finish_load(Ok(remote(json!({
                "in_use": "X",
                "X": { "a": "1", "b": "2", "required": ["a"] }
            }))))
            .expect("load");

        let body = controller
            .begin_submit(values(&[("a", "v")]), &Texts::default())
            .expect("submit")
            .to_value();

        assert_eq!(body["in_use"], json!("X"));
        assert_eq!(body["X"], json!({ "a": "v" }));
        assert_eq!(
            body["OpenAI"],
            controller.catalog().get("OpenAI").expect("openai").to_value()
        );
        assert_eq!(controller.phase(), Phase::Submitting);
        assert_eq!(controller.fields(), vec!["a"]);
        assert!(controller.is_required("a"));
    }

    #[test]
    fn finish_submit_maps_non_200_code_to_failure() {
        let mut controller = FormController::with_builtin_catalog();
        controller
            .begin_submit(values(&[("ApiKey", "k")]), &Texts::default())
            .expect("submit");

        let err = controller
            .finish_submit(Ok(SaveResponse {
                code: Some(500),
                message: None,
            }))
            .unwrap_err();
        assert!(matches!(err, AppError::SubmitFailed(_)));
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.value("ApiKey"), Some("k"));
    }
}
