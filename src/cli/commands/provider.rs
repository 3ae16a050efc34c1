use indexmap::IndexMap;

use crate::catalog::ProviderCatalog;
use crate::cli::i18n::{texts, Texts};
use crate::cli::ui::{create_table, highlight, info, is_secret_field, mask_secret, success, ConsoleNotifier};
use crate::cli::Connection;
use crate::error::AppError;
use crate::services::{HttpTokenStore, SettingsSession, SideChannel};

pub(crate) type CliSession = SettingsSession<HttpTokenStore, Box<dyn SideChannel + Send>, ConsoleNotifier>;

pub(crate) fn open_session(conn: &Connection) -> Result<CliSession, AppError> {
    Ok(SettingsSession::new(
        conn.token_store()?,
        conn.side_channel(),
        ConsoleNotifier,
        Box::new(Texts::current()),
    ))
}

pub fn show(conn: &Connection, provider: Option<&str>) -> Result<(), AppError> {
    let mut session = open_session(conn)?;
    session.load()?;
    let controller = session.controller();

    if let Some(name) = provider {
        if !controller.catalog().contains(name) {
            return Err(AppError::InvalidInput(texts::provider_not_found(name)));
        }
    }

    println!(
        "{}",
        render_catalog_table(controller.catalog(), controller.active_provider(), provider)
    );
    println!("\n{} {}", info("→"), highlight(&texts::active_provider(controller.active_provider())));
    Ok(())
}

/// One row per provider field; secrets masked, the in-use provider starred.
pub fn render_catalog_table(
    catalog: &ProviderCatalog,
    active: &str,
    only: Option<&str>,
) -> comfy_table::Table {
    let mut table = create_table();
    table.set_header(vec![
        "",
        texts::header_provider(),
        texts::header_field(),
        texts::header_value(),
        texts::header_required(),
    ]);

    for (name, schema) in catalog.iter() {
        if only.is_some_and(|o| o != name) {
            continue;
        }
        let marker = if name == active { "✓" } else { "" };
        if schema.fields.is_empty() {
            table.add_row(vec![marker, name, "", "", ""]);
            continue;
        }
        for (idx, (field, value)) in schema.fields.iter().enumerate() {
            let shown = if is_secret_field(field) {
                mask_secret(value)
            } else {
                value.clone()
            };
            let required = if schema.is_required(field) { "*" } else { "" };
            let (marker, name) = if idx == 0 { (marker, name) } else { ("", "") };
            table.add_row(vec![
                marker.to_string(),
                name.to_string(),
                field.clone(),
                shown,
                required.to_string(),
            ]);
        }
    }
    table
}

pub fn use_provider(conn: &Connection, provider: &str) -> Result<(), AppError> {
    let mut session = open_session(conn)?;
    session.load()?;
    select_known(&mut session, provider)?;
    session.submit_current()?;
    println!("{}", success(&texts::switched_provider(provider)));
    Ok(())
}

pub fn set_fields(conn: &Connection, provider: &str, pairs: &[String]) -> Result<(), AppError> {
    let assignments = parse_pairs(pairs)?;

    let mut session = open_session(conn)?;
    session.load()?;
    select_known(&mut session, provider)?;

    for (field, value) in &assignments {
        if !session.controller().fields().contains(&field.as_str()) {
            return Err(AppError::InvalidInput(texts::field_not_found(provider, field)));
        }
        session.set_value(field, value.clone())?;
    }

    session.submit_current()?;
    println!("{}", success(&texts::updated_provider(provider)));
    Ok(())
}

fn select_known(session: &mut CliSession, provider: &str) -> Result<(), AppError> {
    if !session.controller().catalog().contains(provider) {
        return Err(AppError::InvalidInput(texts::provider_not_found(provider)));
    }
    session.select_provider(provider)
}

/// `KEY=VALUE` arguments in order; the value may itself contain `=`.
pub fn parse_pairs(pairs: &[String]) -> Result<IndexMap<String, String>, AppError> {
    let mut out = IndexMap::new();
    for raw in pairs {
        let Some((key, value)) = raw.split_once('=') else {
            return Err(AppError::InvalidInput(texts::invalid_pair(raw)));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::InvalidInput(texts::invalid_pair(raw)));
        }
        out.insert(key.to_string(), value.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pairs_keeps_order_and_equals_in_values() {
        let pairs = vec!["B=2".to_string(), "A=x=y".to_string(), "C=".to_string()];
        let parsed = parse_pairs(&pairs).expect("parse");
        let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
        assert_eq!(parsed["A"], "x=y");
        assert_eq!(parsed["C"], "");
    }

    #[test]
    fn parse_pairs_rejects_missing_separator_or_key() {
        assert!(parse_pairs(&["novalue".to_string()]).is_err());
        assert!(parse_pairs(&["=v".to_string()]).is_err());
    }

    #[test]
    fn catalog_table_masks_secrets_and_marks_required() {
        let mut catalog = ProviderCatalog::builtin();
        catalog
            .get_mut("OpenAI")
            .expect("openai")
            .fields
            .insert("OpenAIKey".to_string(), "sk-abcdefgh".to_string());

        let rendered = render_catalog_table(&catalog, "OpenAI", Some("OpenAI")).to_string();
        assert!(rendered.contains("sk-a…"));
        assert!(!rendered.contains("sk-abcdefgh"));
        assert!(rendered.contains("gpt-3.5-turbo"));
        assert!(!rendered.contains("DeepSeek"));
    }
}
