use std::io::IsTerminal;

use indexmap::IndexMap;
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, Select, Text};

use crate::cli::commands::provider::{open_session, render_catalog_table};
use crate::cli::i18n::texts;
use crate::cli::ui::{apply_inquire_theme, highlight, info, success};
use crate::cli::Connection;
use crate::error::AppError;

/// Prompt-driven editor for one provider's fields.
pub fn edit(conn: &Connection, provider: Option<&str>) -> Result<(), AppError> {
    conn.require_session()?;
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Err(AppError::Message(texts::interactive_requires_tty().to_string()));
    }
    apply_inquire_theme();

    let mut session = open_session(conn)?;
    session.load()?;

    let provider = match provider {
        Some(name) => name.to_string(),
        None => {
            let names: Vec<String> = session
                .controller()
                .catalog()
                .names()
                .map(str::to_string)
                .collect();
            let start = names
                .iter()
                .position(|n| n == session.controller().active_provider())
                .unwrap_or(0);
            Select::new(texts::select_provider_prompt(), names)
                .with_starting_cursor(start)
                .prompt()
                .map_err(|_| AppError::Message(texts::cancelled().to_string()))?
        }
    };

    if !session.controller().catalog().contains(&provider) {
        return Err(AppError::InvalidInput(texts::provider_not_found(&provider)));
    }
    session.select_provider(&provider)?;

    println!("\n{}", highlight(&provider));
    println!("{}", "─".repeat(60));

    let please_enter = session.texts().lookup("please_enter");
    let mut values = IndexMap::new();
    for (field, current) in session.controller().values() {
        let required = session.controller().is_required(field);
        let label = if required {
            format!("{field} *")
        } else {
            field.clone()
        };

        let mut prompt = Text::new(&label).with_initial_value(current);
        if required {
            let message = format!("{please_enter}{field}");
            prompt = prompt.with_validator(
                move |input: &str| -> Result<Validation, CustomUserError> {
                    if input.trim().is_empty() {
                        Ok(Validation::Invalid(message.clone().into()))
                    } else {
                        Ok(Validation::Valid)
                    }
                },
            );
        }
        let answer = prompt
            .prompt()
            .map_err(|e| AppError::Message(format!("Input failed: {e}")))?;
        values.insert(field.clone(), answer);
    }

    let confirm = Confirm::new(&texts::confirm_apply(&provider))
        .with_default(true)
        .prompt()
        .map_err(|_| AppError::Message("Confirmation failed".to_string()))?;
    if !confirm {
        println!("\n{}", info(texts::cancelled()));
        return Ok(());
    }

    session.submit(values)?;
    println!("\n{}", success(&texts::updated_provider(&provider)));

    let controller = session.controller();
    println!(
        "{}",
        render_catalog_table(controller.catalog(), controller.active_provider(), Some(&provider))
    );
    Ok(())
}
