//! Terminal output

use colored::Colorize;
use formwright_schema::{FieldError, Structure, ValidationResult};
use formwright_ui::{Control, RenderedForm};

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn heading(text: &str) {
    println!("{}", text.bold().underline());
}

/// Structure summary with its fields in display order
pub fn structure_summary(structure: &Structure) {
    heading(&structure.title);
    println!("  {:<12} {}", "id".dimmed(), structure.id);
    let category = structure
        .known_category()
        .map(|c| c.display_name().to_string())
        .unwrap_or_else(|| structure.category.clone());
    println!("  {:<12} {}", "category".dimmed(), category);
    println!(
        "  {:<12} {}",
        "modified".dimmed(),
        structure.last_modified.to_rfc3339()
    );
    if let Some(description) = &structure.description {
        println!("  {:<12} {}", "description".dimmed(), description);
    }
    println!();

    if structure.is_empty() {
        println!("  {}", "No fields".dimmed());
        return;
    }

    println!(
        "  {:>5}  {:<20} {:<14} {}",
        "order".dimmed(),
        "id".dimmed(),
        "type".dimmed(),
        "label".dimmed()
    );
    for field in structure.sorted_fields() {
        let marker = if field.required { "*".red().to_string() } else { String::new() };
        println!(
            "  {:>5}  {:<20} {:<14} {}{}",
            field.order,
            field.id,
            field.field_type.display_name(),
            field.label,
            marker
        );
    }
}

/// Lint errors and warnings
pub fn lint_report(result: &ValidationResult) {
    if !result.has_errors() && !result.has_warnings() {
        success("No lint findings");
        return;
    }
    for error in &result.errors {
        println!("{} {}", "error:".red().bold(), error);
    }
    for warning in &result.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
}

/// One line per form error
pub fn field_errors(errors: &[FieldError]) {
    for error in errors {
        println!("{} {}", "✗".red().bold(), error);
    }
}

/// Text rendering of a form view model
pub fn rendered_form(form: &RenderedForm) {
    for field in &form.fields {
        let label = match (&field.label, &field.control) {
            (Some(label), _) => label.clone(),
            (None, Control::Checkbox { caption, .. }) => caption.clone(),
            (None, _) => field.id.clone(),
        };
        let label = if field.required {
            format!("{} {}", label, "*".red())
        } else {
            label
        };
        let width = if field.span > 1 { "(wide)" } else { "" };
        println!("{} {}", label.bold(), width.dimmed());
        println!("    {}", describe_control(&field.control));
        if let Some(error) = &field.error {
            println!("    {}", error.red());
        }
    }
    println!();
    println!(
        "[ {} ]  [ {} ]",
        form.cancel.label,
        form.submit.label.bold()
    );
}

fn describe_control(control: &Control) -> String {
    match control {
        Control::Input {
            kind,
            value,
            placeholder,
            step,
        } => {
            let mut text = format!("<{}> {}", kind.as_str(), shown(value, placeholder.as_deref()));
            if let Some(step) = step {
                text.push_str(&format!(" (step {})", step));
            }
            text
        }
        Control::TextArea { value, placeholder } => {
            format!("<textarea> {}", shown(value, placeholder.as_deref()))
        }
        Control::Select { prompt, options, value } => {
            let choices: Vec<String> = options
                .iter()
                .map(|o| if o.selected { format!("[{}]", o.label) } else { o.label.clone() })
                .collect();
            let current = if value.is_empty() { *prompt } else { value.as_str() };
            format!("<select> {} | {}", current, choices.join(", "))
        }
        Control::Checkbox { checked, .. } => {
            format!("<checkbox> {}", if *checked { "[x]" } else { "[ ]" })
        }
        Control::File { prompt, .. } => format!("<file> {}", prompt),
    }
}

fn shown(value: &str, placeholder: Option<&str>) -> String {
    match (value.is_empty(), placeholder) {
        (false, _) => value.to_string(),
        (true, Some(placeholder)) => placeholder.dimmed().to_string(),
        (true, None) => "_".dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_ui::InputKind;

    #[test]
    fn test_describe_input() {
        colored::control::set_override(false);
        let control = Control::Input {
            kind: InputKind::Number,
            value: "12".to_string(),
            placeholder: None,
            step: Some(0.01),
        };
        assert_eq!(describe_control(&control), "<number> 12 (step 0.01)");
    }

    #[test]
    fn test_describe_checkbox() {
        let control = Control::Checkbox {
            checked: true,
            caption: "Agree".to_string(),
        };
        assert_eq!(describe_control(&control), "<checkbox> [x]");
    }
}
