use af_core::{Rule, RuleView};

/// Prints the rule list to stdout and alerts to stderr.
#[derive(Debug, Default)]
pub struct TerminalView;

pub fn format_rule(index: usize, rule: &Rule) -> String {
    let mut line = format!(
        "  [{}] {} | {} | {}",
        index, rule.url_pattern, rule.selector, rule.default_value
    );
    if let Some(field) = rule.missing_field() {
        line.push_str(&format!("  (invalid: {} is empty)", field));
    }
    line
}

impl RuleView for TerminalView {
    fn render(&self, rules: &[Rule]) {
        println!("Saved rules: {}", rules.len());
        for (index, rule) in rules.iter().enumerate() {
            println!("{}", format_rule(index, rule));
        }
    }

    fn clear_form(&self) {}

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}
