use lg_domain::config::{Config, ConfigError, ConfigSeverity};

/// Render the validation report.  Returns the lines to print and whether
/// the config is usable (no errors; warnings are allowed).
pub fn report(config: &Config, config_path: &str) -> (Vec<String>, bool) {
    let issues: Vec<ConfigError> = config.validate();
    let summary = format!(
        "{} agent(s), {} binding(s)",
        config.agents.list.len(),
        config.bindings.len()
    );

    if issues.is_empty() {
        return (vec![format!("Config OK ({config_path}): {summary}")], true);
    }

    let errors = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warnings = issues.len() - errors;

    let mut lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
    lines.push(String::new());
    lines.push(format!(
        "{errors} error(s), {warnings} warning(s) in {config_path}: {summary}"
    ));
    (lines, errors == 0)
}

/// `lanegate config validate`.  Exit code 1 when errors are found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let (lines, ok) = report(config, config_path);
    for line in lines {
        println!("{line}");
    }
    ok
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let output = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("serializing config: {e}"))?;
    print!("{output}");
    Ok(())
}
