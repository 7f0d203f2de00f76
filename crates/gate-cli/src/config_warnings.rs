use gate_config::GatehouseConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &GatehouseConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &GatehouseConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if let Err(error) = config.idp.validate() {
        if has_env_prefix(&env_keys, "GATEHOUSE_IDP")
            && !has_env_prefix(&env_keys, "GATEHOUSE_IDP__")
        {
            warnings.push(
                "IdP config appears default while GATEHOUSE_IDP* env vars exist. Use double underscores (example: GATEHOUSE_IDP__SSO_PATH)."
                    .to_string(),
            );
        } else {
            warnings.push(format!(
                "{error}; set GATEHOUSE_IDP__SSO_PATH and GATEHOUSE_IDP__SSO_ROUTE to the provider's absolute URLs"
            ));
        }
    }

    if !config.audit.is_configured() && has_env_prefix(&env_keys, "GATEHOUSE_AUDIT") {
        warnings.push(
            "Audit config is incomplete while GATEHOUSE_AUDIT* env vars exist. Namespace, type and token are all required (example: GATEHOUSE_AUDIT__TOKEN)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
