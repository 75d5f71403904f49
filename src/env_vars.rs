#[derive(strum::Display, Clone, Copy)]
#[allow(non_camel_case_types)]
pub(crate) enum SupportedEnvVar {
    /// Set by the Lambda execution environment.
    AWS_LAMBDA_RUNTIME_API,
}

pub(crate) fn is_env_set(key: SupportedEnvVar) -> bool {
    std::env::var_os(key.to_string()).is_some_and(|val| !val.is_empty())
}
